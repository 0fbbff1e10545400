//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//


//! # Faketelnetd Protocol
//!
//! The server half of the Telnet protocol, limited to what a convincing login shell
//! needs: character-at-a-time input with server-side echo.
//!
//! ## Components
//!
//! - [`TelnetParser`]: synchronous byte state machine (`NORMAL`, `COMMAND`,
//!   `OPTION_ARG`, `SUBNEG`) with ECHO negotiation and Line Mode handling
//! - [`EscapeFilter`]: drops arrow/function key escape sequences typed by clients
//! - [`TelnetEngine`]: drives the parser over a [`TransportChannel`] and exposes
//!   [`next_char`](TelnetEngine::next_char), [`next_line`](TelnetEngine::next_line)
//!   and [`send`](TelnetEngine::send)
//!
//! ## Echo negotiation
//!
//! | Received    | Effect           | Reply            |
//! |-------------|------------------|------------------|
//! | `WONT ECHO` | peer echo off    | `DONT ECHO`      |
//! | `WILL ECHO` | peer echo on     | `DO ECHO`        |
//! | `DO ECHO`   | local echo on    | `WILL ECHO`      |
//! | `DONT ECHO` | local echo off   | `WONT ECHO`      |
//!
//! A reply goes out only when the cached state actually changes, so a client
//! repeating the same request cannot start a negotiation loop.
//!
//! ## Related RFCs
//!
//! - RFC 854: Telnet Protocol Specification
//! - RFC 857: Telnet Echo Option
//! - RFC 1184: Telnet Linemode Option
//!
//! [`TransportChannel`]: faketelnetd_transport::TransportChannel

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

pub mod consts;
mod echo;
mod engine;
mod escape;
mod event;
mod parser;
mod result;

pub use self::echo::EchoState;
pub use self::engine::TelnetEngine;
pub use self::escape::{ESCAPE_WINDOW, EscapeFilter};
pub use self::event::TelnetEvent;
pub use self::parser::{DEFAULT_MAX_SUBNEGOTIATION, TelnetParser};
pub use self::result::{ProtocolError, ProtocolResult};
