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


//! # Faketelnetd Transport
//!
//! Byte-stream I/O over TCP for the Telnet engine. A [`TransportListener`] owns the
//! passive socket and produces one [`TransportChannel`] per accepted peer. Channels are
//! exclusively owned by a single session for their entire life and close their socket
//! exactly once when dropped (or explicitly through [`TransportChannel::close`]).
//!
//! ```rust,no_run
//! use faketelnetd_transport::TransportListener;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let listener = TransportListener::bind("0.0.0.0:23".parse()?).await?;
//! let mut channel = listener.accept().await?;
//! channel.send_str("Welcome to Microsoft Telnet Service\r\n").await?;
//! let byte = channel.receive_byte().await?;
//! # Ok(())
//! # }
//! ```

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod channel;
mod listener;
mod result;

pub use self::channel::TransportChannel;
pub use self::listener::TransportListener;
pub use self::result::{TransportError, TransportResult};
