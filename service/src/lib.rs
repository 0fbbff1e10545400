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


//! # Faketelnetd Service
//!
//! Connection admission, per-connection workers and coordinated shutdown.
//!
//! # Architecture
//!
//! ```text
//! TelnetServer (admission loop) ──► WorkerRegistry ◄── ShutdownCoordinator
//!        │ spawn                        ▲ Registration (drop = deregister)
//!        ▼                              │
//!   SessionWorker ── TelnetEngine ── SessionHandler
//! ```
//!
//! Every accepted connection gets its own tokio task which exclusively owns the
//! connection's [`TelnetEngine`](faketelnetd_protocol::TelnetEngine). The registry is the
//! only state shared between tasks and is guarded by a single mutex; a worker is registered
//! exactly while it is live.

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

mod config;
mod error;
mod handler;
mod registry;
mod server;
mod shutdown;
mod types;
mod worker;

pub use config::ServerConfig;
pub use error::{Result, ServiceError};
pub use handler::SessionHandler;
pub use registry::{Registration, WorkerRegistry};
pub use server::TelnetServer;
pub use shutdown::{ShutdownCoordinator, ShutdownReport, ShutdownSignal, SignalListener};
pub use types::ConnectionId;
pub use worker::SessionWorker;
