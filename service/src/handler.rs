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


//! Session handler seam between the service and the application

use crate::{ConnectionId, ServiceError};
use async_trait::async_trait;
use faketelnetd_protocol::TelnetEngine;

/// Application logic for one Telnet session
///
/// The worker negotiates the session (`init`) before calling [`run`](Self::run), so a
/// handler only ever reads characters and lines and writes text. Returning ends the
/// session; the worker closes the connection and deregisters afterwards.
///
/// # Example
///
/// ```no_run
/// use faketelnetd_service::{ConnectionId, Result, SessionHandler};
/// use faketelnetd_protocol::TelnetEngine;
/// use async_trait::async_trait;
///
/// struct Greeter;
///
/// #[async_trait]
/// impl SessionHandler for Greeter {
///     async fn run(&self, _id: ConnectionId, engine: &mut TelnetEngine) -> Result<()> {
///         engine.send("name: ").await?;
///         let name = engine.next_line(false).await?;
///         engine.send(&format!("hello {name}\r\n")).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait SessionHandler: Send + Sync + 'static {
    /// Drive the session until it is over
    async fn run(&self, id: ConnectionId, engine: &mut TelnetEngine) -> crate::Result<()>;

    /// Called when [`run`](Self::run) or negotiation failed for a reason other than the
    /// peer disconnecting.
    ///
    /// The connection is closed after this returns.
    async fn on_error(&self, _id: ConnectionId, _error: &ServiceError) {}
}
