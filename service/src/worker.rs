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


//! Session worker
//!
//! One worker per accepted connection. It owns the connection's [`TelnetEngine`] outright,
//! negotiates the session, hands it to the [`SessionHandler`] and, whatever the outcome,
//! closes the socket and releases its [`Registration`].

use crate::{ConnectionId, Registration, ServiceError, SessionHandler};
use faketelnetd_protocol::TelnetEngine;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};

/// Drives one session from negotiation to close
pub struct SessionWorker {
    engine: TelnetEngine,
    handler: Arc<dyn SessionHandler>,
    registration: Registration,
}

impl SessionWorker {
    /// Create a worker for an accepted connection
    pub fn new(
        engine: TelnetEngine,
        handler: Arc<dyn SessionHandler>,
        registration: Registration,
    ) -> Self {
        Self {
            engine,
            handler,
            registration,
        }
    }

    /// Identifier assigned to this worker
    pub fn id(&self) -> ConnectionId {
        self.registration.id()
    }

    /// Run the session to completion.
    ///
    /// Connection scoped failures end here: they are logged with the connection's context
    /// and never reach the caller.
    ///
    /// The session span is entered as a child of whatever span is current when this is
    /// called, not when the returned future is first polled.
    pub fn run(self) -> impl Future<Output = ()> + Send {
        let span = info_span!(
            "session",
            connection_id = %self.id(),
            peer = %self.engine.peer_address_string()
        );
        self.run_inner().instrument(span)
    }

    async fn run_inner(self) {
        let Self {
            mut engine,
            handler,
            registration,
        } = self;
        let id = registration.id();
        let cancel = registration.cancellation().clone();

        info!("Connection from {}", engine.peer_address_string());

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ServiceError::Cancelled),
            result = Self::drive(id, &mut engine, handler.as_ref()) => result,
        };

        match result {
            Ok(()) => debug!("session finished"),
            Err(ServiceError::Cancelled) => info!("session cancelled by shutdown"),
            Err(err) if err.is_disconnect() => info!("peer disconnected"),
            Err(err) => {
                warn!(error = %err, "session failed");
                handler.on_error(id, &err).await;
            }
        }

        let channel = engine.into_channel();
        debug!(
            bytes_sent = channel.bytes_sent(),
            bytes_received = channel.bytes_received(),
            "closing connection"
        );
        if let Err(err) = channel.close().await {
            debug!(error = %err, "shutdown on closed socket");
        }
        drop(registration);
    }

    async fn drive(
        id: ConnectionId,
        engine: &mut TelnetEngine,
        handler: &dyn SessionHandler,
    ) -> crate::Result<()> {
        engine.init().await?;
        handler.run(id, engine).await
    }
}

impl std::fmt::Debug for SessionWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWorker")
            .field("id", &self.registration.id())
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}
