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


//! Telnet server: the connection admission loop
//!
//! The [`TelnetServer`] owns the listening socket and a [`WorkerRegistry`]. It admits at
//! most `max_connections` sessions at a time, reserving a registry slot for every accepted
//! connection before its worker is spawned.
//!
//! # Example
//!
//! ```no_run
//! use faketelnetd_service::{ServerConfig, SessionHandler, SignalListener, TelnetServer};
//! use std::sync::Arc;
//!
//! # async fn example(handler: Arc<dyn SessionHandler>) -> faketelnetd_service::Result<()> {
//! let server = TelnetServer::bind(ServerConfig::new("0.0.0.0:23".parse().unwrap())).await?;
//! let coordinator = server.coordinator();
//! let mut signals = SignalListener::install()?;
//! let accept_loop = tokio::spawn(server.run(handler));
//!
//! coordinator.run_until_signal(&mut signals).await;
//! let _ = accept_loop.await;
//! # Ok(())
//! # }
//! ```

use crate::{
    Result, ServerConfig, SessionHandler, SessionWorker, ShutdownCoordinator, WorkerRegistry,
};
use faketelnetd_protocol::{TelnetEngine, TelnetParser};
use faketelnetd_transport::{TransportChannel, TransportListener};
use metrics::counter;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Telnet server
///
/// Created bound; [`run`](Self::run) consumes it and returns once the shutdown token is
/// cancelled, releasing the listening socket on the way out.
pub struct TelnetServer {
    config: ServerConfig,
    listener: TransportListener,
    registry: Arc<WorkerRegistry>,
    shutdown: CancellationToken,
}

impl TelnetServer {
    /// Validate `config` and bind its address
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;
        let listener = TransportListener::bind(config.bind_address).await?;
        Self::from_listener(config, listener)
    }

    /// Wrap an already bound listener.
    ///
    /// `config.bind_address` is ignored in favour of the listener's address.
    pub fn from_listener(config: ServerConfig, listener: TransportListener) -> Result<Self> {
        config.validate()?;
        info!("Telnet server bound to {}", listener.local_addr());
        Ok(Self {
            config,
            listener,
            registry: Arc::new(WorkerRegistry::new()),
            shutdown: CancellationToken::new(),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// The server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Registry of live workers
    pub fn registry(&self) -> Arc<WorkerRegistry> {
        Arc::clone(&self.registry)
    }

    /// Token that stops the admission loop when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// A coordinator able to shut this server and all of its workers down
    pub fn coordinator(&self) -> ShutdownCoordinator {
        ShutdownCoordinator::new(
            self.shutdown.clone(),
            Arc::clone(&self.registry),
            self.config.shutdown_grace,
        )
    }

    /// Run the admission loop until the shutdown token is cancelled.
    ///
    /// Accept failures are logged and retried after `accept_error_backoff`; they never end
    /// the loop.
    pub async fn run(self, handler: Arc<dyn SessionHandler>) {
        info!(
            "Accepting connections on {} (at most {} concurrent sessions)",
            self.local_addr(),
            self.config.max_connections
        );

        loop {
            if !self.wait_for_capacity().await {
                break;
            }

            let accepted = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            match accepted {
                Ok(channel) => self.dispatch(channel, &handler),
                Err(err) => {
                    warn!(error = %err, "Failed to accept connection");
                    counter!("faketelnetd.accept.errors").increment(1);

                    // Back off on errors to avoid tight loop
                    tokio::select! {
                        () = self.shutdown.cancelled() => break,
                        () = sleep(self.config.accept_error_backoff) => {}
                    }
                }
            }
        }

        drop(self.listener);
        info!("Accept loop terminated");
    }

    /// Sleep in `admission_backoff` steps until the registry has room.
    ///
    /// The registry lock is held only for each size check. Returns false when shutdown
    /// was requested while waiting.
    async fn wait_for_capacity(&self) -> bool {
        let mut deferred = false;
        loop {
            if self.shutdown.is_cancelled() {
                return false;
            }
            let live = self.registry.len();
            if live < self.config.max_connections {
                if deferred {
                    debug!("capacity available again ({} live)", live);
                }
                return true;
            }
            if !deferred {
                debug!(
                    "admission ceiling of {} reached, deferring accept",
                    self.config.max_connections
                );
                deferred = true;
            }
            tokio::select! {
                () = self.shutdown.cancelled() => return false,
                () = sleep(self.config.admission_backoff) => {}
            }
        }
    }

    fn dispatch(&self, channel: TransportChannel, handler: &Arc<dyn SessionHandler>) {
        let peer = channel.peer_addr();
        counter!("faketelnetd.connections.total").increment(1);

        let handler = Arc::clone(handler);
        let max_subnegotiation = self.config.max_subnegotiation;
        let spawned = self.registry.spawn(move |registration| {
            let parser = TelnetParser::with_max_subnegotiation(max_subnegotiation);
            let engine = TelnetEngine::with_parser(channel, parser);
            SessionWorker::new(engine, handler, registration).run()
        });

        match spawned {
            Ok(id) => debug!(connection_id = %id, "dispatched worker for {}", peer),
            Err(err) => {
                counter!("faketelnetd.connections.rejected").increment(1);
                warn!(error = %err, "Failed to start worker for {}, connection closed", peer);
            }
        }
    }
}

impl std::fmt::Debug for TelnetServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetServer")
            .field("local_addr", &self.local_addr())
            .field("live", &self.registry.len())
            .field("shutting_down", &self.shutdown.is_cancelled())
            .finish()
    }
}
