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


//! Signal driven shutdown

use crate::{Result, ServiceError, WorkerRegistry};
use nix::sys::signal::Signal;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// A termination signal that triggers shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// SIGINT
    Interrupt,
    /// SIGTERM
    Terminate,
    /// SIGQUIT
    Quit,
    /// SIGABRT
    Abort,
}

impl ShutdownSignal {
    /// Conventional signal name
    pub fn name(self) -> &'static str {
        match self {
            ShutdownSignal::Interrupt => "SIGINT",
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Quit => "SIGQUIT",
            ShutdownSignal::Abort => "SIGABRT",
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Installed handlers for every shutdown signal.
///
/// Once installed the signals no longer terminate the process; they are only observed
/// through [`recv`](Self::recv).
#[derive(Debug)]
pub struct SignalListener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
    abort: tokio::signal::unix::Signal,
}

impl SignalListener {
    /// Install the handlers. Must be called from within a tokio runtime.
    pub fn install() -> Result<Self> {
        Ok(Self {
            interrupt: listen(SignalKind::interrupt())?,
            terminate: listen(SignalKind::terminate())?,
            quit: listen(SignalKind::quit())?,
            abort: listen(SignalKind::from_raw(Signal::SIGABRT as i32))?,
        })
    }

    /// Wait for the next shutdown signal
    pub async fn recv(&mut self) -> ShutdownSignal {
        tokio::select! {
            _ = self.interrupt.recv() => ShutdownSignal::Interrupt,
            _ = self.terminate.recv() => ShutdownSignal::Terminate,
            _ = self.quit.recv() => ShutdownSignal::Quit,
            _ = self.abort.recv() => ShutdownSignal::Abort,
        }
    }
}

fn listen(kind: SignalKind) -> Result<tokio::signal::unix::Signal> {
    signal(kind).map_err(|err| {
        ServiceError::Other(format!(
            "failed to install handler for signal {}: {}",
            kind.as_raw_value(),
            err
        ))
    })
}

/// Outcome of a shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Workers asked to stop
    pub cancelled: usize,
    /// Workers still running after the grace period, aborted
    pub aborted: usize,
}

/// Stops the admission loop and every registered worker
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    server: CancellationToken,
    registry: Arc<WorkerRegistry>,
    grace: Duration,
}

impl ShutdownCoordinator {
    /// Create a coordinator over a server token and its registry
    pub fn new(server: CancellationToken, registry: Arc<WorkerRegistry>, grace: Duration) -> Self {
        Self {
            server,
            registry,
            grace,
        }
    }

    /// Wait for the first shutdown signal, then shut down.
    ///
    /// The listener is installed by the caller so that signals arriving while the server is
    /// still starting are not lost.
    pub async fn run_until_signal(&self, signals: &mut SignalListener) -> ShutdownReport {
        let caught = signals.recv().await;
        info!("Caught signal {}, shutting down", caught);
        self.shutdown().await
    }

    /// Shut everything down.
    ///
    /// The admission loop is stopped first so no new worker can register, then every
    /// registered worker is cancelled. Workers that have not exited when the grace period
    /// ends are aborted.
    pub async fn shutdown(&self) -> ShutdownReport {
        self.server.cancel();

        let cancelled = self.registry.cancel_all();
        if self.registry.wait_drained(self.grace).await {
            info!("Shutdown complete, {} sessions closed", cancelled);
            return ShutdownReport {
                cancelled,
                aborted: 0,
            };
        }

        let aborted = self.registry.abort_all();
        warn!("{} sessions did not stop within {:?}, aborted", aborted, self.grace);
        // Aborted tasks release their registration when the runtime drops them
        let _ = self.registry.wait_drained(self.grace.max(ABORT_SETTLE)).await;
        ShutdownReport { cancelled, aborted }
    }

    /// True once shutdown has started
    pub fn is_shutting_down(&self) -> bool {
        self.server.is_cancelled()
    }
}

const ABORT_SETTLE: Duration = Duration::from_millis(100);
