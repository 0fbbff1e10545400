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


//! # Faketelnetd
//!
//! A deceptive Telnet daemon posing as a Windows Telnet server. Visitors get an NTLM
//! failure banner and a login prompt; every credential pair and every command they type is
//! written to the log file, and operator supplied hook commands can react to each of them.
//!
//! Startup order matters: settings are validated, the log file opened and the port bound
//! before the process detaches, so every fatal error still reaches the terminal. The tokio
//! runtime is only built after the fork.

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
mod daemon;
mod error;
pub mod hooks;
pub mod logging;
mod settings;
pub mod shell;

pub use config::{DaemonConfig, REQUIRED_SETTINGS};
pub use error::StartupError;
pub use settings::{ConfigError, Settings};

use faketelnetd_service::{
    ServerConfig, SessionHandler, ShutdownReport, SignalListener, TelnetServer,
};
use faketelnetd_transport::TransportListener;
use shell::FakeShell;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Settings file used when none is given on the command line
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/faketelnetd.conf";

/// Run the daemon until a shutdown signal arrives.
///
/// Returns once every session has been stopped and the log has been flushed.
pub fn run(settings_path: &Path) -> Result<(), StartupError> {
    let settings = Settings::load(settings_path)?;
    let config = DaemonConfig::from_settings(&settings)?;
    let server_config = config.server_config();
    server_config.validate()?;

    let log_file = logging::init(&config.logfile, config.debug)?;
    info!("Settings loaded from {}", settings.origin());

    let listener = TransportListener::bind_std(config.listen_address()).map_err(|source| {
        StartupError::Bind {
            port: config.listen,
            source,
        }
    })?;
    info!("bound to port {}, server started", config.listen);

    if !config.interactive {
        println!("bound to port {}, server started", config.listen);
        daemon::daemonize()?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(StartupError::Runtime)?;
    let handler: Arc<dyn SessionHandler> = Arc::new(FakeShell::new(config.shell));
    let report = runtime.block_on(serve(listener, server_config, handler))?;
    info!(
        "Shutdown finished: {} sessions cancelled, {} aborted",
        report.cancelled, report.aborted
    );

    drop(runtime);
    if let Err(err) = log_file.sync() {
        warn!(error = %err, "could not flush log file");
    }
    Ok(())
}

/// Serve on an already bound listener until a shutdown signal arrives
pub async fn serve(
    listener: std::net::TcpListener,
    config: ServerConfig,
    handler: Arc<dyn SessionHandler>,
) -> Result<ShutdownReport, StartupError> {
    let port = config.bind_address.port();
    let listener =
        TransportListener::from_std(listener).map_err(|source| StartupError::Bind { port, source })?;
    let server = TelnetServer::from_listener(config, listener)?;
    let coordinator = server.coordinator();
    let mut signals = SignalListener::install()?;

    let accept_loop = tokio::spawn(server.run(handler));
    let report = coordinator.run_until_signal(&mut signals).await;
    if let Err(err) = accept_loop.await {
        warn!(error = %err, "accept loop ended abnormally");
    }
    Ok(report)
}
