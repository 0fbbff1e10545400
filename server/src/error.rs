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


//! Startup errors

use crate::ConfigError;
use faketelnetd_service::ServiceError;
use faketelnetd_transport::TransportError;
use std::io;

/// Anything that prevents the daemon from starting. All of them exit with
/// [`StartupError::EXIT_CODE`].
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// Settings file missing, malformed or incomplete
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The log file could not be opened
    #[error("Could not open logfile {path}: {source}")]
    LogFile {
        /// Configured log path
        path: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// A global subscriber was already installed
    #[error("Could not install log subscriber: {0}")]
    Logging(String),

    /// The listening socket could not be created
    #[error("Could not bind to port {port}")]
    Bind {
        /// Configured port
        port: u16,
        /// Underlying failure
        #[source]
        source: TransportError,
    },

    /// Detaching from the terminal failed
    #[error("Could not daemonize: {0}")]
    Daemonize(#[source] nix::errno::Errno),

    /// The async runtime could not be built
    #[error("Could not start runtime: {0}")]
    Runtime(#[source] io::Error),

    /// The service rejected its configuration
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl StartupError {
    /// Process exit status for startup failures
    pub const EXIT_CODE: u8 = 127;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StartupError::from(ConfigError::Missing("listen".to_string()));
        assert_eq!(err.to_string(), "Setting listen is undefined.");

        let err = StartupError::Bind {
            port: 23,
            source: TransportError::Bind {
                addr: "0.0.0.0:23".parse().unwrap(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        };
        assert_eq!(err.to_string(), "Could not bind to port 23");
    }
}
