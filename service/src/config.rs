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


//! Service configuration

use crate::{Result, ServiceError};
use faketelnetd_protocol::DEFAULT_MAX_SUBNEGOTIATION;
use std::net::SocketAddr;
use std::time::Duration;

/// Telnet service configuration
///
/// Use the builder methods to customize the defaults.
///
/// # Example
///
/// ```
/// use faketelnetd_service::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::new("0.0.0.0:2323".parse().unwrap())
///     .with_max_connections(16)
///     .with_shutdown_grace(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the listener to
    pub bind_address: SocketAddr,

    /// Admission ceiling: the most sessions allowed to run at once
    pub max_connections: usize,

    /// How long the admission loop sleeps before re-checking a full registry
    ///
    /// New capacity may take up to one interval to be noticed.
    pub admission_backoff: Duration,

    /// Pause after a failed accept before trying again
    pub accept_error_backoff: Duration,

    /// How long shutdown waits for cancelled sessions before aborting them
    pub shutdown_grace: Duration,

    /// Upper bound on a single Telnet subnegotiation
    pub max_subnegotiation: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 23)),
            max_connections: 64,
            admission_backoff: Duration::from_secs(1),
            accept_error_backoff: Duration::from_millis(100),
            shutdown_grace: Duration::from_secs(2),
            max_subnegotiation: DEFAULT_MAX_SUBNEGOTIATION,
        }
    }
}

impl ServerConfig {
    /// Create a configuration for `bind_address`; everything else is defaulted.
    pub fn new(bind_address: SocketAddr) -> Self {
        Self {
            bind_address,
            ..Default::default()
        }
    }

    /// Set the admission ceiling
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the admission backoff interval
    pub fn with_admission_backoff(mut self, backoff: Duration) -> Self {
        self.admission_backoff = backoff;
        self
    }

    /// Set the pause after accept failures
    pub fn with_accept_error_backoff(mut self, backoff: Duration) -> Self {
        self.accept_error_backoff = backoff;
        self
    }

    /// Set the shutdown grace period
    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Set the subnegotiation bound
    pub fn with_max_subnegotiation(mut self, limit: usize) -> Self {
        self.max_subnegotiation = limit;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(ServiceError::InvalidConfig(
                "max_connections must be greater than 0".to_string(),
            ));
        }

        if self.admission_backoff.is_zero() {
            return Err(ServiceError::InvalidConfig(
                "admission_backoff must be greater than 0".to_string(),
            ));
        }

        if self.accept_error_backoff.is_zero() {
            return Err(ServiceError::InvalidConfig(
                "accept_error_backoff must be greater than 0".to_string(),
            ));
        }

        if self.max_subnegotiation == 0 {
            return Err(ServiceError::InvalidConfig(
                "max_subnegotiation must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.port(), 23);
        assert_eq!(config.admission_backoff, Duration::from_secs(1));
        assert_eq!(config.accept_error_backoff, Duration::from_millis(100));
        assert_eq!(config.max_subnegotiation, DEFAULT_MAX_SUBNEGOTIATION);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ServerConfig::new("127.0.0.1:2323".parse().unwrap())
            .with_max_connections(2)
            .with_admission_backoff(Duration::from_millis(10))
            .with_shutdown_grace(Duration::ZERO);

        assert_eq!(config.bind_address.port(), 2323);
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.admission_backoff, Duration::from_millis(10));
        // A zero grace period means abort immediately
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = ServerConfig::default().with_max_connections(0);
        assert!(matches!(config.validate(), Err(ServiceError::InvalidConfig(_))));

        let config = ServerConfig::default().with_admission_backoff(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = ServerConfig::default().with_accept_error_backoff(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = ServerConfig::default().with_max_subnegotiation(0);
        assert!(config.validate().is_err());
    }
}
