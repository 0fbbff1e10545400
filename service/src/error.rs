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


//! Error types for the Telnet service

use faketelnetd_protocol::ProtocolError;
use faketelnetd_transport::TransportError;
use thiserror::Error;

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Telnet service error types
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Socket level failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Telnet framing failure
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The session was cancelled by shutdown
    #[error("Session cancelled")]
    Cancelled,

    /// A worker could not be started
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Generic error with a message
    #[error("{0}")]
    Other(String),
}

impl ServiceError {
    /// Check whether the error is an ordinary peer disconnect
    pub fn is_disconnect(&self) -> bool {
        match self {
            ServiceError::Transport(err) => err.is_disconnect(),
            ServiceError::Protocol(err) => err.is_disconnect(),
            _ => false,
        }
    }
}
