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


use faketelnetd_transport::TransportError;
use std::io;

/// Result Type for Protocol Operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while driving a Telnet session.
///
/// Unrecognised commands and options are never errors; they are logged and ignored.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The underlying channel failed or the peer went away.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A subnegotiation grew past its bound without being terminated by `IAC SE`.
    #[error("subnegotiation exceeded {limit} bytes without IAC SE")]
    SubnegotiationOverflow {
        /// Configured bound in bytes
        limit: usize,
    },
}

impl From<io::Error> for ProtocolError {
    /// Read failures surfaced by the framed decoder
    fn from(err: io::Error) -> Self {
        ProtocolError::Transport(TransportError::Receive(err))
    }
}

impl ProtocolError {
    /// True when the peer simply disconnected.
    pub fn is_disconnect(&self) -> bool {
        match self {
            ProtocolError::Transport(e) => e.is_disconnect(),
            ProtocolError::SubnegotiationOverflow { .. } => false,
        }
    }
}
