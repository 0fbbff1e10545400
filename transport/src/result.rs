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


use std::io;
use std::net::SocketAddr;

/// Result Type for Transport Operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Failures to create, bind, accept, send or receive on a socket.
///
/// Errors raised while binding are fatal to process startup. Every other variant is
/// scoped to the single connection it happened on.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The passive socket could not be bound or put into listening state.
    #[error("could not bind to {addr}: {source}")]
    Bind {
        /// Address the bind was attempted on
        addr: SocketAddr,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// An outbound connection could not be established.
    #[error("could not connect to {addr}: {source}")]
    Connect {
        /// Address the connect was attempted on
        addr: SocketAddr,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// The OS refused to hand over an accepted connection.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// A write reported a hard error (broken pipe, reset, ...).
    #[error("send failed: {0}")]
    Send(#[source] io::Error),

    /// A read reported a hard error.
    #[error("receive failed: {0}")]
    Receive(#[source] io::Error),

    /// The peer closed the stream while a byte was still required.
    #[error("peer disconnected unexpectedly")]
    Disconnected,
}

impl TransportError {
    /// True when the error means the peer went away rather than a local fault.
    pub fn is_disconnect(&self) -> bool {
        match self {
            TransportError::Disconnected => true,
            TransportError::Send(e) | TransportError::Receive(e) => matches!(
                e.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnect_classification() {
        assert!(TransportError::Disconnected.is_disconnect());
        assert!(
            TransportError::Send(io::Error::from(io::ErrorKind::BrokenPipe)).is_disconnect()
        );
        assert!(
            TransportError::Receive(io::Error::from(io::ErrorKind::ConnectionReset))
                .is_disconnect()
        );
        assert!(
            !TransportError::Receive(io::Error::from(io::ErrorKind::PermissionDenied))
                .is_disconnect()
        );
        assert!(!TransportError::Accept(io::Error::other("boom")).is_disconnect());
    }

    #[test]
    fn test_error_display() {
        let addr: SocketAddr = "127.0.0.1:23".parse().unwrap();
        let err = TransportError::Bind {
            addr,
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };
        assert_eq!(err.to_string(), "could not bind to 127.0.0.1:23: address in use");
        assert_eq!(
            TransportError::Disconnected.to_string(),
            "peer disconnected unexpectedly"
        );
    }
}
