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


//! Passive listening socket

use crate::{TransportChannel, TransportError, TransportResult};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

/// A bound, listening TCP socket.
///
/// Owned by exactly one admission loop; dropping it releases the port.
#[derive(Debug)]
pub struct TransportListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TransportListener {
    /// Bind and listen on `addr`.
    pub async fn bind(addr: SocketAddr) -> TransportResult<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        Self::from_tokio(listener, addr)
    }

    /// Bind and listen on `addr` without a runtime.
    ///
    /// Used when the socket must exist before the async runtime is started, for example
    /// when the process detaches from its terminal after binding.
    pub fn bind_std(addr: SocketAddr) -> TransportResult<std::net::TcpListener> {
        let listener = std::net::TcpListener::bind(addr)
            .map_err(|source| TransportError::Bind { addr, source })?;
        listener
            .set_nonblocking(true)
            .map_err(|source| TransportError::Bind { addr, source })?;
        Ok(listener)
    }

    /// Adopt a listener created by [`bind_std`](Self::bind_std).
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_std(listener: std::net::TcpListener) -> TransportResult<Self> {
        let addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind {
                addr: SocketAddr::from(([0, 0, 0, 0], 0)),
                source,
            })?;
        listener
            .set_nonblocking(true)
            .map_err(|source| TransportError::Bind { addr, source })?;
        let listener =
            TcpListener::from_std(listener).map_err(|source| TransportError::Bind { addr, source })?;
        Self::from_tokio(listener, addr)
    }

    fn from_tokio(listener: TcpListener, requested: SocketAddr) -> TransportResult<Self> {
        let local_addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind {
                addr: requested,
                source,
            })?;
        debug!("listening on {}", local_addr);
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the next peer.
    ///
    /// The returned channel is fully initialised; a failed accept never yields a
    /// half-built channel.
    pub async fn accept(&self) -> TransportResult<TransportChannel<TcpStream>> {
        let (stream, peer_addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::Accept)?;
        let _ = stream.set_nodelay(true);
        Ok(TransportChannel::new(stream, peer_addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_resolves_ephemeral_port() {
        let listener = TransportListener::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        assert_ne!(listener.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_in_use_is_reported() {
        let first = TransportListener::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let err = TransportListener::bind(first.local_addr()).await.unwrap_err();
        assert!(matches!(err, TransportError::Bind { .. }));
    }

    #[tokio::test]
    async fn test_from_std() {
        let std_listener = TransportListener::bind_std("127.0.0.1:0".parse().unwrap()).unwrap();
        let expected = std_listener.local_addr().unwrap();
        let listener = TransportListener::from_std(std_listener).unwrap();
        assert_eq!(listener.local_addr(), expected);
    }
}
