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


//! Connected byte-stream channel

use crate::{TransportError, TransportResult};
use bytes::Bytes;
use metrics::counter;
use std::cell::OnceCell;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tracing::{instrument, trace};

/// A connected, exclusively owned byte stream.
///
/// The channel is generic over its stream so the protocol layer can be driven by an
/// in-memory pipe in tests; production channels wrap a [`TcpStream`].
///
/// A channel is valid from construction until it is dropped or consumed by
/// [`close`](Self::close); there is no closed-but-alive state to misuse.
///
/// The channel is itself an [`AsyncRead`], so a `FramedRead` can decode straight from it
/// while received bytes are still counted here.
pub struct TransportChannel<S = TcpStream> {
    stream: S,
    peer_addr: SocketAddr,
    peer_label: OnceCell<String>,
    bytes_sent: u64,
    bytes_received: u64,
}

impl TransportChannel<TcpStream> {
    /// Open a client-role channel to `addr`.
    pub async fn connect(addr: SocketAddr) -> TransportResult<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| TransportError::Connect { addr, source })?;
        let _ = stream.set_nodelay(true);
        Ok(Self::new(stream, addr))
    }
}

impl<S> TransportChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already connected stream whose remote end is `peer_addr`.
    pub fn new(stream: S, peer_addr: SocketAddr) -> Self {
        Self {
            stream,
            peer_addr,
            peer_label: OnceCell::new(),
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    /// Remote socket address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Printable peer address (`203.0.113.7`, `::1`), formatted on first use.
    pub fn peer_address_string(&self) -> &str {
        self.peer_label
            .get_or_init(|| self.peer_addr.ip().to_string())
    }

    /// Total bytes written to the peer.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Total bytes read from the peer.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Write every byte of `bytes` to the peer.
    ///
    /// Returns the number of bytes written so callers can audit traffic. An empty slice
    /// is a no-op.
    #[instrument(level = "trace", skip(self, bytes), fields(peer = %self.peer_addr, len = bytes.len()))]
    pub async fn send_bytes(&mut self, bytes: &[u8]) -> TransportResult<usize> {
        if bytes.is_empty() {
            return Ok(0);
        }
        self.stream
            .write_all(bytes)
            .await
            .map_err(TransportError::Send)?;
        self.stream.flush().await.map_err(TransportError::Send)?;
        self.bytes_sent += bytes.len() as u64;
        counter!("faketelnetd.bytes.sent").increment(bytes.len() as u64);
        trace!("sent {} bytes", bytes.len());
        Ok(bytes.len())
    }

    /// Write a single byte.
    pub async fn send_byte(&mut self, byte: u8) -> TransportResult<usize> {
        self.send_bytes(&[byte]).await
    }

    /// Write a string verbatim.
    pub async fn send_str(&mut self, text: &str) -> TransportResult<usize> {
        self.send_bytes(text.as_bytes()).await
    }

    /// Read up to `max_bytes` bytes.
    ///
    /// An empty result signals end of stream: either the peer closed gracefully or the
    /// read was interrupted before any data arrived. Hard errors are reported separately
    /// as [`TransportError::Receive`].
    pub async fn receive(&mut self, max_bytes: usize) -> TransportResult<Bytes> {
        if max_bytes == 0 {
            return Ok(Bytes::new());
        }

        let mut buffer = vec![0u8; max_bytes];
        let count = match self.read(&mut buffer).await {
            Ok(count) => count,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => 0,
            Err(e) => return Err(TransportError::Receive(e)),
        };
        buffer.truncate(count);
        Ok(Bytes::from(buffer))
    }

    /// Read exactly one byte.
    ///
    /// Protocol parsing cannot continue without it, so end of stream is reported as
    /// [`TransportError::Disconnected`].
    pub async fn receive_byte(&mut self) -> TransportResult<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.read(&mut byte).await {
                Ok(0) => return Err(TransportError::Disconnected),
                Ok(_) => return Ok(byte[0]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(TransportError::Receive(e)),
            }
        }
    }

    /// Shut the write half down and release the socket.
    pub async fn close(mut self) -> TransportResult<()> {
        self.stream.shutdown().await.map_err(TransportError::Send)
    }
}

impl<S> TransportChannel<S> {
    fn record_received(&mut self, count: usize) {
        if count > 0 {
            self.bytes_received += count as u64;
            counter!("faketelnetd.bytes.received").increment(count as u64);
            trace!(peer = %self.peer_addr, "received {} bytes", count);
        }
    }
}

impl<S> AsyncRead for TransportChannel<S>
where
    S: AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.stream).poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = poll {
            this.record_received(buf.filled().len() - before);
        }
        poll
    }
}

impl<S> std::fmt::Debug for TransportChannel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportChannel")
            .field("peer_addr", &self.peer_addr)
            .field("bytes_sent", &self.bytes_sent)
            .field("bytes_received", &self.bytes_received)
            .finish_non_exhaustive()
    }
}
