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


//! Session-facing Telnet engine

use crate::consts::{BS, CR, DEL};
use crate::{EchoState, ProtocolResult, TelnetEvent, TelnetParser};
use faketelnetd_transport::{TransportChannel, TransportError};
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::FramedRead;
use tracing::{debug, instrument, trace};

/// Backspace, space, backspace: erases one column on the peer's terminal.
const ERASE_SEQUENCE: &[u8] = b"\x08 \x08";

/// Telnet engine over one exclusively owned channel.
///
/// Session logic only ever sees printable characters and finished lines; option
/// negotiation, subnegotiations and terminal escape noise are handled underneath.
/// All calls on one engine are sequential, so no internal locking is needed.
///
/// # Example
///
/// ```rust,no_run
/// use faketelnetd_protocol::TelnetEngine;
/// use faketelnetd_transport::TransportListener;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let listener = TransportListener::bind("0.0.0.0:23".parse()?).await?;
/// let mut engine = TelnetEngine::new(listener.accept().await?);
/// engine.init().await?;
/// engine.send("login: ").await?;
/// let user = engine.next_line(false).await?;
/// engine.send("password: ").await?;
/// let pass = engine.next_line(true).await?;
/// # Ok(())
/// # }
/// ```
pub struct TelnetEngine<S = TcpStream> {
    framed: FramedRead<TransportChannel<S>, TelnetParser>,
}

impl<S> TelnetEngine<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap `channel` with a default parser.
    pub fn new(channel: TransportChannel<S>) -> Self {
        Self::with_parser(channel, TelnetParser::new())
    }

    /// Wrap `channel` with a preconfigured parser.
    pub fn with_parser(channel: TransportChannel<S>, parser: TelnetParser) -> Self {
        Self {
            framed: FramedRead::new(channel, parser),
        }
    }

    /// Open the negotiation: request Line Mode, ask the peer not to echo, then offer to
    /// echo ourselves.
    ///
    /// Must run once per connection before any read. Line Mode goes first so the peer's
    /// Line Mode subnegotiation arrives while echo is still being settled.
    #[instrument(skip(self), fields(peer = %self.channel().peer_addr()))]
    pub async fn init(&mut self) -> ProtocolResult<()> {
        let parser = self.framed.decoder_mut();
        parser.request_linemode();
        parser.set_peer_echo(false);
        parser.set_local_echo(true);
        self.flush_replies().await
    }

    /// Next printable character from the peer.
    ///
    /// Never returns IAC or a byte of a suppressed escape sequence.
    pub async fn next_char(&mut self) -> ProtocolResult<u8> {
        loop {
            if let Some(byte) = self.next_event().await? {
                return Ok(byte);
            }
        }
    }

    /// Next line from the peer as text, without its terminator.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD; use
    /// [`next_line_bytes`](Self::next_line_bytes) to see them unchanged.
    pub async fn next_line(&mut self, hidden: bool) -> ProtocolResult<String> {
        let line = self.next_line_bytes(hidden).await?;
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    /// Next line from the peer as raw bytes, without its terminator.
    ///
    /// DEL and backspace remove the last buffered character, all bytes of it when it is a
    /// multi-byte UTF-8 sequence. When local echo is on, accepted bytes are echoed unless
    /// `hidden` is set, each erasure is echoed once as backspace-space-backspace, and the
    /// terminator is always echoed as CRLF.
    pub async fn next_line_bytes(&mut self, hidden: bool) -> ProtocolResult<Vec<u8>> {
        let mut line: Vec<u8> = Vec::new();
        loop {
            let byte = self.next_char().await?;

            if byte == CR {
                // CR is always followed by LF or NUL
                self.next_event().await?;
                if self.local_echo().is_on() {
                    self.channel_mut().send_bytes(b"\r\n").await?;
                }
                trace!(hidden, "line complete ({} bytes)", line.len());
                return Ok(line);
            }

            let is_erase = byte == DEL || byte == BS;
            let erased = is_erase && erase_last_char(&mut line);
            if !is_erase {
                line.push(byte);
            }

            if self.local_echo().is_on() && !hidden {
                if erased {
                    self.channel_mut().send_bytes(ERASE_SEQUENCE).await?;
                } else if !is_erase {
                    self.channel_mut().send_byte(byte).await?;
                }
            }
        }
    }

    /// Send text verbatim.
    pub async fn send(&mut self, text: &str) -> ProtocolResult<()> {
        self.channel_mut().send_str(text).await?;
        Ok(())
    }

    /// Send one raw byte.
    pub async fn send_byte(&mut self, byte: u8) -> ProtocolResult<()> {
        self.channel_mut().send_byte(byte).await?;
        Ok(())
    }

    /// Change local echo, negotiating only if the value differs.
    pub async fn set_local_echo(&mut self, on: bool) -> ProtocolResult<bool> {
        let changed = self.framed.decoder_mut().set_local_echo(on);
        self.flush_replies().await?;
        Ok(changed)
    }

    /// Change the expected peer echo, negotiating only if the value differs.
    pub async fn set_peer_echo(&mut self, on: bool) -> ProtocolResult<bool> {
        let changed = self.framed.decoder_mut().set_peer_echo(on);
        self.flush_replies().await?;
        Ok(changed)
    }

    /// Ask the peer to negotiate Line Mode.
    pub async fn request_linemode(&mut self) -> ProtocolResult<()> {
        self.framed.decoder_mut().request_linemode();
        self.flush_replies().await
    }

    /// Current local echo state.
    pub fn local_echo(&self) -> EchoState {
        self.framed.decoder().local_echo()
    }

    /// Current peer echo state.
    pub fn peer_echo(&self) -> EchoState {
        self.framed.decoder().peer_echo()
    }

    /// Printable peer address.
    pub fn peer_address_string(&self) -> &str {
        self.channel().peer_address_string()
    }

    /// Borrow the underlying channel.
    pub fn channel(&self) -> &TransportChannel<S> {
        self.framed.get_ref()
    }

    fn channel_mut(&mut self) -> &mut TransportChannel<S> {
        self.framed.get_mut()
    }

    /// Give the channel back, discarding protocol state and any unread input.
    pub fn into_channel(self) -> TransportChannel<S> {
        self.framed.into_inner()
    }

    /// Decode the next event, write any replies it produced and return its content byte.
    async fn next_event(&mut self) -> ProtocolResult<Option<u8>> {
        let event = match self.framed.next().await {
            Some(event) => event?,
            None => return Err(TransportError::Disconnected.into()),
        };
        self.flush_replies().await?;
        match event {
            TelnetEvent::Data(byte) => Ok(Some(byte)),
            event @ TelnetEvent::Suppressed(_) => {
                trace!("dropped {}", event);
                Ok(None)
            }
            event => {
                debug!(peer = %self.channel().peer_addr(), "received control code: {}", event);
                Ok(None)
            }
        }
    }

    async fn flush_replies(&mut self) -> ProtocolResult<()> {
        if let Some(replies) = self.framed.decoder_mut().take_replies() {
            self.channel_mut().send_bytes(&replies).await?;
        }
        Ok(())
    }
}

/// Drop the last character of `line`, including every byte of a multi-byte UTF-8
/// sequence. Returns whether anything was removed.
fn erase_last_char(line: &mut Vec<u8>) -> bool {
    let Some(last) = line.len().checked_sub(1) else {
        return false;
    };
    // Step back over at most three continuation bytes to the lead byte
    let start = (last.saturating_sub(3)..=last)
        .rev()
        .find(|&index| !is_continuation(line[index]))
        .filter(|&index| utf8_width(line[index]) == last - index + 1)
        .unwrap_or(last);
    line.truncate(start);
    true
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

impl<S> std::fmt::Debug for TelnetEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetEngine")
            .field("channel", self.framed.get_ref())
            .field("local_echo", &self.framed.decoder().local_echo())
            .field("peer_echo", &self.framed.decoder().peer_echo())
            .finish()
    }
}
