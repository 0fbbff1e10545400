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


//! Byte-level Telnet state machine

use crate::consts::{self, option};
use crate::{EchoState, EscapeFilter, ProtocolError, ProtocolResult, TelnetEvent};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use metrics::counter;
use tokio_util::codec::Decoder;
use tracing::debug;

/// Default bound on a single subnegotiation payload, terminator included.
pub const DEFAULT_MAX_SUBNEGOTIATION: usize = 1024;

/// Server side Telnet state machine.
///
/// The parser is fed one raw byte at a time, either directly through
/// [`feed`](Self::feed) or as a [`Decoder`] under a `FramedRead`, and never performs I/O
/// itself. Negotiation replies it decides to send accumulate in an internal buffer which
/// the owner drains with [`take_replies`](Self::take_replies) after every event.
///
/// Only the ECHO option is acted upon. Line Mode subnegotiations are answered with an
/// empty edit mask so the client forwards every keystroke; every other command, option
/// and subnegotiation is reported and otherwise ignored.
#[derive(Debug)]
pub struct TelnetParser {
    state: ParserState,
    escape: EscapeFilter,
    subnegotiation: BytesMut,
    max_subnegotiation: usize,
    local_echo: EchoState,
    peer_echo: EchoState,
    replies: BytesMut,
}

impl Default for TelnetParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TelnetParser {
    /// Create a parser with the default subnegotiation bound.
    pub fn new() -> Self {
        Self::with_max_subnegotiation(DEFAULT_MAX_SUBNEGOTIATION)
    }

    /// Create a parser that rejects subnegotiations longer than `limit` bytes.
    pub fn with_max_subnegotiation(limit: usize) -> Self {
        Self {
            state: ParserState::Normal,
            escape: EscapeFilter::new(),
            subnegotiation: BytesMut::new(),
            max_subnegotiation: limit.max(2),
            local_echo: EchoState::Unknown,
            peer_echo: EchoState::Unknown,
            replies: BytesMut::new(),
        }
    }

    /// Whether this server echoes the peer's input.
    pub fn local_echo(&self) -> EchoState {
        self.local_echo
    }

    /// Whether the peer is expected to echo locally.
    pub fn peer_echo(&self) -> EchoState {
        self.peer_echo
    }

    /// Feed one received byte.
    ///
    /// Returns `Ok(None)` while a multi-byte sequence is still incomplete.
    pub fn feed(&mut self, byte: u8) -> ProtocolResult<Option<TelnetEvent>> {
        match (self.state, byte) {
            (ParserState::Normal, consts::IAC) => {
                self.state = ParserState::Command;
                Ok(None)
            }
            (ParserState::Normal, _) => {
                if self.escape.accept(byte) {
                    Ok(Some(TelnetEvent::Data(byte)))
                } else {
                    Ok(Some(TelnetEvent::Suppressed(byte)))
                }
            }
            (ParserState::Command, consts::DO | consts::DONT | consts::WILL | consts::WONT) => {
                self.state = ParserState::OptionArgument(byte);
                Ok(None)
            }
            (ParserState::Command, consts::SB) => {
                self.state = ParserState::Subnegotiation;
                self.subnegotiation.clear();
                Ok(None)
            }
            (ParserState::Command, _) => {
                self.state = ParserState::Normal;
                Ok(Some(TelnetEvent::Command(byte)))
            }
            (ParserState::OptionArgument(command), _) => {
                self.state = ParserState::Normal;
                self.apply_negotiation(command, byte);
                Ok(Some(TelnetEvent::Negotiation {
                    command,
                    option: byte,
                }))
            }
            (ParserState::Subnegotiation, _) => self.collect_subnegotiation(byte),
        }
    }

    fn collect_subnegotiation(&mut self, byte: u8) -> ProtocolResult<Option<TelnetEvent>> {
        if self.subnegotiation.len() >= self.max_subnegotiation {
            self.state = ParserState::Normal;
            self.subnegotiation.clear();
            return Err(ProtocolError::SubnegotiationOverflow {
                limit: self.max_subnegotiation,
            });
        }

        self.subnegotiation.put_u8(byte);
        if !self.subnegotiation.ends_with(&[consts::IAC, consts::SE]) {
            return Ok(None);
        }

        self.state = ParserState::Normal;
        let payload_len = self.subnegotiation.len() - 2;
        self.subnegotiation.truncate(payload_len);
        let payload = self.subnegotiation.split().freeze();

        if payload.first() == Some(&option::LINEMODE) {
            self.handle_linemode(&payload[1..]);
        }
        Ok(Some(TelnetEvent::Subnegotiation(payload)))
    }

    fn apply_negotiation(&mut self, command: u8, opt: u8) {
        if opt != option::ECHO {
            return;
        }
        match command {
            consts::WONT => {
                self.set_peer_echo(false);
            }
            consts::WILL => {
                self.set_peer_echo(true);
            }
            consts::DO => {
                self.set_local_echo(true);
            }
            consts::DONT => {
                self.set_local_echo(false);
            }
            _ => {}
        }
    }

    fn handle_linemode(&mut self, arguments: &[u8]) {
        debug!(
            "line mode subnegotiation ({} bytes), requesting empty edit mask",
            arguments.len()
        );
        self.replies.put_slice(&[
            consts::IAC,
            consts::SB,
            option::LINEMODE,
            option::linemode::MODE,
            0,
            consts::IAC,
            consts::SE,
        ]);
    }

    /// Assert whether this server echoes input.
    ///
    /// Queues `IAC WILL ECHO` or `IAC WONT ECHO` only when the value changes; returns
    /// whether a reply was queued.
    pub fn set_local_echo(&mut self, on: bool) -> bool {
        let state = EchoState::from(on);
        if state == self.local_echo {
            return false;
        }
        let command = if on { consts::WILL } else { consts::WONT };
        self.queue_negotiation(command, option::ECHO);
        self.local_echo = state;
        true
    }

    /// Ask the peer to echo (`IAC DO ECHO`) or not (`IAC DONT ECHO`).
    ///
    /// Queues a reply only when the value changes; returns whether one was queued.
    pub fn set_peer_echo(&mut self, on: bool) -> bool {
        let state = EchoState::from(on);
        if state == self.peer_echo {
            return false;
        }
        let command = if on { consts::DO } else { consts::DONT };
        self.queue_negotiation(command, option::ECHO);
        self.peer_echo = state;
        true
    }

    /// Queue `IAC DO LINEMODE`.
    pub fn request_linemode(&mut self) {
        self.queue_negotiation(consts::DO, option::LINEMODE);
    }

    fn queue_negotiation(&mut self, command: u8, opt: u8) {
        debug!(
            "sending control code: IAC {} {}",
            consts::command_name(command),
            consts::option_name(opt)
        );
        counter!("faketelnetd.negotiations.sent").increment(1);
        self.replies.put_slice(&[consts::IAC, command, opt]);
    }

    /// True when replies are waiting to be written.
    pub fn has_pending_replies(&self) -> bool {
        !self.replies.is_empty()
    }

    /// Drain queued replies in the order they were produced.
    pub fn take_replies(&mut self) -> Option<Bytes> {
        if self.replies.is_empty() {
            None
        } else {
            Some(self.replies.split().freeze())
        }
    }
}

impl Decoder for TelnetParser {
    type Item = TelnetEvent;
    type Error = ProtocolError;

    /// Consume bytes until one event is complete.
    ///
    /// Bytes of an unfinished sequence are absorbed into the parser state, so `src` is
    /// always drained when `Ok(None)` is returned.
    fn decode(&mut self, src: &mut BytesMut) -> ProtocolResult<Option<TelnetEvent>> {
        while src.has_remaining() {
            if let Some(event) = self.feed(src.get_u8())? {
                return Ok(Some(event));
            }
        }
        Ok(None)
    }
}

/// Position inside a Telnet byte stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParserState {
    /// Content bytes
    Normal,
    /// Received IAC, next byte is a command
    Command,
    /// Received DO/DONT/WILL/WONT, next byte is the option
    OptionArgument(u8),
    /// Inside IAC SB, collecting until IAC SE
    Subnegotiation,
}
