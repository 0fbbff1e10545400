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


use crate::consts;
use bytes::Bytes;
use std::fmt;

/// Outcome of feeding one byte to the [`TelnetParser`](crate::TelnetParser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelnetEvent {
    /// A printable content byte for the caller
    Data(u8),
    /// A content byte swallowed as part of a terminal escape sequence
    Suppressed(u8),
    /// A bare `IAC <command>` that carries no argument
    Command(u8),
    /// `IAC DO|DONT|WILL|WONT <option>`
    Negotiation {
        /// DO, DONT, WILL or WONT
        command: u8,
        /// Option code
        option: u8,
    },
    /// Payload of `IAC SB ... IAC SE`, terminator removed; the first byte is the option
    Subnegotiation(Bytes),
}

impl fmt::Display for TelnetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelnetEvent::Data(byte) => write!(f, "data {byte:#04X}"),
            TelnetEvent::Suppressed(byte) => write!(f, "escape byte {byte:#04X}"),
            TelnetEvent::Command(command) => {
                write!(f, "IAC {} ({command:#04X})", consts::command_name(*command))
            }
            TelnetEvent::Negotiation { command, option } => write!(
                f,
                "IAC {} {} ({option})",
                consts::command_name(*command),
                consts::option_name(*option)
            ),
            TelnetEvent::Subnegotiation(payload) => match payload.first() {
                Some(option) => write!(
                    f,
                    "IAC SB {} ({} bytes) IAC SE",
                    consts::option_name(*option),
                    payload.len() - 1
                ),
                None => write!(f, "IAC SB IAC SE"),
            },
        }
    }
}
