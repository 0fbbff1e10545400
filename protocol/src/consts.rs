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


//! Telnet protocol constants (RFC 854, RFC 857, RFC 1184)

/// Null, sent after a bare carriage return
pub const NUL: u8 = 0x00;
/// Bell
pub const BEL: u8 = 0x07;
/// Backspace (^H)
pub const BS: u8 = 0x08;
/// Horizontal Tab
pub const HT: u8 = 0x09;
/// Line Feed
pub const LF: u8 = 0x0A;
/// Vertical Tab
pub const VT: u8 = 0x0B;
/// Form Feed
pub const FF: u8 = 0x0C;
/// Carriage Return
pub const CR: u8 = 0x0D;
/// Escape, introduces terminal control sequences
pub const ESC: u8 = 0x1B;
/// Delete, sent by most terminals for the backspace key
pub const DEL: u8 = 0x7F;

/// End of Record
pub const EOR: u8 = 239;
/// Subnegotiation End
pub const SE: u8 = 240;
/// No Operation
pub const NOP: u8 = 241;
/// Data Mark
pub const DM: u8 = 242;
/// Break
pub const BRK: u8 = 243;
/// Interrupt Process
pub const IP: u8 = 244;
/// Abort Output
pub const AO: u8 = 245;
/// Are You There
pub const AYT: u8 = 246;
/// Erase Character
pub const EC: u8 = 247;
/// Erase Line
pub const EL: u8 = 248;
/// Go Ahead
pub const GA: u8 = 249;
/// Subnegotiation Begin
pub const SB: u8 = 250;
/// Sender wants to enable an option
pub const WILL: u8 = 251;
/// Sender refuses an option
pub const WONT: u8 = 252;
/// Sender asks the receiver to enable an option
pub const DO: u8 = 253;
/// Sender asks the receiver to disable an option
pub const DONT: u8 = 254;
/// Interpret As Command
pub const IAC: u8 = 255;

/// Telnet option codes
pub mod option {
    /// Binary Transmission
    pub const BINARY: u8 = 0;
    /// Echo
    pub const ECHO: u8 = 1;
    /// Suppress Go Ahead
    pub const SGA: u8 = 3;
    /// Status
    pub const STATUS: u8 = 5;
    /// Timing Mark
    pub const TIMING_MARK: u8 = 6;
    /// Terminal Type
    pub const TTYPE: u8 = 24;
    /// End of Record
    pub const EOR: u8 = 25;
    /// Negotiate About Window Size
    pub const NAWS: u8 = 31;
    /// Terminal Speed
    pub const TSPEED: u8 = 32;
    /// Remote Flow Control
    pub const LFLOW: u8 = 33;
    /// Line Mode
    pub const LINEMODE: u8 = 34;
    /// X Display Location
    pub const XDISPLOC: u8 = 35;
    /// Environment (old)
    pub const ENVIRON: u8 = 36;
    /// New Environment
    pub const NEW_ENVIRON: u8 = 39;

    /// Line Mode subnegotiation commands and MODE mask bits
    pub mod linemode {
        /// MODE subcommand
        pub const MODE: u8 = 1;
        /// FORWARDMASK subcommand
        pub const FORWARDMASK: u8 = 2;
        /// SLC subcommand
        pub const SLC: u8 = 3;

        /// Client performs line editing
        pub const MODE_EDIT: u8 = 0x01;
        /// Client traps interrupt signals
        pub const MODE_TRAPSIG: u8 = 0x02;
        /// Acknowledges a mode change
        pub const MODE_ACK: u8 = 0x04;
        /// Client expands tabs
        pub const MODE_SOFT_TAB: u8 = 0x08;
        /// Client echoes non-printables literally
        pub const MODE_LIT_ECHO: u8 = 0x10;
    }
}

/// Human readable name of a Telnet command byte, for logs.
pub fn command_name(byte: u8) -> &'static str {
    match byte {
        EOR => "EOR",
        SE => "SE",
        NOP => "NOP",
        DM => "DM",
        BRK => "BRK",
        IP => "IP",
        AO => "AO",
        AYT => "AYT",
        EC => "EC",
        EL => "EL",
        GA => "GA",
        SB => "SB",
        WILL => "WILL",
        WONT => "WONT",
        DO => "DO",
        DONT => "DONT",
        IAC => "IAC",
        _ => "UNKNOWN",
    }
}

/// Human readable name of a Telnet option byte, for logs.
pub fn option_name(byte: u8) -> &'static str {
    match byte {
        option::BINARY => "BINARY",
        option::ECHO => "ECHO",
        option::SGA => "SUPPRESS-GO-AHEAD",
        option::STATUS => "STATUS",
        option::TIMING_MARK => "TIMING-MARK",
        option::TTYPE => "TERMINAL-TYPE",
        option::EOR => "END-OF-RECORD",
        option::NAWS => "NAWS",
        option::TSPEED => "TERMINAL-SPEED",
        option::LFLOW => "TOGGLE-FLOW-CONTROL",
        option::LINEMODE => "LINEMODE",
        option::XDISPLOC => "X-DISPLAY-LOCATION",
        option::ENVIRON => "ENVIRON",
        option::NEW_ENVIRON => "NEW-ENVIRON",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(command_name(DO), "DO");
        assert_eq!(command_name(SE), "SE");
        assert_eq!(command_name(0x10), "UNKNOWN");
        assert_eq!(option_name(option::ECHO), "ECHO");
        assert_eq!(option_name(option::LINEMODE), "LINEMODE");
        assert_eq!(option_name(200), "UNKNOWN");
    }
}
