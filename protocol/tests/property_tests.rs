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


//! Property tests for the Telnet parser

use faketelnetd_protocol::consts::{DO, DONT, IAC, SB, SE, WILL, WONT, option};
use faketelnetd_protocol::{EchoState, TelnetEvent, TelnetParser};
use proptest::prelude::*;

fn echo_command() -> impl Strategy<Value = u8> {
    prop_oneof![Just(DO), Just(DONT), Just(WILL), Just(WONT)]
}

fn collect_data(parser: &mut TelnetParser, input: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    for &byte in input {
        if let Some(TelnetEvent::Data(byte)) = parser.feed(byte).unwrap() {
            data.push(byte);
        }
    }
    data
}

proptest! {
    #[test]
    fn echo_replies_only_on_state_change(commands in prop::collection::vec(echo_command(), 0..64)) {
        let mut parser = TelnetParser::new();
        let mut local = EchoState::Unknown;
        let mut peer = EchoState::Unknown;

        for command in commands {
            let expected = match command {
                DO => EchoState::On,
                DONT => EchoState::Off,
                WILL => EchoState::On,
                _ => EchoState::Off,
            };
            let changed = if command == DO || command == DONT {
                let changed = local != expected;
                local = expected;
                changed
            } else {
                let changed = peer != expected;
                peer = expected;
                changed
            };

            for byte in [IAC, command, option::ECHO] {
                parser.feed(byte).unwrap();
            }
            let replies = parser.take_replies();
            prop_assert_eq!(replies.is_some(), changed);
            if let Some(replies) = replies {
                prop_assert_eq!(replies.len(), 3);
                prop_assert_eq!(replies[0], IAC);
                prop_assert_eq!(replies[2], option::ECHO);
            }
            prop_assert_eq!(parser.local_echo(), local);
            prop_assert_eq!(parser.peer_echo(), peer);
        }
    }

    #[test]
    fn subnegotiation_content_is_never_delivered(
        prefix in "[a-z]{0,16}",
        payload in prop::collection::vec(0u8..=254, 0..256),
        suffix in "[a-z]{0,16}",
    ) {
        let mut input = prefix.clone().into_bytes();
        input.extend_from_slice(&[IAC, SB]);
        input.extend_from_slice(&payload);
        input.extend_from_slice(&[IAC, SE]);
        input.extend_from_slice(suffix.as_bytes());

        let mut parser = TelnetParser::new();
        let data = collect_data(&mut parser, &input);
        prop_assert_eq!(data, [prefix.as_bytes(), suffix.as_bytes()].concat());
    }

    #[test]
    fn plain_text_passes_through(text in "[ -~]{0,128}") {
        let mut parser = TelnetParser::new();
        let data = collect_data(&mut parser, text.as_bytes());
        prop_assert_eq!(data, text.into_bytes());
        prop_assert!(!parser.has_pending_replies());
    }
}
