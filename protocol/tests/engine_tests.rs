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


//! Engine tests over an in-memory pipe

use faketelnetd_protocol::consts::{self, DO, DONT, IAC, SB, SE, WILL, WONT, option};
use faketelnetd_protocol::{EchoState, ProtocolError, TelnetEngine, TelnetParser};
use faketelnetd_transport::TransportChannel;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

const INIT_SEQUENCE: [u8; 9] = [
    IAC,
    DO,
    option::LINEMODE,
    IAC,
    DONT,
    option::ECHO,
    IAC,
    WILL,
    option::ECHO,
];

fn create_engine() -> (TelnetEngine<DuplexStream>, DuplexStream) {
    let (local, remote) = duplex(8192);
    let channel = TransportChannel::new(local, "198.51.100.23:50000".parse().unwrap());
    (TelnetEngine::new(channel), remote)
}

async fn read_n(remote: &mut DuplexStream, count: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; count];
    remote.read_exact(&mut buffer).await.unwrap();
    buffer
}

async fn initialised_engine() -> (TelnetEngine<DuplexStream>, DuplexStream) {
    let (mut engine, mut remote) = create_engine();
    engine.init().await.unwrap();
    assert_eq!(read_n(&mut remote, INIT_SEQUENCE.len()).await, INIT_SEQUENCE);
    (engine, remote)
}

#[tokio::test]
async fn test_init_sequence_order() {
    let (engine, _remote) = initialised_engine().await;
    assert_eq!(engine.local_echo(), EchoState::On);
    assert_eq!(engine.peer_echo(), EchoState::Off);
}

#[tokio::test]
async fn test_line_with_crlf() {
    let (mut engine, mut remote) = initialised_engine().await;
    remote.write_all(b"hello\r\nx").await.unwrap();

    assert_eq!(engine.next_line(false).await.unwrap(), "hello");
    // The LF was consumed together with the CR
    assert_eq!(engine.next_char().await.unwrap(), b'x');

    assert_eq!(read_n(&mut remote, 7).await, b"hello\r\n");
}

#[tokio::test]
async fn test_line_with_cr_nul() {
    let (mut engine, mut remote) = create_engine();
    remote.write_all(b"dir\r\0exit\r\0").await.unwrap();

    assert_eq!(engine.next_line(false).await.unwrap(), "dir");
    assert_eq!(engine.next_line(false).await.unwrap(), "exit");
}

#[tokio::test]
async fn test_backspace_erases_and_echoes() {
    let (mut engine, mut remote) = initialised_engine().await;
    remote.write_all(&[b'A', consts::DEL, b'\r', b'\n']).await.unwrap();

    assert_eq!(engine.next_line(false).await.unwrap(), "");
    assert_eq!(read_n(&mut remote, 6).await, b"A\x08 \x08\r\n");
}

#[tokio::test]
async fn test_ctrl_h_erases() {
    let (mut engine, mut remote) = create_engine();
    remote.write_all(&[b'a', b'b', consts::BS, b'c', b'\r', b'\n']).await.unwrap();

    assert_eq!(engine.next_line(false).await.unwrap(), "ac");
}

#[tokio::test]
async fn test_backspace_erases_whole_multibyte_character() {
    let (mut engine, mut remote) = initialised_engine().await;
    remote
        .write_all("aé\x7f€\x7fb\r\n".as_bytes())
        .await
        .unwrap();

    assert_eq!(engine.next_line(false).await.unwrap(), "ab");

    // One erase sequence per character, however many bytes it took
    let mut expected = Vec::new();
    expected.extend_from_slice("aé".as_bytes());
    expected.extend_from_slice(b"\x08 \x08");
    expected.extend_from_slice("€".as_bytes());
    expected.extend_from_slice(b"\x08 \x08b\r\n");
    assert_eq!(read_n(&mut remote, expected.len()).await, expected);
}

#[tokio::test]
async fn test_raw_line_keeps_non_utf8_bytes() {
    let (mut engine, mut remote) = create_engine();
    remote.write_all(&[b'o', 0xFE, b'k', b'\r', b'\n']).await.unwrap();
    remote.write_all(&[0xC3, b'\r', b'\n']).await.unwrap();

    assert_eq!(engine.next_line_bytes(false).await.unwrap(), vec![b'o', 0xFE, b'k']);
    assert_eq!(engine.next_line(false).await.unwrap(), "\u{FFFD}");
    assert_eq!(engine.channel().bytes_received(), 8);
}

#[tokio::test]
async fn test_backspace_on_empty_line_is_silent() {
    let (mut engine, mut remote) = initialised_engine().await;
    remote
        .write_all(&[consts::DEL, consts::BS, b'a', b'\r', b'\n'])
        .await
        .unwrap();

    assert_eq!(engine.next_line(false).await.unwrap(), "a");
    drop(engine);

    let mut echoed = Vec::new();
    remote.read_to_end(&mut echoed).await.unwrap();
    assert_eq!(echoed, b"a\r\n");
}

#[tokio::test]
async fn test_hidden_line_only_echoes_newline() {
    let (mut engine, mut remote) = initialised_engine().await;
    remote.write_all(b"s3cr3t\x7f!\r\n").await.unwrap();

    assert_eq!(engine.next_line(true).await.unwrap(), "s3cr3!");
    drop(engine);

    let mut echoed = Vec::new();
    remote.read_to_end(&mut echoed).await.unwrap();
    assert_eq!(echoed, b"\r\n");
}

#[tokio::test]
async fn test_no_echo_before_negotiation() {
    let (mut engine, mut remote) = create_engine();
    remote.write_all(b"hi\r\n").await.unwrap();

    assert_eq!(engine.next_line(false).await.unwrap(), "hi");
    drop(engine);

    let mut echoed = Vec::new();
    remote.read_to_end(&mut echoed).await.unwrap();
    assert!(echoed.is_empty());
}

#[tokio::test]
async fn test_dont_echo_stops_echo() {
    let (mut engine, mut remote) = initialised_engine().await;
    remote.write_all(&[IAC, DONT, option::ECHO]).await.unwrap();
    remote.write_all(b"ab\r\n").await.unwrap();

    assert_eq!(engine.next_line(false).await.unwrap(), "ab");
    assert_eq!(engine.local_echo(), EchoState::Off);
    drop(engine);

    let mut echoed = Vec::new();
    remote.read_to_end(&mut echoed).await.unwrap();
    assert_eq!(echoed, [IAC, WONT, option::ECHO]);
}

#[tokio::test]
async fn test_repeated_do_echo_is_not_answered() {
    let (mut engine, mut remote) = initialised_engine().await;
    remote
        .write_all(&[IAC, DO, option::ECHO, IAC, WILL, option::ECHO, b'q'])
        .await
        .unwrap();

    assert_eq!(engine.next_char().await.unwrap(), b'q');
    drop(engine);

    // DO ECHO matches the cached state; WILL ECHO flips peer echo and is answered
    let mut replies = Vec::new();
    remote.read_to_end(&mut replies).await.unwrap();
    assert_eq!(replies, [IAC, DO, option::ECHO]);
}

#[tokio::test]
async fn test_escape_sequence_between_characters() {
    let (mut engine, mut remote) = create_engine();
    remote.write_all(b"x\x1b[Ay").await.unwrap();

    assert_eq!(engine.next_char().await.unwrap(), b'x');
    assert_eq!(engine.next_char().await.unwrap(), b'y');
}

#[tokio::test]
async fn test_subnegotiation_is_invisible() {
    let (mut engine, mut remote) = create_engine();
    remote.write_all(b"a").await.unwrap();
    remote
        .write_all(&[IAC, SB, option::NAWS, 0, 80, 0, 24, IAC, SE])
        .await
        .unwrap();
    remote.write_all(b"b\r\n").await.unwrap();

    assert_eq!(engine.next_line(false).await.unwrap(), "ab");
}

#[tokio::test]
async fn test_linemode_subnegotiation_is_answered() {
    let (mut engine, mut remote) = create_engine();
    remote
        .write_all(&[IAC, WILL, option::LINEMODE])
        .await
        .unwrap();
    remote
        .write_all(&[IAC, SB, option::LINEMODE, option::linemode::SLC, 1, 2, 3, IAC, SE, b'z'])
        .await
        .unwrap();

    assert_eq!(engine.next_char().await.unwrap(), b'z');
    assert_eq!(
        read_n(&mut remote, 7).await,
        [IAC, SB, option::LINEMODE, option::linemode::MODE, 0, IAC, SE]
    );
}

#[tokio::test]
async fn test_overflowing_subnegotiation_fails_connection() {
    let (local, mut remote) = duplex(8192);
    let channel = TransportChannel::new(local, "198.51.100.23:50000".parse().unwrap());
    let mut engine = TelnetEngine::with_parser(channel, TelnetParser::with_max_subnegotiation(16));

    remote.write_all(&[IAC, SB, option::TTYPE]).await.unwrap();
    remote.write_all(&[b'x'; 64]).await.unwrap();

    let err = engine.next_char().await.unwrap_err();
    assert!(matches!(err, ProtocolError::SubnegotiationOverflow { limit: 16 }));
}

#[tokio::test]
async fn test_disconnect_mid_line() {
    let (mut engine, mut remote) = create_engine();
    remote.write_all(b"adm").await.unwrap();
    drop(remote);

    let err = engine.next_line(false).await.unwrap_err();
    assert!(err.is_disconnect());
}

#[tokio::test]
async fn test_send_and_peer_address() {
    let (mut engine, mut remote) = create_engine();
    assert_eq!(engine.peer_address_string(), "198.51.100.23");

    engine.send("login: ").await.unwrap();
    engine.send_byte(b'>').await.unwrap();
    assert_eq!(read_n(&mut remote, 8).await, b"login: >");
    assert_eq!(engine.channel().bytes_sent(), 8);
}

#[tokio::test]
async fn test_explicit_echo_changes() {
    let (mut engine, mut remote) = create_engine();
    assert!(engine.set_local_echo(true).await.unwrap());
    assert!(!engine.set_local_echo(true).await.unwrap());
    assert!(engine.set_peer_echo(true).await.unwrap());
    engine.request_linemode().await.unwrap();

    assert_eq!(
        read_n(&mut remote, 9).await,
        [IAC, WILL, option::ECHO, IAC, DO, option::ECHO, IAC, DO, option::LINEMODE]
    );
}
