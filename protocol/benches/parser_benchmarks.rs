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


//! Benchmarks for the byte-level Telnet parser

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use faketelnetd_protocol::consts::{DO, IAC, SB, SE, WILL, option};
use faketelnetd_protocol::{EscapeFilter, TelnetParser};

// ============================================================================
// Parser Benchmarks
// ============================================================================

fn bench_plain_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_plain_data");

    for size in [16, 256, 4096].iter() {
        let data: Vec<u8> = (0..*size).map(|i| b'a' + (i % 26) as u8).collect();
        group.throughput(Throughput::Bytes(*size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let mut parser = TelnetParser::new();
                for &byte in data {
                    black_box(parser.feed(black_box(byte)).unwrap());
                }
            });
        });
    }

    group.finish();
}

fn bench_negotiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_negotiation");

    group.bench_function("echo_toggle", |b| {
        let input = [IAC, DO, option::ECHO, IAC, WILL, option::ECHO];
        b.iter(|| {
            let mut parser = TelnetParser::new();
            for &byte in &input {
                black_box(parser.feed(byte).unwrap());
            }
            black_box(parser.take_replies());
        });
    });

    group.bench_function("naws_subnegotiation", |b| {
        let input = [IAC, SB, option::NAWS, 0, 80, 0, 24, IAC, SE];
        b.iter(|| {
            let mut parser = TelnetParser::new();
            for &byte in &input {
                black_box(parser.feed(byte).unwrap());
            }
        });
    });

    group.finish();
}

fn bench_escape_heavy_input(c: &mut Criterion) {
    let mut group = c.benchmark_group("escape_filter");
    let data: Vec<u8> = b"ls\x1b[A\x1b[B\x1bOA\x1b[3~dir\r\n".repeat(64);
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("arrow_keys", |b| {
        b.iter(|| {
            let mut filter = EscapeFilter::new();
            let mut delivered = 0usize;
            for &byte in &data {
                if filter.accept(black_box(byte)) {
                    delivered += 1;
                }
            }
            black_box(delivered)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_plain_data,
    bench_negotiation,
    bench_escape_heavy_input
);
criterion_main!(benches);
