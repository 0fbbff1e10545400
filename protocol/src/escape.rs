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


//! Terminal escape suppression
//!
//! Interactive clients send cursor and function keys as short `ESC`-prefixed sequences.
//! They mean nothing to a line-oriented login prompt, so the bytes are dropped before
//! they reach the line buffer. Only the common arrow, home/end, delete and SS3 keys are
//! recognised; rarer sequences pass through untouched.

use crate::consts::ESC;
use std::collections::VecDeque;

/// Number of bytes the filter looks back over, including the current one.
pub const ESCAPE_WINDOW: usize = 5;

/// Sliding window over the content bytes consumed since the last delivered character.
#[derive(Debug, Clone, Default)]
pub struct EscapeFilter {
    window: VecDeque<u8>,
}

impl EscapeFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self {
            window: VecDeque::with_capacity(ESCAPE_WINDOW),
        }
    }

    /// Record `byte` and decide whether it is deliverable.
    ///
    /// Returns `false` when the byte belongs to an escape sequence. A delivered byte
    /// clears the window, so each lookback only spans the bytes swallowed since the
    /// previous character.
    pub fn accept(&mut self, byte: u8) -> bool {
        if self.window.len() == ESCAPE_WINDOW {
            self.window.pop_back();
        }
        self.window.push_front(byte);

        if self.is_escape() {
            return false;
        }
        self.window.clear();
        true
    }

    fn at(&self, back: usize) -> Option<u8> {
        self.window.get(back).copied()
    }

    fn matches(&self, tail: &[u8]) -> bool {
        tail.iter()
            .enumerate()
            .all(|(offset, expected)| self.at(offset + 1) == Some(*expected))
    }

    fn is_escape(&self) -> bool {
        self.at(0) == Some(ESC)
            // ESC x
            || self.matches(&[ESC])
            // ESC [ x
            || self.matches(&[b'[', ESC])
            // ESC [ 1 x
            || self.matches(&[b'1', b'[', ESC])
            // ESC [ 1 y x
            || (self.at(2) == Some(b'1') && self.at(3) == Some(b'[') && self.at(4) == Some(ESC))
            // ESC [ 3 x
            || self.matches(&[b'3', b'[', ESC])
            // ESC O x
            || self.matches(&[b'O', ESC])
    }
}
