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


use std::fmt;

/// Tri-state echo flag.
///
/// `Unknown` means nothing has been negotiated yet, so the first assertion of either
/// value always goes out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoState {
    /// Not negotiated yet
    #[default]
    Unknown,
    /// Echo enabled
    On,
    /// Echo disabled
    Off,
}

impl EchoState {
    /// True only for [`EchoState::On`].
    pub fn is_on(self) -> bool {
        matches!(self, EchoState::On)
    }
}

impl From<bool> for EchoState {
    fn from(value: bool) -> Self {
        if value { EchoState::On } else { EchoState::Off }
    }
}

impl fmt::Display for EchoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EchoState::Unknown => write!(f, "unknown"),
            EchoState::On => write!(f, "on"),
            EchoState::Off => write!(f, "off"),
        }
    }
}
