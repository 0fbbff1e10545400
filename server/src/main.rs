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


//! faketelnetd entry point
//!
//! `faketelnetd [SETTINGS_FILE]`

use faketelnetd::{DEFAULT_SETTINGS_PATH, StartupError};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH), PathBuf::from);

    match faketelnetd::run(&settings_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("Fatal Error: {}", err);
            eprintln!("Fatal Error: {err}");
            ExitCode::from(StartupError::EXIT_CODE)
        }
    }
}
