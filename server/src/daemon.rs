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


//! Detaching from the controlling terminal

use crate::StartupError;
use nix::unistd::{ForkResult, fork, setsid};
use std::io::{self, Write};

/// Fork into the background.
///
/// The parent exits with status 0; the child becomes a session leader and returns. Must be
/// called while the process is still single threaded, before the async runtime is built.
pub fn daemonize() -> Result<(), StartupError> {
    // Anything still buffered would otherwise be written twice
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();

    // SAFETY: no other thread exists yet, so the child cannot inherit a held lock
    match unsafe { fork() }.map_err(StartupError::Daemonize)? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => {
            setsid().map_err(StartupError::Daemonize)?;
            Ok(())
        }
    }
}
