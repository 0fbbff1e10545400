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


//! Startup failures reported before the daemon detaches

use faketelnetd::{ConfigError, StartupError};
use std::io::Write;

#[test]
fn test_missing_settings_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = faketelnetd::run(&dir.path().join("absent.conf")).unwrap_err();
    assert!(matches!(err, StartupError::Config(ConfigError::Read { .. })));
}

#[test]
fn test_incomplete_settings_are_fatal() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "listen=2323").unwrap();
    writeln!(file, "fumsg=nope").unwrap();

    let err = faketelnetd::run(file.path()).unwrap_err();
    assert!(matches!(err, StartupError::Config(ConfigError::Missing(_))));
    assert_eq!(err.to_string(), "Setting logfile is undefined.");
}
