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


//! Log file sink for the tracing subscriber

use crate::StartupError;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::Level;
use tracing::subscriber::Subscriber;
use tracing_subscriber::fmt::MakeWriter;

/// Shared handle to the append-only log file.
///
/// Every formatted event is written with one `write_all` under the lock, so lines from
/// concurrent sessions never interleave.
#[derive(Debug, Clone)]
pub struct LogFile {
    file: Arc<Mutex<File>>,
}

impl LogFile {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Flush buffered data and sync the file to disk
    pub fn sync(&self) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.flush()?;
        file.sync_data()
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Build the subscriber that formats events into `log_file`.
///
/// INFO and above are recorded, DEBUG too when `debug` is set.
pub fn subscriber(log_file: LogFile, debug: bool) -> impl Subscriber + Send + Sync {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_max_level(level)
        .finish()
}

/// Open the log file and install it as the global subscriber
pub fn init(path: &Path, debug: bool) -> Result<LogFile, StartupError> {
    let log_file = LogFile::open(path).map_err(|source| StartupError::LogFile {
        path: path.display().to_string(),
        source,
    })?;
    tracing::subscriber::set_global_default(subscriber(log_file.clone(), debug))
        .map_err(|err| StartupError::Logging(err.to_string()))?;
    Ok(log_file)
}
