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


//! Settings file reader
//!
//! The file holds one `name=value` pair per line, split at the first `=`. Lines starting
//! with `#` and empty lines are skipped. Later definitions replace earlier ones.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::{fs, io};

/// Problems with the settings file. All of them abort startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Cannot read settings from {path}: {source}")]
    Read {
        /// File that was requested
        path: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// A line is neither blank, a comment nor a `name=value` pair
    #[error("Syntax error reading settings file {path} at line {line}")]
    Syntax {
        /// Origin of the text
        path: String,
        /// 1-based line number
        line: usize,
    },

    /// A required setting is absent
    #[error("Setting {0} is undefined.")]
    Missing(String),

    /// A setting could not be converted to the expected type
    #[error("Setting {name} has invalid value '{value}': {reason}")]
    Invalid {
        /// Setting name
        name: String,
        /// Offending value
        value: String,
        /// Why the conversion failed
        reason: String,
    },
}

/// Parsed settings file
#[derive(Debug, Clone, Default)]
pub struct Settings {
    origin: String,
    values: HashMap<String, String>,
}

impl Settings {
    /// Read and parse the file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, path.display().to_string())
    }

    /// Parse settings text; `origin` names the text in error messages.
    pub fn parse(text: &str, origin: impl Into<String>) -> Result<Self, ConfigError> {
        let origin = origin.into();
        let mut values = HashMap::new();

        for (index, line) in text.lines().enumerate() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, value)) = line.split_once('=') else {
                return Err(ConfigError::Syntax {
                    path: origin,
                    line: index + 1,
                });
            };
            values.insert(name.to_string(), value.to_string());
        }

        Ok(Self { origin, values })
    }

    /// Where these settings came from
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Raw value of a setting that must be present
    pub fn get_required(&self, name: &str) -> Result<&str, ConfigError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    /// Raw value of a setting, or `default` when absent
    pub fn get_optional<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.values.get(name).map_or(default, String::as_str)
    }

    /// A required setting converted with [`FromStr`]. Surrounding whitespace is ignored.
    pub fn get_required_as<T>(&self, name: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        convert(name, self.get_required(name)?)
    }

    /// An optional setting converted with [`FromStr`], or `default` when absent.
    ///
    /// A present but malformed value is still an error.
    pub fn get_optional_as<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.values.get(name) {
            Some(value) => convert(name, value),
            None => Ok(default),
        }
    }
}

fn convert<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
        name: name.to_string(),
        value: value.to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# faketelnetd settings
logfile=/var/log/faketelnetd.log
listen=23

fumsg=Access denied = go away
max_login_attempts= 3
listen=2323
";

    #[test]
    fn test_parse_sample() {
        let settings = Settings::parse(SAMPLE, "sample").unwrap();
        assert_eq!(settings.values.len(), 4);
        assert_eq!(settings.origin(), "sample");
        assert_eq!(settings.get_required("logfile").unwrap(), "/var/log/faketelnetd.log");
        // Split happens at the first '='
        assert_eq!(settings.get_required("fumsg").unwrap(), "Access denied = go away");
        // Later lines win
        assert_eq!(settings.get_required_as::<u16>("listen").unwrap(), 2323);
        assert_eq!(settings.get_required_as::<u32>("max_login_attempts").unwrap(), 3);
    }

    #[test]
    fn test_missing_and_optional() {
        let settings = Settings::parse(SAMPLE, "sample").unwrap();
        assert!(matches!(
            settings.get_required("valid_user"),
            Err(ConfigError::Missing(name)) if name == "valid_user"
        ));
        assert_eq!(settings.get_optional("connect_exec", ""), "");
        assert_eq!(settings.get_optional("logfile", "x"), "/var/log/faketelnetd.log");
        assert_eq!(settings.get_optional_as("debug", 0u8).unwrap(), 0);
        assert!(!settings.values.contains_key("debug"));
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = Settings::parse("listen=23\n# ok\nbogus line\n", "broken.conf").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax { line: 3, .. }));
        assert_eq!(
            err.to_string(),
            "Syntax error reading settings file broken.conf at line 3"
        );
    }

    #[test]
    fn test_invalid_number() {
        let settings = Settings::parse("listen=telnet\n", "t").unwrap();
        let err = settings.get_required_as::<u16>("listen").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref value, .. } if value == "telnet"));
        assert!(settings.get_optional_as("listen", 23u16).is_err());
    }

    #[test]
    fn test_crlf_lines() {
        let settings = Settings::parse("valid_user=admin\r\nvalid_pass=hunter2\r\n", "t").unwrap();
        assert_eq!(settings.get_required("valid_pass").unwrap(), "hunter2");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.get_required("listen").unwrap(), "2323");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(dir.path().join("absent.conf")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
