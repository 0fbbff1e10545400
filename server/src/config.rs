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


//! Typed daemon configuration built from [`Settings`]

use crate::hooks::{ExecHook, HookKind};
use crate::shell::{ShellConfig, ShellHooks};
use crate::{ConfigError, Settings};
use faketelnetd_service::ServerConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Keys that must be present in every settings file
pub const REQUIRED_SETTINGS: [&str; 7] = [
    "logfile",
    "listen",
    "fumsg",
    "valid_user",
    "valid_pass",
    "max_login_attempts",
    "max_thread_count",
];

/// Everything the daemon needs, validated up front
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Append-only log file
    pub logfile: PathBuf,
    /// TCP port to listen on
    pub listen: u16,
    /// Interface to bind (`bind_address`, default all interfaces)
    pub bind_address: IpAddr,
    /// Record DEBUG events as well
    pub debug: bool,
    /// Stay attached to the terminal
    pub interactive: bool,
    /// Admission ceiling
    pub max_thread_count: usize,
    /// Fake shell behaviour
    pub shell: ShellConfig,
}

impl DaemonConfig {
    /// Validate `settings` and convert every value.
    ///
    /// All required keys are checked before any of them is converted, so a missing key is
    /// reported ahead of a malformed one.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        for name in REQUIRED_SETTINGS {
            settings.get_required(name)?;
        }

        let hooks = ShellHooks {
            connect: hook(settings, HookKind::Connect),
            login: hook(settings, HookKind::Login),
            login_fail: hook(settings, HookKind::LoginFail),
            command: hook(settings, HookKind::Command),
        };
        let shell = ShellConfig::new(
            settings.get_required("fumsg")?,
            settings.get_required("valid_user")?,
            settings.get_required("valid_pass")?,
            settings.get_required_as("max_login_attempts")?,
        )
        .with_hooks(hooks);

        Ok(Self {
            logfile: PathBuf::from(settings.get_required("logfile")?),
            listen: settings.get_required_as("listen")?,
            bind_address: settings
                .get_optional_as("bind_address", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            debug: settings.get_optional_as::<u8>("debug", 0)? == 1,
            interactive: settings.get_optional_as::<u8>("interactive", 0)? == 1,
            max_thread_count: settings.get_required_as("max_thread_count")?,
            shell,
        })
    }

    /// Socket address the listener binds
    pub fn listen_address(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.listen)
    }

    /// Service configuration derived from these settings
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.listen_address()).with_max_connections(self.max_thread_count)
    }
}

fn hook(settings: &Settings, kind: HookKind) -> Option<ExecHook> {
    ExecHook::new(kind, settings.get_optional(kind.setting_name(), ""))
}
