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


//! Fake Windows Telnet shell
//!
//! Presents the NTLM failure banner, a login prompt and a `C:\Documents and Settings`
//! prompt that understands just enough (`dir`, `exit`) to keep a visitor typing. Every
//! credential pair and command is logged and can trigger an [`ExecHook`].

use crate::hooks::{ExecHook, HookContext};
use async_trait::async_trait;
use faketelnetd_protocol::TelnetEngine;
use faketelnetd_service::{ConnectionId, Result, SessionHandler};
use metrics::counter;
use std::time::Duration;
use tracing::{debug, info};

/// Sent right after negotiation
pub const BANNER: &str = "Telnet server could not log you in using NTML authentication.\r\n\
Your password may have expired.\r\n\
Login using username and password\r\n\
\r\n\
Welcome to Microsoft Telnet Service\r\n\
\r\n";

/// Output of the `dir` command
pub const DIR_LISTING: &str = "\
08/11/2008   12:30 PM        <DIR>          .\r\n\
08/11/2008   12:30 PM        <DIR>          ..\r\n\
08/11/2008   12:30 PM        <DIR>          ..\r\n\
08/11/2008   12:30 PM        <DIR>          Start Menu\r\n\
08/11/2008   12:30 PM        <DIR>          My Documents\r\n\
08/11/2008   12:30 PM        <DIR>          Favorites\r\n\
08/11/2008   12:30 PM        <DIR>          Desktop\r\n";

/// Hooks run by the shell; `None` disables one
#[derive(Debug, Clone, Default)]
pub struct ShellHooks {
    /// `connect_exec`
    pub connect: Option<ExecHook>,
    /// `login_exec`
    pub login: Option<ExecHook>,
    /// `login_fail_exec`
    pub login_fail: Option<ExecHook>,
    /// `cmd_exec`
    pub command: Option<ExecHook>,
}

/// Fake shell behaviour
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Printed for any unrecognised command, right before hanging up
    pub fumsg: String,
    /// The one user name that "logs in"
    pub valid_user: String,
    /// Its password
    pub valid_pass: String,
    /// Attempts allowed before disconnecting
    pub max_login_attempts: u32,
    /// Pause after a failed login
    pub failure_delay: Duration,
    /// Hook commands
    pub hooks: ShellHooks,
}

impl ShellConfig {
    /// Shell with a one second failure delay and no hooks
    pub fn new(
        fumsg: impl Into<String>,
        valid_user: impl Into<String>,
        valid_pass: impl Into<String>,
        max_login_attempts: u32,
    ) -> Self {
        Self {
            fumsg: fumsg.into(),
            valid_user: valid_user.into(),
            valid_pass: valid_pass.into(),
            max_login_attempts,
            failure_delay: Duration::from_secs(1),
            hooks: ShellHooks::default(),
        }
    }

    /// Set the pause after a failed login
    pub fn with_failure_delay(mut self, delay: Duration) -> Self {
        self.failure_delay = delay;
        self
    }

    /// Set the hook commands
    pub fn with_hooks(mut self, hooks: ShellHooks) -> Self {
        self.hooks = hooks;
        self
    }
}

struct Credentials {
    user: String,
    pass: String,
}

/// [`SessionHandler`] playing a Windows Telnet server
#[derive(Debug, Clone)]
pub struct FakeShell {
    config: ShellConfig,
}

impl FakeShell {
    /// Create the shell
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }

    /// The shell configuration
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    async fn login(&self, engine: &mut TelnetEngine, ip: &str) -> Result<Option<Credentials>> {
        for _ in 0..self.config.max_login_attempts {
            engine.send("login: ").await?;
            let user = engine.next_line(false).await?;
            debug!("Received username {}", user);

            engine.send("password: ").await?;
            let pass = engine.next_line(true).await?;
            engine.send("\r\n").await?;

            let context = HookContext {
                ip: Some(ip),
                user: Some(&user),
                pass: Some(&pass),
                cmd: None,
            };

            if user == self.config.valid_user && pass == self.config.valid_pass {
                counter!("faketelnetd.logins.succeeded").increment(1);
                info!("Successful login from {} with credentials {}:{}", ip, user, pass);
                run_hook(self.config.hooks.login.as_ref(), &context).await;
                return Ok(Some(Credentials { user, pass }));
            }

            tokio::time::sleep(self.config.failure_delay).await;
            engine.send("\r\n").await?;
            counter!("faketelnetd.logins.failed").increment(1);
            info!("Failed login from {} with credentials {}:{}", ip, user, pass);
            run_hook(self.config.hooks.login_fail.as_ref(), &context).await;
        }
        Ok(None)
    }

    async fn command_loop(
        &self,
        engine: &mut TelnetEngine,
        ip: &str,
        credentials: &Credentials,
    ) -> Result<()> {
        loop {
            engine
                .send(&format!("C:\\Documents and Settings\\{}>", credentials.user))
                .await?;
            let line = engine.next_line(false).await?;
            counter!("faketelnetd.commands").increment(1);
            info!("{}@{} entered command: {}", credentials.user, ip, line);

            let context = HookContext {
                ip: Some(ip),
                user: Some(&credentials.user),
                pass: Some(&credentials.pass),
                cmd: Some(&line),
            };
            run_hook(self.config.hooks.command.as_ref(), &context).await;

            match line.as_str() {
                "dir" => engine.send(DIR_LISTING).await?,
                "exit" | "logout" | "quit" => return Ok(()),
                _ => {
                    engine.send(&self.config.fumsg).await?;
                    engine.send("\r\n").await?;
                    return Ok(());
                }
            }
        }
    }
}

#[async_trait]
impl SessionHandler for FakeShell {
    async fn run(&self, _id: ConnectionId, engine: &mut TelnetEngine) -> Result<()> {
        let ip = engine.peer_address_string().to_string();

        let context = HookContext {
            ip: Some(&ip),
            ..HookContext::default()
        };
        run_hook(self.config.hooks.connect.as_ref(), &context).await;

        engine.send(BANNER).await?;

        match self.login(engine, &ip).await? {
            Some(credentials) => self.command_loop(engine, &ip, &credentials).await?,
            None => info!(
                "Disconnecting {} after max login attempts of {}",
                ip, self.config.max_login_attempts
            ),
        }

        info!("Ending session from {}", ip);
        Ok(())
    }
}

async fn run_hook(hook: Option<&ExecHook>, context: &HookContext<'_>) {
    if let Some(hook) = hook {
        hook.run(context).await;
    }
}
