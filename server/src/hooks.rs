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


//! Operator configured shell commands run on session events

use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

/// Session event a hook is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// A peer connected
    Connect,
    /// A login matched the configured credentials
    Login,
    /// A login attempt failed
    LoginFail,
    /// A command was entered at the fake prompt
    Command,
}

impl HookKind {
    /// Settings key the hook is configured under
    pub fn setting_name(self) -> &'static str {
        match self {
            HookKind::Connect => "connect_exec",
            HookKind::Login => "login_exec",
            HookKind::LoginFail => "login_fail_exec",
            HookKind::Command => "cmd_exec",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.setting_name())
    }
}

/// Values substituted into a hook template.
///
/// Placeholders whose value is `None` are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookContext<'a> {
    /// Replaces `%ip`
    pub ip: Option<&'a str>,
    /// Replaces `%user`
    pub user: Option<&'a str>,
    /// Replaces `%pass`
    pub pass: Option<&'a str>,
    /// Replaces `%cmd`
    pub cmd: Option<&'a str>,
}

impl<'a> HookContext<'a> {
    /// Placeholder, environment variable carrying its value, and the value
    fn placeholders(&self) -> [(&'static str, &'static str, Option<&'a str>); 4] {
        [
            ("%ip", "FAKETELNETD_IP", self.ip),
            ("%user", "FAKETELNETD_USER", self.user),
            ("%pass", "FAKETELNETD_PASS", self.pass),
            ("%cmd", "FAKETELNETD_CMD", self.cmd),
        ]
    }
}

/// A command template run through `sh -c`.
///
/// Peer supplied values never become part of the command text. Each placeholder is
/// rendered as a reference to an environment variable set on the child, and the shell
/// does not parse the result of a parameter expansion again, so `$(...)` or quotes typed
/// by a visitor stay inert wherever the placeholder sits in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecHook {
    kind: HookKind,
    template: String,
}

impl ExecHook {
    /// Build a hook; an empty template means the hook is disabled.
    pub fn new(kind: HookKind, template: impl Into<String>) -> Option<Self> {
        let template = template.into();
        if template.is_empty() {
            None
        } else {
            Some(Self { kind, template })
        }
    }

    /// The event this hook runs on
    pub fn kind(&self) -> HookKind {
        self.kind
    }

    /// The unexpanded template
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Replace every set placeholder with a quoted variable reference.
    ///
    /// The reference is written to fit the quoting in effect at that point of the
    /// template: `"${VAR}"` outside quotes, `${VAR}` inside double quotes, and
    /// `'"${VAR}"'` inside single quotes. The template is scanned once.
    pub fn render(&self, context: &HookContext<'_>) -> String {
        let placeholders = context.placeholders();
        let mut rendered = String::with_capacity(self.template.len());
        let mut quoting = Quoting::None;
        let mut escaped = false;
        let mut rest = self.template.as_str();

        'scan: while let Some(c) = rest.chars().next() {
            if c == '%' && !escaped {
                for (placeholder, variable, value) in placeholders {
                    if value.is_some() && rest.starts_with(placeholder) {
                        match quoting {
                            Quoting::None => rendered.push_str(&format!("\"${{{variable}}}\"")),
                            Quoting::Double => rendered.push_str(&format!("${{{variable}}}")),
                            Quoting::Single => {
                                rendered.push_str(&format!("'\"${{{variable}}}\"'"));
                            }
                        }
                        rest = &rest[placeholder.len()..];
                        continue 'scan;
                    }
                }
            }

            rendered.push(c);
            rest = &rest[c.len_utf8()..];
            if escaped {
                escaped = false;
                continue;
            }
            quoting = match (quoting, c) {
                (Quoting::None | Quoting::Double, '\\') => {
                    escaped = true;
                    quoting
                }
                (Quoting::None, '\'') => Quoting::Single,
                (Quoting::None, '"') => Quoting::Double,
                (Quoting::Single, '\'') | (Quoting::Double, '"') => Quoting::None,
                (quoting, _) => quoting,
            };
        }
        rendered
    }

    /// Expand and run the hook, waiting for it to exit.
    ///
    /// Returns the exit code, or `None` when the command could not be started or was
    /// killed by a signal. Failures are logged and never propagated. The child is killed
    /// if this future is dropped, for example when its session is aborted.
    pub async fn run(&self, context: &HookContext<'_>) -> Option<i32> {
        let command = self.render(context);
        info!("Running {} '{}'", self.kind, command);

        let mut child = Command::new("sh");
        child
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        for (_, variable, value) in context.placeholders() {
            if let Some(value) = value {
                child.env(variable, value);
            }
        }

        match child.status().await {
            Ok(status) => {
                if let Some(code) = status.code() {
                    info!("{} finished with exit code {}", self.kind, code);
                } else {
                    info!("{} terminated by signal", self.kind);
                }
                status.code()
            }
            Err(err) => {
                warn!(error = %err, "could not start {}", self.kind);
                None
            }
        }
    }
}

/// Shell quoting in effect at a point of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quoting {
    None,
    Single,
    Double,
}
