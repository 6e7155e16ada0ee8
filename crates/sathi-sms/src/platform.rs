//! Host implementations of the injected collaborators.
//!
//! On a desktop or server host the SMS modem and the dialer are driven by
//! external commands configured as argument templates. `{to}` and `{message}`
//! are substituted per argument, so values never pass through a shell.

use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::alert::{AlertError, Dialer, Location, Locator};
use crate::traits::{SendPermission, SmsTransport, UserNotifier};
use crate::{Result, SmsError};

/// A program plus argument templates.
#[derive(Debug, Clone, Default)]
struct CommandTemplate {
    parts: Vec<String>,
}

impl CommandTemplate {
    fn new(parts: &[String]) -> Self {
        Self {
            parts: parts.iter().filter(|p| !p.is_empty()).cloned().collect(),
        }
    }

    fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    fn render(&self, to: &str, message: &str) -> Option<Command> {
        let (program, args) = self.parts.split_first()?;
        let mut cmd = Command::new(program);
        for arg in args {
            cmd.arg(arg.replace("{to}", to).replace("{message}", message));
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Some(cmd)
    }
}

/// Runs a command and returns its stdout, or a message describing the failure.
async fn run(mut cmd: Command) -> std::result::Result<String, String> {
    debug!("Running command: {:?}", cmd);

    let output = cmd
        .output()
        .await
        .map_err(|e| format!("Failed to run command: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        return Err(if stderr.is_empty() {
            format!("command exited with {}", output.status)
        } else {
            stderr.to_string()
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// SMS transport that shells out to a configured command.
#[derive(Debug, Clone)]
pub struct CommandTransport {
    template: CommandTemplate,
}

impl CommandTransport {
    /// Build from an argument template such as
    /// `["sms-send", "--to", "{to}", "--text", "{message}"]`.
    pub fn from_template(template: &[String]) -> Self {
        Self {
            template: CommandTemplate::new(template),
        }
    }
}

#[async_trait]
impl SmsTransport for CommandTransport {
    fn is_supported(&self) -> bool {
        !self.template.is_empty()
    }

    async fn send(&self, destination: &str, message: &str) -> Result<Value> {
        let cmd = self
            .template
            .render(destination, message)
            .ok_or(SmsError::Unsupported)?;

        let stdout = run(cmd).await.map_err(SmsError::Transport)?;
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(Value::Bool(true));
        }
        Ok(serde_json::from_str(stdout).unwrap_or(Value::Bool(true)))
    }
}

/// Dialer that shells out to a configured command.
#[derive(Debug, Clone)]
pub struct CommandDialer {
    template: CommandTemplate,
    permitted: bool,
}

impl CommandDialer {
    /// Build from an argument template containing `{to}`.
    pub fn from_template(template: &[String], permitted: bool) -> Self {
        Self {
            template: CommandTemplate::new(template),
            permitted,
        }
    }
}

#[async_trait]
impl Dialer for CommandDialer {
    async fn ensure_call_permission(&self) -> bool {
        self.permitted
    }

    async fn dial(&self, number: &str) -> std::result::Result<(), AlertError> {
        let cmd = self
            .template
            .render(number, "")
            .ok_or_else(|| AlertError::Call("no call command configured".to_string()))?;
        run(cmd).await.map(|_| ()).map_err(AlertError::Call)
    }
}

/// Permission fixed by configuration.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission(pub bool);

#[async_trait]
impl SendPermission for StaticPermission {
    async fn ensure_granted(&self) -> bool {
        self.0
    }
}

/// Notifier that writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl UserNotifier for TracingNotifier {
    fn notify(&self, title: &str, message: &str) {
        warn!(title, "{}", message);
    }
}

/// Locator that always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Location);

#[async_trait]
impl Locator for FixedLocator {
    async fn current_location(&self) -> std::result::Result<Location, AlertError> {
        Ok(self.0)
    }
}
