// src/services/browser/driver.rs

//! Browser automation through the external `agent-browser` CLI.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{AppError, Result};
use crate::models::BrowserConfig;
use crate::utils::strip_ansi;

/// Deadline for `--version`.
const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs commands inside named, isolated browser sessions.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Run `args` in `session` and return its cleaned stdout.
    async fn run(&self, session: &str, args: &[&str]) -> Result<String>;

    /// Tool name and version, or an error when the tool is unavailable.
    async fn version(&self) -> Result<String>;
}

/// [`BrowserDriver`] spawning the configured executable per command.
#[derive(Debug, Clone)]
pub struct AgentBrowser {
    binary: String,
    timeout: Duration,
}

impl AgentBrowser {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: config.command_timeout(),
        }
    }

    fn not_found(&self) -> AppError {
        AppError::config(format!(
            "{} not found. Install: npm i -g {}",
            self.binary, self.binary
        ))
    }
}

#[async_trait]
impl BrowserDriver for AgentBrowser {
    async fn run(&self, session: &str, args: &[&str]) -> Result<String> {
        let action = args.first().copied().unwrap_or_default();
        let mut command = Command::new(&self.binary);
        command
            .arg("--session")
            .arg(session)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => return Err(self.not_found()),
            Ok(Err(e)) => return Err(AppError::browser(session, e)),
            Err(_) => return Err(AppError::timeout(format!("{session} {action}"))),
        };

        if !output.status.success() {
            let stderr = strip_ansi(&String::from_utf8_lossy(&output.stderr));
            return Err(AppError::browser(
                session,
                format!("{action} failed ({}): {}", output.status, stderr.trim()),
            ));
        }

        Ok(strip_ansi(&String::from_utf8_lossy(&output.stdout))
            .trim()
            .to_string())
    }

    async fn version(&self) -> Result<String> {
        let result = tokio::time::timeout(
            VERSION_TIMEOUT,
            Command::new(&self.binary)
                .arg("--version")
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await;

        let version = match result {
            Ok(Ok(output)) if output.status.success() => {
                strip_ansi(&String::from_utf8_lossy(&output.stdout))
                    .trim()
                    .to_string()
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => return Err(self.not_found()),
            // present but unable to report a version
            _ => String::new(),
        };
        let version = if version.is_empty() {
            "installed".to_string()
        } else {
            version
        };
        Ok(format!("{} ({})", self.binary, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_tool() -> AgentBrowser {
        AgentBrowser::new(&BrowserConfig {
            binary: "dev-scan-test-no-such-browser".into(),
            ..BrowserConfig::default()
        })
    }

    #[tokio::test]
    async fn test_missing_binary_is_config_error() {
        let driver = missing_tool();
        assert!(matches!(driver.version().await, Err(AppError::Config(_))));
        assert!(matches!(
            driver.run("enrich-0", &["open", "https://example.com"]).await,
            Err(AppError::Config(_))
        ));
    }
}
