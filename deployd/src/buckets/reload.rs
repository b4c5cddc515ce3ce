//! Config reload commands

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::DeploydError;

/// Runs deployer-supplied reload commands through a shell.
///
/// The command string is trusted input: it comes from whoever deploys the
/// consumer of the bucket and is executed as a shell pipeline.
#[derive(Debug, Clone)]
pub struct ReloadCommand {
    shell: String,
}

impl ReloadCommand {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Run `command` and wait for it. A launch failure or a non-zero exit
    /// status is an `ExecutionError`.
    pub async fn run(&self, command: &str) -> Result<(), DeploydError> {
        debug!("Running reload command: {}", command);

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DeploydError::ExecutionError(format!("Failed to run {}: {}", self.shell, e))
            })?;

        if !output.status.success() {
            return Err(DeploydError::ExecutionError(format!(
                "Reload command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!("Reload command finished");
        Ok(())
    }

    /// Run `command` if one was given
    pub async fn run_optional(&self, command: Option<&str>) -> Result<(), DeploydError> {
        match command {
            Some(command) if !command.trim().is_empty() => self.run(command).await,
            _ => Ok(()),
        }
    }
}
