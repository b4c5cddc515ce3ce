//! Docker Compose invocation

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::errors::DeploydError;
use crate::models::deployment::ComposeAction;
use crate::storage::layout::COMPOSE_FILE_NAME;

/// External compose orchestration tool
#[async_trait]
pub trait ComposeTool: Send + Sync {
    /// Render the configuration of the compose file in `project_dir` without
    /// touching any container. Blocks until the tool exits.
    async fn validate(&self, project_dir: &Path) -> Result<(), DeploydError>;

    /// Launch `up -d` / `down` for `compose_file` and return once the process
    /// has been spawned. The eventual exit status is only logged.
    fn launch(&self, compose_file: &Path, action: ComposeAction) -> Result<(), DeploydError>;
}

/// Compose tool driven as a subprocess with an argument vector
#[derive(Debug, Clone)]
pub struct ComposeCli {
    program: String,
    base_args: Vec<String>,
}

impl ComposeCli {
    /// Build from a command line such as `docker-compose` or `docker compose`.
    /// The command is split on whitespace and never handed to a shell.
    pub fn new(command: &str) -> Result<Self, DeploydError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            DeploydError::ConfigError("Compose command must not be empty".to_string())
        })?;
        Ok(Self {
            program,
            base_args: parts.collect(),
        })
    }

    fn command(&self, working_dir: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.current_dir(working_dir).args(&self.base_args);
        command
    }
}

#[async_trait]
impl ComposeTool for ComposeCli {
    async fn validate(&self, project_dir: &Path) -> Result<(), DeploydError> {
        debug!("Validating compose file in {}", project_dir.display());

        let output = self
            .command(project_dir)
            .args(["-f", COMPOSE_FILE_NAME, "config", "--quiet"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                DeploydError::ExecutionError(format!("Failed to run {}: {}", self.program, e))
            })?;

        if !output.status.success() {
            let diagnostic = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("Compose validation failed: {}", diagnostic);
            return Err(DeploydError::InvalidInput(format!(
                "Invalid docker-compose file: {}",
                diagnostic
            )));
        }

        Ok(())
    }

    fn launch(&self, compose_file: &Path, action: ComposeAction) -> Result<(), DeploydError> {
        // The tool runs inside the project directory, so `-f` takes the bare
        // file name; a relative path would be resolved twice.
        let working_dir = compose_file
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = compose_file
            .file_name()
            .unwrap_or_else(|| OsStr::new(COMPOSE_FILE_NAME));
        info!(
            "Running compose {} for {}",
            action.as_str(),
            compose_file.display()
        );

        let mut child = self
            .command(working_dir)
            .arg("-f")
            .arg(file_name)
            .args(action.args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                DeploydError::ExecutionError(format!("Failed to run {}: {}", self.program, e))
            })?;

        let compose_file = compose_file.to_path_buf();
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => {
                    info!("Compose {} finished for {}", action.as_str(), compose_file.display());
                }
                Ok(status) => {
                    warn!(
                        "Compose {} for {} exited with {}",
                        action.as_str(),
                        compose_file.display(),
                        status
                    );
                }
                Err(e) => {
                    error!("Failed to wait for compose {}: {}", action.as_str(), e);
                }
            }
        });

        Ok(())
    }
}
