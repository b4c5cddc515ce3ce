//! Settings management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::DeploydError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Free-form environment label (e.g. "production")
    #[serde(default)]
    pub environment: Option<String>,

    /// Root directory holding one directory per deployment
    #[serde(default = "default_deployments_dir")]
    pub deployments_dir: PathBuf,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Compose executable plus leading arguments, e.g. "docker compose"
    #[serde(default = "default_compose_command")]
    pub compose_command: String,

    /// Interpreter used for config bucket reload commands
    #[serde(default = "default_reload_shell")]
    pub reload_shell: String,

    /// Directory for the rolling log file; stdout only when absent
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,
}

fn default_log_level() -> LogLevel {
    LogLevel::Warning
}

fn default_deployments_dir() -> PathBuf {
    PathBuf::from(".serverctl/")
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_compose_command() -> String {
    "docker-compose".to_string()
}

fn default_reload_shell() -> String {
    "/bin/bash".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            environment: None,
            deployments_dir: default_deployments_dir(),
            host: default_host(),
            port: default_port(),
            compose_command: default_compose_command(),
            reload_shell: default_reload_shell(),
            log_dir: None,
            json_logs: false,
        }
    }
}

impl Settings {
    /// Load settings: optional JSON file first, then environment overrides.
    ///
    /// A `.env` file in the working directory is loaded into the process
    /// environment before the overrides are read.
    pub async fn load(settings_file: Option<&File>) -> Result<Self, DeploydError> {
        dotenvy::dotenv().ok();

        let settings = match settings_file {
            Some(file) => file.read_json::<Settings>().await.map_err(|e| {
                DeploydError::ConfigError(format!(
                    "Unable to read settings file {}: {}",
                    file.path().display(),
                    e
                ))
            })?,
            None => Settings::default(),
        };

        settings.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a key lookup (environment variables in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, DeploydError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("LOGLEVEL") {
            self.log_level = level.parse().map_err(DeploydError::ConfigError)?;
        }
        if let Some(environment) = lookup("ENVIRONMENT") {
            self.environment = Some(environment);
        }
        if let Some(dir) = lookup("DEPLOYMENTS_DIR") {
            self.deployments_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("DEPLOYD_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("DEPLOYD_PORT") {
            self.port = port
                .parse()
                .map_err(|_| DeploydError::ConfigError(format!("Invalid DEPLOYD_PORT: {}", port)))?;
        }
        if let Some(command) = lookup("COMPOSE_COMMAND") {
            self.compose_command = command;
        }
        if let Some(shell) = lookup("RELOAD_SHELL") {
            self.reload_shell = shell;
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(json) = lookup("JSON_LOGS") {
            self.json_logs = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        if self.compose_command.split_whitespace().next().is_none() {
            return Err(DeploydError::ConfigError(
                "COMPOSE_COMMAND must not be empty".to_string(),
            ));
        }

        Ok(self)
    }
}
