//! Application configuration options

use std::time::Duration;

use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Deployments storage layout
    pub storage: StorageLayout,

    /// Server configuration
    pub server: ServerOptions,

    /// Compose executable plus leading arguments
    pub compose_command: String,

    /// Interpreter for config bucket reload commands
    pub reload_shell: String,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            storage: StorageLayout::default(),
            server: ServerOptions::default(),
            compose_command: "docker-compose".to_string(),
            reload_shell: "/bin/bash".to_string(),
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

impl From<&Settings> for AppOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            storage: StorageLayout::new(&settings.deployments_dir),
            server: ServerOptions {
                host: settings.host.clone(),
                port: settings.port,
            },
            compose_command: settings.compose_command.clone(),
            reload_shell: settings.reload_shell.clone(),
            ..Default::default()
        }
    }
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}
