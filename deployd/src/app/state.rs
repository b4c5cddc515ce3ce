//! Application state management

use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::buckets::reload::ReloadCommand;
use crate::deploy::compose::{ComposeCli, ComposeTool};
use crate::deploy::service::DeploymentService;
use crate::deploy::store::DeploymentStore;
use crate::docker::proxy::ContainerProxy;
use crate::docker::runtime::{BollardRuntime, ContainerRuntime};
use crate::errors::DeploydError;
use crate::server::state::ServerState;

/// Main application state
pub struct AppState {
    /// Deployment registry
    pub deployments: Arc<DeploymentService>,

    /// Container runtime access
    pub containers: ContainerProxy,

    /// Config bucket reload runner
    pub reload: ReloadCommand,
}

impl AppState {
    /// Initialize application state against the real compose tool and Docker daemon
    pub async fn init(options: &AppOptions) -> Result<Self, DeploydError> {
        let compose = Arc::new(ComposeCli::new(&options.compose_command)?);
        let runtime = Arc::new(BollardRuntime::connect()?);
        Self::with_components(options, compose, runtime).await
    }

    /// Initialize application state with the given collaborators
    pub async fn with_components(
        options: &AppOptions,
        compose: Arc<dyn ComposeTool>,
        runtime: Arc<dyn ContainerRuntime>,
    ) -> Result<Self, DeploydError> {
        info!("Initializing application state...");

        options.storage.setup().await?;
        info!(
            "Deployments stored in {}",
            options.storage.root_dir().path().display()
        );

        let store = DeploymentStore::new(options.storage.clone());
        Ok(Self {
            deployments: Arc::new(DeploymentService::new(store, compose)),
            containers: ContainerProxy::new(runtime),
            reload: ReloadCommand::new(options.reload_shell.clone()),
        })
    }

    /// State handed to the HTTP handlers
    pub fn server_state(&self) -> ServerState {
        ServerState::new(
            self.deployments.clone(),
            self.containers.clone(),
            self.reload.clone(),
        )
    }

    /// Shutdown application state
    pub async fn shutdown(&self) -> Result<(), DeploydError> {
        info!("Shutting down application state...");
        Ok(())
    }
}
