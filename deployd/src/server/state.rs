//! Server state

use std::sync::Arc;

use crate::buckets::reload::ReloadCommand;
use crate::deploy::service::DeploymentService;
use crate::docker::proxy::ContainerProxy;

/// Server state shared across handlers
pub struct ServerState {
    pub deployments: Arc<DeploymentService>,
    pub containers: ContainerProxy,
    pub reload: ReloadCommand,
}

impl ServerState {
    pub fn new(
        deployments: Arc<DeploymentService>,
        containers: ContainerProxy,
        reload: ReloadCommand,
    ) -> Self {
        Self {
            deployments,
            containers,
            reload,
        }
    }
}
