//! Container lifecycle policy on top of a [`ContainerRuntime`]

use std::sync::Arc;

use axum::body::Bytes;
use futures::stream::BoxStream;
use openapi_server::models::{ContainerDetails, PruneRequest, PruneResponse};
use tracing::{debug, info};

use crate::docker::runtime::{ContainerRuntime, RUNNING};
use crate::errors::DeploydError;

/// Translates runtime failures into the errors callers can act on: a failed
/// operation that is illegal for the container's current state becomes
/// `Forbidden`.
#[derive(Clone)]
pub struct ContainerProxy {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ContainerProxy {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    async fn is_running(&self, id: &str) -> Option<bool> {
        self.runtime
            .inspect(id)
            .await
            .ok()
            .map(|details| details.status == RUNNING)
    }

    pub async fn list(&self) -> Result<Vec<ContainerDetails>, DeploydError> {
        self.runtime.list().await
    }

    pub async fn get(&self, id: &str) -> Result<ContainerDetails, DeploydError> {
        self.runtime.inspect(id).await
    }

    pub async fn start(&self, id: &str) -> Result<(), DeploydError> {
        self.runtime.start(id).await?;
        info!("Container {} started", id);
        Ok(())
    }

    pub async fn stop(&self, id: &str) -> Result<(), DeploydError> {
        self.runtime.stop(id).await?;
        info!("Container {} stopped", id);
        Ok(())
    }

    pub async fn restart(&self, id: &str) -> Result<(), DeploydError> {
        self.runtime.restart(id).await?;
        info!("Container {} restarted", id);
        Ok(())
    }

    pub async fn kill(&self, id: &str) -> Result<(), DeploydError> {
        match self.runtime.kill(id).await {
            Ok(()) => {
                info!("Container {} killed", id);
                Ok(())
            }
            Err(e @ DeploydError::NotFound(_)) => Err(e),
            Err(e) => match self.is_running(id).await {
                Some(false) => Err(DeploydError::Forbidden(
                    "Cannot kill containers that are not running".to_string(),
                )),
                _ => Err(e),
            },
        }
    }

    pub async fn remove(&self, id: &str, force: bool, volumes: bool) -> Result<(), DeploydError> {
        match self.runtime.remove(id, force, volumes).await {
            Ok(()) => {
                info!("Container {} deleted", id);
                Ok(())
            }
            Err(e @ DeploydError::NotFound(_)) => Err(e),
            Err(e) if force => Err(e),
            Err(e) => match self.is_running(id).await {
                Some(true) => Err(DeploydError::Forbidden(
                    "Cannot remove running containers, try forcing".to_string(),
                )),
                _ => Err(e),
            },
        }
    }

    pub async fn logs(&self, id: &str) -> Result<String, DeploydError> {
        self.runtime.logs(id).await
    }

    /// Follow the output of an existing container
    pub async fn attach(
        &self,
        id: &str,
    ) -> Result<BoxStream<'static, Result<Bytes, DeploydError>>, DeploydError> {
        self.runtime.inspect(id).await?;
        debug!("Attaching to container {}", id);
        Ok(self.runtime.stream_logs(id))
    }

    pub async fn tag_image(&self, image_id: &str, tag: &str) -> Result<(), DeploydError> {
        self.runtime.tag_image(image_id, tag).await?;
        info!("Image {} tagged as {}", image_id, tag);
        Ok(())
    }

    pub async fn prune(&self, request: &PruneRequest) -> Result<PruneResponse, DeploydError> {
        self.runtime.prune(request).await
    }
}
