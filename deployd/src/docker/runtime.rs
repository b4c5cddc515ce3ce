//! Container runtime port and its Docker daemon adapter

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Bytes;
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerInspectResponse, PortBinding as DockerPortBinding};
use bollard::query_parameters::{
    InspectContainerOptions, KillContainerOptions, ListContainersOptionsBuilder,
    LogsOptionsBuilder, PruneBuildOptions, PruneContainersOptions, PruneImagesOptions,
    PruneNetworksOptions, PruneVolumesOptions, RemoveContainerOptions, RestartContainerOptions,
    StartContainerOptions, StopContainerOptions, TagImageOptionsBuilder,
};
use bollard::Docker;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use openapi_server::models::{
    BuildCachesDeleted, ContainerDetails, ContainersDeleted, ImagesDeleted, NetworksDeleted,
    PortBinding, PruneRequest, PruneResponse, VolumesDeleted,
};
use tracing::{debug, info};

use crate::errors::DeploydError;

/// Status reported for a running container
pub const RUNNING: &str = "running";

/// Operations proxied to the container runtime daemon
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    async fn list(&self) -> Result<Vec<ContainerDetails>, DeploydError>;
    async fn inspect(&self, id: &str) -> Result<ContainerDetails, DeploydError>;
    async fn start(&self, id: &str) -> Result<(), DeploydError>;
    async fn stop(&self, id: &str) -> Result<(), DeploydError>;
    async fn restart(&self, id: &str) -> Result<(), DeploydError>;
    async fn kill(&self, id: &str) -> Result<(), DeploydError>;
    async fn remove(&self, id: &str, force: bool, volumes: bool) -> Result<(), DeploydError>;

    /// Everything the container has logged so far
    async fn logs(&self, id: &str) -> Result<String, DeploydError>;

    /// Logged output followed live until the container stops
    fn stream_logs(&self, id: &str) -> BoxStream<'static, Result<Bytes, DeploydError>>;

    async fn tag_image(&self, image_id: &str, tag: &str) -> Result<(), DeploydError>;
    async fn prune(&self, request: &PruneRequest) -> Result<PruneResponse, DeploydError>;
}

/// [`ContainerRuntime`] backed by the local Docker daemon
#[derive(Debug, Clone)]
pub struct BollardRuntime {
    docker: Docker,
}

impl BollardRuntime {
    /// Connect using `DOCKER_HOST` or the platform default socket
    pub fn connect() -> Result<Self, DeploydError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| DeploydError::UpstreamError(format!("Docker connection failed: {}", e)))?;
        Ok(Self { docker })
    }
}

fn container_error(err: BollardError) -> DeploydError {
    match err {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => DeploydError::NotFound("Container not found".to_string()),
        other => DeploydError::UpstreamError(other.to_string()),
    }
}

fn image_error(err: BollardError) -> DeploydError {
    match err {
        BollardError::DockerResponseServerError {
            status_code: 404, ..
        } => DeploydError::NotFound("Image not found".to_string()),
        other => DeploydError::UpstreamError(other.to_string()),
    }
}

fn upstream_error(err: BollardError) -> DeploydError {
    DeploydError::UpstreamError(err.to_string())
}

fn port_binding(binding: DockerPortBinding) -> PortBinding {
    PortBinding {
        host_ip: binding.host_ip.unwrap_or_default(),
        host_port: binding.host_port.unwrap_or_default(),
    }
}

fn container_details(response: ContainerInspectResponse) -> ContainerDetails {
    let ports = response
        .network_settings
        .and_then(|settings| settings.ports)
        .unwrap_or_default()
        .into_iter()
        .map(|(port, bindings)| {
            let bindings = bindings
                .unwrap_or_default()
                .into_iter()
                .map(port_binding)
                .collect();
            (port, bindings)
        })
        .collect::<HashMap<_, _>>();

    ContainerDetails {
        id: response.id.unwrap_or_default(),
        name: response
            .name
            .map(|name| name.trim_start_matches('/').to_string())
            .unwrap_or_default(),
        status: response
            .state
            .and_then(|state| state.status)
            .map(|status| status.to_string())
            .unwrap_or_default(),
        image: response
            .config
            .and_then(|config| config.image)
            .into_iter()
            .collect(),
        ports,
        created: response.created.map(|c| c.to_string()).unwrap_or_default(),
    }
}

/// Split `repo:tag`, where the tag is whatever follows the last `:` after
/// the last `/` (registry ports are part of the repository)
fn split_tag(reference: &str) -> (&str, &str) {
    let name_start = reference.rfind('/').map_or(0, |i| i + 1);
    match reference[name_start..].rfind(':') {
        Some(i) => (
            &reference[..name_start + i],
            &reference[name_start + i + 1..],
        ),
        None => (reference, "latest"),
    }
}

#[async_trait]
impl ContainerRuntime for BollardRuntime {
    async fn list(&self) -> Result<Vec<ContainerDetails>, DeploydError> {
        let options = ListContainersOptionsBuilder::new().all(true).build();
        let summaries = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(upstream_error)?;

        let mut containers = Vec::with_capacity(summaries.len());
        for id in summaries.into_iter().filter_map(|summary| summary.id) {
            match self.inspect(&id).await {
                Ok(details) => containers.push(details),
                // removed between listing and inspection
                Err(DeploydError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(containers)
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDetails, DeploydError> {
        let response = self
            .docker
            .inspect_container(id, None::<InspectContainerOptions>)
            .await
            .map_err(container_error)?;
        Ok(container_details(response))
    }

    async fn start(&self, id: &str) -> Result<(), DeploydError> {
        self.docker
            .start_container(id, None::<StartContainerOptions>)
            .await
            .map_err(container_error)
    }

    async fn stop(&self, id: &str) -> Result<(), DeploydError> {
        self.docker
            .stop_container(id, None::<StopContainerOptions>)
            .await
            .map_err(container_error)
    }

    async fn restart(&self, id: &str) -> Result<(), DeploydError> {
        self.docker
            .restart_container(id, None::<RestartContainerOptions>)
            .await
            .map_err(container_error)
    }

    async fn kill(&self, id: &str) -> Result<(), DeploydError> {
        self.docker
            .kill_container(id, None::<KillContainerOptions>)
            .await
            .map_err(container_error)
    }

    async fn remove(&self, id: &str, force: bool, volumes: bool) -> Result<(), DeploydError> {
        let options = RemoveContainerOptions {
            v: volumes,
            force,
            link: false,
        };
        self.docker
            .remove_container(id, Some(options))
            .await
            .map_err(container_error)
    }

    async fn logs(&self, id: &str) -> Result<String, DeploydError> {
        let options = LogsOptionsBuilder::new()
            .stdout(true)
            .stderr(true)
            .tail("all")
            .build();

        let chunks: Vec<_> = self
            .docker
            .logs(id, Some(options))
            .map_err(container_error)
            .try_collect()
            .await?;

        let mut output = Vec::new();
        for chunk in chunks {
            output.extend_from_slice(&chunk.into_bytes());
        }
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    fn stream_logs(&self, id: &str) -> BoxStream<'static, Result<Bytes, DeploydError>> {
        debug!("Streaming logs of container {}", id);
        let options = LogsOptionsBuilder::new()
            .stdout(true)
            .stderr(true)
            .follow(true)
            .tail("all")
            .build();

        self.docker
            .logs(id, Some(options))
            .map(|chunk| chunk.map(|output| output.into_bytes()).map_err(container_error))
            .boxed()
    }

    async fn tag_image(&self, image_id: &str, tag: &str) -> Result<(), DeploydError> {
        let (repo, tag) = split_tag(tag);
        let options = TagImageOptionsBuilder::new().repo(repo).tag(tag).build();
        self.docker
            .tag_image(image_id, Some(options))
            .await
            .map_err(image_error)
    }

    async fn prune(&self, request: &PruneRequest) -> Result<PruneResponse, DeploydError> {
        let mut response = PruneResponse::default();

        if request.containers() {
            let pruned = self
                .docker
                .prune_containers(None::<PruneContainersOptions>)
                .await
                .map_err(upstream_error)?;
            response.containers = Some(ContainersDeleted {
                containers_deleted: pruned.containers_deleted.unwrap_or_default(),
                space_reclaimed: pruned.space_reclaimed.unwrap_or_default(),
            });
        }

        if request.images() {
            let pruned = self
                .docker
                .prune_images(None::<PruneImagesOptions>)
                .await
                .map_err(upstream_error)?;
            response.images = Some(ImagesDeleted {
                images_deleted: pruned
                    .images_deleted
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|item| item.deleted.or(item.untagged))
                    .collect(),
                space_reclaimed: pruned.space_reclaimed.unwrap_or_default(),
            });
        }

        if request.volumes() {
            let pruned = self
                .docker
                .prune_volumes(None::<PruneVolumesOptions>)
                .await
                .map_err(upstream_error)?;
            response.volumes = Some(VolumesDeleted {
                volumes_deleted: pruned.volumes_deleted.unwrap_or_default(),
                space_reclaimed: pruned.space_reclaimed.unwrap_or_default(),
            });
        }

        if request.networks() {
            let pruned = self
                .docker
                .prune_networks(None::<PruneNetworksOptions>)
                .await
                .map_err(upstream_error)?;
            response.networks = Some(NetworksDeleted {
                networks_deleted: pruned.networks_deleted.unwrap_or_default(),
            });
        }

        if request.build_cache() {
            let pruned = self
                .docker
                .prune_build(None::<PruneBuildOptions>)
                .await
                .map_err(upstream_error)?;
            response.build_cache = Some(BuildCachesDeleted {
                caches_deleted: pruned.caches_deleted.unwrap_or_default(),
                space_reclaimed: pruned.space_reclaimed.unwrap_or_default(),
            });
        }

        info!("Pruned docker resources");
        Ok(response)
    }
}
