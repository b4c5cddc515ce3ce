//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::DeploydError;
use crate::server::auth::authenticate;
use crate::server::handlers::{health_handler, root_handler, version_handler};
use crate::server::state::ServerState;
use crate::server::{buckets, deployments, docker};

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Service
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Deployments
        .route(
            "/deployments",
            get(deployments::list_deployments).post(deployments::create_deployment),
        )
        .route(
            "/deployments/",
            get(deployments::list_deployments).post(deployments::create_deployment),
        )
        .route(
            "/deployments/{name}",
            get(deployments::get_deployment)
                .patch(deployments::update_deployment)
                .delete(deployments::delete_deployment),
        )
        .route(
            "/deployments/{name}/definition",
            get(deployments::get_definition),
        )
        .route("/deployments/{name}/up", post(deployments::deployment_up))
        .route("/deployments/{name}/down", post(deployments::deployment_down))
        // Config buckets
        .route("/config/buckets", post(buckets::validate_bucket))
        .route("/config/buckets/", post(buckets::validate_bucket))
        .route("/config/buckets/files", post(buckets::list_filenames))
        .route("/config/buckets/check", post(buckets::get_hashes))
        .route("/config/buckets/backup", post(buckets::get_backup))
        .route(
            "/config/buckets/file",
            get(buckets::get_file)
                .put(buckets::update_file)
                .delete(buckets::delete_file),
        )
        // Docker
        .route("/docker/prune", post(docker::prune))
        .route("/docker/containers", get(docker::list_containers))
        .route("/docker/containers/delete", post(docker::delete_container))
        .route("/docker/containers/{id}", get(docker::get_container))
        .route("/docker/containers/{id}/start", post(docker::start_container))
        .route("/docker/containers/{id}/stop", post(docker::stop_container))
        .route(
            "/docker/containers/{id}/restart",
            post(docker::restart_container),
        )
        .route("/docker/containers/{id}/kill", post(docker::kill_container))
        .route("/docker/containers/{id}/logs", get(docker::container_logs))
        .route(
            "/docker/containers/{id}/attach",
            get(docker::container_attach),
        )
        .route("/docker/images/tag", post(docker::tag_image))
        // State and middleware
        .with_state(state)
        .layer(middleware::from_fn(authenticate))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), DeploydError>>, DeploydError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| DeploydError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| DeploydError::ServerError(e.to_string()))
    });

    Ok(handle)
}
