//! Deployment service tests

mod common;

use std::sync::Arc;

use common::{db_stack, service_in, RecordingCompose, INVALID_MARKER};
use deployd::errors::DeploydError;
use deployd::models::deployment::{ComposeAction, DeploymentPatch};

fn patch(json: serde_json::Value) -> DeploymentPatch {
    serde_json::from_value(json).unwrap()
}

#[tokio::test]
async fn test_create_get_and_patch_db_stack() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Arc::new(RecordingCompose::default());
    let service = service_in(dir.path(), compose.clone());

    let created = service.create(db_stack()).await.unwrap();
    assert_eq!(created, db_stack());
    assert_eq!(compose.validation_count(), 1);

    let definition = service.definition("db-stack").await.unwrap();
    assert_eq!(definition.compose_file, db_stack().compose_file);
    assert_eq!(definition.env_file.as_deref(), Some("PASSWORD=x"));
    assert_eq!(service.get("db-stack").await.unwrap(), db_stack().databases);

    let updated = service
        .update(
            "db-stack",
            patch(serde_json::json!({"databases": {"primary": {"username": "admin"}}})),
        )
        .await
        .unwrap();
    assert_eq!(updated.databases["primary"].username, "admin");
    assert_eq!(updated.databases["primary"].password, "x");

    // no new compose definition, no validation
    assert_eq!(compose.validation_count(), 1);
}

#[tokio::test]
async fn test_create_conflicts_until_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path(), Arc::new(RecordingCompose::default()));

    service.create(db_stack()).await.unwrap();
    assert!(matches!(
        service.create(db_stack()).await,
        Err(DeploydError::Conflict(_))
    ));

    service.delete("db-stack").await.unwrap();
    service.create(db_stack()).await.unwrap();
    assert_eq!(service.list().await.unwrap(), vec!["db-stack"]);
}

#[tokio::test]
async fn test_concurrent_creates_admit_one() {
    let dir = tempfile::tempdir().unwrap();
    let service = Arc::new(service_in(
        dir.path(),
        Arc::new(RecordingCompose::default()),
    ));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.create(db_stack()).await }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(DeploydError::Conflict(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(created, 1);
    assert_eq!(service.list().await.unwrap(), vec!["db-stack"]);
}

#[tokio::test]
async fn test_invalid_compose_is_never_stored() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path(), Arc::new(RecordingCompose::default()));

    let mut deployment = db_stack();
    deployment.compose_file = format!("services: {}", INVALID_MARKER);

    assert!(matches!(
        service.create(deployment).await,
        Err(DeploydError::InvalidInput(_))
    ));
    assert!(service.list().await.unwrap().is_empty());
    assert_eq!(
        std::fs::read_dir(dir.path().join("deployments")).unwrap().count(),
        0
    );
}

#[tokio::test]
async fn test_invalid_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Arc::new(RecordingCompose::default());
    let service = service_in(dir.path(), compose.clone());

    let mut deployment = db_stack();
    deployment.name = "../escape".to_string();

    assert!(matches!(
        service.create(deployment).await,
        Err(DeploydError::InvalidInput(_))
    ));
    assert_eq!(compose.validation_count(), 0);
}

#[tokio::test]
async fn test_invalid_compose_update_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path(), Arc::new(RecordingCompose::default()));
    service.create(db_stack()).await.unwrap();

    let result = service
        .update(
            "db-stack",
            patch(serde_json::json!({
                "compose_file": INVALID_MARKER,
                "env_file": "PASSWORD=y",
                "databases": {"primary": {"username": "admin"}}
            })),
        )
        .await;

    assert!(matches!(result, Err(DeploydError::InvalidInput(_))));
    assert_eq!(service.definition("db-stack").await.unwrap(), db_stack());
}

#[tokio::test]
async fn test_update_compose_and_env() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Arc::new(RecordingCompose::default());
    let service = service_in(dir.path(), compose.clone());
    service.create(db_stack()).await.unwrap();

    let updated = service
        .update(
            "db-stack",
            patch(serde_json::json!({"compose_file": "services: {}", "env_file": null})),
        )
        .await
        .unwrap();

    assert_eq!(updated.compose_file, "services: {}");
    assert!(updated.env_file.is_none());
    assert_eq!(updated.databases, db_stack().databases);
    assert_eq!(compose.validation_count(), 2);
}

#[tokio::test]
async fn test_null_compose_or_databases_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path(), Arc::new(RecordingCompose::default()));
    service.create(db_stack()).await.unwrap();

    for body in [
        serde_json::json!({"compose_file": null}),
        serde_json::json!({"databases": null}),
    ] {
        assert!(matches!(
            service.update("db-stack", patch(body)).await,
            Err(DeploydError::InvalidInput(_))
        ));
    }
}

#[tokio::test]
async fn test_incomplete_new_database_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path(), Arc::new(RecordingCompose::default()));
    service.create(db_stack()).await.unwrap();

    let result = service
        .update(
            "db-stack",
            patch(serde_json::json!({
                "env_file": "PASSWORD=y",
                "databases": {"cache": {"username": "root"}}
            })),
        )
        .await;

    assert!(matches!(result, Err(DeploydError::InvalidInput(_))));
    assert_eq!(service.definition("db-stack").await.unwrap(), db_stack());
}

#[tokio::test]
async fn test_patch_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path(), Arc::new(RecordingCompose::default()));
    service.create(db_stack()).await.unwrap();

    let body = serde_json::json!({
        "databases": {
            "primary": {"password": ""},
            "docs": {"dbtype": "mongodb", "username": "m", "password": "p"}
        }
    });
    let once = service.update("db-stack", patch(body.clone())).await.unwrap();
    let twice = service.update("db-stack", patch(body)).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(once.databases["primary"].password, "");
    assert_eq!(once.databases["primary"].username, "root");
    assert_eq!(once.databases.len(), 2);
}

#[tokio::test]
async fn test_deleted_deployment_is_gone() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path(), Arc::new(RecordingCompose::default()));
    service.create(db_stack()).await.unwrap();
    service.delete("db-stack").await.unwrap();

    assert!(matches!(
        service.get("db-stack").await,
        Err(DeploydError::NotFound(_))
    ));
    assert!(matches!(
        service.update("db-stack", DeploymentPatch::default()).await,
        Err(DeploydError::NotFound(_))
    ));
    assert!(matches!(
        service.delete("db-stack").await,
        Err(DeploydError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_up_and_down_launch_compose() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Arc::new(RecordingCompose::default());
    let service = service_in(dir.path(), compose.clone());
    service.create(db_stack()).await.unwrap();

    service.up("db-stack").await.unwrap();
    service.down("db-stack").await.unwrap();

    let launches = compose.launches();
    assert_eq!(launches.len(), 2);
    assert_eq!(launches[0].1, ComposeAction::Up);
    assert_eq!(launches[1].1, ComposeAction::Down);
    assert!(launches[0]
        .0
        .ends_with("deployments/db-stack/docker-compose.yml"));
}

#[tokio::test]
async fn test_up_on_missing_deployment_never_launches() {
    let dir = tempfile::tempdir().unwrap();
    let compose = Arc::new(RecordingCompose::default());
    let service = service_in(dir.path(), compose.clone());

    assert!(matches!(
        service.up("nope").await,
        Err(DeploydError::NotFound(_))
    ));
    assert!(compose.launches().is_empty());
}

#[tokio::test]
async fn test_launch_failure_is_execution_error() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_in(dir.path(), Arc::new(RecordingCompose::failing_launch()));
    service.create(db_stack()).await.unwrap();

    assert!(matches!(
        service.up("db-stack").await,
        Err(DeploydError::ExecutionError(_))
    ));
}
