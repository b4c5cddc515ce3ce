//! Compose launches for a deployments root given relative to the working directory

use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use deployd::deploy::compose::{ComposeCli, ComposeTool};
use deployd::deploy::store::DeploymentStore;
use deployd::models::deployment::{ComposeAction, Deployment};
use deployd::storage::layout::StorageLayout;

/// Writes `found <action>` to `result` when `-f` names an existing file,
/// `missing <path>` otherwise
fn fake_compose(bin_dir: &Path, result: &Path) -> String {
    let script = bin_dir.join("fake-compose");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\nif [ \"$1\" = \"-f\" ] && [ -f \"$2\" ]; then echo \"found $3\" > {0}; \
             else echo \"missing $2\" > {0}; fi\n",
            result.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script.display().to_string()
}

async fn wait_for(result: &Path) -> String {
    for _ in 0..100 {
        if let Ok(contents) = std::fs::read_to_string(result) {
            if !contents.is_empty() {
                return contents.trim().to_string();
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("compose was never run");
}

#[tokio::test]
async fn test_launch_with_relative_deployments_root() {
    let tmp = tempfile::tempdir().unwrap();
    let bin_dir = tmp.path().join("bin");
    std::fs::create_dir(&bin_dir).unwrap();
    let result = tmp.path().join("result");
    let cli = ComposeCli::new(&fake_compose(&bin_dir, &result)).unwrap();

    std::env::set_current_dir(tmp.path()).unwrap();
    let layout = StorageLayout::new(".serverctl/");
    layout.setup().await.unwrap();
    let store = DeploymentStore::new(layout);

    let web = Deployment {
        name: "web".to_string(),
        compose_file: "services: {}\n".to_string(),
        env_file: None,
        databases: BTreeMap::new(),
    };
    let staging = store.stage(&web).await.unwrap();
    store.commit(staging, "web").await.unwrap();

    let compose_file = store.compose_file("web").await.unwrap();
    assert!(compose_file.is_relative());

    cli.launch(&compose_file, ComposeAction::Up).unwrap();
    assert_eq!(wait_for(&result).await, "found up");
}
