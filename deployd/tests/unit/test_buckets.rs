//! Config bucket scanner tests

use std::collections::BTreeSet;
use std::path::Path;

use deployd::buckets::scanner::BucketScanner;
use deployd::models::bucket::ConfigBucket;

const A_CONF_DIGEST: &str = "23a40b81cf3ece1d02980a28710205d40f91cf0800313c01b2e4a581345be98f";
const A_CONF_GROWN_DIGEST: &str =
    "b0f0c6933dc04945a339575e70d336657868e7678f3325a1d86479740a6926a1";

fn bucket(dir: &Path, patterns: &[&str]) -> ConfigBucket {
    ConfigBucket {
        directory_path: dir.to_path_buf(),
        ignore_patterns: Some(patterns.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>()),
        update_command: None,
    }
}

#[tokio::test]
async fn test_hashes_exclude_ignored_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.conf"), "X=1").unwrap();
    std::fs::write(dir.path().join("b.tmp"), "scratch").unwrap();

    let scanner = BucketScanner::open(&bucket(dir.path(), &["*.tmp"])).await.unwrap();
    let hashes = scanner.hash_files().await.unwrap();

    assert_eq!(hashes.len(), 1);
    assert_eq!(hashes["a.conf"], A_CONF_DIGEST);
}

#[tokio::test]
async fn test_digest_follows_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.conf");
    std::fs::write(&path, "X=1").unwrap();

    let scanner = BucketScanner::open(&bucket(dir.path(), &[])).await.unwrap();
    assert_eq!(scanner.hash_files().await.unwrap()["a.conf"], A_CONF_DIGEST);

    std::fs::write(&path, "X=12").unwrap();
    assert_eq!(
        scanner.hash_files().await.unwrap()["a.conf"],
        A_CONF_GROWN_DIGEST
    );
}

#[tokio::test]
async fn test_large_file_hash_spans_chunks() {
    use sha2::{Digest, Sha256};

    let dir = tempfile::tempdir().unwrap();
    let contents: Vec<u8> = (0..300 * 1024).map(|i| (i % 251) as u8).collect();
    std::fs::write(dir.path().join("big.bin"), &contents).unwrap();

    let scanner = BucketScanner::open(&bucket(dir.path(), &[])).await.unwrap();
    let expected = hex::encode(Sha256::digest(&contents));
    assert_eq!(scanner.hash_files().await.unwrap()["big.bin"], expected);
}

#[tokio::test]
async fn test_listing_is_sorted_and_filtered() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["z.conf", "a.conf", "m.yml", "cache.tmp", ".swp"] {
        std::fs::write(dir.path().join(name), name).unwrap();
    }

    let scanner = BucketScanner::open(&bucket(dir.path(), &["*.tmp", ".*"]))
        .await
        .unwrap();
    assert_eq!(
        scanner.file_names().await.unwrap(),
        vec!["a.conf", "m.yml", "z.conf"]
    );
}

#[tokio::test]
async fn test_no_patterns_lists_everything() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.conf"), "A").unwrap();

    let mut config = bucket(dir.path(), &[]);
    config.ignore_patterns = None;
    let scanner = BucketScanner::open(&config).await.unwrap();
    assert_eq!(scanner.file_names().await.unwrap(), vec!["a.conf"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_files_are_hashed_and_archived() {
    use std::io::Read;

    let tmp = tempfile::tempdir().unwrap();
    let available = tmp.path().join("available");
    let enabled = tmp.path().join("enabled");
    std::fs::create_dir(&available).unwrap();
    std::fs::create_dir(&enabled).unwrap();
    std::fs::write(available.join("a.conf"), "X=1").unwrap();
    std::os::unix::fs::symlink(available.join("a.conf"), enabled.join("a.conf")).unwrap();

    let scanner = BucketScanner::open(&bucket(&enabled, &[])).await.unwrap();
    assert_eq!(scanner.file_names().await.unwrap(), vec!["a.conf"]);
    assert_eq!(scanner.hash_files().await.unwrap()["a.conf"], A_CONF_DIGEST);

    let bytes = scanner.archive().await.unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(bytes.as_slice()));
    let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
    assert_eq!(entry.path().unwrap().to_string_lossy(), "a.conf");
    let mut contents = String::new();
    entry.read_to_string(&mut contents).unwrap();
    assert_eq!(contents, "X=1");
}
