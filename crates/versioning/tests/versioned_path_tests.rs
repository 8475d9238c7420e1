// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Version resolution against a fake store

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Mutex;
use versioning::{BoxError, Version, VersionError, VersionStore, VersionedPath};

#[derive(Default)]
struct FakeStore {
    objects: Mutex<BTreeSet<String>>,
}

impl FakeStore {
    fn with(paths: &[&str]) -> Self {
        let store = Self::default();
        for p in paths {
            store.add(p);
        }
        store
    }

    fn add(&self, path: &str) {
        _ = self.objects.lock().expect("lock").insert(path.to_string());
    }
}

#[async_trait]
impl VersionStore for FakeStore {
    async fn exists(&self, path: &str) -> Result<bool, BoxError> {
        Ok(self.objects.lock().expect("lock").contains(path))
    }

    async fn glob(&self, pattern: &str) -> Result<Vec<String>, BoxError> {
        // Only the single-'*' component patterns the resolver produces
        let parts: Vec<&str> = pattern.split('/').collect();
        let objects = self.objects.lock().expect("lock");
        Ok(objects
            .iter()
            .filter(|o| {
                let names: Vec<&str> = o.split('/').collect();
                names.len() == parts.len()
                    && names.iter().zip(&parts).all(|(n, p)| *p == "*" || n == p)
            })
            .cloned()
            .collect())
    }
}

struct FailingStore;

#[async_trait]
impl VersionStore for FailingStore {
    async fn exists(&self, _path: &str) -> Result<bool, BoxError> {
        Err("connection reset".into())
    }

    async fn glob(&self, _pattern: &str) -> Result<Vec<String>, BoxError> {
        Err("connection reset".into())
    }
}

#[tokio::test]
async fn test_unversioned_paths_are_the_filepath() -> Result<(), VersionError> {
    let vp = VersionedPath::new("bkt/data.hdf", None)?;
    let store = FakeStore::default();

    let load = vp.load_path(&store).await?;
    assert_eq!(load.path, "bkt/data.hdf");
    assert_eq!(load.version, None);

    let save = vp.save_path(&store).await?;
    assert_eq!(save.path, "bkt/data.hdf");

    // Unversioned saves may overwrite
    store.add("bkt/data.hdf");
    assert_eq!(vp.save_path(&store).await?.path, "bkt/data.hdf");
    Ok(())
}

#[tokio::test]
async fn test_latest_version_is_loaded() -> Result<(), VersionError> {
    let store = FakeStore::with(&[
        "bkt/data.hdf/2024-01-01T00.00.00.000Z/data.hdf",
        "bkt/data.hdf/2024-03-01T00.00.00.000Z/data.hdf",
        "bkt/data.hdf/2024-02-01T00.00.00.000Z/data.hdf",
        "bkt/data.hdf/2025-01-01T00.00.00.000Z/other.hdf",
    ]);
    let vp = VersionedPath::new("bkt/data.hdf", Some(Version::latest()))?;

    let load = vp.load_path(&store).await?;
    assert_eq!(load.path, "bkt/data.hdf/2024-03-01T00.00.00.000Z/data.hdf");
    assert_eq!(load.version.as_deref(), Some("2024-03-01T00.00.00.000Z"));

    assert_eq!(
        vp.list_versions(&store).await?,
        vec![
            "2024-01-01T00.00.00.000Z".to_string(),
            "2024-02-01T00.00.00.000Z".to_string(),
            "2024-03-01T00.00.00.000Z".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_no_versions_is_not_found() -> Result<(), VersionError> {
    let vp = VersionedPath::new("bkt/data.hdf", Some(Version::latest()))?;
    let err = vp
        .load_path(&FakeStore::default())
        .await
        .expect_err("nothing saved yet");
    assert!(matches!(err, VersionError::NotFound(ref p) if p == "bkt/data.hdf"));
    Ok(())
}

#[tokio::test]
async fn test_pinned_versions() -> Result<(), VersionError> {
    let vp = VersionedPath::new(
        "bkt/data.hdf",
        Some(Version::new(Some("v1".into()), Some("v2".into()))),
    )?;
    let store = FakeStore::default();

    // A pinned load version is not checked for existence
    assert_eq!(vp.load_path(&store).await?.path, "bkt/data.hdf/v1/data.hdf");
    assert_eq!(vp.save_path(&store).await?.path, "bkt/data.hdf/v2/data.hdf");
    Ok(())
}

#[tokio::test]
async fn test_existing_save_path_is_rejected() -> Result<(), VersionError> {
    let store = FakeStore::with(&["bkt/data.hdf/v2/data.hdf"]);
    let vp = VersionedPath::new("bkt/data.hdf", Some(Version::new(None, Some("v2".into()))))?;

    let err = vp.save_path(&store).await.expect_err("path exists");
    assert!(matches!(err, VersionError::SaveExists(ref p) if p == "bkt/data.hdf/v2/data.hdf"));
    Ok(())
}

#[tokio::test]
async fn test_generated_save_paths_are_distinct_and_increasing() -> Result<(), VersionError> {
    let vp = VersionedPath::new("bkt/data.hdf", Some(Version::latest()))?;
    let store = FakeStore::default();

    let mut paths = Vec::new();
    for _ in 0..5 {
        let resolved = vp.save_path(&store).await?;
        store.add(&resolved.path);
        paths.push(resolved.path);
    }
    for pair in paths.windows(2) {
        assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
    }

    // The newest save is what an unpinned load picks
    assert_eq!(vp.load_path(&store).await?.path, paths[4]);
    Ok(())
}

#[tokio::test]
async fn test_lookup_failures_propagate() -> Result<(), VersionError> {
    let vp = VersionedPath::new("bkt/data.hdf", Some(Version::latest()))?;
    let err = vp.load_path(&FailingStore).await.expect_err("store fails");
    assert!(matches!(err, VersionError::Lookup(_)));
    assert!(err.to_string().contains("connection reset"));
    Ok(())
}

#[test]
fn test_invalid_version_rejected_at_construction() {
    let err = VersionedPath::new("bkt/data.hdf", Some(Version::new(Some("a/b".into()), None)))
        .expect_err("slash in version");
    assert!(matches!(err, VersionError::InvalidVersion(_)));
}

#[test]
fn test_versioned_path_layout() -> Result<(), VersionError> {
    let vp = VersionedPath::new("bkt/dir/data.hdf/", Some(Version::latest()))?;
    assert_eq!(vp.filepath(), "bkt/dir/data.hdf");
    assert_eq!(vp.versioned_path("v9"), "bkt/dir/data.hdf/v9/data.hdf");
    Ok(())
}
