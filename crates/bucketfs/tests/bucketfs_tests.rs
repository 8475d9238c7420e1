// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the bucket filesystem client against the
//! in-memory and local backends.

use bucketfs::{BucketFs, Credentials, StorageOptions};
use bytes::Bytes;

#[tokio::test]
async fn test_write_read_exists() -> Result<(), Box<dyn std::error::Error>> {
    let fs = BucketFs::in_memory();

    assert!(!fs.is_file("bkt/a.hdf").await?);
    assert!(!fs.exists("bkt/a.hdf").await?);

    fs.write("bkt/a.hdf", Bytes::from_static(b"hello")).await?;

    assert!(fs.is_file("bkt/a.hdf").await?);
    assert!(fs.exists("bkt/a.hdf").await?);
    assert_eq!(fs.read("bkt/a.hdf").await?, Bytes::from_static(b"hello"));

    // A "directory" exists but is not a file
    assert!(fs.exists("bkt").await?);
    assert!(!fs.is_file("bkt").await?);
    Ok(())
}

#[tokio::test]
async fn test_protocol_is_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let fs = BucketFs::in_memory();
    fs.write("s3://bkt/x.hdf", Bytes::from_static(b"1")).await?;
    assert!(fs.is_file("bkt/x.hdf").await?);
    assert_eq!(fs.strip_protocol("s3://bkt/x.hdf"), "bkt/x.hdf");
    Ok(())
}

#[tokio::test]
async fn test_read_missing_is_not_found() {
    let fs = BucketFs::in_memory();
    let err = fs.read("bkt/missing.hdf").await.expect_err("object is missing");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_write_replaces_object() -> Result<(), Box<dyn std::error::Error>> {
    let fs = BucketFs::in_memory();
    fs.write("bkt/a", Bytes::from_static(b"first")).await?;
    fs.write("bkt/a", Bytes::from_static(b"second")).await?;
    assert_eq!(fs.read("bkt/a").await?, Bytes::from_static(b"second"));

    fs.delete("bkt/a").await?;
    assert!(!fs.is_file("bkt/a").await?);
    // deleting again is fine
    fs.delete("bkt/a").await?;
    Ok(())
}

#[tokio::test]
async fn test_glob_versioned_layout() -> Result<(), Box<dyn std::error::Error>> {
    let fs = BucketFs::in_memory();
    for version in ["2024-01-02T00.00.00.000Z", "2024-01-01T00.00.00.000Z"] {
        fs.write(
            &format!("bkt/t.hdf/{version}/t.hdf"),
            Bytes::from_static(b"x"),
        )
        .await?;
    }
    fs.write("bkt/t.hdf/2024-01-03T00.00.00.000Z/other.hdf", Bytes::from_static(b"x"))
        .await?;
    fs.write("bkt/unrelated.hdf", Bytes::from_static(b"x")).await?;

    let found = fs.glob("bkt/t.hdf/*/t.hdf").await?;
    assert_eq!(
        found,
        vec![
            "bkt/t.hdf/2024-01-01T00.00.00.000Z/t.hdf".to_string(),
            "bkt/t.hdf/2024-01-02T00.00.00.000Z/t.hdf".to_string(),
        ]
    );

    let literal = fs.glob("bkt/unrelated.hdf").await?;
    assert_eq!(literal, vec!["bkt/unrelated.hdf".to_string()]);

    assert!(fs.glob("bkt/nothing/*/x").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_local_backend() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempfile::tempdir()?;
    let fs = BucketFs::new(Credentials::default(), StorageOptions::local(tmp.path()))?;

    fs.write("bkt/dir/file.hdf", Bytes::from_static(b"local")).await?;
    assert!(tmp.path().join("bkt/dir/file.hdf").exists());
    assert_eq!(fs.read("bkt/dir/file.hdf").await?, Bytes::from_static(b"local"));
    assert_eq!(fs.glob("bkt/*/file.hdf").await?, vec!["bkt/dir/file.hdf".to_string()]);
    Ok(())
}

#[test]
fn test_s3_backend_construction_is_lazy() -> Result<(), Box<dyn std::error::Error>> {
    let options = StorageOptions {
        region: Some("eu-west-1".to_string()),
        endpoint: Some("http://localhost:9000".to_string()),
        allow_http: true,
        ..StorageOptions::default()
    };
    let fs = BucketFs::new(Credentials::new("id", "secret"), options)?;
    assert!(fs.is_bucketed());

    // Building the per-bucket store needs no network access
    let (_, key) = fs.locate("s3://bkt/dir/file.hdf")?;
    assert_eq!(key.as_ref(), "dir/file.hdf");

    let shown = format!("{:?}", fs);
    assert!(!shown.contains("secret"));
    Ok(())
}

#[test]
fn test_invalid_options_fail_construction() {
    let options = StorageOptions {
        backend: bucketfs::Backend::Local,
        ..StorageOptions::default()
    };
    assert!(BucketFs::new(Credentials::default(), options).is_err());
}
