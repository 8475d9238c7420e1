// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use arrow::array::{Float64Array, Int64Array, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use dataset::{
    BucketFs, DatasetArgs, DatasetError, HdfRemoteDataset, LoadOptions, StorageOptions, Version,
    VersionedDataset,
};
use object_store::ObjectStore;
use object_store::memory::InMemory;
use std::sync::Arc;

fn dummy_table() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("col1", DataType::Int64, false),
        Field::new("col2", DataType::Int64, false),
        Field::new("col3", DataType::Int64, false),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(Int64Array::from(vec![4, 5])),
            Arc::new(Int64Array::from(vec![5, 6])),
        ],
    )
    .expect("valid batch")
}

fn readings() -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("station", DataType::Utf8, true),
        Field::new("value", DataType::Float64, true),
    ]);
    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(StringArray::from(vec![Some("north"), None, Some("east")])),
            Arc::new(Float64Array::from(vec![Some(1.5), Some(2.5), None])),
        ],
    )
    .expect("valid batch")
}

fn shared_store() -> Arc<dyn ObjectStore> {
    Arc::new(InMemory::new())
}

fn args(filepath: &str, key: &str, version: Option<Version>) -> DatasetArgs {
    let mut args = DatasetArgs::new(filepath, key);
    args.bucket_name = Some("test_bucket".to_string());
    args.version = version;
    args
}

fn open(store: &Arc<dyn ObjectStore>, args: DatasetArgs) -> HdfRemoteDataset {
    HdfRemoteDataset::with_storage(BucketFs::with_store(store.clone()), args).expect("dataset")
}

#[tokio::test]
async fn test_save_and_load() {
    let store = shared_store();
    let ds = open(&store, args("test.hdf", "test_hdf_key", None));
    assert_eq!(ds.filepath(), "test_bucket/test.hdf");

    assert!(!ds.exists().await.expect("exists"));
    ds.save(&dummy_table()).await.expect("save");
    assert!(ds.exists().await.expect("exists"));

    let loaded = ds.load().await.expect("load");
    assert_eq!(loaded, dummy_table());
    ds.release().await.expect("release");
}

#[tokio::test]
async fn test_protocol_prefix_is_stripped() {
    let store = shared_store();
    let saver = open(&store, args("s3://test.hdf", "test_hdf_key", None));
    assert_eq!(saver.filepath(), "test_bucket/test.hdf");
    saver.save(&dummy_table()).await.expect("save");

    let loader = open(&store, args("test.hdf", "/test_hdf_key", None));
    assert_eq!(loader.load().await.expect("load"), dummy_table());
}

#[tokio::test]
async fn test_load_missing_object_is_storage_error() {
    let ds = open(&shared_store(), args("test.hdf", "test_hdf_key", None));
    match ds.load().await {
        Err(DatasetError::Storage(e)) => assert!(e.is_not_found()),
        other => panic!("expected storage error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_key_is_format_error() {
    let store = shared_store();
    open(&store, args("test.hdf", "present", None))
        .save(&dummy_table())
        .await
        .expect("save");

    let other_key = open(&store, args("test.hdf", "absent", None));
    assert!(!other_key.exists().await.expect("exists"));
    assert!(matches!(other_key.load().await, Err(DatasetError::Format(_))));
}

#[tokio::test]
async fn test_save_replaces_whole_object() {
    let store = shared_store();
    let first = open(&store, args("test.hdf", "first", None));
    let second = open(&store, args("test.hdf", "second", None));

    first.save(&dummy_table()).await.expect("save first");
    second.save(&readings()).await.expect("save second");

    assert!(second.exists().await.expect("exists"));
    assert!(!first.exists().await.expect("exists"));
}

#[tokio::test]
async fn test_not_a_table_image() {
    let store = shared_store();
    let fs = BucketFs::with_store(store.clone());
    fs.write("test_bucket/test.hdf", bytes::Bytes::from_static(b"plain text"))
        .await
        .expect("write");

    let ds = open(&store, args("test.hdf", "k", None));
    assert!(matches!(ds.load().await, Err(DatasetError::Format(_))));
    assert!(matches!(ds.exists().await, Err(DatasetError::Format(_))));
}

#[tokio::test]
async fn test_versioned_saves_are_distinct_and_latest_loads() {
    let store = shared_store();
    let ds = open(&store, args("test.hdf", "test_hdf_key", Some(Version::latest())));

    assert!(!ds.exists().await.expect("exists"));
    assert!(matches!(ds.load().await, Err(DatasetError::VersionNotFound(_))));

    let first = ds.save_resolved(&dummy_table()).await.expect("first save");
    let second = ds.save_resolved(&readings()).await.expect("second save");

    let (v1, v2) = (
        first.version.clone().expect("versioned"),
        second.version.clone().expect("versioned"),
    );
    assert!(v1 < v2);
    assert_eq!(first.path, format!("test_bucket/test.hdf/{v1}/test.hdf"));
    assert_ne!(first.path, second.path);

    assert!(ds.exists().await.expect("exists"));
    assert_eq!(ds.load().await.expect("load"), readings());
    assert_eq!(ds.list_versions().await.expect("versions"), vec![v1, v2]);
}

#[tokio::test]
async fn test_pinned_load_version() {
    let store = shared_store();
    let ds = open(&store, args("test.hdf", "test_hdf_key", Some(Version::latest())));
    let first = ds.save_resolved(&dummy_table()).await.expect("save");
    ds.save(&readings()).await.expect("save");

    let pinned = open(
        &store,
        args("test.hdf", "test_hdf_key", Some(Version::new(first.version, None))),
    );
    assert_eq!(pinned.load().await.expect("load"), dummy_table());

    let unknown = open(
        &store,
        args(
            "test.hdf",
            "test_hdf_key",
            Some(Version::new(Some("2000-01-01T00.00.00.000Z".to_string()), None)),
        ),
    );
    assert!(!unknown.exists().await.expect("exists"));
    assert!(matches!(unknown.load().await, Err(DatasetError::Storage(_))));
}

#[tokio::test]
async fn test_save_with_pinned_load_reports_mismatch() {
    let store = shared_store();
    let unpinned = open(&store, args("test.hdf", "test_hdf_key", Some(Version::latest())));
    let first = unpinned.save_resolved(&dummy_table()).await.expect("save");
    let v1 = first.version.expect("versioned");
    assert_eq!(unpinned.version_mismatch(&v1).await.expect("mismatch"), None);

    // A separate dataset has its own version clock
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let pinned_load = open(
        &store,
        args("test.hdf", "test_hdf_key", Some(Version::new(Some(v1.clone()), None))),
    );
    let second = pinned_load.save_resolved(&readings()).await.expect("save");
    let v2 = second.version.expect("versioned");
    assert_ne!(v1, v2);
    assert_eq!(
        pinned_load.version_mismatch(&v2).await.expect("mismatch"),
        Some(v1.clone())
    );

    // The pinned load still reads the older table
    assert_eq!(pinned_load.load().await.expect("load"), dummy_table());
    assert_eq!(unpinned.version_mismatch(&v2).await.expect("mismatch"), None);
}

#[tokio::test]
async fn test_pinned_save_version_cannot_overwrite() {
    let store = shared_store();
    let version = Version::new(None, Some("2019-01-01T23.59.59.999Z".to_string()));
    let ds = open(&store, args("test.hdf", "test_hdf_key", Some(version)));

    let saved = ds.save_resolved(&dummy_table()).await.expect("save");
    assert_eq!(saved.path, "test_bucket/test.hdf/2019-01-01T23.59.59.999Z/test.hdf");
    match ds.save(&dummy_table()).await {
        Err(DatasetError::SaveExists(path)) => assert_eq!(path, saved.path),
        other => panic!("expected SaveExists, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unversioned_dataset_ignores_versioned_copies() {
    let store = shared_store();
    open(&store, args("test.hdf", "k", Some(Version::latest())))
        .save(&dummy_table())
        .await
        .expect("versioned save");

    // Only a prefix exists at the plain path, not an object
    let plain = open(&store, args("test.hdf", "k", None));
    assert!(!plain.exists().await.expect("exists"));
}

#[tokio::test]
async fn test_load_options_project_and_window() {
    let store = shared_store();
    let mut save_args = args("test.hdf", "readings", None);
    save_args.save_options.complevel = Some(6);
    open(&store, save_args).save(&readings()).await.expect("save");

    let mut load_args = args("test.hdf", "readings", None);
    load_args.load_options = LoadOptions {
        columns: Some(vec!["value".to_string()]),
        start: Some(1),
        stop: None,
    };
    let loaded = open(&store, load_args).load().await.expect("load");
    assert_eq!(loaded.num_columns(), 1);
    assert_eq!(loaded.num_rows(), 2);
    assert_eq!(loaded.schema().field(0).name(), "value");
}

#[tokio::test]
async fn test_describe_has_five_fields_and_no_credentials() {
    let mut with_secrets = args("s3://test.hdf", "test_hdf_key", Some(Version::latest()));
    with_secrets.credentials.aws_access_key_id = Some("AKIA".to_string());
    with_secrets.credentials.aws_secret_access_key = Some("hush".to_string());
    let ds = open(&shared_store(), with_secrets);

    let description = ds.describe();
    assert_eq!(description.filepath, "test_bucket/test.hdf");
    assert_eq!(description.key, "test_hdf_key");
    assert_eq!(description.version, Some(Version::latest()));

    let json = serde_json::to_value(&description).expect("json");
    let fields: Vec<&String> = json.as_object().expect("object").keys().collect();
    assert_eq!(
        fields,
        vec!["filepath", "key", "load_options", "save_options", "version"]
    );
    let rendered = format!("{json} {ds} {ds:?}");
    assert!(!rendered.contains("AKIA"));
    assert!(!rendered.contains("hush"));
}

#[tokio::test]
async fn test_local_backend_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut local = DatasetArgs::new("file:///data/test.hdf", "test_hdf_key");
    local.storage_options = StorageOptions::local(dir.path());
    local.version = Some(Version::latest());

    let ds = HdfRemoteDataset::new(local).expect("dataset");
    let saved = ds.save_resolved(&dummy_table()).await.expect("save");
    assert!(dir.path().join(&saved.path).is_file());
    assert_eq!(ds.load().await.expect("load"), dummy_table());
}
