// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! HDF5 tables stored as whole objects in a bucket

use crate::contract::{DatasetDescription, VersionedDataset};
use crate::{DatasetError, Result};
use arrow::array::RecordBatch;
use async_trait::async_trait;
use bucketfs::{BucketFs, Credentials, StorageOptions};
use bytes::Bytes;
use diagnostics::*;
use h5store::{HdfStore, LoadOptions, SaveOptions};
use versioning::{BoxError, ResolvedPath, Version, VersionError, VersionStore, VersionedPath};

/// Construction arguments for [`HdfRemoteDataset`]
#[derive(Clone, Debug, Default)]
pub struct DatasetArgs {
    /// Object path, with or without a protocol prefix
    pub filepath: String,
    /// Key of the table inside the HDF5 file
    pub key: String,
    /// Prepended to the protocol-less path when given
    pub bucket_name: Option<String>,
    pub credentials: Credentials,
    pub load_options: LoadOptions,
    pub save_options: SaveOptions,
    /// `None` for an unversioned dataset
    pub version: Option<Version>,
    pub storage_options: StorageOptions,
}

impl DatasetArgs {
    pub fn new<P: Into<String>, K: Into<String>>(filepath: P, key: K) -> Self {
        Self {
            filepath: filepath.into(),
            key: key.into(),
            ..Self::default()
        }
    }
}

/// Answers version lookups through the storage client
struct RemoteVersions<'a>(&'a BucketFs);

#[async_trait]
impl VersionStore for RemoteVersions<'_> {
    async fn exists(&self, path: &str) -> std::result::Result<bool, BoxError> {
        self.0.exists(path).await.map_err(BoxError::from)
    }

    async fn glob(&self, pattern: &str) -> std::result::Result<Vec<String>, BoxError> {
        self.0.glob(pattern).await.map_err(BoxError::from)
    }
}

/// One table, under one key, of an HDF5 file kept in object storage
///
/// Nothing is cached: every operation fetches or rebuilds the complete
/// file image.
#[derive(Debug)]
pub struct HdfRemoteDataset {
    key: String,
    load_options: LoadOptions,
    save_options: SaveOptions,
    path: VersionedPath,
    fs: BucketFs,
}

impl HdfRemoteDataset {
    /// Build the storage client from the arguments' credentials and options
    pub fn new(args: DatasetArgs) -> Result<Self> {
        let fs = BucketFs::new(args.credentials.clone(), args.storage_options.clone())?;
        Self::with_storage(fs, args)
    }

    /// Use an already constructed storage client; credentials and storage
    /// options in `args` are ignored
    pub fn with_storage(fs: BucketFs, args: DatasetArgs) -> Result<Self> {
        let stripped = fs.strip_protocol(&args.filepath);
        if stripped.is_empty() {
            return Err(DatasetError::configuration(format!(
                "filepath '{}' names no object",
                args.filepath
            )));
        }
        if args.key.trim().is_empty() {
            return Err(DatasetError::configuration("key must not be empty"));
        }
        if args.key.trim() != args.key {
            return Err(DatasetError::configuration(format!(
                "key '{}' has surrounding whitespace",
                args.key
            )));
        }
        _ = h5store::normalize_key(&args.key).map_err(invalid_argument)?;

        let filepath = match args.bucket_name.as_deref().map(|b| b.trim_matches('/')) {
            Some(bucket) if !bucket.is_empty() => bucketfs::path::join(bucket, &stripped),
            _ => stripped,
        };

        let load_options = LoadOptions::default().merge(&args.load_options);
        load_options.validate().map_err(invalid_argument)?;
        let save_options = SaveOptions::default().merge(&args.save_options);
        save_options.validate().map_err(invalid_argument)?;

        let path = VersionedPath::new(filepath, args.version)?;
        debug!(
            "configured dataset {filepath} key {key}",
            filepath: path.filepath(),
            key: args.key.as_str()
        );

        Ok(Self {
            key: args.key,
            load_options,
            save_options,
            path,
            fs,
        })
    }

    /// Normalized object path, bucket included
    pub fn filepath(&self) -> &str {
        self.path.filepath()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn versions(&self) -> RemoteVersions<'_> {
        RemoteVersions(&self.fs)
    }

    fn file_name(&self) -> String {
        bucketfs::path::basename(self.path.filepath()).to_string()
    }

    /// Stored versions of this dataset, oldest first
    pub async fn list_versions(&self) -> Result<Vec<String>> {
        Ok(self.path.list_versions(&self.versions()).await?)
    }

    /// Path and version the next load would read
    pub async fn load_path(&self) -> Result<ResolvedPath> {
        Ok(self.path.load_path(&self.versions()).await?)
    }

    /// Save and report where the table was written
    pub async fn save_resolved(&self, data: &RecordBatch) -> Result<ResolvedPath> {
        let resolved = self.path.save_path(&self.versions()).await?;

        let name = self.file_name();
        let key = self.key.clone();
        let options = self.save_options.clone();
        let data = data.clone();
        let image = tokio::task::spawn_blocking(move || {
            let store = HdfStore::create(&name)?;
            store.put(&key, &data, &options)?;
            store.to_image()
        })
        .await??;

        let len = image.len();
        self.fs.write(&resolved.path, Bytes::from(image)).await?;
        info!(
            "saved {key} to {path} ({len} bytes)",
            key: self.key.as_str(),
            path: resolved.path.as_str(),
            len: len
        );

        if let Some(saved) = &resolved.version {
            self.check_versions(saved).await;
        }
        Ok(resolved)
    }

    /// The version a load would read now, when it is not `saved`
    pub async fn version_mismatch(&self, saved: &str) -> Result<Option<String>> {
        let load = self.path.resolve_load_version(&self.versions()).await?;
        Ok(mismatched(saved, load))
    }

    async fn check_versions(&self, saved: &str) {
        match self.version_mismatch(saved).await {
            Ok(Some(load)) => {
                let dataset = self.to_string();
                warn!(
                    "save version {saved} did not match load version {load} for {dataset}; this is strongly discouraged and may cause inconsistencies",
                    saved: saved,
                    load: load.as_str(),
                    dataset: dataset.as_str()
                );
            }
            Ok(None) => {}
            Err(e) => {
                let error = e.to_string();
                warn!(
                    "could not resolve the load version after saving {saved}: {error}",
                    saved: saved,
                    error: error.as_str()
                );
            }
        }
    }
}

/// Invalid key or options given at construction
fn invalid_argument(e: h5store::StoreError) -> DatasetError {
    DatasetError::configuration(e.to_string())
}

fn mismatched(saved: &str, load: Option<String>) -> Option<String> {
    load.filter(|load| load != saved)
}

#[async_trait]
impl VersionedDataset for HdfRemoteDataset {
    async fn load(&self) -> Result<RecordBatch> {
        let resolved = self.load_path().await?;
        let bytes = self.fs.read(&resolved.path).await?;

        let name = self.file_name();
        let key = self.key.clone();
        let options = self.load_options.clone();
        let batch = tokio::task::spawn_blocking(move || {
            let store = HdfStore::open_image(&name, &bytes)?;
            store.get(&key, &options)
        })
        .await??;

        info!(
            "loaded {rows} rows of {key} from {path}",
            rows: batch.num_rows(),
            key: self.key.as_str(),
            path: resolved.path.as_str()
        );
        Ok(batch)
    }

    async fn save(&self, data: &RecordBatch) -> Result<()> {
        _ = self.save_resolved(data).await?;
        Ok(())
    }

    async fn exists(&self) -> Result<bool> {
        let resolved = match self.path.load_path(&self.versions()).await {
            Ok(resolved) => resolved,
            Err(VersionError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        if !self.fs.is_file(&resolved.path).await? {
            return Ok(false);
        }

        let bytes = self.fs.read(&resolved.path).await?;
        let name = self.file_name();
        let key = self.key.clone();
        let found = tokio::task::spawn_blocking(move || {
            let store = HdfStore::open_image(&name, &bytes)?;
            store.contains(&key)
        })
        .await??;
        Ok(found)
    }

    fn describe(&self) -> DatasetDescription {
        DatasetDescription {
            filepath: self.path.filepath().to_string(),
            key: self.key.clone(),
            load_options: self.load_options.clone(),
            save_options: self.save_options.clone(),
            version: self.path.version().cloned(),
        }
    }
}

impl std::fmt::Display for HdfRemoteDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HdfRemoteDataset({})", self.describe())
    }
}
