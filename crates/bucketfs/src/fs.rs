// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The bucket filesystem client
//!
//! Paths handed to [`BucketFs`] are protocol-less and slash-separated. For
//! the S3 backend the first component names the bucket and one
//! `AmazonS3` store is built (and cached) per bucket. Every other backend
//! is a single store addressed by the full path.

use crate::glob::GlobPattern;
use crate::options::{Backend, Credentials, StorageOptions};
use crate::{BucketFsError, Result, path};
use bytes::Bytes;
use diagnostics::*;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

enum Stores {
    /// Bucket name -> store, built on first use
    PerBucket {
        credentials: Credentials,
        options: StorageOptions,
        cache: Mutex<HashMap<String, Arc<dyn ObjectStore>>>,
    },
    Single(Arc<dyn ObjectStore>),
}

/// Remote storage client used by datasets
pub struct BucketFs {
    stores: Stores,
}

impl std::fmt::Debug for BucketFs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.stores {
            Stores::PerBucket { options, .. } => f
                .debug_struct("BucketFs")
                .field("backend", &options.backend)
                .field("region", &options.region)
                .field("endpoint", &options.endpoint)
                .finish_non_exhaustive(),
            Stores::Single(store) => f
                .debug_struct("BucketFs")
                .field("store", &store.to_string())
                .finish(),
        }
    }
}

impl BucketFs {
    /// Build a client from credentials and options
    ///
    /// Fails when the options are inconsistent or the backing store cannot
    /// be created.
    pub fn new(credentials: Credentials, options: StorageOptions) -> Result<Self> {
        options.validate(&credentials)?;

        let stores = match options.backend {
            Backend::S3 => Stores::PerBucket {
                credentials,
                options,
                cache: Mutex::new(HashMap::new()),
            },
            Backend::Local => {
                let root = options.root.as_ref().ok_or_else(|| {
                    BucketFsError::configuration("the local backend requires a root directory")
                })?;
                std::fs::create_dir_all(root).map_err(|e| {
                    BucketFsError::configuration(format!(
                        "Failed to create local root {}: {}",
                        root.display(),
                        e
                    ))
                })?;
                let store = LocalFileSystem::new_with_prefix(root)?;
                Stores::Single(Arc::new(store))
            }
            Backend::Memory => Stores::Single(Arc::new(InMemory::new())),
        };

        Ok(Self { stores })
    }

    /// Wrap an existing store; paths are used as keys verbatim
    pub fn with_store(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            stores: Stores::Single(store),
        }
    }

    /// Fresh in-memory client
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemory::new()))
    }

    /// See [`path::strip_protocol`]
    pub fn strip_protocol(&self, path: &str) -> String {
        path::strip_protocol(path)
    }

    /// Whether the first component of paths names a bucket
    pub fn is_bucketed(&self) -> bool {
        matches!(self.stores, Stores::PerBucket { .. })
    }

    /// Resolve a path to its store and the key inside that store
    pub fn locate(&self, path: &str) -> Result<(Arc<dyn ObjectStore>, Path)> {
        let path = path::strip_protocol(path);
        match &self.stores {
            Stores::Single(store) => Ok((store.clone(), Path::parse(&path)?)),
            Stores::PerBucket {
                credentials,
                options,
                cache,
            } => {
                let (bucket, key) =
                    path::split_bucket(&path).ok_or_else(|| BucketFsError::MissingBucket(path.clone()))?;
                let mut cache = cache
                    .lock()
                    .map_err(|_| BucketFsError::configuration("store cache poisoned"))?;
                let store = match cache.get(bucket) {
                    Some(store) => store.clone(),
                    None => {
                        let store = build_s3_store(bucket, credentials, options)?;
                        _ = cache.insert(bucket.to_string(), store.clone());
                        store
                    }
                };
                Ok((store, Path::parse(key)?))
            }
        }
    }

    /// Re-attach the bucket for keys coming back from a listing
    fn display_path(&self, bucket: Option<&str>, key: &Path) -> String {
        match bucket {
            Some(bucket) => path::join(bucket, key.as_ref()),
            None => key.to_string(),
        }
    }

    /// True if an object exists at exactly this path
    pub async fn is_file(&self, path: &str) -> Result<bool> {
        let (store, key) = self.locate(path)?;
        match store.head(&key).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// True if an object exists at this path or any object lives below it
    pub async fn exists(&self, path: &str) -> Result<bool> {
        if self.is_file(path).await? {
            return Ok(true);
        }
        let (store, key) = self.locate(path)?;
        if key.as_ref().is_empty() {
            // bucket root
            return Ok(true);
        }
        let mut listing = store.list(Some(&key));
        Ok(listing.try_next().await?.is_some())
    }

    /// All object paths matching `pattern`, sorted
    pub async fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let stripped = path::strip_protocol(pattern);
        let glob = GlobPattern::parse(&stripped)?;

        if glob.is_literal() {
            return Ok(if self.is_file(&stripped).await? {
                vec![stripped]
            } else {
                Vec::new()
            });
        }

        let prefix = glob.literal_prefix();
        let bucket = if self.is_bucketed() {
            let (bucket, _) = path::split_bucket(&prefix).ok_or_else(|| {
                BucketFsError::glob(pattern, "the bucket component cannot contain wildcards")
            })?;
            Some(bucket.to_string())
        } else {
            None
        };

        let (store, key_prefix) = self.locate(&prefix)?;
        let list_prefix = (!key_prefix.as_ref().is_empty()).then_some(&key_prefix);

        let metas: Vec<_> = store.list(list_prefix).try_collect().await?;
        let mut matches: Vec<String> = metas
            .iter()
            .map(|meta| self.display_path(bucket.as_deref(), &meta.location))
            .filter(|p| glob.is_match(p))
            .collect();
        matches.sort();

        debug!(
            "glob {pattern} matched {count} objects",
            pattern: glob.as_str(),
            count: matches.len()
        );
        Ok(matches)
    }

    /// Read a whole object
    pub async fn read(&self, path: &str) -> Result<Bytes> {
        let (store, key) = self.locate(path)?;
        let bytes = store.get(&key).await?.bytes().await?;
        debug!("read {len} bytes from {path}", len: bytes.len(), path: path);
        Ok(bytes)
    }

    /// Create or replace a whole object
    pub async fn write(&self, path: &str, data: Bytes) -> Result<()> {
        let (store, key) = self.locate(path)?;
        let len = data.len();
        _ = store.put(&key, PutPayload::from(data)).await?;
        debug!("wrote {len} bytes to {path}", len: len, path: path);
        Ok(())
    }

    /// Remove an object; missing objects are not an error
    pub async fn delete(&self, path: &str) -> Result<()> {
        let (store, key) = self.locate(path)?;
        match store.delete(&key).await {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn build_s3_store(
    bucket: &str,
    credentials: &Credentials,
    options: &StorageOptions,
) -> Result<Arc<dyn ObjectStore>> {
    let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

    if let Some(region) = &options.region {
        builder = builder.with_region(region);
    }
    if let Some(endpoint) = &options.endpoint {
        builder = builder.with_endpoint(endpoint);
    }
    if options.allow_http {
        builder = builder.with_allow_http(true);
    }
    if let Some(key) = &credentials.aws_access_key_id {
        builder = builder.with_access_key_id(key);
    }
    if let Some(secret) = &credentials.aws_secret_access_key {
        builder = builder.with_secret_access_key(secret);
    }
    if let Some(token) = &credentials.aws_session_token {
        builder = builder.with_token(token);
    }

    let store = builder.build().map_err(|e| {
        BucketFsError::configuration(format!("Failed to build S3 store for bucket {}: {}", bucket, e))
    })?;

    info!("Built S3 store for bucket {bucket}", bucket: bucket);
    Ok(Arc::new(store))
}
