// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for dataset operations

use bucketfs::BucketFsError;
use h5store::StoreError;
use thiserror::Error;
use versioning::VersionError;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] BucketFsError),

    #[error("Format error: {0}")]
    Format(#[from] StoreError),

    #[error("Save path '{0}' must not exist if versioning is enabled")]
    SaveExists(String),

    #[error("Version lookup failed: {0}")]
    Lookup(#[source] versioning::BoxError),

    #[error("Catalog parse error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl DatasetError {
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        DatasetError::Configuration(msg.into())
    }

    /// Recover the storage error a version lookup was wrapping
    fn from_lookup(source: versioning::BoxError) -> Self {
        match source.downcast::<BucketFsError>() {
            Ok(storage) => DatasetError::Storage(*storage),
            Err(other) => DatasetError::Lookup(other),
        }
    }
}

impl From<VersionError> for DatasetError {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::NotFound(path) => DatasetError::VersionNotFound(path),
            VersionError::SaveExists(path) => DatasetError::SaveExists(path),
            VersionError::InvalidVersion(_) => DatasetError::Configuration(err.to_string()),
            VersionError::Lookup(source) => DatasetError::from_lookup(source),
        }
    }
}
