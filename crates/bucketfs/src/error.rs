// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for bucket storage operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BucketFsError {
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Invalid object path: {0}")]
    InvalidPath(#[from] object_store::path::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    Glob { pattern: String, reason: String },

    #[error("Path has no bucket component: {0}")]
    MissingBucket(String),
}

impl BucketFsError {
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        BucketFsError::Configuration(msg.into())
    }

    pub fn glob<P: AsRef<str>, R: Into<String>>(pattern: P, reason: R) -> Self {
        BucketFsError::Glob {
            pattern: pattern.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    /// True when the underlying store reported a missing object
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BucketFsError::ObjectStore(object_store::Error::NotFound { .. })
        )
    }
}
