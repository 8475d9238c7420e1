// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Storage client configuration: which backend to talk to and how to
//! authenticate against it.

use crate::{BucketFsError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Secrets used to reach an S3-compatible bucket
///
/// `Debug` output never shows the secret values.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    #[serde(default, alias = "key")]
    pub aws_access_key_id: Option<String>,

    #[serde(default, alias = "secret")]
    pub aws_secret_access_key: Option<String>,

    #[serde(default, alias = "token")]
    pub aws_session_token: Option<String>,
}

impl Credentials {
    pub fn new<K: Into<String>, S: Into<String>>(access_key_id: K, secret_access_key: S) -> Self {
        Self {
            aws_access_key_id: Some(access_key_id.into()),
            aws_secret_access_key: Some(secret_access_key.into()),
            aws_session_token: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.aws_access_key_id.is_none()
            && self.aws_secret_access_key.is_none()
            && self.aws_session_token.is_none()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(v: &Option<String>) -> &'static str {
            if v.is_some() { "<redacted>" } else { "<unset>" }
        }
        f.debug_struct("Credentials")
            .field("aws_access_key_id", &redact(&self.aws_access_key_id))
            .field("aws_secret_access_key", &redact(&self.aws_secret_access_key))
            .field("aws_session_token", &redact(&self.aws_session_token))
            .finish()
    }
}

/// Storage backend kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// S3 or an S3-compatible service; the first path component is the bucket
    #[default]
    S3,
    /// A directory on the local filesystem standing in for the remote
    Local,
    /// Process-local in-memory store
    Memory,
}

/// Options for building a [`crate::BucketFs`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageOptions {
    #[serde(default)]
    pub backend: Backend,

    /// Root directory for the `local` backend
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// AWS region (S3 only)
    #[serde(default)]
    pub region: Option<String>,

    /// Custom S3 endpoint (for MinIO, R2, etc.)
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Permit plain-http endpoints (S3 only)
    #[serde(default)]
    pub allow_http: bool,
}

impl StorageOptions {
    pub fn local<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            backend: Backend::Local,
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Reject combinations the selected backend cannot honor
    pub fn validate(&self, credentials: &Credentials) -> Result<()> {
        match self.backend {
            Backend::S3 => {
                if credentials.aws_access_key_id.is_some()
                    != credentials.aws_secret_access_key.is_some()
                {
                    return Err(BucketFsError::configuration(
                        "aws_access_key_id and aws_secret_access_key must be given together",
                    ));
                }
                if self.root.is_some() {
                    return Err(BucketFsError::configuration(
                        "root is only valid for the local backend",
                    ));
                }
                Ok(())
            }
            Backend::Local => {
                if self.root.is_none() {
                    return Err(BucketFsError::configuration(
                        "the local backend requires a root directory",
                    ));
                }
                Ok(())
            }
            Backend::Memory => Ok(()),
        }
    }
}
