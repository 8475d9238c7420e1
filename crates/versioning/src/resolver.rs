// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Resolve a logical dataset path into concrete load and save paths
//!
//! A versioned dataset at `<filepath>` keeps each copy at
//! `<filepath>/<version>/<basename(filepath)>`. An unversioned dataset is
//! read and written at `<filepath>` directly.

use crate::clock::VersionClock;
use crate::error::BoxError;
use crate::version::{Version, validate_identifier};
use crate::{Result, VersionError};
use async_trait::async_trait;
use diagnostics::*;

/// Storage callbacks needed to resolve versions
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// True if an object exists at `path`
    async fn exists(&self, path: &str) -> std::result::Result<bool, BoxError>;

    /// Every object path matching a `*` glob pattern
    async fn glob(&self, pattern: &str) -> std::result::Result<Vec<String>, BoxError>;
}

/// A concrete path plus the version identifier it was resolved from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: String,
    /// `None` for unversioned datasets
    pub version: Option<String>,
}

impl ResolvedPath {
    fn unversioned(path: &str) -> Self {
        Self {
            path: path.to_string(),
            version: None,
        }
    }
}

fn basename(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Parent directory name of a versioned object path, i.e. its version
fn version_component(path: &str) -> Option<&str> {
    let (dir, _) = path.trim_end_matches('/').rsplit_once('/')?;
    Some(dir.rsplit_once('/').map_or(dir, |(_, name)| name))
}

/// Versioning helper for one dataset path
#[derive(Debug)]
pub struct VersionedPath {
    filepath: String,
    version: Option<Version>,
    clock: VersionClock,
}

impl VersionedPath {
    /// `filepath` is the normalized, protocol-less dataset path
    pub fn new<S: Into<String>>(filepath: S, version: Option<Version>) -> Result<Self> {
        let filepath = filepath.into().trim_end_matches('/').to_string();
        if let Some(version) = &version {
            version.validate()?;
        }
        Ok(Self {
            filepath,
            version,
            clock: VersionClock::new(),
        })
    }

    pub fn filepath(&self) -> &str {
        &self.filepath
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// `<filepath>/<version>/<basename>`
    pub fn versioned_path(&self, version: &str) -> String {
        format!("{}/{}/{}", self.filepath, version, basename(&self.filepath))
    }

    /// Existing versions, oldest first
    pub async fn list_versions(&self, store: &dyn VersionStore) -> Result<Vec<String>> {
        let pattern = self.versioned_path("*");
        let candidates = store.glob(&pattern).await.map_err(VersionError::Lookup)?;

        let mut versions = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(version) = version_component(&candidate) else {
                continue;
            };
            if self.versioned_path(version) != candidate.trim_matches('/') {
                continue;
            }
            if store.exists(&candidate).await.map_err(VersionError::Lookup)? {
                versions.push(version.to_string());
            }
        }
        versions.sort();
        versions.dedup();
        Ok(versions)
    }

    /// Pinned load version, or the most recent existing one
    ///
    /// Returns `Ok(None)` for unversioned datasets.
    pub async fn resolve_load_version(&self, store: &dyn VersionStore) -> Result<Option<String>> {
        let Some(version) = &self.version else {
            return Ok(None);
        };
        if let Some(load) = &version.load {
            return Ok(Some(load.clone()));
        }

        let most_recent = self.list_versions(store).await?.pop();
        match most_recent {
            Some(v) => {
                debug!("resolved latest version {version} for {path}", version: v.as_str(), path: self.filepath.as_str());
                Ok(Some(v))
            }
            None => Err(VersionError::NotFound(self.filepath.clone())),
        }
    }

    pub async fn load_path(&self, store: &dyn VersionStore) -> Result<ResolvedPath> {
        match self.resolve_load_version(store).await? {
            None => Ok(ResolvedPath::unversioned(&self.filepath)),
            Some(version) => Ok(ResolvedPath {
                path: self.versioned_path(&version),
                version: Some(version),
            }),
        }
    }

    /// Pinned save version, or a freshly generated one
    ///
    /// Each call without a pinned version issues a new identifier, later
    /// than every identifier issued before by this helper.
    pub fn resolve_save_version(&self) -> Result<Option<String>> {
        let Some(version) = &self.version else {
            return Ok(None);
        };
        let save = match &version.save {
            Some(save) => save.clone(),
            None => self.clock.next(),
        };
        validate_identifier(&save)?;
        Ok(Some(save))
    }

    /// Concrete save path; a versioned save path must not already exist
    pub async fn save_path(&self, store: &dyn VersionStore) -> Result<ResolvedPath> {
        let Some(version) = self.resolve_save_version()? else {
            return Ok(ResolvedPath::unversioned(&self.filepath));
        };

        let path = self.versioned_path(&version);
        if store.exists(&path).await.map_err(VersionError::Lookup)? {
            return Err(VersionError::SaveExists(path));
        }
        Ok(ResolvedPath {
            path,
            version: Some(version),
        })
    }
}
