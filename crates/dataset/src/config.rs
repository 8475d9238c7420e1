// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! YAML catalog of datasets
//!
//! ```yaml
//! readings:
//!   filepath: s3://data/readings.hdf
//!   key: readings
//!   credentials: dev_s3
//!   versioned: true
//!   save_args:
//!     complevel: 5
//! ```
//!
//! Credentials are either written inline or name an entry of a separate
//! credentials document, so secrets can be kept out of the catalog.

use crate::hdf::{DatasetArgs, HdfRemoteDataset};
use crate::{DatasetError, Result};
use bucketfs::{BucketFs, Credentials, StorageOptions};
use h5store::{LoadOptions, SaveOptions};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use versioning::Version;

/// Inline credentials or the name of a credentials entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CredentialsRef {
    Named(String),
    Inline(Credentials),
}

/// One catalog entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    pub filepath: String,
    pub key: String,
    #[serde(default)]
    pub bucket_name: Option<String>,
    #[serde(default)]
    pub credentials: Option<CredentialsRef>,
    #[serde(default)]
    pub load_args: LoadOptions,
    #[serde(default)]
    pub save_args: SaveOptions,
    #[serde(default)]
    pub versioned: bool,
    #[serde(default)]
    pub storage_args: StorageOptions,
}

/// Versions pinned for one run, typically from the command line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PinnedVersions {
    pub load: Option<String>,
    pub save: Option<String>,
}

impl PinnedVersions {
    fn is_empty(&self) -> bool {
        self.load.is_none() && self.save.is_none()
    }
}

impl DatasetConfig {
    /// Resolve credentials and versions into constructor arguments
    pub fn to_args(
        &self,
        credentials: &HashMap<String, Credentials>,
        pinned: &PinnedVersions,
    ) -> Result<DatasetArgs> {
        let credentials = match &self.credentials {
            None => Credentials::default(),
            Some(CredentialsRef::Inline(inline)) => inline.clone(),
            Some(CredentialsRef::Named(name)) => credentials.get(name).cloned().ok_or_else(|| {
                DatasetError::configuration(format!("unknown credentials '{name}'"))
            })?,
        };

        let version = match (self.versioned, pinned.is_empty()) {
            (true, _) => Some(Version::new(pinned.load.clone(), pinned.save.clone())),
            (false, true) => None,
            (false, false) => {
                return Err(DatasetError::configuration(format!(
                    "{} is not versioned; a load or save version cannot be pinned",
                    self.filepath
                )));
            }
        };

        Ok(DatasetArgs {
            filepath: self.filepath.clone(),
            key: self.key.clone(),
            bucket_name: self.bucket_name.clone(),
            credentials,
            load_options: self.load_args.clone(),
            save_options: self.save_args.clone(),
            version,
            storage_options: self.storage_args.clone(),
        })
    }
}

/// Named dataset entries plus the credentials they may refer to
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    datasets: BTreeMap<String, DatasetConfig>,
    credentials: HashMap<String, Credentials>,
}

impl Catalog {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let datasets: BTreeMap<String, DatasetConfig> = serde_yaml_ng::from_str(yaml)?;
        Ok(Self {
            datasets,
            credentials: HashMap::new(),
        })
    }

    /// Add the entries of a credentials document (name -> credentials)
    pub fn with_credentials_yaml(mut self, yaml: &str) -> Result<Self> {
        let credentials: HashMap<String, Credentials> = serde_yaml_ng::from_str(yaml)?;
        self.credentials.extend(credentials);
        Ok(self)
    }

    pub fn from_files(catalog: &Path, credentials: Option<&Path>) -> Result<Self> {
        let mut loaded = Self::from_yaml(&read_file(catalog)?)?;
        if let Some(path) = credentials {
            loaded = loaded.with_credentials_yaml(&read_file(path)?)?;
        }
        Ok(loaded)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn config(&self, name: &str) -> Result<&DatasetConfig> {
        self.datasets
            .get(name)
            .ok_or_else(|| DatasetError::configuration(format!("no dataset named '{name}' in the catalog")))
    }

    pub fn args(&self, name: &str, pinned: &PinnedVersions) -> Result<DatasetArgs> {
        self.config(name)?.to_args(&self.credentials, pinned)
    }

    pub fn dataset(&self, name: &str, pinned: &PinnedVersions) -> Result<HdfRemoteDataset> {
        HdfRemoteDataset::new(self.args(name, pinned)?)
    }

    /// Like [`Catalog::dataset`], over an existing storage client
    pub fn dataset_with_storage(
        &self,
        name: &str,
        pinned: &PinnedVersions,
        fs: BucketFs,
    ) -> Result<HdfRemoteDataset> {
        HdfRemoteDataset::with_storage(fs, self.args(name, pinned)?)
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DatasetError::configuration(format!("Failed to read {}: {}", path.display(), e)))
}
