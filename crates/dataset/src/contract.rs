// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! The dataset contract a pipeline drives

use crate::Result;
use arrow::array::RecordBatch;
use async_trait::async_trait;
use h5store::{LoadOptions, SaveOptions};
use serde::Serialize;
use versioning::Version;

/// A named, optionally versioned source and sink of one table
#[async_trait]
pub trait VersionedDataset: Send + Sync {
    /// Read the table, from the most recent version unless one is pinned
    async fn load(&self) -> Result<RecordBatch>;

    /// Write the table, under a fresh version unless one is pinned
    async fn save(&self, data: &RecordBatch) -> Result<()>;

    /// Whether a load would find the table
    async fn exists(&self) -> Result<bool>;

    /// Descriptor of the dataset; never includes credentials
    fn describe(&self) -> DatasetDescription;

    /// Drop anything cached between operations
    async fn release(&self) -> Result<()> {
        Ok(())
    }
}

/// What a dataset reads and writes, suitable for logs and `describe` output
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DatasetDescription {
    pub filepath: String,
    pub key: String,
    pub load_options: LoadOptions,
    pub save_options: SaveOptions,
    pub version: Option<Version>,
}

impl std::fmt::Display for DatasetDescription {
    /// `filepath=.., key=.., ..`; absent values are left out
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let load = serde_json::to_string(&self.load_options).map_err(|_| std::fmt::Error)?;
        let save = serde_json::to_string(&self.save_options).map_err(|_| std::fmt::Error)?;
        write!(
            f,
            "filepath={}, key={}, load_options={}, save_options={}",
            self.filepath, self.key, load, save
        )?;
        if let Some(version) = &self.version {
            write!(f, ", version={version}")?;
        }
        Ok(())
    }
}
