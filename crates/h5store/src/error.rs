// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for table store operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("No object named '{0}' in the store")]
    KeyNotFound(String),

    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    #[error("Column '{column}' has unsupported type {data_type}")]
    UnsupportedType { column: String, data_type: String },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Column '{column}' holds a string HDF5 cannot store: {reason}")]
    InvalidString { column: String, reason: String },

    #[error("Store is opened read-only")]
    ReadOnly,

    #[error("Not a valid HDF5 image: {0}")]
    InvalidImage(String),

    #[error("Corrupt table '{key}': {reason}")]
    Corrupt { key: String, reason: String },

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl StoreError {
    pub(crate) fn corrupt<K: AsRef<str>, R: Into<String>>(key: K, reason: R) -> Self {
        StoreError::Corrupt {
            key: key.as_ref().to_string(),
            reason: reason.into(),
        }
    }
}
