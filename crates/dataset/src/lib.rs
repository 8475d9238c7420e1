// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Versioned HDF5 table datasets in object storage
//!
//! [`HdfRemoteDataset`] reads and writes one table, under one key, of an
//! HDF5 file stored as a single object. Paths may carry a protocol prefix
//! and an optional bucket name; versioned datasets keep every save under
//! `<filepath>/<version>/<file name>` and load the most recent one unless a
//! version is pinned.
//!
//! ```no_run
//! # async fn example(batch: arrow::array::RecordBatch) -> dataset::Result<()> {
//! use dataset::{DatasetArgs, HdfRemoteDataset, VersionedDataset};
//!
//! let mut args = DatasetArgs::new("s3://test.hdf", "test_hdf_key");
//! args.bucket_name = Some("test_bucket".to_string());
//! let ds = HdfRemoteDataset::new(args)?;
//!
//! ds.save(&batch).await?;
//! assert!(ds.exists().await?);
//! assert_eq!(ds.load().await?, batch);
//! # Ok(())
//! # }
//! ```

mod config;
mod contract;
mod error;
mod hdf;

pub use config::{Catalog, CredentialsRef, DatasetConfig, PinnedVersions};
pub use contract::{DatasetDescription, VersionedDataset};
pub use error::DatasetError;
pub use hdf::{DatasetArgs, HdfRemoteDataset};

pub use bucketfs::{BucketFs, Credentials, StorageOptions};
pub use h5store::{LoadOptions, SaveOptions};
pub use versioning::{ResolvedPath, Version};

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;
