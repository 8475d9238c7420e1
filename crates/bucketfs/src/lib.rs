// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Bucket filesystem: a small remote storage client over `object_store`
//!
//! Provides the handful of operations a versioned dataset needs from its
//! remote: protocol stripping, existence checks, globbing, and whole-object
//! reads and writes.
//!
//! # Usage
//!
//! ```no_run
//! # async fn example() -> bucketfs::Result<()> {
//! use bucketfs::{BucketFs, Credentials, StorageOptions};
//!
//! let fs = BucketFs::new(Credentials::default(), StorageOptions::default())?;
//! let versions = fs.glob("my-bucket/data.hdf/*/data.hdf").await?;
//! if let Some(latest) = versions.last() {
//!     let bytes = fs.read(latest).await?;
//!     assert!(!bytes.is_empty());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod fs;
pub mod glob;
mod options;
pub mod path;

pub use error::BucketFsError;
pub use fs::BucketFs;
pub use glob::GlobPattern;
pub use options::{Backend, Credentials, StorageOptions};

/// Result type for bucket operations
pub type Result<T> = std::result::Result<T, BucketFsError>;
