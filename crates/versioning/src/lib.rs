// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Versioned dataset paths
//!
//! Computes where a dataset is read from and written to, given an optional
//! [`Version`] selector and a [`VersionStore`] that answers existence and
//! glob queries against the remote. Knows nothing about the storage
//! client itself.

mod clock;
mod error;
mod resolver;
mod version;

pub use clock::VersionClock;
pub use error::{BoxError, VersionError};
pub use resolver::{ResolvedPath, VersionStore, VersionedPath};
pub use version::{VERSION_FORMAT, Version, format_version, parse_version};

/// Result type for version resolution
pub type Result<T> = std::result::Result<T, VersionError>;
