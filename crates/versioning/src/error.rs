// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for version resolution

use thiserror::Error;

/// Boxed error returned by [`crate::VersionStore`] callbacks
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Did not find any versions for {0}")]
    NotFound(String),

    #[error("Save path '{0}' must not exist if versioning is enabled")]
    SaveExists(String),

    #[error("Invalid version identifier '{0}': must be a single non-empty path component")]
    InvalidVersion(String),

    #[error("Version lookup failed: {0}")]
    Lookup(#[source] BoxError),
}
