// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Version selectors and timestamp identifiers

use crate::{Result, VersionError};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version identifiers are UTC timestamps with millisecond precision.
///
/// The layout sorts lexically in chronological order and avoids ':' so the
/// identifier is safe as an object key component.
pub const VERSION_FORMAT: &str = "%Y-%m-%dT%H.%M.%S%.3fZ";

/// Which stored copy to read and which identifier to write under
///
/// `None` for `load` means "most recent existing version"; `None` for
/// `save` means "generate a fresh identifier".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Version {
    #[serde(default)]
    pub load: Option<String>,
    #[serde(default)]
    pub save: Option<String>,
}

impl Version {
    /// Load the latest version, save under a generated one
    pub fn latest() -> Self {
        Self::default()
    }

    pub fn new(load: Option<String>, save: Option<String>) -> Self {
        Self { load, save }
    }

    /// Both identifiers, when given, must be usable as one path component
    pub fn validate(&self) -> Result<()> {
        for v in [&self.load, &self.save].into_iter().flatten() {
            validate_identifier(v)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Version(load={}, save={})",
            self.load.as_deref().unwrap_or("None"),
            self.save.as_deref().unwrap_or("None")
        )
    }
}

pub(crate) fn validate_identifier(version: &str) -> Result<()> {
    if version.is_empty() || version.contains('/') || version == "." || version == ".." {
        return Err(VersionError::InvalidVersion(version.to_string()));
    }
    Ok(())
}

/// Render a timestamp as a version identifier
pub fn format_version(ts: DateTime<Utc>) -> String {
    ts.format(VERSION_FORMAT).to_string()
}

/// Parse a generated version identifier back into a timestamp
///
/// Caller-supplied identifiers need not be timestamps; those return `None`.
pub fn parse_version(version: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(version, VERSION_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}
