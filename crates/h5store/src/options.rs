// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Recognized load and save options
//!
//! Unknown keys are rejected when options are deserialized, so a typo in a
//! catalog entry fails at construction rather than being silently ignored.

use crate::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Options applied when reading a table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadOptions {
    /// Columns to read, in the order given; all columns when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,

    /// First row to read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,

    /// One past the last row to read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<usize>,
}

impl LoadOptions {
    /// Field-by-field merge; values set in `overrides` win
    pub fn merge(&self, overrides: &LoadOptions) -> LoadOptions {
        LoadOptions {
            columns: overrides.columns.clone().or_else(|| self.columns.clone()),
            start: overrides.start.or(self.start),
            stop: overrides.stop.or(self.stop),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(stop)) = (self.start, self.stop)
            && start > stop
        {
            return Err(StoreError::InvalidOption(format!(
                "start ({start}) is past stop ({stop})"
            )));
        }
        if let Some(columns) = &self.columns {
            let mut seen = HashSet::new();
            for c in columns {
                if !seen.insert(c.as_str()) {
                    return Err(StoreError::InvalidOption(format!(
                        "column '{c}' selected twice"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Clamp the row window to a table of `nrows` rows: `(offset, len)`
    pub(crate) fn window(&self, nrows: usize) -> (usize, usize) {
        let start = self.start.unwrap_or(0).min(nrows);
        let stop = self.stop.unwrap_or(nrows).min(nrows);
        (start, stop.saturating_sub(start))
    }
}

/// Options applied when writing a table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveOptions {
    /// Deflate level 0-9; 0 or absent disables compression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complevel: Option<u8>,

    /// Rows per chunk; setting it selects a chunked layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_rows: Option<usize>,
}

/// Chunk size used when compression is on and no size was given
pub const DEFAULT_CHUNK_ROWS: usize = 65_536;

impl SaveOptions {
    pub fn merge(&self, overrides: &SaveOptions) -> SaveOptions {
        SaveOptions {
            complevel: overrides.complevel.or(self.complevel),
            chunk_rows: overrides.chunk_rows.or(self.chunk_rows),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.complevel
            && level > 9
        {
            return Err(StoreError::InvalidOption(format!(
                "complevel must be 0-9, got {level}"
            )));
        }
        if self.chunk_rows == Some(0) {
            return Err(StoreError::InvalidOption(
                "chunk_rows must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn deflate_level(&self) -> Option<u8> {
        self.complevel.filter(|level| *level > 0)
    }

    /// Chunk length for a column of `nrows` rows, or `None` for contiguous
    pub(crate) fn chunk_len(&self, nrows: usize) -> Option<usize> {
        if nrows == 0 {
            return None;
        }
        match (self.chunk_rows, self.deflate_level()) {
            (Some(rows), _) => Some(rows.min(nrows)),
            (None, Some(_)) => Some(DEFAULT_CHUNK_ROWS.min(nrows)),
            (None, None) => None,
        }
    }
}
