// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! On-image table layout
//!
//! One HDF5 group per key:
//!
//! - `_manifest`: one UTF-8 string, JSON [`TableManifest`]
//! - `_columns`: UTF-8 column names in schema order (the column axis)
//! - `_index`: `i64` row labels `0..nrows` (the row axis)
//! - `c<N>`: values of column N
//! - `c<N>_mask`: `u8` validity of column N, only when it has nulls
//!
//! A group holding `_manifest` is a table; any other group is a plain
//! container for nested keys.

use crate::{Result, StoreError};
use arrow::datatypes::Schema;
use serde::{Deserialize, Serialize};

pub const MANIFEST: &str = "_manifest";
pub const COLUMNS: &str = "_columns";
pub const INDEX: &str = "_index";

pub const FORMAT_VERSION: u32 = 1;
pub const TABLE_LAYOUT: &str = "table";

pub fn column_dataset(idx: usize) -> String {
    format!("c{idx}")
}

pub fn mask_dataset(idx: usize) -> String {
    format!("c{idx}_mask")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableManifest {
    pub format_version: u32,
    pub layout: String,
    pub nrows: u64,
    pub schema: Schema,
}

impl TableManifest {
    pub fn new(schema: Schema, nrows: usize) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            layout: TABLE_LAYOUT.to_string(),
            nrows: nrows as u64,
            schema,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(key: &str, json: &str) -> Result<Self> {
        let manifest: TableManifest = serde_json::from_str(json)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(StoreError::corrupt(
                key,
                format!("unsupported format version {}", manifest.format_version),
            ));
        }
        if manifest.layout != TABLE_LAYOUT {
            return Err(StoreError::corrupt(
                key,
                format!("unsupported layout '{}'", manifest.layout),
            ));
        }
        Ok(manifest)
    }

    pub fn nrows(&self) -> usize {
        self.nrows as usize
    }
}

/// Normalize a key to `/a/b` form
///
/// Leading and trailing slashes are optional on input. Empty components,
/// `.`/`..`, and names reserved by the layout are rejected.
pub fn normalize_key(key: &str) -> Result<String> {
    let trimmed = key.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    for component in trimmed.split('/') {
        let reserved = matches!(component, MANIFEST | COLUMNS | INDEX);
        if component.is_empty() || component == "." || component == ".." || reserved {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
    }
    Ok(format!("/{trimmed}"))
}
