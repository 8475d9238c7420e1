// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory table store

use crate::columns::{is_supported, read_column, read_values, to_varlen, write_column, write_values};
use crate::image;
use crate::layout::{COLUMNS, INDEX, MANIFEST, TableManifest, normalize_key};
use crate::options::{LoadOptions, SaveOptions};
use crate::{Result, StoreError};
use arrow::array::{ArrayRef, RecordBatch, RecordBatchOptions};
use arrow::datatypes::Schema;
use diagnostics::*;
use hdf5::types::VarLenUnicode;
use hdf5::{File, Group};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Read,
    Write,
}

/// An HDF5 file held entirely in memory
///
/// Opened read-only over an existing image, or created empty for writing
/// and exported with [`HdfStore::to_image`]. Every call holds the crate-wide
/// HDF5 lock for its duration.
pub struct HdfStore {
    file: Option<File>,
    mode: Mode,
    name: String,
}

impl std::fmt::Debug for HdfStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HdfStore")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .finish()
    }
}

impl HdfStore {
    /// A fresh, empty, writable store
    pub fn create(name: &str) -> Result<Self> {
        let _guard = image::lock();
        let file = image::create(&image::unique_name(name))?;
        debug!("created in-memory store {name}", name: name);
        Ok(Self {
            file: Some(file),
            mode: Mode::Write,
            name: name.to_string(),
        })
    }

    /// A read-only store over a copy of `image`
    pub fn open_image(name: &str, image: &[u8]) -> Result<Self> {
        let _guard = image::lock();
        let file = image::open(&image::unique_name(name), image)?;
        debug!("opened {len} byte image as {name}", len: image.len(), name: name);
        Ok(Self {
            file: Some(file),
            mode: Mode::Read,
            name: name.to_string(),
        })
    }

    fn file(&self) -> Result<&File> {
        self.file
            .as_ref()
            .ok_or_else(|| StoreError::InvalidImage("store is closed".to_string()))
    }

    /// Write `batch` as a table under `key`, replacing any object already there
    pub fn put(&self, key: &str, batch: &RecordBatch, options: &SaveOptions) -> Result<()> {
        if self.mode != Mode::Write {
            return Err(StoreError::ReadOnly);
        }
        options.validate()?;
        let key = normalize_key(key)?;

        let schema = batch.schema();
        if let Some(field) = schema.fields().iter().find(|f| !is_supported(f.data_type())) {
            return Err(StoreError::UnsupportedType {
                column: field.name().clone(),
                data_type: field.data_type().to_string(),
            });
        }

        let _guard = image::lock();
        let group = create_table_group(self.file()?, &key)?;
        let nrows = batch.num_rows();

        let manifest = TableManifest::new(schema.as_ref().clone(), nrows);
        let manifest_json = manifest.to_json()?;
        write_values(&group, MANIFEST, &to_varlen(MANIFEST, &[manifest_json.as_str()])?, &SaveOptions::default())?;

        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        write_values(&group, COLUMNS, &to_varlen(COLUMNS, &names)?, &SaveOptions::default())?;

        let index: Vec<i64> = (0..nrows as i64).collect();
        write_values(&group, INDEX, &index, options)?;

        for (idx, (field, column)) in schema.fields().iter().zip(batch.columns()).enumerate() {
            write_column(&group, idx, field, column, options)?;
        }

        debug!(
            "put {rows} rows x {cols} columns under {key}",
            rows: nrows,
            cols: names.len(),
            key: key.as_str()
        );
        Ok(())
    }

    /// Read the table under `key`
    pub fn get(&self, key: &str, options: &LoadOptions) -> Result<RecordBatch> {
        options.validate()?;
        let key = normalize_key(key)?;

        let _guard = image::lock();
        let group = open_table_group(self.file()?, &key)?;
        let manifest = read_manifest(&group, &key)?;
        let nrows = manifest.nrows();
        let schema = &manifest.schema;

        let stored_names: Vec<VarLenUnicode> = read_values(&group, COLUMNS, schema.fields().len())?;
        for (name, field) in stored_names.iter().zip(schema.fields()) {
            if name.as_str() != field.name() {
                return Err(StoreError::corrupt(
                    &key,
                    format!("column axis lists '{}' where the schema has '{}'", name.as_str(), field.name()),
                ));
            }
        }
        let row_labels: Vec<i64> = read_values(&group, INDEX, nrows)?;
        if row_labels.iter().enumerate().any(|(i, label)| *label != i as i64) {
            return Err(StoreError::corrupt(&key, "row axis is not 0..nrows"));
        }

        let indices: Vec<usize> = match &options.columns {
            None => (0..schema.fields().len()).collect(),
            Some(selected) => selected
                .iter()
                .map(|name| {
                    schema
                        .index_of(name)
                        .map_err(|_| StoreError::ColumnNotFound(name.clone()))
                })
                .collect::<Result<_>>()?,
        };

        let projected = Arc::new(schema.project(&indices)?);
        let columns: Vec<ArrayRef> = indices
            .iter()
            .map(|&idx| read_column(&group, idx, schema.field(idx), nrows))
            .collect::<Result<_>>()?;

        let batch = RecordBatch::try_new_with_options(
            projected,
            columns,
            &RecordBatchOptions::new().with_row_count(Some(nrows)),
        )?;

        let (offset, len) = options.window(nrows);
        debug!("get {len} of {rows} rows from {key}", len: len, rows: nrows, key: key.as_str());
        Ok(if offset == 0 && len == nrows {
            batch
        } else {
            batch.slice(offset, len)
        })
    }

    /// Keys of every table in the store, each starting with '/', sorted
    pub fn keys(&self) -> Result<Vec<String>> {
        let _guard = image::lock();
        let mut keys = Vec::new();
        collect_table_keys(self.file()?, &mut keys)?;
        keys.sort();
        Ok(keys)
    }

    /// Whether a table exists under `key`
    pub fn contains(&self, key: &str) -> Result<bool> {
        let key = normalize_key(key)?;
        Ok(self.keys()?.contains(&key))
    }

    /// Schema of the table under `key` without reading its values
    pub fn schema(&self, key: &str) -> Result<Schema> {
        let key = normalize_key(key)?;
        let _guard = image::lock();
        let group = open_table_group(self.file()?, &key)?;
        Ok(read_manifest(&group, &key)?.schema)
    }

    /// The complete binary image of the store
    pub fn to_image(&self) -> Result<Vec<u8>> {
        let _guard = image::lock();
        let bytes = image::export(self.file()?)?;
        debug!("exported {len} byte image of {name}", len: bytes.len(), name: self.name.as_str());
        Ok(bytes)
    }
}

impl Drop for HdfStore {
    fn drop(&mut self) {
        // Closing the file is an HDF5 call too
        let _guard = image::lock();
        drop(self.file.take());
    }
}

fn create_table_group(file: &File, key: &str) -> Result<Group> {
    let components: Vec<&str> = key.trim_start_matches('/').split('/').collect();
    let Some((leaf, parents)) = components.split_last() else {
        return Err(StoreError::InvalidKey(key.to_string()));
    };

    let mut current: Group = file.group("/")?;
    for name in parents {
        current = if current.link_exists(name) {
            let child = current.group(name)?;
            if child.link_exists(MANIFEST) {
                return Err(StoreError::InvalidKey(format!(
                    "{key}: parent {} is a table",
                    child.name()
                )));
            }
            child
        } else {
            current.create_group(name)?
        };
    }

    if current.link_exists(leaf) {
        current.unlink(leaf)?;
    }
    Ok(current.create_group(leaf)?)
}

fn open_table_group(file: &File, key: &str) -> Result<Group> {
    let relative = key.trim_start_matches('/');
    if !link_path_exists(file, relative) {
        return Err(StoreError::KeyNotFound(key.to_string()));
    }
    let group = file
        .group(relative)
        .map_err(|_| StoreError::KeyNotFound(key.to_string()))?;
    if !group.link_exists(MANIFEST) {
        return Err(StoreError::KeyNotFound(key.to_string()));
    }
    Ok(group)
}

/// Check each component in turn; the library errors on a missing parent
fn link_path_exists(file: &File, relative: &str) -> bool {
    let mut prefix = String::new();
    for name in relative.split('/') {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(name);
        if !file.link_exists(&prefix) {
            return false;
        }
    }
    true
}

fn read_manifest(group: &Group, key: &str) -> Result<TableManifest> {
    let raw: Vec<VarLenUnicode> = read_values(group, MANIFEST, 1)?;
    let json = raw
        .first()
        .ok_or_else(|| StoreError::corrupt(key, "empty manifest"))?;
    TableManifest::from_json(key, json.as_str())
}

fn collect_table_keys(group: &Group, keys: &mut Vec<String>) -> Result<()> {
    for child in group.groups()? {
        if child.link_exists(MANIFEST) {
            keys.push(child.name());
        } else {
            collect_table_keys(&child, keys)?;
        }
    }
    Ok(())
}
