// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Shared command plumbing: where the catalog lives and how tables are
//! read from and written as text.

use anyhow::{Context, Result, anyhow};
use arrow::array::RecordBatch;
use arrow::compute::concat_batches;
use arrow_csv::reader::Format;
use arrow_csv::{ReaderBuilder, WriterBuilder};
use dataset::{Catalog, HdfRemoteDataset, PinnedVersions};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Catalog and credentials files named on the command line
#[derive(Clone, Debug)]
pub struct CatalogContext {
    pub catalog: PathBuf,
    pub credentials: Option<PathBuf>,
}

impl CatalogContext {
    pub fn new<P: Into<PathBuf>>(catalog: P, credentials: Option<PathBuf>) -> Self {
        Self {
            catalog: catalog.into(),
            credentials,
        }
    }

    pub fn open_catalog(&self) -> Result<Catalog> {
        Catalog::from_files(&self.catalog, self.credentials.as_deref())
            .with_context(|| format!("Failed to load catalog {}", self.catalog.display()))
    }

    pub fn dataset(&self, name: &str, pinned: &PinnedVersions) -> Result<HdfRemoteDataset> {
        let catalog = self.open_catalog()?;
        catalog
            .dataset(name, pinned)
            .with_context(|| format!("Failed to build dataset '{name}'"))
    }
}

/// Output format for `load`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TableFormat {
    /// Boxed, human readable table
    #[default]
    Table,
    Csv,
}

/// Read a CSV file with a header row, inferring column types
pub fn read_csv(path: &Path) -> Result<RecordBatch> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(Cursor::new(text.as_bytes()), None)
        .with_context(|| format!("Failed to infer a schema for {}", path.display()))?;
    let schema = Arc::new(schema);
    if schema.fields().is_empty() {
        return Err(anyhow!("{} has no header row", path.display()));
    }

    let reader = ReaderBuilder::new(schema.clone())
        .with_format(format)
        .build(Cursor::new(text.as_bytes()))?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(concat_batches(&schema, &batches)?)
}

pub fn format_table(batch: &RecordBatch, format: TableFormat) -> Result<String> {
    match format {
        TableFormat::Table => {
            Ok(arrow_cast::pretty::pretty_format_batches(std::slice::from_ref(batch))?.to_string())
        }
        TableFormat::Csv => {
            let mut writer = WriterBuilder::new().with_header(true).build(Vec::new());
            writer.write(batch)?;
            Ok(String::from_utf8(writer.into_inner())?)
        }
    }
}
