// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{CatalogContext, TableFormat, format_table};
use anyhow::{Context, Result};
use dataset::{PinnedVersions, VersionedDataset};

/// Load command - prints a catalog dataset as a table or CSV
pub async fn load_command<F>(
    ctx: &CatalogContext,
    name: &str,
    load_version: Option<String>,
    format: TableFormat,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let pinned = PinnedVersions {
        load: load_version,
        save: None,
    };
    let ds = ctx.dataset(name, &pinned)?;
    let batch = ds.load().await.with_context(|| format!("Failed to load {ds}"))?;

    let mut output = format_table(&batch, format)?;
    if !output.ends_with('\n') {
        output.push('\n');
    }
    handler(&output);
    Ok(())
}
