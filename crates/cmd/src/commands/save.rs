// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::{CatalogContext, read_csv};
use anyhow::{Context, Result};
use dataset::PinnedVersions;
use diagnostics::*;
use std::path::Path;

/// Save command - writes a CSV file into a catalog dataset
pub async fn save_command<F>(
    ctx: &CatalogContext,
    name: &str,
    input: &Path,
    save_version: Option<String>,
    mut handler: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let batch = read_csv(input)?;
    let source = input.display().to_string();
    debug!("read {rows} rows from {source}", rows: batch.num_rows(), source: source.as_str());

    let pinned = PinnedVersions {
        load: None,
        save: save_version,
    };
    let ds = ctx.dataset(name, &pinned)?;
    let saved = ds
        .save_resolved(&batch)
        .await
        .with_context(|| format!("Failed to save {ds}"))?;

    let line = match &saved.version {
        Some(version) => format!("Saved {} rows to {} (version {})\n", batch.num_rows(), saved.path, version),
        None => format!("Saved {} rows to {}\n", batch.num_rows(), saved.path),
    };
    handler(&line);
    Ok(())
}
