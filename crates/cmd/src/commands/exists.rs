// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::CatalogContext;
use anyhow::Result;
use dataset::{PinnedVersions, VersionedDataset};

/// Exists command - prints `true` or `false`
pub async fn exists_command<F>(
    ctx: &CatalogContext,
    name: &str,
    load_version: Option<String>,
    mut handler: F,
) -> Result<bool>
where
    F: FnMut(&str),
{
    let pinned = PinnedVersions {
        load: load_version,
        save: None,
    };
    let found = ctx.dataset(name, &pinned)?.exists().await?;
    handler(&format!("{found}\n"));
    Ok(found)
}
