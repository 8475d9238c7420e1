// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::CatalogContext;
use anyhow::{Result, anyhow};
use dataset::PinnedVersions;

/// Versions command - one stored version per line, oldest first
pub async fn versions_command<F>(ctx: &CatalogContext, name: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let catalog = ctx.open_catalog()?;
    if !catalog.config(name)?.versioned {
        return Err(anyhow!("dataset '{name}' is not versioned"));
    }
    let ds = catalog.dataset(name, &PinnedVersions::default())?;
    for version in ds.list_versions().await? {
        handler(&format!("{version}\n"));
    }
    Ok(())
}
