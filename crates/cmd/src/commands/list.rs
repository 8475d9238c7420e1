// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::CatalogContext;
use anyhow::Result;

/// List command - catalog entry names with their paths
pub fn list_command<F>(ctx: &CatalogContext, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let catalog = ctx.open_catalog()?;
    for name in catalog.names() {
        let config = catalog.config(name)?;
        let marker = if config.versioned { " (versioned)" } else { "" };
        handler(&format!("{name}\t{}#{}{marker}\n", config.filepath, config.key));
    }
    Ok(())
}
