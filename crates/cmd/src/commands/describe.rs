// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::common::CatalogContext;
use anyhow::Result;
use dataset::{PinnedVersions, VersionedDataset};

/// Describe command - prints the dataset descriptor as JSON
///
/// Builds the dataset without touching storage.
pub fn describe_command<F>(ctx: &CatalogContext, name: &str, mut handler: F) -> Result<()>
where
    F: FnMut(&str),
{
    let ds = ctx.dataset(name, &PinnedVersions::default())?;
    let json = serde_json::to_string_pretty(&ds.describe())?;
    handler(&format!("{json}\n"));
    Ok(())
}
