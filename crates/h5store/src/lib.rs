// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Arrow tables in HDF5 files held entirely in memory
//!
//! A store is either created empty and exported as a byte image after
//! writing, or opened read-only over an image fetched from elsewhere. Each
//! table lives under its own key (a group path) and carries its Arrow
//! schema, so types, nullability, and column order survive a round trip.
//!
//! ```no_run
//! # fn example(batch: arrow::array::RecordBatch) -> h5store::Result<()> {
//! use h5store::{HdfStore, LoadOptions, SaveOptions};
//!
//! let writer = HdfStore::create("data.hdf")?;
//! writer.put("readings", &batch, &SaveOptions::default())?;
//! let image = writer.to_image()?;
//!
//! let reader = HdfStore::open_image("data.hdf", &image)?;
//! let loaded = reader.get("readings", &LoadOptions::default())?;
//! assert_eq!(loaded, batch);
//! # Ok(())
//! # }
//! ```

mod columns;
mod error;
mod image;
pub mod layout;
mod options;
mod store;

pub use columns::is_supported;
pub use error::StoreError;
pub use layout::normalize_key;
pub use options::{DEFAULT_CHUNK_ROWS, LoadOptions, SaveOptions};
pub use store::HdfStore;

/// Result type for table store operations
pub type Result<T> = std::result::Result<T, StoreError>;
