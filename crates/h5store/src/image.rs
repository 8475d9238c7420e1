// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory HDF5 files
//!
//! Files use the core driver without a backing store, so nothing touches
//! the local disk. Importing and exporting a whole image goes through the
//! file-image calls of the C library, which the high-level crate does not
//! wrap.

use crate::{Result, StoreError};
use hdf5::File;
use hdf5::plist::FileAccess;
use hdf5_sys::h5f::{H5F_ACC_RDONLY, H5Fget_file_image, H5Fopen};
use hdf5_sys::h5p::H5Pset_file_image;
use std::ffi::{CString, c_void};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Serializes every HDF5 call made through this crate.
///
/// The C library may be built without its thread-safety option, and the raw
/// image calls bypass the high-level crate's own locking.
static HDF5_LOCK: Mutex<()> = Mutex::new(());

pub(crate) fn lock() -> MutexGuard<'static, ()> {
    HDF5_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// HDF5 format signature; the superblock sits at 0 or a power of two >= 512
const SIGNATURE: [u8; 8] = [0x89, b'H', b'D', b'F', b'\r', b'\n', 0x1a, b'\n'];

pub(crate) fn has_signature(image: &[u8]) -> bool {
    let mut offset = 0usize;
    while offset + SIGNATURE.len() <= image.len() {
        if image[offset..offset + SIGNATURE.len()] == SIGNATURE {
            return true;
        }
        offset = if offset == 0 { 512 } else { offset * 2 };
    }
    false
}

/// A unique file name; the core driver treats equal names as the same file
pub(crate) fn unique_name(name: &str) -> String {
    format!("{}#{}", name, uuid7::uuid7())
}

/// Create an empty writable in-memory file. Caller holds [`lock`].
pub(crate) fn create(name: &str) -> Result<File> {
    let file = File::with_options()
        .with_fapl(|p| p.core_filebacked(false))
        .create(name)?;
    Ok(file)
}

/// Open a read-only in-memory file over a copy of `image`. Caller holds [`lock`].
pub(crate) fn open(name: &str, image: &[u8]) -> Result<File> {
    if !has_signature(image) {
        return Err(StoreError::InvalidImage(format!(
            "{} bytes without an HDF5 signature",
            image.len()
        )));
    }

    let c_name = CString::new(name)
        .map_err(|_| StoreError::InvalidImage(format!("file name contains NUL: {name:?}")))?;
    let fapl = FileAccess::build().core_filebacked(false).finish()?;

    // SAFETY: the library copies the buffer during H5Pset_file_image, and
    // both the property list and the C string outlive the calls using them.
    let file_id = unsafe {
        let status = H5Pset_file_image(fapl.id(), image.as_ptr().cast_mut().cast::<c_void>(), image.len());
        if status < 0 {
            return Err(StoreError::InvalidImage(
                "the library rejected the file image".to_string(),
            ));
        }
        H5Fopen(c_name.as_ptr(), H5F_ACC_RDONLY, fapl.id())
    };
    if file_id < 0 {
        return Err(StoreError::InvalidImage(
            "the library could not open the file image".to_string(),
        ));
    }

    // SAFETY: file_id is a freshly opened, owned file identifier.
    let file = unsafe { hdf5::from_id::<File>(file_id) }?;
    Ok(file)
}

/// Complete binary image of an open file. Caller holds [`lock`].
pub(crate) fn export(file: &File) -> Result<Vec<u8>> {
    file.flush()?;

    // SAFETY: a null buffer with length 0 only queries the image size.
    let size = unsafe { H5Fget_file_image(file.id(), std::ptr::null_mut(), 0) };
    if size < 0 {
        return Err(StoreError::InvalidImage(
            "the library could not size the file image".to_string(),
        ));
    }

    let mut buf = vec![0u8; size as usize];
    // SAFETY: buf is exactly `size` writable bytes.
    let written = unsafe { H5Fget_file_image(file.id(), buf.as_mut_ptr().cast::<c_void>(), buf.len()) };
    if written < 0 {
        return Err(StoreError::InvalidImage(
            "the library could not copy the file image".to_string(),
        ));
    }
    buf.truncate(written as usize);
    Ok(buf)
}
