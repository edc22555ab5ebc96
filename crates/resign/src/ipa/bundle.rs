//! Application bundle discovery.

use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Find the `.app` bundle directly inside `payload_dir`.
///
/// Returns the first child directory with the `app` extension, in
/// directory-listing order. Listing order is not stable across platforms; a
/// well-formed archive contains exactly one bundle, so the tie-break only
/// matters for malformed inputs.
///
/// # Errors
///
/// Returns [`Error::MissingPayload`] if `payload_dir` does not exist, and
/// [`Error::MissingAppBundle`] if it contains no matching directory.
pub fn locate_app_bundle(payload_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let payload_dir = payload_dir.as_ref();

    if !payload_dir.is_dir() {
        return Err(Error::MissingPayload(payload_dir.to_path_buf()));
    }

    for entry in fs::read_dir(payload_dir)? {
        let path = entry?.path();
        if path.is_dir() && path.extension().is_some_and(|ext| ext == "app") {
            return Ok(path);
        }
    }

    Err(Error::MissingAppBundle(payload_dir.to_path_buf()))
}
