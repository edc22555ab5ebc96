//! Archive extraction.
//!
//! Unpacks the input IPA into the workspace's working directory, preserving
//! the entry hierarchy. For the reverse operation, see
//! [`repack`](super::repack).

use crate::progress::{percent, Progress};
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use zip::ZipArchive;

/// Check that a file starts with a ZIP signature without opening the whole
/// archive.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file does not exist or cannot be read, and
/// [`Error::Zip`] if the magic bytes are not `PK`.
pub fn validate_archive(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let mut file = File::open(path).map_err(|e| {
        Error::Io(io::Error::new(
            e.kind(),
            format!("archive not readable: {}: {}", path.display(), e),
        ))
    })?;

    // ZIP magic: PK\x03\x04, PK\x05\x06 (empty) or PK\x07\x08 (spanned)
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if &magic[0..2] != b"PK" {
        return Err(Error::Zip(zip::result::ZipError::InvalidArchive(
            "not a valid ZIP/IPA file",
        )));
    }

    Ok(())
}

/// Unpack `archive` into `dest`, preserving the entry hierarchy.
///
/// Entries are processed in archive order. Directory entries are
/// materialized with `create_dir_all`; for file entries every intermediate
/// directory is created before the bytes are written, so files never race
/// ahead of their parents even in archives that omit directory entries.
/// Entry names that escape `dest` are skipped.
///
/// `progress` receives a percentage line after each processed entry.
///
/// # Errors
///
/// Returns [`Error::Zip`] if `archive` is not a valid ZIP container, or
/// [`Error::Io`] if directory creation or writing fails.
pub fn extract_archive(
    archive: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    progress: &dyn Progress,
) -> Result<()> {
    let dest = dest.as_ref();
    let file = File::open(archive.as_ref())?;
    let mut zip = ZipArchive::new(file)?;

    fs::create_dir_all(dest)?;

    let total = zip.len();
    for i in 0..total {
        let mut entry = zip.by_index(i)?;

        let outpath = match entry.enclosed_name() {
            Some(rel) => dest.join(rel),
            None => continue,
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Some(mode) = entry.unix_mode() {
                    fs::set_permissions(&outpath, fs::Permissions::from_mode(mode & 0o7777))?;
                }
            }
        }

        progress.report(&format!("extracting {}%", percent(i + 1, total)));
    }

    Ok(())
}
