//! Staging of caller inputs into the workspace.

use crate::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Local copies of the three job inputs, all inside the workspace.
#[derive(Debug)]
pub struct StagedInputs {
    /// The archive to resign.
    pub ipa: PathBuf,
    /// PKCS#12 key container.
    pub p12: PathBuf,
    /// Provisioning profile.
    pub profile: PathBuf,
}

/// Copy the archive, key container, and provisioning profile into
/// `inputs_dir`.
///
/// Each destination keeps the source's file name. A file already present at
/// a destination is removed before the copy, so re-staging into the same
/// directory is safe.
pub fn stage_inputs(
    ipa: impl AsRef<Path>,
    p12: impl AsRef<Path>,
    profile: impl AsRef<Path>,
    inputs_dir: &Path,
) -> Result<StagedInputs> {
    Ok(StagedInputs {
        ipa: stage_one(ipa.as_ref(), inputs_dir)?,
        p12: stage_one(p12.as_ref(), inputs_dir)?,
        profile: stage_one(profile.as_ref(), inputs_dir)?,
    })
}

fn stage_one(source: &Path, inputs_dir: &Path) -> Result<PathBuf> {
    let name = source.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("input has no file name: {}", source.display()),
        )
    })?;

    let dest = inputs_dir.join(name);
    if dest.exists() {
        fs::remove_file(&dest)?;
    }
    fs::copy(source, &dest)?;
    Ok(dest)
}
