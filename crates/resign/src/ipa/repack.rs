//! Archive repacking.
//!
//! Re-encodes the signed working tree into a fresh IPA and publishes it to
//! the durable output directory.

use crate::progress::{percent, Progress};
use crate::Result;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Build `<base>_signed_<token>.<ext>` from the original archive file name.
///
/// The token is fresh per call, so concurrent jobs signing the same archive
/// never collide at the output location.
fn output_name(original: &Path) -> String {
    let base = original
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("app");
    let ext = original
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("ipa");
    format!("{}_signed_{}.{}", base, Uuid::new_v4().simple(), ext)
}

/// Archive-internal name for `path`, relative to `root`, `/`-separated.
fn entry_name(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("entry outside work tree: {}", path.display()),
        )
    })?;

    Ok(rel
        .iter()
        .map(|c| c.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Re-encode `work_dir` into a fresh archive and copy it into `output_dir`.
///
/// The walk covers the whole tree once, excluding the root itself.
/// Directory entries are written first, shortest path first, stored without
/// compression and with a trailing `/`; parents therefore always precede
/// their descendants regardless of filesystem listing order. File entries
/// follow, deflated, named relative to `work_dir`.
///
/// The archive is assembled in `scratch_dir` (inside the job workspace) and
/// only then copied to `output_dir`, replacing any stale file at the exact
/// destination path. Returns the durable path.
///
/// `progress` receives a percentage line across the combined entry count.
///
/// # Errors
///
/// Returns [`Error::Zip`](crate::Error::Zip) if archive creation fails, or
/// [`Error::Io`](crate::Error::Io) if the walk or the final copy fails.
pub fn repackage(
    work_dir: &Path,
    original_archive: &Path,
    scratch_dir: &Path,
    output_dir: &Path,
    progress: &dyn Progress,
) -> Result<PathBuf> {
    let name = output_name(original_archive);

    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in WalkDir::new(work_dir).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        } else {
            files.push(entry.into_path());
        }
    }
    dirs.sort_by_key(|p| p.as_os_str().len());

    let staged = scratch_dir.join(&name);
    let mut zip = ZipWriter::new(File::create(&staged)?);
    let dir_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let file_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let total = dirs.len() + files.len();
    let mut done = 0;

    for dir in &dirs {
        zip.add_directory(format!("{}/", entry_name(work_dir, dir)?), dir_options)?;
        done += 1;
        progress.report(&format!("repacking {}%", percent(done, total)));
    }

    for path in &files {
        zip.start_file(entry_name(work_dir, path)?, file_options)?;
        let mut file = File::open(path)?;
        io::copy(&mut file, &mut zip)?;
        done += 1;
        progress.report(&format!("repacking {}%", percent(done, total)));
    }

    zip.finish()?;

    fs::create_dir_all(output_dir)?;
    let dest = output_dir.join(&name);
    if dest.exists() {
        fs::remove_file(&dest)?;
    }
    fs::copy(&staged, &dest)?;

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipa::extract_archive;
    use crate::progress::NullProgress;
    use std::collections::BTreeMap;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn build_work_tree(root: &Path) {
        fs::create_dir_all(root.join("Payload/App.app/Resources")).unwrap();
        fs::write(root.join("Payload/App.app/Info.plist"), b"<plist/>").unwrap();
        fs::write(root.join("Payload/App.app/App"), b"MACHO_PLACEHOLDER").unwrap();
        fs::write(
            root.join("Payload/App.app/Resources/icon.png"),
            b"PNG_DATA",
        )
        .unwrap();
    }

    fn archive_entries(path: &Path) -> Vec<(String, bool, Vec<u8>)> {
        let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let name = entry.name().to_string();
            let is_dir = entry.is_dir();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            entries.push((name, is_dir, content));
        }
        entries
    }

    #[test]
    fn output_name_shape() {
        let name = output_name(Path::new("/tmp/MyApp.ipa"));
        assert!(name.starts_with("MyApp_signed_"));
        assert!(name.ends_with(".ipa"));
        assert_ne!(name, output_name(Path::new("/tmp/MyApp.ipa")));
    }

    #[test]
    fn directories_precede_their_files() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        build_work_tree(&work);

        let out = repackage(
            &work,
            Path::new("App.ipa"),
            dir.path(),
            &dir.path().join("out"),
            &NullProgress,
        )
        .unwrap();

        let entries = archive_entries(&out);
        for (i, (name, is_dir, _)) in entries.iter().enumerate() {
            if *is_dir {
                continue;
            }
            for (j, (other, other_is_dir, _)) in entries.iter().enumerate() {
                if *other_is_dir && name.starts_with(other) {
                    assert!(j < i, "{other} must precede {name}");
                }
            }
        }
        assert!(entries.iter().any(|(name, is_dir, _)| name == "Payload/" && *is_dir));
    }

    #[test]
    fn extract_then_repack_preserves_files() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        build_work_tree(&work);

        let first = repackage(
            &work,
            Path::new("App.ipa"),
            dir.path(),
            &dir.path().join("out"),
            &NullProgress,
        )
        .unwrap();

        let rework = dir.path().join("rework");
        extract_archive(&first, &rework, &NullProgress).unwrap();
        let second = repackage(
            &rework,
            Path::new("App.ipa"),
            dir.path(),
            &dir.path().join("out"),
            &NullProgress,
        )
        .unwrap();

        let files = |p: &Path| -> BTreeMap<String, Vec<u8>> {
            archive_entries(p)
                .into_iter()
                .filter(|(_, is_dir, _)| !is_dir)
                .map(|(name, _, content)| (name, content))
                .collect()
        };
        assert_eq!(files(&first), files(&second));
    }

    #[test]
    fn reports_progress_across_all_entries() {
        let dir = TempDir::new().unwrap();
        let work = dir.path().join("work");
        build_work_tree(&work);

        let lines = std::sync::Mutex::new(Vec::new());
        let sink = |message: &str| lines.lock().unwrap().push(message.to_string());
        repackage(
            &work,
            Path::new("App.ipa"),
            dir.path(),
            &dir.path().join("out"),
            &sink,
        )
        .unwrap();

        let lines = lines.lock().unwrap();
        // 3 directories + 3 files
        assert_eq!(lines.len(), 6);
        assert_eq!(lines.last().unwrap(), "repacking 100%");
    }
}
