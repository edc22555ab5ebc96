//! Job-scoped temporary workspaces.
//!
//! Every resign job gets its own uniquely named directory tree so concurrent
//! jobs never touch each other's files. The tree is removed when the job
//! ends, on every exit path: [`Workspace`] cleans up on drop.

use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Isolated directory tree for a single resign job.
///
/// Layout:
///
/// ```text
/// <base>/resign-<uuid>/
///   inputs/   staged copies of the caller's files
///   work/     extracted archive contents
/// ```
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    inputs_dir: PathBuf,
    work_dir: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace under `base`, including both subdirectories.
    ///
    /// Intermediate path segments of `base` are created as needed.
    pub fn prepare(base: impl AsRef<Path>) -> Result<Self> {
        let root = base.as_ref().join(format!("resign-{}", Uuid::new_v4()));
        let inputs_dir = root.join("inputs");
        let work_dir = root.join("work");
        fs::create_dir_all(&inputs_dir)?;
        fs::create_dir_all(&work_dir)?;
        Ok(Self {
            root,
            inputs_dir,
            work_dir,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn inputs_dir(&self) -> &Path {
        &self.inputs_dir
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Remove the workspace tree.
    ///
    /// A root that no longer exists is not an error; calling this twice is
    /// fine. Removal failures are logged rather than raised since cleanup
    /// runs on error paths that already carry a more useful failure.
    pub fn cleanup(&mut self) {
        if !self.root.exists() {
            return;
        }
        if let Err(e) = fs::remove_dir_all(&self.root) {
            tracing::warn!(
                "failed to remove workspace {}: {}",
                self.root.display(),
                e
            );
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prepare_creates_unique_trees() {
        let base = TempDir::new().unwrap();
        let a = Workspace::prepare(base.path()).unwrap();
        let b = Workspace::prepare(base.path()).unwrap();

        assert!(a.inputs_dir().is_dir());
        assert!(a.work_dir().is_dir());
        assert_ne!(a.root(), b.root());
    }

    #[test]
    fn cleanup_removes_root_and_is_idempotent() {
        let base = TempDir::new().unwrap();
        let mut ws = Workspace::prepare(base.path()).unwrap();
        let root = ws.root().to_path_buf();
        std::fs::write(ws.work_dir().join("leftover"), b"x").unwrap();

        ws.cleanup();
        assert!(!root.exists());

        // Second call must tolerate the missing root.
        ws.cleanup();
        assert!(!root.exists());
    }

    #[test]
    fn drop_removes_root() {
        let base = TempDir::new().unwrap();
        let root = {
            let ws = Workspace::prepare(base.path()).unwrap();
            ws.root().to_path_buf()
        };
        assert!(!root.exists());
    }
}
