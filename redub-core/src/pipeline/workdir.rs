//! Scoped working directory for intermediate per-segment artifacts.
//!
//! Created at pipeline start, removed at pipeline end on every exit path:
//! explicitly via [`Workdir::close`], or by drop on early returns. Removal
//! failures are logged and never override an already-determined run outcome.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

pub struct Workdir {
    dir: TempDir,
}

impl Workdir {
    /// Create a fresh working directory under `root`, or under the system
    /// temp directory when no root is given.
    pub fn create(root: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("redub-");

        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };

        debug!(path = %dir.path().display(), "created working directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// File path for one segment's intermediate audio artifact.
    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("segment_{index}.pcm"))
    }

    /// Remove the directory and everything in it.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(error) = self.dir.close() {
            warn!(path = %path.display(), %error, "failed to remove working directory");
        }
    }
}
