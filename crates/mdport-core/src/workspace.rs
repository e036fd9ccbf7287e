//! Per-request scratch directory.
//!
//! A [`Workspace`] is acquired once per conversion and released exactly once
//! when it is dropped, whichever step the request ended on. Holders never
//! call a cleanup function on their error branches; dropping is the release.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::format::Format;

const INPUT_FILE: &str = "input.md";
const REFERENCE_FILE: &str = "custom-reference.docx";

/// An isolated directory holding one request's input and output files.
#[derive(Debug)]
pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
    input: PathBuf,
}

impl Workspace {
    /// Create a uniquely named directory under `parent` and write `source`
    /// into its input file.
    pub async fn acquire(parent: &Path, source: &str) -> std::io::Result<Self> {
        let parent = parent.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix("mdport-").tempdir_in(parent)
        })
        .await
        .map_err(std::io::Error::other)??;
        let root = dir.path().to_path_buf();
        let input = root.join(INPUT_FILE);

        // `dir` is already owned by the workspace, so a failed write below
        // still removes the directory.
        let workspace = Self { dir: Some(dir), root, input };
        tokio::fs::write(&workspace.input, source.as_bytes()).await?;

        debug!(workspace = %workspace.root.display(), bytes = source.len(), "workspace acquired");
        Ok(workspace)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn input_path(&self) -> &Path {
        &self.input
    }

    /// Where the conversion tool is told to write, e.g. `output.tex`.
    pub fn output_path(&self, format: Format) -> PathBuf {
        self.root.join(format!("output.{}", format.extension()))
    }

    /// Persist an uploaded reference template inside the workspace and
    /// return its path.
    pub async fn store_reference(&self, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.root.join(REFERENCE_FILE);
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    /// Remove the directory tree now instead of at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

// Removal is synchronous and may run inside a stream poll. The tree holds at
// most three small files, and callers expect the directory gone once the
// drop returns.
impl Drop for Workspace {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else { return };
        match dir.close() {
            Ok(()) => debug!(workspace = %self.root.display(), "workspace released"),
            Err(e) => warn!(
                workspace = %self.root.display(),
                error = %e,
                "failed to remove workspace directory"
            ),
        }
    }
}
