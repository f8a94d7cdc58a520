//! Per-request workspace directories.
//!
//! Each request gets a fresh, uniquely named directory under the temp root.
//! It holds the downloaded `input.pdf`, the converter's scratch files, and
//! its output. The directory is owned by exactly one request.
//!
//! Removal happens in [`Workspace::destroy`], which logs rather than returns
//! failures because the response has already been decided by the time it
//! runs. If a `Workspace` is dropped without `destroy` (early return, panic)
//! the inner [`TempDir`] still removes the tree on drop.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// File name of the downloaded source document inside a workspace.
pub const INPUT_FILE_NAME: &str = "input.pdf";

/// File name of the converter's main output inside a workspace.
pub const OUTPUT_FILE_NAME: &str = "output.html";

/// An exclusively owned temporary directory for one conversion.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace as configured (prefix and optional parent dir).
    pub fn create(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(&config.workspace_prefix);

        let dir = match &config.workspace_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|source| GatewayError::Workspace { source })?;

        debug!(workspace = %dir.path().display(), "workspace created");
        Ok(Self { dir })
    }

    /// Root directory of the workspace.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the fetched PDF is written.
    pub fn input_path(&self) -> PathBuf {
        self.dir.path().join(INPUT_FILE_NAME)
    }

    /// Where the converter writes its main HTML output.
    pub fn output_path(&self) -> PathBuf {
        self.dir.path().join(OUTPUT_FILE_NAME)
    }

    /// Recursively remove the workspace. Failures are logged, never returned.
    pub fn destroy(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(workspace = %path.display(), "workspace removed"),
            Err(e) => warn!(
                workspace = %path.display(),
                error = %e,
                "failed to remove workspace; leaving it for the temp sweeper"
            ),
        }
    }
}
