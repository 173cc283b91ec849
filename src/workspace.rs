//! Per-request working directories
//!
//! Every request stages its uploads and writes its output inside a
//! [`Workspace`]. The directory is removed when the value is dropped, so it
//! is released on every exit path of the request, including timeouts.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

use crate::config::WorkspaceConfig;

/// Exclusively owned temporary directory
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

/// Keep only the final path component and characters safe in file names
fn sanitize(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

impl Workspace {
    pub fn new(config: &WorkspaceConfig) -> std::io::Result<Self> {
        std::fs::create_dir_all(&config.root)?;
        let dir = tempfile::Builder::new()
            .prefix(&config.prefix)
            .tempdir_in(&config.root)?;
        tracing::debug!("Created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write uploaded bytes under a unique name derived from `filename`
    pub async fn stage(&self, filename: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let id = Uuid::new_v4().simple().to_string();
        let path = self.dir.path().join(format!("{}_{}", &id[..8], sanitize(filename)));
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Staged {} bytes at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Path for an operation's output document
    pub fn output_path(&self, operation: &str) -> PathBuf {
        self.dir.path().join(format!("{}_output.pdf", operation))
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        tracing::debug!("Releasing workspace {}", self.dir.path().display());
    }
}
