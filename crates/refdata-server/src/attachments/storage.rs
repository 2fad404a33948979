//! Sharded file tree for uploaded documents.
//!
//! A document with id `3f2a...` lives at `<root>/3/3f2a...`. Files are raw
//! bytes with no wrapper.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DocumentStorage {
    root: PathBuf,
}

impl DocumentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<first char of id>/<id>`
    pub fn path_for(&self, id: &str) -> PathBuf {
        let shard: String = id.chars().take(1).collect();
        self.root.join(shard).join(id)
    }

    /// Writes `bytes` beside the final location of `id` without touching it.
    pub async fn stage(&self, id: &str, bytes: &[u8]) -> io::Result<StagedFile> {
        let target = self.path_for(id);
        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).await?;
        }
        let staged = target.with_file_name(format!(".{id}.{}.partial", Uuid::new_v4().simple()));
        fs::write(&staged, bytes).await?;
        Ok(StagedFile { staged, target })
    }

    pub async fn read(&self, id: &str) -> io::Result<Vec<u8>> {
        fs::read(self.path_for(id)).await
    }
}

/// Bytes written next to their destination, waiting for the record insert.
#[derive(Debug)]
pub struct StagedFile {
    staged: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Moves the file into place, replacing whatever was there.
    pub async fn persist(&self) -> io::Result<()> {
        fs::rename(&self.staged, &self.target).await
    }

    /// Removes the staged bytes. Failures are logged only.
    pub async fn discard(self) {
        if let Err(e) = fs::remove_file(&self.staged).await {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.staged.display(), error = %e, "failed to remove staged upload");
            }
        }
    }
}
