//! Output writing
//!
//! Generated files are handed to a [`FileWriter`]; the runner writes them
//! concurrently once it has checked that no two files share a path.

use std::path::PathBuf;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::debug;
use typegen_common::{Error, FileDescription, Result};

/// Destination of generated files
#[async_trait]
pub trait FileWriter: Send + Sync {
    /// Write one file, creating missing parent directories
    async fn write_file(&self, file: &FileDescription) -> Result<()>;
}

/// Writes files below a root directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileWriter for FsWriter {
    async fn write_file(&self, file: &FileDescription) -> Result<()> {
        let path = self.root.join(&file.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Io(format!("Failed to create directory {}: {}", parent.display(), e))
            })?;
        }

        tokio::fs::write(&path, &file.contents)
            .await
            .map_err(|e| Error::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

/// Write every file concurrently, stopping at the first failure
pub async fn write_all(writer: &dyn FileWriter, files: &[FileDescription]) -> Result<()> {
    try_join_all(files.iter().map(|file| writer.write_file(file))).await?;
    Ok(())
}
