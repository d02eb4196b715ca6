//! Filesystem [`ArtifactSink`]: every artifact name is a file under one
//! output directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use coordination::{ArtifactSink, CoordinationError};
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn ensure_root(&self, name: &str) -> Result<(), CoordinationError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CoordinationError::sink(name, e))
    }
}

#[async_trait]
impl ArtifactSink for FileSink {
    async fn write(&self, name: &str, content: &str) -> Result<(), CoordinationError> {
        self.ensure_root(name).await?;
        let path = self.path_for(name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| CoordinationError::sink(name, e))?;
        debug!(path = %path.display(), bytes = content.len(), "artifact written");
        Ok(())
    }

    async fn append(&self, name: &str, content: &str) -> Result<(), CoordinationError> {
        self.ensure_root(name).await?;
        let path = self.path_for(name);
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| CoordinationError::sink(name, e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| CoordinationError::sink(name, e))?;
        file.flush()
            .await
            .map_err(|e| CoordinationError::sink(name, e))?;
        debug!(path = %path.display(), bytes = content.len(), "artifact appended");
        Ok(())
    }
}
