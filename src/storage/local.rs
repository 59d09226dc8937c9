use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use uuid::Uuid;

use crate::core::AppConfig;

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Local storage: a scratch upload directory, a flat output directory and
/// the templates directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    upload_dir: PathBuf,
    output_dir: PathBuf,
    templates_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DirectoryStatus {
    pub uploads: bool,
    pub output: bool,
    pub templates: bool,
}

impl LocalStorage {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        templates_dir: impl Into<PathBuf>,
    ) -> Self {
        LocalStorage {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
            templates_dir: templates_dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.upload_dir.clone(),
            config.output_dir.clone(),
            config.templates_dir.clone(),
        )
    }

    /// Creates the directories when missing. Safe to call more than once.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.upload_dir, &self.output_dir, &self.templates_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn directory_status(&self) -> DirectoryStatus {
        DirectoryStatus {
            uploads: self.upload_dir.is_dir(),
            output: self.output_dir.is_dir(),
            templates: self.templates_dir.is_dir(),
        }
    }

    /// Per-request working directory, removed when the returned guard drops.
    pub fn create_workspace(&self, request_id: Uuid) -> Result<TempDir> {
        tempfile::Builder::new()
            .prefix(&format!("{}-", request_id))
            .tempdir_in(&self.upload_dir)
            .with_context(|| {
                format!(
                    "Failed to create working directory in {}",
                    self.upload_dir.display()
                )
            })
    }

    pub fn output_path(&self, request_id: Uuid) -> PathBuf {
        self.output_dir.join(output_file_name(request_id))
    }

    /// Writes the document under its final name only once fully written.
    pub fn persist_output(&self, request_id: Uuid, bytes: &[u8]) -> Result<PathBuf> {
        let target = self.output_path(request_id);

        let mut staged = NamedTempFile::new_in(&self.output_dir).with_context(|| {
            format!("Failed to stage output in {}", self.output_dir.display())
        })?;
        staged
            .write_all(bytes)
            .and_then(|_| staged.as_file().sync_all())
            .context("Failed to write output document")?;
        staged
            .persist(&target)
            .with_context(|| format!("Failed to move output to {}", target.display()))?;

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "Output persisted");

        Ok(target)
    }

    /// Reads a previously generated document, `None` when it does not exist.
    pub async fn read_output(&self, request_id: Uuid) -> Result<Option<Vec<u8>>> {
        let path = self.output_path(request_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to read {}", path.display()))),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

pub fn output_file_name(request_id: Uuid) -> String {
    format!("documento-{}.docx", request_id)
}

pub fn download_file_name(request_id: Uuid) -> String {
    format!("documento-processado-{}.docx", request_id)
}
