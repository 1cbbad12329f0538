//! Local filesystem storage implementation.
//!
//! Writes each page under the output directory, creating parent directories
//! on demand. Writes go to a sibling temp file that is then renamed over the
//! target, so a page file is either the old or the new content.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{OutputConfig, PageDescriptor};
use crate::storage::{PageStorage, page_relative_path};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    dir_mode: u32,
    file_mode: u32,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        let defaults = OutputConfig::default();
        Self {
            root_dir: root_dir.into(),
            dir_mode: defaults.dir_mode,
            file_mode: defaults.file_mode,
        }
    }

    /// Create a LocalStorage from output settings.
    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            root_dir: config.dir.clone(),
            dir_mode: config.dir_mode,
            file_mode: config.file_mode,
        }
    }

    /// Full output path of a page.
    pub fn page_path(&self, base_url: &str, page: &PageDescriptor) -> Result<PathBuf> {
        Ok(self
            .root_dir
            .join(page_relative_path(base_url, &page.links.webui)?))
    }

    /// Ensure parent directory exists. Already-existing directories are fine,
    /// so concurrent writers may race on a shared parent.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            let mut builder = tokio::fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(self.dir_mode);
            builder.create(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    ///
    /// On failure the temp file is removed so it never reaches the mirror.
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        let result = self.write_and_rename(&tmp, path, bytes).await;
        if result.is_err() {
            match tokio::fs::remove_file(&tmp).await {
                Ok(()) => log::debug!("Removed temp file {}", tmp.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove temp file {}: {}", tmp.display(), e),
            }
        }
        result
    }

    async fn write_and_rename(&self, tmp: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(self.file_mode);

        let mut file = options.open(tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl PageStorage for LocalStorage {
    async fn write_page(
        &self,
        base_url: &str,
        page: &PageDescriptor,
        content: &str,
    ) -> Result<PathBuf> {
        let path = self.page_path(base_url, page)?;
        self.write_bytes(&path, content.as_bytes()).await?;
        log::debug!("Wrote page {} to {}", page.id, path.display());
        Ok(path)
    }
}
