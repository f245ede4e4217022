//! Flat-file page storage
//!
//! Each page lives in `<data_dir>/<title>.txt` holding the raw body bytes.
//! Titles are expected to be validated before they reach this module.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Extension appended to a title to form its file name
pub const PAGE_EXTENSION: &str = "txt";

/// A titled document read from or destined for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: String,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(title: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// A page with no stored content yet
    pub fn empty(title: impl Into<String>) -> Self {
        Self::new(title, Vec::new())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing and unreadable pages are deliberately the same error.
    #[error("open {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// File-backed page store rooted at a data directory
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File backing the page called `title`
    pub fn path_for(&self, title: &str) -> PathBuf {
        self.root.join(format!("{title}.{PAGE_EXTENSION}"))
    }

    pub async fn load(&self, title: &str) -> Result<Page, StoreError> {
        let path = self.path_for(title);
        match fs::read(&path).await {
            Ok(body) => Ok(Page::new(title, body)),
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    /// Create or fully overwrite the page file in place.
    ///
    /// There is no temp-file staging: a crash mid-write can leave a
    /// truncated file behind.
    pub async fn save(&self, page: &Page) -> Result<(), StoreError> {
        let path = self.path_for(&page.title);
        match write_owner_only(&path, &page.body).await {
            Ok(()) => Ok(()),
            Err(source) => Err(StoreError::Write { path, source }),
        }
    }
}

async fn write_owner_only(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.flush().await
}
