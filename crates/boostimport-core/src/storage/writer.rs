//! Positional writer for staging files.

use anyhow::{Context, Result};
use std::fs::File;
use std::sync::Arc;
#[cfg(unix)]
use std::os::unix::fs::FileExt;

/// Cloneable handle; each `write_at` is independent (pwrite-style) on Unix.
#[derive(Clone)]
pub struct StorageWriter {
    file: Arc<File>,
}

impl StorageWriter {
    pub(crate) fn new(file: File) -> Self {
        Self {
            file: Arc::new(file),
        }
    }

    #[cfg(unix)]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.file
            .write_all_at(data, offset)
            .context("staging write failed")
    }

    /// Non-Unix fallback: seek + write on a cloned handle. Not safe for concurrent use.
    #[cfg(not(unix))]
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        use std::io::{Seek, SeekFrom, Write};
        let mut f = (*self.file).try_clone()?;
        f.seek(SeekFrom::Start(offset))?;
        f.write_all(data).context("staging write failed")
    }

    pub fn sync(&self) -> Result<()> {
        self.file.sync_all().context("staging sync failed")
    }
}
