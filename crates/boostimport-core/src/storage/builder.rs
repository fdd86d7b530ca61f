//! Builder for creating and preallocating staging files.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

use super::writer::StorageWriter;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;

/// Creates (truncating) a staging file; `preallocate` then `build` yields a
/// writer that segment threads can share.
pub struct StorageWriterBuilder {
    file: File,
}

impl StorageWriterBuilder {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to create staging file: {}", path.display()))?;
        Ok(StorageWriterBuilder { file })
    }

    /// Reserve `size` bytes. Uses `posix_fallocate` on Unix, `set_len` otherwise
    /// or when the filesystem does not support it.
    pub fn preallocate(&mut self, size: u64) -> Result<()> {
        #[cfg(unix)]
        {
            let fd = self.file.as_raw_fd();
            let r = unsafe { libc::posix_fallocate(fd, 0, size as libc::off_t) };
            if r == 0 {
                return Ok(());
            }
            tracing::debug!(errno = r, "posix_fallocate failed, falling back to set_len");
        }
        self.file
            .set_len(size)
            .context("failed to preallocate staging file")?;
        Ok(())
    }

    pub fn build(self) -> StorageWriter {
        StorageWriter::new(self.file)
    }
}
