//! Staging files for downloads.
//!
//! Data is written to `<dest>.downloading` and renamed into place only after
//! the whole body arrived, so a `.car` file at its final name is always
//! complete.

mod builder;
mod writer;

pub use builder::StorageWriterBuilder;
pub use writer::StorageWriter;

use std::io;
use std::path::{Path, PathBuf};

/// Suffix of the staging file.
pub const TEMP_SUFFIX: &str = ".downloading";

/// `<dest>.downloading`.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Remove a staging file; a missing file is not an error.
pub async fn remove_partial(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
