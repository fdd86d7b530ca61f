//! Locating piece data on disk and resolving download URLs.

use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};

use crate::deal::Deal;

/// Search `paths` in order; within each path `<pieceCid>.car` wins over
/// `<dataRoot>.car`. Identifiers that are not plain file names are ignored.
pub async fn find_local_car(paths: &[PathBuf], deal: &Deal) -> io::Result<Option<PathBuf>> {
    for dir in paths {
        for cid in [&deal.piece_cid, &deal.data_root] {
            if !is_plain_name(cid) {
                continue;
            }
            let candidate = car_path(dir, cid);
            if tokio::fs::try_exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }
    }
    Ok(None)
}

/// `<dir>/<cid>.car`.
pub(super) fn car_path(dir: &Path, cid: &str) -> PathBuf {
    dir.join(format!("{}.car", cid))
}

/// Substitute `{pieceCid}` and `{dataCid}` into `template` and check the result parses.
pub fn download_url(template: &str, deal: &Deal) -> Result<String> {
    let raw = template
        .replace("{pieceCid}", &deal.piece_cid)
        .replace("{dataCid}", &deal.data_root);
    let url = url::Url::parse(&raw).with_context(|| format!("invalid download URL {:?}", raw))?;
    Ok(url.to_string())
}

pub(super) fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
