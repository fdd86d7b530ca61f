//! Remote file retrieval.
//!
//! [`Fetcher`] is the seam the scheduler downloads through. [`CurlFetcher`]
//! is the libcurl implementation: a HEAD probe decides between splitting the
//! body into Range segments fetched on parallel connections, or a single
//! streamed GET when the server does not advertise byte ranges.
//! [`BoundedDownloader`] adds the global concurrency gate, staging file
//! handling and retry on top of any `Fetcher`.

mod bounded;
mod error;
mod segment;
mod single;

pub use bounded::BoundedDownloader;
pub use error::FetchError;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

use crate::fetch_head;
use crate::segmenter::plan_segments;
use crate::storage::StorageWriterBuilder;

/// Fetches `url` into the file at `dest` (created or truncated), using up to
/// `connections` parallel connections.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path, connections: usize) -> Result<()>;
}

/// libcurl-backed multi-connection fetcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlFetcher;

#[async_trait]
impl Fetcher for CurlFetcher {
    async fn fetch(&self, url: &str, dest: &Path, connections: usize) -> Result<()> {
        let url = url.to_string();
        let dest = dest.to_path_buf();
        let bytes = tokio::task::spawn_blocking(move || download_to(&url, &dest, connections))
            .await
            .context("download worker panicked")??;
        tracing::debug!(bytes, "transfer complete");
        Ok(())
    }
}

/// Blocking download of `url` to `dest`. Returns the number of bytes written.
pub fn download_to(url: &str, dest: &Path, connections: usize) -> Result<u64> {
    let head = match fetch_head::probe(url) {
        Ok(h) => Some(h),
        Err(e) => {
            tracing::debug!(url, "HEAD probe failed, using a single stream: {:#}", e);
            None
        }
    };

    let mut builder = StorageWriterBuilder::create(dest)?;
    let segmentable = head.as_ref().and_then(|h| h.segmentable_len());
    match segmentable {
        Some(len) if connections > 1 && cfg!(unix) => {
            builder.preallocate(len)?;
            let writer = builder.build();
            let segments = plan_segments(len, connections);
            tracing::debug!(url, len, segments = segments.len(), "segmented download");
            segment::download_segments(url, &segments, &writer)
                .with_context(|| format!("GET {} failed", url))?;
            writer.sync()?;
            Ok(len)
        }
        _ => {
            let writer = builder.build();
            let expected = head.and_then(|h| h.content_length);
            let written = single::download_single(url, &writer, expected)
                .with_context(|| format!("GET {} failed", url))?;
            writer.sync()?;
            Ok(written)
        }
    }
}
