//! Background download→import chains.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::DownloadExhaustion;
use crate::downloader::BoundedDownloader;
use crate::executor::ImportExecutor;
use crate::registry::Deduplicator;

/// Everything one chain needs; moved into the spawned task.
pub(super) struct DownloadChain {
    pub deal_id: String,
    pub url: String,
    pub dest: PathBuf,
    pub downloader: Arc<BoundedDownloader>,
    pub executor: ImportExecutor,
    pub registry: Arc<Deduplicator>,
    pub on_exhausted: DownloadExhaustion,
}

impl DownloadChain {
    /// Download, then import. Exhausted retries are handled per `on_exhausted`;
    /// the in-flight marker stays set otherwise.
    pub async fn run(self) {
        match self.downloader.download(&self.url, &self.dest).await {
            Ok(()) => {
                self.executor.execute(&self.deal_id, &self.dest).await;
            }
            Err(e) => {
                tracing::error!(
                    deal_id = %self.deal_id,
                    url = %self.url,
                    dest = %self.dest.display(),
                    attempts = self.downloader.policy().max_attempts,
                    "download failed: {:#}",
                    e
                );
                match self.on_exhausted {
                    DownloadExhaustion::Hold => {}
                    DownloadExhaustion::Release => self.registry.clear_in_flight(&self.deal_id),
                    DownloadExhaustion::Ban => {
                        self.registry.mark_bad(&self.deal_id);
                    }
                }
            }
        }
    }
}
