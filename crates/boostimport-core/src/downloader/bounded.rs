//! Download gate + staging + retry around a [`Fetcher`].

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::config::ImportConfig;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage;

use super::Fetcher;

/// Serializes transfers through a semaphore shared by every download chain.
/// The gate capacity is the configured download concurrency (1 by default).
pub struct BoundedDownloader {
    fetcher: Arc<dyn Fetcher>,
    gate: Semaphore,
    concurrency: usize,
    connections: usize,
    policy: RetryPolicy,
    dry_run: bool,
}

impl BoundedDownloader {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        concurrency: usize,
        connections: usize,
        policy: RetryPolicy,
        dry_run: bool,
    ) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            fetcher,
            gate: Semaphore::new(concurrency),
            concurrency,
            connections: connections.max(1),
            policy,
            dry_run,
        }
    }

    pub fn from_config(fetcher: Arc<dyn Fetcher>, cfg: &ImportConfig) -> Self {
        Self::new(
            fetcher,
            cfg.download_concurrency,
            cfg.download_threads,
            RetryPolicy::for_retries(cfg.download_retries),
            cfg.dry_run,
        )
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Free gate slots right now.
    pub fn available_slots(&self) -> usize {
        self.gate.available_permits()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Download `url` to `dest`, retrying per policy. On error no
    /// `<dest>.downloading` file is left behind.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        run_with_retry(&self.policy, |attempt| self.attempt(url, dest, attempt)).await
    }

    async fn attempt(&self, url: &str, dest: &Path, attempt: u32) -> Result<()> {
        let _permit = self.gate.acquire().await.context("download gate closed")?;
        tracing::info!(url, dest = %dest.display(), attempt, "downloading");
        if self.dry_run {
            return Ok(());
        }

        let staging = storage::temp_path(dest);
        let result = self.transfer(url, dest, &staging).await;
        if result.is_err() {
            if let Err(e) = storage::remove_partial(&staging).await {
                tracing::warn!(path = %staging.display(), "could not remove partial download: {}", e);
            }
        }
        result
    }

    async fn transfer(&self, url: &str, dest: &Path, staging: &Path) -> Result<()> {
        if let Some(dir) = dest.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create download folder {}", dir.display()))?;
        }
        self.fetcher.fetch(url, staging, self.connections).await?;
        tokio::fs::rename(staging, dest).await.with_context(|| {
            format!("failed to rename {} to {}", staging.display(), dest.display())
        })?;
        Ok(())
    }
}
