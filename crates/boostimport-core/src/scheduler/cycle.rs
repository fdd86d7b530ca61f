//! The scheduler loop and a single poll cycle.

use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

use crate::capacity::CapacityTracker;
use crate::classify::{DealClassifier, Verdict};
use crate::config::{ImportConfig, ProcessOrder};
use crate::deal::Deal;
use crate::downloader::{BoundedDownloader, Fetcher};
use crate::executor::{ImportExecutor, ImportOutcome};
use crate::registry::Deduplicator;
use crate::rpc::{DealImporter, DealSource};

use super::dispatch::DownloadChain;
use super::locate::{car_path, download_url, find_local_car, is_plain_name};
use super::report::{CycleOutcome, CycleReport};

/// Owns the per-run registries and the background download chains.
pub struct SchedulerLoop {
    cfg: Arc<ImportConfig>,
    source: Arc<dyn DealSource>,
    classifier: DealClassifier,
    registry: Arc<Deduplicator>,
    executor: ImportExecutor,
    downloader: Arc<BoundedDownloader>,
    tasks: Mutex<JoinSet<()>>,
}

impl SchedulerLoop {
    pub fn new(
        cfg: ImportConfig,
        source: Arc<dyn DealSource>,
        importer: Arc<dyn DealImporter>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let downloader = BoundedDownloader::from_config(fetcher, &cfg);
        Self::with_downloader(cfg, source, importer, downloader)
    }

    /// Like `new` with a pre-built downloader (custom retry policy, gate size).
    pub fn with_downloader(
        cfg: ImportConfig,
        source: Arc<dyn DealSource>,
        importer: Arc<dyn DealImporter>,
        downloader: BoundedDownloader,
    ) -> Self {
        tracing::debug!(
            download_slots = downloader.concurrency(),
            poll_interval_secs = cfg.poll_interval.as_secs(),
            "scheduler configured"
        );
        let registry = Arc::new(Deduplicator::new());
        let executor = ImportExecutor::new(importer, Arc::clone(&registry), cfg.dry_run);
        Self {
            classifier: DealClassifier::from_config(&cfg),
            cfg: Arc::new(cfg),
            source,
            registry,
            executor,
            downloader: Arc::new(downloader),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn registry(&self) -> &Arc<Deduplicator> {
        &self.registry
    }

    /// Number of download chains not yet reaped.
    pub fn outstanding(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Run once, or forever in loop mode. In once mode a listing failure is
    /// returned after outstanding downloads finish; in loop mode it is logged
    /// and the next cycle starts after the poll interval.
    pub async fn run(&self) -> Result<()> {
        if !self.cfg.run_loop {
            let result = self.run_cycle().await;
            self.wait_idle().await;
            return result.map(|_| ());
        }

        loop {
            if let Err(e) = self.run_cycle().await {
                tracing::error!("cycle failed: {:#}", e);
            }
            tokio::time::sleep(self.cfg.poll_interval).await;
        }
    }

    /// One poll cycle.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        self.reap_finished();

        tracing::info!("fetching deals from Boost");
        let mut deals = self
            .source
            .list_deals()
            .await
            .context("failed to list deals")?;
        if self.cfg.order == ProcessOrder::OldestFirst {
            deals.reverse();
        }

        let mut report = CycleReport::new(deals.len());
        let mut capacity = CapacityTracker::from_deals(&deals);
        tracing::debug!(
            deals = deals.len(),
            committed_pc1 = capacity.committed_sectors(),
            potential_pc1 = capacity.potential_sectors(),
            "capacity"
        );

        if !capacity.admit_committed(self.cfg.max_pc1) {
            tracing::info!(
                running = capacity.committed_sectors(),
                max = self.cfg.max_pc1,
                "skipping import, PC1 limit reached"
            );
            report.outcome = CycleOutcome::CommittedCapReached;
            return Ok(report);
        }

        for deal in &deals {
            if !capacity.admit_potential(self.cfg.max_potential_pc1) {
                tracing::info!(
                    potential = capacity.potential_sectors(),
                    max = self.cfg.max_potential_pc1,
                    "skipping remaining deals, potential PC1 limit reached"
                );
                report.outcome = CycleOutcome::PotentialCapReached;
                break;
            }

            match self.classifier.classify(deal, &self.registry, Utc::now()) {
                Verdict::Rejected(reason) => {
                    report.record_rejection(reason);
                    continue;
                }
                Verdict::Eligible => report.eligible += 1,
            }

            self.process_eligible(deal, &mut capacity, &mut report).await;
        }

        tracing::info!(
            deals = report.deals,
            eligible = report.eligible,
            imported = report.imported,
            dispatched = report.dispatched,
            outcome = ?report.outcome,
            "cycle finished"
        );
        Ok(report)
    }

    async fn process_eligible(
        &self,
        deal: &Deal,
        capacity: &mut CapacityTracker,
        report: &mut CycleReport,
    ) {
        let local = match find_local_car(&self.cfg.paths, deal).await {
            Ok(found) => found,
            Err(e) => {
                self.registry.mark_bad(&deal.id);
                tracing::error!(deal_id = %deal.id, "searching for piece data failed: {}", e);
                return;
            }
        };

        if let Some(path) = local {
            let outcome = self.executor.execute(&deal.id, &path).await;
            report.imported += 1;
            if matches!(outcome, ImportOutcome::Failed(_)) {
                report.import_failed += 1;
            }
            capacity.add_potential(deal.piece_size);
            // One local import per interval.
            if !self.cfg.interval.is_zero() {
                tokio::time::sleep(self.cfg.interval).await;
            }
            return;
        }

        let (Some(template), Some(folder)) = (
            self.cfg.url_template.as_deref(),
            self.cfg.download_folder.as_deref(),
        ) else {
            report.no_source += 1;
            return;
        };

        if self.registry.is_in_flight(&deal.id) {
            report.in_flight += 1;
            return;
        }

        let url = match download_url(template, deal) {
            Ok(url) => url,
            Err(e) => {
                self.registry.mark_bad(&deal.id);
                tracing::error!(deal_id = %deal.id, "{:#}", e);
                return;
            }
        };
        if !is_plain_name(&deal.piece_cid) {
            self.registry.mark_bad(&deal.id);
            tracing::error!(deal_id = %deal.id, piece_cid = %deal.piece_cid, "piece CID is not a valid file name");
            return;
        }

        self.registry.mark_in_flight(&deal.id);
        let chain = DownloadChain {
            deal_id: deal.id.clone(),
            url,
            dest: car_path(folder, &deal.piece_cid),
            downloader: Arc::clone(&self.downloader),
            executor: self.executor.clone(),
            registry: Arc::clone(&self.registry),
            on_exhausted: self.cfg.on_download_exhausted,
        };
        tracing::info!(deal_id = %deal.id, url = %chain.url, "dispatching download");
        self.tasks.lock().unwrap().spawn(chain.run());
        report.dispatched += 1;
    }

    /// Wait for every outstanding download chain to finish.
    pub async fn wait_idle(&self) {
        loop {
            let mut set = std::mem::take(&mut *self.tasks.lock().unwrap());
            if set.is_empty() {
                return;
            }
            while let Some(res) = set.join_next().await {
                if let Err(e) = res {
                    tracing::error!("download task aborted: {}", e);
                }
            }
        }
    }

    fn reap_finished(&self) {
        let mut tasks = self.tasks.lock().unwrap();
        while let Some(res) = tasks.try_join_next() {
            if let Err(e) = res {
                tracing::error!("download task aborted: {}", e);
            }
        }
    }
}
