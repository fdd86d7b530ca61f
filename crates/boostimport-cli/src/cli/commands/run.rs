//! `boostimport run`: the import scheduler.

use anyhow::Result;
use boostimport_core::config::ImportConfig;
use boostimport_core::downloader::CurlFetcher;
use boostimport_core::scheduler::SchedulerLoop;
use std::sync::Arc;

use super::connect;

pub async fn run_import(cfg: ImportConfig) -> Result<()> {
    let (graphql, rpc) = connect()?;
    tracing::info!(
        clients = cfg.clients.len(),
        paths = cfg.paths.len(),
        url_template = cfg.url_template.as_deref().unwrap_or("-"),
        run_loop = cfg.run_loop,
        "starting import"
    );

    let scheduler = SchedulerLoop::new(cfg, Arc::new(graphql), Arc::new(rpc), Arc::new(CurlFetcher));
    scheduler.run().await?;

    let registry = scheduler.registry();
    tracing::info!(
        bad = registry.bad_count(),
        in_flight = registry.in_flight_count(),
        "import finished"
    );
    Ok(())
}
