//! `boostimport deals`: show the snapshot and what `run` would do with it.

use anyhow::{Context, Result};
use boostimport_core::capacity::CapacityTracker;
use boostimport_core::classify::DealClassifier;
use boostimport_core::config::ImportConfig;
use boostimport_core::deal::Deal;
use boostimport_core::registry::Deduplicator;
use boostimport_core::rpc::DealSource;
use boostimport_core::scheduler::find_local_car;
use chrono::{DateTime, Utc};

use super::connect;

pub async fn run_deals(cfg: &ImportConfig) -> Result<()> {
    let (graphql, _) = connect()?;
    let deals = graphql.list_deals().await.context("failed to list deals")?;

    let capacity = CapacityTracker::from_deals(&deals);
    println!(
        "{} deals, PC1 {:.2} sectors (max {}), potential PC1 {:.2} sectors (max {})",
        deals.len(),
        capacity.committed_sectors(),
        limit(cfg.max_pc1),
        capacity.potential_sectors(),
        limit(cfg.max_potential_pc1),
    );

    let classifier = DealClassifier::from_config(cfg);
    // Scratch registry: listing must not affect a concurrent `run`.
    let registry = Deduplicator::new();
    let now = Utc::now();
    for deal in &deals {
        let verdict = match classifier.evaluate(deal, &registry, now) {
            Some(reason) => reason.to_string(),
            None => source_label(cfg, deal).await,
        };
        println!("{}", format_row(deal, &verdict));
    }
    Ok(())
}

async fn source_label(cfg: &ImportConfig, deal: &Deal) -> String {
    match find_local_car(&cfg.paths, deal).await {
        Ok(Some(path)) => format!("eligible: {}", path.display()),
        Ok(None) if cfg.url_template.is_some() => "eligible: download".to_string(),
        Ok(None) => "eligible: no local file".to_string(),
        Err(e) => format!("eligible: search failed ({})", e),
    }
}

fn limit(max: u64) -> String {
    if max == 0 {
        "none".to_string()
    } else {
        max.to_string()
    }
}

pub(crate) fn format_row(deal: &Deal, verdict: &str) -> String {
    format!(
        "{}  {:<16}  {:>14}  {}  {:<32}  {}",
        deal.id,
        deal.client_address,
        deal.piece_size,
        short_time(deal.created_at),
        deal.status,
        verdict
    )
}

fn short_time(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M").to_string()
}
