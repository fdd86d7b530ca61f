//! Per-deal eligibility checks.
//!
//! Checks run in a fixed order and the first failure wins. Policy rejections
//! (client, age, start deadline) are permanent for the run: the deal id goes
//! into the bad-deal set so later cycles hit the cheap `KnownBad` path.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;

use crate::config::ImportConfig;
use crate::deal::{Deal, STATUS_AWAITING_IMPORT};
use crate::registry::Deduplicator;

/// Why a deal was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Status is not "Awaiting Offline Data Import". Nothing recorded.
    NotAwaitingImport,
    /// Already in the bad-deal set.
    KnownBad,
    /// Client address is not in the configured allow-list.
    ClientNotAllowed,
    /// Proposal is older than the `since` threshold.
    TooOld,
    /// Not enough time left to seal before the start epoch.
    StartTooSoon,
}

impl RejectReason {
    /// Stable reason code for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NotAwaitingImport => "not_awaiting_import",
            RejectReason::KnownBad => "known_bad",
            RejectReason::ClientNotAllowed => "client_not_allowed",
            RejectReason::TooOld => "too_old",
            RejectReason::StartTooSoon => "start_too_soon",
        }
    }

    /// True for rejections that put the deal in the bad-deal set.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, RejectReason::NotAwaitingImport)
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }
}

/// Policy thresholds taken from the import config.
#[derive(Debug, Clone)]
pub struct DealClassifier {
    clients: HashSet<String>,
    since: Duration,
    sealing_duration: Duration,
}

impl DealClassifier {
    pub fn new(clients: HashSet<String>, since: Duration, sealing_duration: Duration) -> Self {
        Self {
            clients,
            since,
            sealing_duration,
        }
    }

    pub fn from_config(cfg: &ImportConfig) -> Self {
        Self::new(cfg.clients.clone(), cfg.since, cfg.sealing_duration)
    }

    /// Classify `deal` at time `now`, recording permanent rejections in `registry`.
    pub fn classify(&self, deal: &Deal, registry: &Deduplicator, now: DateTime<Utc>) -> Verdict {
        match self.evaluate(deal, registry, now) {
            None => Verdict::Eligible,
            Some(RejectReason::NotAwaitingImport) => {
                Verdict::Rejected(RejectReason::NotAwaitingImport)
            }
            Some(RejectReason::KnownBad) => Verdict::Rejected(RejectReason::KnownBad),
            Some(reason) => {
                registry.mark_bad(&deal.id);
                tracing::info!(
                    deal_id = %deal.id,
                    client = %deal.client_address,
                    reason = reason.as_str(),
                    "skipping deal for the rest of this run"
                );
                Verdict::Rejected(reason)
            }
        }
    }

    /// Same checks as `classify` without touching the registry.
    pub fn evaluate(
        &self,
        deal: &Deal,
        registry: &Deduplicator,
        now: DateTime<Utc>,
    ) -> Option<RejectReason> {
        if deal.status != STATUS_AWAITING_IMPORT {
            return Some(RejectReason::NotAwaitingImport);
        }
        if registry.is_bad(&deal.id) {
            return Some(RejectReason::KnownBad);
        }
        if !self.clients.is_empty() && !self.clients.contains(&deal.client_address) {
            return Some(RejectReason::ClientNotAllowed);
        }
        if now.signed_duration_since(deal.created_at) > chrono_duration(self.since) {
            return Some(RejectReason::TooOld);
        }
        let seal_by = deal
            .start_time()
            .checked_sub_signed(chrono_duration(self.sealing_duration));
        if seal_by.map_or(true, |t| t < now) {
            return Some(RejectReason::StartTooSoon);
        }
        None
    }
}

fn chrono_duration(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or(chrono::Duration::MAX)
}
