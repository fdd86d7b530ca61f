//! Per-cycle summary.

use crate::classify::RejectReason;

/// How a cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleOutcome {
    /// Every deal in the snapshot was evaluated.
    #[default]
    Completed,
    /// Committed PC1 load was at the cap before any deal was looked at.
    CommittedCapReached,
    /// Potential PC1 load reached the cap part-way through the snapshot.
    PotentialCapReached,
}

/// Counters for one cycle, logged at the end and returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Deals in the snapshot.
    pub deals: usize,
    /// Deals that passed classification.
    pub eligible: usize,
    /// Deals newly added to the bad-deal set by policy checks.
    pub rejected: usize,
    /// Local imports run (including dry-run and failed ones).
    pub imported: usize,
    pub import_failed: usize,
    /// Download chains spawned.
    pub dispatched: usize,
    /// Eligible deals with no local file and no URL template.
    pub no_source: usize,
    /// Eligible deals whose download was already started this run.
    pub in_flight: usize,
}

impl CycleReport {
    pub fn new(deals: usize) -> Self {
        Self {
            deals,
            ..Default::default()
        }
    }

    pub(super) fn record_rejection(&mut self, reason: RejectReason) {
        if reason.is_permanent() && reason != RejectReason::KnownBad {
            self.rejected += 1;
        }
    }
}
