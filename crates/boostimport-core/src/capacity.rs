//! Sealing pipeline capacity accounting.
//!
//! Limits are expressed in 32 GiB sector units so operators can reason in
//! "number of PC1s" rather than bytes. Totals are rebuilt from the deal
//! snapshot every cycle; only `add_potential` mutates them afterwards.

use crate::deal::{
    Deal, STATUS_ADDING_TO_SECTOR, STATUS_AWAITING_PUBLISH, STATUS_PRECOMMIT1,
    STATUS_READY_TO_PUBLISH,
};

/// Size of one sector, used to convert byte totals into sector counts.
pub const SECTOR_UNIT_BYTES: u64 = 32 * 1024 * 1024 * 1024;

/// Committed and potential PreCommit1 load for one poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapacityTracker {
    committed: u64,
    potential: u64,
}

impl CapacityTracker {
    /// Builds totals from the full snapshot in one pass.
    pub fn from_deals<'a, I>(deals: I) -> Self
    where
        I: IntoIterator<Item = &'a Deal>,
    {
        let mut tracker = Self::default();
        for deal in deals {
            match deal.status.as_str() {
                STATUS_PRECOMMIT1 => {
                    tracker.committed = tracker.committed.saturating_add(deal.piece_size);
                    tracker.potential = tracker.potential.saturating_add(deal.piece_size);
                }
                STATUS_READY_TO_PUBLISH | STATUS_AWAITING_PUBLISH | STATUS_ADDING_TO_SECTOR => {
                    tracker.potential = tracker.potential.saturating_add(deal.piece_size);
                }
                _ => {}
            }
        }
        tracker
    }

    /// Bytes in the first sealing sub-stage.
    pub fn committed(&self) -> u64 {
        self.committed
    }

    /// Committed bytes plus bytes likely to reach PreCommit1 soon.
    pub fn potential(&self) -> u64 {
        self.potential
    }

    pub fn committed_sectors(&self) -> f64 {
        self.committed as f64 / SECTOR_UNIT_BYTES as f64
    }

    pub fn potential_sectors(&self) -> f64 {
        self.potential as f64 / SECTOR_UNIT_BYTES as f64
    }

    /// True if `limit` is 0 (unlimited) or committed load is below it.
    pub fn admit_committed(&self, limit: u64) -> bool {
        limit == 0 || self.committed_sectors() < limit as f64
    }

    /// True if `limit` is 0 (unlimited) or potential load is below it.
    pub fn admit_potential(&self, limit: u64) -> bool {
        limit == 0 || self.potential_sectors() < limit as f64
    }

    /// Account for a deal admitted during the current cycle.
    pub fn add_potential(&mut self, bytes: u64) {
        self.potential = self.potential.saturating_add(bytes);
    }
}
