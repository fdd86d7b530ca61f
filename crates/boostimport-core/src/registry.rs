//! Per-run deduplication registries.
//!
//! `bad` holds deal ids that will not be touched again during this process
//! run (policy rejections and failed imports). `in_flight` holds deal ids
//! whose download chain has been started. Neither set is persisted; a restart
//! starts from empty sets.
//!
//! An in-flight marker can outlive its download task. A successful download
//! never clears it: once imported, the deal's Boost status moves past
//! "Awaiting Offline Data Import" anyway. A download that runs out of retries
//! only clears it under `DownloadExhaustion::Release`; with the default
//! `Hold` the id stays marked so the deal is not fetched again this run, and
//! it is not added to `bad` either.

use std::collections::HashSet;
use std::sync::RwLock;

/// Shared bad-deal and in-flight sets. Share via `Arc<Deduplicator>`.
#[derive(Debug, Default)]
pub struct Deduplicator {
    bad: RwLock<HashSet<String>>,
    in_flight: RwLock<HashSet<String>>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bad(&self, deal_id: &str) -> bool {
        self.bad.read().unwrap().contains(deal_id)
    }

    /// Returns true if the id was not already marked.
    pub fn mark_bad(&self, deal_id: &str) -> bool {
        self.bad.write().unwrap().insert(deal_id.to_string())
    }

    pub fn is_in_flight(&self, deal_id: &str) -> bool {
        self.in_flight.read().unwrap().contains(deal_id)
    }

    /// Returns true if the id was not already marked.
    pub fn mark_in_flight(&self, deal_id: &str) -> bool {
        self.in_flight.write().unwrap().insert(deal_id.to_string())
    }

    pub fn clear_in_flight(&self, deal_id: &str) {
        self.in_flight.write().unwrap().remove(deal_id);
    }

    pub fn bad_count(&self) -> usize {
        self.bad.read().unwrap().len()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.read().unwrap().len()
    }
}
