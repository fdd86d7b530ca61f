//! Deal records as returned by the Boost deal listing.
//!
//! Boost wraps 64-bit integers as `{ "n": "<digits>" }` in GraphQL responses;
//! those fields are unwrapped at deserialization time so the rest of the crate
//! sees plain `u64`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Status of a proposal waiting for its data to be imported by hand.
pub const STATUS_AWAITING_IMPORT: &str = "Awaiting Offline Data Import";
/// First sealing sub-stage; deals here count as committed capacity.
pub const STATUS_PRECOMMIT1: &str = "Sealer: PreCommit1";
pub const STATUS_READY_TO_PUBLISH: &str = "Ready to Publish";
pub const STATUS_AWAITING_PUBLISH: &str = "Awaiting Publish Confirmation";
pub const STATUS_ADDING_TO_SECTOR: &str = "Adding to Sector";

/// Unix timestamp of Filecoin mainnet block 0.
pub const GENESIS_TIMESTAMP: i64 = 1_598_306_400;
/// Seconds per chain epoch.
pub const EPOCH_DURATION_SECS: i64 = 30;

/// One deal from the listing snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Deal {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "PieceCid")]
    pub piece_cid: String,
    #[serde(rename = "DealDataRoot")]
    pub data_root: String,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "ClientAddress")]
    pub client_address: String,
    /// Human-readable lifecycle status.
    #[serde(rename = "Message")]
    pub status: String,
    #[serde(rename = "StartEpoch", deserialize_with = "wrapped_u64")]
    pub start_epoch: u64,
    #[serde(rename = "PieceSize", deserialize_with = "wrapped_u64")]
    pub piece_size: u64,
}

impl Deal {
    /// Wall-clock time at which the deal must be sealed and active.
    pub fn start_time(&self) -> DateTime<Utc> {
        epoch_to_time(self.start_epoch)
    }
}

/// Converts a chain height to the wall-clock time of that epoch.
pub fn epoch_to_time(epoch: u64) -> DateTime<Utc> {
    let offset = i64::try_from(epoch)
        .unwrap_or(i64::MAX / EPOCH_DURATION_SECS)
        .saturating_mul(EPOCH_DURATION_SECS);
    DateTime::from_timestamp(GENESIS_TIMESTAMP.saturating_add(offset), 0)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Converts a wall-clock time to the chain height in effect at that moment.
/// Times before genesis map to epoch 0.
pub fn time_to_epoch(time: DateTime<Utc>) -> u64 {
    let secs = time.timestamp().saturating_sub(GENESIS_TIMESTAMP).max(0);
    (secs / EPOCH_DURATION_SECS) as u64
}

fn wrapped_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped {
        n: String,
    }

    let w = Wrapped::deserialize(deserializer)?;
    w.n.trim().parse::<u64>().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_parses_wrapped_numbers() {
        let json = r#"{
            "ID": "5d0d3a8e-1c1c-4d5b-9b7e-9d7f5c1b2a10",
            "PieceCid": "baga6ea4seaqpiece",
            "DealDataRoot": "bafyroot",
            "CreatedAt": "2023-04-01T12:00:00Z",
            "ClientAddress": "f1client",
            "Message": "Awaiting Offline Data Import",
            "StartEpoch": { "n": "2700000" },
            "PieceSize": { "n": "34359738368" }
        }"#;
        let deal: Deal = serde_json::from_str(json).unwrap();
        assert_eq!(deal.id, "5d0d3a8e-1c1c-4d5b-9b7e-9d7f5c1b2a10");
        assert_eq!(deal.start_epoch, 2_700_000);
        assert_eq!(deal.piece_size, 34_359_738_368);
        assert_eq!(deal.status, STATUS_AWAITING_IMPORT);
        assert_eq!(deal.created_at.timestamp(), 1_680_350_400);
    }

    #[test]
    fn deal_rejects_non_numeric_wrapped_value() {
        let json = r#"{
            "ID": "x", "PieceCid": "p", "DealDataRoot": "d",
            "CreatedAt": "2023-04-01T12:00:00Z", "ClientAddress": "f1",
            "Message": "m", "StartEpoch": { "n": "abc" }, "PieceSize": { "n": "1" }
        }"#;
        assert!(serde_json::from_str::<Deal>(json).is_err());
    }

    #[test]
    fn epoch_conversion() {
        assert_eq!(epoch_to_time(0).timestamp(), GENESIS_TIMESTAMP);
        assert_eq!(epoch_to_time(2).timestamp(), GENESIS_TIMESTAMP + 60);
        let t = epoch_to_time(1_000_000);
        assert_eq!(time_to_epoch(t), 1_000_000);
    }

    #[test]
    fn time_before_genesis_is_epoch_zero() {
        let t = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(time_to_epoch(t), 0);
    }
}
