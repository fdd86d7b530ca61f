//! Tests for the `deals` subcommand.

use super::parse;
use crate::cli::commands::format_row;
use crate::cli::CliCommand;
use boostimport_core::deal::Deal;
use chrono::{TimeZone, Utc};

#[test]
fn cli_parse_deals_accepts_import_flags() {
    match parse(&["boostimport", "deals", "-c", "f1aaa", "-p", "/mnt/a"]).command {
        CliCommand::Deals(args) => {
            assert_eq!(args.clients, vec!["f1aaa".to_string()]);
            assert!(!args.run_loop);
        }
        other => panic!("expected Deals, got {:?}", other),
    }
}

#[test]
fn row_includes_id_status_and_verdict() {
    let deal = Deal {
        id: "d1".to_string(),
        piece_cid: "baga".to_string(),
        data_root: "bafy".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
        client_address: "f1client".to_string(),
        status: "Awaiting Offline Data Import".to_string(),
        start_epoch: 0,
        piece_size: 34_359_738_368,
    };
    let row = format_row(&deal, "too_old");
    assert!(row.starts_with("d1  f1client"));
    assert!(row.contains("2024-03-01 08:30"));
    assert!(row.contains("34359738368"));
    assert!(row.ends_with("too_old"));
}
