//! CLI parse and settings tests.

use super::{Cli, CliCommand, ImportArgs};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

pub(super) fn run_args(args: &[&str]) -> ImportArgs {
    match parse(args).command {
        CliCommand::Run(a) => a,
        other => panic!("expected Run, got {:?}", other),
    }
}

mod deals;
