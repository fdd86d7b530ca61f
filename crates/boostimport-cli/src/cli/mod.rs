//! CLI for the Boost offline deal importer.

mod commands;

use anyhow::Result;
use boostimport_core::config::{DownloadExhaustion, ImportConfig, ImportSettings, ProcessOrder};
use boostimport_core::logging::LogTarget;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use commands::{run_deals, run_import};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "boostimport")]
#[command(about = "Import offline Boost deals from local or remote CAR files", long_about = None)]
pub struct Cli {
    /// TOML file with import settings; flags override its values.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log to stderr instead of the state-directory log file.
    #[arg(long, global = true, conflicts_with = "log_file")]
    pub log_stderr: bool,

    /// Log to this file instead of the state-directory log file.
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Poll Boost and import deals that are awaiting offline data.
    Run(ImportArgs),

    /// Print the current deal snapshot with each deal's verdict. Changes nothing.
    Deals(ImportArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExhaustedArg {
    Hold,
    Release,
    Ban,
}

impl From<ExhaustedArg> for DownloadExhaustion {
    fn from(arg: ExhaustedArg) -> Self {
        match arg {
            ExhaustedArg::Hold => DownloadExhaustion::Hold,
            ExhaustedArg::Release => DownloadExhaustion::Release,
            ExhaustedArg::Ban => DownloadExhaustion::Ban,
        }
    }
}

/// Import settings as flags. Anything left unset falls back to the config
/// file, then to built-in defaults.
#[derive(Debug, Default, Args)]
pub struct ImportArgs {
    /// Client address to import deals from (repeatable); default is all clients.
    #[arg(short = 'c', long = "client", value_name = "ADDRESS")]
    pub clients: Vec<String>,

    /// Directory searched for `<pieceCid>.car` / `<dataRoot>.car` (repeatable).
    #[arg(short = 'p', long = "path", value_name = "DIR")]
    pub paths: Vec<PathBuf>,

    /// Skip proposals older than this (e.g. `1d`, `12h`, or seconds).
    #[arg(short = 's', long, value_name = "DURATION")]
    pub since: Option<String>,

    /// Minimum time left before the deal start epoch (at least 4h).
    #[arg(long, value_name = "DURATION")]
    pub sealing_duration: Option<String>,

    /// Download URL with `{pieceCid}` / `{dataCid}` placeholders.
    #[arg(short = 'u', long, value_name = "TEMPLATE")]
    pub url_template: Option<String>,

    /// Parallel connections per download.
    #[arg(long, value_name = "N")]
    pub download_threads: Option<usize>,

    /// Retries after a failed download.
    #[arg(long, value_name = "N")]
    pub download_retries: Option<u32>,

    /// Where downloaded CAR files are written.
    #[arg(short = 'o', long, value_name = "DIR")]
    pub download_folder: Option<PathBuf>,

    /// Pause after each local import (0 disables it).
    #[arg(short = 'i', long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Pause between polls in loop mode (default 1m, must be non-zero).
    #[arg(long, value_name = "DURATION")]
    pub poll_interval: Option<String>,

    /// Downloads allowed to transfer at the same time.
    #[arg(long, value_name = "N")]
    pub download_concurrency: Option<usize>,

    /// Stop importing while this many sectors are in PreCommit1 (0 = no limit).
    #[arg(long = "max-pc1", value_name = "SECTORS")]
    pub max_pc1: Option<u64>,

    /// Stop importing while this many sectors are headed for PreCommit1 (0 = no limit).
    #[arg(long = "max-potential-pc1", value_name = "SECTORS")]
    pub max_potential_pc1: Option<u64>,

    /// Walk the listing oldest proposal first.
    #[arg(long)]
    pub oldest_first: bool,

    /// What to do with a deal whose download ran out of retries.
    #[arg(long, value_enum, value_name = "POLICY")]
    pub on_download_exhausted: Option<ExhaustedArg>,

    /// Log what would be imported or downloaded without doing it.
    #[arg(short = 'd', long, conflicts_with = "no_dry_run")]
    pub dry_run: bool,

    /// Import for real even if the config file sets `dry_run`.
    #[arg(long)]
    pub no_dry_run: bool,

    /// Keep polling instead of exiting after one cycle.
    #[arg(short = 'l', long = "loop", conflicts_with = "once")]
    pub run_loop: bool,

    /// Run a single cycle even if the config file sets `loop`.
    #[arg(long)]
    pub once: bool,
}

impl ImportArgs {
    /// Flags as a settings layer. Unset flags leave the file value alone.
    pub fn to_settings(&self) -> ImportSettings {
        ImportSettings {
            clients: non_empty(&self.clients),
            paths: non_empty(&self.paths),
            since: self.since.clone(),
            sealing_duration: self.sealing_duration.clone(),
            url_template: self.url_template.clone(),
            download_threads: self.download_threads,
            download_retries: self.download_retries,
            download_folder: self.download_folder.clone(),
            interval: self.interval.clone(),
            poll_interval: self.poll_interval.clone(),
            download_concurrency: self.download_concurrency,
            max_pc1: self.max_pc1,
            max_potential_pc1: self.max_potential_pc1,
            order: self.oldest_first.then_some(ProcessOrder::OldestFirst),
            on_download_exhausted: self.on_download_exhausted.map(Into::into),
            dry_run: switch(self.dry_run, self.no_dry_run),
            run_loop: switch(self.run_loop, self.once),
        }
    }
}

/// `--flag` → Some(true), `--no-flag` → Some(false), neither → None.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (false, true) => Some(false),
        (false, false) => None,
    }
}

fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}

impl Cli {
    pub fn log_target(&self) -> LogTarget {
        match (&self.log_file, self.log_stderr) {
            (_, true) => LogTarget::Stderr,
            (Some(path), false) => LogTarget::File(path.clone()),
            (None, false) => LogTarget::StateFile,
        }
    }

    /// Config file (if any) merged with `args`, then validated.
    pub fn resolve_config(&self, args: &ImportArgs) -> Result<ImportConfig> {
        let base = match &self.config {
            Some(path) => ImportSettings::from_file(path)?,
            None => ImportSettings::default(),
        };
        let cfg = base.merge(args.to_settings()).resolve()?;
        tracing::debug!("import config: {:?}", cfg);
        Ok(cfg)
    }

    pub async fn run(&self) -> Result<()> {
        match &self.command {
            CliCommand::Run(args) => run_import(self.resolve_config(args)?).await,
            CliCommand::Deals(args) => run_deals(&self.resolve_config(args)?).await,
        }
    }
}

#[cfg(test)]
mod tests;
