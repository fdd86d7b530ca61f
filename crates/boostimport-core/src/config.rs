//! Import configuration: optional TOML file merged with CLI flags, then
//! validated into an [`ImportConfig`].
//!
//! Every field of [`ImportSettings`] is optional so that a file can provide a
//! base and flags override only what the operator actually passed.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var holding `<token>:<multiaddr>` for the Boost market JSON-RPC API.
pub const ENV_MARKETS_API_INFO: &str = "MARKETS_API_INFO";
/// Env var holding the base URL of the Boost GraphQL server.
pub const ENV_GRAPHQL_ENDPOINT: &str = "BOOST_GRAPHQL_ENDPOINT";

const DEFAULT_SINCE: Duration = Duration::from_secs(86_400);
const DEFAULT_SEALING_DURATION: Duration = Duration::from_secs(6 * 3600);
const MIN_SEALING_DURATION: Duration = Duration::from_secs(4 * 3600);
const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_DOWNLOAD_THREADS: usize = 8;
const DEFAULT_DOWNLOAD_RETRIES: u32 = 3;
const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 1;

/// Startup validation failures. All are fatal before the first cycle.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    MissingEnv(&'static str),
    #[error("invalid duration for {field}: {value:?}")]
    InvalidDuration { field: &'static str, value: String },
    #[error("sealing duration must be at least 4 hours, got {0}s")]
    SealingDurationTooShort(u64),
    #[error("either a search path or a URL template must be specified")]
    NoSource,
    #[error("a download folder is required when a URL template is specified")]
    MissingDownloadFolder,
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("{field} must be at least 1")]
    TooSmall { field: &'static str },
    #[error("invalid markets API info: {0}")]
    InvalidApiInfo(String),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Order in which the listing snapshot is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessOrder {
    /// Listing order as returned by Boost (newest proposals first).
    #[default]
    NewestFirst,
    /// Reversed listing order.
    OldestFirst,
}

/// What happens to a deal whose download exhausted its retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadExhaustion {
    /// Keep the in-flight marker: no further attempts this run, deal not bad.
    #[default]
    Hold,
    /// Clear the in-flight marker so a later cycle dispatches it again.
    Release,
    /// Mark the deal bad for the rest of the run.
    Ban,
}

/// Raw, partially specified settings (from a TOML file and/or CLI flags).
/// Durations are strings: either bare seconds (`"3600"`) or humantime (`"1h"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportSettings {
    pub clients: Option<Vec<String>>,
    pub paths: Option<Vec<PathBuf>>,
    pub since: Option<String>,
    pub sealing_duration: Option<String>,
    pub url_template: Option<String>,
    pub download_threads: Option<usize>,
    pub download_retries: Option<u32>,
    pub download_folder: Option<PathBuf>,
    pub interval: Option<String>,
    pub poll_interval: Option<String>,
    pub download_concurrency: Option<usize>,
    pub max_pc1: Option<u64>,
    pub max_potential_pc1: Option<u64>,
    pub order: Option<ProcessOrder>,
    pub on_download_exhausted: Option<DownloadExhaustion>,
    pub dry_run: Option<bool>,
    #[serde(rename = "loop")]
    pub run_loop: Option<bool>,
}

/// Validated configuration used by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// Allowed client addresses; empty allows all.
    pub clients: HashSet<String>,
    /// Local directories searched in order for `<cid>.car`.
    pub paths: Vec<PathBuf>,
    /// Proposals older than this are skipped permanently.
    pub since: Duration,
    /// Minimum time between now and the deal start epoch.
    pub sealing_duration: Duration,
    pub url_template: Option<String>,
    pub download_threads: usize,
    pub download_retries: u32,
    pub download_folder: Option<PathBuf>,
    /// Pause after each local import (0 = no pause).
    pub interval: Duration,
    /// Pause between cycles in loop mode. Never zero.
    pub poll_interval: Duration,
    pub download_concurrency: usize,
    /// Max committed PC1 sectors (0 = unlimited).
    pub max_pc1: u64,
    /// Max potential PC1 sectors (0 = unlimited).
    pub max_potential_pc1: u64,
    pub order: ProcessOrder,
    pub on_download_exhausted: DownloadExhaustion,
    pub dry_run: bool,
    pub run_loop: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            clients: HashSet::new(),
            paths: Vec::new(),
            since: DEFAULT_SINCE,
            sealing_duration: DEFAULT_SEALING_DURATION,
            url_template: None,
            download_threads: DEFAULT_DOWNLOAD_THREADS,
            download_retries: DEFAULT_DOWNLOAD_RETRIES,
            download_folder: None,
            interval: DEFAULT_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            download_concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            max_pc1: 0,
            max_potential_pc1: 0,
            order: ProcessOrder::default(),
            on_download_exhausted: DownloadExhaustion::default(),
            dry_run: false,
            run_loop: false,
        }
    }
}

impl ImportSettings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fields set in `overrides` replace those in `self`.
    pub fn merge(self, overrides: ImportSettings) -> ImportSettings {
        ImportSettings {
            clients: overrides.clients.or(self.clients),
            paths: overrides.paths.or(self.paths),
            since: overrides.since.or(self.since),
            sealing_duration: overrides.sealing_duration.or(self.sealing_duration),
            url_template: overrides.url_template.or(self.url_template),
            download_threads: overrides.download_threads.or(self.download_threads),
            download_retries: overrides.download_retries.or(self.download_retries),
            download_folder: overrides.download_folder.or(self.download_folder),
            interval: overrides.interval.or(self.interval),
            poll_interval: overrides.poll_interval.or(self.poll_interval),
            download_concurrency: overrides.download_concurrency.or(self.download_concurrency),
            max_pc1: overrides.max_pc1.or(self.max_pc1),
            max_potential_pc1: overrides.max_potential_pc1.or(self.max_potential_pc1),
            order: overrides.order.or(self.order),
            on_download_exhausted: overrides.on_download_exhausted.or(self.on_download_exhausted),
            dry_run: overrides.dry_run.or(self.dry_run),
            run_loop: overrides.run_loop.or(self.run_loop),
        }
    }

    /// Apply defaults and validate.
    pub fn resolve(self) -> Result<ImportConfig, ConfigError> {
        let defaults = ImportConfig::default();

        let clients: HashSet<String> = self.clients.unwrap_or_default().into_iter().collect();
        if clients.is_empty() {
            tracing::warn!("no clients specified, importing deals from all clients");
        }

        let since = match self.since.as_deref() {
            Some(s) => parse_duration("since", s)?,
            None => defaults.since,
        };
        let sealing_duration = match self.sealing_duration.as_deref() {
            Some(s) => parse_duration("sealing-duration", s)?,
            None => defaults.sealing_duration,
        };
        if sealing_duration < MIN_SEALING_DURATION {
            return Err(ConfigError::SealingDurationTooShort(sealing_duration.as_secs()));
        }
        let interval = match self.interval.as_deref() {
            Some(s) => parse_duration("interval", s)?,
            None => defaults.interval,
        };
        let poll_interval = match self.poll_interval.as_deref() {
            Some(s) => parse_duration("poll-interval", s)?,
            None => defaults.poll_interval,
        };
        if poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }

        let paths = self.paths.unwrap_or_default();
        let url_template = self.url_template.filter(|t| !t.trim().is_empty());
        if paths.is_empty() && url_template.is_none() {
            return Err(ConfigError::NoSource);
        }
        if url_template.is_some() && self.download_folder.is_none() {
            return Err(ConfigError::MissingDownloadFolder);
        }

        let download_concurrency = self
            .download_concurrency
            .unwrap_or(defaults.download_concurrency);
        if download_concurrency < 1 {
            return Err(ConfigError::TooSmall {
                field: "download-concurrency",
            });
        }
        let download_threads = self.download_threads.unwrap_or(defaults.download_threads);
        if download_threads < 1 {
            return Err(ConfigError::TooSmall {
                field: "download-threads",
            });
        }

        let dry_run = self.dry_run.unwrap_or(false);
        if dry_run {
            tracing::warn!("dry run enabled, no deals will be imported or downloaded");
        }

        Ok(ImportConfig {
            clients,
            paths,
            since,
            sealing_duration,
            url_template,
            download_threads,
            download_retries: self.download_retries.unwrap_or(defaults.download_retries),
            download_folder: self.download_folder,
            interval,
            poll_interval,
            download_concurrency,
            max_pc1: self.max_pc1.unwrap_or(0),
            max_potential_pc1: self.max_potential_pc1.unwrap_or(0),
            order: self.order.unwrap_or_default(),
            on_download_exhausted: self.on_download_exhausted.unwrap_or_default(),
            dry_run,
            run_loop: self.run_loop.unwrap_or(false),
        })
    }
}

/// Parse either a bare number of seconds or a humantime string (`"1d"`, `"6h 30m"`).
pub fn parse_duration(field: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let trimmed = value.trim();
    if let Ok(secs) = trimmed.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(trimmed).map_err(|_| ConfigError::InvalidDuration {
        field,
        value: value.to_string(),
    })
}

/// Remote service credentials from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEnv {
    pub markets_api_info: String,
    pub graphql_endpoint: String,
}

impl ServiceEnv {
    /// Both variables must be present and non-empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` but with an injectable lookup (for tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };
        Ok(Self {
            markets_api_info: get(ENV_MARKETS_API_INFO)?,
            graphql_endpoint: get(ENV_GRAPHQL_ENDPOINT)?,
        })
    }
}
