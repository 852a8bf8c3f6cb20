//! Exporter configuration.
//!
//! Every setting comes from a command-line flag or its environment variable.
//! [`Cli`] is the parsed surface; [`ExporterConfig`] is what the rest of the
//! crate consumes.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use stash_client::DEFAULT_GRAPHQL_URL;

use crate::error::{ExporterError, ExporterResult};

/// Default scrape interval in seconds.
pub const DEFAULT_SCRAPE_INTERVAL_SECS: u64 = 30;

/// Default HTTP listen port.
pub const DEFAULT_LISTEN_PORT: u16 = 9100;

/// Default upstream timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// When collection cycles run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportMode {
    /// Every `/metrics` request runs its own cycle.
    #[default]
    Pull,
    /// A background loop runs one cycle per interval; `/metrics` serves the latest.
    Interval,
}

impl ExportMode {
    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Interval => "interval",
        }
    }
}

impl std::fmt::Display for ExportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command-line interface.
#[derive(Parser, Clone)]
#[command(name = "stash-exporter")]
#[command(about = "Prometheus exporter for Stash library statistics")]
#[command(version)]
pub struct Cli {
    /// Stash GraphQL endpoint
    #[arg(long, env = "STASH_GRAPHQL_URL", default_value = DEFAULT_GRAPHQL_URL)]
    pub stash_url: String,

    /// Stash API key, sent as the `ApiKey` header
    #[arg(long, env = "STASH_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seconds between cycles in interval mode
    #[arg(
        long,
        env = "SCRAPE_INTERVAL_SECONDS",
        default_value_t = DEFAULT_SCRAPE_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub scrape_interval: u64,

    /// Port for the `/metrics` HTTP server
    #[arg(
        long,
        env = "EXPORTER_LISTEN_PORT",
        default_value_t = DEFAULT_LISTEN_PORT,
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub listen_port: u16,

    /// Log level (DEBUG, INFO, WARNING, ERROR, CRITICAL)
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    pub log_level: String,

    /// Upstream request timeout in seconds
    #[arg(
        long,
        env = "STASH_TIMEOUT_SECONDS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Execution mode
    #[arg(long, env = "EXPORTER_MODE", value_enum, ignore_case = true, default_value_t = ExportMode::Pull)]
    pub mode: ExportMode,
}

/// Runtime configuration for the exporter.
#[derive(Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Stash GraphQL endpoint, without a trailing `/`.
    pub stash_url: String,
    /// Optional API key.
    pub api_key: Option<String>,
    /// Time between cycle starts in interval mode.
    pub scrape_interval: Duration,
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Upper-cased log level name.
    pub log_level: String,
    /// Upstream request timeout.
    pub timeout: Duration,
    /// Execution mode.
    pub mode: ExportMode,
}

impl std::fmt::Debug for ExporterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExporterConfig")
            .field("stash_url", &self.stash_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("scrape_interval", &self.scrape_interval)
            .field("listen_addr", &self.listen_addr)
            .field("log_level", &self.log_level)
            .field("timeout", &self.timeout)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            stash_url: DEFAULT_GRAPHQL_URL.to_string(),
            api_key: None,
            scrape_interval: Duration::from_secs(DEFAULT_SCRAPE_INTERVAL_SECS),
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_LISTEN_PORT)),
            log_level: "INFO".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mode: ExportMode::Pull,
        }
    }
}

impl From<Cli> for ExporterConfig {
    fn from(cli: Cli) -> Self {
        Self {
            stash_url: cli.stash_url.trim_end_matches('/').to_string(),
            api_key: cli.api_key.filter(|key| !key.is_empty()),
            scrape_interval: Duration::from_secs(cli.scrape_interval),
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, cli.listen_port)),
            log_level: cli.log_level.to_uppercase(),
            timeout: Duration::from_secs(cli.timeout),
            mode: cli.mode,
        }
    }
}

impl ExporterConfig {
    /// Set the Stash endpoint.
    #[must_use]
    pub fn with_stash_url(mut self, url: impl Into<String>) -> Self {
        self.stash_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into()).filter(|key| !key.is_empty());
        self
    }

    /// Set the scrape interval.
    #[must_use]
    pub const fn with_scrape_interval(mut self, interval: Duration) -> Self {
        self.scrape_interval = interval;
        self
    }

    /// Set the listen address.
    #[must_use]
    pub const fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Set the upstream timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the execution mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ExportMode) -> Self {
        self.mode = mode;
        self
    }

    /// Checks values the CLI cannot rule out when the config is built by hand.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::Config`] naming the first invalid setting.
    pub fn validate(&self) -> ExporterResult<()> {
        if self.stash_url.is_empty() {
            return Err(ExporterError::Config("stash url must not be empty".into()));
        }
        if self.scrape_interval.is_zero() {
            return Err(ExporterError::Config("scrape interval must be positive".into()));
        }
        if self.timeout.is_zero() {
            return Err(ExporterError::Config("timeout must be positive".into()));
        }
        if self.listen_addr.port() == 0 {
            return Err(ExporterError::Config("listen port must be in 1..=65535".into()));
        }
        Ok(())
    }

    /// Filter directive for the configured log level.
    #[must_use]
    pub fn log_directive(&self) -> &'static str {
        log_directive(&self.log_level)
    }
}

/// Maps a log level name onto a tracing filter directive.
///
/// Case-insensitive. `WARNING` is `warn`, `CRITICAL` is `error`, and anything
/// unrecognised falls back to `info`.
#[must_use]
pub fn log_directive(level: &str) -> &'static str {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "WARNING" | "WARN" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "info",
    }
}
