//! CLI runtime configuration.
//!
//! Configuration is resolved once at process startup from environment values (after `.env` has
//! been loaded) and command-line overrides, then passed into the command handlers. Handlers never
//! read the environment themselves.

use anyhow::{bail, Context};

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV: &str = "UTILITY_LOG";

/// Environment variable holding the default number of identifiers for `generate`.
pub const DEFAULT_COUNT_ENV: &str = "UTILITY_DEFAULT_COUNT";

pub const DEFAULT_LOG_FILTER: &str = "utility=info";

/// Upper bound on how many identifiers a single `generate` call may print.
pub const MAX_COUNT: usize = 10_000;

/// CLI configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    log_filter: String,
    default_count: usize,
}

impl CliConfig {
    /// Create a new `CliConfig`.
    pub fn new(log_filter: String, default_count: usize) -> anyhow::Result<Self> {
        if log_filter.trim().is_empty() {
            bail!("log filter cannot be empty");
        }
        validate_count(default_count)?;

        Ok(Self {
            log_filter,
            default_count,
        })
    }

    /// Build a config from raw environment values.
    ///
    /// Missing or blank values fall back to the defaults.
    pub fn from_env_values(
        log_filter: Option<String>,
        default_count: Option<String>,
    ) -> anyhow::Result<Self> {
        let log_filter = non_blank(log_filter).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        let default_count = non_blank(default_count)
            .map(|v| {
                v.parse::<usize>().with_context(|| {
                    format!("{DEFAULT_COUNT_ENV} must be a positive integer, got '{v}'")
                })
            })
            .transpose()?
            .unwrap_or(1);

        Self::new(log_filter, default_count)
    }

    /// Apply a `--log` override from the command line.
    pub fn with_log_filter(mut self, log_filter: Option<String>) -> Self {
        if let Some(filter) = non_blank(log_filter) {
            self.log_filter = filter;
        }
        self
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    pub fn default_count(&self) -> usize {
        self.default_count
    }
}

/// Checks that `count` is within `1..=MAX_COUNT`.
pub fn validate_count(count: usize) -> anyhow::Result<usize> {
    if count == 0 || count > MAX_COUNT {
        bail!("count must be between 1 and {MAX_COUNT}, got {count}");
    }
    Ok(count)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
