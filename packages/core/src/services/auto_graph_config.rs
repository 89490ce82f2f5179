//! Auto-Graph Configuration
//!
//! Every tunable of the graph synthesis job, with defaults and environment
//! overrides. Invalid environment values are logged and ignored.

use crate::services::reasoning_client::ReasoningOptions;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// User whose notes the job processes when none is configured
pub const DEFAULT_USER_ID: &str = "dev_user_1";

pub const ENABLE_AUTO_GRAPH_ENV: &str = "ENABLE_AUTO_GRAPH";
pub const USER_ID_ENV: &str = "AUTO_GRAPH_USER_ID";
pub const INTERVAL_ENV: &str = "AUTO_GRAPH_INTERVAL_SECS";
pub const INITIAL_DELAY_ENV: &str = "AUTO_GRAPH_INITIAL_DELAY_SECS";
pub const BATCH_SIZE_ENV: &str = "AUTO_GRAPH_BATCH_SIZE";
pub const MIN_NOTES_ENV: &str = "AUTO_GRAPH_MIN_NOTES";
pub const TIMEOUT_ENV: &str = "AUTO_GRAPH_TIMEOUT_SECS";
pub const RETENTION_ENV: &str = "AUTO_GRAPH_RETENTION";

/// What a full regeneration does with the existing graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetentionPolicy {
    /// Keep every existing node and link; regenerations accumulate
    #[default]
    RetainHistory,
    /// Delete all nodes and links, in the same transaction as the new batch
    ReplaceOnRegenerate,
}

impl RetentionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RetainHistory => "retain-history",
            Self::ReplaceOnRegenerate => "replace-on-regenerate",
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetentionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain-history" | "retain" => Ok(Self::RetainHistory),
            "replace-on-regenerate" | "replace" => Ok(Self::ReplaceOnRegenerate),
            other => Err(format!("unknown retention policy '{}'", other)),
        }
    }
}

/// Configuration for the graph synthesis job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoGraphConfig {
    /// When false the background timer never starts (manual trigger still works)
    pub enabled: bool,
    pub user_id: String,
    pub check_interval: Duration,
    /// Delay before the first tick after start
    pub initial_delay: Duration,
    /// Maximum unlinked notes considered per tick
    pub batch_size: usize,
    /// Unlinked notes needed for a full regeneration
    pub min_notes_to_generate: usize,
    pub regeneration_timeout: Duration,
    pub retention: RetentionPolicy,
    /// Working directory of the reasoning tool
    pub working_dir: Option<PathBuf>,
}

impl Default for AutoGraphConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_id: DEFAULT_USER_ID.to_string(),
            check_interval: Duration::from_secs(5 * 60),
            initial_delay: Duration::from_secs(5),
            batch_size: 10,
            min_notes_to_generate: 3,
            regeneration_timeout: Duration::from_secs(5 * 60),
            retention: RetentionPolicy::default(),
            working_dir: None,
        }
    }
}

impl AutoGraphConfig {
    /// Load configuration from environment variables
    ///
    /// - `ENABLE_AUTO_GRAPH` - anything but `false` enables the timer
    /// - `AUTO_GRAPH_USER_ID` - user scope (default `dev_user_1`)
    /// - `AUTO_GRAPH_INTERVAL_SECS` - tick period (default 300)
    /// - `AUTO_GRAPH_INITIAL_DELAY_SECS` - first tick delay (default 5)
    /// - `AUTO_GRAPH_BATCH_SIZE` - unlinked notes per tick (default 10)
    /// - `AUTO_GRAPH_MIN_NOTES` - full regeneration threshold (default 3)
    /// - `AUTO_GRAPH_TIMEOUT_SECS` - reasoning timeout; falls back to
    ///   `REASONING_TIMEOUT_SECS`, then 300
    /// - `AUTO_GRAPH_RETENTION` - `retain-history` or `replace-on-regenerate`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = std::env::var(ENABLE_AUTO_GRAPH_ENV)
            .map(|v| v.trim() != "false")
            .unwrap_or(defaults.enabled);

        let user_id = std::env::var(USER_ID_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.user_id);

        let retention = match std::env::var(RETENTION_ENV) {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("Ignoring {}: {}", RETENTION_ENV, e);
                defaults.retention
            }),
            Err(_) => defaults.retention,
        };

        Self {
            enabled,
            user_id,
            check_interval: env_secs(INTERVAL_ENV).unwrap_or(defaults.check_interval),
            initial_delay: env_parse::<u64>(INITIAL_DELAY_ENV)
                .map(Duration::from_secs)
                .unwrap_or(defaults.initial_delay),
            batch_size: env_parse::<usize>(BATCH_SIZE_ENV)
                .filter(|n| *n > 0)
                .unwrap_or(defaults.batch_size),
            min_notes_to_generate: env_parse::<usize>(MIN_NOTES_ENV)
                .filter(|n| *n > 0)
                .unwrap_or(defaults.min_notes_to_generate),
            regeneration_timeout: env_secs(TIMEOUT_ENV)
                .unwrap_or_else(|| ReasoningOptions::from_env().timeout),
            retention,
            working_dir: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_min_notes(mut self, min_notes: usize) -> Self {
        self.min_notes_to_generate = min_notes;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_intervals(mut self, initial_delay: Duration, check_interval: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.check_interval = check_interval;
        self
    }

    pub fn with_regeneration_timeout(mut self, timeout: Duration) -> Self {
        self.regeneration_timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Options passed to the reasoning client for a full regeneration
    pub fn reasoning_options(&self) -> ReasoningOptions {
        ReasoningOptions {
            working_dir: self.working_dir.clone(),
            timeout: self.regeneration_timeout,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}='{}'", name, value);
            None
        }
    }
}

fn env_secs(name: &str) -> Option<Duration> {
    env_parse::<u64>(name)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = AutoGraphConfig::default();
        assert!(config.enabled);
        assert_eq!(config.user_id, "dev_user_1");
        assert_eq!(config.check_interval, Duration::from_secs(300));
        assert_eq!(config.initial_delay, Duration::from_secs(5));
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.min_notes_to_generate, 3);
        assert_eq!(config.regeneration_timeout, Duration::from_secs(300));
        assert_eq!(config.retention, RetentionPolicy::RetainHistory);
    }

    #[test]
    fn test_retention_policy_parsing() {
        assert_eq!(
            "replace-on-regenerate".parse::<RetentionPolicy>(),
            Ok(RetentionPolicy::ReplaceOnRegenerate)
        );
        assert_eq!(
            " Retain-History ".parse::<RetentionPolicy>(),
            Ok(RetentionPolicy::RetainHistory)
        );
        assert!("forget".parse::<RetentionPolicy>().is_err());
        assert_eq!(RetentionPolicy::ReplaceOnRegenerate.to_string(), "replace-on-regenerate");
    }

    #[test]
    fn test_reasoning_options_follow_config() {
        let config = AutoGraphConfig::default()
            .with_regeneration_timeout(Duration::from_secs(42))
            .with_working_dir("/tmp/vicoo");
        let options = config.reasoning_options();
        assert_eq!(options.timeout, Duration::from_secs(42));
        assert_eq!(options.working_dir, Some(PathBuf::from("/tmp/vicoo")));
    }
}
