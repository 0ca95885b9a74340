//! Configuration file model for podcycle.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PROTECTED_NAMESPACE: &str = "kube-system";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PodcycleConfig {
    /// Kubeconfig files tried in order. Empty means the client's own defaults.
    pub kubeconfig_paths: Vec<String>,
    pub protected_namespaces: Vec<String>,
    #[validate(nested)]
    pub timing: TimingConfig,
    #[validate(nested)]
    pub logging: LoggingConfig,
}

impl Default for PodcycleConfig {
    fn default() -> Self {
        Self {
            kubeconfig_paths: Vec::new(),
            protected_namespaces: vec![DEFAULT_PROTECTED_NAMESPACE.to_string()],
            timing: TimingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PodcycleConfig {
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("invalid config at {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw).context("failed to parse config yaml")?;
        config.validate().context("config validation failed")?;
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TimingConfig {
    pub confirm_delay_secs: u64,
    pub grace_period_secs: u64,
    pub cooldown_secs: u64,
    #[validate(range(min = 1))]
    pub poll_interval_secs: u64,
    pub ready_timeout_secs: u64,
    #[validate(range(min = 1))]
    pub successor_attempts: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            confirm_delay_secs: 10,
            grace_period_secs: 10,
            cooldown_secs: 15,
            poll_interval_secs: 5,
            ready_timeout_secs: 300,
            successor_attempts: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    #[validate(length(min = 1))]
    pub level: String,
    /// `pretty` or `json`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Delays and budgets that drive one restart cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTiming {
    /// Operator window before the first eviction.
    pub confirm_delay: Duration,
    /// Wait after an eviction before looking for a replacement.
    pub grace_period: Duration,
    /// Pause between two candidates.
    pub cooldown: Duration,
    pub poll_interval: Duration,
    /// Budget for a poll against a known pod name.
    pub ready_timeout: Duration,
    pub successor_attempts: u32,
}

impl CycleTiming {
    /// Budget for successor discovery: `successor_attempts` polls.
    pub fn successor_budget(&self) -> Duration {
        self.poll_interval.saturating_mul(self.successor_attempts)
    }

    pub fn attempts_for(&self, budget: Duration) -> u32 {
        poll_attempts(budget, self.poll_interval)
    }
}

impl Default for CycleTiming {
    fn default() -> Self {
        Self::from(&TimingConfig::default())
    }
}

impl From<&TimingConfig> for CycleTiming {
    fn from(config: &TimingConfig) -> Self {
        Self {
            confirm_delay: Duration::from_secs(config.confirm_delay_secs),
            grace_period: Duration::from_secs(config.grace_period_secs),
            cooldown: Duration::from_secs(config.cooldown_secs),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            ready_timeout: Duration::from_secs(config.ready_timeout_secs),
            successor_attempts: config.successor_attempts,
        }
    }
}

/// Number of polls that fit in `budget`, rounded up, never less than one.
pub fn poll_attempts(budget: Duration, interval: Duration) -> u32 {
    let interval = interval.as_millis();
    if interval == 0 {
        return 1;
    }
    let attempts = budget.as_millis().div_ceil(interval).max(1);
    u32::try_from(attempts).unwrap_or(u32::MAX)
}
