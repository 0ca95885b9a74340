//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use podcycle_domain::PodcycleConfig;

/// podcycle - restart Kubernetes pods one at a time.
#[derive(Parser, Debug)]
#[command(name = "podcycle")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Kubeconfig file to try; repeat to try several in order
    #[arg(
        long = "kubeconfig",
        global = true,
        env = "PODCYCLE_KUBECONFIG",
        value_delimiter = ','
    )]
    pub kubeconfigs: Vec<String>,

    /// Override log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "PODCYCLE_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Restart every pod outside the protected namespaces, one at a time (default)
    Restart(RestartArgs),

    /// List pods across all namespaces
    Pods(PodsArgs),

    /// List deployments across all namespaces
    Deployments,

    /// Show requests, limits and live usage per pod
    Usage,
}

/// Arguments for the `restart` subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RestartArgs {
    /// Namespace never restarted; repeat for several. Replaces the configured list
    #[arg(long = "protect")]
    pub protect: Vec<String>,

    /// Seconds to wait for Ctrl+C before the first eviction
    #[arg(long)]
    pub confirm_delay: Option<u64>,
}

/// Arguments for the `pods` subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PodsArgs {
    /// Only show pods created within the last N hours
    #[arg(long)]
    pub since_hours: Option<u32>,
}

impl Cli {
    /// The subcommand to run; `restart` when none was given.
    pub fn resolved_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Restart(RestartArgs::default()))
    }

    /// Apply flag values on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut PodcycleConfig) {
        if !self.kubeconfigs.is_empty() {
            config.kubeconfig_paths = self.kubeconfigs.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Commands::Restart(args) = self.resolved_command() {
            if !args.protect.is_empty() {
                config.protected_namespaces = args.protect;
            }
            if let Some(delay) = args.confirm_delay {
                config.timing.confirm_delay_secs = delay;
            }
        }
    }
}
