//! Kubernetes adapter: client bootstrap, the cluster port and read-only reports.

pub mod client;
pub mod cluster;
pub mod mapping;
pub mod reports;

pub use client::connect;
pub use cluster::KubeClusterPort;
pub use reports::{DeploymentRow, KubeReports, PodRow, UsageReport, UsageRow, UsageTotals};
