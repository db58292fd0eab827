//! cview dashboard - aggregation and presentation of the cluster summary
//!
//! The [`orchestrator`] runs the four backend reads side by side and folds
//! the results into a [`orchestrator::ClusterSummary`]. The [`console`] and
//! [`web_server`] surfaces only read that summary.

pub mod config;
pub mod console;
pub mod heatmap;
pub mod orchestrator;
pub mod web_server;

pub use config::{ConfigError, DashboardConfig};
pub use orchestrator::{Aggregator, ClusterSummary, DashboardView, ErrorBanner, RefreshOutcome};
