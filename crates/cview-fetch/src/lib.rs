//! cview fetch - read-only access to the cluster summary backend
//!
//! Defines the [`ClusterApi`] contract the aggregation pipeline consumes:
//! four independent parameterless reads, each of which may fail on its own.
//! [`HttpClusterApi`] implements it over HTTP with `reqwest`.

use std::future::Future;
use std::pin::Pin;

use cview_types::{AgentInfo, ControllerInfo, FeatureGate, NodeIPLatencyStatsInfo};

pub mod config;
pub mod error;
pub mod http;

pub use config::ApiConfig;
pub use error::FetchError;
pub use http::HttpClusterApi;

/// Future returned by every [`ClusterApi`] read.
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'a>>;

/// The four remote reads behind the summary view.
///
/// Endpoint and credentials are carried by the implementation; callers pass
/// nothing. Implementations must not let one read depend on another.
pub trait ClusterApi: Send + Sync {
    fn fetch_controller_info(&self) -> FetchFuture<'_, ControllerInfo>;

    fn fetch_agent_infos(&self) -> FetchFuture<'_, Vec<AgentInfo>>;

    fn fetch_feature_gates(&self) -> FetchFuture<'_, Vec<FeatureGate>>;

    fn fetch_node_ip_latency_stats(&self) -> FetchFuture<'_, Vec<NodeIPLatencyStatsInfo>>;
}
