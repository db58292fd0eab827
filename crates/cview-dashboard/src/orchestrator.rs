//! The aggregation cycle.
//!
//! One cycle issues all four backend reads at once and waits for every one
//! of them to settle. A failed or timed-out read leaves its source absent
//! for that cycle and never holds back the others. Downstream transforms
//! run only for the sources that arrived:
//! - feature gates are partitioned by component
//! - latency rows are turned into the dense heat-map matrix
//!
//! The error banner only tracks "at least one source failed" against "all
//! sources loaded". It is set on any failure and cleared by the next cycle
//! in which all four reads succeed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use cview_fetch::{ClusterApi, FetchFuture};
use cview_state::{build_latency_matrix, partition_feature_gates, LatencyMatrix, PartitionedFeatureGates};
use cview_types::{AgentInfo, ControllerInfo, FeatureGate, NodeIPLatencyStatsInfo};

pub const ERROR_BANNER_MESSAGE: &str = "Error when loading summary data. Refresh to retry.";

const SOURCE_COUNT: usize = 4;

/// Everything the presentation layer may show. Each field is gated on its
/// own source only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub controller: Option<ControllerInfo>,
    pub agents: Option<Vec<AgentInfo>>,
    pub feature_gates: Option<Vec<FeatureGate>>,
    pub partitioned_gates: Option<PartitionedFeatureGates>,
    pub latency_stats: Option<Vec<NodeIPLatencyStatsInfo>>,
    pub latency_matrix: Option<LatencyMatrix>,
    /// Completed cycles so far. 0 until the first cycle finishes.
    pub generation: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl ClusterSummary {
    pub fn controller_gates(&self) -> Option<&[FeatureGate]> {
        self.partitioned_gates.as_ref().map(|p| p.controller.as_slice())
    }

    pub fn agent_gates(&self) -> Option<&[FeatureGate]> {
        self.partitioned_gates.as_ref().map(|p| p.agent.as_slice())
    }
}

/// Process-wide error notification owned by the [`Aggregator`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBanner {
    message: Option<String>,
}

impl ErrorBanner {
    pub fn set(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn clear(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.message.is_some()
    }
}

/// Read-only snapshot handed to the console and the JSON API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub summary: ClusterSummary,
    pub error: Option<String>,
    pub refreshing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cycle ran to completion; `failed_sources` reads came back empty.
    Completed { failed_sources: usize },
    /// Another cycle was still in flight, nothing was started.
    AlreadyRunning,
}

#[derive(Default)]
struct AggregateState {
    summary: ClusterSummary,
    banner: ErrorBanner,
}

/// Owns the aggregated state and runs refresh cycles against a [`ClusterApi`].
pub struct Aggregator {
    api: Arc<dyn ClusterApi>,
    fetch_timeout: Duration,
    state: RwLock<AggregateState>,
    in_flight: Mutex<()>,
}

impl Aggregator {
    pub fn new(api: Arc<dyn ClusterApi>, fetch_timeout: Duration) -> Self {
        Self {
            api,
            fetch_timeout,
            state: RwLock::new(AggregateState::default()),
            in_flight: Mutex::new(()),
        }
    }

    /// Run one cycle. A trigger that arrives while a cycle is still running
    /// returns [`RefreshOutcome::AlreadyRunning`] instead of overlapping it.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_cycle) = self.in_flight.try_lock() else {
            tracing::debug!("Refresh skipped, cycle already in flight");
            return RefreshOutcome::AlreadyRunning;
        };

        let api = self.api.as_ref();
        let (controller, agents, feature_gates, latency_stats) = tokio::join!(
            self.settle("controller", api.fetch_controller_info()),
            self.settle("agents", api.fetch_agent_infos()),
            self.settle("feature_gates", api.fetch_feature_gates()),
            self.settle("latency", api.fetch_node_ip_latency_stats()),
        );

        let failed_sources = [
            controller.is_none(),
            agents.is_none(),
            feature_gates.is_none(),
            latency_stats.is_none(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count();

        let partitioned_gates = feature_gates.as_deref().map(partition_feature_gates);
        let latency_matrix = latency_stats.as_deref().map(build_latency_matrix);

        let mut state = self.state.write().await;
        let generation = state.summary.generation + 1;
        state.summary = ClusterSummary {
            controller,
            agents,
            feature_gates,
            partitioned_gates,
            latency_stats,
            latency_matrix,
            generation,
            refreshed_at: Some(Utc::now()),
        };

        if failed_sources > 0 {
            state.banner.set(ERROR_BANNER_MESSAGE);
            tracing::warn!(
                generation,
                failed_sources,
                total = SOURCE_COUNT,
                "Summary refresh completed with unavailable sources"
            );
        } else {
            state.banner.clear();
            tracing::info!(generation, "Summary refresh completed");
        }

        RefreshOutcome::Completed { failed_sources }
    }

    /// Resolve one read to `Some` on success, `None` on error or timeout.
    async fn settle<T>(&self, source: &'static str, fetch: FetchFuture<'_, T>) -> Option<T> {
        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(Ok(value)) => {
                tracing::debug!(source, "Fetch succeeded");
                Some(value)
            }
            Ok(Err(e)) => {
                tracing::warn!(source, error = %e, "Fetch failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    source,
                    timeout_ms = self.fetch_timeout.as_millis() as u64,
                    "Fetch timed out"
                );
                None
            }
        }
    }

    pub async fn summary(&self) -> ClusterSummary {
        self.state.read().await.summary.clone()
    }

    pub async fn banner(&self) -> Option<String> {
        self.state.read().await.banner.message().map(str::to_string)
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub async fn view(&self) -> DashboardView {
        let refreshing = self.is_refreshing();
        let state = self.state.read().await;
        DashboardView {
            summary: state.summary.clone(),
            error: state.banner.message().map(str::to_string),
            refreshing,
        }
    }
}
