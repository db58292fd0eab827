//! cview state - pure transforms over fetched cluster data
//!
//! - [`latency_matrix`]: sparse per-node RTT rows to a dense square grid
//! - [`feature_gates`]: flat gate list split by owning component

pub mod feature_gates;
pub mod latency_matrix;

pub use feature_gates::{partition_feature_gates, PartitionedFeatureGates};
pub use latency_matrix::{build_latency_matrix, LatencyMatrix, NodeIndex};
