//! Controller, agent, feature gate and latency entities.
//!
//! Field names follow the camelCase JSON of the backend. Everything except
//! identity is optional on the wire and falls back to its default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::refs::K8sRef;

/// Component tag carried by controller-scoped feature gates.
pub const COMPONENT_CONTROLLER: &str = "controller";
/// Component tag carried by agent-scoped feature gates.
pub const COMPONENT_AGENT: &str = "agent";

/// Kubernetes-style object metadata. Only the name is consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
}

/// A named health flag reported by the controller or an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    /// Usually `True`, `False` or `Unknown`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_heartbeat_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("true")
    }
}

/// Singleton snapshot of the cluster controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerInfo {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub pod_ref: Option<K8sRef>,
    #[serde(default)]
    pub node_ref: Option<K8sRef>,
    #[serde(default)]
    pub connected_agent_num: u32,
    #[serde(default)]
    pub controller_conditions: Vec<Condition>,
}

impl ControllerInfo {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// Version of the OVS subsystem embedded in an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvsInfo {
    #[serde(default)]
    pub version: String,
}

/// Snapshot of one agent, one per cluster node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub pod_ref: Option<K8sRef>,
    #[serde(default)]
    pub node_ref: Option<K8sRef>,
    #[serde(default)]
    pub local_pod_num: u32,
    #[serde(default)]
    pub node_subnets: Vec<String>,
    #[serde(default)]
    pub ovs_info: OvsInfo,
    #[serde(default)]
    pub agent_conditions: Vec<Condition>,
}

impl AgentInfo {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

/// A named, versioned toggle of one component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureGate {
    /// `controller` or `agent`.
    #[serde(default)]
    pub component: String,
    pub name: String,
    /// `Enabled` or `Disabled`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: String,
}

impl FeatureGate {
    pub fn is_enabled(&self) -> bool {
        self.status.eq_ignore_ascii_case("enabled")
    }
}

/// Last measured round trip from one source node to one target node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIPLatencyEntry {
    #[serde(rename = "nodeName")]
    pub node_name: String,
    /// Raw RTT in microseconds.
    #[serde(rename = "lastMeasuredRTT", default)]
    pub last_measured_rtt: u64,
}

/// Latency row reported by one source node. Targets that are unreachable
/// or not yet measured are simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIPLatencyStatsInfo {
    #[serde(rename = "nodeName")]
    pub node_name: String,
    #[serde(rename = "nodeIPLatencyList", default)]
    pub node_ip_latency_list: Vec<NodeIPLatencyEntry>,
}

impl NodeIPLatencyStatsInfo {
    pub fn new(node_name: impl Into<String>, entries: Vec<NodeIPLatencyEntry>) -> Self {
        Self {
            node_name: node_name.into(),
            node_ip_latency_list: entries,
        }
    }
}

impl NodeIPLatencyEntry {
    pub fn new(node_name: impl Into<String>, last_measured_rtt: u64) -> Self {
        Self {
            node_name: node_name.into(),
            last_measured_rtt,
        }
    }
}
