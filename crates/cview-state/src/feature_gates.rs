//! Feature gate partitioning.
//!
//! The backend serves one flat list tagged by owning component. Gates tagged
//! `controller` or `agent` go to their subset in input order; any other tag
//! belongs to neither and is dropped.

use serde::{Deserialize, Serialize};

use cview_types::{FeatureGate, COMPONENT_AGENT, COMPONENT_CONTROLLER};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionedFeatureGates {
    pub controller: Vec<FeatureGate>,
    pub agent: Vec<FeatureGate>,
}

impl PartitionedFeatureGates {
    pub fn len(&self) -> usize {
        self.controller.len() + self.agent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controller.is_empty() && self.agent.is_empty()
    }
}

pub fn partition_feature_gates(gates: &[FeatureGate]) -> PartitionedFeatureGates {
    let mut out = PartitionedFeatureGates::default();
    for gate in gates {
        match gate.component.as_str() {
            COMPONENT_CONTROLLER => out.controller.push(gate.clone()),
            COMPONENT_AGENT => out.agent.push(gate.clone()),
            _ => {}
        }
    }
    out
}
