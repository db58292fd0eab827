//! Dense latency matrix for the heat-map.
//!
//! The input is one row per reporting node, each listing the targets it has
//! measured. The output is an n×n grid over the reporting nodes:
//! 1. The reporting node names, in input order, form a single [`NodeIndex`].
//! 2. That index labels both rows and columns, so row i and column i are the
//!    same node.
//! 3. Each row is scanned once into a target -> RTT lookup; a repeated target
//!    overwrites the earlier value.
//! 4. Cell (r, c) is the RTT row r reported for node c, or 0 when it has none.
//!
//! Zero therefore means "no measurement" as well as "zero RTT". Entries that
//! name a target which never reported itself have no column and are dropped;
//! coverage between reporters and targets is not reconciled.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use cview_types::NodeIPLatencyStatsInfo;

/// Ordered node names shared by both matrix axes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(Vec<String>);

impl NodeIndex {
    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Row labels. Same sequence as [`NodeIndex::columns`].
    pub fn rows(&self) -> &[String] {
        &self.0
    }

    /// Column labels. Same sequence as [`NodeIndex::rows`].
    pub fn columns(&self) -> &[String] {
        &self.0
    }

    /// Position of the first node with this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }
}

impl From<Vec<String>> for NodeIndex {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

/// Square, row-major RTT grid in raw units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyMatrix {
    pub nodes: NodeIndex,
    pub values: Vec<Vec<u64>>,
}

impl LatencyMatrix {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<u64> {
        self.values.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Look a cell up by source and target node name.
    pub fn get_by_name(&self, source: &str, target: &str) -> Option<u64> {
        let row = self.nodes.position(source)?;
        let col = self.nodes.position(target)?;
        self.get(row, col)
    }

    /// Largest cell, 0 for an empty matrix. Used to scale heat-map colors.
    pub fn max_value(&self) -> u64 {
        self.values
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }

    /// Rows paired with their label.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[u64])> {
        self.nodes
            .rows()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }
}

/// Build the dense matrix from per-node latency rows.
pub fn build_latency_matrix(stats: &[NodeIPLatencyStatsInfo]) -> LatencyMatrix {
    let nodes = NodeIndex(stats.iter().map(|s| s.node_name.clone()).collect());

    let values = stats
        .iter()
        .map(|row| {
            let mut by_target: HashMap<&str, u64> =
                HashMap::with_capacity(row.node_ip_latency_list.len());
            for entry in &row.node_ip_latency_list {
                by_target.insert(entry.node_name.as_str(), entry.last_measured_rtt);
            }
            nodes
                .columns()
                .iter()
                .map(|col| by_target.get(col.as_str()).copied().unwrap_or(0))
                .collect()
        })
        .collect();

    tracing::debug!(nodes = nodes.len(), "Built latency matrix");

    LatencyMatrix { nodes, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cview_types::NodeIPLatencyEntry;

    #[test]
    fn single_node_without_entries() {
        let m = build_latency_matrix(&[NodeIPLatencyStatsInfo::new("solo", vec![])]);
        assert_eq!(m.nodes.names(), ["solo".to_string()]);
        assert_eq!(m.values, vec![vec![0]]);
        assert_eq!(m.max_value(), 0);
    }

    #[test]
    fn self_entry_lands_on_diagonal() {
        let m = build_latency_matrix(&[NodeIPLatencyStatsInfo::new(
            "a",
            vec![NodeIPLatencyEntry::new("a", 12)],
        )]);
        assert_eq!(m.get(0, 0), Some(12));
    }

    #[test]
    fn lookup_by_name_and_out_of_range() {
        let m = build_latency_matrix(&[
            NodeIPLatencyStatsInfo::new("a", vec![NodeIPLatencyEntry::new("b", 7)]),
            NodeIPLatencyStatsInfo::new("b", vec![]),
        ]);
        assert_eq!(m.get_by_name("a", "b"), Some(7));
        assert_eq!(m.get_by_name("b", "a"), Some(0));
        assert_eq!(m.get_by_name("a", "zz"), None);
        assert_eq!(m.get(2, 0), None);
    }

    #[test]
    fn rows_iterate_with_labels() {
        let m = build_latency_matrix(&[
            NodeIPLatencyStatsInfo::new("a", vec![NodeIPLatencyEntry::new("b", 3)]),
            NodeIPLatencyStatsInfo::new("b", vec![NodeIPLatencyEntry::new("a", 4)]),
        ]);
        let rows: Vec<(&str, Vec<u64>)> = m.rows().map(|(n, r)| (n, r.to_vec())).collect();
        assert_eq!(rows, vec![("a", vec![0, 3]), ("b", vec![4, 0])]);
        assert_eq!(m.max_value(), 4);
    }
}
