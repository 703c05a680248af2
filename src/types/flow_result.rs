use serde::{Deserialize, Serialize};

use crate::types::{Capacity, Edge, Graph};

/// One iteration of the flow computation: the path flow was pushed along and
/// how much.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentingPath {
    pub path: Vec<String>,
    pub bottleneck: Capacity,
}

/// A minimum cut certifying the computed flow value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinCut {
    /// Nodes still reachable from the source in the final residual network.
    pub source_side: Vec<String>,
    /// Ids of the arcs leaving the source side.
    pub edges: Vec<String>,
    pub capacity: Capacity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowResult {
    pub max_flow: Capacity,
    /// Augmenting paths in the order they were found.
    pub paths: Vec<AugmentingPath>,
    pub final_graph: Graph,
    pub min_cut: MinCut,
}

impl FlowResult {
    pub fn saturated_edges(&self) -> impl Iterator<Item = &Edge> {
        self.final_graph.edges.iter().filter(|e| e.is_saturated())
    }
}
