use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::graph::augmenting_path::augmenting_path;
use crate::graph::projection::FlowProjector;
use crate::graph::residual::{ResidualMode, ResidualNetwork};
use crate::types::{AugmentingPath, Capacity, FlowResult, Graph, MinCut};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowOptions {
    pub mode: ResidualMode,
    /// Give up with [`Error::AugmentationLimit`] instead of pushing flow along
    /// more than this many paths.
    pub max_augmentations: Option<u64>,
}

pub fn compute_max_flow(graph: &Graph, source: &str, sink: &str) -> Result<FlowResult> {
    compute_max_flow_with_options(graph, source, sink, &FlowOptions::default())
}

/// Computes a maximum flow from `source` to `sink` (Edmonds-Karp).
///
/// Works on a copy of `graph` whose flows start at zero. The result lists the
/// augmenting paths in the order they were found together with the graph
/// annotated with the final per-arc flow.
pub fn compute_max_flow_with_options(
    graph: &Graph,
    source: &str,
    sink: &str,
    options: &FlowOptions,
) -> Result<FlowResult> {
    for id in [source, sink] {
        if !graph.contains_node(id) {
            return Err(Error::NodeNotFound(id.to_string()));
        }
    }
    if source == sink {
        return Err(Error::DegenerateSourceSink(source.to_string()));
    }

    let mut final_graph = graph.clone();
    final_graph.reset_flow();
    let mut residual = ResidualNetwork::build(&final_graph, options.mode)?;
    let projector = FlowProjector::new(&final_graph.edges, options.mode);
    let s = node_index(&residual, source)?;
    let t = node_index(&residual, sink)?;

    let mut paths: Vec<AugmentingPath> = Vec::new();
    let mut max_flow: Capacity = 0;
    while let Some(path) = augmenting_path(s, t, &residual) {
        if let Some(limit) = options.max_augmentations {
            if paths.len() as u64 >= limit {
                warn!(limit, flow = max_flow, "Augmentation limit reached");
                return Err(Error::AugmentationLimit { limit });
            }
        }
        let bottleneck = residual.bottleneck(&path)?;
        let total = max_flow
            .checked_add(bottleneck)
            .ok_or_else(|| overflow(source, sink))?;
        residual.augment(&path, bottleneck)?;
        for hop in path.hops() {
            projector.project(
                &mut final_graph.edges,
                residual.node_id(hop.from),
                residual.node_id(hop.to),
                hop.channel,
                bottleneck,
            )?;
        }
        let nodes = residual.path_node_ids(&path);
        debug!(
            iteration = paths.len() + 1,
            bottleneck,
            path = %nodes.join(" -> "),
            "Augmenting path"
        );
        max_flow = total;
        paths.push(AugmentingPath {
            path: nodes,
            bottleneck,
        });
    }

    let min_cut = min_cut(&final_graph, &residual, s).ok_or_else(|| overflow(source, sink))?;
    info!(
        source,
        sink,
        max_flow,
        augmentations = paths.len(),
        "Max flow computed"
    );
    Ok(FlowResult {
        max_flow,
        paths,
        final_graph,
        min_cut,
    })
}

fn overflow(source: &str, sink: &str) -> Error {
    Error::CapacityOverflow {
        from: source.to_string(),
        to: sink.to_string(),
    }
}

fn node_index(residual: &ResidualNetwork, id: &str) -> Result<usize> {
    residual
        .node_index(id)
        .ok_or_else(|| Error::NodeNotFound(id.to_string()))
}

/// The cut between the nodes the source can still reach in the residual
/// network and all others. Once no augmenting path is left, its capacity
/// equals the flow value. `None` if the cut capacity does not fit a
/// [`Capacity`].
fn min_cut(graph: &Graph, residual: &ResidualNetwork, source: usize) -> Option<MinCut> {
    let reached = residual.reachable_from(source);
    let on_source_side = |id: &str| residual.node_index(id).map_or(false, |i| reached[i]);
    let source_side = graph
        .nodes
        .iter()
        .filter(|n| on_source_side(n.id.as_str()))
        .map(|n| n.id.clone())
        .collect();
    let crossing = graph
        .edges
        .iter()
        .filter(|e| on_source_side(e.from.as_str()) && !on_source_side(e.to.as_str()))
        .collect::<Vec<_>>();
    let capacity = crossing
        .iter()
        .try_fold(0 as Capacity, |sum, e| sum.checked_add(e.capacity))?;
    Some(MinCut {
        source_side,
        edges: crossing.iter().map(|e| e.id.clone()).collect(),
        capacity,
    })
}

/// Upper bound V·E on the number of augmenting paths of a run.
pub fn edmonds_karp_bound(graph: &Graph) -> u64 {
    (graph.node_count() as u64 * graph.edge_count() as u64).max(1)
}
