use crate::graph::residual::{Hop, ResidualNetwork, ResidualPath};
use std::collections::VecDeque;

/// Breadth-first search for a shortest (fewest hops) path from `source` to
/// `sink` that has positive residual capacity on every edge.
///
/// Each node is discovered at most once and remembers the edge it was first
/// discovered over; neighbors are visited in the residual network's insertion
/// order, which makes the choice between equally short paths deterministic.
pub fn augmenting_path(
    source: usize,
    sink: usize,
    residual: &ResidualNetwork,
) -> Option<ResidualPath> {
    if source == sink {
        return None;
    }
    let mut parent: Vec<Option<Hop>> = vec![None; residual.node_count()];
    let mut visited = vec![false; residual.node_count()];
    let mut queue = VecDeque::new();
    visited[source] = true;
    queue.push_back(source);
    while let Some(node) = queue.pop_front() {
        for hop in residual.usable_edges(node) {
            if visited[hop.to] {
                continue;
            }
            visited[hop.to] = true;
            parent[hop.to] = Some(hop);
            if hop.to == sink {
                return Some(trace(&parent, source, sink));
            }
            queue.push_back(hop.to);
        }
    }
    None
}

fn trace(parent: &[Option<Hop>], source: usize, sink: usize) -> ResidualPath {
    let mut hops = Vec::new();
    let mut node = sink;
    while node != source {
        match parent[node] {
            Some(hop) => {
                hops.push(hop);
                node = hop.from;
            }
            None => break,
        }
    }
    hops.reverse();
    ResidualPath::new(hops)
}
