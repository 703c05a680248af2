use indexmap::IndexSet;
use std::collections::{HashMap, VecDeque};

use crate::error::{Error, Result};
use crate::types::{Capacity, Graph};

/// How the residual network treats a pair of anti-parallel arcs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResidualMode {
    /// One residual entry per ordered node pair. The reverse entry of an arc
    /// u -> v is created with zero capacity only if there is no real arc
    /// v -> u; otherwise the capacity of v -> u doubles as the channel that
    /// cancels flow on u -> v. Flow is projected by node pair alone.
    #[default]
    Shared,
    /// Every arc gets its own forward residual and its own undo channel, and
    /// flow is projected by arc identity. Per-arc flows always stay within
    /// the arc's capacity, also for anti-parallel arcs.
    PerArc,
}

/// What a residual edge stands for. The index is the position of the arc in
/// the graph's edge list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    /// The forward direction of a real arc.
    Forward(usize),
    /// The cancellation channel of a real arc ([`ResidualMode::PerArc`] only).
    Undo(usize),
    /// A zero-capacity reverse edge added for cancellation
    /// ([`ResidualMode::Shared`] only).
    Reverse,
}

#[derive(Clone, Debug)]
struct ResidualEdge {
    to: usize,
    residual: Capacity,
    /// Position of the opposite edge in the adjacency list of `to`.
    reverse: usize,
    channel: Channel,
}

/// One step of a path through the residual network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hop {
    pub from: usize,
    pub to: usize,
    /// Position of the edge in the adjacency list of `from`.
    pub edge: usize,
    pub channel: Channel,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResidualPath {
    hops: Vec<Hop>,
}

impl ResidualPath {
    pub fn new(hops: Vec<Hop>) -> ResidualPath {
        ResidualPath { hops }
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }
}

/// Remaining capacities of a network while flow is pushed through it.
///
/// Nodes are addressed by their position in the graph's node list; every node
/// keeps its outgoing residual edges in insertion order, which is the order
/// the path search visits them in.
#[derive(Clone, Debug)]
pub struct ResidualNetwork {
    nodes: IndexSet<String>,
    adjacencies: Vec<Vec<ResidualEdge>>,
}

impl ResidualNetwork {
    pub fn build(graph: &Graph, mode: ResidualMode) -> Result<ResidualNetwork> {
        let nodes = graph
            .nodes
            .iter()
            .map(|n| n.id.clone())
            .collect::<IndexSet<String>>();
        let mut network = ResidualNetwork {
            adjacencies: vec![Vec::new(); nodes.len()],
            nodes,
        };
        let mut pair_positions: HashMap<(usize, usize), usize> = HashMap::new();
        for (i, edge) in graph.edges.iter().enumerate() {
            let from = network.require_index(&edge.from)?;
            let to = network.require_index(&edge.to)?;
            match mode {
                ResidualMode::Shared => {
                    let forward = network.pair_entry(from, to, &mut pair_positions);
                    let backward = network.pair_entry(to, from, &mut pair_positions);
                    let entry = &mut network.adjacencies[from][forward];
                    entry.residual = edge.capacity;
                    entry.channel = Channel::Forward(i);
                    network.adjacencies[from][forward].reverse = backward;
                    network.adjacencies[to][backward].reverse = forward;
                }
                ResidualMode::PerArc => {
                    let forward = network.adjacencies[from].len();
                    network.adjacencies[from].push(ResidualEdge {
                        to,
                        residual: edge.capacity,
                        reverse: 0,
                        channel: Channel::Forward(i),
                    });
                    let backward = network.adjacencies[to].len();
                    network.adjacencies[to].push(ResidualEdge {
                        to: from,
                        residual: 0,
                        reverse: forward,
                        channel: Channel::Undo(i),
                    });
                    network.adjacencies[from][forward].reverse = backward;
                }
            }
        }
        Ok(network)
    }

    /// Position of the entry `from -> to`, appending a zero-capacity reverse
    /// entry if there is none yet.
    fn pair_entry(
        &mut self,
        from: usize,
        to: usize,
        pair_positions: &mut HashMap<(usize, usize), usize>,
    ) -> usize {
        let adjacencies = &mut self.adjacencies;
        *pair_positions.entry((from, to)).or_insert_with(|| {
            adjacencies[from].push(ResidualEdge {
                to,
                residual: 0,
                reverse: 0,
                channel: Channel::Reverse,
            });
            adjacencies[from].len() - 1
        })
    }

    fn require_index(&self, id: &str) -> Result<usize> {
        self.node_index(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn node_id(&self, index: usize) -> &str {
        &self.nodes[index]
    }

    /// Outgoing residual edges of `from` with positive remaining capacity, in
    /// insertion order.
    pub fn usable_edges(&self, from: usize) -> impl Iterator<Item = Hop> + '_ {
        self.adjacencies[from]
            .iter()
            .enumerate()
            .filter(|(_, e)| e.residual > 0)
            .map(move |(position, e)| Hop {
                from,
                to: e.to,
                edge: position,
                channel: e.channel,
            })
    }

    /// Total residual capacity from `from` to `to`, or `None` if the network
    /// has no edge between them in that direction.
    #[cfg(test)]
    pub fn residual(&self, from: &str, to: &str) -> Option<Capacity> {
        let from = self.node_index(from)?;
        let to = self.node_index(to)?;
        let mut edges = self.adjacencies[from].iter().filter(|e| e.to == to).peekable();
        edges.peek()?;
        Some(edges.fold(0, |sum: Capacity, e| sum.saturating_add(e.residual)))
    }

    /// Turns a sequence of node ids into a path, taking the first edge with
    /// positive residual capacity for each step.
    #[cfg(test)]
    pub fn resolve_path(&self, nodes: &[&str]) -> Result<ResidualPath> {
        let mut hops = Vec::new();
        for window in nodes.windows(2) {
            if let [from_id, to_id] = window {
                let inconsistent = || Error::InconsistentResidual {
                    from: from_id.to_string(),
                    to: to_id.to_string(),
                };
                let from = self.node_index(from_id).ok_or_else(inconsistent)?;
                let to = self.node_index(to_id).ok_or_else(inconsistent)?;
                let hop = self
                    .usable_edges(from)
                    .find(|hop| hop.to == to)
                    .ok_or_else(inconsistent)?;
                hops.push(hop);
            }
        }
        Ok(ResidualPath::new(hops))
    }

    pub fn path_node_ids(&self, path: &ResidualPath) -> Vec<String> {
        let mut ids = Vec::with_capacity(path.hops.len() + 1);
        if let Some(first) = path.hops.first() {
            ids.push(self.node_id(first.from).to_string());
        }
        ids.extend(path.hops.iter().map(|hop| self.node_id(hop.to).to_string()));
        ids
    }

    fn edge(&self, hop: &Hop) -> Result<&ResidualEdge> {
        self.adjacencies
            .get(hop.from)
            .and_then(|edges| edges.get(hop.edge))
            .filter(|e| e.to == hop.to)
            .ok_or_else(|| self.inconsistency(hop))
    }

    fn name(&self, index: usize) -> String {
        self.nodes
            .get_index(index)
            .cloned()
            .unwrap_or_else(|| format!("#{index}"))
    }

    fn inconsistency(&self, hop: &Hop) -> Error {
        Error::InconsistentResidual {
            from: self.name(hop.from),
            to: self.name(hop.to),
        }
    }

    /// The smallest residual capacity along `path`.
    pub fn bottleneck(&self, path: &ResidualPath) -> Result<Capacity> {
        let mut bottleneck = Capacity::MAX;
        for hop in &path.hops {
            let residual = self.edge(hop)?.residual;
            if residual == 0 {
                return Err(self.inconsistency(hop));
            }
            bottleneck = bottleneck.min(residual);
        }
        if path.hops.is_empty() {
            return Err(Error::InvalidInput(
                "An augmenting path needs at least one edge".to_string(),
            ));
        }
        Ok(bottleneck)
    }

    /// Pushes `amount` along `path`: every edge on it loses `amount` of
    /// residual capacity and its reverse edge gains the same.
    pub fn augment(&mut self, path: &ResidualPath, amount: Capacity) -> Result<()> {
        for hop in &path.hops {
            let edge = self.edge(hop)?;
            if edge.residual < amount {
                return Err(self.inconsistency(hop));
            }
            let reverse = edge.reverse;
            let undo = &self.adjacencies[hop.to][reverse];
            let raised = undo.residual.checked_add(amount).ok_or_else(|| {
                let [from, to] = [hop.from, hop.to].map(|i| self.name(i));
                Error::CapacityOverflow { from, to }
            })?;
            self.adjacencies[hop.from][hop.edge].residual -= amount;
            self.adjacencies[hop.to][reverse].residual = raised;
        }
        Ok(())
    }

    /// Marks every node reachable from `source` over edges with positive
    /// residual capacity.
    pub fn reachable_from(&self, source: usize) -> Vec<bool> {
        let mut reached = vec![false; self.nodes.len()];
        let mut queue = VecDeque::new();
        reached[source] = true;
        queue.push_back(source);
        while let Some(node) = queue.pop_front() {
            for hop in self.usable_edges(node) {
                if !reached[hop.to] {
                    reached[hop.to] = true;
                    queue.push_back(hop.to);
                }
            }
        }
        reached
    }
}
