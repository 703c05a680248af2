use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::types::{Capacity, Edge, Node, NodeRole};

/// A capacitated directed network: nodes plus capacity-bearing arcs between
/// them.
///
/// The editing operations enforce the invariants the flow computation relies
/// on: unique node ids, arcs between existing nodes only, no self loops, at
/// most one arc per ordered node pair, positive capacities and at most one
/// source and one sink. Graphs that were deserialized instead of built through
/// these operations can be checked with [`Graph::validate`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Graph {
        Graph { nodes, edges }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    pub fn edge_between(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.connects(from, to))
    }

    pub fn source(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.role == NodeRole::Source)
    }

    pub fn sink(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.role == NodeRole::Sink)
    }

    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.from == id)
    }

    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.to == id)
    }

    /// Flow leaving `id` minus flow entering it.
    pub fn net_outflow(&self, id: &str) -> i128 {
        let out: i128 = self.outgoing(id).map(|e| e.flow as i128).sum();
        let incoming: i128 = self.incoming(id).map(|e| e.flow as i128).sum();
        out - incoming
    }

    pub fn reset_flow(&mut self) {
        for edge in &mut self.edges {
            edge.flow = 0;
        }
    }

    pub fn add_node(&mut self, id: &str, role: NodeRole) -> Result<()> {
        if id.is_empty() {
            return Err(Error::InvalidInput("Node id must not be empty".to_string()));
        }
        if self.contains_node(id) {
            return Err(Error::InvalidInput(format!("Node \"{id}\" already exists")));
        }
        self.nodes.push(Node::new(id, NodeRole::Normal));
        self.set_role(id, role)
    }

    /// Assigns `role` to node `id`. A node that held the source (or sink) role
    /// before loses it, so the roles stay unique.
    pub fn set_role(&mut self, id: &str, role: NodeRole) -> Result<()> {
        if !self.contains_node(id) {
            return Err(Error::NodeNotFound(id.to_string()));
        }
        for node in &mut self.nodes {
            if node.id == id {
                node.role = role;
            } else if role != NodeRole::Normal && node.role == role {
                node.role = NodeRole::Normal;
            }
        }
        Ok(())
    }

    pub fn add_edge(&mut self, from: &str, to: &str, capacity: Capacity) -> Result<&Edge> {
        self.check_new_edge(from, to, capacity, &[])
            .map_err(Error::InvalidInput)?;
        let id = self.next_edge_id(&[]);
        self.edges.push(Edge::new(&id, from, to, capacity));
        Ok(&self.edges[self.edges.len() - 1])
    }

    /// Checks whether an arc `from -> to` could be added, taking the arcs in
    /// `pending` into account as if they had already been added.
    pub fn check_new_edge(
        &self,
        from: &str,
        to: &str,
        capacity: Capacity,
        pending: &[Edge],
    ) -> std::result::Result<(), String> {
        if !self.contains_node(from) {
            return Err(format!("Node \"{from}\" does not exist"));
        }
        if !self.contains_node(to) {
            return Err(format!("Node \"{to}\" does not exist"));
        }
        if from == to {
            return Err(format!("Edge {from} -> {to} would be a self loop"));
        }
        if capacity == 0 {
            return Err("Capacity must be positive".to_string());
        }
        if self
            .edges
            .iter()
            .chain(pending.iter())
            .any(|e| e.connects(from, to))
        {
            return Err(format!("Edge {from} -> {to} already exists"));
        }
        Ok(())
    }

    /// Returns an edge id of the form `e<n>` used neither by the graph nor by
    /// `pending`.
    pub fn next_edge_id(&self, pending: &[Edge]) -> String {
        let used = self
            .edges
            .iter()
            .chain(pending.iter())
            .map(|e| e.id.as_str())
            .collect::<HashSet<_>>();
        let mut n = self.edges.len() + pending.len() + 1;
        loop {
            let id = format!("e{n}");
            if !used.contains(id.as_str()) {
                return id;
            }
            n += 1;
        }
    }

    /// Checks all structural invariants and reports every violation found.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if node.id.is_empty() {
                problems.push("Node with empty id".to_string());
            } else if !node_ids.insert(node.id.as_str()) {
                problems.push(format!("Duplicate node \"{}\"", node.id));
            }
        }
        for role in [NodeRole::Source, NodeRole::Sink] {
            let holders = self.nodes.iter().filter(|n| n.role == role).count();
            if holders > 1 {
                problems.push(format!("{holders} nodes have role {role}"));
            }
        }

        let mut edge_ids = HashSet::new();
        let mut pairs = HashSet::new();
        for edge in &self.edges {
            if !edge_ids.insert(edge.id.as_str()) {
                problems.push(format!("Duplicate edge id \"{}\"", edge.id));
            }
            for endpoint in [&edge.from, &edge.to] {
                if !node_ids.contains(endpoint.as_str()) {
                    problems.push(format!(
                        "Edge \"{}\" references unknown node \"{endpoint}\"",
                        edge.id
                    ));
                }
            }
            if edge.from == edge.to {
                problems.push(format!("Edge \"{}\" is a self loop", edge.id));
            }
            if edge.capacity == 0 {
                problems.push(format!("Edge \"{}\" has zero capacity", edge.id));
            }
            if edge.flow > edge.capacity {
                problems.push(format!("Edge \"{}\" carries more flow than capacity", edge.id));
            }
            if !pairs.insert((edge.from.as_str(), edge.to.as_str())) {
                problems.push(format!(
                    "Parallel edge {} -> {} (\"{}\")",
                    edge.from, edge.to, edge.id
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidGraph(problems))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn abc() -> Graph {
        let mut graph = Graph::default();
        graph.add_node("A", NodeRole::Source).unwrap();
        graph.add_node("B", NodeRole::Normal).unwrap();
        graph.add_node("C", NodeRole::Sink).unwrap();
        graph
    }

    #[test]
    fn add_edge_assigns_ids() {
        let mut graph = abc();
        assert_eq!(graph.add_edge("A", "B", 3).unwrap().id, "e1");
        assert_eq!(graph.add_edge("B", "C", 4).unwrap().id, "e2");
        assert_eq!(graph.edge_between("B", "C").unwrap().capacity, 4);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn rejects_bad_edges() {
        let mut graph = abc();
        graph.add_edge("A", "B", 3).unwrap();
        assert!(graph.add_edge("A", "B", 5).is_err());
        assert!(graph.add_edge("A", "A", 5).is_err());
        assert!(graph.add_edge("A", "X", 5).is_err());
        assert!(graph.add_edge("B", "C", 0).is_err());
        // The reverse direction is a different ordered pair.
        assert!(graph.add_edge("B", "A", 1).is_ok());
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn roles_stay_unique() {
        let mut graph = abc();
        graph.set_role("B", NodeRole::Source).unwrap();
        assert_eq!(graph.source().unwrap().id, "B");
        assert_eq!(graph.node("A").unwrap().role, NodeRole::Normal);
        assert_eq!(graph.sink().unwrap().id, "C");
        assert!(graph.add_node("B", NodeRole::Normal).is_err());
        assert!(matches!(
            graph.set_role("X", NodeRole::Sink),
            Err(Error::NodeNotFound(_))
        ));
    }

    #[test]
    fn validate_reports_everything() {
        let graph = Graph::new(
            vec![
                Node::new("A", NodeRole::Source),
                Node::new("A", NodeRole::Source),
            ],
            vec![
                Edge::new("e1", "A", "A", 0),
                Edge::new("e1", "A", "Z", 2),
            ],
        );
        match graph.validate() {
            Err(Error::InvalidGraph(problems)) => {
                assert!(problems.contains(&"Duplicate node \"A\"".to_string()));
                assert!(problems.contains(&"2 nodes have role source".to_string()));
                assert!(problems.contains(&"Edge \"e1\" is a self loop".to_string()));
                assert!(problems.contains(&"Edge \"e1\" has zero capacity".to_string()));
                assert!(problems.contains(&"Duplicate edge id \"e1\"".to_string()));
                assert!(problems
                    .contains(&"Edge \"e1\" references unknown node \"Z\"".to_string()));
            }
            other => panic!("Expected InvalidGraph, got {other:?}"),
        }
    }

    #[test]
    fn next_edge_id_skips_used_ids() {
        let graph = Graph::new(
            vec![Node::new("A", NodeRole::Normal), Node::new("B", NodeRole::Normal)],
            vec![Edge::new("e2", "A", "B", 1)],
        );
        assert_eq!(graph.next_edge_id(&[]), "e3");
        assert_eq!(graph.next_edge_id(&[Edge::new("e3", "B", "A", 1)]), "e4");
    }
}
