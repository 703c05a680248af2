use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};

use crate::error::{Error, Result};
use crate::types::{Capacity, Edge, FlowResult, Graph};

/// A network as it is exported and imported: the graph plus the chosen
/// source and sink.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkDocument {
    pub graph: Graph,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl NetworkDocument {
    pub fn new(graph: Graph, source: Option<String>, sink: Option<String>) -> NetworkDocument {
        NetworkDocument {
            graph,
            source,
            sink,
            timestamp: None,
        }
    }

    /// The explicitly chosen source, falling back to the node with the source
    /// role.
    pub fn effective_source(&self) -> Option<&str> {
        self.source
            .as_deref()
            .or_else(|| self.graph.source().map(|n| n.id.as_str()))
    }

    pub fn effective_sink(&self) -> Option<&str> {
        self.sink
            .as_deref()
            .or_else(|| self.graph.sink().map(|n| n.id.as_str()))
    }
}

pub fn read_network(path: &str) -> Result<NetworkDocument> {
    let mut data = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut data)?;
    parse_network(&data)
}

/// Parses and validates a network document. Empty source or sink entries are
/// treated as not set.
pub fn parse_network(data: &str) -> Result<NetworkDocument> {
    let mut document: NetworkDocument = serde_json::from_str(data)?;
    document.source = document.source.filter(|s| !s.is_empty());
    document.sink = document.sink.filter(|s| !s.is_empty());
    document.graph.validate()?;
    for id in [&document.source, &document.sink].into_iter().flatten() {
        if !document.graph.contains_node(id) {
            return Err(Error::NodeNotFound(id.clone()));
        }
    }
    Ok(document)
}

/// Writes `document` as pretty-printed JSON, stamped with the current time.
pub fn write_network(document: &NetworkDocument, path: &str) -> Result<()> {
    let stamped = NetworkDocument {
        timestamp: Some(chrono::Utc::now().to_rfc3339()),
        ..document.clone()
    };
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut file, &stamped)?;
    writeln!(file)?;
    file.flush()?;
    Ok(())
}

pub fn read_edges_csv(graph: &Graph, path: &str) -> Result<Vec<Edge>> {
    let mut data = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut data)?;
    parse_edges_csv(graph, &data)
}

/// Parses batch edge input, one `from,to,capacity` line per edge.
///
/// Every line is checked against `graph` and the lines before it. Either all
/// lines are valid and the new edges are returned, or nothing is returned and
/// the error lists every bad line.
pub fn parse_edges_csv(graph: &Graph, data: &str) -> Result<Vec<Edge>> {
    let mut edges: Vec<Edge> = Vec::new();
    let mut errors = Vec::new();
    for (i, line) in data.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_number = i + 1;
        match &line.split(',').map(|p| unescape(p.trim())).collect::<Vec<_>>()[..] {
            [from, to, capacity] => {
                let capacity = match capacity.parse::<Capacity>() {
                    Ok(c) if c > 0 => c,
                    _ => {
                        errors.push(format!("Line {line_number}: Invalid capacity \"{capacity}\""));
                        continue;
                    }
                };
                match graph.check_new_edge(from, to, capacity, &edges) {
                    Ok(()) => {
                        let id = graph.next_edge_id(&edges);
                        edges.push(Edge::new(&id, from, to, capacity));
                    }
                    Err(message) => errors.push(format!("Line {line_number}: {message}")),
                }
            }
            _ => errors.push(format!(
                "Line {line_number}: Expected from,to,capacity, but got {line}"
            )),
        }
    }
    if errors.is_empty() {
        Ok(edges)
    } else {
        Err(Error::InvalidGraph(errors))
    }
}

fn unescape(input: &str) -> &str {
    match input.chars().next() {
        Some(quote @ ('"' | '\'')) if input.len() >= 2 && input.ends_with(quote) => {
            &input[1..input.len() - 1]
        }
        _ => input,
    }
}

/// Renders the final graph of a flow computation in Graphviz dot format.
pub fn flow_to_dot(result: &FlowResult) -> String {
    let mut out = String::from("digraph flow {\n");
    for node in &result.final_graph.nodes {
        let shape = match node.role {
            crate::types::NodeRole::Normal => "ellipse",
            _ => "doublecircle",
        };
        let _ = writeln!(out, "    \"{}\" [shape={shape}];", node.id);
    }
    for edge in &result.final_graph.edges {
        let style = if edge.is_saturated() { ",style=bold" } else { "" };
        let _ = writeln!(
            out,
            "    \"{}\" -> \"{}\" [label=\"{}/{}\"{style}];",
            edge.from, edge.to, edge.flow, edge.capacity
        );
    }
    out.push_str("}\n");
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::compute_max_flow;
    use crate::types::{Node, NodeRole};

    fn graph() -> Graph {
        let mut graph = Graph::default();
        graph.add_node("A", NodeRole::Source).unwrap();
        graph.add_node("B", NodeRole::Normal).unwrap();
        graph.add_node("C", NodeRole::Sink).unwrap();
        graph
    }

    #[test]
    fn batch_edges() {
        let edges = parse_edges_csv(&graph(), "A,B,10\n\n B , C , 4 \n\"A\",C,1\n").unwrap();
        assert_eq!(
            edges,
            vec![
                Edge::new("e1", "A", "B", 10),
                Edge::new("e2", "B", "C", 4),
                Edge::new("e3", "A", "C", 1),
            ]
        );
    }

    #[test]
    fn batch_edges_report_every_line() {
        let input = "A,B,10\nA,B,3\nA,X,3\nB,B,1\nB,C,-1\nB,C\n";
        match parse_edges_csv(&graph(), input) {
            Err(Error::InvalidGraph(errors)) => assert_eq!(
                errors,
                vec![
                    "Line 2: Edge A -> B already exists",
                    "Line 3: Node \"X\" does not exist",
                    "Line 4: Edge B -> B would be a self loop",
                    "Line 5: Invalid capacity \"-1\"",
                    "Line 6: Expected from,to,capacity, but got B,C",
                ]
            ),
            other => panic!("Expected InvalidGraph, got {other:?}"),
        }
    }

    #[test]
    fn parses_exported_document() {
        let data = r#"{
            "graph": {
                "nodes": [
                    {"id": "A", "x": 120.5, "y": 80, "type": "source"},
                    {"id": "B", "x": 300, "y": 80, "type": "sink"}
                ],
                "edges": [{"id": "e1", "from": "A", "to": "B", "capacity": 7, "flow": 0}]
            },
            "source": "A",
            "sink": "",
            "timestamp": "2024-01-01T00:00:00.000Z"
        }"#;
        let document = parse_network(data).unwrap();
        assert_eq!(document.source.as_deref(), Some("A"));
        assert_eq!(document.sink, None);
        assert_eq!(document.effective_sink(), Some("B"));
        assert_eq!(document.graph.nodes[0].x, Some(120.5));
        assert_eq!(document.graph.edges[0].capacity, 7);
    }

    #[test]
    fn rejects_invalid_documents() {
        let unknown_source = r#"{"graph": {"nodes": [{"id": "A", "type": "normal"}], "edges": []}, "source": "Z"}"#;
        assert!(matches!(
            parse_network(unknown_source),
            Err(Error::NodeNotFound(id)) if id == "Z"
        ));
        let self_loop = r#"{"graph": {"nodes": [{"id": "A"}], "edges": [{"id": "e1", "from": "A", "to": "A", "capacity": 1}]}}"#;
        assert!(matches!(parse_network(self_loop), Err(Error::InvalidGraph(_))));
        assert!(matches!(parse_network("{"), Err(Error::Json(_))));
    }

    #[test]
    fn dot_output() {
        let mut graph = graph();
        graph.add_edge("A", "B", 3).unwrap();
        graph.add_edge("B", "C", 5).unwrap();
        graph.nodes.push(Node::new("D", NodeRole::Normal));
        let result = compute_max_flow(&graph, "A", "C").unwrap();
        let dot = flow_to_dot(&result);
        assert!(dot.starts_with("digraph flow {\n"));
        assert!(dot.contains("    \"A\" [shape=doublecircle];\n"));
        assert!(dot.contains("    \"D\" [shape=ellipse];\n"));
        assert!(dot.contains("    \"A\" -> \"B\" [label=\"3/3\",style=bold];\n"));
        assert!(dot.contains("    \"B\" -> \"C\" [label=\"3/5\"];\n"));
    }
}
