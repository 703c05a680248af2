use flownet::graph::{
    compute_max_flow, compute_max_flow_with_options, edmonds_karp_bound, FlowOptions,
    ResidualMode,
};
use flownet::io::{read_edges_csv, read_network, write_network, NetworkDocument};
use flownet::types::{FlowResult, Graph, NodeRole};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;

const SOURCE: &str = "N0";

fn sink(graph: &Graph) -> String {
    format!("N{}", graph.node_count() - 1)
}

fn random_graph(seed: u64, allow_anti_parallel: bool) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let node_count = rng.gen_range(2..=7);
    let mut graph = Graph::default();
    for i in 0..node_count {
        graph.add_node(&format!("N{i}"), NodeRole::Normal).unwrap();
    }
    for i in 0..node_count {
        for j in 0..node_count {
            if i == j || !rng.gen_bool(0.4) {
                continue;
            }
            let (from, to) = (format!("N{i}"), format!("N{j}"));
            if !allow_anti_parallel && graph.edge_between(&to, &from).is_some() {
                continue;
            }
            graph.add_edge(&from, &to, rng.gen_range(1..=12u64)).unwrap();
        }
    }
    graph
}

/// Smallest capacity of any cut separating source and sink, by enumeration.
fn brute_force_min_cut(graph: &Graph, source: &str, sink: &str) -> u64 {
    let ids = graph.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
    let index = |id: &str| ids.iter().position(|n| *n == id).unwrap();
    let (s, t) = (index(source), index(sink));
    (0u32..(1 << ids.len()))
        .filter(|set| set & (1 << s) != 0 && set & (1 << t) == 0)
        .map(|set| {
            graph
                .edges
                .iter()
                .filter(|e| set & (1 << index(&e.from)) != 0 && set & (1 << index(&e.to)) == 0)
                .map(|e| e.capacity)
                .sum::<u64>()
        })
        .min()
        .unwrap()
}

fn check_flow_is_valid(result: &FlowResult, source: &str, sink: &str) {
    let graph = &result.final_graph;
    for edge in &graph.edges {
        assert!(edge.flow <= edge.capacity, "Capacity exceeded on {edge}");
    }
    for node in &graph.nodes {
        if node.id != source && node.id != sink {
            assert_eq!(graph.net_outflow(&node.id), 0, "Flow not conserved at {}", node.id);
        }
    }
    assert_eq!(graph.net_outflow(source), result.max_flow as i128);
    assert_eq!(graph.net_outflow(sink), -(result.max_flow as i128));
}

fn check_paths(result: &FlowResult, graph: &Graph, source: &str, sink: &str) {
    assert!(result.paths.len() as u64 <= edmonds_karp_bound(graph));
    assert_eq!(
        result.paths.iter().map(|p| p.bottleneck).sum::<u64>(),
        result.max_flow
    );
    for path in &result.paths {
        assert!(path.bottleneck > 0);
        assert_eq!(path.path.first().map(String::as_str), Some(source));
        assert_eq!(path.path.last().map(String::as_str), Some(sink));
    }
    // Shortest augmenting paths never get shorter.
    for pair in result.paths.windows(2) {
        assert!(pair[0].path.len() <= pair[1].path.len());
    }
}

#[test]
fn random_graphs_shared_mode() {
    for seed in 0..300 {
        let graph = random_graph(seed, false);
        let sink = sink(&graph);
        let result = compute_max_flow(&graph, SOURCE, &sink).unwrap();
        check_flow_is_valid(&result, SOURCE, &sink);
        check_paths(&result, &graph, SOURCE, &sink);
        let min_cut = brute_force_min_cut(&graph, SOURCE, &sink);
        assert_eq!(result.max_flow, min_cut, "seed {seed}");
        assert_eq!(result.min_cut.capacity, min_cut, "seed {seed}");
        assert_eq!(compute_max_flow(&graph, SOURCE, &sink).unwrap(), result);
    }
}

#[test]
fn random_graphs_per_arc_mode() {
    let options = FlowOptions {
        mode: ResidualMode::PerArc,
        max_augmentations: None,
    };
    for seed in 0..300 {
        let graph = random_graph(seed, true);
        let sink = sink(&graph);
        let result = compute_max_flow_with_options(&graph, SOURCE, &sink, &options).unwrap();
        check_flow_is_valid(&result, SOURCE, &sink);
        check_paths(&result, &graph, SOURCE, &sink);
        assert_eq!(
            result.max_flow,
            brute_force_min_cut(&graph, SOURCE, &sink),
            "seed {seed}"
        );
    }
}

#[test]
fn shared_mode_value_is_optimal_with_anti_parallel_edges() {
    for seed in 0..300 {
        let graph = random_graph(seed, true);
        let sink = sink(&graph);
        let shared = compute_max_flow(&graph, SOURCE, &sink).unwrap();
        let min_cut = brute_force_min_cut(&graph, SOURCE, &sink);
        assert_eq!(shared.max_flow, min_cut, "seed {seed}");
        assert_eq!(shared.min_cut.capacity, min_cut, "seed {seed}");
    }
}

#[test]
fn modes_agree_without_anti_parallel_edges() {
    let options = FlowOptions {
        mode: ResidualMode::PerArc,
        max_augmentations: None,
    };
    for seed in 0..100 {
        let graph = random_graph(seed, false);
        let sink = sink(&graph);
        let shared = compute_max_flow(&graph, SOURCE, &sink).unwrap();
        let per_arc = compute_max_flow_with_options(&graph, SOURCE, &sink, &options).unwrap();
        assert_eq!(shared.max_flow, per_arc.max_flow, "seed {seed}");
    }
}

#[test]
fn network_file_round_trip() {
    let mut graph = Graph::default();
    graph.add_node("A", NodeRole::Source).unwrap();
    graph.add_node("B", NodeRole::Normal).unwrap();
    graph.add_node("C", NodeRole::Normal).unwrap();
    graph.add_node("D", NodeRole::Sink).unwrap();

    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "A,B,10\nA,C,10\nB,C,2\nB,D,4\nC,D,9").unwrap();
    let edges = read_edges_csv(&graph, csv.path().to_str().unwrap()).unwrap();
    graph.edges.extend(edges);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("network.json");
    let path = path.to_str().unwrap();
    let document = NetworkDocument::new(graph.clone(), Some("A".to_string()), None);
    write_network(&document, path).unwrap();

    let read = read_network(path).unwrap();
    assert_eq!(read.graph, graph);
    assert_eq!(read.source.as_deref(), Some("A"));
    assert!(read.timestamp.is_some());
    assert_eq!(read.effective_sink(), Some("D"));

    let result = compute_max_flow(&read.graph, "A", "D").unwrap();
    assert_eq!(result.max_flow, 13);
}
