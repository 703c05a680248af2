use clap::Parser;
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flownet::graph::{self, FlowOptions, ResidualMode};
use flownet::io::{self, NetworkDocument};

#[derive(Parser, Debug)]
#[command(name = "cli")]
#[command(about = "Computes the maximum flow through a network document")]
struct Args {
    /// Network document (JSON) as written by --export
    network: String,

    /// Source node; defaults to the document's source
    #[arg(long)]
    source: Option<String>,

    /// Sink node; defaults to the document's sink
    #[arg(long)]
    sink: Option<String>,

    /// Additional edges, one `from,to,capacity` per line
    #[arg(long)]
    edges_csv: Option<String>,

    /// Give every edge its own cancellation channel
    #[arg(long)]
    strict: bool,

    /// Fail instead of pushing flow along more paths than this
    #[arg(long)]
    max_augmentations: Option<u64>,

    /// Write the final flow as a Graphviz dot file
    #[arg(long)]
    dot: Option<String>,

    /// Write the network with its final flow to this file
    #[arg(long)]
    export: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut document = io::read_network(&args.network)?;
    info!(
        nodes = document.graph.node_count(),
        edges = document.graph.edge_count(),
        "Read {}",
        args.network
    );
    if let Some(csv) = &args.edges_csv {
        let edges = io::read_edges_csv(&document.graph, csv)?;
        info!("Adding {} edges from {csv}", edges.len());
        document.graph.edges.extend(edges);
    }

    let source = args
        .source
        .as_deref()
        .or(document.effective_source())
        .ok_or("No source: pass --source or mark a node as source")?
        .to_string();
    let sink = args
        .sink
        .as_deref()
        .or(document.effective_sink())
        .ok_or("No sink: pass --sink or mark a node as sink")?
        .to_string();

    let options = FlowOptions {
        mode: if args.strict {
            ResidualMode::PerArc
        } else {
            ResidualMode::Shared
        },
        max_augmentations: args.max_augmentations,
    };
    info!("Computing flow {source} -> {sink}");
    let result = graph::compute_max_flow_with_options(&document.graph, &source, &sink, &options)?;
    info!(
        saturated = result.saturated_edges().count(),
        "Found flow: {}",
        result.max_flow
    );
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(dotfile) = &args.dot {
        fs::write(dotfile, io::flow_to_dot(&result))?;
        info!("Wrote dotfile {dotfile}.");
    }
    if let Some(export) = &args.export {
        let exported = NetworkDocument::new(result.final_graph, Some(source), Some(sink));
        io::write_network(&exported, export)?;
        info!("Exported network to {export}.");
    }
    Ok(())
}
