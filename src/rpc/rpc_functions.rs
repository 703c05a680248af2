use json::JsonValue;
use std::sync::{Arc, RwLock};

use crate::error::{Error, Result};
use crate::graph::{self, FlowOptions, ResidualMode};
use crate::io::{parse_edges_csv, read_network, NetworkDocument};
use crate::rpc::call_context::CallContext;
use crate::types::Graph;

pub struct JsonRpcRequest {
    pub id: JsonValue,
    pub method: String,
    pub params: JsonValue,
}

pub type SharedNetwork = RwLock<Arc<NetworkDocument>>;

/// The loaded network. The lock is released before this returns.
pub(crate) fn current(network: &SharedNetwork) -> Result<Arc<NetworkDocument>> {
    network
        .read()
        .map(|n| n.clone())
        .map_err(|_| Error::Server("Network lock poisoned".to_string()))
}

fn replace(network: &SharedNetwork, document: NetworkDocument) -> Result<()> {
    *network
        .write()
        .map_err(|_| Error::Server("Network lock poisoned".to_string()))? = Arc::new(document);
    Ok(())
}

pub fn load_network(network: &SharedNetwork, file: &str, call_context: &CallContext) -> Result<usize> {
    let document = read_network(file)?;
    let len = document.graph.edge_count();
    call_context.log_message(&format!(
        "Loaded {} nodes and {len} edges from {file}",
        document.graph.node_count()
    ));
    replace(network, document)?;
    Ok(len)
}

/// Appends the edges of a `from,to,capacity` batch to the loaded network and
/// returns its new edge count.
pub fn add_edges(network: &SharedNetwork, csv: &str, call_context: &CallContext) -> Result<usize> {
    let mut document = current(network)?.as_ref().clone();
    let new_edges = parse_edges_csv(&document.graph, csv)?;
    call_context.log_message(&format!("Adding {} edges", new_edges.len()));
    document.graph.edges.extend(new_edges);
    let len = document.graph.edge_count();
    replace(network, document)?;
    Ok(len)
}

pub fn compute_max_flow(
    request: &JsonRpcRequest,
    network: &NetworkDocument,
    call_context: &CallContext,
) -> Result<JsonValue> {
    call_context.log_message(&format!("{}", request.params));
    let params = &request.params;

    let inline_graph;
    let flow_graph = if params["graph"].is_null() {
        &network.graph
    } else {
        let parsed: Graph = serde_json::from_str(&params["graph"].dump())?;
        parsed.validate()?;
        inline_graph = parsed;
        &inline_graph
    };

    let source = string_param(params, "source")?
        .or(network.effective_source().filter(|_| params["graph"].is_null()))
        .or_else(|| flow_graph.source().map(|n| n.id.as_str()))
        .ok_or_else(|| Error::InvalidInput("No source given".to_string()))?;
    let sink = string_param(params, "sink")?
        .or(network.effective_sink().filter(|_| params["graph"].is_null()))
        .or_else(|| flow_graph.sink().map(|n| n.id.as_str()))
        .ok_or_else(|| Error::InvalidInput("No sink given".to_string()))?;

    let max_augmentations = if params["max_augmentations"].is_null() {
        None
    } else {
        Some(params["max_augmentations"].as_u64().ok_or_else(|| {
            Error::InvalidInput("max_augmentations must be a non-negative integer".to_string())
        })?)
    };
    let options = FlowOptions {
        mode: if params["strict"].as_bool().unwrap_or_default() {
            ResidualMode::PerArc
        } else {
            ResidualMode::Shared
        },
        max_augmentations,
    };

    let result = graph::compute_max_flow_with_options(flow_graph, source, sink, &options)?;
    call_context.log_message(&format!(
        "Computed flow {source} -> {sink}: {} over {} paths",
        result.max_flow,
        result.paths.len()
    ));
    Ok(json::parse(&serde_json::to_string(&result)?)?)
}

fn string_param<'a>(params: &'a JsonValue, name: &str) -> Result<Option<&'a str>> {
    let value = &params[name];
    if value.is_null() {
        Ok(None)
    } else {
        value
            .as_str()
            .filter(|s| !s.is_empty())
            .map(Some)
            .ok_or_else(|| Error::InvalidInput(format!("{name} must be a non-empty string")))
    }
}
