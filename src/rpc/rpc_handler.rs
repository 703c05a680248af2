use json::JsonValue;
use std::error::Error as StdError;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use tracing::error;

use crate::error::Error;
use crate::rpc::call_context::CallContext;
use crate::rpc::rpc_functions::{
    add_edges, compute_max_flow, current, load_network, JsonRpcRequest, SharedNetwork,
};

const INVALID_PARAMS: i64 = -32602;
const METHOD_NOT_FOUND: i64 = -32601;
const SERVER_ERROR: i64 = -32000;

pub fn handle_connection(
    network: &SharedNetwork,
    mut socket: TcpStream,
) -> Result<(), Box<dyn StdError>> {
    let request = read_request(&mut socket)?;
    let client_ip = socket.peer_addr()?.to_string();
    let call_context = CallContext::new(&client_ip, &request.id, &request.method);
    let response = dispatch(network, request, &call_context);
    socket.write_all(jsonrpc_response(response).as_bytes())?;
    Ok(())
}

/// Runs one request and serializes the JSON-RPC response for it.
pub fn dispatch(network: &SharedNetwork, request: JsonRpcRequest, call_context: &CallContext) -> String {
    let outcome = match request.method.as_str() {
        "load_network" => match request.params["file"].as_str() {
            Some(file) => load_network(network, file, call_context)
                .map(JsonValue::from)
                .map_err(|e| with_code(e, "Error loading network")),
            None => Err((INVALID_PARAMS, "Missing parameter: file".to_string())),
        },
        "add_edges" => match request.params["csv"].as_str() {
            Some(csv) => add_edges(network, csv, call_context)
                .map(JsonValue::from)
                .map_err(|e| with_code(e, "Error adding edges")),
            None => Err((INVALID_PARAMS, "Missing parameter: csv".to_string())),
        },
        "compute_max_flow" => current(network)
            .and_then(|loaded| compute_max_flow(&request, &loaded, call_context))
            .map_err(|e| with_code(e, "Error computing max flow")),
        _ => Err((METHOD_NOT_FOUND, "Method not found".to_string())),
    };
    match outcome {
        Ok(result) => jsonrpc_serialize_response(request.id, Some(result), None),
        Err((code, message)) => {
            error!(code, "{} {message}", call_context.rpc_function());
            jsonrpc_serialize_response(request.id, None, Some((code, &message)))
        }
    }
}

fn with_code(e: Error, context: &str) -> (i64, String) {
    let code = match e {
        Error::InvalidInput(_)
        | Error::InvalidGraph(_)
        | Error::Json(_)
        | Error::NodeNotFound(_)
        | Error::DegenerateSourceSink(_)
        | Error::CapacityOverflow { .. } => INVALID_PARAMS,
        _ => SERVER_ERROR,
    };
    (code, format!("{context}: {e}"))
}

fn read_payload(socket: &mut TcpStream) -> Result<Vec<u8>, Box<dyn StdError>> {
    let mut reader = BufReader::new(socket);
    let mut length = 0;
    for result in reader.by_ref().lines() {
        let l = result?;
        if l.is_empty() {
            break;
        }

        let header = "content-length: ";
        if l.to_lowercase().starts_with(header) {
            length = l[header.len()..].trim().parse::<usize>()?;
        }
    }
    let mut payload = vec![0u8; length];

    reader.read_exact(payload.as_mut_slice())?;
    Ok(payload)
}

pub fn parse_request(payload: &str) -> Result<JsonRpcRequest, Box<dyn StdError>> {
    let mut request = json::parse(payload)?;
    let id = request["id"].take();
    let params = request["params"].take();
    match request["method"].as_str() {
        Some(method) => Ok(JsonRpcRequest {
            id,
            method: method.to_string(),
            params,
        }),
        _ => Err(From::from(format!("Invalid JSON-RPC request: {request}"))),
    }
}

fn read_request(socket: &mut TcpStream) -> Result<JsonRpcRequest, Box<dyn StdError>> {
    let payload = read_payload(socket)?;
    parse_request(&String::from_utf8(payload)?)
}

fn jsonrpc_serialize_response(
    id: JsonValue,
    result: Option<JsonValue>,
    error: Option<(i64, &str)>,
) -> String {
    let mut response = json::object! {
        jsonrpc: "2.0",
        id: id,
    };
    if let Some((code, message)) = error {
        response["error"] = json::object! {
            code: code,
            message: message,
        };
    } else {
        response["result"] = result.unwrap_or(JsonValue::Null);
    }
    response.dump()
}

fn jsonrpc_response(json_payload: String) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        json_payload.len(),
        json_payload
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::io::NetworkDocument;
    use crate::types::{Graph, NodeRole};
    use std::sync::{Arc, RwLock};

    fn network() -> SharedNetwork {
        let mut graph = Graph::default();
        graph.add_node("S", NodeRole::Source).unwrap();
        graph.add_node("T", NodeRole::Sink).unwrap();
        RwLock::new(Arc::new(NetworkDocument::new(graph, None, None)))
    }

    fn call(network: &SharedNetwork, payload: &str) -> JsonValue {
        let request = parse_request(payload).unwrap();
        json::parse(&dispatch(network, request, &CallContext::default())).unwrap()
    }

    #[test]
    fn add_edges_then_compute() {
        let network = network();
        let added = call(
            &network,
            r#"{"jsonrpc":"2.0","id":1,"method":"add_edges","params":{"csv":"S,T,5"}}"#,
        );
        assert_eq!(added["result"], 1);
        let response = call(
            &network,
            r#"{"jsonrpc":"2.0","id":"x","method":"compute_max_flow","params":{}}"#,
        );
        assert_eq!(response["id"], "x");
        assert_eq!(response["result"]["maxFlow"], 5);
    }

    #[test]
    fn error_codes() {
        let network = network();
        let unknown = call(&network, r#"{"id":1,"method":"frobnicate","params":{}}"#);
        assert_eq!(unknown["error"]["code"], METHOD_NOT_FOUND);
        let missing = call(&network, r#"{"id":2,"method":"load_network","params":{}}"#);
        assert_eq!(missing["error"]["code"], INVALID_PARAMS);
        let no_file = call(
            &network,
            r#"{"id":3,"method":"load_network","params":{"file":"/nonexistent/network.json"}}"#,
        );
        assert_eq!(no_file["error"]["code"], SERVER_ERROR);
        let same = call(
            &network,
            r#"{"id":4,"method":"compute_max_flow","params":{"source":"S","sink":"S"}}"#,
        );
        assert_eq!(same["error"]["code"], INVALID_PARAMS);
        assert!(same["result"].is_null());
    }

    #[test]
    fn rejects_requests_without_method() {
        assert!(parse_request(r#"{"id":1}"#).is_err());
        assert!(parse_request("not json").is_err());
    }
}
