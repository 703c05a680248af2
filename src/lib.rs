//! Maximum flow through capacitated directed networks.
//!
//! The core is [`graph::compute_max_flow`], an Edmonds-Karp implementation
//! that reports every augmenting path it used next to the final per-arc flow.
//! Around it sit graph editing ([`types::Graph`]), JSON import/export
//! ([`io`]) and a JSON-RPC server ([`server`]).

pub mod error;
pub mod graph;
pub mod io;
pub mod rpc;
pub mod server;
pub mod types;

pub use error::{Error, Result};
