use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Source and sink are the same node: {0}")]
    DegenerateSourceSink(String),

    #[error("Residual network has no usable edge {from} -> {to}")]
    InconsistentResidual { from: String, to: String },

    #[error("No convergence after {limit} augmenting paths")]
    AugmentationLimit { limit: u64 },

    #[error("Flow from {from} to {to} exceeds the capacity range")]
    CapacityOverflow { from: String, to: String },

    #[error("Invalid graph:\n{}", .0.join("\n"))]
    InvalidGraph(Vec<String>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON-RPC payload error: {0}")]
    JsonRpc(#[from] json::Error),

    #[error("Server error: {0}")]
    Server(String),
}
