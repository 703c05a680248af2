mod augmenting_path;
mod flow;
mod projection;
mod residual;

pub use crate::graph::augmenting_path::augmenting_path;
pub use crate::graph::flow::{
    compute_max_flow, compute_max_flow_with_options, edmonds_karp_bound, FlowOptions,
};
pub use crate::graph::projection::FlowProjector;
pub use crate::graph::residual::{Channel, Hop, ResidualMode, ResidualNetwork, ResidualPath};
