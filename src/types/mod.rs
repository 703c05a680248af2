pub mod edge;
pub mod flow_result;
pub mod graph;
pub mod node;

pub use edge::Edge;
pub use flow_result::{AugmentingPath, FlowResult, MinCut};
pub use graph::Graph;
pub use node::{Node, NodeRole};

/// Arc capacities and flows are non-negative integers.
pub type Capacity = u64;
