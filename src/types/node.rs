use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    #[default]
    Normal,
    Source,
    Sink,
}

/// A node of the network. The coordinates are layout data owned by whoever
/// draws the network; they are carried through (de)serialization untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type", default)]
    pub role: NodeRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

impl Node {
    pub fn new(id: &str, role: NodeRole) -> Node {
        Node {
            id: id.to_string(),
            role,
            x: None,
            y: None,
        }
    }
}

impl Display for NodeRole {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            NodeRole::Normal => write!(f, "normal"),
            NodeRole::Source => write!(f, "source"),
            NodeRole::Sink => write!(f, "sink"),
        }
    }
}
