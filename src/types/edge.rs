use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use crate::types::Capacity;

/// A directed arc of the network with its capacity and the flow currently
/// routed through it.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub capacity: Capacity,
    #[serde(default)]
    pub flow: Capacity,
}

impl Edge {
    pub fn new(id: &str, from: &str, to: &str, capacity: Capacity) -> Edge {
        Edge {
            id: id.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            capacity,
            flow: 0,
        }
    }

    pub fn is_saturated(&self) -> bool {
        self.flow == self.capacity
    }

    pub fn connects(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({}/{})",
            self.from, self.to, self.flow, self.capacity
        )
    }
}

/// Index from the ordered (from, to) pair to the position of the arc in
/// `edges`. With at most one arc per ordered pair the index is exact; if the
/// input breaks that rule, the first arc wins.
pub fn pair_index(edges: &[Edge]) -> HashMap<(String, String), usize> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    for (i, e) in edges.iter().enumerate() {
        index.entry((e.from.clone(), e.to.clone())).or_insert(i);
    }
    index
}
