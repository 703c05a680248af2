use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::graph::residual::{Channel, ResidualMode};
use crate::types::edge::pair_index;
use crate::types::{Capacity, Edge};

/// Writes the flow pushed through the residual network back onto the arcs of
/// the graph.
pub struct FlowProjector {
    mode: ResidualMode,
    arcs: HashMap<(String, String), usize>,
}

impl FlowProjector {
    pub fn new(edges: &[Edge], mode: ResidualMode) -> FlowProjector {
        FlowProjector {
            mode,
            arcs: pair_index(edges),
        }
    }

    /// Records that `amount` was pushed from `from` to `to` over `channel`.
    ///
    /// Moving along a real arc adds flow to it. Moving against a real arc
    /// cancels flow that was pushed over it before; flow never goes below
    /// zero and never appears on an arc that does not exist.
    pub fn project(
        &self,
        edges: &mut [Edge],
        from: &str,
        to: &str,
        channel: Channel,
        amount: Capacity,
    ) -> Result<()> {
        let inconsistent = || Error::InconsistentResidual {
            from: from.to_string(),
            to: to.to_string(),
        };
        let overflow = || Error::CapacityOverflow {
            from: from.to_string(),
            to: to.to_string(),
        };
        match self.mode {
            ResidualMode::Shared => {
                if let Some(&i) = self.arcs.get(&(from.to_string(), to.to_string())) {
                    edges[i].flow = edges[i].flow.checked_add(amount).ok_or_else(overflow)?;
                } else if let Some(&i) = self.arcs.get(&(to.to_string(), from.to_string())) {
                    edges[i].flow = edges[i].flow.saturating_sub(amount);
                } else {
                    return Err(inconsistent());
                }
            }
            ResidualMode::PerArc => match channel {
                Channel::Forward(i) => {
                    let edge = edges.get_mut(i).ok_or_else(inconsistent)?;
                    let flow = edge.flow.checked_add(amount).ok_or_else(overflow)?;
                    if flow > edge.capacity {
                        return Err(inconsistent());
                    }
                    edge.flow = flow;
                }
                Channel::Undo(i) => {
                    let edge = edges.get_mut(i).ok_or_else(inconsistent)?;
                    edge.flow = edge.flow.checked_sub(amount).ok_or_else(inconsistent)?;
                }
                Channel::Reverse => return Err(inconsistent()),
            },
        }
        Ok(())
    }
}
