//! Solver-free oracles.

use crate::cost::Cost;
use crate::error::AlignError;
use crate::net::Marking;
use crate::product::{SynchronousProduct, TraceLayout};
use crate::traits::{Estimate, HeuristicOracle};
use crate::variant::Direction;

/// `h = 0` everywhere. Admissible and consistent for every product; A* with
/// this oracle expands like Dijkstra ordered by the A* tie-breaks.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroOracle;

impl HeuristicOracle for ZeroOracle {
    fn estimate(&self, _marking: &Marking) -> Estimate {
        Estimate::zero()
    }
}

/// Bound from trace events no model transition can ever match.
///
/// An event whose label carries no visible model transition can only be
/// consumed by its log move. Forward, every such event still ahead of the
/// trace token costs its log move; backward (towards the initial marking),
/// every such event already behind it does. The witness fires exactly those
/// log moves, so the bound is exact with respect to its witness and
/// consistent.
#[derive(Clone, Debug)]
pub struct LabelDeficitOracle {
    direction: Direction,
    layout: TraceLayout,
    log_costs: Vec<Cost>,
    num_transitions: usize,
}

impl LabelDeficitOracle {
    /// # Errors
    /// [`AlignError::InvalidConfiguration`] when `product` was not built from a trace.
    pub fn new(product: &SynchronousProduct, direction: Direction) -> Result<Self, AlignError> {
        let layout = product.trace_layout().cloned().ok_or_else(|| {
            AlignError::invalid_configuration("label-deficit oracle needs a product built from a trace")
        })?;
        let log_costs = layout
            .log_transitions
            .iter()
            .map(|&t| product.cost(t))
            .collect();
        Ok(Self {
            direction,
            layout,
            log_costs,
            num_transitions: product.net().num_transitions(),
        })
    }

    pub fn forward(product: &SynchronousProduct) -> Result<Self, AlignError> {
        Self::new(product, Direction::Forward)
    }

    pub fn backward(product: &SynchronousProduct) -> Result<Self, AlignError> {
        Self::new(product, Direction::Backward)
    }
}

impl HeuristicOracle for LabelDeficitOracle {
    fn estimate(&self, marking: &Marking) -> Estimate {
        let Some(position) = self.layout.position(marking) else {
            return Estimate::infeasible();
        };
        let pending = match self.direction {
            Direction::Forward => position..self.layout.labels.len(),
            Direction::Backward => 0..position,
        };
        let mut h: Cost = 0;
        let mut x = vec![0.0; self.num_transitions];
        for i in pending {
            if self.layout.matchable[i] {
                continue;
            }
            h = h.saturating_add(self.log_costs[i]);
            x[self.layout.log_transitions[i]] = 1.0;
        }
        Estimate::feasible(h, x)
    }

    fn witness_is_exact(&self) -> bool {
        true
    }
}
