//! The heuristic oracle seam.
//!
//! Informed search asks an oracle for a lower bound on the remaining cost of
//! every state it generates. Oracles usually wrap a relaxed linear system
//! over the product's incidence matrix solved by an external LP/MILP
//! backend; the engine only depends on this trait.
//!
//! Contract:
//! - `h` must never exceed the true remaining cost (admissibility). The engine
//!   cannot check this; its optimality guarantee depends on it.
//! - `feasible = false` means the relaxation had no solution. `h` must then
//!   still be a safe bound, never an optimistic zero; use
//!   [`Estimate::infeasible`].
//! - `x` is a fractional witness, typically a transition-firing vector of the
//!   relaxation, indexed by product [`TransitionId`](crate::net::TransitionId).
//!
//! Oracles are called through `&self`; caching oracles need interior
//! mutability. When alignments run in parallel each search gets its own
//! oracle, see [`crate::batch`].

use crate::cost::Cost;
use crate::net::Marking;
use crate::variant::SplitPointSolver;

/// Answer of a heuristic oracle for one marking.
#[derive(Clone, Debug, PartialEq)]
pub struct Estimate {
    /// Lower bound on the remaining cost.
    pub h: Cost,
    /// Whether the underlying relaxation was solvable.
    pub feasible: bool,
    /// Fractional witness of the bound.
    pub x: Vec<f64>,
}

impl Estimate {
    pub fn feasible(h: Cost, x: Vec<f64>) -> Self {
        Self {
            h,
            feasible: true,
            x,
        }
    }

    /// Unsolvable relaxation: maximal bound, empty witness.
    pub fn infeasible() -> Self {
        Self {
            h: Cost::MAX,
            feasible: false,
            x: Vec::new(),
        }
    }

    pub fn zero() -> Self {
        Self::feasible(0, Vec::new())
    }
}

/// Lower-bound provider for informed search.
pub trait HeuristicOracle {
    /// Estimate the remaining cost from `marking` to the search target.
    fn estimate(&self, marking: &Marking) -> Estimate;

    /// Solver backend behind this oracle, if it is backed by one.
    ///
    /// When both this and the execution variant's split-point solver are set
    /// they must agree.
    fn backend(&self) -> Option<SplitPointSolver> {
        None
    }

    /// `true` when every feasible estimate satisfies `h = c·x` for an optimal
    /// `x` of the relaxation.
    ///
    /// The engine then derives a child's estimate from its parent when the
    /// parent's witness fires the child's transition at least once
    /// (`h' = h - c(t)`, `x' = x - e_t`) instead of calling the oracle.
    fn witness_is_exact(&self) -> bool {
        false
    }
}

impl<F> HeuristicOracle for F
where
    F: Fn(&Marking) -> Estimate,
{
    fn estimate(&self, marking: &Marking) -> Estimate {
        self(marking)
    }
}
