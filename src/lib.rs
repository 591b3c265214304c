//! Optimal alignments over synchronous product nets.
//!
//! An alignment explains an observed trace in terms of a process model: a
//! sequence of moves where both agree (synchronous), only the log moved, or
//! only the model moved. This crate builds the synchronous product of a trace
//! net and a model net, prices every move, and finds a cheapest firing
//! sequence from the initial to the final marking.
//!
//! ## Search variants
//! [`SearchEngine`] runs Dijkstra or A*, each unidirectional or
//! bidirectional. Bidirectional search picks the next direction by one of
//! three alternating strategies and stops on one of three termination
//! criteria; see [`ExecutionVariant`]. A* consults a [`HeuristicOracle`],
//! usually a thin wrapper around an external LP/MILP solver; two solver-free
//! oracles ship with the crate.
//!
//! ## Quick start
//! ```
//! use spn_align::{AlignerBuilder, ExecutionVariant, MoveKind, ProcessModel};
//!
//! let model = ProcessModel::sequence(&["a", "b", "c"]);
//! let aligner = AlignerBuilder::new()
//!     .with_variant("dijkstra_strictly_alternate_symmetric_lower_bounding".parse()?)
//!     .build();
//! let result = aligner.align(&["a", "c"], &model)?;
//! assert_eq!(result.cost, 10);
//! assert_eq!(result.count(MoveKind::Model), 1);
//! assert_eq!(result.rendered(), vec!["(a, a)", "(>>, b)", "(c, c)"]);
//! # Ok::<(), spn_align::AlignError>(())
//! ```

pub mod batch;
pub mod builder;
pub mod cost;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod heuristic;
pub mod moves;
pub mod net;
pub mod node;
pub mod product;
pub mod traits;
pub mod variant;

pub use crate::batch::align_traces;
pub use crate::builder::{Aligner, AlignerBuilder, AlignerConfig};
pub use crate::cost::{Cost, CostClass, CostFunction};
pub use crate::engine::{AlignmentResult, SearchEngine, SearchStats};
pub use crate::error::{AlignError, MoveDefect};
pub use crate::heuristic::{LabelDeficitOracle, ZeroOracle};
pub use crate::moves::{Move, MoveKind, MoveLabel};
pub use crate::net::{Marking, PetriNet};
pub use crate::product::{build_synchronous_product, trace_net, ProcessModel, SynchronousProduct};
pub use crate::traits::{Estimate, HeuristicOracle};
pub use crate::variant::{
    AlternatingMethod, Direction, ExecutionVariant, SearchAlgorithm, SearchMode, SplitPointSolver,
    TerminationCriterion,
};
