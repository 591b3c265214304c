//! Execution variants: which search runs and how.
//!
//! A variant names an algorithm, optionally a bidirectional alternating
//! strategy together with a termination criterion, and optionally the
//! split-point solver backing the heuristic. Its textual form joins the parts
//! with `_`, e.g. `a_star_lowest_g_cost_average_function_GUROBI`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AlignError;

/// Search direction over the product.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From the initial marking along transitions.
    Forward,
    /// From the final marking along reversed transitions.
    Backward,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
        }
    }
}

macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $serde_case:literal { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = $serde_case)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AlignError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == value)
                    .ok_or_else(|| {
                        AlignError::invalid_configuration(format!(
                            concat!("unknown ", stringify!($name), " '{}'"),
                            value
                        ))
                    })
            }
        }
    };
}

named_enum! {
    /// Search algorithm.
    SearchAlgorithm, "snake_case" {
        /// Uniform-cost search ordered by `g`.
        Dijkstra => "dijkstra",
        /// Heuristic search ordered by `f = g + h`.
        AStar => "a_star",
    }
}

named_enum! {
    /// Which direction expands next in bidirectional search.
    AlternatingMethod, "snake_case" {
        /// One expansion per direction in turn.
        StrictlyAlternate => "strictly_alternate",
        /// The direction with fewer open entries (cardinality criterion).
        SmallerOpenSet => "smaller_open_set",
        /// The direction whose open minimum has the lower `g`.
        LowestGCost => "lowest_g_cost",
    }
}

named_enum! {
    /// When bidirectional search stops.
    TerminationCriterion, "snake_case" {
        /// Sum of the frontiers' minimal `g` reaches the best connection.
        SymmetricLowerBounding => "symmetric_lower_bounding",
        /// Average of the frontiers' lower bounds reaches the best connection.
        AverageFunction => "average_function",
        /// Half of that average reaches the best connection.
        HalfAverageFunction => "half_average_function",
    }
}

named_enum! {
    /// External LP/MILP backend servicing heuristic requests.
    SplitPointSolver, "SCREAMING_SNAKE_CASE" {
        Gurobi => "GUROBI",
        GlpkMi => "GLPK_MI",
        CbcMi => "CBC_MI",
        GlpkLp => "GLPK_LP",
        CbcLp => "CBC_LP",
    }
}

/// Unidirectional search, or bidirectional with its coordination policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchMode {
    Unidirectional,
    Bidirectional {
        alternating: AlternatingMethod,
        termination: TerminationCriterion,
    },
}

/// Validated search configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionVariant {
    algorithm: SearchAlgorithm,
    mode: SearchMode,
    split_point_solver: Option<SplitPointSolver>,
}

impl ExecutionVariant {
    pub fn dijkstra() -> Self {
        Self {
            algorithm: SearchAlgorithm::Dijkstra,
            mode: SearchMode::Unidirectional,
            split_point_solver: None,
        }
    }

    pub fn a_star() -> Self {
        Self {
            algorithm: SearchAlgorithm::AStar,
            mode: SearchMode::Unidirectional,
            split_point_solver: None,
        }
    }

    /// Switch to bidirectional search. Both algorithms support it.
    pub fn bidirectional(
        mut self,
        alternating: AlternatingMethod,
        termination: TerminationCriterion,
    ) -> Self {
        self.mode = SearchMode::Bidirectional {
            alternating,
            termination,
        };
        self
    }

    /// Attach a split-point solver.
    ///
    /// # Errors
    /// Dijkstra never consults a heuristic, so a solver there is an
    /// [`AlignError::InvalidConfiguration`].
    pub fn with_split_point_solver(mut self, solver: SplitPointSolver) -> Result<Self, AlignError> {
        if self.algorithm == SearchAlgorithm::Dijkstra {
            return Err(AlignError::invalid_configuration(
                "dijkstra does not use a split-point solver",
            ));
        }
        self.split_point_solver = Some(solver);
        Ok(self)
    }

    /// Build from loose parts, the shape configuration files come in.
    ///
    /// The alternating strategy and the termination criterion go together:
    /// one without the other is rejected.
    pub fn from_parts(
        algorithm: SearchAlgorithm,
        alternating: Option<AlternatingMethod>,
        termination: Option<TerminationCriterion>,
        split_point_solver: Option<SplitPointSolver>,
    ) -> Result<Self, AlignError> {
        let base = match algorithm {
            SearchAlgorithm::Dijkstra => Self::dijkstra(),
            SearchAlgorithm::AStar => Self::a_star(),
        };
        let variant = match (alternating, termination) {
            (None, None) => base,
            (Some(a), Some(t)) => base.bidirectional(a, t),
            (Some(_), None) => {
                return Err(AlignError::invalid_configuration(
                    "bidirectional alternating strategy set without a termination criterion",
                ))
            }
            (None, Some(_)) => {
                return Err(AlignError::invalid_configuration(
                    "bidirectional termination criterion set without an alternating strategy",
                ))
            }
        };
        match split_point_solver {
            Some(solver) => variant.with_split_point_solver(solver),
            None => Ok(variant),
        }
    }

    pub fn algorithm(&self) -> SearchAlgorithm {
        self.algorithm
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn split_point_solver(&self) -> Option<SplitPointSolver> {
        self.split_point_solver
    }

    pub fn is_informed(&self) -> bool {
        self.algorithm == SearchAlgorithm::AStar
    }

    pub fn is_bidirectional(&self) -> bool {
        matches!(self.mode, SearchMode::Bidirectional { .. })
    }
}

impl Default for ExecutionVariant {
    fn default() -> Self {
        Self::a_star()
    }
}

impl fmt::Display for ExecutionVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.algorithm.as_str())?;
        if let SearchMode::Bidirectional {
            alternating,
            termination,
        } = self.mode
        {
            write!(f, "_{alternating}_{termination}")?;
        }
        if let Some(solver) = self.split_point_solver {
            write!(f, "_{solver}")?;
        }
        Ok(())
    }
}

/// Match the longest `all` entry that is a whole leading segment of `rest`.
///
/// A match must be followed by the end of input or by `_` and a non-empty
/// remainder; the remainder is returned without its separator.
fn take_part<'a, T: Copy>(rest: &'a str, all: &[T], name: impl Fn(T) -> &'static str) -> Option<(T, &'a str)> {
    all.iter()
        .copied()
        .filter_map(|v| {
            let tail = rest.strip_prefix(name(v))?;
            if tail.is_empty() {
                return Some((v, tail));
            }
            match tail.strip_prefix('_') {
                Some(next) if !next.is_empty() => Some((v, next)),
                _ => None,
            }
        })
        .max_by_key(|&(v, _)| name(v).len())
}

impl FromStr for ExecutionVariant {
    type Err = AlignError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let unknown = || AlignError::invalid_configuration(format!("unknown execution variant '{value}'"));
        let (algorithm, rest) =
            take_part(value, SearchAlgorithm::ALL, SearchAlgorithm::as_str).ok_or_else(unknown)?;
        let (alternating, rest) = match take_part(rest, AlternatingMethod::ALL, AlternatingMethod::as_str) {
            Some((a, tail)) => (Some(a), tail),
            None => (None, rest),
        };
        let (termination, rest) =
            match take_part(rest, TerminationCriterion::ALL, TerminationCriterion::as_str) {
                Some((t, tail)) => (Some(t), tail),
                None => (None, rest),
            };
        let (solver, rest) = match take_part(rest, SplitPointSolver::ALL, SplitPointSolver::as_str) {
            Some((s, tail)) => (Some(s), tail),
            None => (None, rest),
        };
        if !rest.is_empty() {
            return Err(unknown());
        }
        Self::from_parts(algorithm, alternating, termination, solver)
    }
}

impl TryFrom<String> for ExecutionVariant {
    type Error = AlignError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExecutionVariant> for String {
    fn from(variant: ExecutionVariant) -> Self {
        variant.to_string()
    }
}
