//! Move costs.
//!
//! Every product transition gets a cost before search starts. Costs are
//! unsigned, so `g` never decreases along a path. Overrides must be
//! complete: a lookup miss is an [`AlignError::InvalidMove`], not zero.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, MoveDefect};
use crate::moves::{Move, MoveKind};

/// Cost of a move or of a path.
pub type Cost = u64;

pub const DEFAULT_LOG_COST: Cost = 10;
pub const DEFAULT_MODEL_COST: Cost = 10;
pub const DEFAULT_SYNCHRONOUS_COST: Cost = 0;
pub const DEFAULT_INDECISIVE_COST: Cost = 0;

/// Cost class of a move; silent model moves get their own class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostClass {
    Log,
    Model,
    /// Silent model move.
    Indecisive,
    Synchronous,
}

impl CostClass {
    pub fn of(mv: &Move) -> Self {
        if mv.is_silent() {
            return CostClass::Indecisive;
        }
        match mv.kind() {
            MoveKind::Synchronous => CostClass::Synchronous,
            MoveKind::Log => CostClass::Log,
            MoveKind::Model => CostClass::Model,
        }
    }

    pub fn default_cost(self) -> Cost {
        match self {
            CostClass::Log => DEFAULT_LOG_COST,
            CostClass::Model => DEFAULT_MODEL_COST,
            CostClass::Indecisive => DEFAULT_INDECISIVE_COST,
            CostClass::Synchronous => DEFAULT_SYNCHRONOUS_COST,
        }
    }
}

/// How product transitions are priced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CostFunction {
    /// Log and model moves cost 10, synchronous and silent moves 0.
    #[default]
    Standard,
    /// Explicit price per cost class.
    PerClass(HashMap<CostClass, Cost>),
    /// Explicit price per move.
    PerMove(HashMap<Move, Cost>),
}

impl CostFunction {
    /// Standard table with the log/model unit replaced.
    pub fn with_unit(unit: Cost) -> Self {
        CostFunction::PerClass(HashMap::from([
            (CostClass::Log, unit),
            (CostClass::Model, unit),
            (CostClass::Indecisive, DEFAULT_INDECISIVE_COST),
            (CostClass::Synchronous, DEFAULT_SYNCHRONOUS_COST),
        ]))
    }

    /// Price of `mv`; `transition` only names the culprit on a miss.
    pub fn cost_of(&self, transition: &str, mv: &Move) -> Result<Cost, AlignError> {
        let found = match self {
            CostFunction::Standard => Some(CostClass::of(mv).default_cost()),
            CostFunction::PerClass(table) => table.get(&CostClass::of(mv)).copied(),
            CostFunction::PerMove(table) => table.get(mv).copied(),
        };
        found.ok_or_else(|| AlignError::invalid_move(transition, MoveDefect::MissingCost))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_costs() {
        let cf = CostFunction::Standard;
        assert_eq!(cf.cost_of("t", &Move::synchronous("a")).unwrap(), 0);
        assert_eq!(cf.cost_of("t", &Move::log_move("a")).unwrap(), 10);
        assert_eq!(cf.cost_of("t", &Move::model_move("a")).unwrap(), 10);
        assert_eq!(cf.cost_of("t", &Move::silent_move()).unwrap(), 0);
    }

    #[test]
    fn missing_class_is_an_error() {
        let cf = CostFunction::PerClass(HashMap::from([(CostClass::Log, 3)]));
        assert_eq!(cf.cost_of("t", &Move::log_move("a")).unwrap(), 3);
        let err = cf.cost_of("sync_a", &Move::synchronous("a")).unwrap_err();
        assert_eq!(
            err,
            AlignError::InvalidMove {
                transition: "sync_a".into(),
                reason: MoveDefect::MissingCost
            }
        );
    }

    #[test]
    fn per_move_lookup() {
        let cf = CostFunction::PerMove(HashMap::from([(Move::log_move("x"), 4)]));
        assert_eq!(cf.cost_of("t", &Move::log_move("x")).unwrap(), 4);
        assert!(cf.cost_of("t", &Move::log_move("y")).is_err());
    }

    #[test]
    fn unit_override_keeps_free_moves_free() {
        let cf = CostFunction::with_unit(1);
        assert_eq!(cf.cost_of("t", &Move::model_move("a")).unwrap(), 1);
        assert_eq!(cf.cost_of("t", &Move::silent_move()).unwrap(), 0);
    }
}
