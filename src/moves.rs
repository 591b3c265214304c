//! Alignment moves and their classification.
//!
//! A move pairs what the log did with what the model did. One side may be
//! skipped (`>>`), never both. Silent model transitions show up as model
//! moves whose model side is τ.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, MoveDefect};

/// Rendering of the skip symbol.
pub const SKIP: &str = ">>";

/// Rendering of a silent model step.
pub const TAU: &str = "\u{03C4}";

/// One side of a move.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveLabel {
    /// This side does not move.
    Skip,
    /// A visible activity label.
    Visible(String),
    /// A silent (τ) model step.
    Silent,
}

impl MoveLabel {
    pub fn visible(label: impl Into<String>) -> Self {
        MoveLabel::Visible(label.into())
    }

    #[inline]
    pub fn is_skip(&self) -> bool {
        matches!(self, MoveLabel::Skip)
    }

    pub fn as_visible(&self) -> Option<&str> {
        match self {
            MoveLabel::Visible(label) => Some(label),
            _ => None,
        }
    }
}

impl fmt::Display for MoveLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveLabel::Skip => f.write_str(SKIP),
            MoveLabel::Visible(label) => f.write_str(label),
            MoveLabel::Silent => f.write_str(TAU),
        }
    }
}

/// Classification of a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    Synchronous,
    Log,
    /// Model-only move, silent ones included.
    Model,
}

/// A `(log, model)` pair labelling one product transition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub log: MoveLabel,
    pub model: MoveLabel,
}

impl Move {
    /// Validate and build a move. `transition` only names the culprit in errors.
    pub fn new(transition: &str, log: MoveLabel, model: MoveLabel) -> Result<Self, AlignError> {
        let mv = Move { log, model };
        mv.validate(transition)?;
        Ok(mv)
    }

    pub fn log_move(label: impl Into<String>) -> Self {
        Move {
            log: MoveLabel::visible(label),
            model: MoveLabel::Skip,
        }
    }

    pub fn model_move(label: impl Into<String>) -> Self {
        Move {
            log: MoveLabel::Skip,
            model: MoveLabel::visible(label),
        }
    }

    pub fn silent_move() -> Self {
        Move {
            log: MoveLabel::Skip,
            model: MoveLabel::Silent,
        }
    }

    pub fn synchronous(label: impl Into<String>) -> Self {
        let label = label.into();
        Move {
            log: MoveLabel::Visible(label.clone()),
            model: MoveLabel::Visible(label),
        }
    }

    pub(crate) fn validate(&self, transition: &str) -> Result<(), AlignError> {
        if self.log.is_skip() && self.model.is_skip() {
            return Err(AlignError::invalid_move(transition, MoveDefect::BothSkip));
        }
        if self.log == MoveLabel::Silent {
            return Err(AlignError::invalid_move(
                transition,
                MoveDefect::SilentLogSide,
            ));
        }
        Ok(())
    }

    pub fn kind(&self) -> MoveKind {
        match (self.log.is_skip(), self.model.is_skip()) {
            (false, false) => MoveKind::Synchronous,
            (false, true) => MoveKind::Log,
            _ => MoveKind::Model,
        }
    }

    /// Model move on a silent transition.
    pub fn is_silent(&self) -> bool {
        self.log.is_skip() && self.model == MoveLabel::Silent
    }

    /// Short label for presentation: τ for silent moves, the log label for
    /// log moves, the model label otherwise.
    pub fn display_label(&self) -> String {
        if self.is_silent() {
            return TAU.to_owned();
        }
        match self.kind() {
            MoveKind::Log => self.log.to_string(),
            MoveKind::Synchronous | MoveKind::Model => self.model.to_string(),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.log, self.model)
    }
}
