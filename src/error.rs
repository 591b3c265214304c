//! Error type shared by product construction, configuration and search.

use std::fmt;

use thiserror::Error;

/// Why a product transition was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDefect {
    /// Both the log and the model side are `>>`.
    BothSkip,
    /// The log side is silent; only model transitions can be silent.
    SilentLogSide,
    /// The cost function has no entry for this transition or its class.
    MissingCost,
}

impl fmt::Display for MoveDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MoveDefect::BothSkip => "both sides are skip",
            MoveDefect::SilentLogSide => "log side cannot be silent",
            MoveDefect::MissingCost => "no cost assigned",
        };
        f.write_str(text)
    }
}

/// Errors surfaced by the alignment pipeline.
///
/// [`AlignError::SearchExhausted`] is the regular "no alignment exists"
/// outcome, not a fault; use [`AlignError::is_no_result`] to tell it apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlignError {
    /// A product transition carries an unusable move or has no cost.
    #[error("invalid move on transition '{transition}': {reason}")]
    InvalidMove {
        /// Name of the offending product transition.
        transition: String,
        /// What is wrong with it.
        reason: MoveDefect,
    },

    /// The execution variant or the supplied collaborators do not fit together.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The open set ran dry (or the expansion limit was hit) without reaching
    /// the final marking.
    #[error("search exhausted after {expanded} expansions without reaching the final marking")]
    SearchExhausted {
        /// Number of nodes expanded before giving up.
        expanded: usize,
        /// `true` when a caller-imposed expansion limit stopped the search.
        limit_reached: bool,
    },
}

impl AlignError {
    pub(crate) fn invalid_move(transition: impl Into<String>, reason: MoveDefect) -> Self {
        Self::InvalidMove {
            transition: transition.into(),
            reason,
        }
    }

    pub(crate) fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// `true` for the non-fatal "no alignment exists" outcome.
    pub fn is_no_result(&self) -> bool {
        matches!(self, AlignError::SearchExhausted { .. })
    }
}
