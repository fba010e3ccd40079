//! Error types shared across the engine.
//!
//! User input that does not describe a legal move is a [`MoveRejected`];
//! the position is left exactly as it was. Internal corruption is an
//! [`InvariantViolation`], after which the position should be discarded.

use rookery_core::{Color, FenError, SanError, Square};
use thiserror::Error;

use crate::rules::Variant;

/// Why a move was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The text failed the SAN grammar.
    #[error("malformed move text: {0}")]
    Malformed(#[from] SanError),

    /// The text is well formed but matches no legal move.
    #[error("invalid move")]
    Illegal,

    /// More than one legal move matches.
    #[error("ambiguous move (candidates: {})", .candidates.join(", "))]
    Ambiguous { candidates: Vec<String> },

    /// The operation does not exist in this variant.
    #[error("{operation} is not supported in {variant}")]
    Unsupported {
        operation: &'static str,
        variant: Variant,
    },
}

/// A move the caller asked for could not be applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{reason}: {attempted}\n{position}")]
pub struct MoveRejected {
    pub reason: RejectReason,
    /// The offending input, as given.
    pub attempted: String,
    /// Debug dump of the position at the time of rejection.
    pub position: String,
}

impl MoveRejected {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self.reason, RejectReason::Ambiguous { .. })
    }

    pub fn is_illegal(&self) -> bool {
        matches!(self.reason, RejectReason::Illegal | RejectReason::Malformed(_))
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self.reason, RejectReason::Unsupported { .. })
    }
}

/// Structural corruption of a position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{0} has no king on the board")]
    MissingKing(Color),

    #[error("occupied and empty bitboards are not complements")]
    OccupancyMismatch,

    #[error("color bitboards do not partition the occupied squares")]
    ColorMismatch,

    #[error("{0} piece bitboards do not union to its color bitboard")]
    PieceMismatch(Color),

    #[error("board array disagrees with bitboards on {0}")]
    BoardMismatch(Square),

    #[error("{0} piece counts disagree with the bitboards")]
    CountMismatch(Color),

    #[error("maintained {which} hash {maintained:#018x} differs from recomputed {recomputed:#018x}")]
    HashDrift {
        which: &'static str,
        maintained: u64,
        recomputed: u64,
    },

    #[error("not-to-move bitboard is stale")]
    StaleNotToMove,
}

/// Failure to build a position from a starting layout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("Fischer-Random index {0} is outside 0..960")]
    FischerRandomIndex(u16),

    #[error("{0} has no king on the board")]
    MissingKing(Color),
}
