//! Suicide chess.

use super::{retain_compulsory_captures, RuleSet, Variant};
use crate::{MoveList, Position};

/// Suicide (antichess) rules.
///
/// Every position is legal: kings are ordinary pieces that may be left
/// attacked or captured. Castling is never allowed, and when any capture is
/// available every non-capture is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Suicide;

impl RuleSet for Suicide {
    fn variant(&self) -> Variant {
        Variant::Suicide
    }

    fn is_legal_position(&self, _position: &Position) -> bool {
        true
    }

    fn filter_legal_moves(&self, _position: &Position, moves: &mut MoveList) {
        moves.retain(|m| !m.is_castling());
        retain_compulsory_captures(moves);
    }

    fn filters_moves(&self) -> bool {
        true
    }

    fn requires_kings(&self) -> bool {
        false
    }
}
