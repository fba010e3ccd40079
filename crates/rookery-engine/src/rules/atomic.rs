//! Atomic chess.

use super::{CaptureEffect, RuleSet, Variant};
use crate::movegen::{is_in_check, king_attacks};
use crate::{MoveList, Position};
use rookery_core::Piece;

/// Atomic rules.
///
/// A capture explodes the destination: the capturer, the captured piece
/// and every non-pawn piece on an adjacent square leave the board. Kings
/// cannot capture. Blowing up the enemy king wins outright, so a move that
/// does so is legal even when it leaves the mover's king attacked. Kings
/// standing next to each other cannot give check.
#[derive(Debug, Clone, Copy, Default)]
pub struct Atomic;

impl RuleSet for Atomic {
    fn variant(&self) -> Variant {
        Variant::Atomic
    }

    fn is_legal_position(&self, position: &Position) -> bool {
        let mover = position.side_to_move().opposite();
        let Some(own_king) = position.king_square(mover) else {
            return false;
        };
        let Some(enemy_king) = position.king_square(mover.opposite()) else {
            return true;
        };
        king_attacks(own_king).contains(enemy_king) || !is_in_check(position, mover)
    }

    fn filter_legal_moves(&self, _position: &Position, moves: &mut MoveList) {
        moves.retain(|m| !(m.piece() == Piece::King && m.is_capture()));
    }

    fn filters_moves(&self) -> bool {
        true
    }

    fn capture_effect(&self) -> CaptureEffect {
        CaptureEffect::Explode
    }
}
