//! Standard chess rules.

use super::{RuleSet, Variant};
use crate::{Bitboard, Position};
use rookery_core::{Color, Piece};

/// Standard chess rules (FIDE).
///
/// Uses the default king-safety predicate and no move filter. Adds the
/// insufficient-material test used for automatic draws.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl RuleSet for StandardChess {
    fn variant(&self) -> Variant {
        Variant::Classic
    }

    fn is_insufficient_material(&self, position: &Position) -> bool {
        insufficient_material(position)
    }
}

const LIGHT_SQUARES: Bitboard = Bitboard(0x55AA_55AA_55AA_55AA);

/// K vs K, K+minor vs K, and bishops-only endings with every bishop on one
/// square color.
pub(crate) fn insufficient_material(position: &Position) -> bool {
    let heavy = [Piece::Pawn, Piece::Rook, Piece::Queen];
    if Color::ALL
        .iter()
        .any(|&c| heavy.iter().any(|&p| position.piece_count(c, p) > 0))
    {
        return false;
    }

    let knights: u32 = Color::ALL
        .iter()
        .map(|&c| u32::from(position.piece_count(c, Piece::Knight)))
        .sum();
    let bishops =
        position.pieces(Color::White, Piece::Bishop) | position.pieces(Color::Black, Piece::Bishop);

    match (knights, bishops.count()) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (0, _) => (bishops & LIGHT_SQUARES).is_empty() || bishops.is_subset(LIGHT_SQUARES),
        _ => false,
    }
}
