//! Losers chess.

use super::{retain_compulsory_captures, RuleSet, Variant};
use crate::{MoveList, Position};

/// Losers rules: captures are compulsory, but kings stay royal and castling
/// is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Losers;

impl RuleSet for Losers {
    fn variant(&self) -> Variant {
        Variant::Losers
    }

    fn filter_legal_moves(&self, _position: &Position, moves: &mut MoveList) {
        retain_compulsory_captures(moves);
    }

    fn filters_moves(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_is_forced_but_king_safety_holds() {
        // Bxd5 is the only capture. The pinned knight on e2 cannot take.
        let mut position = Position::from_fen_with_variant(
            "4r1k1/8/8/3p4/8/5B2/4N3/4K3 w - - 0 1",
            Variant::Losers,
        )
        .unwrap();
        let moves = position.legal_moves();
        let lans: Vec<String> = moves.iter().map(|m| m.to_lan()).collect();
        assert_eq!(lans, vec!["f3d5"]);
    }

    #[test]
    fn quiet_moves_when_no_capture() {
        let mut position =
            Position::from_fen_with_variant("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", Variant::Losers)
                .unwrap();
        let moves = position.legal_moves();
        assert!(moves.iter().any(|m| m.is_castling()));
    }
}
