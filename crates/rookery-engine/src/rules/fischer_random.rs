//! Fischer-Random (Chess960).

use super::{RuleSet, Variant};
use rookery_core::Piece;

/// Fischer-Random rules. Play is classic; only the back-rank layout and the
/// castling squares differ, and both live in the position's castle layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FischerRandom;

impl RuleSet for FischerRandom {
    fn variant(&self) -> Variant {
        Variant::FischerRandom
    }

    fn is_insufficient_material(&self, position: &crate::Position) -> bool {
        super::standard::insufficient_material(position)
    }
}

/// Number of distinct starting layouts.
pub const LAYOUT_COUNT: u16 = 960;

/// Index of the classic array `RNBQKBNR`.
pub const STANDARD_INDEX: u16 = 518;

const KNIGHT_PAIRS: [(usize, usize); 10] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 2),
    (1, 3),
    (1, 4),
    (2, 3),
    (2, 4),
    (3, 4),
];

/// The back rank for a Scharnagl index, files a through h.
///
/// Returns `None` for indices outside `0..960`.
pub fn back_rank(index: u16) -> Option<[Piece; 8]> {
    if index >= LAYOUT_COUNT {
        return None;
    }
    let mut rank: [Option<Piece>; 8] = [None; 8];
    let mut n = usize::from(index);

    rank[(n % 4) * 2 + 1] = Some(Piece::Bishop);
    n /= 4;
    rank[(n % 4) * 2] = Some(Piece::Bishop);
    n /= 4;

    place_nth_empty(&mut rank, n % 6, Piece::Queen);
    n /= 6;

    // Both knights are counted among the same five empty files, so place
    // the later one first.
    let (first, second) = KNIGHT_PAIRS[n];
    place_nth_empty(&mut rank, second, Piece::Knight);
    place_nth_empty(&mut rank, first, Piece::Knight);

    for piece in [Piece::Rook, Piece::King, Piece::Rook] {
        place_nth_empty(&mut rank, 0, piece);
    }

    let mut out = [Piece::Pawn; 8];
    for (slot, piece) in out.iter_mut().zip(rank) {
        *slot = piece?;
    }
    Some(out)
}

fn place_nth_empty(rank: &mut [Option<Piece>; 8], nth: usize, piece: Piece) {
    if let Some(slot) = rank.iter_mut().filter(|s| s.is_none()).nth(nth) {
        *slot = Some(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn letters(index: u16) -> String {
        back_rank(index)
            .unwrap()
            .iter()
            .map(|p| p.to_san_char())
            .collect()
    }

    #[test]
    fn known_indices() {
        assert_eq!(letters(STANDARD_INDEX), "RNBQKBNR");
        assert_eq!(letters(0), "BBQNNRKR");
        assert_eq!(letters(959), "RKRNNQBB");
    }

    #[test]
    fn out_of_range() {
        assert!(back_rank(960).is_none());
    }

    #[test]
    fn every_layout_is_distinct_and_valid() {
        let mut seen = HashSet::new();
        for index in 0..LAYOUT_COUNT {
            let rank = back_rank(index).unwrap();
            assert!(seen.insert(rank), "duplicate layout at {index}");

            let files = |p: Piece| -> Vec<usize> {
                (0..8).filter(|&f| rank[f] == p).collect()
            };
            let bishops = files(Piece::Bishop);
            assert_eq!(bishops.len(), 2);
            assert_ne!(bishops[0] % 2, bishops[1] % 2);
            let rooks = files(Piece::Rook);
            let king = files(Piece::King);
            assert_eq!(king.len(), 1);
            assert!(rooks[0] < king[0] && king[0] < rooks[1]);
        }
    }
}
