//! Attack and move sets for every piece kind.
//!
//! Knights and kings read from precomputed offset tables. Sliders use
//! set-wise ray casting: each ray advances one step at a time through empty
//! squares and stops on (and includes) the first occupied square, whatever
//! its color. Callers mask the result with the squares not occupied by the
//! mover, which leaves an enemy blocker in and takes a friendly one out.
//! Pawn pushes and captures work on whole pawn sets at once and take the
//! color as a parameter.

use crate::bitboard::Direction;
use crate::Bitboard;
use rookery_core::{Color, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Precomputed knight attack tables.
const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_OFFSETS);

/// Precomputed king attack tables.
const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_OFFSETS);

/// Precomputed pawn attack tables [color][square].
const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(1, 1), (1, -1)]),
    leaper_table(&[(-1, 1), (-1, -1)]),
];

/// Builds a table from (rank, file) offsets, discarding off-board targets.
const fn leaper_table(offsets: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0i8;
    while sq < 64 {
        let rank = sq / 8;
        let file = sq % 8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < offsets.len() {
            let r = rank + offsets[i].0;
            let f = file + offsets[i].1;
            if r >= 0 && r < 8 && f >= 0 && f < 8 {
                bits |= 1u64 << (r * 8 + f);
            }
            i += 1;
        }
        table[sq as usize] = Bitboard(bits);
        sq += 1;
    }
    table
}

/// Returns knight attacks from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    KNIGHT_ATTACKS[sq.index() as usize]
}

/// Returns king attacks from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    KING_ATTACKS[sq.index() as usize]
}

/// Returns the squares a pawn of `color` on `sq` attacks.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    PAWN_ATTACKS[color.index()][sq.index() as usize]
}

/// Casts one ray from `from` through `empty` squares. The first non-empty
/// square reached is included.
#[inline]
fn cast(from: Bitboard, direction: Direction, empty: Bitboard) -> Bitboard {
    let mut reach = Bitboard::EMPTY;
    let mut ray = from.shift(direction);
    while ray.is_not_empty() {
        reach |= ray;
        ray = (ray & empty).shift(direction);
    }
    reach
}

/// Bishop-style moves from `sq`, stopping at the first blocker on each
/// diagonal.
pub fn diagonal_moves(sq: Square, empty: Bitboard) -> Bitboard {
    let from = Bitboard::from_square(sq);
    let mut moves = Bitboard::EMPTY;
    for direction in Direction::DIAGONAL {
        moves |= cast(from, direction, empty);
    }
    moves
}

/// Rook-style moves from `sq`, stopping at the first blocker on each rank
/// and file.
pub fn orthogonal_moves(sq: Square, empty: Bitboard) -> Bitboard {
    let from = Bitboard::from_square(sq);
    let mut moves = Bitboard::EMPTY;
    for direction in Direction::ORTHOGONAL {
        moves |= cast(from, direction, empty);
    }
    moves
}

/// Bishop attacks given the occupied squares.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    diagonal_moves(sq, !occupied)
}

/// Rook attacks given the occupied squares.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    orthogonal_moves(sq, !occupied)
}

/// Queen attacks given the occupied squares.
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    bishop_attacks(sq, occupied) | rook_attacks(sq, occupied)
}

#[inline]
fn forward(pawns: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => pawns.north(),
        Color::Black => pawns.south(),
    }
}

/// Destinations of single pushes for every pawn in `pawns`.
pub fn pawn_single_push(pawns: Bitboard, color: Color, empty: Bitboard) -> Bitboard {
    forward(pawns, color) & empty
}

/// Destinations of double pushes: pawns on their starting rank with both
/// squares ahead empty.
pub fn pawn_double_push(pawns: Bitboard, color: Color, empty: Bitboard) -> Bitboard {
    let start = match color {
        Color::White => Bitboard::RANK_2,
        Color::Black => Bitboard::RANK_7,
    };
    let first = pawn_single_push(pawns & start, color, empty);
    pawn_single_push(first, color, empty)
}

/// Capture destinations of `pawns` that land on `targets`.
pub fn pawn_captures(pawns: Bitboard, color: Color, targets: Bitboard) -> Bitboard {
    let ahead = forward(pawns, color);
    (ahead.east() | ahead.west()) & targets
}

/// En passant capture destinations. Empty unless an en passant target is
/// set and the enemy pawn that skipped over it sits directly beyond it.
pub fn pawn_ep_captures(
    pawns: Bitboard,
    color: Color,
    enemy_pawns: Bitboard,
    ep_square: Option<Square>,
) -> Bitboard {
    let Some(ep) = ep_square else {
        return Bitboard::EMPTY;
    };
    let target = Bitboard::from_square(ep);
    let double_pushed = match color {
        Color::White => target.south(),
        Color::Black => target.north(),
    };
    if (double_pushed & enemy_pawns).is_empty() {
        return Bitboard::EMPTY;
    }
    pawn_captures(pawns, color, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rookery_core::{File, Rank};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn bb(squares: &[&str]) -> Bitboard {
        squares
            .iter()
            .fold(Bitboard::EMPTY, |acc, s| acc | Bitboard::from_square(sq(s)))
    }

    #[test]
    fn knight_attack_counts() {
        assert_eq!(knight_attacks(Square::new(File::D, Rank::R4)).count(), 8);
        assert_eq!(knight_attacks(Square::A1).count(), 2);
        assert_eq!(knight_attacks(Square::new(File::A, Rank::R4)).count(), 4);
    }

    #[test]
    fn king_attack_counts() {
        assert_eq!(king_attacks(Square::new(File::D, Rank::R4)).count(), 8);
        assert_eq!(king_attacks(Square::A1).count(), 3);
        assert_eq!(king_attacks(Square::new(File::A, Rank::R4)).count(), 5);
    }

    #[test]
    fn knight_specific_squares() {
        let attacks = knight_attacks(Square::E4);
        assert_eq!(
            attacks,
            bb(&["d6", "f6", "g5", "g3", "f2", "d2", "c3", "c5"])
        );
    }

    #[test]
    fn pawn_attack_tables() {
        let d4 = sq("d4");
        assert_eq!(pawn_attacks(d4, Color::White), bb(&["c5", "e5"]));
        assert_eq!(pawn_attacks(d4, Color::Black), bb(&["c3", "e3"]));
        assert_eq!(pawn_attacks(sq("a4"), Color::White), bb(&["b5"]));
        assert!(pawn_attacks(sq("d8"), Color::White).is_empty());
    }

    #[test]
    fn rook_stops_at_first_blocker() {
        let occupied = bb(&["d6", "f4", "d2"]);
        let attacks = rook_attacks(sq("d4"), occupied);
        assert_eq!(
            attacks,
            bb(&["d5", "d6", "e4", "f4", "d3", "d2", "c4", "b4", "a4"])
        );
    }

    #[test]
    fn bishop_on_empty_board() {
        assert_eq!(bishop_attacks(Square::A1, Bitboard::EMPTY).count(), 7);
        assert_eq!(bishop_attacks(sq("d4"), Bitboard::EMPTY).count(), 13);
        assert_eq!(queen_attacks(sq("d4"), Bitboard::EMPTY).count(), 27);
    }

    #[test]
    fn sliders_do_not_wrap_edges() {
        let attacks = rook_attacks(Square::H1, Bitboard::EMPTY);
        assert!(!attacks.contains(sq("a2")));
        assert_eq!(attacks.count(), 14);
        let diag = bishop_attacks(sq("h4"), Bitboard::EMPTY);
        assert!(!diag.contains(sq("a4")));
        assert_eq!(diag.count(), 7);
    }

    #[test]
    fn pawn_pushes_by_color() {
        let start = Bitboard::RANK_2 | Bitboard::RANK_7;
        let empty = !start;
        assert_eq!(
            pawn_single_push(Bitboard::RANK_2, Color::White, empty),
            Bitboard::RANK_3
        );
        assert_eq!(
            pawn_double_push(Bitboard::RANK_2, Color::White, empty),
            Bitboard::rank(Rank::R4)
        );
        assert_eq!(
            pawn_double_push(Bitboard::RANK_7, Color::Black, empty),
            Bitboard::rank(Rank::R5)
        );
    }

    #[test]
    fn double_push_needs_both_squares_empty() {
        let pawns = bb(&["e2", "d2"]);
        let empty = !(pawns | bb(&["e3", "d4"]));
        assert!(pawn_double_push(pawns, Color::White, empty).is_empty());
        assert_eq!(pawn_single_push(pawns, Color::White, empty), bb(&["d3"]));
    }

    #[test]
    fn pawn_captures_by_color() {
        let targets = bb(&["d5", "f5", "d3"]);
        assert_eq!(
            pawn_captures(bb(&["e4"]), Color::White, targets),
            bb(&["d5", "f5"])
        );
        assert_eq!(
            pawn_captures(bb(&["e4"]), Color::Black, targets),
            bb(&["d3"])
        );
        assert!(pawn_captures(bb(&["a4"]), Color::White, bb(&["h5"])).is_empty());
    }

    #[test]
    fn en_passant_requires_pawn_beyond_target() {
        let white = bb(&["e5"]);
        let enemy = bb(&["d5"]);
        assert_eq!(
            pawn_ep_captures(white, Color::White, enemy, Some(sq("d6"))),
            bb(&["d6"])
        );
        assert!(pawn_ep_captures(white, Color::White, Bitboard::EMPTY, Some(sq("d6"))).is_empty());
        assert!(pawn_ep_captures(white, Color::White, enemy, None).is_empty());
        assert_eq!(
            pawn_ep_captures(bb(&["c4"]), Color::Black, bb(&["d4"]), Some(sq("d3"))),
            bb(&["d3"])
        );
    }
}
