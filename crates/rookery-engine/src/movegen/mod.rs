//! Move generation.
//!
//! Generation is pseudo-legal: moves obey piece movement and blocking but
//! may leave the mover's king attacked. [`legal_moves`] then probes each
//! candidate by applying it, asking the position's rule set whether the
//! result is legal, and rolling it back, before handing the survivors to the
//! rule set's post-filter.
//!
//! Pieces are visited queen, knight, bishop, rook, pawn, king, then drops.
//! Captures and promotions land in the high-priority half of the
//! [`MoveList`] and everything else in the low half, each half keeping
//! generation order.

mod attacks;
pub mod perft;

use std::sync::Arc;

use crate::{Bitboard, Position};
use rookery_core::{CastleSide, Color, Move, Piece, Square};

pub use attacks::{
    bishop_attacks, diagonal_moves, king_attacks, knight_attacks, orthogonal_moves,
    pawn_attacks, pawn_captures, pawn_double_push, pawn_ep_captures, pawn_single_push,
    queen_attacks, rook_attacks,
};

/// Moves split into a high-priority group (captures and promotions) and a
/// low-priority group, each in insertion order. Indexing and iteration see
/// the high group first.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MoveList {
    high: Vec<Move>,
    low: Vec<Move>,
}

impl MoveList {
    /// Typical upper bound for one side's moves.
    const CAPACITY: usize = 64;

    /// Creates an empty move list.
    pub fn new() -> Self {
        MoveList {
            high: Vec::with_capacity(16),
            low: Vec::with_capacity(Self::CAPACITY),
        }
    }

    /// Adds a move to the group its characteristic calls for.
    #[inline]
    pub fn push(&mut self, m: Move) {
        if m.is_high_priority() {
            self.high.push(m);
        } else {
            self.low.push(m);
        }
    }

    #[inline]
    pub fn push_high(&mut self, m: Move) {
        self.high.push(m);
    }

    #[inline]
    pub fn push_low(&mut self, m: Move) {
        self.low.push(m);
    }

    /// Returns the number of moves.
    #[inline]
    pub fn len(&self) -> usize {
        self.high.len() + self.low.len()
    }

    /// Returns true if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.high.is_empty() && self.low.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        match index.checked_sub(self.high.len()) {
            None => self.high.get(index),
            Some(i) => self.low.get(i),
        }
    }

    #[inline]
    pub fn high(&self) -> &[Move] {
        &self.high
    }

    #[inline]
    pub fn low(&self) -> &[Move] {
        &self.low
    }

    pub fn contains(&self, m: &Move) -> bool {
        self.high.contains(m) || self.low.contains(m)
    }

    pub fn iter(&self) -> std::iter::Chain<std::slice::Iter<'_, Move>, std::slice::Iter<'_, Move>> {
        self.high.iter().chain(self.low.iter())
    }

    pub fn to_vec(&self) -> Vec<Move> {
        self.iter().copied().collect()
    }

    /// Removes and returns the move at `index`. Later moves shift down by
    /// one, so a caller scanning forward re-examines the same index next.
    pub fn remove(&mut self, index: usize) -> Option<Move> {
        match index.checked_sub(self.high.len()) {
            None => Some(self.high.remove(index)),
            Some(i) if i < self.low.len() => Some(self.low.remove(i)),
            Some(_) => None,
        }
    }

    pub fn remove_high(&mut self, index: usize) -> Option<Move> {
        (index < self.high.len()).then(|| self.high.remove(index))
    }

    pub fn remove_low(&mut self, index: usize) -> Option<Move> {
        (index < self.low.len()).then(|| self.low.remove(index))
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        self.high.retain(&mut f);
        self.low.retain(&mut f);
    }

    /// Clears the move list.
    pub fn clear(&mut self) {
        self.high.clear();
        self.low.clear();
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        match index.checked_sub(self.high.len()) {
            None => &self.high[index],
            Some(i) => &self.low[i],
        }
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::iter::Chain<std::slice::Iter<'a, Move>, std::slice::Iter<'a, Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for MoveList {
    type Item = Move;
    type IntoIter = std::iter::Chain<std::vec::IntoIter<Move>, std::vec::IntoIter<Move>>;

    fn into_iter(self) -> Self::IntoIter {
        self.high.into_iter().chain(self.low)
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Generates every pseudo-legal move for the side to move.
pub fn pseudo_legal_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();

    for piece in [Piece::Queen, Piece::Knight, Piece::Bishop, Piece::Rook] {
        generate_piece_moves(position, piece, &mut moves);
    }
    generate_pawn_moves(position, &mut moves);
    generate_castling_moves(position, &mut moves);
    generate_piece_moves(position, Piece::King, &mut moves);
    if position.rules.allows_drops() {
        generate_drops(position, &mut moves);
    }

    moves
}

/// Generates all legal moves for the side to move.
///
/// The position is mutated while candidates are probed and is back in its
/// original state on return.
pub fn legal_moves(position: &mut Position) -> MoveList {
    let mut moves = pseudo_legal_moves(position);
    moves.retain(|m| position.is_legal_move(*m));
    let rules = Arc::clone(&position.rules);
    rules.filter_legal_moves(position, &mut moves);
    moves
}

/// Squares attacked by a piece of the given kind on `sq`.
#[inline]
fn piece_attacks(piece: Piece, sq: Square, occupied: Bitboard) -> Bitboard {
    match piece {
        Piece::Knight => knight_attacks(sq),
        Piece::Bishop => bishop_attacks(sq, occupied),
        Piece::Rook => rook_attacks(sq, occupied),
        Piece::Queen => queen_attacks(sq, occupied),
        Piece::King => king_attacks(sq),
        Piece::Pawn => Bitboard::EMPTY,
    }
}

/// An ordinary move or capture, reading the captured piece off the board.
#[inline]
fn board_move(position: &Position, from: Square, to: Square, piece: Piece) -> Move {
    let us = position.side_to_move;
    let capture = position.piece_at(to).map(|(p, _)| p);
    Move::new(from, to, piece, us, capture).with_capture_promoted(position.is_promoted(to))
}

fn generate_piece_moves(position: &Position, piece: Piece, moves: &mut MoveList) {
    let us = position.side_to_move;
    for from in position.pieces(us, piece) {
        let targets = piece_attacks(piece, from, position.occupied) & position.not_to_move;
        for to in targets {
            moves.push(board_move(position, from, to, piece));
        }
    }
}

fn push_promotions(position: &Position, from: Square, to: Square, moves: &mut MoveList) {
    let us = position.side_to_move;
    let capture = position.piece_at(to).map(|(p, _)| p);
    for promotion in Piece::PROMOTIONS {
        moves.push_high(
            Move::promote(from, to, us, capture, promotion)
                .with_capture_promoted(position.is_promoted(to)),
        );
    }
}

fn generate_pawn_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    let them = us.opposite();
    let enemy_pawns = position.pieces(them, Piece::Pawn);
    let enemies = position.colors[them.index()];
    let last_rank = us.promotion_rank();

    for from in position.pieces(us, Piece::Pawn) {
        let pawn = Bitboard::from_square(from);

        for to in pawn_ep_captures(pawn, us, enemy_pawns, position.en_passant) {
            moves.push_high(Move::en_passant(from, to, us));
        }

        for to in pawn_captures(pawn, us, enemies) {
            if to.rank() == last_rank {
                push_promotions(position, from, to, moves);
            } else {
                moves.push_high(board_move(position, from, to, Piece::Pawn));
            }
        }

        for to in pawn_single_push(pawn, us, position.empty) {
            if to.rank() == last_rank {
                push_promotions(position, from, to, moves);
            } else {
                moves.push_low(Move::new(from, to, Piece::Pawn, us, None));
            }
        }

        for to in pawn_double_push(pawn, us, position.empty) {
            if let Some(skipped) = from.offset(us.pawn_push_delta()) {
                moves.push_low(Move::double_push(from, to, us, skipped));
            }
        }
    }
}

/// Castling moves. The king's destination is left to the legality probe;
/// the squares it starts on and crosses must not be attacked here.
fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    let them = us.opposite();
    for side in CastleSide::ALL {
        if !position.castling.has(us, side) {
            continue;
        }
        let path = position.castle_path(us, side);
        if position.piece_at(path.king_from) != Some((Piece::King, us))
            || position.piece_at(path.rook_from) != Some((Piece::Rook, us))
        {
            continue;
        }

        let castlers = Bitboard::from_square(path.king_from) | Bitboard::from_square(path.rook_from);
        let must_be_empty = (Bitboard::span_on_rank(path.king_from, path.king_to)
            | Bitboard::span_on_rank(path.rook_from, path.rook_to))
            & !castlers;
        if (must_be_empty & position.occupied).is_not_empty() {
            continue;
        }

        let king_walk = (Bitboard::span_on_rank(path.king_from, path.king_to)
            & !Bitboard::from_square(path.king_to))
            | Bitboard::from_square(path.king_from);
        if king_walk
            .into_iter()
            .any(|sq| is_square_attacked(position, sq, them))
        {
            continue;
        }

        moves.push_low(Move::castle(
            path.king_from,
            path.king_to,
            us,
            side == CastleSide::Kingside,
        ));
    }
}

fn generate_drops(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move;
    for piece in Piece::DROPPABLE {
        if position.drop_count(us, piece) == 0 {
            continue;
        }
        let mut targets = position.empty;
        if piece == Piece::Pawn {
            targets &= !Bitboard::BACK_RANKS;
        }
        for to in targets {
            moves.push_low(Move::drop(piece, to, us));
        }
    }
}

/// True when any piece of color `by` attacks `sq`.
pub fn is_square_attacked(position: &Position, sq: Square, by: Color) -> bool {
    let occupied = position.occupied;
    let theirs = |piece: Piece| position.pieces(by, piece);
    let queens = theirs(Piece::Queen);

    (pawn_attacks(sq, by.opposite()) & theirs(Piece::Pawn)).is_not_empty()
        || (knight_attacks(sq) & theirs(Piece::Knight)).is_not_empty()
        || (king_attacks(sq) & theirs(Piece::King)).is_not_empty()
        || (bishop_attacks(sq, occupied) & (theirs(Piece::Bishop) | queens)).is_not_empty()
        || (rook_attacks(sq, occupied) & (theirs(Piece::Rook) | queens)).is_not_empty()
}

/// True when `color` has a king and it is attacked. A side without a king
/// is never in check.
pub fn is_in_check(position: &Position, color: Color) -> bool {
    position
        .king_square(color)
        .is_some_and(|king| is_square_attacked(position, king, color.opposite()))
}

impl Position {
    /// See [`pseudo_legal_moves`].
    pub fn pseudo_legal_moves(&self) -> MoveList {
        pseudo_legal_moves(self)
    }

    /// See [`legal_moves`].
    pub fn legal_moves(&mut self) -> MoveList {
        legal_moves(self)
    }

    /// Applies `mv` without annotation, asks the rule set about the result,
    /// and rolls back.
    pub(crate) fn is_legal_move(&mut self, mv: Move) -> bool {
        self.apply(mv, false);
        let legal = self.rules.is_legal_position(self);
        self.undo();
        legal
    }

    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        is_square_attacked(self, sq, by)
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check(self, color)
    }

    /// The side to move is in check and has no legal move.
    pub fn is_checkmate(&mut self) -> bool {
        self.is_in_check(self.side_to_move) && self.legal_moves().is_empty()
    }

    /// The side to move is not in check and has no legal move.
    pub fn is_stalemate(&mut self) -> bool {
        !self.is_in_check(self.side_to_move) && self.legal_moves().is_empty()
    }
}
