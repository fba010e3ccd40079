//! Chess position representation.
//!
//! A [`Position`] keeps piece placement in three forms that must agree: a
//! 64-slot board array for point lookups, one bitboard per (color, piece)
//! with the per-color and overall unions derived from them, and a count per
//! (color, piece). [`put`](Position::put) and [`take`](Position::take) are
//! the only writers, and they keep all three in step with the position hash.
//!
//! Everything else a game needs sits next to the placement: castling rights
//! and the home files of the castling pieces, the en passant target, the
//! fifty-move and ply counters, reserves for drop variants, both Zobrist
//! hashes, the repetition table and the move history.

use std::fmt;
use std::sync::Arc;

use arrayvec::ArrayVec;
use rookery_core::{CastleSide, CastlingRights, Color, Fen, File, Move, Piece, Rank, Square};

use crate::error::InvariantViolation;
use crate::repetition::RepetitionTable;
use crate::rules::{RuleSet, Variant};
use crate::zobrist::ZobristKeys;
use crate::Bitboard;

/// A piece removed by an explosion: its square, kind, color and promoted
/// flag.
pub(crate) type Casualty = (Square, Piece, Color, bool);

/// Everything one explosion removed besides the captured piece. At most the
/// capturer plus eight neighbours.
pub(crate) type Blast = ArrayVec<Casualty, 9>;

/// Home files of the castling pieces for one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CastleLayout {
    pub king: File,
    pub kingside_rook: File,
    pub queenside_rook: File,
}

impl CastleLayout {
    /// King on e, rooks on a and h.
    pub const STANDARD: CastleLayout = CastleLayout {
        king: File::E,
        kingside_rook: File::H,
        queenside_rook: File::A,
    };

    #[inline]
    pub const fn rook(self, side: CastleSide) -> File {
        match side {
            CastleSide::Kingside => self.kingside_rook,
            CastleSide::Queenside => self.queenside_rook,
        }
    }
}

impl Default for CastleLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// The four squares involved in one castling move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastlePath {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

/// Complete game state, mutated in place by move application and rollback.
///
/// A position is single-threaded. Use [`deep_copy`](Position::deep_copy) to
/// hand an independent instance to another thread.
#[derive(Clone)]
pub struct Position {
    pub(crate) board: [Option<(Piece, Color)>; 64],
    /// Bitboards indexed by [color][piece].
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) colors: [Bitboard; 2],
    pub(crate) occupied: Bitboard,
    pub(crate) empty: Bitboard,
    /// Every square not holding a piece of the side to move.
    pub(crate) not_to_move: Bitboard,
    /// Squares holding a piece that started life as a pawn.
    pub(crate) promoted: Bitboard,
    pub(crate) piece_counts: [[u8; 6]; 2],
    pub(crate) drop_counts: [[u8; 6]; 2],
    pub(crate) castling: CastlingRights,
    pub(crate) castle_layout: [CastleLayout; 2],
    pub(crate) en_passant: Option<Square>,
    /// En passant target at construction, restored when the history empties.
    pub(crate) initial_en_passant: Option<Square>,
    pub(crate) fifty_move_count: u32,
    pub(crate) ply: u32,
    pub(crate) side_to_move: Color,
    pub(crate) position_hash: u64,
    pub(crate) game_hash: u64,
    pub(crate) repetition: Option<RepetitionTable>,
    pub(crate) history: Vec<Move>,
    pub(crate) blasts: Vec<Blast>,
    pub(crate) rules: Arc<dyn RuleSet>,
    pub(crate) keys: Arc<ZobristKeys>,
    pub(crate) annotate_san: bool,
}

#[inline]
const fn slot(sq: Square) -> usize {
    sq.index() as usize
}

impl Position {
    /// An empty board with White to move and no rights.
    pub(crate) fn empty(
        rules: Arc<dyn RuleSet>,
        keys: Arc<ZobristKeys>,
        repetition: Option<RepetitionTable>,
        annotate_san: bool,
    ) -> Self {
        Position {
            board: [None; 64],
            pieces: [[Bitboard::EMPTY; 6]; 2],
            colors: [Bitboard::EMPTY; 2],
            occupied: Bitboard::EMPTY,
            empty: Bitboard::FULL,
            not_to_move: Bitboard::FULL,
            promoted: Bitboard::EMPTY,
            piece_counts: [[0; 6]; 2],
            drop_counts: [[0; 6]; 2],
            castling: CastlingRights::NONE,
            castle_layout: [CastleLayout::STANDARD; 2],
            en_passant: None,
            initial_en_passant: None,
            fifty_move_count: 0,
            ply: 0,
            side_to_move: Color::White,
            position_hash: 0,
            game_hash: 0,
            repetition,
            history: Vec::new(),
            blasts: Vec::new(),
            rules,
            keys,
            annotate_san,
        }
    }

    /// Places a piece on an empty square.
    pub(crate) fn put(&mut self, sq: Square, piece: Piece, color: Color, promoted: bool) {
        debug_assert!(self.board[slot(sq)].is_none(), "put on occupied {sq}");
        let bit = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] |= bit;
        self.colors[color.index()] |= bit;
        self.occupied |= bit;
        self.empty ^= bit;
        if promoted {
            self.promoted |= bit;
        }
        self.board[slot(sq)] = Some((piece, color));
        self.piece_counts[color.index()][piece.index()] += 1;
        self.position_hash ^= self.keys.piece_key(color, piece, sq);
    }

    /// Removes whatever stands on `sq`, returning it with its promoted flag.
    pub(crate) fn take(&mut self, sq: Square) -> Option<(Piece, Color, bool)> {
        let (piece, color) = self.board[slot(sq)].take()?;
        let bit = Bitboard::from_square(sq);
        self.pieces[color.index()][piece.index()] ^= bit;
        self.colors[color.index()] ^= bit;
        self.occupied ^= bit;
        self.empty |= bit;
        let promoted = self.promoted.contains(sq);
        self.promoted &= !bit;
        self.piece_counts[color.index()][piece.index()] -= 1;
        self.position_hash ^= self.keys.piece_key(color, piece, sq);
        Some((piece, color, promoted))
    }

    pub(crate) fn refresh_not_to_move(&mut self) {
        self.not_to_move = !self.colors[self.side_to_move.index()];
    }

    pub(crate) fn refresh_game_hash(&mut self) {
        self.game_hash = self.position_hash
            ^ self
                .keys
                .state_key(self.side_to_move, self.castling, self.en_passant);
    }

    /// Drops every castling right whose king or rook no longer stands on its
    /// home square.
    pub(crate) fn revoke_vacated_rights(&mut self) {
        for color in Color::ALL {
            if self.castling.for_color(color) == 0 {
                continue;
            }
            let layout = self.castle_layout[color.index()];
            let rank = color.back_rank();
            let king_home =
                self.board[slot(Square::new(layout.king, rank))] == Some((Piece::King, color));
            for side in CastleSide::ALL {
                let rook_home = self.board[slot(Square::new(layout.rook(side), rank))]
                    == Some((Piece::Rook, color));
                if self.castling.has(color, side) && !(king_home && rook_home) {
                    self.castling.revoke(color, side);
                }
            }
        }
    }

    /// Position hash recomputed from the board.
    pub fn compute_position_hash(&self) -> u64 {
        Square::all()
            .filter_map(|sq| {
                self.board[slot(sq)].map(|(piece, color)| self.keys.piece_key(color, piece, sq))
            })
            .fold(0, |acc, key| acc ^ key)
    }

    /// Game hash recomputed from the board, side, castling and en passant.
    pub fn compute_game_hash(&self) -> u64 {
        self.compute_position_hash()
            ^ self
                .keys
                .state_key(self.side_to_move, self.castling, self.en_passant)
    }

    /// Returns the piece and color on a square.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<(Piece, Color)> {
        self.board[slot(sq)]
    }

    /// True when the piece on `sq` is a promoted pawn.
    #[inline]
    pub fn is_promoted(&self, sq: Square) -> bool {
        self.promoted.contains(sq)
    }

    /// Marks or clears the promoted flag of the piece on `sq`. Used when a
    /// setup (such as a bughouse board) records promotions FEN cannot carry.
    pub fn set_promoted(&mut self, sq: Square, promoted: bool) {
        if self.board[slot(sq)].is_none() {
            return;
        }
        if promoted {
            self.promoted.set(sq);
        } else {
            self.promoted.clear(sq);
        }
    }

    /// Returns the bitboard for pieces of the given color and type.
    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.pieces[color.index()][piece.index()]
    }

    /// Returns all pieces of the given color.
    #[inline]
    pub fn color_bitboard(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.occupied
    }

    #[inline]
    pub fn empty_squares(&self) -> Bitboard {
        self.empty
    }

    #[inline]
    pub fn not_to_move(&self) -> Bitboard {
        self.not_to_move
    }

    #[inline]
    pub fn promoted_bitboard(&self) -> Bitboard {
        self.promoted
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn castle_layout(&self, color: Color) -> CastleLayout {
        self.castle_layout[color.index()]
    }

    /// King and rook squares for castling on `side`.
    pub fn castle_path(&self, color: Color, side: CastleSide) -> CastlePath {
        let layout = self.castle_layout[color.index()];
        let rank = color.back_rank();
        let (king_to, rook_to) = match side {
            CastleSide::Kingside => (File::G, File::F),
            CastleSide::Queenside => (File::C, File::D),
        };
        CastlePath {
            king_from: Square::new(layout.king, rank),
            king_to: Square::new(king_to, rank),
            rook_from: Square::new(layout.rook(side), rank),
            rook_to: Square::new(rook_to, rank),
        }
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    /// Halfmove clock for the fifty-move rule.
    #[inline]
    pub fn fifty_move_count(&self) -> u32 {
        self.fifty_move_count
    }

    /// Half-moves since the start of the game, including moves before a FEN
    /// setup.
    #[inline]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.ply / 2 + 1
    }

    #[inline]
    pub fn position_hash(&self) -> u64 {
        self.position_hash
    }

    #[inline]
    pub fn game_hash(&self) -> u64 {
        self.game_hash
    }

    /// Times the current placement has been reached on this line. Zero when
    /// the position was copied without its repetition table.
    pub fn repetition_count(&self) -> u16 {
        self.repetition
            .as_ref()
            .map_or(0, |table| table.count(self.position_hash))
    }

    /// Applied moves, oldest first.
    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    #[inline]
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.rules.variant()
    }

    #[inline]
    pub fn rules(&self) -> &dyn RuleSet {
        self.rules.as_ref()
    }

    /// Number of `piece`s of `color` on the board.
    #[inline]
    pub fn piece_count(&self, color: Color, piece: Piece) -> u8 {
        self.piece_counts[color.index()][piece.index()]
    }

    /// Number of `piece`s `color` holds in reserve.
    #[inline]
    pub fn drop_count(&self, color: Color, piece: Piece) -> u8 {
        self.drop_counts[color.index()][piece.index()]
    }

    /// Sets a reserve count. Bughouse boards receive their partner's
    /// captures this way.
    pub fn set_drop_count(&mut self, color: Color, piece: Piece, count: u8) {
        self.drop_counts[color.index()][piece.index()] = count;
    }

    /// True when moves are annotated with SAN as they are applied.
    #[inline]
    pub fn annotates_san(&self) -> bool {
        self.annotate_san
    }

    pub fn set_annotate_san(&mut self, annotate: bool) {
        self.annotate_san = annotate;
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces(color, Piece::King).lsb()
    }

    /// The king square, for queries that make no sense without a king.
    pub fn king_square_checked(&self, color: Color) -> Result<Square, InvariantViolation> {
        self.king_square(color)
            .ok_or(InvariantViolation::MissingKing(color))
    }

    #[inline]
    pub fn both_kings_on_board(&self) -> bool {
        Color::ALL
            .iter()
            .all(|&c| self.pieces(c, Piece::King).is_not_empty())
    }

    /// An independent copy. Without the repetition table the copy is cheaper
    /// and reports a repetition count of zero.
    pub fn deep_copy(&self, include_repetition: bool) -> Position {
        Position {
            board: self.board,
            pieces: self.pieces,
            colors: self.colors,
            occupied: self.occupied,
            empty: self.empty,
            not_to_move: self.not_to_move,
            promoted: self.promoted,
            piece_counts: self.piece_counts,
            drop_counts: self.drop_counts,
            castling: self.castling,
            castle_layout: self.castle_layout,
            en_passant: self.en_passant,
            initial_en_passant: self.initial_en_passant,
            fifty_move_count: self.fifty_move_count,
            ply: self.ply,
            side_to_move: self.side_to_move,
            position_hash: self.position_hash,
            game_hash: self.game_hash,
            repetition: if include_repetition {
                self.repetition.clone()
            } else {
                None
            },
            history: self.history.clone(),
            blasts: self.blasts.clone(),
            rules: Arc::clone(&self.rules),
            keys: Arc::clone(&self.keys),
            annotate_san: self.annotate_san,
        }
    }

    /// The position as a FEN record. Drop variants carry their reserves as
    /// holdings.
    pub fn fen_record(&self) -> Fen {
        let pieces = Square::all()
            .filter_map(|sq| self.board[slot(sq)].map(|(piece, color)| (sq, piece, color)))
            .collect();
        let holdings = self.rules.allows_drops().then(|| {
            let mut held = Vec::new();
            for color in Color::ALL {
                for piece in Piece::DROPPABLE.into_iter().rev() {
                    for _ in 0..self.drop_count(color, piece) {
                        held.push((piece, color));
                    }
                }
            }
            held
        });
        Fen {
            pieces,
            holdings,
            side_to_move: self.side_to_move,
            castling: self.castling,
            castling_files: Color::ALL.map(|color| self.castling_files(color)),
            en_passant: self.en_passant,
            halfmove_clock: self.fifty_move_count,
            fullmove_number: self.fullmove_number(),
        }
    }

    /// Castling rooks that FEN must name by file: those with a right that
    /// are not the outermost rook on their side of the king.
    fn castling_files(&self, color: Color) -> [Option<File>; 2] {
        let layout = self.castle_layout[color.index()];
        let outermost = self.detect_castle_layout(color);
        CastleSide::ALL.map(|side| {
            (self.castling.has(color, side) && layout.rook(side) != outermost.rook(side))
                .then(|| layout.rook(side))
        })
    }

    /// Converts the position to a FEN string.
    pub fn to_fen(&self) -> String {
        self.fen_record().to_fen()
    }

    /// Verifies that the redundant representations agree.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if (self.occupied | self.empty) != Bitboard::FULL
            || (self.occupied & self.empty).is_not_empty()
        {
            return Err(InvariantViolation::OccupancyMismatch);
        }
        let [white, black] = self.colors;
        if (white & black).is_not_empty() || (white | black) != self.occupied {
            return Err(InvariantViolation::ColorMismatch);
        }
        for color in Color::ALL {
            let mut union = Bitboard::EMPTY;
            let mut total = 0;
            for piece in Piece::ALL {
                let bb = self.pieces(color, piece);
                union |= bb;
                total += bb.count();
                if u32::from(self.piece_count(color, piece)) != bb.count() {
                    return Err(InvariantViolation::CountMismatch(color));
                }
            }
            if union != self.colors[color.index()] || total != union.count() {
                return Err(InvariantViolation::PieceMismatch(color));
            }
        }
        for sq in Square::all() {
            let from_bitboards = Color::ALL.iter().find_map(|&color| {
                Piece::ALL
                    .iter()
                    .find(|&&piece| self.pieces(color, piece).contains(sq))
                    .map(|&piece| (piece, color))
            });
            if from_bitboards != self.board[slot(sq)] {
                return Err(InvariantViolation::BoardMismatch(sq));
            }
        }
        if !self.promoted.is_subset(self.occupied) {
            return Err(InvariantViolation::OccupancyMismatch);
        }
        let recomputed = self.compute_position_hash();
        if recomputed != self.position_hash {
            return Err(InvariantViolation::HashDrift {
                which: "position",
                maintained: self.position_hash,
                recomputed,
            });
        }
        let recomputed = self.compute_game_hash();
        if recomputed != self.game_hash {
            return Err(InvariantViolation::HashDrift {
                which: "game",
                maintained: self.game_hash,
                recomputed,
            });
        }
        if self.not_to_move != !self.colors[self.side_to_move.index()] {
            return Err(InvariantViolation::StaleNotToMove);
        }
        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_fen())
            .field("variant", &self.variant())
            .field("ply", &self.ply)
            .field("position_hash", &format_args!("{:#018x}", self.position_hash))
            .finish()
    }
}

/// Debug dump: the board, FEN, state fields, counts, reserves and hashes.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  +-----------------+")?;
        for rank in Rank::ALL.into_iter().rev() {
            write!(f, "{} |", rank)?;
            for file in File::ALL {
                let c = match self.piece_at(Square::new(file, rank)) {
                    Some((piece, color)) => piece.to_fen_char(color),
                    None => '.',
                };
                write!(f, " {}", c)?;
            }
            writeln!(f, " |")?;
        }
        writeln!(f, "  +-----------------+")?;
        writeln!(f, "    a b c d e f g h")?;
        writeln!(f, "FEN: {}", self.to_fen())?;
        writeln!(
            f,
            "Variant: {}  To move: {}  Ply: {}  Fifty: {}",
            self.variant(),
            self.side_to_move,
            self.ply,
            self.fifty_move_count
        )?;
        let ep = self.en_passant.map_or("-".to_string(), |sq| sq.to_algebraic());
        writeln!(f, "Castling: {}  En passant: {}", self.castling, ep)?;
        for color in Color::ALL {
            write!(f, "{}:", color)?;
            for piece in Piece::ALL {
                write!(f, " {}{}", piece.to_san_char(), self.piece_count(color, piece))?;
            }
            if self.rules.allows_drops() {
                write!(f, "  reserve:")?;
                for piece in Piece::DROPPABLE {
                    write!(f, " {}{}", piece.to_san_char(), self.drop_count(color, piece))?;
                }
            }
            writeln!(f)?;
        }
        write!(
            f,
            "Hashes: position {:#018x} game {:#018x}",
            self.position_hash, self.game_hash
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::StandardChess;

    fn blank() -> Position {
        Position::empty(
            Arc::new(StandardChess),
            ZobristKeys::shared_default(),
            Some(RepetitionTable::new(8)),
            false,
        )
    }

    #[test]
    fn put_and_take_keep_every_view_in_step() {
        let mut position = blank();
        position.put(Square::E4, Piece::Knight, Color::White, false);
        position.put(Square::D5, Piece::Queen, Color::Black, true);
        position.refresh_not_to_move();
        position.refresh_game_hash();
        position.check_invariants().unwrap();
        assert_eq!(position.piece_count(Color::White, Piece::Knight), 1);
        assert!(position.is_promoted(Square::D5));

        assert_eq!(
            position.take(Square::D5),
            Some((Piece::Queen, Color::Black, true))
        );
        assert_eq!(position.take(Square::D5), None);
        position.refresh_game_hash();
        position.check_invariants().unwrap();
        assert!(!position.is_promoted(Square::D5));
    }

    #[test]
    fn put_then_take_restores_hash() {
        let mut position = blank();
        position.put(Square::A1, Piece::Rook, Color::White, false);
        let hash = position.position_hash();
        position.put(Square::H8, Piece::Rook, Color::Black, false);
        assert_ne!(position.position_hash(), hash);
        position.take(Square::H8);
        assert_eq!(position.position_hash(), hash);
    }

    #[test]
    fn startpos_state() {
        let position = Position::startpos();
        assert_eq!(position.to_fen(), Fen::STARTPOS);
        assert_eq!(position.side_to_move(), Color::White);
        assert_eq!(position.castling_rights(), CastlingRights::ALL);
        assert_eq!(position.fullmove_number(), 1);
        assert_eq!(position.occupied().count(), 32);
        assert_eq!(position.piece_count(Color::Black, Piece::Pawn), 8);
        assert_eq!(position.repetition_count(), 1);
        assert_eq!(position.castle_layout(Color::White), CastleLayout::STANDARD);
        position.check_invariants().unwrap();
    }

    #[test]
    fn fen_round_trip() {
        let fens = [
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 b - - 17 42",
        ];
        for fen in fens {
            let position = Position::from_fen(fen).unwrap();
            assert_eq!(position.to_fen(), fen);
            position.check_invariants().unwrap();
        }
    }

    #[test]
    fn fullmove_number_follows_ply() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 7").unwrap();
        assert_eq!(position.ply(), 13);
        assert_eq!(position.fullmove_number(), 7);
    }

    #[test]
    fn castle_paths() {
        let position = Position::startpos();
        let path = position.castle_path(Color::Black, CastleSide::Queenside);
        assert_eq!(path.king_from, Square::E8);
        assert_eq!(path.king_to, Square::C8);
        assert_eq!(path.rook_from, Square::A8);
        assert_eq!(path.rook_to, Square::D8);
    }

    #[test]
    fn missing_king_is_reported() {
        let position = Position::from_fen_with_variant(
            "8/8/8/3p4/4P3/8/8/8 w - - 0 1",
            Variant::Suicide,
        )
        .unwrap();
        assert_eq!(
            position.king_square_checked(Color::White),
            Err(InvariantViolation::MissingKing(Color::White))
        );
        assert!(!position.both_kings_on_board());
    }

    #[test]
    fn deep_copy_without_repetition() {
        let position = Position::startpos();
        let copy = position.deep_copy(false);
        assert_eq!(copy.repetition_count(), 0);
        assert_eq!(copy.to_fen(), position.to_fen());
        assert_eq!(copy.game_hash(), position.game_hash());
        let full = position.deep_copy(true);
        assert_eq!(full.repetition_count(), 1);
    }

    #[test]
    fn corruption_is_detected() {
        let mut position = Position::startpos();
        position.position_hash ^= 1;
        assert!(matches!(
            position.check_invariants(),
            Err(InvariantViolation::HashDrift { which: "position", .. })
        ));

        let mut position = Position::startpos();
        position.piece_counts[0][Piece::Pawn.index()] = 7;
        assert_eq!(
            position.check_invariants(),
            Err(InvariantViolation::CountMismatch(Color::White))
        );

        let mut position = Position::startpos();
        position.board[slot(Square::E4)] = Some((Piece::Pawn, Color::White));
        assert_eq!(
            position.check_invariants(),
            Err(InvariantViolation::BoardMismatch(Square::E4))
        );

        let mut position = Position::startpos();
        position.not_to_move = Bitboard::EMPTY;
        assert_eq!(
            position.check_invariants(),
            Err(InvariantViolation::StaleNotToMove)
        );
    }

    #[test]
    fn crazyhouse_holdings_in_fen() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[Qn] w KQkq - 0 1";
        let position = Position::from_fen_with_variant(fen, Variant::Crazyhouse).unwrap();
        assert_eq!(position.drop_count(Color::White, Piece::Queen), 1);
        assert_eq!(position.drop_count(Color::Black, Piece::Knight), 1);
        assert_eq!(position.to_fen(), fen);
    }

    #[test]
    fn dump_contains_board_and_fen() {
        let dump = Position::startpos().to_string();
        assert!(dump.contains("8 | r n b q k b n r |"));
        assert!(dump.contains(&format!("FEN: {}", Fen::STARTPOS)));
        assert!(dump.contains("Castling: KQkq"));
    }
}
