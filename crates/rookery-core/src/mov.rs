//! Move descriptors.
//!
//! A [`Move`] carries everything needed to apply it and to take it back:
//! the moving and captured pieces, the characteristic, the en-passant square
//! it creates, and (once applied) the castling rights and fifty-move clock
//! that were in force before it.

use std::fmt;
use std::hash::{Hash, Hasher};

use arrayvec::ArrayString;

use crate::{CastlingRights, Color, Piece, Square};

/// Capacity of the inline SAN buffer.
pub const SAN_CAPACITY: usize = 16;

/// Characteristic of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveKind {
    /// Ordinary move or capture.
    Normal = 0,
    /// Pawn double push from its starting rank.
    DoublePawnPush = 1,
    /// En passant capture.
    EnPassant = 2,
    /// Kingside castling (O-O).
    CastleKingside = 3,
    /// Queenside castling (O-O-O).
    CastleQueenside = 4,
    /// Piece placed from reserve.
    Drop = 5,
    /// Pawn promotion, with or without capture.
    Promotion = 6,
}

impl MoveKind {
    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveKind::CastleKingside | MoveKind::CastleQueenside)
    }
}

/// A chess move.
///
/// Two moves compare equal when they describe the same action (color, piece,
/// squares, characteristic and promotion). The undo snapshot and SAN text are
/// bookkeeping and do not take part in equality.
#[derive(Clone, Copy)]
pub struct Move {
    from: Square,
    to: Square,
    piece: Piece,
    color: Color,
    capture: Option<Piece>,
    capture_promoted: bool,
    promotion: Option<Piece>,
    kind: MoveKind,
    ep_square: Option<Square>,
    previous_castling: CastlingRights,
    previous_fifty: u32,
    san: Option<ArrayString<SAN_CAPACITY>>,
}

impl Move {
    const fn build(
        from: Square,
        to: Square,
        piece: Piece,
        color: Color,
        capture: Option<Piece>,
        kind: MoveKind,
    ) -> Self {
        Move {
            from,
            to,
            piece,
            color,
            capture,
            capture_promoted: false,
            promotion: None,
            kind,
            ep_square: None,
            previous_castling: CastlingRights::NONE,
            previous_fifty: 0,
            san: None,
        }
    }

    /// An ordinary move or capture.
    pub const fn new(
        from: Square,
        to: Square,
        piece: Piece,
        color: Color,
        capture: Option<Piece>,
    ) -> Self {
        Self::build(from, to, piece, color, capture, MoveKind::Normal)
    }

    /// A pawn double push; `ep_square` is the skipped square.
    pub const fn double_push(from: Square, to: Square, color: Color, ep_square: Square) -> Self {
        let mut mv = Self::build(from, to, Piece::Pawn, color, None, MoveKind::DoublePawnPush);
        mv.ep_square = Some(ep_square);
        mv
    }

    /// An en passant capture landing on `to`.
    pub const fn en_passant(from: Square, to: Square, color: Color) -> Self {
        Self::build(from, to, Piece::Pawn, color, Some(Piece::Pawn), MoveKind::EnPassant)
    }

    /// A pawn promotion, optionally capturing.
    pub const fn promote(
        from: Square,
        to: Square,
        color: Color,
        capture: Option<Piece>,
        promotion: Piece,
    ) -> Self {
        let mut mv = Self::build(from, to, Piece::Pawn, color, capture, MoveKind::Promotion);
        mv.promotion = Some(promotion);
        mv
    }

    /// A castling move, expressed as the king's from and to squares.
    pub const fn castle(from: Square, to: Square, color: Color, kingside: bool) -> Self {
        let kind = if kingside {
            MoveKind::CastleKingside
        } else {
            MoveKind::CastleQueenside
        };
        Self::build(from, to, Piece::King, color, None, kind)
    }

    /// A drop from reserve. The from square equals the destination.
    pub const fn drop(piece: Piece, to: Square, color: Color) -> Self {
        Self::build(to, to, piece, color, None, MoveKind::Drop)
    }

    /// Marks the captured piece as a promoted pawn.
    pub const fn with_capture_promoted(mut self, promoted: bool) -> Self {
        self.capture_promoted = promoted;
        self
    }

    #[inline]
    pub const fn from(&self) -> Square {
        self.from
    }

    #[inline]
    pub const fn to(&self) -> Square {
        self.to
    }

    #[inline]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub const fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// The captured piece kind (a pawn for en passant).
    #[inline]
    pub const fn capture(&self) -> Option<Piece> {
        self.capture
    }

    #[inline]
    pub const fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    /// True when the captured piece was itself a promoted pawn.
    #[inline]
    pub const fn is_capture_promoted(&self) -> bool {
        self.capture_promoted
    }

    #[inline]
    pub const fn promotion(&self) -> Option<Piece> {
        self.promotion
    }

    #[inline]
    pub const fn is_promotion(&self) -> bool {
        self.promotion.is_some()
    }

    #[inline]
    pub const fn is_castling(&self) -> bool {
        self.kind.is_castling()
    }

    #[inline]
    pub const fn is_drop(&self) -> bool {
        matches!(self.kind, MoveKind::Drop)
    }

    #[inline]
    pub const fn is_en_passant(&self) -> bool {
        matches!(self.kind, MoveKind::EnPassant)
    }

    /// Captures and promotions sort ahead of quiet moves.
    #[inline]
    pub const fn is_high_priority(&self) -> bool {
        self.capture.is_some() || self.promotion.is_some()
    }

    /// The en passant target this move creates.
    #[inline]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Castling rights in force before the move was applied.
    #[inline]
    pub const fn previous_castling(&self) -> CastlingRights {
        self.previous_castling
    }

    /// Fifty-move clock before the move was applied.
    #[inline]
    pub const fn previous_fifty_move_count(&self) -> u32 {
        self.previous_fifty
    }

    /// Records the state a rollback needs. Called by the position when the
    /// move is applied.
    pub fn record_undo_state(&mut self, castling: CastlingRights, fifty_move_count: u32) {
        self.previous_castling = castling;
        self.previous_fifty = fifty_move_count;
    }

    /// The SAN text, if it has been computed or supplied.
    pub fn san(&self) -> Option<&str> {
        self.san.as_ref().map(|s| s.as_str())
    }

    /// Stores SAN text. Returns false (leaving the text unset) when it does
    /// not fit the inline buffer.
    pub fn set_san(&mut self, san: &str) -> bool {
        match ArrayString::from(san) {
            Ok(text) => {
                self.san = Some(text);
                true
            }
            Err(_) => false,
        }
    }

    /// Appends a check or mate marker to the stored SAN.
    pub fn push_san_suffix(&mut self, suffix: char) {
        if let Some(text) = self.san.as_mut() {
            let _ = text.try_push(suffix);
        }
    }

    pub fn clear_san(&mut self) {
        self.san = None;
    }

    /// Long algebraic notation: `e2e4`, `e7e8q`, `N@f3`; castling is written
    /// as the king's move.
    pub fn to_lan(&self) -> String {
        if self.is_drop() {
            return format!("{}@{}", self.piece.to_san_char(), self.to);
        }
        let mut s = format!("{}{}", self.from, self.to);
        if let Some(promo) = self.promotion {
            s.push(promo.to_fen_char(Color::Black));
        }
        s
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from
            && self.to == other.to
            && self.piece == other.piece
            && self.color == other.color
            && self.kind == other.kind
            && self.promotion == other.promotion
    }
}

impl Eq for Move {}

impl Hash for Move {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
        self.piece.hash(state);
        self.color.hash(state);
        self.kind.hash(state);
        self.promotion.hash(state);
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}", self.to_lan())?;
        if let Some(san) = self.san() {
            write!(f, " {}", san)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.san() {
            Some(san) => f.write_str(san),
            None => f.write_str(&self.to_lan()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, Rank};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn lan_rendering() {
        let push = Move::double_push(sq("e2"), sq("e4"), Color::White, sq("e3"));
        assert_eq!(push.to_lan(), "e2e4");
        assert_eq!(push.ep_square(), Some(sq("e3")));

        let promo = Move::promote(sq("e7"), sq("d8"), Color::White, Some(Piece::Rook), Piece::Queen);
        assert_eq!(promo.to_lan(), "e7d8q");
        assert!(promo.is_high_priority());

        let drop = Move::drop(Piece::Knight, sq("f3"), Color::Black);
        assert_eq!(drop.to_lan(), "N@f3");
        assert_eq!(drop.from(), drop.to());

        let castle = Move::castle(Square::E1, Square::G1, Color::White, true);
        assert_eq!(castle.to_lan(), "e1g1");
        assert_eq!(castle.kind(), MoveKind::CastleKingside);
    }

    #[test]
    fn en_passant_captures_a_pawn() {
        let ep = Move::en_passant(sq("e5"), sq("d6"), Color::White);
        assert_eq!(ep.capture(), Some(Piece::Pawn));
        assert!(ep.is_en_passant());
        assert!(ep.is_high_priority());
    }

    #[test]
    fn equality_ignores_bookkeeping() {
        let a = Move::new(sq("g1"), sq("f3"), Piece::Knight, Color::White, None);
        let mut b = a;
        b.record_undo_state(CastlingRights::ALL, 7);
        assert!(b.set_san("Nf3"));
        assert_eq!(a, b);
        assert_eq!(b.previous_fifty_move_count(), 7);
        assert_eq!(b.previous_castling(), CastlingRights::ALL);

        let c = Move::new(sq("g1"), sq("h3"), Piece::Knight, Color::White, None);
        assert_ne!(a, c);
    }

    #[test]
    fn san_buffer() {
        let mut mv = Move::new(sq("d1"), sq("h5"), Piece::Queen, Color::White, None);
        assert_eq!(mv.san(), None);
        assert!(mv.set_san("Qh5"));
        mv.push_san_suffix('+');
        assert_eq!(mv.san(), Some("Qh5+"));
        assert_eq!(mv.to_string(), "Qh5+");
        assert!(!mv.set_san("this text is far too long"));
        assert_eq!(mv.san(), Some("Qh5+"));
        mv.clear_san();
        assert_eq!(mv.to_string(), "d1h5");
    }

    #[test]
    fn debug_display() {
        let mv = Move::new(
            Square::new(File::B, Rank::R1),
            Square::new(File::C, Rank::R3),
            Piece::Knight,
            Color::White,
            None,
        );
        assert_eq!(format!("{:?}", mv), "Move(b1c3)");
    }
}
