//! Chess piece kinds.
//!
//! Pieces are un-colored; the color travels alongside wherever it matters.
//! The discriminant doubles as the index into per-kind tables.

use std::fmt;

use crate::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Piece {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Lowercase letters by index, as used for black pieces in FEN.
const LETTERS: [char; 6] = ['p', 'n', 'b', 'r', 'q', 'k'];

impl Piece {
    pub const ALL: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    /// Promotion targets, in the order promotions are generated.
    pub const PROMOTIONS: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

    /// Kinds that can sit in a reserve and be dropped.
    pub const DROPPABLE: [Piece; 5] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn from_letter(lower: char) -> Option<Piece> {
        let mut i = 0;
        while i < LETTERS.len() {
            if LETTERS[i] == lower {
                return Some(Self::ALL[i]);
            }
            i += 1;
        }
        None
    }

    /// FEN letter: uppercase for white, lowercase for black.
    pub const fn to_fen_char(self, color: Color) -> char {
        let c = LETTERS[self as usize];
        match color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    /// Parses a FEN letter into a piece and its color.
    pub const fn from_fen_char(c: char) -> Option<(Piece, Color)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        match Self::from_letter(c.to_ascii_lowercase()) {
            Some(piece) => Some((piece, color)),
            None => None,
        }
    }

    /// Uppercase SAN letter. Pawns get `P`, which only drops use.
    pub const fn to_san_char(self) -> char {
        self.to_fen_char(Color::White)
    }

    /// Parses an uppercase SAN letter. Lowercase is rejected so that `b`
    /// stays a file.
    pub const fn from_san_char(c: char) -> Option<Piece> {
        if c.is_ascii_uppercase() {
            Self::from_letter(c.to_ascii_lowercase())
        } else {
            None
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Piece::Pawn => "pawn",
            Piece::Knight => "knight",
            Piece::Bishop => "bishop",
            Piece::Rook => "rook",
            Piece::Queen => "queen",
            Piece::King => "king",
        })
    }
}
