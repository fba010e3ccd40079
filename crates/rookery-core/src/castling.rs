//! Castling rights.

use std::fmt;

use crate::Color;

/// Which way a king castles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::Kingside, CastleSide::Queenside];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Castling rights for both colors packed into four bits.
///
/// Bits 0-1 hold White's rights and bits 2-3 Black's. Within a color,
/// bit 0 is kingside and bit 1 is queenside, so [`CastlingRights::for_color`]
/// yields one of none/kingside/queenside/both.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Per-color mask: kingside.
    pub const KINGSIDE: u8 = 0b01;
    /// Per-color mask: queenside.
    pub const QUEENSIDE: u8 = 0b10;
    /// Per-color mask: both sides.
    pub const BOTH: u8 = 0b11;

    /// Creates rights from the raw four-bit value.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        CastlingRights(bits & 0b1111)
    }

    /// Raw four-bit value (0-15), used to key the hash table.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    const fn shift(color: Color) -> u8 {
        (color.index() as u8) * 2
    }

    #[inline]
    const fn side_mask(side: CastleSide) -> u8 {
        match side {
            CastleSide::Kingside => Self::KINGSIDE,
            CastleSide::Queenside => Self::QUEENSIDE,
        }
    }

    /// The two-bit mask for one color.
    #[inline]
    pub const fn for_color(self, color: Color) -> u8 {
        (self.0 >> Self::shift(color)) & Self::BOTH
    }

    /// Replaces the two-bit mask for one color.
    #[inline]
    pub const fn with_color(self, color: Color, mask: u8) -> Self {
        let shift = Self::shift(color);
        CastlingRights((self.0 & !(Self::BOTH << shift)) | ((mask & Self::BOTH) << shift))
    }

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.for_color(color) & Self::side_mask(side) != 0
    }

    #[inline]
    pub fn grant(&mut self, color: Color, side: CastleSide) {
        self.0 |= Self::side_mask(side) << Self::shift(color);
    }

    #[inline]
    pub fn revoke(&mut self, color: Color, side: CastleSide) {
        self.0 &= !(Self::side_mask(side) << Self::shift(color));
    }

    /// Removes both rights of a color (its king moved or castled).
    #[inline]
    pub fn revoke_color(&mut self, color: Color) {
        self.0 &= !(Self::BOTH << Self::shift(color));
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parses the FEN castling field (`KQkq` subset or `-`).
    pub fn from_fen_field(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::NONE);
        }
        if field.is_empty() {
            return None;
        }
        let mut rights = Self::NONE;
        for c in field.chars() {
            let (color, side) = match c {
                'K' => (Color::White, CastleSide::Kingside),
                'Q' => (Color::White, CastleSide::Queenside),
                'k' => (Color::Black, CastleSide::Kingside),
                'q' => (Color::Black, CastleSide::Queenside),
                _ => return None,
            };
            if rights.has(color, side) {
                return None;
            }
            rights.grant(color, side);
        }
        Some(rights)
    }

    /// Renders the FEN castling field; `-` when neither side retains rights.
    pub fn to_fen_field(self) -> String {
        if self.is_empty() {
            return "-".to_string();
        }
        let mut out = String::with_capacity(4);
        for (color, side, c) in [
            (Color::White, CastleSide::Kingside, 'K'),
            (Color::White, CastleSide::Queenside, 'Q'),
            (Color::Black, CastleSide::Kingside, 'k'),
            (Color::Black, CastleSide::Queenside, 'q'),
        ] {
            if self.has(color, side) {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CastlingRights({})", self.to_fen_field())
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen_field())
    }
}
