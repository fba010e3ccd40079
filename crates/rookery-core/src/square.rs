//! Board coordinates: files, ranks and squares.
//!
//! Squares are numbered little-endian rank-file: a1 = 0, h1 = 7, a2 = 8,
//! h8 = 63. Bit `n` of a bitboard is square `n`.

use std::fmt;
use std::str::FromStr;

/// A file (column), a through h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

/// A rank (row), 1 through 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
    R8,
}

impl File {
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Accepts `a`-`h` in either case.
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() {
            Self::from_index(c as u8 - b'a')
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn to_char(self) -> char {
        (b'a' + self as u8) as char
    }
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::R1,
        Rank::R2,
        Rank::R3,
        Rank::R4,
        Rank::R5,
        Rank::R6,
        Rank::R7,
        Rank::R8,
    ];

    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 8 {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Accepts `1`-`8`.
    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        if c.is_ascii_digit() && c != '0' {
            Self::from_index(c as u8 - b'1')
        } else {
            None
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn to_char(self) -> char {
        (b'1' + self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// One of the 64 squares.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    pub const A1: Square = Square::new(File::A, Rank::R1);
    pub const B1: Square = Square::new(File::B, Rank::R1);
    pub const C1: Square = Square::new(File::C, Rank::R1);
    pub const D1: Square = Square::new(File::D, Rank::R1);
    pub const E1: Square = Square::new(File::E, Rank::R1);
    pub const F1: Square = Square::new(File::F, Rank::R1);
    pub const G1: Square = Square::new(File::G, Rank::R1);
    pub const H1: Square = Square::new(File::H, Rank::R1);
    pub const E4: Square = Square::new(File::E, Rank::R4);
    pub const D5: Square = Square::new(File::D, Rank::R5);
    pub const A8: Square = Square::new(File::A, Rank::R8);
    pub const B8: Square = Square::new(File::B, Rank::R8);
    pub const C8: Square = Square::new(File::C, Rank::R8);
    pub const D8: Square = Square::new(File::D, Rank::R8);
    pub const E8: Square = Square::new(File::E, Rank::R8);
    pub const F8: Square = Square::new(File::F, Rank::R8);
    pub const G8: Square = Square::new(File::G, Rank::R8);
    pub const H8: Square = Square::new(File::H, Rank::R8);

    #[inline]
    pub const fn new(file: File, rank: Rank) -> Self {
        Square((rank as u8) << 3 | file as u8)
    }

    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Parses `e4`-style coordinates. The file letter may be uppercase.
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        match s.as_bytes() {
            [f, r] => match (File::from_char(*f as char), Rank::from_char(*r as char)) {
                (Some(file), Some(rank)) => Some(Square::new(file, rank)),
                _ => None,
            },
            _ => None,
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn file(self) -> File {
        File::ALL[(self.0 & 7) as usize]
    }

    #[inline]
    pub const fn rank(self) -> Rank {
        Rank::ALL[(self.0 >> 3) as usize]
    }

    pub fn to_algebraic(self) -> String {
        let mut s = String::with_capacity(2);
        s.push(self.file().to_char());
        s.push(self.rank().to_char());
        s
    }

    /// The single-bit mask for this square.
    #[inline]
    pub const fn bitboard(self) -> u64 {
        1 << self.0
    }

    /// The square `delta` indices away, or `None` off either end of the
    /// board. File wrap-around is the caller's concern.
    #[inline]
    pub const fn offset(self, delta: i8) -> Option<Square> {
        let index = self.0 as i16 + delta as i16;
        if 0 <= index && index < 64 {
            Some(Square(index as u8))
        } else {
            None
        }
    }

    /// Same file, other rank.
    #[inline]
    pub const fn with_rank(self, rank: Rank) -> Square {
        Square::new(self.file(), rank)
    }

    /// a1, b1, ..., h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }
}

impl FromStr for Square {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s.trim()).ok_or_else(|| format!("invalid square: {s}"))
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}
