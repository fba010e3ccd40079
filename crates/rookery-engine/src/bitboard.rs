//! Bitboard representation and operations.
//!
//! A bitboard is a 64-bit integer where each bit represents a square on the
//! chess board. Every piece set, color set and attack set in the engine is
//! one of these.

use rookery_core::{File, Rank, Square};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

/// A 64-bit board representation.
///
/// Bit 0 = a1, bit 1 = b1, ..., bit 63 = h8 (little-endian rank-file mapping).
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Bitboard(pub u64);

impl Bitboard {
    /// Empty bitboard (no squares set).
    pub const EMPTY: Bitboard = Bitboard(0);

    /// Full bitboard (all squares set).
    pub const FULL: Bitboard = Bitboard(!0);

    // File masks
    pub const FILE_A: Bitboard = Bitboard(0x0101_0101_0101_0101);
    pub const FILE_H: Bitboard = Bitboard(0x8080_8080_8080_8080);

    // Rank masks
    pub const RANK_1: Bitboard = Bitboard(0x0000_0000_0000_00FF);
    pub const RANK_2: Bitboard = Bitboard(0x0000_0000_0000_FF00);
    pub const RANK_3: Bitboard = Bitboard(0x0000_0000_00FF_0000);
    pub const RANK_6: Bitboard = Bitboard(0x0000_FF00_0000_0000);
    pub const RANK_7: Bitboard = Bitboard(0x00FF_0000_0000_0000);
    pub const RANK_8: Bitboard = Bitboard(0xFF00_0000_0000_0000);

    /// Ranks a pawn may never be dropped on.
    pub const BACK_RANKS: Bitboard = Bitboard(Self::RANK_1.0 | Self::RANK_8.0);

    /// Mask of every square on a file.
    #[inline]
    pub const fn file(file: File) -> Self {
        Bitboard(Self::FILE_A.0 << file.index())
    }

    /// Mask of every square on a rank.
    #[inline]
    pub const fn rank(rank: Rank) -> Self {
        Bitboard(Self::RANK_1.0 << (rank.index() * 8))
    }

    /// Squares strictly between two squares on the same rank, including
    /// neither end.
    pub const fn between_on_rank(a: Square, b: Square) -> Self {
        let (lo, hi) = if a.index() < b.index() {
            (a.index(), b.index())
        } else {
            (b.index(), a.index())
        };
        if hi - lo < 2 {
            return Bitboard::EMPTY;
        }
        let span = (1u64 << hi) - (1u64 << (lo + 1));
        Bitboard(span)
    }

    /// Squares from `a` to `b` on the same rank, both ends included.
    pub const fn span_on_rank(a: Square, b: Square) -> Self {
        Bitboard(Self::between_on_rank(a, b).0 | a.bitboard() | b.bitboard())
    }

    /// Creates a bitboard from a raw u64.
    #[inline]
    pub const fn new(bits: u64) -> Self {
        Bitboard(bits)
    }

    /// Creates a bitboard with a single square set.
    #[inline]
    pub const fn from_square(sq: Square) -> Self {
        Bitboard(1u64 << sq.index())
    }

    /// Returns true if the bitboard is empty.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the bitboard is not empty.
    #[inline]
    pub const fn is_not_empty(self) -> bool {
        self.0 != 0
    }

    /// Returns the number of set bits (population count).
    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns true if the given square is set.
    #[inline]
    pub const fn contains(self, sq: Square) -> bool {
        (self.0 & (1u64 << sq.index())) != 0
    }

    /// Sets the given square.
    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u64 << sq.index();
    }

    /// Clears the given square.
    #[inline]
    pub fn clear(&mut self, sq: Square) {
        self.0 &= !(1u64 << sq.index());
    }

    /// Bit scan forward: the lowest set square, if any.
    #[inline]
    pub const fn lsb(self) -> Option<Square> {
        Square::from_index(self.0.trailing_zeros() as u8)
    }

    /// Returns true if every square of `self` is also in `other`.
    #[inline]
    pub const fn is_subset(self, other: Bitboard) -> bool {
        self.0 & !other.0 == 0
    }

    /// Pops and returns the least significant bit.
    #[inline]
    pub fn pop_lsb(&mut self) -> Option<Square> {
        let sq = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    /// Shifts every square one step in `direction`, dropping squares that
    /// would wrap around the board edge.
    #[inline]
    pub const fn shift(self, direction: Direction) -> Bitboard {
        let (delta, landing) = direction.step();
        let moved = if delta > 0 {
            self.0 << delta
        } else {
            self.0 >> -delta
        };
        Bitboard(moved & landing)
    }

    #[inline]
    pub const fn north(self) -> Bitboard {
        self.shift(Direction::North)
    }

    #[inline]
    pub const fn south(self) -> Bitboard {
        self.shift(Direction::South)
    }

    #[inline]
    pub const fn east(self) -> Bitboard {
        self.shift(Direction::East)
    }

    #[inline]
    pub const fn west(self) -> Bitboard {
        self.shift(Direction::West)
    }
}

/// The eight ray directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ORTHOGONAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub const DIAGONAL: [Direction; 4] = [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    /// Square-index delta of one step, and the squares a step can land on.
    /// Eastward steps never land on the a-file, westward ones never on h.
    const fn step(self) -> (i8, u64) {
        const ANY: u64 = !0;
        const NOT_A: u64 = !Bitboard::FILE_A.0;
        const NOT_H: u64 = !Bitboard::FILE_H.0;
        match self {
            Direction::North => (8, ANY),
            Direction::South => (-8, ANY),
            Direction::East => (1, NOT_A),
            Direction::West => (-1, NOT_H),
            Direction::NorthEast => (9, NOT_A),
            Direction::NorthWest => (7, NOT_H),
            Direction::SouthEast => (-7, NOT_A),
            Direction::SouthWest => (-9, NOT_H),
        }
    }
}

impl From<Square> for Bitboard {
    #[inline]
    fn from(sq: Square) -> Self {
        Bitboard::from_square(sq)
    }
}

macro_rules! bit_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $trait for Bitboard {
            type Output = Bitboard;

            #[inline]
            fn $method(self, rhs: Bitboard) -> Bitboard {
                Bitboard(self.0 $op rhs.0)
            }
        }

        impl $assign_trait for Bitboard {
            #[inline]
            fn $assign_method(&mut self, rhs: Bitboard) {
                *self = *self $op rhs;
            }
        }
    };
}

bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Bitboard {
    type Output = Bitboard;

    #[inline]
    fn not(self) -> Bitboard {
        Bitboard(!self.0)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitboard({:#018x})", self.0)?;
        for rank in Rank::ALL.into_iter().rev() {
            let row: String = File::ALL
                .into_iter()
                .map(|file| {
                    if self.contains(Square::new(file, rank)) {
                        'X'
                    } else {
                        '.'
                    }
                })
                .collect();
            writeln!(f, "{rank} {row}")?;
        }
        Ok(())
    }
}

/// Iterator over set squares in a bitboard.
pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop_lsb()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let count = self.0.count() as usize;
        (count, Some(count))
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        BitboardIter(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitboard_from_square() {
        let bb = Bitboard::from_square(Square::A1);
        assert_eq!(bb.0, 1);
        assert!(bb.contains(Square::A1));
        assert!(!bb.contains(Square::B1));
    }

    #[test]
    fn bitboard_count() {
        assert_eq!(Bitboard::EMPTY.count(), 0);
        assert_eq!(Bitboard::FULL.count(), 64);
        assert_eq!(Bitboard::FILE_A.count(), 8);
        assert_eq!(Bitboard::RANK_1.count(), 8);
        assert_eq!(Bitboard::BACK_RANKS.count(), 16);
    }

    #[test]
    fn file_and_rank_masks() {
        assert_eq!(Bitboard::file(File::A), Bitboard::FILE_A);
        assert_eq!(Bitboard::file(File::H), Bitboard::FILE_H);
        assert_eq!(Bitboard::rank(Rank::R1), Bitboard::RANK_1);
        assert_eq!(Bitboard::rank(Rank::R6), Bitboard::RANK_6);
        assert!(Bitboard::file(File::E).contains(Square::E4));
    }

    #[test]
    fn rank_spans() {
        let between = Bitboard::between_on_rank(Square::E1, Square::A1);
        let squares: Vec<Square> = between.into_iter().collect();
        assert_eq!(squares, vec![Square::B1, Square::C1, Square::D1]);
        assert!(Bitboard::between_on_rank(Square::E1, Square::F1).is_empty());
        assert!(Bitboard::between_on_rank(Square::G8, Square::G8).is_empty());
        assert_eq!(Bitboard::span_on_rank(Square::G1, Square::E1).count(), 3);
        assert_eq!(Bitboard::span_on_rank(Square::G1, Square::G1).count(), 1);
    }

    #[test]
    fn direction_shifts_do_not_wrap() {
        let h1 = Bitboard::from_square(Square::H1);
        assert!(h1.shift(Direction::East).is_empty());
        assert!(h1.shift(Direction::NorthEast).is_empty());
        assert!(h1.shift(Direction::NorthWest).contains(Square::new(File::G, Rank::R2)));
        let a8 = Bitboard::from_square(Square::A8);
        assert!(a8.shift(Direction::North).is_empty());
        assert!(a8.shift(Direction::West).is_empty());
    }

    #[test]
    fn bitboard_shifts() {
        let a1 = Bitboard::from_square(Square::A1);
        assert!(a1.north().contains(Square::new(File::A, Rank::R2)));
        assert!(a1.east().contains(Square::B1));
        assert!(a1.shift(Direction::NorthEast).contains(Square::new(File::B, Rank::R2)));
        assert!(a1.south().is_empty());
        assert_eq!(Bitboard::RANK_8.south(), Bitboard::RANK_7);
    }

    #[test]
    fn operators_combine_sets() {
        let mut bb = Bitboard::FILE_A | Bitboard::RANK_1;
        assert_eq!(bb.count(), 15);
        bb &= !Bitboard::from(Square::A1);
        assert_eq!(bb.count(), 14);
        bb ^= Bitboard::RANK_1;
        assert_eq!(bb, Bitboard::FILE_A);
    }

    #[test]
    fn bitboard_iterator() {
        let bb = Bitboard::FILE_A;
        let squares: Vec<Square> = bb.into_iter().collect();
        assert_eq!(squares.len(), 8);
        assert_eq!(squares[0], Square::A1);
    }

    #[test]
    fn bitboard_lsb_and_subset() {
        assert_eq!(Bitboard::EMPTY.lsb(), None);
        assert_eq!(Bitboard::RANK_8.lsb(), Some(Square::A8));
        assert!(Bitboard::RANK_2.is_subset(Bitboard::FULL));
        assert!(!Bitboard::FULL.is_subset(Bitboard::RANK_2));
    }

    #[test]
    fn bitboard_pop_lsb() {
        let mut bb = Bitboard::new(0b1010);
        assert_eq!(bb.pop_lsb().map(|s| s.index()), Some(1));
        assert_eq!(bb.pop_lsb().map(|s| s.index()), Some(3));
        assert_eq!(bb.pop_lsb(), None);
    }
}
