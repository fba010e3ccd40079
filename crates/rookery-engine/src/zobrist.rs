//! Zobrist hashing for position identification.
//!
//! Keys are drawn from an xorshift64 stream seeded explicitly, so two tables
//! built from the same seed are identical. A position hash covers only piece
//! placement and is kept incrementally: placing or removing a piece XORs its
//! (color, piece, square) key. The game hash adds side to move, the castling
//! combination and the en passant file on top of it.

use std::sync::{Arc, OnceLock};

use rookery_core::{CastlingRights, Color, Piece, Square};

/// Seed used when the configuration does not name one. Kept below 2^63 so
/// it survives a TOML round trip.
pub const DEFAULT_SEED: u64 = 0x2545_F491_4F6C_DD1D;

/// Zobrist key table.
#[derive(Clone, PartialEq, Eq)]
pub struct ZobristKeys {
    /// Keys for pieces: [color][piece][square]
    pieces: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    /// One key per castling-rights combination (0-15).
    castling: [u64; 16],
    en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Builds the table from `seed`. A zero seed is replaced with the
    /// default, since xorshift never leaves zero.
    pub const fn with_seed(seed: u64) -> Self {
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = if seed == 0 { DEFAULT_SEED } else { seed };
        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut castling = [0u64; 16];
        let mut en_passant = [0u64; 8];

        let mut color = 0;
        while color < 2 {
            let mut piece = 0;
            while piece < 6 {
                let mut square = 0;
                while square < 64 {
                    state = next_random(state);
                    pieces[color][piece][square] = state;
                    square += 1;
                }
                piece += 1;
            }
            color += 1;
        }

        state = next_random(state);
        let black_to_move = state;

        // Combination 0 (no rights) contributes nothing.
        let mut i = 1;
        while i < 16 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    /// The shared table for [`DEFAULT_SEED`].
    pub fn shared_default() -> Arc<ZobristKeys> {
        static DEFAULT: OnceLock<Arc<ZobristKeys>> = OnceLock::new();
        Arc::clone(DEFAULT.get_or_init(|| Arc::new(ZobristKeys::with_seed(DEFAULT_SEED))))
    }

    /// A table for `seed`, sharing the default one when possible.
    pub fn for_seed(seed: u64) -> Arc<ZobristKeys> {
        if seed == DEFAULT_SEED || seed == 0 {
            Self::shared_default()
        } else {
            Arc::new(Self::with_seed(seed))
        }
    }

    /// Returns the key for a piece on a square.
    #[inline]
    pub const fn piece_key(&self, color: Color, piece: Piece, square: Square) -> u64 {
        self.pieces[color.index()][piece.index()][square.index() as usize]
    }

    /// The combined side, castling and en passant contribution.
    #[inline]
    pub const fn state_key(
        &self,
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<Square>,
    ) -> u64 {
        let mut key = self.castling[castling.bits() as usize];
        if let Color::Black = side_to_move {
            key ^= self.black_to_move;
        }
        if let Some(sq) = en_passant {
            key ^= self.en_passant[sq.file().index() as usize];
        }
        key
    }
}

impl std::fmt::Debug for ZobristKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ZobristKeys({:#018x})", self.pieces[0][0][0])
    }
}
