//! Bitboard chess rules engine with variant support.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit set of squares with set-wise ray casting
//! - [`Position`] - the mutable board state: pieces, castling, en passant,
//!   counters, Zobrist hashes and move history, changed in place by
//!   [`force_move`](Position::force_move) and
//!   [`rollback`](Position::rollback)
//! - [`RuleSet`] - per-variant legality (classic, suicide, atomic,
//!   crazyhouse, bughouse, losers, Fischer-Random)
//! - [`MoveList`] - generated moves, captures and promotions first
//! - SAN generation and resolution, FEN import and export
//! - [`Game`] - a position plus tags, clocks, annotations and results
//!
//! # Architecture
//!
//! Every piece kind of each color has its own bitboard, mirrored by a
//! 64-slot board array for point lookups. Legality is decided by applying a
//! pseudo-legal move, asking the position's rule set whether the result is
//! acceptable, and rolling the move back. Everything the rollback needs is
//! stored on the move itself.
//!
//! # Example
//!
//! ```
//! use rookery_engine::{Game, Position};
//!
//! // Using Position directly
//! let mut position = Position::startpos();
//! let moves = position.legal_moves();
//! println!("Legal moves from starting position: {}", moves.len());
//! position.make_san_move("e4").unwrap();
//! position.rollback();
//! assert_eq!(position.to_fen(), Position::startpos().to_fen());
//!
//! // Using Game for full game management
//! let mut game = Game::new();
//! game.play_san("e4").unwrap();
//! game.play_san("e5").unwrap();
//! println!("Position after 1.e4 e5: {}", game.to_fen());
//! ```

mod apply;
mod bitboard;
mod config;
mod error;
mod game;
pub mod movegen;
mod position;
mod repetition;
pub mod rules;
pub mod san;
mod setup;
mod zobrist;

pub use bitboard::{Bitboard, Direction};
pub use config::{ConfigError, EngineConfig};
pub use error::{InvariantViolation, MoveRejected, RejectReason, SetupError};
pub use game::{Clock, Game, GameError, GameStatus, PgnEvent};
pub use movegen::{
    bishop_attacks, is_in_check, is_square_attacked, king_attacks, knight_attacks, legal_moves,
    pawn_attacks, pseudo_legal_moves, queen_attacks, rook_attacks, MoveList,
};
pub use position::{CastleLayout, CastlePath, Position};
pub use repetition::RepetitionTable;
pub use rules::{CaptureEffect, DrawReason, GameResult, RuleSet, StandardChess, Variant};
pub use san::{move_to_san, san_to_move};
pub use setup::StartingLayout;
pub use zobrist::{ZobristKeys, DEFAULT_SEED};
