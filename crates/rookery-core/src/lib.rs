//! Core value types for the rookery rules engine.
//!
//! This crate holds the types that carry no board state:
//! - [`Piece`] and [`Color`] for piece representation
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`CastlingRights`] for per-color castling masks
//! - [`Move`] and [`MoveKind`] for move descriptors
//! - [`Fen`] parsing and serialization
//! - [`ParsedSan`], the strict SAN grammar

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod san;
mod square;

pub use castling::{CastleSide, CastlingRights};
pub use color::Color;
pub use fen::{Fen, FenError};
pub use mov::{Move, MoveKind, SAN_CAPACITY};
pub use piece::Piece;
pub use san::{ParsedSan, SanError};
pub use square::{File, Rank, Square};
