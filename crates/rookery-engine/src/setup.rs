//! Building positions from starting layouts.

use rand::Rng;
use rookery_core::{CastlingRights, Color, Fen, File, Piece, Rank, Square};

use crate::config::EngineConfig;
use crate::error::SetupError;
use crate::position::{CastleLayout, Position};
use crate::repetition::RepetitionTable;
use crate::rules::fischer_random::{self, LAYOUT_COUNT};
use crate::rules::Variant;
use crate::zobrist::ZobristKeys;

const STANDARD_BACK_RANK: [Piece; 8] = [
    Piece::Rook,
    Piece::Knight,
    Piece::Bishop,
    Piece::Queen,
    Piece::King,
    Piece::Bishop,
    Piece::Knight,
    Piece::Rook,
];

/// Where the pieces start.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StartingLayout {
    /// The classic array.
    #[default]
    Standard,
    /// A Fischer-Random array by Scharnagl index (0..960, 518 is classic).
    FischerRandom(u16),
    /// An explicit FEN, optionally with crazyhouse holdings.
    Fen(String),
}

impl StartingLayout {
    /// A uniformly drawn Fischer-Random layout.
    pub fn random_fischer_random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        StartingLayout::FischerRandom(rng.gen_range(0..LAYOUT_COUNT))
    }
}

impl Position {
    /// Builds a position for `config.variant` from a starting layout.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] for an unparsable FEN, an out-of-range
    /// Fischer-Random index, or a missing king in a variant that needs both.
    pub fn new(config: &EngineConfig, layout: &StartingLayout) -> Result<Position, SetupError> {
        match layout {
            StartingLayout::Standard => Ok(Self::from_back_rank(config, STANDARD_BACK_RANK)),
            StartingLayout::FischerRandom(index) => fischer_random::back_rank(*index)
                .map(|rank| Self::from_back_rank(config, rank))
                .ok_or(SetupError::FischerRandomIndex(*index)),
            StartingLayout::Fen(text) => {
                let fen = Fen::parse(text)?;
                Self::from_fen_record(config, &fen)
            }
        }
    }

    /// The classic starting position.
    pub fn startpos() -> Position {
        Self::from_back_rank(&EngineConfig::default(), STANDARD_BACK_RANK)
    }

    /// A classic position from FEN.
    pub fn from_fen(fen: &str) -> Result<Position, SetupError> {
        Self::from_fen_with_variant(fen, Variant::Classic)
    }

    /// A position of the given variant from FEN, with default settings
    /// otherwise.
    pub fn from_fen_with_variant(fen: &str, variant: Variant) -> Result<Position, SetupError> {
        let fen = Fen::parse(fen)?;
        Self::from_fen_record(&EngineConfig::for_variant(variant), &fen)
    }

    fn blank(config: &EngineConfig) -> Position {
        Position::empty(
            config.variant.rules(),
            ZobristKeys::for_seed(config.zobrist_seed),
            Some(RepetitionTable::new(config.table_bits())),
            config.set_move_san,
        )
    }

    fn from_back_rank(config: &EngineConfig, back_rank: [Piece; 8]) -> Position {
        let mut position = Self::blank(config);
        for (file, piece) in File::ALL.into_iter().zip(back_rank) {
            position.put(Square::new(file, Rank::R1), piece, Color::White, false);
            position.put(Square::new(file, Rank::R2), Piece::Pawn, Color::White, false);
            position.put(Square::new(file, Rank::R7), Piece::Pawn, Color::Black, false);
            position.put(Square::new(file, Rank::R8), piece, Color::Black, false);
        }
        for color in Color::ALL {
            position.castle_layout[color.index()] = position.detect_castle_layout(color);
        }
        position.castling = CastlingRights::ALL;
        position.finish_setup();
        position
    }

    fn from_fen_record(config: &EngineConfig, fen: &Fen) -> Result<Position, SetupError> {
        let mut position = Self::blank(config);
        for &(sq, piece, color) in &fen.pieces {
            position.put(sq, piece, color, false);
        }
        if position.rules.requires_kings() {
            for color in Color::ALL {
                if position.king_square(color).is_none() {
                    return Err(SetupError::MissingKing(color));
                }
            }
        }
        for &(piece, color) in fen.holdings.iter().flatten() {
            let count = &mut position.drop_counts[color.index()][piece.index()];
            *count = count.saturating_add(1);
        }

        position.side_to_move = fen.side_to_move;
        position.castling = fen.castling;
        for color in Color::ALL {
            let mut layout = position.detect_castle_layout(color);
            let [kingside, queenside] = fen.castling_files[color.index()];
            layout.kingside_rook = kingside.unwrap_or(layout.kingside_rook);
            layout.queenside_rook = queenside.unwrap_or(layout.queenside_rook);
            position.castle_layout[color.index()] = layout;
        }
        position.en_passant = fen.en_passant;
        position.initial_en_passant = fen.en_passant;
        position.fifty_move_count = fen.halfmove_clock;
        position.ply = fen.fullmove_number.saturating_sub(1) * 2
            + u32::from(fen.side_to_move == Color::Black);
        position.finish_setup();
        Ok(position)
    }

    /// Home files for `color`'s castling pieces: the king on its back rank
    /// and the outermost rook on each side of it. Rights without a matching
    /// rook are removed later by the vacated-rights check.
    pub(crate) fn detect_castle_layout(&self, color: Color) -> CastleLayout {
        let rank = color.back_rank();
        let on_rank = |piece: Piece| {
            File::ALL
                .into_iter()
                .filter(move |&file| self.piece_at(Square::new(file, rank)) == Some((piece, color)))
        };
        let Some(king) = on_rank(Piece::King).next() else {
            return CastleLayout::STANDARD;
        };
        let kingside_rook = on_rank(Piece::Rook)
            .filter(|f| f.index() > king.index())
            .last()
            .unwrap_or(File::H);
        let queenside_rook = on_rank(Piece::Rook)
            .find(|f| f.index() < king.index())
            .unwrap_or(File::A);
        CastleLayout {
            king,
            kingside_rook,
            queenside_rook,
        }
    }

    fn finish_setup(&mut self) {
        self.revoke_vacated_rights();
        self.refresh_not_to_move();
        self.refresh_game_hash();
        if let Some(table) = self.repetition.as_mut() {
            table.increment(self.position_hash);
        }
        tracing::trace!(fen = %self.to_fen(), variant = %self.variant(), "position set up");
    }
}
