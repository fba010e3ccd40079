//! Full game management on top of a [`Position`].
//!
//! The [`Game`] struct adds what a played or replayed game needs beyond the
//! board itself:
//! - PGN tag pairs and player metadata
//! - per-color clock settings and status flags
//! - annotations attached to plies
//! - automatic end detection, draw claims, resignation and agreement
//! - PGN import (as a stream of [`PgnEvent`]s) and export

use std::fmt::Write as _;
use std::time::Duration;

use rookery_core::{Color, Move, Piece, Square};
use thiserror::Error;

use crate::config::EngineConfig;
use crate::error::{MoveRejected, RejectReason, SetupError};
use crate::rules::{DrawReason, GameResult, Variant};
use crate::san::{move_to_san, san_to_move};
use crate::setup::StartingLayout;
use crate::{MoveList, Position};

/// Error type for game operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The move was rejected by the position.
    #[error(transparent)]
    Move(#[from] MoveRejected),
    /// A new starting position could not be built.
    #[error(transparent)]
    Setup(#[from] SetupError),
    /// The game has already ended.
    #[error("game has already ended")]
    GameAlreadyOver,
    /// Cannot claim draw (conditions not met).
    #[error("cannot claim draw: conditions not met")]
    CannotClaimDraw,
}

/// One event from a PGN reader, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PgnEvent {
    Header { key: String, value: String },
    /// A move in SAN.
    Move(String),
    /// A `{...}` comment, attached to the last ply played.
    Annotation(String),
    /// The game termination token.
    Result(String),
}

/// Status flags of a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GameStatus(u8);

impl GameStatus {
    pub const NONE: GameStatus = GameStatus(0);
    pub const ACTIVE: GameStatus = GameStatus(1);
    pub const EXAMINING: GameStatus = GameStatus(1 << 1);
    pub const OBSERVING: GameStatus = GameStatus(1 << 2);
    pub const PLAYING: GameStatus = GameStatus(1 << 3);
    pub const SETUP: GameStatus = GameStatus(1 << 4);
    pub const DROPPABLE: GameStatus = GameStatus(1 << 5);

    #[inline]
    pub const fn contains(self, flags: GameStatus) -> bool {
        self.0 & flags.0 == flags.0
    }

    #[inline]
    pub fn insert(&mut self, flags: GameStatus) {
        self.0 |= flags.0;
    }

    #[inline]
    pub fn remove(&mut self, flags: GameStatus) {
        self.0 &= !flags.0;
    }

    pub fn set(&mut self, flags: GameStatus, on: bool) {
        if on {
            self.insert(flags);
        } else {
            self.remove(flags);
        }
    }
}

impl std::ops::BitOr for GameStatus {
    type Output = GameStatus;

    fn bitor(self, rhs: GameStatus) -> GameStatus {
        GameStatus(self.0 | rhs.0)
    }
}

/// Time control and clock state for one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clock {
    pub initial: Duration,
    pub increment: Duration,
    pub remaining: Duration,
    /// Network lag reported by the server.
    pub lag: Duration,
}

impl Clock {
    /// A fresh clock with the full initial time remaining.
    pub fn new(initial: Duration, increment: Duration) -> Self {
        Clock {
            initial,
            increment,
            remaining: initial,
            lag: Duration::ZERO,
        }
    }
}

/// The seven-tag roster, in export order.
const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// A chess game: a position plus everything recorded around it.
#[derive(Debug, Clone)]
pub struct Game {
    config: EngineConfig,
    /// Position the game started from, without its repetition table.
    start: Position,
    position: Position,
    /// Tag pairs in insertion order. Keys are unique, case-sensitive.
    headers: Vec<(String, String)>,
    /// `annotations[0]` precedes the first move; `annotations[n]` follows
    /// ply `n`.
    annotations: Vec<Vec<String>>,
    result: Option<GameResult>,
    status: GameStatus,
    clocks: [Clock; 2],
    id: Option<String>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new classic game from the standard starting position.
    pub fn new() -> Self {
        Self::from_parts(EngineConfig::default(), Position::startpos())
    }

    /// Creates a game from configuration and a starting layout.
    pub fn with_config(config: EngineConfig, layout: &StartingLayout) -> Result<Self, GameError> {
        let position = Position::new(&config, layout)?;
        Ok(Self::from_parts(config, position))
    }

    /// Wraps an existing position. Moves already in its history are not
    /// part of this game.
    pub fn from_position(position: Position) -> Self {
        let config = EngineConfig {
            set_move_san: position.annotates_san(),
            ..EngineConfig::for_variant(position.variant())
        };
        Self::from_parts(config, position)
    }

    /// Creates a classic game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        Ok(Self::from_position(Position::from_fen(fen)?))
    }

    fn from_parts(config: EngineConfig, position: Position) -> Self {
        let mut status = GameStatus::ACTIVE;
        status.set(GameStatus::DROPPABLE, position.rules().allows_drops());
        let mut game = Game {
            config,
            start: position.deep_copy(false),
            position,
            headers: Vec::new(),
            annotations: vec![Vec::new()],
            result: None,
            status,
            clocks: [Clock::default(); 2],
            id: None,
        };
        // The setup itself may already be decided.
        game.update_result();
        game
    }

    /// Restarts from `position`, keeping tags, clocks and status.
    fn reset(&mut self, position: Position) {
        self.start = position.deep_copy(false);
        self.position = position;
        self.annotations = vec![Vec::new()];
        self.result = None;
        self.status.insert(GameStatus::ACTIVE);
        self.status
            .set(GameStatus::DROPPABLE, self.position.rules().allows_drops());
        self.update_result();
    }

    /// Returns a reference to the current position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the starting position.
    pub fn start_position(&self) -> &Position {
        &self.start
    }

    /// A deep copy of the current position without the repetition table,
    /// for analysis that must not disturb the game.
    pub fn snapshot(&self) -> Position {
        self.position.deep_copy(false)
    }

    pub fn variant(&self) -> Variant {
        self.position.variant()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns all legal moves in the current position.
    pub fn legal_moves(&mut self) -> MoveList {
        self.position.legal_moves()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.position.is_in_check(self.position.side_to_move())
    }

    /// Returns the game result if the game is over.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Returns true if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    /// The moves played in this game.
    pub fn moves(&self) -> &[Move] {
        let offset = self.start.history().len();
        self.position.history().get(offset..).unwrap_or_default()
    }

    /// Returns the number of half-moves (plies) played.
    pub fn ply_count(&self) -> usize {
        self.moves().len()
    }

    /// Returns the current full move number.
    pub fn fullmove_number(&self) -> u32 {
        self.position.fullmove_number()
    }

    /// Plays a move produced by this game's move generator.
    pub fn play(&mut self, m: Move) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        if !self.position.legal_moves().contains(&m) {
            return Err(self.position.reject(RejectReason::Illegal, &m.to_lan()).into());
        }
        let played = self.position.force_move(m);
        self.after_move();
        Ok(played)
    }

    /// Plays a move given in SAN.
    pub fn play_san(&mut self, san: &str) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let played = self.position.make_san_move(san)?;
        self.after_move();
        Ok(played)
    }

    /// Plays a move given in long algebraic notation (`e2e4`, `e7e8q`,
    /// `N@f3`).
    pub fn play_lan(&mut self, lan: &str) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let played = self.position.make_lan_move(lan)?;
        self.after_move();
        Ok(played)
    }

    /// Plays a move by coordinates. Promotions default to a queen.
    pub fn play_coords(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let played = self.position.make_move(from, to, promotion)?;
        self.after_move();
        Ok(played)
    }

    /// Drops a piece from the side to move's reserve.
    pub fn play_drop(&mut self, piece: Piece, to: Square) -> Result<Move, GameError> {
        self.ensure_in_progress()?;
        let played = self.position.make_drop_move(piece, to)?;
        self.after_move();
        Ok(played)
    }

    /// Takes back the last move of this game and clears any result.
    pub fn undo(&mut self) -> Option<Move> {
        if self.ply_count() == 0 {
            return None;
        }
        let undone = self.position.rollback()?;
        self.annotations.pop();
        self.result = None;
        self.status.insert(GameStatus::ACTIVE);
        Some(undone)
    }

    fn ensure_in_progress(&self) -> Result<(), GameError> {
        match self.result {
            Some(_) => Err(GameError::GameAlreadyOver),
            None => Ok(()),
        }
    }

    fn after_move(&mut self) {
        self.annotations.push(Vec::new());
        self.update_result();
    }

    fn update_result(&mut self) {
        if self.result.is_some() {
            return;
        }
        if let Some(result) = self.detect_result() {
            self.finish(result);
        }
    }

    fn finish(&mut self, result: GameResult) {
        tracing::debug!(?result, ply = self.position.ply(), "game over");
        self.result = Some(result);
        self.status.remove(GameStatus::ACTIVE);
    }

    /// Results that apply without anyone claiming them.
    fn detect_result(&mut self) -> Option<GameResult> {
        let us = self.position.side_to_move();
        let variant = self.position.variant();

        if variant == Variant::Atomic && self.position.king_square(us).is_none() {
            return Some(GameResult::win_for(us.opposite()));
        }
        if self.position.legal_moves().is_empty() {
            return Some(match variant {
                // Running out of moves is the goal in these variants.
                Variant::Suicide | Variant::Losers => GameResult::win_for(us),
                _ if self.position.is_in_check(us) => GameResult::win_for(us.opposite()),
                _ => GameResult::Draw(DrawReason::Stalemate),
            });
        }
        if self.position.repetition_count() >= 5 {
            return Some(GameResult::Draw(DrawReason::FivefoldRepetition));
        }
        if self.position.fifty_move_count() >= 150 {
            return Some(GameResult::Draw(DrawReason::SeventyFiveMoveRule));
        }
        if self.position.rules().is_insufficient_material(&self.position) {
            return Some(GameResult::Draw(DrawReason::InsufficientMaterial));
        }
        None
    }

    /// Counts how many times the current piece placement has occurred.
    ///
    /// The count is keyed by placement alone (and by a truncated hash), so
    /// the same placement with the other side to move, or with different
    /// castling or en passant rights, adds to the same count. The automatic
    /// fivefold draw and the threefold claim both read this count.
    pub fn position_count(&self) -> u16 {
        self.position.repetition_count()
    }

    /// Returns true if a draw can be claimed (threefold repetition or 50-move rule).
    pub fn can_claim_draw(&self) -> bool {
        self.result.is_none()
            && (self.position_count() >= 3 || self.position.fifty_move_count() >= 100)
    }

    /// Claims a draw if conditions are met.
    pub fn claim_draw(&mut self) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        if self.position_count() >= 3 {
            self.finish(GameResult::Draw(DrawReason::ThreefoldRepetition));
            return Ok(());
        }
        if self.position.fifty_move_count() >= 100 {
            self.finish(GameResult::Draw(DrawReason::FiftyMoveRule));
            return Ok(());
        }
        Err(GameError::CannotClaimDraw)
    }

    /// Agrees to a draw (both players must agree in real chess).
    pub fn agree_draw(&mut self) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        self.finish(GameResult::Draw(DrawReason::Agreement));
        Ok(())
    }

    /// Resigns the game for the side to move.
    pub fn resign(&mut self) -> Result<(), GameError> {
        self.ensure_in_progress()?;
        self.finish(GameResult::win_for(self.position.side_to_move().opposite()));
        Ok(())
    }

    /// Runs the position's consistency check, logging any violation.
    pub fn verify(&self) -> bool {
        match self.position.check_invariants() {
            Ok(()) => true,
            Err(violation) => {
                tracing::warn!(%violation, fen = %self.position.to_fen(), "corrupt game position");
                false
            }
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a tag, replacing any earlier value for the same key.
    pub fn set_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.headers.push((key, value)),
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn event(&self) -> Option<&str> {
        self.header("Event")
    }

    pub fn site(&self) -> Option<&str> {
        self.header("Site")
    }

    pub fn date(&self) -> Option<&str> {
        self.header("Date")
    }

    pub fn round(&self) -> Option<&str> {
        self.header("Round")
    }

    pub fn player_name(&self, color: Color) -> Option<&str> {
        self.header(match color {
            Color::White => "White",
            Color::Black => "Black",
        })
    }

    pub fn player_rating(&self, color: Color) -> Option<&str> {
        self.header(match color {
            Color::White => "WhiteElo",
            Color::Black => "BlackElo",
        })
    }

    /// Records a player's name and, when known, rating.
    pub fn set_player(&mut self, color: Color, name: &str, rating: Option<&str>) {
        let (name_key, rating_key) = match color {
            Color::White => ("White", "WhiteElo"),
            Color::Black => ("Black", "BlackElo"),
        };
        self.set_header(name_key, name);
        if let Some(rating) = rating {
            self.set_header(rating_key, rating);
        }
    }

    /// Server-side identifier of the game, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn clock(&self, color: Color) -> &Clock {
        &self.clocks[color.index()]
    }

    pub fn clock_mut(&mut self, color: Color) -> &mut Clock {
        &mut self.clocks[color.index()]
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn set_status(&mut self, flags: GameStatus, on: bool) {
        self.status.set(flags, on);
    }

    /// Attaches a comment to the last ply played (or to the start of the
    /// game when no move has been played).
    pub fn annotate(&mut self, text: impl Into<String>) {
        if let Some(slot) = self.annotations.last_mut() {
            slot.push(text.into());
        }
    }

    /// Comments after ply `ply` (1-based); ply 0 is the game preamble.
    pub fn annotations(&self, ply: usize) -> &[String] {
        self.annotations.get(ply).map(Vec::as_slice).unwrap_or_default()
    }

    /// Feeds one PGN event into the game.
    ///
    /// A `FEN` tag restarts the game from that position, and a `Variant`
    /// tag switches the rule set when no move has been played yet. A result
    /// token ends the game unless it has already ended on the board.
    pub fn apply_event(&mut self, event: PgnEvent) -> Result<(), GameError> {
        match event {
            PgnEvent::Header { key, value } => {
                if key.eq_ignore_ascii_case("FEN") {
                    let position = Position::new(&self.config, &StartingLayout::Fen(value.clone()))?;
                    self.reset(position);
                } else if key.eq_ignore_ascii_case("Variant") && self.ply_count() == 0 {
                    match value.parse::<Variant>() {
                        Ok(variant) if variant != self.config.variant => {
                            self.config.variant = variant;
                            // Tag order is free, so an earlier FEN tag still sets the board.
                            let layout = self
                                .headers
                                .iter()
                                .find(|(k, _)| k.eq_ignore_ascii_case("FEN"))
                                .map_or(StartingLayout::Standard, |(_, fen)| {
                                    StartingLayout::Fen(fen.clone())
                                });
                            let position = Position::new(&self.config, &layout)?;
                            self.reset(position);
                        }
                        Ok(_) => {}
                        Err(reason) => tracing::debug!(%reason, "ignoring Variant tag"),
                    }
                }
                self.set_header(key, value);
            }
            PgnEvent::Move(san) => {
                self.play_san(&san)?;
            }
            PgnEvent::Annotation(text) => self.annotate(text),
            PgnEvent::Result(token) => {
                if let Some(result) = GameResult::from_pgn_token(&token) {
                    if self.result.is_none() {
                        self.finish(result);
                    }
                }
                self.set_header("Result", token.trim());
            }
        }
        Ok(())
    }

    /// Returns the current position as a FEN string.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Generates SAN (with check suffix) for a move in the current position.
    pub fn move_to_san(&mut self, m: Move) -> String {
        move_to_san(&mut self.position, m)
    }

    /// Parses SAN and returns the corresponding move.
    pub fn san_to_move(&mut self, san: &str) -> Result<Move, GameError> {
        Ok(san_to_move(&mut self.position, san)?)
    }

    /// SAN for every move of the game. Stored SAN is used when the position
    /// annotates moves; otherwise the game is replayed from the start.
    pub fn san_moves(&self) -> Vec<String> {
        if self.position.annotates_san() {
            let stored: Option<Vec<String>> = self
                .moves()
                .iter()
                .map(|m| m.san().map(str::to_string))
                .collect();
            if let Some(stored) = stored {
                return stored;
            }
        }
        let mut replay = self.start.deep_copy(false);
        replay.set_annotate_san(false);
        self.moves()
            .iter()
            .map(|&m| {
                let san = move_to_san(&mut replay, m);
                replay.force_move(m);
                san
            })
            .collect()
    }

    /// The PGN movetext: numbered SAN moves, `{}` comments and the result.
    pub fn movetext(&self) -> String {
        let mut text = String::new();
        for comment in self.annotations(0) {
            let _ = write!(text, "{{{comment}}} ");
        }
        let mut number = self.start.fullmove_number();
        let mut side = self.start.side_to_move();
        for (i, san) in self.san_moves().iter().enumerate() {
            match side {
                Color::White => {
                    let _ = write!(text, "{number}. ");
                }
                Color::Black if i == 0 => {
                    let _ = write!(text, "{number}... ");
                }
                Color::Black => {}
            }
            let _ = write!(text, "{san} ");
            for comment in self.annotations(i + 1) {
                let _ = write!(text, "{{{comment}}} ");
            }
            if side == Color::Black {
                number += 1;
            }
            side = side.opposite();
        }
        text.push_str(self.result_token());
        text
    }

    fn result_token(&self) -> &'static str {
        self.result.map_or("*", GameResult::pgn_token)
    }

    /// Exports the game as PGN: the seven-tag roster (with `?` for unknown
    /// values), the remaining tags, a blank line and the movetext.
    pub fn to_pgn(&self) -> String {
        let mut pgn = String::new();
        for key in SEVEN_TAG_ROSTER {
            let value = match key {
                "Result" => self.result_token(),
                _ => self.header(key).unwrap_or("?"),
            };
            let _ = writeln!(pgn, "[{key} \"{}\"]", escape_tag(value));
        }
        for (key, value) in self.headers() {
            if !SEVEN_TAG_ROSTER.contains(&key) {
                let _ = writeln!(pgn, "[{key} \"{}\"]", escape_tag(value));
            }
        }
        pgn.push('\n');
        pgn.push_str(&self.movetext());
        pgn.push('\n');
        pgn
    }
}

fn escape_tag(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
