//! Variant rule sets.
//!
//! A [`Position`] carries one [`RuleSet`] and consults it at two points: the
//! position-legal predicate run after each probe move, and the post-filter
//! run over the surviving legal moves. The remaining trait methods describe
//! capabilities (drops, capture effects) that the board machinery acts on.

mod atomic;
mod crazyhouse;
pub mod fischer_random;
mod losers;
mod standard;
mod suicide;

pub use atomic::Atomic;
pub use crazyhouse::{Bughouse, Crazyhouse};
pub use fischer_random::FischerRandom;
pub use losers::Losers;
pub use standard::StandardChess;
pub use suicide::Suicide;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rookery_core::Color;
use serde::{Deserialize, Serialize};

use crate::movegen::is_in_check;
use crate::{MoveList, Position};

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    /// White wins (checkmate or resignation).
    WhiteWins,
    /// Black wins (checkmate or resignation).
    BlackWins,
    /// Draw with a specific reason.
    Draw(DrawReason),
}

impl GameResult {
    /// The PGN result token.
    pub const fn pgn_token(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw(_) => "1/2-1/2",
        }
    }

    /// Parses a PGN result token. `*` (game in progress) and anything else
    /// unrecognised give `None`; a drawn token becomes a declared draw.
    pub fn from_pgn_token(token: &str) -> Option<Self> {
        match token.trim() {
            "1-0" => Some(GameResult::WhiteWins),
            "0-1" => Some(GameResult::BlackWins),
            "1/2-1/2" | "½-½" => Some(GameResult::Draw(DrawReason::Declared)),
            _ => None,
        }
    }

    /// The decisive result in `winner`'s favour.
    pub const fn win_for(winner: Color) -> Self {
        match winner {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    pub const fn is_draw(self) -> bool {
        matches!(self, GameResult::Draw(_))
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    /// Stalemate - no legal moves but not in check.
    Stalemate,
    /// Insufficient material to checkmate.
    InsufficientMaterial,
    /// 50-move rule (100 half-moves without pawn move or capture) - claimable.
    FiftyMoveRule,
    /// 75-move rule (150 half-moves) - automatic draw.
    SeventyFiveMoveRule,
    /// Threefold repetition - claimable.
    ThreefoldRepetition,
    /// Fivefold repetition - automatic draw.
    FivefoldRepetition,
    /// Draw by agreement.
    Agreement,
    /// Declared by an external source (a PGN result token).
    Declared,
}

/// What happens to the board around a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEffect {
    /// The captured piece leaves the board.
    Remove,
    /// The capturer and every non-pawn piece next to the destination are
    /// removed as well.
    Explode,
    /// The captured piece (a pawn if it was promoted) joins the capturer's
    /// reserve.
    ToReserve,
}

/// The supported variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    #[default]
    Classic,
    Suicide,
    Atomic,
    Crazyhouse,
    Bughouse,
    Losers,
    FischerRandom,
}

impl Variant {
    pub const ALL: [Variant; 7] = [
        Variant::Classic,
        Variant::Suicide,
        Variant::Atomic,
        Variant::Crazyhouse,
        Variant::Bughouse,
        Variant::Losers,
        Variant::FischerRandom,
    ];

    /// The rule set implementing this variant.
    pub fn rules(self) -> Arc<dyn RuleSet> {
        match self {
            Variant::Classic => Arc::new(StandardChess),
            Variant::Suicide => Arc::new(Suicide),
            Variant::Atomic => Arc::new(Atomic),
            Variant::Crazyhouse => Arc::new(Crazyhouse),
            Variant::Bughouse => Arc::new(Bughouse),
            Variant::Losers => Arc::new(Losers),
            Variant::FischerRandom => Arc::new(FischerRandom),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Variant::Classic => "classic",
            Variant::Suicide => "suicide",
            Variant::Atomic => "atomic",
            Variant::Crazyhouse => "crazyhouse",
            Variant::Bughouse => "bughouse",
            Variant::Losers => "losers",
            Variant::FischerRandom => "fischer-random",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| format!("unknown variant: {}", s))
    }
}

/// Per-variant legality policy.
///
/// Implementations override [`is_legal_position`](RuleSet::is_legal_position)
/// and/or [`filter_legal_moves`](RuleSet::filter_legal_moves); the defaults
/// give classic chess.
pub trait RuleSet: fmt::Debug + Send + Sync {
    fn variant(&self) -> Variant;

    /// Called on the position right after a probe move. The default requires
    /// both kings on the board and the side that just moved not in check.
    fn is_legal_position(&self, position: &Position) -> bool {
        position.both_kings_on_board()
            && !is_in_check(position, position.side_to_move().opposite())
    }

    /// Narrows the legal-move set after king-safety filtering.
    fn filter_legal_moves(&self, _position: &Position, _moves: &mut MoveList) {}

    /// True when [`filter_legal_moves`](RuleSet::filter_legal_moves) can
    /// remove moves, so callers resolving one move must consult the full
    /// legal set.
    fn filters_moves(&self) -> bool {
        false
    }

    fn capture_effect(&self) -> CaptureEffect {
        CaptureEffect::Remove
    }

    /// True when reserve pieces may be dropped.
    fn allows_drops(&self) -> bool {
        false
    }

    /// True when a position without both kings cannot be set up.
    fn requires_kings(&self) -> bool {
        true
    }

    fn is_insufficient_material(&self, _position: &Position) -> bool {
        false
    }
}

/// Removes every non-capture when a capture is available.
pub(crate) fn retain_compulsory_captures(moves: &mut MoveList) {
    if moves.iter().any(|m| m.is_capture()) {
        let before = moves.len();
        moves.retain(|m| m.is_capture());
        tracing::debug!(before, after = moves.len(), "compulsory capture filter");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names_round_trip() {
        for variant in Variant::ALL {
            assert_eq!(variant.name().parse::<Variant>(), Ok(variant));
            assert_eq!(variant.rules().variant(), variant);
        }
        assert!("shogi".parse::<Variant>().is_err());
        assert_eq!(" Atomic ".parse::<Variant>(), Ok(Variant::Atomic));
    }

    #[test]
    fn capabilities() {
        assert!(Variant::Crazyhouse.rules().allows_drops());
        assert!(Variant::Bughouse.rules().allows_drops());
        assert!(!Variant::Classic.rules().allows_drops());
        assert_eq!(
            Variant::Atomic.rules().capture_effect(),
            CaptureEffect::Explode
        );
        assert_eq!(
            Variant::Crazyhouse.rules().capture_effect(),
            CaptureEffect::ToReserve
        );
        assert_eq!(
            Variant::Bughouse.rules().capture_effect(),
            CaptureEffect::Remove
        );
        assert!(!Variant::Suicide.rules().requires_kings());
        assert!(Variant::Suicide.rules().filters_moves());
    }

    #[test]
    fn pgn_tokens() {
        assert_eq!(GameResult::WhiteWins.pgn_token(), "1-0");
        assert_eq!(GameResult::BlackWins.pgn_token(), "0-1");
        assert_eq!(
            GameResult::Draw(DrawReason::Stalemate).pgn_token(),
            "1/2-1/2"
        );
        assert_eq!(GameResult::from_pgn_token("0-1"), Some(GameResult::BlackWins));
        assert_eq!(
            GameResult::from_pgn_token(" 1/2-1/2 "),
            Some(GameResult::Draw(DrawReason::Declared))
        );
        assert_eq!(GameResult::from_pgn_token("*"), None);
        assert_eq!(GameResult::win_for(Color::White), GameResult::WhiteWins);
    }
}
