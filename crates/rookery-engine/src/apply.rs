//! Move application and rollback.
//!
//! [`Position::force_move`] applies a move without checking it and
//! [`Position::rollback`] takes back the last one. Each move shape has a
//! matching inverse, and everything the inverse needs is either stored on
//! the move (castling rights and fifty-move count before it, the captured
//! piece and its promoted flag) or pushed on the blast stack (atomic
//! explosions). The checked entry points resolve their input against the
//! legal moves first and reject it without touching the position.

use rookery_core::{CastleSide, Color, Move, MoveKind, Piece, Square};

use crate::error::{MoveRejected, RejectReason};
use crate::movegen::{king_attacks, legal_moves};
use crate::position::{Blast, Position};
use crate::rules::CaptureEffect;

impl Position {
    /// Applies a move with no legality check and returns it as stored in
    /// the history (with undo state and, when enabled, SAN).
    ///
    /// Only for moves that came from this position's generator; untrusted
    /// input goes through [`make_move`](Position::make_move),
    /// [`make_lan_move`](Position::make_lan_move) or
    /// [`make_san_move`](Position::make_san_move).
    pub fn force_move(&mut self, mv: Move) -> Move {
        let applied = self.apply(mv, self.annotate_san);
        tracing::trace!(mv = %applied.to_lan(), ply = self.ply, "applied");
        applied
    }

    /// Takes back the last move. Returns `None` when there is nothing to
    /// roll back.
    pub fn rollback(&mut self) -> Option<Move> {
        let undone = self.undo()?;
        tracing::trace!(mv = %undone.to_lan(), ply = self.ply, "rolled back");
        Some(undone)
    }

    /// Applies `mv` and keeps it only if the resulting position is legal
    /// for the rule set. Returns whether the move stayed on the board.
    pub fn try_move(&mut self, mv: Move) -> bool {
        self.apply(mv, self.annotate_san);
        if self.rules.is_legal_position(self) {
            true
        } else {
            self.undo();
            false
        }
    }

    /// Applies the legal move between two squares. A pawn reaching the last
    /// rank promotes to `promotion`, or to a queen when none is given.
    ///
    /// Castling may be named by the king's destination or as king takes
    /// own rook (`e1h1`). In Fischer-Random the destination can coincide
    /// with a plain king step, and then the squares name the king step.
    pub fn make_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    ) -> Result<Move, MoveRejected> {
        let wanted = promotion.unwrap_or(Piece::Queen);
        match self.find_by_squares(from, to, |p| p.map_or(true, |p| p == wanted)) {
            Some(mv) => Ok(self.force_move(mv)),
            None => {
                let attempted = match promotion {
                    Some(p) => format!("{}{}{}", from, to, p.to_fen_char(Color::Black)),
                    None => format!("{}{}", from, to),
                };
                Err(self.reject(RejectReason::Illegal, &attempted))
            }
        }
    }

    /// Applies a move given in long algebraic notation (`e2e4`, `e7e8q`,
    /// `N@f3`), compared case-insensitively. Castling follows the same
    /// square rules as [`make_move`](Position::make_move).
    pub fn make_lan_move(&mut self, lan: &str) -> Result<Move, MoveRejected> {
        let text = lan.trim();
        if text.contains('@') {
            if !self.rules.allows_drops() {
                return Err(self.reject(self.unsupported("drop"), text));
            }
            let found = legal_moves(self)
                .into_iter()
                .find(|m| m.to_lan().eq_ignore_ascii_case(text));
            return match found {
                Some(mv) => Ok(self.force_move(mv)),
                None => Err(self.reject(RejectReason::Illegal, text)),
            };
        }
        let found = parse_lan(text).and_then(|(from, to, promotion)| {
            self.find_by_squares(from, to, |p| p == promotion)
        });
        match found {
            Some(mv) => Ok(self.force_move(mv)),
            None => Err(self.reject(RejectReason::Illegal, text)),
        }
    }

    /// The legal board move from `from` to `to` whose promotion passes
    /// `promotes`. An ordinary move with those exact squares beats a castle
    /// that reaches them.
    fn find_by_squares(
        &mut self,
        from: Square,
        to: Square,
        promotes: impl Fn(Option<Piece>) -> bool,
    ) -> Option<Move> {
        let mut castle = None;
        for mv in legal_moves(self).iter().filter(|m| !m.is_drop() && m.from() == from) {
            if mv.is_castling() {
                if castle.is_none() && (mv.to() == to || self.castle_rook_square(mv) == Some(to)) {
                    castle = Some(*mv);
                }
            } else if mv.to() == to && promotes(mv.promotion()) {
                return Some(*mv);
            }
        }
        castle
    }

    fn castle_rook_square(&self, mv: &Move) -> Option<Square> {
        if !mv.is_castling() {
            return None;
        }
        Some(self.castle_path(mv.color(), castle_side(mv.kind())).rook_from)
    }

    /// Drops a reserve piece on `to`.
    pub fn make_drop_move(&mut self, piece: Piece, to: Square) -> Result<Move, MoveRejected> {
        let attempted = format!("{}@{}", piece.to_san_char(), to);
        if !self.rules.allows_drops() {
            return Err(self.reject(self.unsupported("drop"), &attempted));
        }
        let found = legal_moves(self)
            .into_iter()
            .find(|m| m.is_drop() && m.piece() == piece && m.to() == to);
        match found {
            Some(mv) => Ok(self.force_move(mv)),
            None => Err(self.reject(RejectReason::Illegal, &attempted)),
        }
    }

    pub(crate) fn unsupported(&self, operation: &'static str) -> RejectReason {
        RejectReason::Unsupported {
            operation,
            variant: self.variant(),
        }
    }

    /// Builds the rejection for `attempted`, with a dump of the position.
    pub(crate) fn reject(&self, reason: RejectReason, attempted: &str) -> MoveRejected {
        tracing::debug!(attempted, %reason, "move rejected");
        MoveRejected {
            reason,
            attempted: attempted.to_string(),
            position: self.to_string(),
        }
    }

    /// The application primitive behind every entry point. `annotate`
    /// computes SAN before the move and the check suffix after it.
    pub(crate) fn apply(&mut self, mut mv: Move, annotate: bool) -> Move {
        mv.record_undo_state(self.castling, self.fifty_move_count);
        if annotate {
            let san = self.san_body(&mv);
            mv.set_san(&san);
        }

        let us = mv.color();
        let mut captured = None;
        match mv.kind() {
            MoveKind::CastleKingside | MoveKind::CastleQueenside => {
                let path = self.castle_path(us, castle_side(mv.kind()));
                let king = self.take(path.king_from);
                let rook = self.take(path.rook_from);
                if let Some((piece, color, promoted)) = king {
                    self.put(path.king_to, piece, color, promoted);
                }
                if let Some((piece, color, promoted)) = rook {
                    self.put(path.rook_to, piece, color, promoted);
                }
                self.castling.revoke_color(us);
            }
            MoveKind::Drop => {
                let count = &mut self.drop_counts[us.index()][mv.piece().index()];
                *count = count.wrapping_sub(1);
                self.put(mv.to(), mv.piece(), us, false);
            }
            MoveKind::EnPassant => {
                if let Some(victim) = mv.to().offset(-us.pawn_push_delta()) {
                    captured = self.take(victim);
                }
                self.shift_piece(mv.from(), mv.to(), None);
            }
            MoveKind::Normal | MoveKind::DoublePawnPush | MoveKind::Promotion => {
                captured = self.take(mv.to());
                self.shift_piece(mv.from(), mv.to(), mv.promotion());
                if mv.piece() == Piece::King {
                    self.castling.revoke_color(us);
                }
            }
        }

        if let Some((piece, _, promoted)) = captured {
            mv = mv.with_capture_promoted(promoted);
            match self.rules.capture_effect() {
                CaptureEffect::Remove => {}
                CaptureEffect::Explode => self.explode(mv.to()),
                CaptureEffect::ToReserve => {
                    let kind = if promoted { Piece::Pawn } else { piece };
                    let count = &mut self.drop_counts[us.index()][kind.index()];
                    *count = count.wrapping_add(1);
                }
            }
        }
        self.revoke_vacated_rights();

        if captured.is_some() || mv.piece() == Piece::Pawn {
            self.fifty_move_count = 0;
        } else {
            self.fifty_move_count += 1;
        }
        self.en_passant = mv.ep_square();
        self.side_to_move = us.opposite();
        self.refresh_not_to_move();
        self.ply += 1;
        self.refresh_game_hash();
        if let Some(table) = self.repetition.as_mut() {
            table.increment(self.position_hash);
        }
        self.history.push(mv);

        if annotate {
            let them = self.side_to_move;
            if self.is_in_check(them) {
                let suffix = if legal_moves(self).is_empty() { '#' } else { '+' };
                if let Some(last) = self.history.last_mut() {
                    last.push_san_suffix(suffix);
                }
            }
        }
        self.history.last().copied().unwrap_or(mv)
    }

    /// The exact inverse of [`apply`](Position::apply) for the last move.
    pub(crate) fn undo(&mut self) -> Option<Move> {
        let mv = self.history.pop()?;
        if let Some(table) = self.repetition.as_mut() {
            table.decrement(self.position_hash);
        }
        let us = mv.color();

        if mv.is_capture() {
            match self.rules.capture_effect() {
                CaptureEffect::Remove => {}
                CaptureEffect::Explode => self.unexplode(),
                CaptureEffect::ToReserve => {
                    let kind = if mv.is_capture_promoted() {
                        Piece::Pawn
                    } else {
                        mv.capture().unwrap_or(Piece::Pawn)
                    };
                    let count = &mut self.drop_counts[us.index()][kind.index()];
                    *count = count.wrapping_sub(1);
                }
            }
        }

        match mv.kind() {
            MoveKind::CastleKingside | MoveKind::CastleQueenside => {
                let path = self.castle_path(us, castle_side(mv.kind()));
                let king = self.take(path.king_to);
                let rook = self.take(path.rook_to);
                if let Some((piece, color, promoted)) = king {
                    self.put(path.king_from, piece, color, promoted);
                }
                if let Some((piece, color, promoted)) = rook {
                    self.put(path.rook_from, piece, color, promoted);
                }
            }
            MoveKind::Drop => {
                self.take(mv.to());
                let count = &mut self.drop_counts[us.index()][mv.piece().index()];
                *count = count.wrapping_add(1);
            }
            MoveKind::EnPassant => {
                self.unshift_piece(&mv);
                if let Some(victim) = mv.to().offset(-us.pawn_push_delta()) {
                    self.put(victim, Piece::Pawn, us.opposite(), mv.is_capture_promoted());
                }
            }
            MoveKind::Normal | MoveKind::DoublePawnPush | MoveKind::Promotion => {
                self.unshift_piece(&mv);
                if let Some(piece) = mv.capture() {
                    self.put(mv.to(), piece, us.opposite(), mv.is_capture_promoted());
                }
            }
        }

        self.castling = mv.previous_castling();
        self.fifty_move_count = mv.previous_fifty_move_count();
        self.side_to_move = us;
        self.refresh_not_to_move();
        self.ply = self.ply.saturating_sub(1);
        self.en_passant = match self.history.last() {
            Some(previous) => previous.ep_square(),
            None => self.initial_en_passant,
        };
        self.refresh_game_hash();
        Some(mv)
    }

    /// Moves the piece on `from` to `to`, optionally changing its kind. A
    /// piece that changes kind is marked promoted.
    fn shift_piece(&mut self, from: Square, to: Square, promotion: Option<Piece>) {
        if let Some((piece, color, promoted)) = self.take(from) {
            match promotion {
                Some(new_kind) => self.put(to, new_kind, color, true),
                None => self.put(to, piece, color, promoted),
            }
        }
    }

    /// Returns the moved piece from `mv.to()` to `mv.from()`, turning a
    /// promoted piece back into a pawn.
    fn unshift_piece(&mut self, mv: &Move) {
        if let Some((piece, color, promoted)) = self.take(mv.to()) {
            if mv.is_promotion() {
                self.put(mv.from(), Piece::Pawn, color, false);
            } else {
                self.put(mv.from(), piece, color, promoted);
            }
        }
    }

    /// Removes the capturer on `at` and every non-pawn neighbour, recording
    /// them for [`unexplode`](Position::unexplode).
    fn explode(&mut self, at: Square) {
        let mut blast = Blast::new();
        let neighbours = king_attacks(at);
        let victims = std::iter::once(at).chain(
            neighbours
                .into_iter()
                .filter(|&sq| matches!(self.piece_at(sq), Some((p, _)) if p != Piece::Pawn)),
        );
        let victims: Vec<Square> = victims.collect();
        for sq in victims {
            if let Some((piece, color, promoted)) = self.take(sq) {
                blast.push((sq, piece, color, promoted));
            }
        }
        self.blasts.push(blast);
    }

    fn unexplode(&mut self) {
        if let Some(blast) = self.blasts.pop() {
            for (sq, piece, color, promoted) in blast {
                self.put(sq, piece, color, promoted);
            }
        }
    }
}

fn castle_side(kind: MoveKind) -> CastleSide {
    match kind {
        MoveKind::CastleQueenside => CastleSide::Queenside,
        _ => CastleSide::Kingside,
    }
}

/// Splits `e2e4` / `e7e8q` into squares and an optional promotion piece.
fn parse_lan(text: &str) -> Option<(Square, Square, Option<Piece>)> {
    let from = Square::from_algebraic(text.get(0..2)?)?;
    let to = Square::from_algebraic(text.get(2..4)?)?;
    let promotion = match text.get(4..)? {
        "" => None,
        letter => {
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(Piece::from_fen_char(c)?.0),
                _ => return None,
            }
        }
    };
    Some((from, to, promotion))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Variant;
    use rookery_core::{CastlingRights, Fen};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn quiet_move_and_rollback() {
        let mut position = Position::startpos();
        let hash = position.game_hash();
        let mv = position.make_move(sq("g1"), sq("f3"), None).unwrap();
        assert_eq!(mv.previous_fifty_move_count(), 0);
        assert_eq!(position.fifty_move_count(), 1);
        assert_eq!(position.side_to_move(), Color::Black);
        assert_eq!(position.ply(), 1);
        position.check_invariants().unwrap();

        assert_eq!(position.rollback(), Some(mv));
        assert_eq!(position.to_fen(), Fen::STARTPOS);
        assert_eq!(position.game_hash(), hash);
        assert_eq!(position.rollback(), None);
    }

    #[test]
    fn double_push_sets_en_passant_target() {
        let mut position = Position::startpos();
        position.make_lan_move("e2e4").unwrap();
        assert_eq!(position.en_passant(), Some(sq("e3")));
        position.make_lan_move("g8f6").unwrap();
        assert_eq!(position.en_passant(), None);
        position.rollback();
        assert_eq!(position.en_passant(), Some(sq("e3")));
    }

    #[test]
    fn en_passant_removes_pawn_behind_target() {
        let mut position = Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let before = position.to_fen();
        position.make_lan_move("e5d6").unwrap();
        assert_eq!(position.piece_at(sq("d5")), None);
        assert_eq!(position.piece_at(sq("d6")), Some((Piece::Pawn, Color::White)));
        position.check_invariants().unwrap();
        position.rollback();
        assert_eq!(position.to_fen(), before);
        assert_eq!(position.en_passant(), Some(sq("d6")));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let mut position = Position::from_fen("8/P3k3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        position.make_move(sq("a7"), sq("a8"), None).unwrap();
        assert_eq!(position.piece_at(sq("a8")), Some((Piece::Queen, Color::White)));
        assert!(position.is_promoted(sq("a8")));
        assert_eq!(position.piece_count(Color::White, Piece::Pawn), 0);
        position.rollback();
        assert_eq!(position.piece_at(sq("a7")), Some((Piece::Pawn, Color::White)));
        assert!(!position.is_promoted(sq("a7")));

        position.make_move(sq("a7"), sq("a8"), Some(Piece::Knight)).unwrap();
        assert_eq!(position.piece_at(sq("a8")), Some((Piece::Knight, Color::White)));
    }

    #[test]
    fn castling_moves_both_pieces() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        position.make_move(sq("e1"), sq("g1"), None).unwrap();
        assert_eq!(position.piece_at(sq("g1")), Some((Piece::King, Color::White)));
        assert_eq!(position.piece_at(sq("f1")), Some((Piece::Rook, Color::White)));
        assert_eq!(position.castling_rights().to_fen_field(), "kq");
        position.make_lan_move("e8c8").unwrap();
        assert_eq!(position.piece_at(sq("d8")), Some((Piece::Rook, Color::Black)));
        assert!(position.castling_rights().is_empty());
        position.rollback();
        position.rollback();
        assert_eq!(position.castling_rights(), CastlingRights::ALL);
        position.check_invariants().unwrap();
    }

    #[test]
    fn fischer_random_king_step_and_castle_share_squares() {
        let fen = "4k3/8/8/8/8/8/8/5K1R w K - 0 1";
        let mut position = Position::from_fen_with_variant(fen, Variant::FischerRandom).unwrap();
        let mv = position.make_move(sq("f1"), sq("g1"), None).unwrap();
        assert_eq!(mv.kind(), MoveKind::Normal);
        assert_eq!(position.to_fen(), "4k3/8/8/8/8/8/8/6KR b - - 1 1");
        position.rollback();

        let mv = position.make_lan_move("f1h1").unwrap();
        assert_eq!(mv.kind(), MoveKind::CastleKingside);
        assert_eq!(position.to_fen(), "4k3/8/8/8/8/8/8/5RK1 b - - 1 1");
        position.rollback();
        assert_eq!(position.to_fen(), fen);
    }

    #[test]
    fn classic_castling_accepts_king_takes_rook() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(position.make_lan_move("e1a1").unwrap().is_castling());
        assert_eq!(position.piece_at(sq("c1")), Some((Piece::King, Color::White)));
        assert!(position.make_lan_move("e8g8").unwrap().is_castling());
        assert!(position.make_lan_move("c1c2q").unwrap_err().is_illegal());
        assert!(position.make_lan_move("c1").unwrap_err().is_illegal());
    }

    #[test]
    fn captured_rook_loses_and_regains_right() {
        let mut position = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        position.make_lan_move("h1h8").unwrap();
        assert_eq!(position.castling_rights().to_fen_field(), "Qq");
        position.rollback();
        assert_eq!(position.castling_rights(), CastlingRights::ALL);
    }

    #[test]
    fn rejected_input_leaves_position_unchanged() {
        let mut position = Position::startpos();
        let err = position.make_move(sq("e2"), sq("e5"), None).unwrap_err();
        assert!(err.is_illegal());
        assert_eq!(err.attempted, "e2e5");
        assert!(err.position.contains("FEN:"));
        assert!(position.make_lan_move("e7e5").is_err());
        assert_eq!(position.to_fen(), Fen::STARTPOS);
        assert!(position.history().is_empty());
    }

    #[test]
    fn drop_is_unsupported_in_classic() {
        let mut position = Position::startpos();
        let err = position.make_drop_move(Piece::Knight, sq("e4")).unwrap_err();
        assert!(err.is_unsupported());
        let err = position.make_lan_move("N@e4").unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(position.to_fen(), Fen::STARTPOS);
    }

    #[test]
    fn drop_and_rollback() {
        let mut position = Position::from_fen_with_variant(
            "4k3/8/8/8/8/8/8/4K3[Nn] w - - 0 1",
            Variant::Crazyhouse,
        )
        .unwrap();
        position.make_drop_move(Piece::Knight, sq("e4")).unwrap();
        assert_eq!(position.drop_count(Color::White, Piece::Knight), 0);
        assert_eq!(position.piece_at(sq("e4")), Some((Piece::Knight, Color::White)));
        assert_eq!(position.fifty_move_count(), 1);
        position.rollback();
        assert_eq!(position.drop_count(Color::White, Piece::Knight), 1);
        assert_eq!(position.piece_at(sq("e4")), None);
        assert!(position.make_drop_move(Piece::Queen, sq("e4")).unwrap_err().is_illegal());
    }

    #[test]
    fn try_move_rolls_back_illegal_moves() {
        let mut position = Position::from_fen("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let pinned = Move::new(sq("e2"), sq("c3"), Piece::Knight, Color::White, None);
        assert!(!position.try_move(pinned));
        assert!(position.history().is_empty());
        let king = Move::new(sq("e1"), sq("d1"), Piece::King, Color::White, None);
        assert!(position.try_move(king));
        assert_eq!(position.history().len(), 1);
    }

    #[test]
    fn san_is_recorded_when_enabled() {
        let mut position = Position::startpos();
        position.set_annotate_san(true);
        let mv = position.make_lan_move("g1f3").unwrap();
        assert_eq!(mv.san(), Some("Nf3"));
        assert_eq!(position.history()[0].san(), Some("Nf3"));
    }

    #[test]
    fn repetition_counts_follow_the_line() {
        let mut position = Position::startpos();
        for lan in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            position.make_lan_move(lan).unwrap();
        }
        assert_eq!(position.repetition_count(), 2);
        position.rollback();
        assert_eq!(position.repetition_count(), 1);
    }
}
