//! Standard Algebraic Notation (SAN) generation and resolution.
//!
//! SAN is the standard way to record chess moves in human-readable form.
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1", "N@f3".
//!
//! Parsing the text is [`ParsedSan`]'s job. This module matches the parsed
//! record against the position's moves, and renders moves back to text
//! with the shortest disambiguation that identifies them.

use rookery_core::{Move, ParsedSan, Piece};

use crate::error::{MoveRejected, RejectReason};
use crate::movegen::{legal_moves, pseudo_legal_moves};
use crate::Position;

/// Converts a move to SAN, including the `+` or `#` suffix.
///
/// The position must be the state BEFORE the move is made, and the move
/// must be legal in it. The position is back in that state on return.
pub fn move_to_san(position: &mut Position, m: Move) -> String {
    let mut san = position.san_body(&m);
    position.apply(m, false);
    let them = position.side_to_move();
    if position.is_in_check(them) {
        san.push(if legal_moves(position).is_empty() { '#' } else { '+' });
    }
    position.undo();
    san
}

/// Resolves SAN text to the one legal move it names.
///
/// # Errors
///
/// The rejection is `Malformed` when the text fails the grammar, `Illegal`
/// when no legal move matches, `Ambiguous` when several do, and
/// `Unsupported` for a drop in a variant without reserves. The position is
/// unchanged in every case.
pub fn san_to_move(position: &mut Position, san: &str) -> Result<Move, MoveRejected> {
    let text = san.trim();
    let parsed = ParsedSan::parse(text).map_err(|e| position.reject(e.into(), text))?;
    if matches!(parsed, ParsedSan::Drop { .. }) && !position.rules.allows_drops() {
        return Err(position.reject(position.unsupported("drop"), text));
    }

    let candidates: Vec<Move> = pseudo_legal_moves(position)
        .into_iter()
        .filter(|m| matches_parsed(&parsed, m))
        .collect();
    let survivors: Vec<Move> = candidates
        .into_iter()
        .filter(|m| position.is_legal_move(*m))
        .collect();

    match survivors.as_slice() {
        [] => Err(position.reject(RejectReason::Illegal, text)),
        [only] => {
            if position.rules.filters_moves() && !legal_moves(position).contains(only) {
                return Err(position.reject(RejectReason::Illegal, text));
            }
            Ok(*only)
        }
        several => {
            let candidates: Vec<String> = several.iter().map(|m| m.to_lan()).collect();
            tracing::debug!(san = text, ?candidates, "ambiguous SAN");
            Err(position.reject(RejectReason::Ambiguous { candidates }, text))
        }
    }
}

fn matches_parsed(parsed: &ParsedSan, m: &Move) -> bool {
    match *parsed {
        ParsedSan::CastleKingside => m.kind() == rookery_core::MoveKind::CastleKingside,
        ParsedSan::CastleQueenside => m.kind() == rookery_core::MoveKind::CastleQueenside,
        ParsedSan::Drop { piece, to } => m.is_drop() && m.piece() == piece && m.to() == to,
        ParsedSan::PawnPush { to, promotion } => {
            m.piece() == Piece::Pawn
                && !m.is_drop()
                && !m.is_capture()
                && m.to() == to
                && m.promotion() == promotion
        }
        ParsedSan::PawnCapture {
            from_file,
            to_file,
            to_rank,
            promotion,
        } => {
            m.piece() == Piece::Pawn
                && m.is_capture()
                && m.from().file() == from_file
                && m.to().file() == to_file
                && to_rank.map_or(true, |rank| m.to().rank() == rank)
                && m.promotion() == promotion
        }
        ParsedSan::PieceMove {
            piece,
            from_file,
            from_rank,
            to,
            ..
        } => {
            m.piece() == piece
                && !m.is_drop()
                && !m.is_castling()
                && m.to() == to
                && from_file.map_or(true, |file| m.from().file() == file)
                && from_rank.map_or(true, |rank| m.from().rank() == rank)
        }
    }
}

impl Position {
    /// Resolves SAN text and applies the move. The stored move carries the
    /// canonical SAN when annotation is on, otherwise the text as given.
    pub fn make_san_move(&mut self, san: &str) -> Result<Move, MoveRejected> {
        let mut mv = san_to_move(self, san)?;
        if !self.annotate_san {
            mv.set_san(san.trim());
        }
        Ok(self.force_move(mv))
    }

    /// SAN without the check suffix, for a move about to be applied.
    pub(crate) fn san_body(&mut self, m: &Move) -> String {
        let mut san = String::with_capacity(8);
        match m.kind() {
            rookery_core::MoveKind::CastleKingside => return "O-O".to_string(),
            rookery_core::MoveKind::CastleQueenside => return "O-O-O".to_string(),
            rookery_core::MoveKind::Drop => {
                return format!("{}@{}", m.piece().to_san_char(), m.to());
            }
            _ => {}
        }

        if m.piece() == Piece::Pawn {
            if m.is_capture() {
                san.push(m.from().file().to_char());
                san.push('x');
            }
        } else {
            san.push(m.piece().to_san_char());
            san.push_str(&self.disambiguation(m));
            if m.is_capture() {
                san.push('x');
            }
        }
        san.push_str(&m.to().to_algebraic());
        if let Some(promotion) = m.promotion() {
            san.push('=');
            san.push(promotion.to_san_char());
        }
        san
    }

    /// Origin file, rank, or both, when another legal move of the same
    /// piece kind reaches the same square. The file wins when it is unique
    /// among the rivals, then the rank.
    fn disambiguation(&mut self, m: &Move) -> String {
        let rivals: Vec<_> = pseudo_legal_moves(self)
            .into_iter()
            .filter(|other| {
                other.piece() == m.piece()
                    && other.to() == m.to()
                    && other.from() != m.from()
                    && !other.is_drop()
                    && !other.is_castling()
            })
            .collect();
        let rivals: Vec<_> = rivals
            .into_iter()
            .filter(|other| self.is_legal_move(*other))
            .map(|other| other.from())
            .collect();

        if rivals.is_empty() {
            return String::new();
        }
        let from = m.from();
        if rivals.iter().all(|sq| sq.file() != from.file()) {
            from.file().to_char().to_string()
        } else if rivals.iter().all(|sq| sq.rank() != from.rank()) {
            from.rank().to_char().to_string()
        } else {
            from.to_algebraic()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Variant;
    use rookery_core::{Color, File, MoveKind, Rank, Square};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn find(pos: &mut Position, lan: &str) -> Move {
        pos.legal_moves()
            .into_iter()
            .find(|m| m.to_lan() == lan)
            .unwrap()
    }

    fn san_of(fen: &str, lan: &str) -> String {
        let mut pos = Position::from_fen(fen).unwrap();
        let m = find(&mut pos, lan);
        move_to_san(&mut pos, m)
    }

    #[test]
    fn san_pawn_push() {
        let mut pos = Position::startpos();
        let m = find(&mut pos, "e2e4");
        assert_eq!(move_to_san(&mut pos, m), "e4");
    }

    #[test]
    fn san_knight_move() {
        let mut pos = Position::startpos();
        let m = find(&mut pos, "g1f3");
        assert_eq!(move_to_san(&mut pos, m), "Nf3");
    }

    #[test]
    fn san_pawn_capture() {
        assert_eq!(
            san_of(
                "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
                "e4d5"
            ),
            "exd5"
        );
    }

    #[test]
    fn san_en_passant() {
        assert_eq!(san_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", "e5d6"), "exd6");
    }

    #[test]
    fn san_castling() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        assert_eq!(san_of(fen, "e1g1"), "O-O");
        assert_eq!(san_of(fen, "e1c1"), "O-O-O");
    }

    #[test]
    fn san_promotion() {
        // Position where promotion doesn't give check
        assert_eq!(san_of("8/P7/8/8/8/8/8/4K1k1 w - - 0 1", "a7a8q"), "a8=Q");
        assert_eq!(san_of("8/P7/8/8/8/8/8/4K1k1 w - - 0 1", "a7a8n"), "a8=N");
    }

    #[test]
    fn san_knight_disambiguation_file() {
        // Knights on b1 and f1 both reach d2.
        assert_eq!(san_of("7k/8/8/8/8/8/8/1N1K1N2 w - - 0 1", "b1d2"), "Nbd2");
    }

    #[test]
    fn san_rook_disambiguation_rank() {
        // Rooks on a1 and a5 share a file, so the rank tells them apart.
        assert_eq!(san_of("7k/8/8/R7/8/8/8/R3K3 w - - 0 1", "a1a3"), "R1a3");
        assert_eq!(san_of("7k/8/8/R7/8/8/8/R3K3 w - - 0 1", "a5a3"), "R5a3");
    }

    #[test]
    fn san_queen_disambiguation_both() {
        // Queens on d4, d6 and f4 all reach e5. d4 shares a file with d6
        // and a rank with f4.
        let fen = "k7/8/3Q4/8/3Q1Q2/8/8/K7 w - - 0 1";
        assert_eq!(san_of(fen, "d4e5"), "Qd4e5");
        assert_eq!(san_of(fen, "f4e5"), "Qfe5");
        assert_eq!(san_of(fen, "d6e5"), "Q6e5");
    }

    #[test]
    fn pinned_rival_does_not_disambiguate() {
        // The knight on e2 is pinned, so Nc3 needs no file.
        assert_eq!(
            san_of("4k3/4r3/8/8/8/8/4N3/1N2K3 w - - 0 1", "b1c3"),
            "Nc3"
        );
    }

    #[test]
    fn san_check() {
        assert_eq!(san_of("8/8/8/8/8/8/8/4K1Qk w - - 0 1", "g1h2"), "Qh2+");
    }

    #[test]
    fn san_checkmate() {
        // Back rank mate
        assert_eq!(san_of("6k1/5ppp/8/8/8/8/8/R3K3 w Q - 0 1", "a1a8"), "Ra8#");
    }

    #[test]
    fn san_drop() {
        let mut pos = Position::from_fen_with_variant(
            "4k3/8/8/8/8/8/8/4K3[P] w - - 0 1",
            Variant::Crazyhouse,
        )
        .unwrap();
        let m = find(&mut pos, "P@e4");
        assert_eq!(move_to_san(&mut pos, m), "P@e4");
    }

    #[test]
    fn parse_san_pawn_push() {
        let mut pos = Position::startpos();
        let m = san_to_move(&mut pos, "e4").unwrap();
        assert_eq!(m.to(), Square::new(File::E, Rank::R4));
        assert_eq!(m.kind(), MoveKind::DoublePawnPush);
    }

    #[test]
    fn parse_san_knight_move() {
        let mut pos = Position::startpos();
        let m = san_to_move(&mut pos, "Nf3").unwrap();
        assert_eq!(m.from(), sq("g1"));
        assert_eq!(m.to(), sq("f3"));
    }

    #[test]
    fn parse_san_castling() {
        let mut pos =
            Position::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        let m = san_to_move(&mut pos, "O-O").unwrap();
        assert_eq!(m.kind(), MoveKind::CastleKingside);

        let m = san_to_move(&mut pos, "0-0-0").unwrap();
        assert_eq!(m.kind(), MoveKind::CastleQueenside);
    }

    #[test]
    fn parse_san_with_suffixes() {
        let mut pos = Position::from_fen("8/8/8/8/8/8/8/4K1Qk w - - 0 1").unwrap();
        let m = san_to_move(&mut pos, "Qh2+!?").unwrap();
        assert_eq!(m.to(), sq("h2"));
    }

    #[test]
    fn parse_short_pawn_captures() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2";
        for text in ["exd5", "ed5", "exd", "ed"] {
            let mut pos = Position::from_fen(fen).unwrap();
            let m = san_to_move(&mut pos, text).unwrap();
            assert_eq!(m.to_lan(), "e4d5", "{text}");
        }
    }

    #[test]
    fn parse_piece_capture_flag_is_optional() {
        let fen = "rnbqkbnr/ppp1pppp/8/3p4/8/2N5/PPPPPPPP/R1BQKBNR w KQkq - 0 2";
        let mut pos = Position::from_fen(fen).unwrap();
        assert_eq!(san_to_move(&mut pos, "Nd5").unwrap().to_lan(), "c3d5");
        assert_eq!(san_to_move(&mut pos, "Nxd5").unwrap().to_lan(), "c3d5");
    }

    #[test]
    fn parse_san_rejections() {
        let mut pos = Position::startpos();
        let err = san_to_move(&mut pos, "").unwrap_err();
        assert!(matches!(err.reason, RejectReason::Malformed(_)));
        let err = san_to_move(&mut pos, "Ke4").unwrap_err();
        assert!(err.is_illegal());
        assert_eq!(err.attempted, "Ke4");
        assert!(san_to_move(&mut pos, "xyz").is_err());
        let err = san_to_move(&mut pos, "N@e4").unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn parse_ambiguous() {
        let mut pos = Position::from_fen("7k/8/8/8/8/8/8/1N1K1N2 w - - 0 1").unwrap();
        let err = san_to_move(&mut pos, "Nd2").unwrap_err();
        assert!(err.is_ambiguous());
        match err.reason {
            RejectReason::Ambiguous { candidates } => {
                assert_eq!(candidates, vec!["b1d2".to_string(), "f1d2".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(san_to_move(&mut pos, "Nfd2").unwrap().from(), sq("f1"));
    }

    #[test]
    fn parse_promotion_must_match() {
        let mut pos = Position::from_fen("8/P7/8/8/8/8/8/4K1k1 w - - 0 1").unwrap();
        assert_eq!(
            san_to_move(&mut pos, "a8=R").unwrap().promotion(),
            Some(Piece::Rook)
        );
        assert_eq!(
            san_to_move(&mut pos, "a8Q").unwrap().promotion(),
            Some(Piece::Queen)
        );
        assert!(san_to_move(&mut pos, "a8").is_err());
    }

    #[test]
    fn filtered_moves_are_rejected() {
        // In suicide the capture is compulsory, so the quiet king move
        // resolves but is not in the legal set.
        let mut pos = Position::from_fen_with_variant(
            "4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1",
            Variant::Suicide,
        )
        .unwrap();
        assert!(san_to_move(&mut pos, "Kd1").unwrap_err().is_illegal());
        assert!(san_to_move(&mut pos, "exd5").is_ok());
    }

    #[test]
    fn make_san_move_records_text() {
        let mut pos = Position::startpos();
        let m = pos.make_san_move(" e4 ").unwrap();
        assert_eq!(m.san(), Some("e4"));
        assert_eq!(pos.side_to_move(), Color::Black);

        let mut annotated = Position::startpos();
        annotated.set_annotate_san(true);
        let m = annotated.make_san_move("Ng1f3").unwrap();
        assert_eq!(m.san(), Some("Nf3"));
    }

    #[test]
    fn san_roundtrip() {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        for m in pos.legal_moves() {
            let san = move_to_san(&mut pos, m);
            let parsed = san_to_move(&mut pos, &san).unwrap();
            assert_eq!(m, parsed, "roundtrip failed for {}", san);
        }
    }
}
