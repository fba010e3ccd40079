//! Strict SAN grammar.
//!
//! Parsing only checks the text: it produces a [`ParsedSan`] record that the
//! engine intersects with the pseudo-legal moves of a position. Trailing
//! check/mate markers, `!`/`?` annotations and an `e.p.` suffix are ignored.

use thiserror::Error;

use crate::{File, Piece, Rank, Square};

/// Errors from SAN grammar validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("empty move text")]
    Empty,

    #[error("invalid SAN: {0}")]
    InvalidFormat(String),
}

/// The structured form of a SAN string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedSan {
    CastleKingside,
    CastleQueenside,
    /// `N@f3`, or `@f3` for a pawn.
    Drop { piece: Piece, to: Square },
    /// `e4`, `e8=Q`.
    PawnPush { to: Square, promotion: Option<Piece> },
    /// `exd5`, `ed5`, or the file-only forms `exd` and `ed`.
    PawnCapture {
        from_file: File,
        to_file: File,
        to_rank: Option<Rank>,
        promotion: Option<Piece>,
    },
    /// `Nf3`, `Nbd7`, `R1e2`, `Qh4xe1`.
    PieceMove {
        piece: Piece,
        from_file: Option<File>,
        from_rank: Option<Rank>,
        capture: bool,
        to: Square,
    },
}

impl ParsedSan {
    /// Parses and validates SAN text.
    pub fn parse(text: &str) -> Result<Self, SanError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(SanError::Empty);
        }
        let invalid = || SanError::InvalidFormat(trimmed.to_string());

        let body = strip_decorations(trimmed);
        if body.is_empty() {
            return Err(invalid());
        }

        match body {
            "O-O" | "0-0" => return Ok(ParsedSan::CastleKingside),
            "O-O-O" | "0-0-0" => return Ok(ParsedSan::CastleQueenside),
            _ => {}
        }

        let chars: Vec<char> = body.chars().collect();

        if let Some(at) = chars.iter().position(|&c| c == '@') {
            let piece = match at {
                0 => Piece::Pawn,
                1 => Piece::from_san_char(chars[0])
                    .filter(|p| *p != Piece::King)
                    .ok_or_else(invalid)?,
                _ => return Err(invalid()),
            };
            let to = square_at(&chars[at + 1..]).ok_or_else(invalid)?;
            if piece == Piece::Pawn && matches!(to.rank(), Rank::R1 | Rank::R8) {
                return Err(invalid());
            }
            return Ok(ParsedSan::Drop { piece, to });
        }

        if let Some(piece) = Piece::from_san_char(chars[0]).filter(|p| *p != Piece::Pawn) {
            return parse_piece_move(piece, &chars[1..]).ok_or_else(invalid);
        }

        parse_pawn_move(&chars).ok_or_else(invalid)
    }

    /// Destination square, when the text names one.
    pub fn destination(&self) -> Option<Square> {
        match *self {
            ParsedSan::Drop { to, .. }
            | ParsedSan::PawnPush { to, .. }
            | ParsedSan::PieceMove { to, .. } => Some(to),
            ParsedSan::PawnCapture {
                to_file,
                to_rank: Some(rank),
                ..
            } => Some(Square::new(to_file, rank)),
            _ => None,
        }
    }
}

fn strip_decorations(mut s: &str) -> &str {
    loop {
        let before = s.len();
        s = s.trim_end_matches(['+', '#', '!', '?']).trim_end();
        if let Some(rest) = s.strip_suffix("e.p.") {
            s = rest.trim_end();
        }
        if s.len() == before {
            return s;
        }
    }
}

fn square_at(chars: &[char]) -> Option<Square> {
    match chars {
        [f, r] => Some(Square::new(File::from_char(*f)?, Rank::from_char(*r)?)),
        _ => None,
    }
}

fn lower_file(c: char) -> Option<File> {
    if c.is_ascii_lowercase() {
        File::from_char(c)
    } else {
        None
    }
}

fn parse_piece_move(piece: Piece, rest: &[char]) -> Option<ParsedSan> {
    if rest.len() < 2 {
        return None;
    }
    let (middle, dest) = rest.split_at(rest.len() - 2);
    let to = square_at(dest).filter(|_| lower_file(dest[0]).is_some())?;

    let (middle, capture) = match middle.split_last() {
        Some(('x', head)) => (head, true),
        _ => (middle, false),
    };

    let (from_file, from_rank) = match middle {
        [] => (None, None),
        [c] => match (lower_file(*c), Rank::from_char(*c)) {
            (Some(f), _) => (Some(f), None),
            (None, Some(r)) => (None, Some(r)),
            _ => return None,
        },
        [f, r] => (Some(lower_file(*f)?), Some(Rank::from_char(*r)?)),
        _ => return None,
    };

    Some(ParsedSan::PieceMove {
        piece,
        from_file,
        from_rank,
        capture,
        to,
    })
}

fn parse_pawn_move(chars: &[char]) -> Option<ParsedSan> {
    let (body, promotion) = split_promotion(chars)?;

    let parsed = match body {
        [f, r] if r.is_ascii_digit() => ParsedSan::PawnPush {
            to: Square::new(lower_file(*f)?, Rank::from_char(*r)?),
            promotion,
        },
        [from, 'x', to] | [from, to] => pawn_capture(*from, *to, None, promotion)?,
        [from, 'x', to, r] | [from, to, r] => {
            pawn_capture(*from, *to, Some(Rank::from_char(*r)?), promotion)?
        }
        _ => return None,
    };

    let rank = match parsed {
        ParsedSan::PawnPush { to, .. } => Some(to.rank()),
        ParsedSan::PawnCapture { to_rank, .. } => to_rank,
        _ => None,
    };
    let on_last_rank = matches!(rank, Some(Rank::R1 | Rank::R8));
    match (promotion.is_some(), rank) {
        (true, Some(_)) if !on_last_rank => None,
        (false, Some(_)) if on_last_rank => None,
        _ => Some(parsed),
    }
}

fn pawn_capture(
    from: char,
    to: char,
    to_rank: Option<Rank>,
    promotion: Option<Piece>,
) -> Option<ParsedSan> {
    let from_file = lower_file(from)?;
    let to_file = lower_file(to)?;
    if from_file.index().abs_diff(to_file.index()) != 1 {
        return None;
    }
    Some(ParsedSan::PawnCapture {
        from_file,
        to_file,
        to_rank,
        promotion,
    })
}

fn split_promotion(chars: &[char]) -> Option<(&[char], Option<Piece>)> {
    match chars.split_last() {
        Some((&last, head)) if last.is_ascii_uppercase() => {
            let piece = Piece::from_san_char(last)
                .filter(|p| !matches!(p, Piece::Pawn | Piece::King))?;
            let head = head.strip_suffix(&['=']).unwrap_or(head);
            Some((head, Some(piece)))
        }
        Some((&'=', _)) => None,
        _ => Some((chars, None)),
    }
}
