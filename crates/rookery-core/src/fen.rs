//! FEN (Forsyth-Edwards Notation) parsing and serialization.
//!
//! [`Fen`] is a typed record of the six FEN fields. The placement field may
//! carry crazyhouse holdings as a bracketed suffix (`.../RNBQKBNR[Qn]`).
//! The two counters may be omitted, in which case they default to `0 1`.

use thiserror::Error;

use std::cmp::Ordering;

use crate::{CastleSide, CastlingRights, Color, File, Piece, Rank, Square};

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 4 or 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid holdings: {0}")]
    InvalidHoldings(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// A parsed FEN record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fen {
    /// Occupied squares in a1..h8 order.
    pub pieces: Vec<(Square, Piece, Color)>,
    /// Reserve pieces, if the placement field carried holdings.
    pub holdings: Option<Vec<(Piece, Color)>>,
    pub side_to_move: Color,
    pub castling: CastlingRights,
    /// Castling rooks named by file letter (Shredder/X-FEN), indexed
    /// `[color][side]`. `None` means the outermost rook on that side.
    pub castling_files: [[Option<File>; 2]; 2],
    pub en_passant: Option<Square>,
    /// Halfmove clock (for the fifty-move rule).
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Fen {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() != 6 && parts.len() != 4 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let (board, holdings) = split_holdings(parts[0])?;
        let pieces = parse_placement(board)?;
        let holdings = holdings.map(parse_holdings).transpose()?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let (castling, castling_files) = parse_castling(parts[2], &pieces)?;

        let en_passant = parse_en_passant(parts[3])?;

        let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
            let halfmove = parts[4]
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;
            let fullmove = parts[5]
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;
            (halfmove, fullmove)
        } else {
            (0, 1)
        };

        Ok(Fen {
            pieces,
            holdings,
            side_to_move,
            castling,
            castling_files,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Renders the castling field. Rooks named by file when parsed keep
    /// their file letter, so Shredder-style input round-trips.
    pub fn castling_field(&self) -> String {
        if self.castling.is_empty() {
            return "-".to_string();
        }
        let mut field = String::with_capacity(4);
        for color in Color::ALL {
            for side in CastleSide::ALL {
                if !self.castling.has(color, side) {
                    continue;
                }
                let letter = match (self.castling_files[color.index()][side.index()], side) {
                    (Some(file), _) => file.to_char(),
                    (None, CastleSide::Kingside) => 'k',
                    (None, CastleSide::Queenside) => 'q',
                };
                field.push(match color {
                    Color::White => letter.to_ascii_uppercase(),
                    Color::Black => letter,
                });
            }
        }
        field
    }

    /// Renders the placement field (without holdings).
    pub fn placement_field(&self) -> String {
        let mut grid = [[None; 8]; 8];
        for &(square, piece, color) in &self.pieces {
            grid[square.rank().index() as usize][square.file().index() as usize] =
                Some(piece.to_fen_char(color));
        }
        let mut out = String::with_capacity(72);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for cell in grid[rank] {
                match cell {
                    Some(c) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(c);
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }

    /// Converts the record back to a FEN string.
    pub fn to_fen(&self) -> String {
        let mut placement = self.placement_field();
        if let Some(holdings) = &self.holdings {
            placement.push('[');
            placement.extend(holdings.iter().map(|&(p, c)| p.to_fen_char(c)));
            placement.push(']');
        }
        let en_passant = match self.en_passant {
            Some(sq) => sq.to_algebraic(),
            None => "-".to_string(),
        };
        format!(
            "{} {} {} {} {} {}",
            placement,
            self.side_to_move.to_fen_char(),
            self.castling_field(),
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn split_holdings(field: &str) -> Result<(&str, Option<&str>), FenError> {
    match field.find('[') {
        Some(open) => {
            let rest = &field[open + 1..];
            match rest.strip_suffix(']') {
                Some(inner) => Ok((&field[..open], Some(inner))),
                None => Err(FenError::InvalidHoldings(field[open..].to_string())),
            }
        }
        None => Ok((field, None)),
    }
}

fn parse_placement(placement: &str) -> Result<Vec<(Square, Piece, Color)>, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::InvalidPiecePlacement(format!(
            "expected 8 ranks, got {}",
            ranks.len()
        )));
    }

    let mut pieces = Vec::with_capacity(32);
    for (i, rank_text) in ranks.iter().enumerate() {
        let rank = Rank::ALL[7 - i];
        let mut file = 0u8;
        for c in rank_text.chars() {
            if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += skip as u8;
            } else if let Some((piece, color)) = Piece::from_fen_char(c) {
                match File::from_index(file) {
                    Some(f) => pieces.push((Square::new(f, rank), piece, color)),
                    None => {
                        return Err(FenError::InvalidPiecePlacement(format!(
                            "rank {} has more than 8 squares",
                            8 - i
                        )))
                    }
                }
                file += 1;
            } else {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "invalid character '{}' in rank {}",
                    c,
                    8 - i
                )));
            }
        }
        if file != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "rank {} has {} squares, expected 8",
                8 - i,
                file
            )));
        }
    }

    pieces.sort_by_key(|(sq, _, _)| sq.index());
    Ok(pieces)
}

fn parse_holdings(text: &str) -> Result<Vec<(Piece, Color)>, FenError> {
    text.chars()
        .map(|c| match Piece::from_fen_char(c) {
            Some((Piece::King, _)) | None => Err(FenError::InvalidHoldings(text.to_string())),
            Some(pair) => Ok(pair),
        })
        .collect()
}

/// Parses `KQkq`, `-`, or file letters naming the castling rook
/// (`HAha`, `Eb`). A file letter is kingside when it lies beyond the king.
fn parse_castling(
    field: &str,
    pieces: &[(Square, Piece, Color)],
) -> Result<(CastlingRights, [[Option<File>; 2]; 2]), FenError> {
    let mut files = [[None; 2]; 2];
    if let Some(rights) = CastlingRights::from_fen_field(field) {
        return Ok((rights, files));
    }
    let invalid = || FenError::InvalidCastlingRights(field.to_string());
    let mut rights = CastlingRights::NONE;
    for c in field.chars() {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let side = match c.to_ascii_lowercase() {
            'k' => CastleSide::Kingside,
            'q' => CastleSide::Queenside,
            letter => {
                let file = File::from_char(letter).ok_or_else(invalid)?;
                let king = pieces
                    .iter()
                    .find(|&&(sq, piece, owner)| {
                        piece == Piece::King && owner == color && sq.rank() == color.back_rank()
                    })
                    .map(|&(sq, _, _)| sq.file())
                    .ok_or_else(invalid)?;
                let side = match file.cmp(&king) {
                    Ordering::Greater => CastleSide::Kingside,
                    Ordering::Less => CastleSide::Queenside,
                    Ordering::Equal => return Err(invalid()),
                };
                files[color.index()][side.index()] = Some(file);
                side
            }
        };
        if rights.has(color, side) {
            return Err(invalid());
        }
        rights.grant(color, side);
    }
    Ok((rights, files))
}

fn parse_en_passant(ep: &str) -> Result<Option<Square>, FenError> {
    if ep == "-" {
        return Ok(None);
    }
    match Square::from_algebraic(ep) {
        Some(sq) if sq.rank() == Rank::R3 || sq.rank() == Rank::R6 => Ok(Some(sq)),
        _ => Err(FenError::InvalidEnPassantSquare(ep.to_string())),
    }
}

impl Default for Fen {
    fn default() -> Self {
        let mut pieces = Vec::with_capacity(32);
        let back = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in File::ALL.into_iter().zip(back) {
            pieces.push((Square::new(file, Rank::R1), piece, Color::White));
            pieces.push((Square::new(file, Rank::R2), Piece::Pawn, Color::White));
            pieces.push((Square::new(file, Rank::R7), Piece::Pawn, Color::Black));
            pieces.push((Square::new(file, Rank::R8), piece, Color::Black));
        }
        pieces.sort_by_key(|(sq, _, _)| sq.index());
        Fen {
            pieces,
            holdings: None,
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            castling_files: [[None; 2]; 2],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_startpos() {
        let fen = Fen::parse(Fen::STARTPOS).unwrap();
        assert_eq!(fen.side_to_move, Color::White);
        assert_eq!(fen.castling, CastlingRights::ALL);
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(fen.pieces.len(), 32);
        assert_eq!(fen.pieces[4], (Square::E1, Piece::King, Color::White));
    }

    #[test]
    fn default_matches_startpos() {
        assert_eq!(Fen::default(), Fen::parse(Fen::STARTPOS).unwrap());
        assert_eq!(Fen::default().to_fen(), Fen::STARTPOS);
    }

    #[test]
    fn parse_custom_position() {
        let fen = Fen::parse("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3")
            .unwrap();
        assert_eq!(fen.halfmove_clock, 2);
        assert_eq!(fen.fullmove_number, 3);
    }

    #[test]
    fn roundtrip() {
        let original = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        let parsed = Fen::parse(original).unwrap();
        assert_eq!(parsed.to_fen(), original);
        assert_eq!(parsed.en_passant, Square::from_algebraic("e3"));
    }

    #[test]
    fn counters_are_optional() {
        let fen = Fen::parse("8/8/8/4k3/8/8/8/4K3 b - -").unwrap();
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(fen.side_to_move, Color::Black);
    }

    #[test]
    fn holdings_suffix() {
        let fen =
            Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[Qnp] w KQkq - 0 1").unwrap();
        assert_eq!(
            fen.holdings,
            Some(vec![
                (Piece::Queen, Color::White),
                (Piece::Knight, Color::Black),
                (Piece::Pawn, Color::Black),
            ])
        );
        assert!(fen.to_fen().starts_with("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[Qnp] w"));

        let empty = Fen::parse("8/8/8/4k3/8/8/8/4K3[] w - - 0 1").unwrap();
        assert_eq!(empty.holdings, Some(vec![]));

        assert!(matches!(
            Fen::parse("8/8/8/4k3/8/8/8/4K3[K] w - - 0 1"),
            Err(FenError::InvalidHoldings(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/4k3/8/8/8/4K3[Q w - - 0 1"),
            Err(FenError::InvalidHoldings(_))
        ));
    }

    #[test]
    fn invalid_fen() {
        assert!(matches!(
            Fen::parse("invalid"),
            Err(FenError::InvalidPartCount(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 x KQkq - 0 1"),
            Err(FenError::InvalidActiveColor(_))
        ));
    }

    #[test]
    fn invalid_piece_placement() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8 w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Fen::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Fen::parse("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            Fen::parse("7/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
    }

    #[test]
    fn invalid_castling_rights() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w XYZ - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
    }

    #[test]
    fn invalid_en_passant() {
        for bad in ["abc", "x3", "e4"] {
            let fen = format!("8/8/8/8/8/8/8/8 w - {} 0 1", bad);
            assert!(matches!(
                Fen::parse(&fen),
                Err(FenError::InvalidEnPassantSquare(_))
            ));
        }
    }

    #[test]
    fn invalid_counters() {
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - abc 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - 0 xyz"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
        assert!(matches!(
            Fen::parse("8/8/8/8/8/8/8/8 w - - 0 0"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn castling_rooks_by_file_letter() {
        let fen = Fen::parse("4k3/8/8/8/8/8/8/2K1R2R w Ea - 0 1").unwrap();
        assert!(fen.castling.has(Color::White, CastleSide::Kingside));
        assert!(fen.castling.has(Color::Black, CastleSide::Queenside));
        assert_eq!(fen.castling_files[0], [Some(File::E), None]);
        assert_eq!(fen.castling_files[1], [None, Some(File::A)]);
        assert_eq!(fen.to_fen(), "4k3/8/8/8/8/8/8/2K1R2R w Ea - 0 1");

        let shredder = Fen::parse("r3k2r/8/8/8/8/8/8/R3K2R w HAha - 0 1").unwrap();
        assert_eq!(shredder.castling, CastlingRights::ALL);
        assert_eq!(shredder.castling_field(), "HAha");

        // The king's own file, and a letter with no king on the back rank.
        for bad in [
            "4k3/8/8/8/8/8/8/2K1R2R w C - 0 1",
            "8/4k3/8/8/8/8/8/2K1R2R w Ea - 0 1",
            "4k3/8/8/8/8/8/8/2K1R2R w EE - 0 1",
        ] {
            assert!(
                matches!(Fen::parse(bad), Err(FenError::InvalidCastlingRights(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn no_castling_renders_dash() {
        let fen = Fen::parse("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(fen.castling, CastlingRights::NONE);
        assert!(fen.to_fen().contains(" w - - "));
    }

    #[test]
    fn fen_error_display() {
        let err = FenError::InvalidPartCount(3);
        assert!(format!("{}", err).contains("3"));
        let err = FenError::InvalidEnPassantSquare("z9".to_string());
        assert!(format!("{}", err).contains("z9"));
    }
}
