use std::fmt::{self, Debug, Display};
use std::str::FromStr;

pub const CASTLE_WHITE_KING: u8 = 1;
pub const CASTLE_WHITE_QUEEN: u8 = 1 << 1;
pub const CASTLE_BLACK_KING: u8 = 1 << 2;
pub const CASTLE_BLACK_QUEEN: u8 = 1 << 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    #[default]
    White,
    Black,
}

impl Color {
    /// Board row holding this side's back rank pieces at the start of a game.
    pub fn home_row(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

impl std::ops::Not for Color {
    type Output = Color;

    fn not(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PieceKind {
    #[default]
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Lowercase FEN letter for this piece kind.
    pub fn fen_letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_fen_letter(c: char) -> Option<PieceKind> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color) -> Piece {
        Piece { kind, color }
    }

    /// FEN character: uppercase for white, lowercase for black.
    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.fen_letter().to_ascii_uppercase(),
            Color::Black => self.kind.fen_letter(),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = PieceKind::from_fen_letter(c)?;
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        Some(Piece { kind, color })
    }
}

/// A square on the board. Row 0 is rank 8 (the top of the board as white
/// views it), row 7 is rank 1, matching the rank order of FEN placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub fn new(row: u8, col: u8) -> Option<Square> {
        if row < 8 && col < 8 { Some(Square { row, col }) } else { None }
    }

    /// Construct from indices already known to be in bounds.
    pub fn from_row_col(row: u8, col: u8) -> Square {
        debug_assert!(row < 8 && col < 8);
        Square { row, col }
    }

    /// The square offset by (d_row, d_col), or None if that walks off the board.
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Square> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        Square::new(row, col)
    }

    pub fn rank(self) -> u8 {
        8 - self.row
    }

    pub fn file(self) -> char {
        (b'a' + self.col) as char
    }
}

impl FromStr for Square {
    type Err = String;

    fn from_str(s: &str) -> Result<Square, String> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 2 {
            return Err(format!(
                "Expected square value length to be 2 but it was {}. Value: '{s}'",
                chars.len()
            ));
        }

        let col = match chars[0] {
            'a'..='h' => chars[0] as u8 - b'a',
            _ => {
                return Err(format!(
                    "Encountered unexpected character {} while parsing square file",
                    chars[0]
                ));
            }
        };

        let row = match chars[1] {
            '1'..='8' => 8 - (chars[1] as u8 - b'0'),
            _ => {
                return Err(format!(
                    "Encountered unexpected character {} while parsing square rank",
                    chars[1]
                ));
            }
        };

        Ok(Square { row, col })
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

/// Full position state: the 8x8 piece grid plus side to move, castling
/// rights, en passant target, and the half/full move counters. `Copy` so a
/// snapshot for search or legality simulation is a plain struct copy.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    pub white_to_move: bool,
    pub castling_rights: u8,
    pub en_passant_target: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_counter: u16,
}

impl Board {
    /// Parse a FEN string. Malformed content is an error; missing trailing
    /// fields fall back to the documented defaults (white to move, no
    /// castling, no en passant target, clocks 0 and 1).
    pub fn from_fen(fen: &str) -> Result<Board, String> {
        if !fen.is_ascii() {
            return Err(String::from("Expected FEN to only contain ASCII characters"));
        }

        let fen_pieces: Vec<&str> = fen.split_ascii_whitespace().collect();
        if fen_pieces.is_empty() {
            return Err(String::from("Expected FEN to have at least a piece placement part"));
        }

        let mut board = Board::default();

        let rows: Vec<&str> = fen_pieces[0].split('/').collect();
        if rows.len() != 8 {
            return Err(format!(
                "Expected FEN piece placement to have 8 ranks but it had {}",
                rows.len()
            ));
        }

        for (row, row_text) in rows.iter().enumerate() {
            let mut col: usize = 0;
            for c in row_text.chars() {
                match c {
                    '1'..='8' => {
                        col += (c as u8 - b'0') as usize;
                    }
                    _ => {
                        let Some(piece) = Piece::from_fen_char(c) else {
                            return Err(format!(
                                "Encountered unexpected character {c} while processing piece placement"
                            ));
                        };
                        if col >= 8 {
                            return Err(format!("Rank {} of FEN piece placement overflows the board", 8 - row));
                        }
                        board.squares[row][col] = Some(piece);
                        col += 1;
                    }
                }
            }

            if col != 8 {
                return Err(format!(
                    "Expected rank {} of FEN piece placement to describe 8 squares but it described {col}",
                    8 - row
                ));
            }
        }

        match fen_pieces.get(1) {
            None | Some(&"w") => board.white_to_move = true,
            Some(&"b") => board.white_to_move = false,
            Some(other) => {
                return Err(format!("Encountered unexpected side to move value '{other}'"));
            }
        }

        if let Some(castling) = fen_pieces.get(2) {
            if *castling != "-" {
                for c in castling.chars() {
                    match c {
                        'K' => board.castling_rights |= CASTLE_WHITE_KING,
                        'Q' => board.castling_rights |= CASTLE_WHITE_QUEEN,
                        'k' => board.castling_rights |= CASTLE_BLACK_KING,
                        'q' => board.castling_rights |= CASTLE_BLACK_QUEEN,
                        _ => {
                            return Err(format!(
                                "Encountered unexpected character {c} while processing castling rights"
                            ));
                        }
                    }
                }
            }
        }

        if let Some(ep) = fen_pieces.get(3) {
            if *ep != "-" {
                let square =
                    Square::from_str(ep).map_err(|e| format!("Failed to parse en passant target square: {e}"))?;
                if square.rank() != 3 && square.rank() != 6 {
                    return Err(format!(
                        "Expected en passant target square to be on rank 3 or 6 but it was on rank {}",
                        square.rank()
                    ));
                }
                board.en_passant_target = Some(square);
            }
        }

        if let Some(hmc) = fen_pieces.get(4) {
            board.halfmove_clock = hmc
                .parse::<u16>()
                .map_err(|e| format!("Encountered error while parsing halfmove clock value '{hmc}' as u16: {e}"))?;
        }

        if let Some(fmc) = fen_pieces.get(5) {
            board.fullmove_counter = fmc
                .parse::<u16>()
                .map_err(|e| format!("Encountered error while parsing fullmove counter value '{fmc}' as u16: {e}"))?;
        }

        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for row in 0..8 {
            let mut empty_count = 0;
            for col in 0..8 {
                match self.squares[row][col] {
                    None => empty_count += 1,
                    Some(piece) => {
                        if empty_count > 0 {
                            placement.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        placement.push(piece.fen_char());
                    }
                }
            }
            if empty_count > 0 {
                placement.push((b'0' + empty_count) as char);
            }
            if row < 7 {
                placement.push('/');
            }
        }

        let mut castling = String::new();
        if self.castling_rights & CASTLE_WHITE_KING != 0 {
            castling.push('K');
        }
        if self.castling_rights & CASTLE_WHITE_QUEEN != 0 {
            castling.push('Q');
        }
        if self.castling_rights & CASTLE_BLACK_KING != 0 {
            castling.push('k');
        }
        if self.castling_rights & CASTLE_BLACK_QUEEN != 0 {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = match self.en_passant_target {
            Some(square) => square.to_string(),
            None => String::from("-"),
        };

        format!(
            "{placement} {} {castling} {en_passant} {} {}",
            if self.white_to_move { 'w' } else { 'b' },
            self.halfmove_clock,
            self.fullmove_counter
        )
    }

    pub fn starting_position() -> Board {
        Board::from_fen(crate::STARTING_FEN).unwrap()
    }

    pub fn turn(&self) -> Color {
        if self.white_to_move { Color::White } else { Color::Black }
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.row as usize][square.col as usize]
    }

    pub fn set_piece(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.row as usize][square.col as usize] = piece;
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        for row in 0..8 {
            for col in 0..8 {
                if self.squares[row][col] == Some(Piece::new(PieceKind::King, color)) {
                    return Some(Square::from_row_col(row as u8, col as u8));
                }
            }
        }
        None
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            squares: [[None; 8]; 8],
            white_to_move: true,
            castling_rights: 0,
            en_passant_target: None,
            halfmove_clock: 0,
            fullmove_counter: 1,
        }
    }
}

impl Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Rank 8 prints first so the board reads as viewed by white.
        writeln!(f)?;
        for row in 0..8 {
            write!(f, "{} ", 8 - row)?;
            for col in 0..8 {
                match self.squares[row][col] {
                    Some(piece) => write!(f, " {}", piece.fen_char())?,
                    None => write!(f, " .")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f, "fen: {}", self.to_fen())
    }
}

#[cfg(test)]
mod board_tests {
    use super::*;
    use crate::STARTING_FEN;
    use std::str::FromStr;

    #[test]
    pub fn starting_position_round_trips() {
        let board = Board::from_fen(STARTING_FEN).unwrap();
        assert_eq!(STARTING_FEN, board.to_fen());
        assert_eq!(board, Board::from_fen(&board.to_fen()).unwrap());
    }

    #[test]
    pub fn busy_middlegame_round_trips() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(fen, board.to_fen());
    }

    #[test]
    pub fn en_passant_target_round_trips() {
        let fen = "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2";
        let board = Board::from_fen(fen).unwrap();
        assert_eq!(Some(Square::from_str("e3").unwrap()), board.en_passant_target);
        assert_eq!(fen, board.to_fen());
    }

    #[test]
    pub fn missing_trailing_fields_use_defaults() {
        let board = Board::from_fen("8/8/8/8/8/8/8/8 w").unwrap();
        assert_eq!(0, board.castling_rights);
        assert_eq!(None, board.en_passant_target);
        assert_eq!(0, board.halfmove_clock);
        assert_eq!(1, board.fullmove_counter);

        let placement_only = Board::from_fen("8/8/8/8/8/8/8/8").unwrap();
        assert!(placement_only.white_to_move);
    }

    #[test]
    pub fn malformed_fen_is_rejected() {
        assert!(Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
        assert!(Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1").is_err());
        assert!(Board::from_fen("rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
        assert!(Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNZ w KQkq - 0 1").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 w - e4 0 1").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 w - - abc 1").is_err());
        assert!(Board::from_fen("8/8/8/8/8/8/8/8 w KX - 0 1").is_err());
    }

    #[test]
    pub fn square_notation_is_bijective() {
        for row in 0..8u8 {
            for col in 0..8u8 {
                let square = Square::from_row_col(row, col);
                assert_eq!(square, Square::from_str(&square.to_string()).unwrap());
            }
        }

        assert!(Square::from_str("i1").is_err());
        assert!(Square::from_str("a9").is_err());
        assert!(Square::from_str("e44").is_err());
    }

    #[test]
    pub fn find_king_locates_both_kings() {
        let board = Board::starting_position();
        assert_eq!(Some(Square::from_str("e1").unwrap()), board.find_king(Color::White));
        assert_eq!(Some(Square::from_str("e8").unwrap()), board.find_king(Color::Black));

        let empty = Board::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        assert_eq!(None, empty.find_king(Color::White));
    }
}
