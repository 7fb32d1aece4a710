use std::fmt::{self, Display};
use std::str::FromStr;

use log::error;
use regex::Regex;

use crate::board::{
    Board, CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN, CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN, Color, Piece, PieceKind,
    Square,
};

/// A single half-move. Only `from`, `to`, and `piece` are meaningful before
/// the move is applied; the executor fills in `captured`, `promotion`,
/// `castle`, and `en_passant` as it discovers the move's side effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceKind>,
    pub castle: bool,
    pub en_passant: bool,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: Piece) -> Move {
        Move {
            from,
            to,
            piece,
            ..Default::default()
        }
    }

    /// Long algebraic notation as used by the move request interface,
    /// e.g. "e2e4" or "e7e8q".
    pub fn long_algebraic(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.fen_letter()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.long_algebraic())
    }
}

/// Parse a move request in long algebraic notation: origin square,
/// destination square, optional promotion letter.
pub fn parse_move_request(text: &str) -> Result<(Square, Square, Option<PieceKind>), String> {
    let move_pattern = Regex::new(r"^([a-h][1-8])([a-h][1-8])([nbrqNBRQ])?$").unwrap();
    let Some(captures) = move_pattern.captures(text.trim()) else {
        return Err(format!(
            "Expected a move like 'e2e4' or 'e7e8q' but got '{}'",
            text.trim()
        ));
    };

    let from = Square::from_str(&captures[1])?;
    let to = Square::from_str(&captures[2])?;
    let promotion = captures
        .get(3)
        .and_then(|m| PieceKind::from_fen_letter(m.as_str().chars().next().unwrap_or(' ')));

    Ok((from, to, promotion))
}

fn rook_home_right(square: Square) -> u8 {
    match (square.row, square.col) {
        (7, 0) => CASTLE_WHITE_QUEEN,
        (7, 7) => CASTLE_WHITE_KING,
        (0, 0) => CASTLE_BLACK_QUEEN,
        (0, 7) => CASTLE_BLACK_KING,
        _ => 0,
    }
}

impl Board {
    /// Whether moving from `from` to `to` is legal for the side to move.
    pub fn is_valid_move(&self, from: Square, to: Square) -> bool {
        self.legal_moves(from).iter().any(|m| m.to == to)
    }

    /// Validate and apply a move. Returns false and leaves the position
    /// untouched if the move is not legal. On success the position is
    /// mutated and the move's side-effect fields are populated.
    pub fn make_move(&mut self, r#move: &mut Move) -> bool {
        if !self.is_valid_move(r#move.from, r#move.to) {
            return false;
        }

        self.apply_move_unchecked(r#move);
        true
    }

    /// Apply a move without the legality gate. Used by the legality filter,
    /// perft, and search, which all work from already-generated legal or
    /// pseudo-legal moves. Applying a move that does not follow piece
    /// movement rules corrupts the position.
    pub fn apply_move_unchecked(&mut self, r#move: &mut Move) {
        let Some(piece) = self.piece_at(r#move.from) else {
            error!("Tried to apply a move from empty square {}", r#move.from);
            return;
        };

        let mover = piece.color;
        let prior_en_passant = self.en_passant_target;

        r#move.piece = piece;
        r#move.captured = self.piece_at(r#move.to);
        self.set_piece(r#move.to, Some(piece));
        self.set_piece(r#move.from, None);

        if piece.kind == PieceKind::Pawn {
            if r#move.from.row.abs_diff(r#move.to.row) == 2 {
                // Two-square advance: the skipped square becomes the en
                // passant target for the reply.
                let skipped_row = (r#move.from.row + r#move.to.row) / 2;
                self.en_passant_target = Some(Square::from_row_col(skipped_row, r#move.to.col));
            } else {
                if prior_en_passant == Some(r#move.to) {
                    r#move.en_passant = true;
                    let captured_row = match mover {
                        Color::White => r#move.to.row + 1,
                        Color::Black => r#move.to.row - 1,
                    };
                    let captured_square = Square::from_row_col(captured_row, r#move.to.col);
                    r#move.captured = self.piece_at(captured_square);
                    self.set_piece(captured_square, None);
                }
                self.en_passant_target = None;
            }

            if r#move.to.row == 0 || r#move.to.row == 7 {
                let kind = r#move.promotion.unwrap_or(PieceKind::Queen);
                self.set_piece(r#move.to, Some(Piece::new(kind, mover)));
                r#move.promotion = Some(kind);
            }
        } else {
            self.en_passant_target = None;
        }

        if piece.kind == PieceKind::King {
            if r#move.from.col.abs_diff(r#move.to.col) == 2 {
                r#move.castle = true;
                let row = r#move.to.row;
                let kingside = r#move.to.col > r#move.from.col;
                let (rook_from, rook_to) = if kingside {
                    (Square::from_row_col(row, 7), Square::from_row_col(row, 5))
                } else {
                    (Square::from_row_col(row, 0), Square::from_row_col(row, 3))
                };
                let rook = self.piece_at(rook_from);
                self.set_piece(rook_from, None);
                self.set_piece(rook_to, rook);
            }

            self.castling_rights &= match mover {
                Color::White => !(CASTLE_WHITE_KING | CASTLE_WHITE_QUEEN),
                Color::Black => !(CASTLE_BLACK_KING | CASTLE_BLACK_QUEEN),
            };
        }

        if piece.kind == PieceKind::Rook {
            self.castling_rights &= !rook_home_right(r#move.from);
        }

        // A rook captured on its home square also loses its right.
        if r#move.captured.is_some_and(|c| c.kind == PieceKind::Rook) {
            self.castling_rights &= !rook_home_right(r#move.to);
        }

        if r#move.captured.is_some() || piece.kind == PieceKind::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if !self.white_to_move {
            self.fullmove_counter += 1;
        }
        self.white_to_move = !self.white_to_move;
    }
}

#[cfg(test)]
mod move_tests {
    use super::*;
    use crate::board::{CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN, CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN};
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn mv(from: &str, to: &str) -> Move {
        Move {
            from: sq(from),
            to: sq(to),
            ..Default::default()
        }
    }

    #[test]
    pub fn parses_move_requests() {
        assert_eq!((sq("e2"), sq("e4"), None), parse_move_request("e2e4").unwrap());
        assert_eq!(
            (sq("e7"), sq("e8"), Some(PieceKind::Knight)),
            parse_move_request("e7e8n").unwrap()
        );
        assert_eq!((sq("a7"), sq("a8"), Some(PieceKind::Queen)), parse_move_request(" a7a8Q ").unwrap());

        assert!(parse_move_request("e2").is_err());
        assert!(parse_move_request("e2e9").is_err());
        assert!(parse_move_request("e2e4k").is_err());
        assert!(parse_move_request("castle").is_err());
    }

    #[test]
    pub fn rejects_illegal_moves_without_mutation() {
        let mut board = Board::starting_position();
        let before = board;

        assert!(!board.make_move(&mut mv("e2", "e5")));
        assert!(!board.make_move(&mut mv("e7", "e5")));
        assert!(!board.make_move(&mut mv("e4", "e5")));
        assert_eq!(before, board);
    }

    #[test]
    pub fn pawn_double_advance_sets_en_passant_target() {
        let mut board = Board::starting_position();
        let mut r#move = mv("e2", "e4");

        assert!(board.make_move(&mut r#move));
        assert_eq!(Some(sq("e3")), board.en_passant_target);
        assert_eq!(None, r#move.captured);
        assert!(!board.white_to_move);

        // Any reply that is not a double pawn advance clears the target.
        assert!(board.make_move(&mut mv("g8", "f6")));
        assert_eq!(None, board.en_passant_target);
    }

    #[test]
    pub fn en_passant_capture_removes_the_passed_pawn() {
        let mut board = Board::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2").unwrap();
        let mut r#move = mv("d4", "e3");

        assert!(board.make_move(&mut r#move));
        assert!(r#move.en_passant);
        assert_eq!(Some(Piece::new(PieceKind::Pawn, Color::White)), r#move.captured);
        assert_eq!(None, board.piece_at(sq("e4")));
        assert_eq!(Some(Piece::new(PieceKind::Pawn, Color::Black)), board.piece_at(sq("e3")));
        assert_eq!(0, board.halfmove_clock);
    }

    #[test]
    pub fn promotion_defaults_to_queen() {
        let mut board = Board::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mut r#move = mv("a7", "a8");

        assert!(board.make_move(&mut r#move));
        assert_eq!(Some(PieceKind::Queen), r#move.promotion);
        assert_eq!(Some(Piece::new(PieceKind::Queen, Color::White)), board.piece_at(sq("a8")));
    }

    #[test]
    pub fn promotion_honors_caller_choice() {
        let mut board = Board::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mut r#move = Move {
            promotion: Some(PieceKind::Knight),
            ..mv("a7", "a8")
        };

        assert!(board.make_move(&mut r#move));
        assert_eq!(Some(Piece::new(PieceKind::Knight, Color::White)), board.piece_at(sq("a8")));
    }

    #[test]
    pub fn castling_relocates_rook_and_strips_rights() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let mut r#move = mv("e1", "g1");

        assert!(board.make_move(&mut r#move));
        assert!(r#move.castle);
        assert_eq!(Some(Piece::new(PieceKind::King, Color::White)), board.piece_at(sq("g1")));
        assert_eq!(Some(Piece::new(PieceKind::Rook, Color::White)), board.piece_at(sq("f1")));
        assert_eq!(None, board.piece_at(sq("h1")));
        assert_eq!(None, board.piece_at(sq("e1")));
        assert_eq!(0, board.castling_rights & (CASTLE_WHITE_KING | CASTLE_WHITE_QUEEN));
        assert_ne!(0, board.castling_rights & CASTLE_BLACK_KING);

        let mut queenside = mv("e8", "c8");
        assert!(board.make_move(&mut queenside));
        assert!(queenside.castle);
        assert_eq!(Some(Piece::new(PieceKind::Rook, Color::Black)), board.piece_at(sq("d8")));
        assert_eq!(0, board.castling_rights);
    }

    #[test]
    pub fn rook_moves_strip_one_right() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        assert!(board.make_move(&mut mv("h1", "h2")));
        assert_eq!(0, board.castling_rights & CASTLE_WHITE_KING);
        assert_ne!(0, board.castling_rights & CASTLE_WHITE_QUEEN);
    }

    #[test]
    pub fn capturing_a_home_rook_strips_the_right() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();

        assert!(board.make_move(&mut mv("a1", "a8")));
        assert_eq!(0, board.castling_rights & CASTLE_BLACK_QUEEN);
        assert_ne!(0, board.castling_rights & CASTLE_BLACK_KING);
    }

    #[test]
    pub fn clocks_track_captures_and_pawn_moves() {
        let mut board = Board::starting_position();

        assert!(board.make_move(&mut mv("g1", "f3")));
        assert_eq!(1, board.halfmove_clock);
        assert_eq!(1, board.fullmove_counter);

        assert!(board.make_move(&mut mv("b8", "c6")));
        assert_eq!(2, board.halfmove_clock);
        assert_eq!(2, board.fullmove_counter);

        assert!(board.make_move(&mut mv("e2", "e4")));
        assert_eq!(0, board.halfmove_clock);
    }
}
