use std::fmt::{self, Display};

use tinyvec::TinyVec;

use crate::board::{
    Board, CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN, CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN, Color, Piece, PieceKind,
    Square,
};
use crate::moves::Move;

/// Move lists stay inline on the stack for typical positions; 32 covers all
/// single-piece move counts and most whole-position counts.
pub type MoveList = TinyVec<[Move; 32]>;

#[rustfmt::skip]
const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];
#[rustfmt::skip]
const KING_OFFSETS: [(i8, i8); 8] = [
    (0, 1), (0, -1), (1, 0), (-1, 0),
    (1, 1), (1, -1), (-1, 1), (-1, -1),
];
const BISHOP_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ROOK_DIRECTIONS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const QUEEN_DIRECTIONS: [(i8, i8); 8] = KING_OFFSETS;

/// Game state classification after a half-move. `Check` is informational;
/// only `Checkmate`, `Stalemate`, and `Draw` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
    Draw,
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Active => write!(f, "active"),
            GameStatus::Check => write!(f, "check"),
            GameStatus::Checkmate => write!(f, "checkmate"),
            GameStatus::Stalemate => write!(f, "stalemate"),
            GameStatus::Draw => write!(f, "draw"),
        }
    }
}

/// Result of a finished game as reported to the session layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::WhiteWins => write!(f, "white_wins"),
            GameResult::BlackWins => write!(f, "black_wins"),
            GameResult::Draw => write!(f, "draw"),
        }
    }
}

impl Board {
    /// Moves obeying the piece's movement pattern and board occupancy, not
    /// yet filtered for leaving the mover's own king in check. Empty when
    /// the square does not hold a piece of the side to move.
    pub fn pseudo_legal_moves(&self, from: Square) -> MoveList {
        let mut moves = MoveList::default();
        let Some(piece) = self.piece_at(from) else {
            return moves;
        };
        if piece.color != self.turn() {
            return moves;
        }

        match piece.kind {
            PieceKind::Pawn => self.pawn_moves(from, piece, &mut moves),
            PieceKind::Knight => self.offset_moves(from, piece, &KNIGHT_OFFSETS, &mut moves),
            PieceKind::Bishop => self.sliding_moves(from, piece, &BISHOP_DIRECTIONS, &mut moves),
            PieceKind::Rook => self.sliding_moves(from, piece, &ROOK_DIRECTIONS, &mut moves),
            PieceKind::Queen => self.sliding_moves(from, piece, &QUEEN_DIRECTIONS, &mut moves),
            PieceKind::King => {
                self.offset_moves(from, piece, &KING_OFFSETS, &mut moves);
                self.castling_moves(from, piece, &mut moves);
            }
        }

        moves
    }

    /// Pseudo-legal moves from `from` that do not leave the mover's own king
    /// attacked. Each candidate is applied on a scratch copy with full side
    /// effects so en passant and castling are simulated exactly.
    pub fn legal_moves(&self, from: Square) -> MoveList {
        let mover = self.turn();
        self.pseudo_legal_moves(from)
            .into_iter()
            .filter(|candidate| {
                let mut scratch = *self;
                let mut r#move = *candidate;
                scratch.apply_move_unchecked(&mut r#move);
                !scratch.king_attacked(mover)
            })
            .collect()
    }

    /// All legal moves for the side to move, in row-major origin order.
    pub fn all_legal_moves(&self) -> MoveList {
        let mut moves = MoveList::default();
        let mover = self.turn();
        for row in 0..8 {
            for col in 0..8 {
                let from = Square::from_row_col(row, col);
                if self.piece_at(from).is_some_and(|p| p.color == mover) {
                    moves.extend(self.legal_moves(from));
                }
            }
        }
        moves
    }

    fn pawn_moves(&self, from: Square, piece: Piece, moves: &mut MoveList) {
        let direction: i8 = match piece.color {
            Color::White => -1,
            Color::Black => 1,
        };
        let start_row = match piece.color {
            Color::White => 6,
            Color::Black => 1,
        };

        if let Some(forward) = from.offset(direction, 0) {
            if self.piece_at(forward).is_none() {
                moves.push(Move::new(from, forward, piece));

                if from.row == start_row {
                    let double = Square::from_row_col(from.row.wrapping_add_signed(2 * direction), from.col);
                    if self.piece_at(double).is_none() {
                        moves.push(Move::new(from, double, piece));
                    }
                }
            }
        }

        for d_col in [-1, 1] {
            let Some(target) = from.offset(direction, d_col) else {
                continue;
            };
            let occupant = self.piece_at(target);
            if occupant.is_some_and(|p| p.color != piece.color) || self.en_passant_target == Some(target) {
                moves.push(Move::new(from, target, piece));
            }
        }
    }

    fn offset_moves(&self, from: Square, piece: Piece, offsets: &[(i8, i8)], moves: &mut MoveList) {
        for (d_row, d_col) in offsets {
            let Some(target) = from.offset(*d_row, *d_col) else {
                continue;
            };
            if !self.piece_at(target).is_some_and(|p| p.color == piece.color) {
                moves.push(Move::new(from, target, piece));
            }
        }
    }

    fn sliding_moves(&self, from: Square, piece: Piece, directions: &[(i8, i8)], moves: &mut MoveList) {
        for (d_row, d_col) in directions {
            let mut current = from;
            while let Some(target) = current.offset(*d_row, *d_col) {
                match self.piece_at(target) {
                    None => moves.push(Move::new(from, target, piece)),
                    Some(occupant) => {
                        if occupant.color != piece.color {
                            moves.push(Move::new(from, target, piece));
                        }
                        break;
                    }
                }
                current = target;
            }
        }
    }

    fn castling_moves(&self, from: Square, piece: Piece, moves: &mut MoveList) {
        let (kingside_right, queenside_right) = match piece.color {
            Color::White => (CASTLE_WHITE_KING, CASTLE_WHITE_QUEEN),
            Color::Black => (CASTLE_BLACK_KING, CASTLE_BLACK_QUEEN),
        };
        let row = piece.color.home_row();

        // The king must stand on its home square for the right to still be
        // meaningful; rights are revoked reactively when it moves.
        if from != Square::from_row_col(row, 4) {
            return;
        }

        if self.castling_rights & kingside_right != 0 && self.can_castle_kingside(piece.color) {
            moves.push(Move::new(from, Square::from_row_col(row, 6), piece));
        }
        if self.castling_rights & queenside_right != 0 && self.can_castle_queenside(piece.color) {
            moves.push(Move::new(from, Square::from_row_col(row, 2), piece));
        }
    }

    fn can_castle_kingside(&self, color: Color) -> bool {
        let row = color.home_row();
        let enemy = !color;
        self.piece_at(Square::from_row_col(row, 5)).is_none()
            && self.piece_at(Square::from_row_col(row, 6)).is_none()
            && !self.is_square_attacked(Square::from_row_col(row, 4), enemy)
            && !self.is_square_attacked(Square::from_row_col(row, 5), enemy)
            && !self.is_square_attacked(Square::from_row_col(row, 6), enemy)
    }

    fn can_castle_queenside(&self, color: Color) -> bool {
        let row = color.home_row();
        let enemy = !color;
        self.piece_at(Square::from_row_col(row, 1)).is_none()
            && self.piece_at(Square::from_row_col(row, 2)).is_none()
            && self.piece_at(Square::from_row_col(row, 3)).is_none()
            && !self.is_square_attacked(Square::from_row_col(row, 4), enemy)
            && !self.is_square_attacked(Square::from_row_col(row, 3), enemy)
            && !self.is_square_attacked(Square::from_row_col(row, 2), enemy)
    }

    /// Whether any piece of `by` attacks `target`. Pawns count only their
    /// diagonal captures, the king only its adjacency; this is a pure
    /// computation that never touches the position.
    pub fn is_square_attacked(&self, target: Square, by: Color) -> bool {
        for row in 0..8 {
            for col in 0..8 {
                let from = Square::from_row_col(row, col);
                let Some(piece) = self.piece_at(from) else {
                    continue;
                };
                if piece.color != by {
                    continue;
                }

                let attacks = match piece.kind {
                    PieceKind::Pawn => {
                        let direction: i8 = match by {
                            Color::White => -1,
                            Color::Black => 1,
                        };
                        from.offset(direction, -1) == Some(target) || from.offset(direction, 1) == Some(target)
                    }
                    PieceKind::Knight => Self::offset_attacks(from, target, &KNIGHT_OFFSETS),
                    PieceKind::King => Self::offset_attacks(from, target, &KING_OFFSETS),
                    PieceKind::Bishop => self.sliding_attacks(from, target, &BISHOP_DIRECTIONS),
                    PieceKind::Rook => self.sliding_attacks(from, target, &ROOK_DIRECTIONS),
                    PieceKind::Queen => self.sliding_attacks(from, target, &QUEEN_DIRECTIONS),
                };

                if attacks {
                    return true;
                }
            }
        }

        false
    }

    fn offset_attacks(from: Square, target: Square, offsets: &[(i8, i8)]) -> bool {
        offsets.iter().any(|(d_row, d_col)| from.offset(*d_row, *d_col) == Some(target))
    }

    fn sliding_attacks(&self, from: Square, target: Square, directions: &[(i8, i8)]) -> bool {
        for (d_row, d_col) in directions {
            let mut current = from;
            while let Some(next) = current.offset(*d_row, *d_col) {
                if next == target {
                    return true;
                }
                if self.piece_at(next).is_some() {
                    break;
                }
                current = next;
            }
        }
        false
    }

    /// Whether `color`'s king is attacked by the opponent. A missing king is
    /// treated as not attacked; constructing such a position from FEN is the
    /// caller's invariant violation.
    pub fn king_attacked(&self, color: Color) -> bool {
        match self.find_king(color) {
            Some(king) => self.is_square_attacked(king, !color),
            None => false,
        }
    }

    /// Whether the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.king_attacked(self.turn())
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_check() && self.all_legal_moves().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.is_check() && self.all_legal_moves().is_empty()
    }

    pub fn is_draw(&self) -> bool {
        self.is_stalemate() || self.halfmove_clock >= 100 || self.is_insufficient_material()
    }

    pub fn game_status(&self) -> GameStatus {
        let check = self.is_check();
        let no_moves = self.all_legal_moves().is_empty();

        if check && no_moves {
            return GameStatus::Checkmate;
        }
        if !check && no_moves {
            return GameStatus::Stalemate;
        }
        if self.halfmove_clock >= 100 || self.is_insufficient_material() {
            return GameStatus::Draw;
        }
        if check {
            return GameStatus::Check;
        }
        GameStatus::Active
    }

    /// Result of a finished game, or None while the game is still running.
    /// Checkmate is a win for the side that delivered it, which is the side
    /// not on move.
    pub fn game_result(&self) -> Option<GameResult> {
        match self.game_status() {
            GameStatus::Checkmate => Some(match self.turn() {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            }),
            GameStatus::Stalemate | GameStatus::Draw => Some(GameResult::Draw),
            GameStatus::Active | GameStatus::Check => None,
        }
    }
}

#[cfg(test)]
mod move_generator_tests {
    use super::*;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    #[test]
    pub fn starting_position_has_twenty_moves() {
        let board = Board::starting_position();
        assert_eq!(20, board.all_legal_moves().len());
    }

    #[test]
    pub fn no_legal_move_leaves_own_king_in_check() {
        let positions = [
            crate::STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 0 1",
        ];

        for fen in positions {
            let board = Board::from_fen(fen).unwrap();
            let mover = board.turn();
            for candidate in board.all_legal_moves() {
                let mut scratch = board;
                let mut r#move = candidate;
                scratch.apply_move_unchecked(&mut r#move);
                assert!(
                    !scratch.king_attacked(mover),
                    "move {candidate} from {fen} leaves the mover in check"
                );
            }
        }
    }

    #[test]
    pub fn pinned_piece_cannot_move() {
        // The e2 bishop is pinned to the king by the e4 rook.
        let board = Board::from_fen("4k3/8/8/8/4r3/8/4B3/4K3 w - - 0 1").unwrap();
        assert!(board.legal_moves(sq("e2")).is_empty());
    }

    #[test]
    pub fn en_passant_capture_is_generated() {
        let board = Board::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 2").unwrap();
        assert!(board.legal_moves(sq("d4")).iter().any(|m| m.to == sq("e3")));
    }

    #[test]
    pub fn castling_moves_require_clear_unattacked_path() {
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let king_moves = board.legal_moves(sq("e1"));
        assert!(king_moves.iter().any(|m| m.to == sq("g1")));
        assert!(king_moves.iter().any(|m| m.to == sq("c1")));

        // A rook on f2 covers f1, barring kingside castling only.
        let attacked = Board::from_fen("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq - 0 1").unwrap();
        let king_moves = attacked.legal_moves(sq("e1"));
        assert!(!king_moves.iter().any(|m| m.to == sq("g1")));
        assert!(king_moves.iter().any(|m| m.to == sq("c1")));

        // Without the right the destination is never offered.
        let no_rights = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1").unwrap();
        let king_moves = no_rights.legal_moves(sq("e1"));
        assert!(!king_moves.iter().any(|m| m.to == sq("g1")));
        assert!(!king_moves.iter().any(|m| m.to == sq("c1")));
    }

    #[test]
    pub fn pawn_attacks_are_diagonal_only() {
        let board = Board::from_fen("8/8/8/8/4P3/8/8/8 w - - 0 1").unwrap();
        assert!(board.is_square_attacked(sq("d5"), Color::White));
        assert!(board.is_square_attacked(sq("f5"), Color::White));
        assert!(!board.is_square_attacked(sq("e5"), Color::White));
    }

    #[test]
    pub fn sliding_attacks_stop_at_blockers() {
        let board = Board::from_fen("8/8/8/8/r2P4/8/8/8 w - - 0 1").unwrap();
        assert!(board.is_square_attacked(sq("c4"), Color::Black));
        assert!(board.is_square_attacked(sq("d4"), Color::Black));
        assert!(!board.is_square_attacked(sq("e4"), Color::Black));
    }

    #[test]
    pub fn back_rank_mate_is_checkmate() {
        let mut board = Board::from_fen("6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1").unwrap();
        let mut r#move = Move {
            from: sq("a1"),
            to: sq("a8"),
            ..Default::default()
        };

        assert!(board.make_move(&mut r#move));
        assert!(board.is_check());
        assert!(board.all_legal_moves().is_empty());
        assert_eq!(GameStatus::Checkmate, board.game_status());
        assert_eq!(Some(GameResult::WhiteWins), board.game_result());
    }

    #[test]
    pub fn cornered_king_is_stalemated() {
        let board = Board::from_fen("7k/5Q2/8/8/8/8/8/K7 b - - 0 1").unwrap();
        assert!(!board.is_check());
        assert_eq!(GameStatus::Stalemate, board.game_status());
        assert_eq!(Some(GameResult::Draw), board.game_result());
    }

    #[test]
    pub fn fifty_move_rule_draws() {
        let board = Board::from_fen("k7/8/8/8/8/8/8/6RK w - - 100 70").unwrap();
        assert_eq!(GameStatus::Draw, board.game_status());

        let almost = Board::from_fen("k7/8/8/8/8/8/8/6RK w - - 99 70").unwrap();
        assert_eq!(GameStatus::Active, almost.game_status());
    }

    #[test]
    pub fn bare_kings_draw_immediately() {
        let board = Board::from_fen("k7/8/8/8/8/8/8/K7 w - - 0 1").unwrap();
        assert_eq!(GameStatus::Draw, board.game_status());

        let minor = Board::from_fen("k7/8/8/8/8/8/8/KB6 w - - 0 1").unwrap();
        assert_eq!(GameStatus::Draw, minor.game_status());

        let rook = Board::from_fen("k7/8/8/8/8/8/8/K5R1 w - - 0 1").unwrap();
        assert_eq!(GameStatus::Active, rook.game_status());
    }

    #[test]
    pub fn check_status_is_informational() {
        let board = Board::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
        assert_eq!(GameStatus::Check, board.game_status());
        assert_eq!(None, board.game_result());
    }
}
