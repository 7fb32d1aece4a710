use crate::board::{Board, Color, PieceKind, Square};

/// Standard material values indexed by `PieceKind` discriminant.
pub const CENTIPAWN_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20000];

impl Board {
    /// Material balance, positive when white is ahead. No positional terms.
    pub fn evaluate(&self) -> i32 {
        let mut score = 0;
        for row in 0..8 {
            for col in 0..8 {
                if let Some(piece) = self.piece_at(Square::from_row_col(row, col)) {
                    let value = CENTIPAWN_VALUES[piece.kind as usize];
                    score += match piece.color {
                        Color::White => value,
                        Color::Black => -value,
                    };
                }
            }
        }
        score
    }

    /// Material balance from the perspective of the side to move.
    pub fn evaluate_side_to_move_relative(&self) -> i32 {
        let score = self.evaluate();
        if self.white_to_move { score } else { -score }
    }

    /// True when neither side can possibly deliver mate: bare kings, or a
    /// single minor piece besides the kings.
    pub fn is_insufficient_material(&self) -> bool {
        let mut non_king: Option<PieceKind> = None;
        let mut non_king_count = 0;

        for row in 0..8 {
            for col in 0..8 {
                if let Some(piece) = self.piece_at(Square::from_row_col(row, col)) {
                    if piece.kind != PieceKind::King {
                        non_king = Some(piece.kind);
                        non_king_count += 1;
                    }
                }
            }
        }

        match non_king_count {
            0 => true,
            1 => matches!(non_king, Some(PieceKind::Knight) | Some(PieceKind::Bishop)),
            _ => false,
        }
    }
}
