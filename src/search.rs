use std::fmt::{self, Display};

use log::debug;

use crate::board::Board;
use crate::moves::Move;

pub const MATE_SCORE: i32 = 10_000;

/// Difficulty tiers map to fixed search depths. Any positive depth works
/// through [`Board::choose_move`]; the tiers are what the session layer
/// exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn depth(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl Board {
    /// Pick a move for the automated opponent. None means no legal move
    /// exists, which callers treat as resignation-equivalent; terminal
    /// positions should already have been classified via `game_status`.
    pub fn choose_ai_move(&mut self, difficulty: Difficulty) -> Option<Move> {
        self.choose_move(difficulty.depth())
    }

    /// Root of the search: score every legal move by negated minimax and
    /// keep the first strictly-best one. Ties resolve to generation order,
    /// so repeated calls on the same position return the same move.
    pub fn choose_move(&mut self, depth: u8) -> Option<Move> {
        let moves = self.all_legal_moves();
        if moves.is_empty() {
            return None;
        }

        let mut best_move = moves[0];
        let mut best_score = i32::MIN;

        for candidate in moves {
            let snapshot = *self;
            let mut r#move = candidate;
            self.apply_move_unchecked(&mut r#move);
            let score = -self.minimax(depth.saturating_sub(1), -i32::MAX, i32::MAX, false);
            *self = snapshot;

            if score > best_score {
                best_score = score;
                best_move = candidate;
            }
        }

        debug!(
            "depth {depth} search chose {best_move} with score {best_score} from {}",
            self.to_fen()
        );

        Some(best_move)
    }

    /// Plain minimax with alpha-beta pruning. Each branch snapshots the
    /// position before applying a candidate and restores it afterwards, so
    /// sibling branches always see the pre-branch state.
    fn minimax(&mut self, depth: u8, mut alpha: i32, mut beta: i32, maximizing: bool) -> i32 {
        if depth == 0 {
            return self.evaluate_side_to_move_relative();
        }

        let moves = self.all_legal_moves();
        if moves.is_empty() {
            if self.is_checkmate() {
                return if maximizing { -MATE_SCORE } else { MATE_SCORE };
            }
            return 0;
        }

        if maximizing {
            let mut max_score = i32::MIN;
            for candidate in moves {
                let snapshot = *self;
                let mut r#move = candidate;
                self.apply_move_unchecked(&mut r#move);
                let score = self.minimax(depth - 1, alpha, beta, false);
                *self = snapshot;

                max_score = max_score.max(score);
                alpha = alpha.max(score);
                if beta <= alpha {
                    break;
                }
            }
            max_score
        } else {
            let mut min_score = i32::MAX;
            for candidate in moves {
                let snapshot = *self;
                let mut r#move = candidate;
                self.apply_move_unchecked(&mut r#move);
                let score = self.minimax(depth - 1, alpha, beta, true);
                *self = snapshot;

                min_score = min_score.min(score);
                beta = beta.min(score);
                if beta <= alpha {
                    break;
                }
            }
            min_score
        }
    }
}
