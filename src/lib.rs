pub mod board;
pub mod evaluate;
pub mod move_generator;
pub mod moves;
pub mod perft;
pub mod search;

pub static STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
