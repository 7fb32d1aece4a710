use std::time::Instant;

use log::info;
use num_format::{Locale, ToFormattedString};

use crate::board::Board;

#[derive(Debug, Default)]
pub struct PerftStats {
    pub nodes: u64,
    pub captures: u64,
    pub eps: u64,
    pub castles: u64,
    pub promotions: u64,
}

impl Board {
    /// Count leaf nodes of the legal move tree to `depth`. With `divide`,
    /// also print the subtree size under each root move, which is the usual
    /// way to bisect a generator disagreement.
    pub fn start_perft(&mut self, depth: u8, divide: bool) -> u64 {
        let mut stats = PerftStats::default();

        let start_time = Instant::now();
        if depth == 0 {
            stats.nodes = 1;
        } else if divide {
            for r#move in self.all_legal_moves() {
                let snapshot = *self;
                let mut m = r#move;
                self.apply_move_unchecked(&mut m);

                let mut subtree = PerftStats::default();
                if depth == 1 {
                    count_leaf(&m, &mut subtree);
                } else {
                    do_perft(depth - 1, self, &mut subtree);
                }
                println!("{}: {}", m.long_algebraic(), subtree.nodes);

                stats.nodes += subtree.nodes;
                stats.captures += subtree.captures;
                stats.eps += subtree.eps;
                stats.castles += subtree.castles;
                stats.promotions += subtree.promotions;

                *self = snapshot;
            }
            println!("\n{}", stats.nodes);
        } else {
            do_perft(depth, self, &mut stats);
        }
        let elapsed = start_time.elapsed();

        let nps = stats.nodes as f64 / elapsed.as_secs_f64();
        info!(
            "depth {depth} in {elapsed:#?}. Nodes: {}. Nodes per second: {}",
            stats.nodes.to_formatted_string(&Locale::en),
            (nps as u64).to_formatted_string(&Locale::en)
        );
        info!("{stats:?}");

        stats.nodes
    }
}

fn do_perft(depth: u8, board: &mut Board, stats: &mut PerftStats) {
    for r#move in board.all_legal_moves() {
        let snapshot = *board;
        let mut m = r#move;
        board.apply_move_unchecked(&mut m);

        if depth == 1 {
            count_leaf(&m, stats);
        } else {
            do_perft(depth - 1, board, stats);
        }

        *board = snapshot;
    }
}

fn count_leaf(m: &crate::moves::Move, stats: &mut PerftStats) {
    stats.nodes += 1;
    if m.captured.is_some() {
        stats.captures += 1;
    }
    if m.en_passant {
        stats.eps += 1;
    }
    if m.castle {
        stats.castles += 1;
    }
    if m.promotion.is_some() {
        stats.promotions += 1;
    }
}
