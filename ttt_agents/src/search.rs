//! Minimax and alpha-beta search over the game tree.
//!
//! Both searches explore moves in row-major order and mutate a single board in place,
//! undoing every placement before control returns to the caller.

use crate::board::{Board, Move};
use crate::config::SearchConfig;
use crate::evaluator::Evaluator;
use crate::outcome::{is_terminal, winner};
use crate::players::Mark;
use log::debug;
use rand::prelude::SliceRandom;
use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub mv: Move,
    pub score: i32,
}

pub struct SearchEngine<E: Evaluator> {
    evaluator: E,
    config: SearchConfig,
    nodes: u64,
}

impl<E: Evaluator> SearchEngine<E> {
    pub fn new(evaluator: E, config: SearchConfig) -> Self {
        SearchEngine {
            evaluator,
            config,
            nodes: 0,
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    /// Nodes visited by the last `best_move` call.
    pub fn nodes_visited(&self) -> u64 {
        self.nodes
    }

    /// Tries every available move for `side` and keeps the best score for that side.
    /// Ties go to the first move in row-major order. `None` on a full board.
    pub fn best_move(&mut self, board: &mut Board, side: Mark) -> Option<SearchResult> {
        let maximizing = side == self.evaluator.maximizer();
        let depth = self.config.depth.max(1);
        self.nodes = 0;
        let mut best: Option<SearchResult> = None;
        for mv in board.available_moves() {
            let Ok(score) = board.with_move(mv, side, |b| self.search(b, depth - 1, !maximizing)) else {
                continue;
            };
            let improves = match best {
                None => true,
                Some(current) if maximizing => score > current.score,
                Some(current) => score < current.score,
            };
            if improves {
                best = Some(SearchResult { mv, score });
            }
        }
        debug!(
            "{side} search (depth {depth}, pruning {}) visited {} nodes, best {best:?}",
            self.config.pruning, self.nodes
        );
        best
    }

    fn search(&mut self, board: &mut Board, depth: usize, maximizing: bool) -> i32 {
        if self.config.pruning {
            self.alpha_beta(board, depth, maximizing, i32::MIN, i32::MAX)
        } else {
            self.minimax(board, depth, maximizing)
        }
    }

    fn mark_for(&self, maximizing: bool) -> Mark {
        let maximizer = self.evaluator.maximizer();
        if maximizing {
            maximizer
        } else {
            maximizer.other()
        }
    }

    /// Plain minimax without pruning.
    pub fn minimax(&mut self, board: &mut Board, depth: usize, maximizing: bool) -> i32 {
        self.nodes += 1;
        if depth == 0 || is_terminal(board) {
            return self.evaluator.evaluate(board);
        }
        let mark = self.mark_for(maximizing);
        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for mv in board.available_moves() {
            let Ok(value) = board.with_move(mv, mark, |b| self.minimax(b, depth - 1, !maximizing)) else {
                continue;
            };
            best = if maximizing { best.max(value) } else { best.min(value) };
        }
        best
    }

    pub fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: usize,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;
        if depth == 0 || is_terminal(board) {
            return self.evaluator.evaluate(board);
        }
        let mark = self.mark_for(maximizing);
        let mut best = if maximizing { i32::MIN } else { i32::MAX };
        for mv in board.available_moves() {
            let Ok(value) =
                board.with_move(mv, mark, |b| self.alpha_beta(b, depth - 1, !maximizing, alpha, beta))
            else {
                continue;
            };
            if maximizing {
                best = best.max(value);
                alpha = alpha.max(value);
            } else {
                best = best.min(value);
                beta = beta.min(value);
            }
            if beta <= alpha {
                break;
            }
        }
        best
    }
}

/// One-ply look-ahead: the first move in row-major order that wins on the spot,
/// otherwise a uniformly random empty cell. `None` on a full board.
pub fn winning_move_or_random<R: Rng>(board: &mut Board, mark: Mark, rng: &mut R) -> Option<Move> {
    let moves = board.available_moves();
    moves
        .iter()
        .copied()
        .find(|&mv| {
            board
                .with_move(mv, mark, |b| winner(b) == Some(mark))
                .unwrap_or(false)
        })
        .or_else(|| moves.choose(rng).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EXHAUSTIVE_DEPTH;
    use crate::evaluator::{BinaryEvaluator, HeuristicEvaluator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    fn binary(config: SearchConfig) -> SearchEngine<BinaryEvaluator> {
        SearchEngine::new(BinaryEvaluator::default(), config)
    }

    #[test]
    fn one_ply_completes_two_in_a_row() {
        let mut b = board("OO_ ___ ___");
        let result = binary(SearchConfig::alpha_beta(1)).best_move(&mut b, Mark::Nought);
        assert_eq!(result, Some(SearchResult { mv: (0, 2), score: 10 }));
    }

    #[test]
    fn completes_top_row_at_any_depth() {
        for depth in 1..=4 {
            let mut b = board("OO_ XX_ ___");
            let result = binary(SearchConfig::alpha_beta(depth)).best_move(&mut b, Mark::Nought);
            assert_eq!(result.map(|r| r.mv), Some((0, 2)), "depth {depth}");

            let mut b = board("OO_ XX_ ___");
            let mut heuristic = SearchEngine::new(HeuristicEvaluator::default(), SearchConfig::alpha_beta(depth));
            assert_eq!(heuristic.best_move(&mut b, Mark::Nought).map(|r| r.mv), Some((0, 2)));
        }
    }

    #[test]
    fn blocks_an_open_pair() {
        let mut b = board("XX_ _O_ ___");
        let result = binary(SearchConfig::alpha_beta(2)).best_move(&mut b, Mark::Nought);
        assert_eq!(result, Some(SearchResult { mv: (0, 2), score: 0 }));
    }

    #[test]
    fn minimizer_picks_lowest_score() {
        let mut b = board("XX_ OO_ ___");
        let result = binary(SearchConfig::minimax(1)).best_move(&mut b, Mark::Cross);
        assert_eq!(result, Some(SearchResult { mv: (0, 2), score: -10 }));
    }

    #[test]
    fn search_leaves_board_untouched() {
        let mut b = board("X__ _O_ __X");
        let before = b.clone();
        binary(SearchConfig::alpha_beta(EXHAUSTIVE_DEPTH)).best_move(&mut b, Mark::Nought);
        assert_eq!(b, before);
        binary(SearchConfig::minimax(EXHAUSTIVE_DEPTH)).best_move(&mut b, Mark::Nought);
        assert_eq!(b, before);
    }

    #[test]
    fn full_board_has_no_best_move() {
        let mut b = board("XOX XOO OXX");
        assert_eq!(binary(SearchConfig::alpha_beta(3)).best_move(&mut b, Mark::Nought), None);
    }

    #[test]
    fn pruning_keeps_the_answer_and_visits_fewer_nodes() {
        let mut b = board("X________");
        let mut pruned = binary(SearchConfig::alpha_beta(EXHAUSTIVE_DEPTH));
        let mut plain = binary(SearchConfig::minimax(EXHAUSTIVE_DEPTH));
        let with_pruning = pruned.best_move(&mut b, Mark::Nought);
        let without = plain.best_move(&mut b, Mark::Nought);
        assert_eq!(with_pruning, without);
        assert_eq!(with_pruning.map(|r| r.score), Some(0));
        assert!(pruned.nodes_visited() < plain.nodes_visited());
    }

    #[test]
    fn exhaustive_search_from_empty_board_is_a_draw() {
        let mut b = Board::new();
        let result = binary(SearchConfig::alpha_beta(EXHAUSTIVE_DEPTH)).best_move(&mut b, Mark::Nought);
        assert_eq!(result, Some(SearchResult { mv: (0, 0), score: 0 }));
    }

    #[test]
    fn one_ply_takes_the_win() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut b = board("X_X OO_ ___");
        assert_eq!(winning_move_or_random(&mut b, Mark::Nought, &mut rng), Some((1, 2)));
        assert_eq!(winning_move_or_random(&mut b, Mark::Cross, &mut rng), Some((0, 1)));
    }

    #[test]
    fn one_ply_falls_back_to_an_empty_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut b = board("X__ _O_ ___");
        let before = b.clone();
        for _ in 0..20 {
            let mv = winning_move_or_random(&mut b, Mark::Nought, &mut rng).unwrap();
            assert!(before.available_moves().contains(&mv));
        }
        assert_eq!(b, before);
        let mut full = board("XOX XOO OXX");
        assert_eq!(winning_move_or_random(&mut full, Mark::Nought, &mut rng), None);
    }
}
