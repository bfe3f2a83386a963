use crate::board::Board;
use crate::outcome::{winner, WINNING_LINES};
use crate::players::Mark;

pub const WIN_SCORE: i32 = 10;

/// Static scoring of a board from the maximizer's point of view.
pub trait Evaluator {
    fn maximizer(&self) -> Mark;
    fn evaluate(&self, board: &Board) -> i32;
}

/// +10 when the maximizer has won, -10 when the minimizer has, 0 otherwise.
#[derive(Clone, Copy, Debug)]
pub struct BinaryEvaluator {
    maximizer: Mark,
}

impl BinaryEvaluator {
    pub fn new(maximizer: Mark) -> Self {
        BinaryEvaluator { maximizer }
    }
}

impl Default for BinaryEvaluator {
    fn default() -> Self {
        Self::new(Mark::Nought)
    }
}

impl Evaluator for BinaryEvaluator {
    fn maximizer(&self) -> Mark {
        self.maximizer
    }

    fn evaluate(&self, board: &Board) -> i32 {
        match winner(board) {
            Some(mark) if mark == self.maximizer => WIN_SCORE,
            Some(_) => -WIN_SCORE,
            None => 0,
        }
    }
}

/// Weight of a line indexed by `[maximizer pieces][minimizer pieces]`.
///
/// `[i][0]` is `10^i` and `[0][i]` is `-10^i` for `i` in `1..=3`. Every other entry,
/// including the empty line and any line holding both marks, stays 0: only lines still
/// open to exactly one side contribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeuristicTable {
    weights: [[i32; 4]; 4],
}

impl HeuristicTable {
    pub fn new() -> Self {
        let mut weights = [[0; 4]; 4];
        for count in 1..=3 {
            let weight = 10_i32.pow(count as u32);
            weights[count][0] = weight;
            weights[0][count] = -weight;
        }
        HeuristicTable { weights }
    }

    pub fn weight(&self, maxp: usize, minp: usize) -> i32 {
        self.weights[maxp][minp]
    }
}

impl Default for HeuristicTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Sums `HeuristicTable` weights over the eight winning lines.
#[derive(Clone, Debug)]
pub struct HeuristicEvaluator {
    maximizer: Mark,
    table: HeuristicTable,
}

impl HeuristicEvaluator {
    pub fn new(maximizer: Mark) -> Self {
        HeuristicEvaluator {
            maximizer,
            table: HeuristicTable::new(),
        }
    }

    pub fn table(&self) -> &HeuristicTable {
        &self.table
    }
}

impl Default for HeuristicEvaluator {
    fn default() -> Self {
        Self::new(Mark::Nought)
    }
}

impl Evaluator for HeuristicEvaluator {
    fn maximizer(&self) -> Mark {
        self.maximizer
    }

    fn evaluate(&self, board: &Board) -> i32 {
        let minimizer = self.maximizer.other();
        WINNING_LINES
            .iter()
            .map(|line| {
                let count = |mark| line.iter().filter(|&&i| board.at(i) == Some(mark)).count();
                self.table.weight(count(self.maximizer), count(minimizer))
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    #[test]
    fn table_weights() {
        let table = HeuristicTable::new();
        assert_eq!(table.weight(2, 0), 100);
        assert_eq!(table.weight(0, 3), -1000);
        assert_eq!(table.weight(0, 0), 0);
        assert_eq!(table.weight(1, 1), 0);
        assert_eq!(table.weight(2, 1), 0);
    }

    #[test]
    fn binary_scores_winner_only() {
        let eval = BinaryEvaluator::default();
        assert_eq!(eval.evaluate(&board("OOO XX_ ___")), 10);
        assert_eq!(eval.evaluate(&board("XXX OO_ O__")), -10);
        assert_eq!(eval.evaluate(&board("OO_ XX_ ___")), 0);
    }

    #[test]
    fn heuristic_counts_open_lines() {
        let eval = HeuristicEvaluator::default();
        // Centre O alone: row, column and both diagonals open to O.
        assert_eq!(eval.evaluate(&board("___ _O_ ___")), 40);
        // Adding X in a corner kills the O diagonal and opens a row and a column for X.
        assert_eq!(eval.evaluate(&board("X__ _O_ ___")), 30 - 20);
    }

    #[test]
    fn contested_lines_contribute_nothing() {
        let eval = HeuristicEvaluator::default();
        assert_eq!(eval.evaluate(&board("O__ ___ ___")), 30);
        // X on the top row cancels that line and opens its own column.
        assert_eq!(eval.evaluate(&board("OX_ ___ ___")), 30 - 10 - 10);
        assert_eq!(eval.evaluate(&board("___ ___ ___")), 0);
    }

    #[test]
    fn two_in_a_row_scores() {
        let eval = HeuristicEvaluator::default();
        assert_eq!(eval.evaluate(&board("OO_ XX_ ___")), -10);
        assert_eq!(eval.evaluate(&board("XX_ OO_ ___")), 10);
        assert_eq!(eval.evaluate(&board("OOO XX_ ___")), 910);
    }
}
