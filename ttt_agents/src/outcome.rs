use crate::board::Board;
use crate::players::Mark;
use std::fmt;

/// Rows, columns, then the two diagonals, as linear cell indices.
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    InProgress,
    Win(Mark),
    Draw,
}

impl GameOutcome {
    pub fn is_over(self) -> bool {
        self != GameOutcome::InProgress
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameOutcome::InProgress => write!(f, "in progress"),
            GameOutcome::Win(mark) => write!(f, "{mark} wins"),
            GameOutcome::Draw => write!(f, "draw"),
        }
    }
}

/// The mark filling the first complete line, in `WINNING_LINES` order.
pub fn winner(board: &Board) -> Option<Mark> {
    WINNING_LINES.iter().find_map(|line| {
        let first = board.at(line[0])?;
        line[1..]
            .iter()
            .all(|&index| board.at(index) == Some(first))
            .then_some(first)
    })
}

pub fn is_draw(board: &Board) -> bool {
    board.is_full() && winner(board).is_none()
}

pub fn is_terminal(board: &Board) -> bool {
    winner(board).is_some() || board.is_full()
}

pub fn outcome(board: &Board) -> GameOutcome {
    match winner(board) {
        Some(mark) => GameOutcome::Win(mark),
        None if board.is_full() => GameOutcome::Draw,
        None => GameOutcome::InProgress,
    }
}
