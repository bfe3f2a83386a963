//! Parsing of console move and menu entries.

use crate::board::{move_from_index, Move, SIZE};
use crate::error::{GameError, Result};
use itertools::Itertools;
use std::fmt;

/// Either a single cell index `0..=8` or a 1-based `row col` pair.
pub fn parse_move(line: &str) -> Result<Move> {
    let malformed = || GameError::MalformedInput(line.trim().to_owned());
    let numbers = line
        .split_whitespace()
        .map(|token| token.parse::<usize>().map_err(|_| malformed()))
        .collect::<Result<Vec<usize>>>()?;
    match numbers[..] {
        [index] => move_from_index(index).ok_or(GameError::OutOfRange {
            row: index / SIZE,
            col: index % SIZE,
        }),
        [row, col] if (1..=SIZE).contains(&row) && (1..=SIZE).contains(&col) => Ok((row - 1, col - 1)),
        [row, col] => Err(GameError::OutOfRange { row, col }),
        _ => Err(malformed()),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    HumanVsAlphaBeta,
    AlphaBetaVsMinimax,
    QLearningVsHuman,
    QLearningVsAlphaBeta,
    HumanVsOnePly,
    Exit,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::HumanVsAlphaBeta,
        Mode::AlphaBetaVsMinimax,
        Mode::QLearningVsHuman,
        Mode::QLearningVsAlphaBeta,
        Mode::HumanVsOnePly,
        Mode::Exit,
    ];

    pub fn number(self) -> usize {
        Self::ALL.iter().position(|&mode| mode == self).map_or(0, |i| i + 1)
    }

    fn label(self) -> &'static str {
        match self {
            Mode::HumanVsAlphaBeta => "Human vs AI (Alpha-Beta)",
            Mode::AlphaBetaVsMinimax => "AI (Alpha-Beta) vs AI (Minimax)",
            Mode::QLearningVsHuman => "Q-Learning vs Human",
            Mode::QLearningVsAlphaBeta => "Q-Learning vs Alpha-Beta",
            Mode::HumanVsOnePly => "Human vs AI (one-ply look-ahead)",
            Mode::Exit => "Exit",
        }
    }

    /// The menu text, one numbered line per mode.
    pub fn menu() -> String {
        Self::ALL.iter().map(|mode| format!("{}. {mode}", mode.number())).join("\n")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

pub fn parse_mode(line: &str) -> Result<Mode> {
    let trimmed = line.trim();
    trimmed
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| Mode::ALL.get(i).copied())
        .ok_or_else(|| GameError::MalformedInput(trimmed.to_owned()))
}
