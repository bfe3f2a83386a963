use crate::board::{Board, Move};
use crate::config::{SearchConfig, PLAY_EPSILON};
use crate::error::{GameError, Result};
use crate::evaluator::Evaluator;
use crate::input::parse_move;
use crate::q_table::QAgent;
use crate::search::{winning_move_or_random, SearchEngine};
use log::debug;
use rand::prelude::SliceRandom;
use rand::Rng;
use std::fmt;
use std::io::{BufRead, Write};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Mark {
    Cross,
    Nought,
}

impl Mark {
    pub fn other(self) -> Self {
        match self {
            Self::Cross => Mark::Nought,
            Self::Nought => Mark::Cross,
        }
    }
    pub fn as_char(self) -> char {
        match self {
            Self::Cross => 'X',
            Self::Nought => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

pub trait Player {
    fn set_mark(&mut self, mark: Mark);
    fn get_mark(&self) -> Mark;
    fn get_name(&self) -> &str;
    /// Picks a move on a board that still has an empty cell.
    fn choose_move(&mut self, board: &Board) -> Result<Move>;
    fn make_move(&self, board: &mut Board, mv: Move) -> Result<()> {
        board.place(mv, self.get_mark())
    }
}

/// Reads moves from `input`, re-prompting on `output` until one is legal.
pub struct HumanPlayer<R: BufRead, W: Write> {
    pub name: String,
    pub mark: Mark,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> HumanPlayer<R, W> {
    pub fn new(name: String, mark: Mark, input: R, output: W) -> Self {
        HumanPlayer {
            name,
            mark,
            input,
            output,
        }
    }

    fn read_move(&mut self, board: &Board) -> Result<Move> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(GameError::InputClosed);
        }
        let mv = parse_move(&line)?;
        match board.get(mv) {
            Some(None) => Ok(mv),
            Some(Some(_)) => Err(GameError::Occupied { row: mv.0, col: mv.1 }),
            None => Err(GameError::OutOfRange { row: mv.0, col: mv.1 }),
        }
    }
}

impl<R: BufRead, W: Write> Player for HumanPlayer<R, W> {
    fn set_mark(&mut self, mark: Mark) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Mark {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        if board.is_full() {
            return Err(GameError::NoAvailableMove);
        }
        write!(self.output, "{board}")?;
        loop {
            writeln!(
                self.output,
                "{} ({}), enter a cell index (0-8) or row and column (1-3):",
                self.name, self.mark
            )?;
            self.output.flush()?;
            match self.read_move(board) {
                Ok(mv) => return Ok(mv),
                Err(err) if err.is_recoverable() => {
                    writeln!(self.output, "{err}, please try again.")?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Picks uniformly among the empty cells.
pub struct RandomPlayer<R: Rng> {
    pub name: String,
    pub mark: Mark,
    rng: R,
}

impl<R: Rng> RandomPlayer<R> {
    pub fn new(name: String, mark: Mark, rng: R) -> Self {
        RandomPlayer { name, mark, rng }
    }
}

impl<R: Rng> Player for RandomPlayer<R> {
    fn set_mark(&mut self, mark: Mark) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Mark {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        board
            .available_moves()
            .choose(&mut self.rng)
            .copied()
            .ok_or(GameError::NoAvailableMove)
    }
}

/// Wins on the spot when it can, otherwise plays a random empty cell.
pub struct OnePlyPlayer<R: Rng> {
    pub name: String,
    pub mark: Mark,
    rng: R,
}

impl<R: Rng> OnePlyPlayer<R> {
    pub fn new(name: String, mark: Mark, rng: R) -> Self {
        OnePlyPlayer { name, mark, rng }
    }
}

impl<R: Rng> Player for OnePlyPlayer<R> {
    fn set_mark(&mut self, mark: Mark) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Mark {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        let mut scratch = board.clone();
        winning_move_or_random(&mut scratch, self.mark, &mut self.rng).ok_or(GameError::NoAvailableMove)
    }
}

/// Minimax or alpha-beta player, depending on the engine's `SearchConfig`.
pub struct SearchPlayer<E: Evaluator> {
    pub name: String,
    pub mark: Mark,
    engine: SearchEngine<E>,
}

impl<E: Evaluator> SearchPlayer<E> {
    pub fn new(name: String, mark: Mark, evaluator: E, config: SearchConfig) -> Self {
        SearchPlayer {
            name,
            mark,
            engine: SearchEngine::new(evaluator, config),
        }
    }

    pub fn engine(&self) -> &SearchEngine<E> {
        &self.engine
    }
}

impl<E: Evaluator> Player for SearchPlayer<E> {
    fn set_mark(&mut self, mark: Mark) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Mark {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        let mut scratch = board.clone();
        let result = self
            .engine
            .best_move(&mut scratch, self.mark)
            .ok_or(GameError::NoAvailableMove)?;
        debug!("{} picked {:?} with score {}", self.name, result.mv, result.score);
        Ok(result.mv)
    }
}

/// Plays greedily from a trained Q-table.
pub struct QLearningPlayer<R: Rng> {
    pub name: String,
    pub mark: Mark,
    agent: QAgent<R>,
}

impl<R: Rng> QLearningPlayer<R> {
    pub fn new(name: String, mark: Mark, mut agent: QAgent<R>) -> Self {
        agent.set_epsilon(PLAY_EPSILON);
        QLearningPlayer { name, mark, agent }
    }

    pub fn agent(&self) -> &QAgent<R> {
        &self.agent
    }
}

impl<R: Rng> Player for QLearningPlayer<R> {
    fn set_mark(&mut self, mark: Mark) {
        self.mark = mark;
    }
    fn get_mark(&self) -> Mark {
        self.mark
    }
    fn get_name(&self) -> &str {
        &self.name
    }
    fn choose_move(&mut self, board: &Board) -> Result<Move> {
        self.agent.select_action(board).ok_or(GameError::NoAvailableMove)
    }
}
