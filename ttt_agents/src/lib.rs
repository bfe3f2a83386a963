use crate::board::Board;
use crate::error::Result;
use crate::outcome::{outcome, GameOutcome};
use crate::players::{Mark, Player};
use log::trace;
use serde::Serialize;
use std::io::{self, Write};
use std::mem;

pub mod board;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod input;
pub mod outcome;
pub mod players;
pub mod q_table;
pub mod search;

pub use error::GameError;

/// Two players sharing one board. `current_player` is always the side to move.
pub struct Game {
    pub board: Board,
    pub current_player: Box<dyn Player>,
    pub other_player: Box<dyn Player>,
}

impl Game {
    /// `player2` takes the mark `player1` does not have; X moves first.
    pub fn new(player1: Box<dyn Player>, mut player2: Box<dyn Player>) -> Self {
        player2.set_mark(player1.get_mark().other());
        let mut game = Game {
            board: Board::new(),
            current_player: player1,
            other_player: player2,
        };
        game.restart();
        game
    }

    pub fn swap_players(&mut self) {
        mem::swap(&mut self.current_player, &mut self.other_player);
    }

    /// Clears the board and hands the first move to X.
    pub fn restart(&mut self) {
        self.board = Board::new();
        if self.current_player.get_mark() != Mark::Cross {
            self.swap_players();
        }
    }

    /// Exchanges the players' marks and restarts.
    pub fn swap_marks(&mut self) {
        let mark = self.current_player.get_mark();
        self.current_player.set_mark(mark.other());
        self.other_player.set_mark(mark);
        self.restart();
    }

    pub fn mark_of(&self, name: &str) -> Option<Mark> {
        [&self.current_player, &self.other_player]
            .into_iter()
            .find(|player| player.get_name() == name)
            .map(|player| player.get_mark())
    }

    /// Alternates moves until the game ends, drawing the board to `out` after each one.
    pub fn play<W: Write>(&mut self, out: &mut W) -> Result<GameOutcome> {
        loop {
            let mv = self.current_player.choose_move(&self.board)?;
            self.current_player.make_move(&mut self.board, mv)?;
            let (name, mark) = (self.current_player.get_name(), self.current_player.get_mark());
            trace!("{name} ({mark}) plays {mv:?}");
            writeln!(out, "{name} ({mark}) plays {mv:?}")?;
            write!(out, "{}", self.board)?;
            match outcome(&self.board) {
                GameOutcome::InProgress => self.swap_players(),
                result @ GameOutcome::Win(_) => {
                    writeln!(out, "{name} wins!")?;
                    return Ok(result);
                }
                GameOutcome::Draw => {
                    writeln!(out, "It's a draw!")?;
                    return Ok(GameOutcome::Draw);
                }
            }
        }
    }
}

/// Results of a series of games from one player's point of view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub wins: usize,
    pub losses: usize,
    pub draws: usize,
}

impl MatchStats {
    pub fn games(&self) -> usize {
        self.wins + self.losses + self.draws
    }
}

/// Plays `games` silent games, swapping marks after each one, and scores them for
/// the player called `name`.
pub fn play_match(game: &mut Game, name: &str, games: usize) -> Result<MatchStats> {
    let mut stats = MatchStats::default();
    for _ in 0..games {
        game.restart();
        let result = game.play(&mut io::sink())?;
        match (result, game.mark_of(name)) {
            (GameOutcome::Win(winner), Some(mark)) if winner == mark => stats.wins += 1,
            (GameOutcome::Win(_), _) => stats.losses += 1,
            _ => stats.draws += 1,
        }
        game.swap_marks();
    }
    Ok(stats)
}
