use crate::error::{GameError, Result};
use crate::players::Mark;
use itertools::Itertools;
use ndarray::prelude::*;
use std::{fmt, ops::Deref, str::FromStr};

pub const SIZE: usize = 3;
pub const CELLS: usize = SIZE * SIZE;
pub const EMPTY_CHAR: char = '_';

/// A cell coordinate, `(row, column)`, both 0-based.
pub type Move = (usize, usize);

pub fn move_from_index(index: usize) -> Option<Move> {
    (index < CELLS).then_some((index / SIZE, index % SIZE))
}

pub fn move_index(mv: Move) -> usize {
    mv.0 * SIZE + mv.1
}

/// Value-type serialization of a board, one byte per cell in row-major order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey([u8; CELLS]);

impl StateKey {
    pub fn as_bytes(&self) -> &[u8; CELLS] {
        &self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.iter().map(|&b| b as char).collect::<String>())
    }
}

/// The 3x3 grid. Cells are only written through `place` and `undo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: Array2<Option<Mark>>,
}

impl Deref for Board {
    type Target = Array2<Option<Mark>>;
    fn deref(&self) -> &Self::Target {
        &self.cells
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{}", row.iter().map(|&cell| cell_char(cell)).join(" "))?;
        }
        Ok(())
    }
}

/// Parses nine cells written as `X`, `O` and `_` (or `-`), whitespace ignored.
impl FromStr for Board {
    type Err = GameError;
    fn from_str(s: &str) -> Result<Self> {
        let cells = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| match c {
                'X' | 'x' => Ok(Some(Mark::Cross)),
                'O' | 'o' | '0' => Ok(Some(Mark::Nought)),
                '_' | '-' | '.' => Ok(None),
                _ => Err(GameError::MalformedInput(s.to_owned())),
            })
            .collect::<Result<Vec<_>>>()?;
        let cells: [Option<Mark>; CELLS] = cells
            .try_into()
            .map_err(|_| GameError::MalformedInput(s.to_owned()))?;
        Ok(Board::from_cells(cells))
    }
}

fn cell_char(cell: Option<Mark>) -> char {
    cell.map_or(EMPTY_CHAR, Mark::as_char)
}

impl Board {
    pub fn new() -> Self {
        Board {
            cells: Array::from_elem((SIZE, SIZE), None),
        }
    }

    pub fn from_cells(cells: [Option<Mark>; CELLS]) -> Self {
        Board {
            cells: Array::from_shape_fn((SIZE, SIZE), |(r, c)| cells[r * SIZE + c]),
        }
    }

    pub fn get(&self, mv: Move) -> Option<Option<Mark>> {
        self.cells.get([mv.0, mv.1]).copied()
    }

    /// Cell by linear index 0-8; `None` for empty or out-of-range cells.
    pub fn at(&self, index: usize) -> Option<Mark> {
        move_from_index(index).and_then(|mv| self.get(mv)).flatten()
    }

    pub fn place(&mut self, mv: Move, mark: Mark) -> Result<()> {
        let (row, col) = mv;
        match self.cells.get_mut([row, col]) {
            None => Err(GameError::OutOfRange { row, col }),
            Some(Some(_)) => Err(GameError::Occupied { row, col }),
            Some(cell) => {
                *cell = Some(mark);
                Ok(())
            }
        }
    }

    /// Clears a cell previously filled by `place`. Only search backtracking uses this.
    pub fn undo(&mut self, mv: Move) {
        if let Some(cell) = self.cells.get_mut([mv.0, mv.1]) {
            debug_assert!(cell.is_some(), "undo of an empty cell {mv:?}");
            *cell = None;
        }
    }

    /// Places `mark`, runs `f` on the board, then undoes the placement before returning.
    pub fn with_move<T>(&mut self, mv: Move, mark: Mark, f: impl FnOnce(&mut Board) -> T) -> Result<T> {
        self.place(mv, mark)?;
        let out = f(self);
        self.undo(mv);
        Ok(out)
    }

    /// Empty cells in row-major order.
    pub fn available_moves(&self) -> Vec<Move> {
        self.cells
            .indexed_iter()
            .filter(|(_index, value)| value.is_none())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().filter(|&&cell| cell == Some(mark)).count()
    }

    /// Cross always opens, so the side to move follows from the piece counts.
    pub fn side_to_move(&self) -> Mark {
        if self.count(Mark::Cross) > self.count(Mark::Nought) {
            Mark::Nought
        } else {
            Mark::Cross
        }
    }

    pub fn state_key(&self) -> StateKey {
        let mut key = [0u8; CELLS];
        for (slot, &cell) in key.iter_mut().zip(self.cells.iter()) {
            *slot = cell_char(cell) as u8;
        }
        StateKey(key)
    }

    /// The same arrangement with every X and O exchanged.
    pub fn swapped(&self) -> Board {
        Board {
            cells: self.cells.mapv(|cell| cell.map(Mark::other)),
        }
    }
}
