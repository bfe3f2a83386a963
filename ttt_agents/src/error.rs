use thiserror::Error;

/// Errors raised while playing or parsing moves.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("cell ({row}, {col}) is outside the 3x3 board")]
    OutOfRange { row: usize, col: usize },

    #[error("cell ({row}, {col}) is already taken")]
    Occupied { row: usize, col: usize },

    #[error("malformed input: {0:?}")]
    MalformedInput(String),

    #[error("no available move, the board is full")]
    NoAvailableMove,

    #[error("input stream closed")]
    InputClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GameError {
    /// Out-of-range and occupied cells are both an invalid move.
    pub fn is_invalid_move(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::Occupied { .. })
    }

    /// Errors a human can fix by typing something else.
    pub fn is_recoverable(&self) -> bool {
        self.is_invalid_move() || matches!(self, Self::MalformedInput(_))
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
