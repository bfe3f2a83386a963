use serde::{Deserialize, Serialize};

pub const ALPHA: f32 = 0.1;
pub const GAMMA: f32 = 0.9;
pub const TRAINING_EPSILON: f32 = 0.5;
pub const PLAY_EPSILON: f32 = 0.0;

pub const NUM_EPISODES: usize = 10_000_usize;
pub const PROGRESS_EVERY: usize = 1_000_usize;

pub const WIN_REWARD: f32 = 1.0;
pub const DRAW_REWARD: f32 = 0.0;
pub const STEP_REWARD: f32 = 0.0;
// Only self-play has a losing side.
pub const LOSS_REWARD: f32 = -1.0;

pub const HUMAN_VS_SEARCH_DEPTH: usize = 4;
// Deep enough to reach every terminal state from the empty board.
pub const EXHAUSTIVE_DEPTH: usize = 9;

/// Learning parameters handed to a `QAgent` at construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QConfig {
    pub alpha: f32,
    pub gamma: f32,
    pub epsilon: f32,
}

impl Default for QConfig {
    fn default() -> Self {
        QConfig {
            alpha: ALPHA,
            gamma: GAMMA,
            epsilon: TRAINING_EPSILON,
        }
    }
}

impl QConfig {
    /// Fully greedy parameters used once training is over.
    pub fn greedy() -> Self {
        QConfig {
            epsilon: PLAY_EPSILON,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub depth: usize,
    pub pruning: bool,
}

impl SearchConfig {
    pub fn alpha_beta(depth: usize) -> Self {
        SearchConfig { depth, pruning: true }
    }

    pub fn minimax(depth: usize) -> Self {
        SearchConfig {
            depth,
            pruning: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::alpha_beta(HUMAN_VS_SEARCH_DEPTH)
    }
}
