use crate::board::{Board, Move, StateKey};
use crate::config::{QConfig, DRAW_REWARD, LOSS_REWARD, PROGRESS_EVERY, STEP_REWARD, WIN_REWARD};
use crate::error::{GameError, Result};
use crate::outcome::{outcome, GameOutcome};
use crate::players::Mark;
use itertools::Itertools;
use log::{debug, info};
use rand::prelude::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};

/// Action values of one state, iterated in row-major move order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Moves {
    pub moves: BTreeMap<Move, f32>,
}

#[derive(Clone, Debug, Default)]
pub struct QTable {
    qtable: HashMap<StateKey, Moves>,
}

impl Deref for Moves {
    type Target = BTreeMap<Move, f32>;
    fn deref(&self) -> &<Self as Deref>::Target {
        &self.moves
    }
}
impl DerefMut for Moves {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.moves
    }
}

impl Deref for QTable {
    type Target = HashMap<StateKey, Moves>;
    fn deref(&self) -> &<Self as Deref>::Target {
        &self.qtable
    }
}

impl DerefMut for QTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.qtable
    }
}

impl From<Vec<Move>> for Moves {
    fn from(value: Vec<Move>) -> Self {
        Moves {
            moves: value.into_iter().map(|mv| (mv, 0.0)).collect(),
        }
    }
}

impl Moves {
    /// Highest-valued move; the first one in key order on ties.
    pub fn best_move(&self) -> Option<Move> {
        self.iter()
            .max_set_by(|(_, value1), (_, value2)| value1.total_cmp(value2))
            .first()
            .map(|&(&mv, _)| mv)
    }

    /// Largest value, 0 when there are no moves.
    pub fn max_value(&self) -> f32 {
        self.values().copied().max_by(f32::total_cmp).unwrap_or(0.0)
    }
}

impl QTable {
    pub fn new() -> Self {
        QTable {
            qtable: HashMap::with_capacity(6_000),
        }
    }

    /// Entry for `board`, created with every available move at 0 on first visit.
    pub fn entry_for(&mut self, board: &Board) -> &mut Moves {
        self.qtable
            .entry(board.state_key())
            .or_insert_with(|| Moves::from(board.available_moves()))
    }

    pub fn value(&self, board: &Board, mv: Move) -> Option<f32> {
        self.get(&board.state_key())?.get(&mv).copied()
    }

    /// `Q[old][action] += alpha * (reward + gamma * max(Q[new]) - Q[old][action])`.
    /// Returns the updated value.
    pub fn update(
        &mut self,
        old: &Board,
        action: Move,
        reward: f32,
        new: &Board,
        config: &QConfig,
    ) -> f32 {
        self.entry_for(old);
        let max_next = self.entry_for(new).max_value();
        let value = self.entry_for(old).entry(action).or_insert(0.0);
        *value += config.alpha * (reward + config.gamma * max_next - *value);
        *value
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingMode {
    /// The agent places O every turn; each move is updated against the board it produced.
    #[default]
    Solo,
    /// The agent plays both marks, X first; each side's move is updated against that
    /// side's next decision state, and a loss costs `LOSS_REWARD`.
    SelfPlay,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrainingReport {
    pub mode: TrainingMode,
    pub episodes: usize,
    pub cross_wins: usize,
    pub nought_wins: usize,
    pub draws: usize,
    pub states: usize,
}

impl TrainingReport {
    fn record(&mut self, result: GameOutcome) {
        self.episodes += 1;
        match result {
            GameOutcome::Win(Mark::Cross) => self.cross_wins += 1,
            GameOutcome::Win(Mark::Nought) => self.nought_wins += 1,
            GameOutcome::Draw => self.draws += 1,
            GameOutcome::InProgress => {}
        }
    }
}

/// Tabular Q-learning agent with an epsilon-greedy policy.
pub struct QAgent<R: Rng> {
    table: QTable,
    config: QConfig,
    rng: R,
}

impl<R: Rng> QAgent<R> {
    pub fn new(config: QConfig, rng: R) -> Self {
        Self::with_table(QTable::new(), config, rng)
    }

    pub fn with_table(table: QTable, config: QConfig, rng: R) -> Self {
        QAgent { table, config, rng }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut QTable {
        &mut self.table
    }

    pub fn config(&self) -> &QConfig {
        &self.config
    }

    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.config.epsilon = epsilon;
    }

    /// Random move with probability epsilon or for unseen states, otherwise the best
    /// stored move. `None` on a full board.
    pub fn select_action(&mut self, board: &Board) -> Option<Move> {
        let available = board.available_moves();
        if available.is_empty() {
            return None;
        }
        let n = self.rng.gen_range(0_f32..1_f32);
        let greedy = if n < self.config.epsilon {
            None
        } else {
            self.table.get(&board.state_key()).and_then(Moves::best_move)
        };
        greedy.or_else(|| available.choose(&mut self.rng).copied())
    }

    pub fn update_value(&mut self, old: &Board, action: Move, reward: f32, new: &Board) -> f32 {
        self.table.update(old, action, reward, new, &self.config)
    }

    /// Runs `episodes` independent games from an empty board; the table carries over.
    pub fn train(&mut self, mode: TrainingMode, episodes: usize) -> Result<TrainingReport> {
        info!(
            "training {episodes} episodes, mode {mode:?}, alpha {}, gamma {}, epsilon {}",
            self.config.alpha, self.config.gamma, self.config.epsilon
        );
        let mut report = TrainingReport {
            mode,
            ..TrainingReport::default()
        };
        for episode in 1..=episodes {
            let result = match mode {
                TrainingMode::Solo => self.solo_episode()?,
                TrainingMode::SelfPlay => self.self_play_episode()?,
            };
            report.record(result);
            if episode % PROGRESS_EVERY == 0 {
                debug!("episode {episode}/{episodes}, {} states", self.table.len());
            }
        }
        report.states = self.table.len();
        info!(
            "training finished: {}",
            serde_json::to_string(&report).unwrap_or_else(|_| format!("{report:?}"))
        );
        Ok(report)
    }

    fn solo_episode(&mut self) -> Result<GameOutcome> {
        let mut board = Board::new();
        loop {
            let before = board.clone();
            let mv = self.select_action(&board).ok_or(GameError::NoAvailableMove)?;
            board.place(mv, Mark::Nought)?;
            let result = outcome(&board);
            let reward = match result {
                GameOutcome::Win(_) => WIN_REWARD,
                GameOutcome::Draw => DRAW_REWARD,
                GameOutcome::InProgress => STEP_REWARD,
            };
            self.update_value(&before, mv, reward, &board);
            if result.is_over() {
                return Ok(result);
            }
        }
    }

    fn self_play_episode(&mut self) -> Result<GameOutcome> {
        let mut board = Board::new();
        // Last (decision state, move) of each side, indexed by `slot`.
        let mut pending: [Option<(Board, Move)>; 2] = [None, None];
        loop {
            let mark = board.side_to_move();
            if let Some((state, mv)) = pending[slot(mark)].take() {
                self.update_value(&state, mv, STEP_REWARD, &board);
            }
            let before = board.clone();
            let mv = self.select_action(&board).ok_or(GameError::NoAvailableMove)?;
            board.place(mv, mark)?;
            let result = outcome(&board);
            let (own, other) = match result {
                GameOutcome::InProgress => {
                    pending[slot(mark)] = Some((before, mv));
                    continue;
                }
                GameOutcome::Win(_) => (WIN_REWARD, LOSS_REWARD),
                GameOutcome::Draw => (DRAW_REWARD, DRAW_REWARD),
            };
            self.update_value(&before, mv, own, &board);
            if let Some((state, other_mv)) = pending[slot(mark.other())].take() {
                self.update_value(&state, other_mv, other, &board);
            }
            return Ok(result);
        }
    }
}

fn slot(mark: Mark) -> usize {
    match mark {
        Mark::Cross => 0,
        Mark::Nought => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GAMMA;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    fn agent(config: QConfig) -> QAgent<StdRng> {
        QAgent::new(config, StdRng::seed_from_u64(42))
    }

    #[test]
    fn entries_start_at_zero_for_available_moves() {
        let mut q = QTable::new();
        let b = board("X__ _O_ ___");
        let moves = q.entry_for(&b);
        assert_eq!(moves.len(), 7);
        assert!(moves.values().all(|&v| v == 0.0));
        assert_eq!(moves.keys().next(), Some(&(0, 1)));
    }

    #[test]
    fn best_move_breaks_ties_by_key_order() {
        let mut moves = Moves::from(vec![(2, 2), (0, 1), (1, 0)]);
        assert_eq!(moves.best_move(), Some((0, 1)));
        moves.insert((2, 2), 0.5);
        moves.insert((1, 0), 0.5);
        assert_eq!(moves.best_move(), Some((1, 0)));
        assert_eq!(moves.max_value(), 0.5);
        assert_eq!(Moves::default().best_move(), None);
        assert_eq!(Moves::default().max_value(), 0.0);
    }

    #[test]
    fn update_applies_the_bellman_rule() {
        let mut q = QTable::new();
        let config = QConfig::default();
        let old = board("OO_ XX_ ___");
        let mut new = old.clone();
        new.place((0, 2), Mark::Nought).unwrap();
        let value = q.update(&old, (0, 2), 1.0, &new, &config);
        assert!((value - 0.1).abs() < 1e-6);
        let value = q.update(&old, (0, 2), 1.0, &new, &config);
        assert!((value - 0.19).abs() < 1e-6);
        // Both states were created lazily.
        assert!(q.contains_key(&new.state_key()));
        assert_eq!(q.value(&old, (1, 2)), Some(0.0));
    }

    #[test]
    fn update_discounts_the_next_state_maximum() {
        let mut q = QTable::new();
        let config = QConfig::default();
        let old = board("O__ ___ ___");
        let mut new = old.clone();
        new.place((1, 1), Mark::Nought).unwrap();
        q.entry_for(&new).insert((2, 2), 0.5);
        let value = q.update(&old, (1, 1), 0.0, &new, &config);
        assert!((value - 0.1 * GAMMA * 0.5).abs() < 1e-6);
    }

    #[test]
    fn self_transition_at_fixed_point_is_unchanged() {
        let mut q = QTable::new();
        let config = QConfig::default();
        let state = board("X__ _O_ ___");
        q.entry_for(&state).insert((0, 1), 1.0);
        q.entry_for(&state).insert((0, 2), GAMMA * 1.0);
        let value = q.update(&state, (0, 2), 0.0, &state, &config);
        assert_eq!(value, GAMMA * 1.0);
        assert_eq!(q.value(&state, (0, 1)), Some(1.0));
    }

    #[test]
    fn greedy_agent_follows_the_table() {
        let mut a = agent(QConfig::greedy());
        let b = board("X__ _O_ ___");
        a.table_mut().entry_for(&b).insert((2, 0), 0.3);
        for _ in 0..10 {
            assert_eq!(a.select_action(&b), Some((2, 0)));
        }
    }

    #[test]
    fn unseen_states_get_a_random_legal_move() {
        let mut a = agent(QConfig::greedy());
        let b = board("XO_ _X_ _O_");
        for _ in 0..20 {
            let mv = a.select_action(&b).unwrap();
            assert!(b.available_moves().contains(&mv));
        }
        assert_eq!(a.select_action(&board("XOX XOO OXX")), None);
    }

    #[test]
    fn full_exploration_ignores_the_table() {
        let mut a = agent(QConfig { epsilon: 1.0, ..QConfig::default() });
        let b = Board::new();
        a.table_mut().entry_for(&b).insert((0, 0), 5.0);
        let picks = (0..50).filter_map(|_| a.select_action(&b)).collect::<Vec<_>>();
        assert!(picks.iter().any(|&mv| mv != (0, 0)));
    }

    #[test]
    fn solo_training_rewards_winning_moves() {
        let mut a = agent(QConfig::default());
        let report = a.train(TrainingMode::Solo, 500).unwrap();
        assert_eq!(report.episodes, 500);
        assert_eq!(report.nought_wins, 500);
        assert_eq!(report.states, a.table().len());
        assert!(a.table().values().flat_map(|m| m.values()).any(|&v| v > 0.0));
    }

    #[test]
    fn self_play_training_counts_every_episode() {
        let mut a = agent(QConfig::default());
        let report = a.train(TrainingMode::SelfPlay, 300).unwrap();
        assert_eq!(report.cross_wins + report.nought_wins + report.draws, 300);
        assert!(a.table().contains_key(&Board::new().state_key()));
        assert!(a.table().values().flat_map(|m| m.values()).any(|&v| v < 0.0));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = TrainingReport {
            mode: TrainingMode::SelfPlay,
            episodes: 3,
            cross_wins: 1,
            nought_wins: 1,
            draws: 1,
            states: 12,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(
            json,
            r#"{"mode":"SelfPlay","episodes":3,"cross_wins":1,"nought_wins":1,"draws":1,"states":12}"#
        );
    }
}
