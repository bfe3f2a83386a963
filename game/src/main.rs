use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use ttt_agents::config::{QConfig, SearchConfig, EXHAUSTIVE_DEPTH, HUMAN_VS_SEARCH_DEPTH, NUM_EPISODES};
use ttt_agents::evaluator::{BinaryEvaluator, HeuristicEvaluator};
use ttt_agents::input::{parse_mode, Mode};
use ttt_agents::players::{HumanPlayer, Mark, OnePlyPlayer, Player, QLearningPlayer, SearchPlayer};
use ttt_agents::q_table::{QAgent, QTable, TrainingMode};
use ttt_agents::{Game, GameError};

fn human(mark: Mark) -> Box<dyn Player> {
    Box::new(HumanPlayer::new("Human".to_owned(), mark, io::stdin().lock(), io::stdout()))
}

fn alpha_beta(mark: Mark) -> Box<dyn Player> {
    Box::new(SearchPlayer::new(
        "Alpha-Beta".to_owned(),
        mark,
        HeuristicEvaluator::default(),
        SearchConfig::alpha_beta(HUMAN_VS_SEARCH_DEPTH),
    ))
}

fn minimax(mark: Mark) -> Box<dyn Player> {
    Box::new(SearchPlayer::new(
        "Minimax".to_owned(),
        mark,
        BinaryEvaluator::default(),
        SearchConfig::minimax(EXHAUSTIVE_DEPTH),
    ))
}

fn q_learner(mark: Mark, table: &QTable) -> Box<dyn Player> {
    let agent = QAgent::with_table(table.clone(), QConfig::greedy(), StdRng::from_entropy());
    Box::new(QLearningPlayer::new("Q-Learning".to_owned(), mark, agent))
}

fn new_game(mode: Mode, table: &QTable) -> Option<Game> {
    let (player_1, player_2) = match mode {
        Mode::HumanVsAlphaBeta => (human(Mark::Cross), alpha_beta(Mark::Nought)),
        Mode::AlphaBetaVsMinimax => (alpha_beta(Mark::Cross), minimax(Mark::Nought)),
        Mode::QLearningVsHuman => (q_learner(Mark::Cross, table), human(Mark::Nought)),
        Mode::QLearningVsAlphaBeta => (q_learner(Mark::Cross, table), alpha_beta(Mark::Nought)),
        Mode::HumanVsOnePly => {
            let one_ply = OnePlyPlayer::new("One-Ply".to_owned(), Mark::Nought, StdRng::from_entropy());
            (human(Mark::Cross), Box::new(one_ply) as Box<dyn Player>)
        }
        Mode::Exit => return None,
    };
    Some(Game::new(player_1, player_2))
}

/// Prompts until a valid menu entry is read. `None` once stdin is closed.
fn read_mode() -> Result<Option<Mode>> {
    let mut stdout = io::stdout();
    loop {
        writeln!(stdout, "\n{}\nChoose a mode:", Mode::menu())?;
        stdout.flush()?;
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match parse_mode(&line) {
            Ok(mode) => return Ok(Some(mode)),
            Err(err) => writeln!(stdout, "{err}, please try again.")?,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("Training the Q-learning agent over {NUM_EPISODES} self-play games...");
    let mut trainer = QAgent::new(QConfig::default(), StdRng::from_entropy());
    let report = trainer
        .train(TrainingMode::SelfPlay, NUM_EPISODES)
        .context("Q-learning training failed")?;
    println!("Learned {} states.", report.states);
    let table = trainer.table();

    while let Some(mode) = read_mode()? {
        let Some(mut game) = new_game(mode, table) else {
            break;
        };
        info!("starting {mode}");
        match game.play(&mut io::stdout()) {
            Ok(outcome) => info!("{mode} finished: {outcome}"),
            Err(GameError::InputClosed) => break,
            Err(err) => return Err(err).context("game aborted"),
        }
    }
    println!("Goodbye!");
    Ok(())
}
