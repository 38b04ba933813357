use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use purrfect_engine::{GameConfig, GameSeed, GameSession};
use rand::Rng as _;
use serde::Serialize;

use crate::{
    agent::{Agent, GreedyAgent, RandomAgent},
    util::{self, ConfigArg},
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) enum AgentKind {
    #[default]
    Greedy,
    Random,
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    #[clap(flatten)]
    pub(crate) config: ConfigArg,
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    pub(crate) games: usize,
    /// Stop a game after this many turns
    #[arg(long, default_value_t = 1000)]
    pub(crate) max_turns: usize,
    /// Move selection strategy (greedy or random)
    #[arg(long, default_value = "greedy")]
    pub(crate) agent: AgentKind,
    /// Output file path
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GameResult {
    seed: GameSeed,
    score: usize,
    lines_cleared: usize,
    turns: usize,
    best_streak: usize,
    bombs_exploded: usize,
    game_over: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct Aggregate {
    total_score: usize,
    mean_score: f64,
    max_score: usize,
    min_score: usize,
    mean_turns: f64,
    total_lines_cleared: usize,
    best_streak: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoPlaySummary {
    played_at: DateTime<Utc>,
    agent: AgentKind,
    board_rows: usize,
    board_cols: usize,
    max_turns: usize,
    games: Vec<GameResult>,
    aggregate: Aggregate,
}

/// Seeds for each game: the configured seed starts the sequence, later games
/// count up from it so a run is reproducible.
fn game_seeds(base: Option<GameSeed>, games: usize) -> Vec<GameSeed> {
    let base = base.map_or_else(
        || rand::rng().random(),
        |seed| u128::from_be_bytes(seed.to_bytes()),
    );
    (0..games)
        .zip(0_u128..)
        .map(|(_, offset)| GameSeed::from(base.wrapping_add(offset)))
        .collect()
}

fn play_game(
    config: GameConfig,
    agent: &mut dyn Agent,
    max_turns: usize,
) -> anyhow::Result<GameResult> {
    let seed = config.seed.context("game seed must be set")?;
    let mut session = GameSession::new(config).context("Failed to start game")?;
    while session.turn() < max_turns {
        let Some(mv) = agent.choose_move(&session) else {
            break;
        };
        mv.apply(&mut session)
            .context("agent chose a move the game rejected")?;
    }

    let score = session.score();
    Ok(GameResult {
        seed,
        score: score.score(),
        lines_cleared: score.total_lines_cleared(),
        turns: session.turn(),
        best_streak: score.best_streak(),
        bombs_exploded: score.bombs_exploded(),
        game_over: session.state().is_game_over(),
    })
}

#[expect(clippy::cast_precision_loss)]
fn aggregate(results: &[GameResult]) -> Aggregate {
    if results.is_empty() {
        return Aggregate::default();
    }
    let count = results.len() as f64;
    let total_score = results.iter().map(|r| r.score).sum::<usize>();
    let total_turns = results.iter().map(|r| r.turns).sum::<usize>();
    Aggregate {
        total_score,
        mean_score: total_score as f64 / count,
        max_score: results.iter().map(|r| r.score).max().unwrap_or(0),
        min_score: results.iter().map(|r| r.score).min().unwrap_or(0),
        mean_turns: total_turns as f64 / count,
        total_lines_cleared: results.iter().map(|r| r.lines_cleared).sum(),
        best_streak: results.iter().map(|r| r.best_streak).max().unwrap_or(0),
    }
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        config,
        games,
        max_turns,
        agent,
        output,
    } = arg;

    let config = config.load()?;
    let mut player: Box<dyn Agent> = match agent {
        AgentKind::Greedy => Box::new(GreedyAgent),
        AgentKind::Random => Box::new(RandomAgent::new(rand::rng())),
    };

    let mut results = Vec::with_capacity(*games);
    for (i, seed) in game_seeds(config.seed, *games).into_iter().enumerate() {
        let game_config = GameConfig {
            seed: Some(seed),
            ..config
        };
        let result = play_game(game_config, player.as_mut(), *max_turns)?;
        eprintln!(
            "Game {:>3}/{games}: score {:>6}, lines {:>4}, turns {:>4}{}",
            i + 1,
            result.score,
            result.lines_cleared,
            result.turns,
            if result.game_over { "" } else { " (turn limit)" },
        );
        results.push(result);
    }

    let aggregate = aggregate(&results);
    eprintln!(
        "{agent:?} agent: mean score {:.1} over {} games",
        aggregate.mean_score,
        results.len()
    );

    let summary = AutoPlaySummary {
        played_at: Utc::now(),
        agent: *agent,
        board_rows: config.board_rows,
        board_cols: config.board_cols,
        max_turns: *max_turns,
        games: results,
        aggregate,
    };
    util::write_json(&summary, output.as_deref())?;
    Ok(())
}
