//! Match runner for the Sequential Halving UCT agent.
//!
//! Plays the agent against baseline opponents on the reference games and
//! reports results, optionally as a JSON file. Also runs single searches for
//! inspecting the surviving arms.

mod minimax;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};
use minimax::Minimax;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use shuct_core::{Game, PlayerId};
use shuct_mcts::games::{Nim, TicTacToe};
use shuct_mcts::{SearchConfig, SearchLimits, SequentialHalvingUct};
use std::fmt::Display;
use std::fs::File;
use std::hash::Hash;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

/// Sequential Halving UCT match runner.
#[derive(Parser)]
#[command(name = "shuct-arena")]
#[command(about = "Play and analyze Sequential Halving UCT searches")]
struct Cli {
    /// Log search progress at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a series of games against an opponent.
    Match {
        /// Game to play.
        #[arg(long, value_enum, default_value = "tictactoe")]
        game: GameKind,

        /// Opponent filling every other seat.
        #[arg(long, value_enum, default_value = "random")]
        opponent: OpponentKind,

        /// Number of games to play.
        #[arg(short, long, default_value = "20")]
        games: usize,

        /// Iterations per move (negative for no limit).
        #[arg(short, long, default_value = "1000", allow_negative_numbers = true)]
        iterations: i64,

        /// Seconds per move (0 for no limit).
        #[arg(short, long, default_value = "0")]
        seconds: f64,

        /// Schedule budget used when there is no iteration limit.
        #[arg(long, default_value = "10000")]
        fallback_budget: usize,

        /// Random seed for reproducibility.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Starting Nim pile.
        #[arg(long, default_value = "10")]
        pile: u32,

        /// Most objects a Nim move may take.
        #[arg(long, default_value = "3")]
        max_take: u32,

        /// Number of Nim players.
        #[arg(long, default_value = "2")]
        players: usize,

        /// Write a JSON report to this file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run one search on the initial position and print the surviving arms.
    Analyze {
        /// Game to analyze.
        #[arg(long, value_enum, default_value = "tictactoe")]
        game: GameKind,

        /// Iteration limit (negative for no limit).
        #[arg(short, long, default_value = "1000", allow_negative_numbers = true)]
        iterations: i64,

        /// Time limit in seconds (0 for no limit).
        #[arg(short, long, default_value = "0")]
        seconds: f64,

        /// Schedule budget used when there is no iteration limit.
        #[arg(long, default_value = "10000")]
        fallback_budget: usize,

        /// Random seed for reproducibility.
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Starting Nim pile.
        #[arg(long, default_value = "10")]
        pile: u32,

        /// Most objects a Nim move may take.
        #[arg(long, default_value = "3")]
        max_take: u32,

        /// Number of Nim players.
        #[arg(long, default_value = "2")]
        players: usize,
    },
}

#[derive(ValueEnum, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum GameKind {
    Tictactoe,
    Nim,
}

#[derive(ValueEnum, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum OpponentKind {
    Random,
    Minimax,
    Agent,
}

/// Settings shared by every game of a match.
#[derive(Clone, Debug)]
struct MatchSettings {
    opponent: OpponentKind,
    games: usize,
    limits: SearchLimits,
    config: SearchConfig,
    seed: u64,
}

/// One finished game.
#[derive(Serialize, Debug)]
struct GameRecord {
    index: usize,
    seed: u64,
    /// Seat the agent played, starting at 1.
    agent_seat: u8,
    moves: Vec<String>,
    /// Final utility per seat, seat 1 first.
    utilities: Vec<f64>,
    agent_utility: f64,
}

/// Whole-match report.
#[derive(Serialize, Debug)]
struct MatchReport {
    game: GameKind,
    opponent: OpponentKind,
    games: usize,
    max_iterations: i64,
    max_seconds: f64,
    agent_wins: usize,
    agent_losses: usize,
    draws: usize,
    elapsed_secs: f64,
    records: Vec<GameRecord>,
}

impl MatchReport {
    fn score_rate(&self) -> f64 {
        (self.agent_wins as f64 + 0.5 * self.draws as f64) / self.games.max(1) as f64
    }
}

/// Whoever sits in a seat.
enum Seat<G: Game> {
    Agent(Box<SequentialHalvingUct<ChaCha8Rng>>),
    Random(ChaCha8Rng),
    Minimax(Minimax<G>, ChaCha8Rng),
}

impl<G: Game> Seat<G>
where
    G::State: Hash + Eq,
{
    /// An agent seat, initialised for `player`.
    fn agent(game: &G, player: PlayerId, config: &SearchConfig, seed: u64) -> Self {
        let mut agent = SequentialHalvingUct::new(config.clone(), ChaCha8Rng::seed_from_u64(seed));
        agent.init_ai(game, player);
        Seat::Agent(Box::new(agent))
    }

    fn new(
        kind: OpponentKind,
        game: &G,
        player: PlayerId,
        config: &SearchConfig,
        seed: u64,
    ) -> Self {
        match kind {
            OpponentKind::Random => Seat::Random(ChaCha8Rng::seed_from_u64(seed)),
            OpponentKind::Minimax => Seat::Minimax(Minimax::new(), ChaCha8Rng::seed_from_u64(seed)),
            OpponentKind::Agent => Seat::agent(game, player, config, seed),
        }
    }

    fn choose(&mut self, game: &G, state: &G::State, limits: SearchLimits) -> Result<G::Move> {
        match self {
            Seat::Agent(agent) => Ok(agent.search(game, state, limits)?.best_move),
            Seat::Random(rng) => game
                .legal_moves(state)
                .choose(rng)
                .copied()
                .context("No legal moves for the random player"),
            Seat::Minimax(solver, rng) => solver
                .best_move(game, state, rng)
                .context("No legal moves for the minimax player"),
        }
    }
}

/// Play one game with the agent in seat `index % N + 1`.
fn play_game<G>(game: &G, settings: &MatchSettings, index: usize) -> Result<GameRecord>
where
    G: Game,
    G::State: Hash + Eq,
    G::Move: Display,
{
    let seed = settings.seed.wrapping_add(index as u64 * 1000);
    let num_players = game.num_players();
    let agent_seat = PlayerId::new((index % num_players) as u8 + 1)?;

    let mut seats: Vec<Seat<G>> = PlayerId::all(num_players)
        .map(|player| {
            let seat_seed = seed.wrapping_add(player.get() as u64);
            if player == agent_seat {
                Seat::agent(game, player, &settings.config, seat_seed)
            } else {
                Seat::new(settings.opponent, game, player, &settings.config, seat_seed)
            }
        })
        .collect();

    let mut state = game.initial_state();
    let mut moves = Vec::new();
    while !game.is_terminal(&state) {
        let mover = game.mover(&state);
        let seat = seats
            .get_mut(mover.index() - 1)
            .with_context(|| format!("No seat for {}", mover))?;
        let mv = seat
            .choose(game, &state, settings.limits)
            .with_context(|| format!("{} failed to move in game {}", mover, index))?;
        moves.push(mv.to_string());
        state = game.apply(&state, mv);
    }

    let utilities = game.utilities(&state);
    let agent_utility = utilities.get(agent_seat);
    info!(
        "Game {}: agent as {} scored {:+.2} in {} moves",
        index,
        agent_seat,
        agent_utility,
        moves.len()
    );

    Ok(GameRecord {
        index,
        seed,
        agent_seat: agent_seat.get(),
        moves,
        utilities: utilities.iter().map(|(_, value)| value).collect(),
        agent_utility,
    })
}

/// Play every game of a match in parallel and tally the results.
fn run_match<G>(game: &G, kind: GameKind, settings: &MatchSettings) -> Result<MatchReport>
where
    G: Game,
    G::State: Hash + Eq,
    G::Move: Display,
{
    if settings.opponent == OpponentKind::Minimax && !Minimax::supports(game) {
        bail!("The minimax opponent needs a two-player game");
    }
    debug!("Match settings: {:?}", settings);

    let start = Instant::now();
    let records: Vec<GameRecord> = (0..settings.games)
        .into_par_iter()
        .map(|i| play_game(game, settings, i))
        .collect::<Result<_>>()?;

    let agent_wins = records.iter().filter(|r| r.agent_utility > 0.0).count();
    let agent_losses = records.iter().filter(|r| r.agent_utility < 0.0).count();

    Ok(MatchReport {
        game: kind,
        opponent: settings.opponent,
        games: settings.games,
        max_iterations: settings.limits.max_iterations,
        max_seconds: settings.limits.max_seconds,
        agent_wins,
        agent_losses,
        draws: records.len() - agent_wins - agent_losses,
        elapsed_secs: start.elapsed().as_secs_f64(),
        records,
    })
}

/// Search the initial position once and print what survived.
fn analyze<G>(game: &G, config: SearchConfig, limits: SearchLimits, seed: u64) -> Result<()>
where
    G: Game,
    G::Move: Display,
{
    let mut agent = SequentialHalvingUct::new(config, ChaCha8Rng::seed_from_u64(seed));
    let result = agent
        .search(game, &game.initial_state(), limits)
        .context("Search failed on the initial position")?;

    println!(
        "Schedule: budget {}, {} rounds, {} iterations per arm per round",
        result.schedule.budget, result.schedule.rounds, result.schedule.iterations_per_round
    );
    println!(
        "Stopped: {:?} after {} iterations, {} rounds, {:.3}s",
        result.stop,
        result.iterations,
        result.rounds_completed,
        result.elapsed.as_secs_f64()
    );
    println!("------------------------------------------------");
    for arm in &result.arms {
        println!("{:>12}  visits {:>8}  value {:+.4}", arm.mv.to_string(), arm.visits, arm.value);
    }
    println!("------------------------------------------------");
    println!("Best move: {}", result.best_move);
    Ok(())
}

fn write_report(report: &MatchReport, path: &PathBuf) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Failed to write report to {:?}", path))?;
    Ok(())
}

fn print_report(report: &MatchReport) {
    let total = report.games.max(1) as f64;
    println!("\n================================================");
    println!("RESULTS: {:?} vs {:?}", report.game, report.opponent);
    println!("================================================");
    println!(
        "Agent wins:   {} ({:.1}%)",
        report.agent_wins,
        report.agent_wins as f64 / total * 100.0
    );
    println!(
        "Agent losses: {} ({:.1}%)",
        report.agent_losses,
        report.agent_losses as f64 / total * 100.0
    );
    println!("Draws:        {} ({:.1}%)", report.draws, report.draws as f64 / total * 100.0);
    println!("------------------------------------------------");
    println!("Score rate: {:.1}%", report.score_rate() * 100.0);
    println!("Completed in {:.2}s", report.elapsed_secs);
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Match {
            game,
            opponent,
            games,
            iterations,
            seconds,
            fallback_budget,
            seed,
            pile,
            max_take,
            players,
            output,
        } => {
            let settings = MatchSettings {
                opponent,
                games,
                limits: SearchLimits {
                    max_seconds: seconds,
                    max_iterations: iterations,
                    max_depth: -1,
                },
                config: SearchConfig::with_fallback_budget(fallback_budget),
                seed,
            };

            let report = match game {
                GameKind::Tictactoe => run_match(&TicTacToe, game, &settings)?,
                GameKind::Nim => {
                    let nim = Nim::with_players(pile, max_take, players);
                    run_match(&nim, game, &settings)?
                }
            };

            print_report(&report);
            if let Some(path) = output {
                write_report(&report, &path)?;
                println!("Report saved to: {:?}", path);
            }
            Ok(())
        }

        Commands::Analyze {
            game,
            iterations,
            seconds,
            fallback_budget,
            seed,
            pile,
            max_take,
            players,
        } => {
            let config = SearchConfig::with_fallback_budget(fallback_budget);
            let limits = SearchLimits {
                max_seconds: seconds,
                max_iterations: iterations,
                max_depth: -1,
            };
            match game {
                GameKind::Tictactoe => analyze(&TicTacToe, config, limits, seed),
                GameKind::Nim => {
                    let nim = Nim::with_players(pile, max_take, players);
                    analyze(&nim, config, limits, seed)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(opponent: OpponentKind, games: usize) -> MatchSettings {
        MatchSettings {
            opponent,
            games,
            limits: SearchLimits::iterations(300),
            config: SearchConfig::default(),
            seed: 7,
        }
    }

    #[test]
    fn test_agent_cannot_beat_minimax() {
        let settings = settings(OpponentKind::Minimax, 4);
        let report = run_match(&TicTacToe, GameKind::Tictactoe, &settings).unwrap();

        assert_eq!(report.records.len(), 4);
        assert_eq!(report.agent_wins, 0);
        for record in &report.records {
            assert!(record.moves.len() >= 5 && record.moves.len() <= 9);
            assert_eq!(record.utilities.len(), 2);
        }
    }

    #[test]
    fn test_opponent_agent_is_initialised() {
        let second = PlayerId::new(2).unwrap();
        let seat = Seat::new(
            OpponentKind::Agent,
            &TicTacToe,
            second,
            &SearchConfig::default(),
            3,
        );

        match seat {
            Seat::Agent(agent) => assert_eq!(agent.player(), Some(second)),
            _ => panic!("expected an agent seat"),
        }
    }

    #[test]
    fn test_seats_alternate() {
        let game = Nim::with_players(7, 2, 3);
        let report = run_match(&game, GameKind::Nim, &settings(OpponentKind::Random, 3)).unwrap();

        let seats: Vec<u8> = report.records.iter().map(|r| r.agent_seat).collect();
        assert_eq!(seats, vec![1, 2, 3]);
        assert_eq!(
            report.agent_wins + report.agent_losses + report.draws,
            report.games
        );
    }

    #[test]
    fn test_minimax_rejects_three_players() {
        let game = Nim::with_players(7, 2, 3);
        let err =
            run_match(&game, GameKind::Nim, &settings(OpponentKind::Minimax, 1)).unwrap_err();
        assert!(err.to_string().contains("two-player"));
    }

    #[test]
    fn test_report_serializes() {
        let settings = settings(OpponentKind::Agent, 2);
        let report = run_match(&Nim::new(6, 3), GameKind::Nim, &settings).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["game"], "nim");
        assert_eq!(json["opponent"], "agent");
        assert_eq!(json["records"].as_array().unwrap().len(), 2);
        assert!(json["records"][0]["moves"][0].as_str().unwrap().starts_with("take"));
    }

    #[test]
    fn test_cli_parses_match() {
        let cli = Cli::try_parse_from([
            "shuct-arena",
            "match",
            "--game",
            "nim",
            "--opponent",
            "minimax",
            "--iterations",
            "-1",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::Match {
                game,
                opponent,
                iterations,
                ..
            } => {
                assert_eq!(game, GameKind::Nim);
                assert_eq!(opponent, OpponentKind::Minimax);
                assert_eq!(iterations, -1);
            }
            Commands::Analyze { .. } => panic!("expected the match subcommand"),
        }
    }
}
