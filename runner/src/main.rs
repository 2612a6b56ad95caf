// ═══════════════════════════════════════════════════════════════════════
// Runner — CLI entry point for headless games and batch simulations
// ═══════════════════════════════════════════════════════════════════════

mod game;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use game::{make_agents, run_game, GameResult};
use hex_agents::{AiTuning, Difficulty};
use hex_engine::generation::{generate_island, GenerationParams};
use hex_engine::{GameConfig, GridLayout, Island, Snapshot, Team};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hex-runner", about = "Headless hex territory conquest")]
struct Cli {
    /// Log level: error, warn, info, debug or trace
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct GameArgs {
    #[arg(short, long, default_value_t = 25)]
    width: u32,
    #[arg(long, default_value_t = 25)]
    height: u32,
    /// Board shape: "hex" or "rect"
    #[arg(short, long, default_value = "hex", value_parser = parse_layout)]
    layout: GridLayout,
    /// Opponent type: unlosable, easy or hard
    #[arg(short, long, default_value = "hard")]
    difficulty: Difficulty,
    #[arg(short, long, default_value_t = 200)]
    max_rounds: u32,
    /// JSON file with game configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON file with AI tuning
    #[arg(long)]
    tuning: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game between agents
    Play {
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[command(flatten)]
        args: GameArgs,
        /// Write the final position as snapshot JSON
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Play many seeded games in parallel and tally the winners
    Simulate {
        #[arg(short, long, default_value_t = 100)]
        games: u32,
        #[arg(short, long, default_value_t = 42)]
        seed: u64,
        #[command(flatten)]
        args: GameArgs,
    },
    /// Load a snapshot file, validate it and print a summary
    Inspect { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.parse().unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new().filter_level(level).format_timestamp(None).init();

    match cli.command {
        Commands::Play { seed, args, save } => cmd_play(seed, &args, save.as_deref()),
        Commands::Simulate { games, seed, args } => cmd_simulate(games, seed, &args),
        Commands::Inspect { file } => cmd_inspect(&file),
    }
}

fn parse_layout(s: &str) -> Result<GridLayout, String> {
    match s.to_ascii_lowercase().as_str() {
        "hex" | "hexagonal" => Ok(GridLayout::Hexagonal),
        "rect" | "rectangular" => Ok(GridLayout::Rectangular),
        other => Err(format!("unknown layout '{}' (expected hex or rect)", other)),
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {} from {}", what, path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} in {}", what, path.display()))
}

fn load_settings(args: &GameArgs) -> Result<(GameConfig, AiTuning)> {
    if args.difficulty == Difficulty::Player {
        bail!("headless games need agents; pick unlosable, easy or hard");
    }
    let config = match &args.config {
        Some(path) => load_json(path, "game config")?,
        None => GameConfig::default(),
    };
    let tuning = match &args.tuning {
        Some(path) => load_json(path, "AI tuning")?,
        None => AiTuning::default(),
    };
    Ok((config, tuning))
}

fn new_island(seed: u64, args: &GameArgs, config: GameConfig) -> Result<Island> {
    let params = GenerationParams {
        width: args.width,
        height: args.height,
        layout: args.layout,
        seed,
        ..GenerationParams::default()
    };
    generate_island(&params, config).with_context(|| format!("generating island for seed {}", seed))
}

fn cmd_play(seed: u64, args: &GameArgs, save: Option<&Path>) -> Result<()> {
    println!("=== Hex ===\n");
    println!(
        "Single game: seed={}, {}x{} {:?}, difficulty={}\n",
        seed, args.width, args.height, args.layout, args.difficulty
    );

    let (config, tuning) = load_settings(args)?;
    let island = new_island(seed, args, config)?;
    let mut agents = make_agents(args.difficulty, seed, &tuning);

    let (result, island) = run_game(island, &mut agents, args.max_rounds, |island| {
        let standings: Vec<String> = Team::ALL
            .iter()
            .map(|&team| {
                let cells: usize = island.territories().of_team(team).map(|t| t.len()).sum();
                format!("{} {:>3}", team, cells)
            })
            .collect();
        println!("Round {:>3}: {}", island.round(), standings.join("  "));
    })?;

    println!();
    match &result.outcome {
        Some(outcome) => println!("Game finished in round {}: {}", result.final_round, outcome),
        None => println!("No winner after {} rounds", args.max_rounds),
    }
    print_standings(&result);

    if let Some(path) = save {
        let json = island.capture().to_json().context("serialising final snapshot")?;
        std::fs::write(path, json).with_context(|| format!("writing snapshot to {}", path.display()))?;
        println!("\nSnapshot saved to: {}", path.display());
    }
    Ok(())
}

fn print_standings(result: &GameResult) {
    println!("\n  Final standings:");
    for r in &result.team_results {
        println!(
            "    {:8} {:10} territories: {:>2}, cells: {:>3}, treasury: {:>4}",
            r.team.to_string(),
            r.agent_name,
            r.territories,
            r.cells,
            r.treasury
        );
    }
}

fn cmd_simulate(num_games: u32, seed: u64, args: &GameArgs) -> Result<()> {
    println!("=== Simulation: {} games, difficulty={} ===\n", num_games, args.difficulty);

    let (config, tuning) = load_settings(args)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let seeds: Vec<u64> = (0..num_games).map(|_| rng.gen()).collect();

    let results: Vec<(u64, Result<GameResult>)> = seeds
        .par_iter()
        .map(|&game_seed| {
            let result = new_island(game_seed, args, config.clone()).and_then(|island| {
                let mut agents = make_agents(args.difficulty, game_seed, &tuning);
                run_game(island, &mut agents, args.max_rounds, |_| {}).map(|(result, _)| result)
            });
            (game_seed, result)
        })
        .collect();

    let mut wins: BTreeMap<Team, u32> = BTreeMap::new();
    let mut undecided = 0u32;
    let mut errors = 0u32;
    for (game_seed, result) in &results {
        match result {
            Ok(r) => match r.winner() {
                Some(team) => *wins.entry(team).or_insert(0) += 1,
                None => undecided += 1,
            },
            Err(e) => {
                errors += 1;
                eprintln!("Seed {}: ERROR -- {:#}", game_seed, e);
            }
        }
    }

    println!("--- Summary ({} games, {} errors) ---", num_games, errors);
    for &team in &Team::ALL {
        let w = wins.get(&team).copied().unwrap_or(0);
        let pct = if num_games > 0 { w as f64 / num_games as f64 * 100.0 } else { 0.0 };
        println!("  {:8}: {:>4} wins ({:.1}%)", team.to_string(), w, pct);
    }
    println!("  {:8}: {:>4}", "no winner", undecided);
    info!("simulated {} games from seed {}", num_games, seed);
    Ok(())
}

fn cmd_inspect(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot = Snapshot::from_json(&text).with_context(|| format!("parsing snapshot {}", path.display()))?;
    let island = Island::from_snapshot(&snapshot, GameConfig::default())
        .with_context(|| format!("{} is not a valid island", path.display()))?;

    println!("=== {} ===\n", path.display());
    println!("  Board:   {}x{} {:?}", snapshot.width, snapshot.height, snapshot.layout);
    println!("  Cells:   {}", snapshot.cells.len());
    println!("  Round:   {}", island.round());
    println!("  Turn:    {}", island.current_team());
    if let Some(outcome) = island.outcome() {
        println!("  Outcome: {}", outcome);
    }
    println!();
    println!("{:<8} {:>11} {:>6} {:>7} {:>9}", "Team", "Territories", "Cells", "Income", "Treasury");
    println!("{}", "-".repeat(45));
    for &team in &Team::ALL {
        let owned: Vec<_> = island.territories().of_team(team).collect();
        if owned.is_empty() {
            continue;
        }
        println!(
            "{:<8} {:>11} {:>6} {:>7} {:>9}",
            team.to_string(),
            owned.len(),
            owned.iter().map(|t| t.len()).sum::<usize>(),
            owned.iter().map(|t| island.income_of(t)).sum::<i32>(),
            owned.iter().map(|t| island.balance_of(t)).sum::<i32>()
        );
    }
    Ok(())
}
