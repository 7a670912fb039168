use std::path::PathBuf;

use clap::Parser;
use corewar::battle::{Match, Verdict};
use corewar::process::Player;
use corewar::program::Program;
use corewar::settings::Settings;
use corewar::tournament::{TournamentConfig, run_tournament};
use corewar::warriors;

#[derive(Parser)]
#[command(name = "corewar", about = "Core War: two warriors, one circular core")]
struct Cli {
    /// Built-in warrior for player A (imp, dwarf, duck, loop, splitter).
    #[arg(long, default_value = "dwarf")]
    warrior_a: String,

    /// Built-in warrior for player B.
    #[arg(long, default_value = "imp")]
    warrior_b: String,

    /// JSON settings file (camelCase keys, all optional).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Random seed for placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Cells in the core.
    #[arg(long)]
    core_size: Option<usize>,

    /// Ticks before the match is a draw.
    #[arg(long)]
    max_ticks: Option<usize>,

    /// Process limit per player.
    #[arg(long)]
    max_processes: Option<usize>,

    /// Place player B at a random separation.
    #[arg(long)]
    random_separation: bool,

    /// Number of rounds; more than one runs a parallel tournament.
    #[arg(long, default_value_t = 1)]
    rounds: usize,

    /// Write the execution trace of a single match as JSON.
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Print both warriors' regions of the final core.
    #[arg(long)]
    listing: bool,
}

fn load_settings(cli: &Cli) -> Result<Settings, String> {
    let mut settings = match &cli.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
            Settings::from_json(&json).map_err(|e| e.to_string())?
        }
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if let Some(core_size) = cli.core_size {
        // Distances default to "no folding" for the new size.
        if settings.read_distance == settings.core_size {
            settings.read_distance = core_size;
        }
        if settings.write_distance == settings.core_size {
            settings.write_distance = core_size;
        }
        settings.separation = settings.separation.min(core_size / 2);
        settings.minimum_separation = settings.minimum_separation.min(settings.separation);
        settings.core_size = core_size;
    }
    if let Some(max_ticks) = cli.max_ticks {
        settings.maximum_ticks = max_ticks;
    }
    if let Some(max_processes) = cli.max_processes {
        settings.maximum_processes_per_player = max_processes;
    }
    if cli.random_separation {
        settings.random_separation = true;
    }
    settings.validate().map_err(|e| e.to_string())?;
    Ok(settings)
}

fn warrior(name: &str) -> Result<Program, String> {
    warriors::by_name(name).ok_or_else(|| {
        format!(
            "Unknown warrior: {name}. Available: {}",
            warriors::NAMES.join(", ")
        )
    })
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let settings = load_settings(cli)?;
    let a = warrior(&cli.warrior_a)?;
    let b = warrior(&cli.warrior_b)?;

    if cli.rounds > 1 {
        run_rounds(cli, settings, &a, &b)
    } else {
        run_single(cli, settings, &a, &b)
    }
}

fn run_single(cli: &Cli, settings: Settings, a: &Program, b: &Program) -> Result<(), String> {
    let mut game = Match::new(settings, a, b).map_err(|e| e.to_string())?;
    if cli.trace.is_some() {
        game = game.with_trace();
    }

    let start = std::time::Instant::now();
    let result = game.run();
    let elapsed = start.elapsed();

    match result.verdict {
        Verdict::Win(Player::A) => println!("{} (A) wins", cli.warrior_a),
        Verdict::Win(Player::B) => println!("{} (B) wins", cli.warrior_b),
        Verdict::Draw => println!("draw"),
    }
    eprintln!("  Ticks:    {}", result.ticks);
    eprintln!("  Bases:    A {:05}, B {:05}", result.bases[0], result.bases[1]);
    eprintln!("  Elapsed:  {elapsed:.2?}");

    if cli.listing {
        println!("-- A --");
        print!("{}", result.core.disassemble(result.bases[0], a.len()));
        println!("-- B --");
        print!("{}", result.core.disassemble(result.bases[1], b.len()));
    }

    if let Some(path) = &cli.trace {
        let json = result.trace.to_json().map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| format!("Cannot write {}: {e}", path.display()))?;
        eprintln!("  Trace:    {} steps -> {}", result.trace.len(), path.display());
    }
    Ok(())
}

fn run_rounds(cli: &Cli, settings: Settings, a: &Program, b: &Program) -> Result<(), String> {
    let config = TournamentConfig {
        seed: settings.seed,
        settings,
        rounds: cli.rounds,
    };

    let start = std::time::Instant::now();
    let standings = run_tournament(&config, a, b).map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();

    println!("rounds,wins_a,wins_b,draws,score_a,score_b,win_rate_a,win_rate_b");
    println!(
        "{},{},{},{},{},{},{:.3},{:.3}",
        standings.rounds(),
        standings.wins_a,
        standings.wins_b,
        standings.draws,
        standings.score(Player::A),
        standings.score(Player::B),
        standings.win_rate(Player::A),
        standings.win_rate(Player::B)
    );
    eprintln!("  {} vs {}: {standings}", cli.warrior_a, cli.warrior_b);
    eprintln!("  Elapsed:  {elapsed:.2?}");
    Ok(())
}
