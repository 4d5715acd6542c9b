//! `water-sort`: solve, check, generate and step through water sort puzzles.

mod gameplay;
mod renderer;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use water_sort_solver::display::{plan_line, step_label};
use water_sort_solver::generator::{PuzzleShape, generate_seeded};
use water_sort_solver::{Config, GameState, PourAction, Solver, parse_state, samples, solve_batch};

use crate::gameplay::ReplayEngine;

#[derive(Parser)]
#[command(name = "water-sort")]
#[command(about = "Solve water sort puzzles written as e.g. \"A1.B1/B3/A3\"")]
struct Cli {
    /// Config file (defaults to ./water_sort.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PuzzleArgs {
    /// Puzzle notation: bottles split by '/', segments by '.'
    puzzle: Option<String>,
    /// Use a built-in sample puzzle instead
    #[arg(long, conflicts_with = "puzzle")]
    sample: Option<usize>,
    /// Units each bottle holds
    #[arg(long)]
    capacity: Option<u32>,
}

#[derive(Args)]
struct SearchArgs {
    /// Deepest recursion level of the search
    #[arg(long)]
    depth: Option<u32>,
    /// Skip merging fluid into pure bottles before branching
    #[arg(long)]
    no_consolidate: bool,
    /// Search even when the plausibility check fails
    #[arg(long)]
    force: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a solution
    Solve {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Run the plausibility check only
    Check {
        #[command(flatten)]
        puzzle: PuzzleArgs,
    },
    /// Solve, then apply the pours one at a time, waiting for Enter
    Step {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Solve every built-in sample in parallel
    Samples {
        #[command(flatten)]
        search: SearchArgs,
        /// Units each bottle holds
        #[arg(long)]
        capacity: Option<u32>,
    },
    /// Print a random puzzle in notation form
    Generate {
        #[arg(long, default_value_t = 4)]
        colors: usize,
        #[arg(long, default_value_t = 2)]
        empty: usize,
        #[arg(long)]
        seed: Option<u64>,
        /// Units each bottle holds
        #[arg(long)]
        capacity: Option<u32>,
    },
    /// Open the graphical step-through viewer
    View {
        #[command(flatten)]
        puzzle: PuzzleArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn apply_overrides(mut config: Config, capacity: Option<u32>, search: Option<&SearchArgs>) -> Config {
    if let Some(capacity) = capacity {
        config.capacity = capacity;
    }
    if let Some(search) = search {
        if let Some(depth) = search.depth {
            config.search.depth_limit = depth;
        }
        if search.no_consolidate {
            config.search.auto_consolidate = false;
        }
    }
    config
}

fn load_puzzle(args: &PuzzleArgs, capacity: u32) -> Result<GameState> {
    match (&args.puzzle, args.sample) {
        (Some(text), _) => {
            parse_state(text, capacity).with_context(|| format!("invalid puzzle {text:?}"))
        }
        (None, Some(index)) => samples::sample(index, capacity)
            .with_context(|| {
                format!(
                    "no sample #{index}, the library has {}",
                    samples::SAMPLE_PUZZLES.len()
                )
            })?
            .with_context(|| format!("sample #{index} is malformed")),
        (None, None) => bail!("give a puzzle in notation form or pick one with --sample N"),
    }
}

fn ensure_plausible(state: &GameState, force: bool) -> Result<()> {
    match state.check_plausible() {
        Ok(()) => Ok(()),
        Err(err) if force => {
            tracing::warn!("{err}, searching anyway");
            Ok(())
        }
        Err(err) => Err(err).context("puzzle cannot be sorted (use --force to search anyway)"),
    }
}

fn solve_puzzle(state: &GameState, config: &Config) -> Result<Vec<PourAction>> {
    let mut solver = Solver::new(config.search);
    let pours = solver.solve(state)?;
    tracing::info!(
        pours = pours.len(),
        states = solver.stats().states_visited,
        "solution found"
    );
    Ok(pours)
}

fn run_solve(state: GameState, config: &Config, search: &SearchArgs) -> Result<()> {
    print!("{state}");
    ensure_plausible(&state, search.force)?;
    let pours = solve_puzzle(&state, config)?;
    println!("Solution ({} pours):", pours.len());
    for (step, pour) in pours.iter().enumerate() {
        println!("{}", step_label(step, pours.len(), *pour));
    }
    Ok(())
}

fn run_step(mut state: GameState, config: &Config, search: &SearchArgs) -> Result<()> {
    print!("{state}");
    ensure_plausible(&state, search.force)?;
    let pours = solve_puzzle(&state, config)?;
    println!("Solution: {}", plan_line(&pours));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    for (step, &pour) in pours.iter().enumerate() {
        state
            .apply_pour(pour)
            .with_context(|| format!("step {} ({pour}) does not apply", step + 1))?;
        print!("{state}{} ", step_label(step, pours.len(), pour));
        io::stdout().flush()?;
        if lines.next().transpose()?.is_none() {
            break;
        }
    }
    Ok(())
}

fn run_samples(config: &Config) -> Result<()> {
    let states = samples::all(config.capacity).context("sample library is malformed")?;
    let mut indices = Vec::new();
    let mut puzzles = Vec::new();
    for (index, state) in states.into_iter().enumerate() {
        match state.check_plausible() {
            Ok(()) => {
                indices.push(index);
                puzzles.push(state);
            }
            Err(err) => println!("#{index}\tskipped: {err}"),
        }
    }

    let results = solve_batch(&puzzles, config.search);
    for (index, result) in indices.into_iter().zip(results) {
        match result {
            Ok(pours) => println!("#{index}\tsolved in {} pours", pours.len()),
            Err(err) => println!("#{index}\t{err}"),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref());

    match cli.command {
        Commands::Solve { puzzle, search } => {
            let config = apply_overrides(config, puzzle.capacity, Some(&search));
            run_solve(load_puzzle(&puzzle, config.capacity)?, &config, &search)
        }
        Commands::Check { puzzle } => {
            let config = apply_overrides(config, puzzle.capacity, None);
            let state = load_puzzle(&puzzle, config.capacity)?;
            print!("{state}");
            match state.check_plausible() {
                Ok(()) => println!("maybe possible"),
                Err(err) => println!("{err}"),
            }
            Ok(())
        }
        Commands::Step { puzzle, search } => {
            let config = apply_overrides(config, puzzle.capacity, Some(&search));
            run_step(load_puzzle(&puzzle, config.capacity)?, &config, &search)
        }
        Commands::Samples { search, capacity } => {
            run_samples(&apply_overrides(config, capacity, Some(&search)))
        }
        Commands::Generate {
            colors,
            empty,
            seed,
            capacity,
        } => {
            let shape = PuzzleShape {
                colors,
                empty_bottles: empty,
                capacity: capacity.unwrap_or(config.capacity),
            };
            let seed = seed.unwrap_or_else(rand::random);
            let state = generate_seeded(&shape, seed)?;
            tracing::info!(seed, "generated puzzle");
            println!("{}", state.to_notation());
            Ok(())
        }
        Commands::View { puzzle, search } => {
            let config = apply_overrides(config, puzzle.capacity, Some(&search));
            let state = if puzzle.puzzle.is_none() && puzzle.sample.is_none() {
                samples::sample(1, config.capacity)
                    .context("sample library is empty")??
            } else {
                load_puzzle(&puzzle, config.capacity)?
            };
            macroquad::Window::new("Water Sort", async move {
                gameplay::run(ReplayEngine::new(state, config)).await;
            });
            Ok(())
        }
    }
}
