use std::path::PathBuf;

use clap::Parser;

use kolkhoz_bench::config::{BenchmarkConfig, ResolvedOutputs};
use kolkhoz_bench::logging::init_logging;
use kolkhoz_bench::tournament::TournamentRunner;

/// Tournament benchmarking harness for Kolkhoz bots.
#[derive(Debug, Parser)]
#[command(
    name = "kolkhoz-bench",
    author,
    version,
    about = "Deterministic Kolkhoz tournament harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the master RNG seed.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the table size.
    #[arg(long, value_name = "COUNT")]
    players: Option<usize>,

    /// Exit after validating the configuration (no tournament is run).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if let Some(players) = cli.players {
        config.games.num_players = players;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let seats = config.games.num_players;

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agent{} ({games} games, {seats} seats, {} requisition)",
        if agent_count == 1 { "" } else { "s" },
        config.games.variant
    );

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = TournamentRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: tournament execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Tournament complete for '{run_id}': {} games → {} rows at {}",
        summary.games_played,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
