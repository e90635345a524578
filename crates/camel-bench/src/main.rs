use std::path::PathBuf;

use clap::Parser;

use camel_bench::config::BenchmarkConfig;
use camel_bench::logging::init_logging;
use camel_bench::runner::BenchRunner;

/// Headless benchmark harness for camel race bots.
#[derive(Debug, Parser)]
#[command(
    name = "camel-bench",
    author,
    version,
    about = "Deterministic camel race bot benchmark"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} in output_dir).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games to play.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for game setup.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the number of seat rotations per game.
    #[arg(long, value_name = "COUNT")]
    rotations: Option<usize>,

    /// Override the default rollout count for hint players.
    #[arg(long, value_name = "COUNT")]
    rollouts: Option<u32>,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,

    /// Write telemetry.jsonl even when the config leaves it off.
    #[arg(long)]
    telemetry: bool,

    /// Log the full action table with every hint decision.
    #[arg(long)]
    log_hint_details: bool,
}

impl Cli {
    fn apply(&self, config: &mut BenchmarkConfig) {
        if let Some(run_id) = &self.run_id {
            config.run_id = run_id.clone();
        }
        if let Some(games) = self.games {
            config.games = games;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rotations) = self.rotations {
            config.rotations = rotations;
        }
        if let Some(rollouts) = self.rollouts {
            config.rollouts = rollouts;
        }
        config.telemetry.enabled |= self.telemetry || self.log_hint_details;
        config.telemetry.hint_details |= self.log_hint_details;
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;
    cli.apply(&mut config);

    let run_id = config.run_id.clone();
    println!(
        "Loaded configuration '{run_id}' with {} players ({} games, {} rotations)",
        config.players.len(),
        config.games,
        config.rotations
    );

    // Validates the overrides too.
    let runner = BenchRunner::new(config.clone())?;
    if cli.validate_only {
        println!("Validation-only mode: games skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.telemetry, runner.outputs())?;
    let summary = runner.run()?;
    drop(logging_guard);
    let telemetry = runner.summarise_telemetry()?;

    println!(
        "Bench complete for '{run_id}': {} games × {} rotations → {} rows at {}",
        summary.games_played,
        summary.rotations,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry) = telemetry.as_ref() {
        println!(
            "Telemetry: {} events, summary at {}",
            telemetry.events,
            runner.outputs().telemetry_summary.display()
        );
        for (policy, stats) in &telemetry.policies {
            let fallbacks: usize = stats.fallbacks.values().sum();
            println!(
                "  {policy}: {} decisions, {fallbacks} fallbacks, kinds {:?}",
                stats.decisions, stats.kinds
            );
        }
    }

    Ok(())
}
