use anyhow::Result;
use clap::{Parser, Subcommand};
use stretto::cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Plan(args) => args.run(),
        Command::Check(args) => args.run(),
    }
}

#[derive(Parser)]
#[command(name = "stretto", about = "Jerk-limited trajectory planning for multi-axis jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan a job and print one sample row per control cycle.
    Plan(cli::plan::PlanArgs),
    /// Validate a job file and report the per-axis minimum durations.
    Check(cli::check::CheckArgs),
}
