use anyhow::Result;
use clap::Parser;
use xshell::Shell;

mod commands;

/// Workspace chores: formatting, tests, CI checks.
#[derive(Parser)]
#[command(name = "xtask")]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> Result<()> {
    let sh = Shell::new()?;
    Cli::parse().command.run(&sh)
}
