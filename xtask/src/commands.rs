use anyhow::Result;
use clap::{Args, Subcommand};
use xshell::{cmd, Shell};

#[derive(Subcommand)]
pub enum Command {
    /// Run CI checks (fmt, clippy, test). Runs all if no subcommand specified.
    Ci(Ci),
    /// Apply rustfmt to all files
    Fmt,
    /// Run tests
    Test(TestArgs),
}

#[derive(Args)]
pub struct Ci {
    #[command(subcommand)]
    command: Option<CiCommand>,
}

#[derive(Subcommand)]
pub enum CiCommand {
    /// Run cargo fmt check
    Fmt,
    /// Run cargo clippy
    Clippy,
    /// Run cargo test
    Test(TestArgs),
}

#[derive(Args, Default)]
pub struct TestArgs {
    /// Additional arguments to pass to cargo test
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

impl Command {
    pub fn run(self, sh: &Shell) -> Result<()> {
        match self {
            Command::Ci(ci) => ci.run(sh),
            Command::Fmt => {
                cmd!(sh, "cargo fmt --all").run()?;
                Ok(())
            }
            Command::Test(test) => run_tests(sh, &test.args),
        }
    }
}

impl Ci {
    pub fn run(&self, sh: &Shell) -> Result<()> {
        match &self.command {
            Some(command) => command.run(sh),
            None => {
                CiCommand::Fmt.run(sh)?;
                CiCommand::Clippy.run(sh)?;
                CiCommand::Test(TestArgs::default()).run(sh)?;
                Ok(())
            }
        }
    }
}

impl CiCommand {
    pub fn run(&self, sh: &Shell) -> Result<()> {
        match self {
            CiCommand::Fmt => {
                eprintln!("Checking formatting...");
                cmd!(sh, "cargo fmt --all -- --check").run()?;
                Ok(())
            }
            CiCommand::Clippy => {
                eprintln!("Running cargo clippy...");
                cmd!(sh, "cargo clippy --workspace --all-targets -- -D warnings").run()?;
                Ok(())
            }
            CiCommand::Test(test) => run_tests(sh, &test.args),
        }
    }
}

fn run_tests(sh: &Shell, args: &[String]) -> Result<()> {
    eprintln!("Running cargo test...");
    cmd!(sh, "cargo test --workspace {args...}").run()?;
    Ok(())
}
