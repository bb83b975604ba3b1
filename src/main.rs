use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = tasktab::cli::Cli::parse();
    tasktab::run_blocking(cli)
}
