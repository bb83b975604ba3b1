//! Command-line front end for tasktab. Commands run through the same presenters a graphical
//! shell would use, with console renditions of the views.

pub mod cli;
pub mod commands;
pub mod config;
pub mod console;

use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Run one command on an internal Tokio runtime, printing to stdout.
pub fn run_blocking(cli: Cli) -> Result<()> {
    init_tracing(&cli.log_filter)?;
    let config = config::from_cli(&cli)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    runtime.block_on(commands::execute(&config, cli.command, &mut handle))
}

/// Install the stderr subscriber. `RUST_LOG` directives are layered over `filter`.
pub fn init_tracing(filter: &str) -> Result<()> {
    let directive: Directive = filter
        .parse()
        .with_context(|| format!("invalid log directive '{filter}'"))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}
