use std::time::Duration;

use anyhow::Result;
use tasktab_core::AppConfig;

use crate::cli::Cli;

/// Resolve the data directory and apply command-line overrides on top of the environment.
pub fn from_cli(cli: &Cli) -> Result<AppConfig> {
    let config = AppConfig::discover(cli.data_dir.clone())?;
    Ok(match cli.remote_latency_ms {
        Some(millis) => config.with_remote_latency(Duration::from_millis(millis)),
        None => config,
    })
}
