use std::path::PathBuf;

use clap::{value_parser, Args, Parser, Subcommand};
use tasktab_core::model::TaskFilter;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tasktab",
    version,
    about = "Task list backed by a local store that mirrors a remote one.",
    after_help = "Examples:\n  tasktab add \"Buy milk\" --description \"semi-skimmed\"\n  tasktab list --filter active\n  tasktab complete 01HZX3\n  tasktab clear-completed"
)]
pub struct Cli {
    /// Override the data directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Simulated round-trip latency of the remote store, in milliseconds
    #[arg(long = "remote-latency-ms", value_name = "MS", global = true, value_parser = value_parser!(u64))]
    pub remote_latency_ms: Option<u64>,

    /// Tracing filter written to stderr (e.g. "info", "tasktab_core=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true, default_value = "warn")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// List tasks
    List(ListArgs),
    /// Add a task
    Add(AddArgs),
    /// Show one task
    Show(TaskIdArgs),
    /// Rewrite the title and/or description of a task
    Edit(EditArgs),
    /// Mark a task as completed
    Complete(TaskIdArgs),
    /// Mark a task as active again
    Activate(TaskIdArgs),
    /// Delete a task
    Delete(TaskIdArgs),
    /// Delete every completed task
    ClearCompleted,
    /// Show active and completed counts
    Stats,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Which tasks to show: all, active or completed
    #[arg(long, value_name = "FILTER", default_value = "all")]
    pub filter: TaskFilter,

    /// Print the tasks as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    #[arg(value_name = "TITLE")]
    pub title: String,

    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Args, Debug, Clone)]
pub struct TaskIdArgs {
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args, Debug, Clone)]
pub struct EditArgs {
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title (keeps the current one when omitted)
    #[arg(long)]
    pub title: Option<String>,

    /// New description (keeps the current one when omitted)
    #[arg(long)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["tasktab", "list"], TaskFilter::All)]
    #[case(&["tasktab", "list", "--filter", "active"], TaskFilter::Active)]
    #[case(&["tasktab", "list", "--filter", "done"], TaskFilter::Completed)]
    fn list_filter_parses(#[case] argv: &[&str], #[case] expected: TaskFilter) {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            CliCommand::List(args) => assert_eq!(args.filter, expected),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "tasktab",
            "complete",
            "01ABC",
            "--data-dir",
            "/tmp/tasks",
            "--remote-latency-ms",
            "25",
            "--log",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/tasks")));
        assert_eq!(cli.remote_latency_ms, Some(25));
        assert_eq!(cli.log_filter, "debug");
        assert!(matches!(cli.command, CliCommand::Complete(TaskIdArgs { id }) if id == "01ABC"));
    }

    #[test]
    fn unknown_filter_is_rejected() {
        assert!(Cli::try_parse_from(["tasktab", "list", "--filter", "someday"]).is_err());
    }
}
