use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tasktab_core::model::TaskStats;
use tasktab_core::{AppConfig, TaskRepository};
use tasktab_panes::telemetry::Handle;
use tasktab_panes::{PaneSnapshot, PresenterError, TabletCoordinator};

use crate::cli::{AddArgs, CliCommand, EditArgs, ListArgs};
use crate::console::{Console, ConsoleNavigator, ConsoleTasksView, ListMode};

/// Execute one command against the stores under `config`, writing its output to `writer`.
pub async fn execute(
    config: &AppConfig,
    command: CliCommand,
    writer: &mut dyn Write,
) -> Result<()> {
    let repo = Arc::new(TaskRepository::open(config).context("failed to open task stores")?);
    let mut session = Session::new(repo, list_mode(&command));

    let outcome = session.run(command).await;
    session.console.flush_to(writer)?;
    outcome
}

fn list_mode(command: &CliCommand) -> ListMode {
    match command {
        CliCommand::List(ListArgs { json: true, .. }) => ListMode::Json,
        CliCommand::List(_) => ListMode::Text,
        _ => ListMode::Quiet,
    }
}

struct Session {
    repo: Arc<TaskRepository>,
    console: Console,
    navigator: Arc<ConsoleNavigator>,
    coordinator: TabletCoordinator,
}

impl Session {
    fn new(repo: Arc<TaskRepository>, mode: ListMode) -> Self {
        let console = Console::new();
        let navigator = ConsoleNavigator::new(console.clone());
        let coordinator = TabletCoordinator::new(
            repo.clone(),
            ConsoleTasksView::new(console.clone(), mode),
            navigator.clone(),
            Arc::new(Handle::new()),
        );
        Self {
            repo,
            console,
            navigator,
            coordinator,
        }
    }

    async fn run(&mut self, command: CliCommand) -> Result<()> {
        match command {
            CliCommand::List(args) => {
                self.coordinator
                    .restore(PaneSnapshot {
                        filter: args.filter,
                        ..PaneSnapshot::default()
                    })
                    .await?;
                self.coordinator.start().await;
            }
            CliCommand::Add(args) => self.add(&args).await?,
            CliCommand::Show(args) => self.coordinator.open_task_details(&args.id).await?,
            CliCommand::Edit(args) => self.edit(args).await?,
            CliCommand::Complete(args) => {
                self.ensure_exists(&args.id).await?;
                self.coordinator.complete_task(&args.id).await?;
            }
            CliCommand::Activate(args) => {
                self.ensure_exists(&args.id).await?;
                self.coordinator.activate_task(&args.id).await?;
            }
            CliCommand::Delete(args) => {
                self.ensure_exists(&args.id).await?;
                self.coordinator.delete_task(&args.id).await?;
            }
            CliCommand::ClearCompleted => self.coordinator.clear_completed_tasks().await?,
            CliCommand::Stats => self.stats().await,
        }
        Ok(())
    }

    async fn add(&mut self, args: &AddArgs) -> Result<()> {
        self.coordinator.add_new_task().await?;
        let task = self
            .coordinator
            .save_task(&args.title, &args.description)
            .await?;
        self.console.line(format!("  id: {}", task.id));
        Ok(())
    }

    async fn edit(&mut self, args: EditArgs) -> Result<()> {
        if args.title.is_none() && args.description.is_none() {
            return Err(anyhow!("nothing to change: pass --title and/or --description"));
        }
        self.coordinator
            .restore(PaneSnapshot {
                edit_task_id: Some(args.id.clone()),
                ..PaneSnapshot::default()
            })
            .await?;
        let form = self
            .navigator
            .form()
            .ok_or_else(|| anyhow!("edit form for task '{}' was not opened", args.id))?;

        let title = args.title.unwrap_or_else(|| form.title());
        let description = args.description.unwrap_or_else(|| form.description());
        self.coordinator.save_task(&title, &description).await?;
        Ok(())
    }

    async fn stats(&self) {
        let tasks = self.repo.get_tasks().await.into_option().unwrap_or_default();
        let stats = TaskStats::from_tasks(&tasks);
        self.console.line(format!(
            "Active:    {} ({:.0}%)",
            stats.active, stats.active_percent
        ));
        self.console.line(format!(
            "Completed: {} ({:.0}%)",
            stats.completed, stats.completed_percent
        ));
    }

    /// The repository accepts toggles on unknown ids silently; the terminal reports them.
    async fn ensure_exists(&self, task_id: &str) -> Result<()> {
        if self.repo.get_task(task_id).await.is_available() {
            Ok(())
        } else {
            Err(PresenterError::MissingTask(task_id.to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tasktab_core::model::Task;
    use tempfile::TempDir;

    use super::*;
    use crate::cli::Cli;

    fn temp_config() -> (AppConfig, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let config = AppConfig::from_data_dir(dir.path().to_path_buf()).expect("config");
        (config, dir)
    }

    async fn run(config: &AppConfig, argv: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("tasktab").chain(argv.iter().copied()))?;
        let mut output = Vec::new();
        let outcome = execute(config, cli.command, &mut output).await;
        let output = String::from_utf8(output).expect("utf8");
        outcome.map(|()| output)
    }

    fn added_id(output: &str) -> String {
        output
            .lines()
            .find_map(|line| line.trim().strip_prefix("id: "))
            .expect("id line")
            .to_string()
    }

    #[tokio::test]
    async fn add_then_list_shows_task() {
        let (config, _dir) = temp_config();

        let output = run(&config, &["add", "Buy milk"]).await.unwrap();
        assert!(output.starts_with("Task saved\n"));
        let id = added_id(&output);

        let listed = run(&config, &["list"]).await.unwrap();
        assert_eq!(listed, format!("[ ] {id}  Buy milk\n"));
    }

    #[tokio::test]
    async fn complete_moves_task_between_filters() {
        let (config, _dir) = temp_config();
        let id = added_id(&run(&config, &["add", "Buy milk"]).await.unwrap());

        let output = run(&config, &["complete", &id]).await.unwrap();
        assert_eq!(output, "Task marked complete\n");

        let active = run(&config, &["list", "--filter", "active"]).await.unwrap();
        assert_eq!(active, "No active tasks\n(showing active tasks)\n");

        let json = run(&config, &["list", "--filter", "completed", "--json"])
            .await
            .unwrap();
        let tasks: Vec<Task> = serde_json::from_str(&json).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert!(tasks[0].completed);
    }

    #[tokio::test]
    async fn edit_keeps_fields_not_given() {
        let (config, _dir) = temp_config();
        let id = added_id(
            &run(&config, &["add", "Draft", "--description", "first notes"])
                .await
                .unwrap(),
        );

        let output = run(&config, &["edit", &id, "--title", "Final"]).await.unwrap();

        assert_eq!(
            output,
            "Task saved\nFinal\n\n  first notes\nStatus: active\n"
        );
        let shown = run(&config, &["show", &id]).await.unwrap();
        assert!(shown.starts_with("Final\n"));
    }

    #[tokio::test]
    async fn edit_without_changes_is_rejected() {
        let (config, _dir) = temp_config();
        let err = run(&config, &["edit", "whatever"]).await.unwrap_err();
        assert!(err.to_string().contains("nothing to change"));
    }

    #[tokio::test]
    async fn unknown_ids_are_reported() {
        let (config, _dir) = temp_config();
        run(&config, &["add", "Buy milk"]).await.unwrap();

        for command in ["show", "complete", "activate", "delete"] {
            let err = run(&config, &[command, "missing"]).await.unwrap_err();
            assert_eq!(err.to_string(), "No task with id 'missing'", "{command}");
        }
    }

    #[tokio::test]
    async fn empty_title_and_description_are_refused() {
        let (config, _dir) = temp_config();
        let err = run(&config, &["add", " "]).await.unwrap_err();
        assert_eq!(err.to_string(), "A task needs a title or a description");
    }

    #[tokio::test]
    async fn clear_completed_and_stats() {
        let (config, _dir) = temp_config();
        let done = added_id(&run(&config, &["add", "done"]).await.unwrap());
        run(&config, &["add", "open"]).await.unwrap();
        run(&config, &["add", "also open"]).await.unwrap();
        run(&config, &["complete", &done]).await.unwrap();

        let stats = run(&config, &["stats"]).await.unwrap();
        assert_eq!(stats, "Active:    2 (67%)\nCompleted: 1 (33%)\n");

        let cleared = run(&config, &["clear-completed"]).await.unwrap();
        assert_eq!(cleared, "Completed tasks cleared\n");

        let stats = run(&config, &["stats"]).await.unwrap();
        assert_eq!(stats, "Active:    2 (100%)\nCompleted: 0 (0%)\n");
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let (config, _dir) = temp_config();
        assert_eq!(run(&config, &["list"]).await.unwrap(), "No tasks yet\n");
        assert_eq!(run(&config, &["list", "--json"]).await.unwrap(), "[]\n");
        assert_eq!(
            run(&config, &["stats"]).await.unwrap(),
            "Active:    0 (0%)\nCompleted: 0 (0%)\n"
        );
    }
}
