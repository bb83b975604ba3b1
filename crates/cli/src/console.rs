//! Terminal renditions of the presenter views.
//!
//! Views collect lines into a shared [`Console`]; the command flushes them to its writer once the
//! presenters are done. Failures are not printed here, they come back as command errors.

use std::io::{self, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use tasktab_core::model::{Task, TaskFilter};
use tasktab_panes::view::{AddEditTaskView, PaneNavigator, TaskDetailView, TasksView};

#[derive(Debug, Clone, Default)]
pub struct Console {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }

    pub fn flush_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        for line in self.lines.lock().drain(..) {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Only confirmations; the reloaded list is not printed.
    Quiet,
    Text,
    Json,
}

pub struct ConsoleTasksView {
    console: Console,
    mode: ListMode,
}

impl ConsoleTasksView {
    pub fn new(console: Console, mode: ListMode) -> Arc<Self> {
        Arc::new(Self { console, mode })
    }

    fn confirm(&self, message: &str) {
        if self.mode != ListMode::Json {
            self.console.line(message);
        }
    }
}

impl TasksView for ConsoleTasksView {
    fn set_loading_indicator(&self, _active: bool) {}

    fn show_tasks(&self, tasks: &[Task]) {
        match self.mode {
            ListMode::Quiet => {}
            ListMode::Text => {
                for task in tasks {
                    self.console.line(task_line(task));
                }
            }
            ListMode::Json => match serde_json::to_string_pretty(tasks) {
                Ok(json) => self.console.line(json),
                Err(err) => tracing::error!(error = %err, "failed to encode tasks"),
            },
        }
    }

    fn show_no_tasks(&self, filter: TaskFilter) {
        match self.mode {
            ListMode::Quiet => {}
            ListMode::Text => self.console.line(no_tasks_message(filter)),
            ListMode::Json => self.console.line("[]"),
        }
    }

    fn show_loading_tasks_error(&self) {
        match self.mode {
            ListMode::Quiet => {}
            ListMode::Text => self.console.line("No tasks yet"),
            ListMode::Json => self.console.line("[]"),
        }
    }

    fn show_filter_label(&self, filter: TaskFilter) {
        if self.mode == ListMode::Text && filter != TaskFilter::All {
            self.console.line(format!("(showing {filter} tasks)"));
        }
    }

    fn show_add_task(&self) {}

    fn show_task_details(&self, task_id: &str) {
        self.console.line(format!("tasktab show {task_id}"));
    }

    fn show_task_marked_complete(&self) {
        self.confirm("Task marked complete");
    }

    fn show_task_marked_active(&self) {
        self.confirm("Task marked active");
    }

    fn show_task_deleted(&self) {
        self.confirm("Task deleted");
    }

    fn show_completed_tasks_cleared(&self) {
        self.confirm("Completed tasks cleared");
    }

    fn show_successfully_saved_message(&self) {
        self.confirm("Task saved");
    }

    fn is_active(&self) -> bool {
        true
    }
}

pub struct ConsoleDetailView {
    console: Console,
}

impl TaskDetailView for ConsoleDetailView {
    fn set_loading_indicator(&self, _active: bool) {}

    fn show_missing_task(&self) {}

    fn show_title(&self, title: &str) {
        self.console.line(title);
    }

    fn hide_title(&self) {
        self.console.line("(untitled)");
    }

    fn show_description(&self, description: &str) {
        self.console.line(String::new());
        for line in description.lines() {
            self.console.line(format!("  {line}"));
        }
    }

    fn hide_description(&self) {}

    fn show_completion_status(&self, completed: bool) {
        self.console.line(format!(
            "Status: {}",
            if completed { "completed" } else { "active" }
        ));
    }

    fn show_edit_task(&self, task_id: &str) {
        self.console.line(format!("tasktab edit {task_id}"));
    }

    fn show_task_deleted(&self) {
        self.console.line("Task deleted");
    }

    fn show_task_marked_complete(&self) {
        self.console.line("Task marked complete");
    }

    fn show_task_marked_active(&self) {
        self.console.line("Task marked active");
    }

    fn is_active(&self) -> bool {
        true
    }
}

/// Holds the values the form was populated with, so omitted flags keep them.
#[derive(Default)]
pub struct ConsoleEditView {
    title: Mutex<String>,
    description: Mutex<String>,
}

impl ConsoleEditView {
    pub fn title(&self) -> String {
        self.title.lock().clone()
    }

    pub fn description(&self) -> String {
        self.description.lock().clone()
    }
}

impl AddEditTaskView for ConsoleEditView {
    fn show_empty_task_error(&self) {}

    fn show_tasks_list(&self) {}

    fn set_title(&self, title: &str) {
        *self.title.lock() = title.to_string();
    }

    fn set_description(&self, description: &str) {
        *self.description.lock() = description.to_string();
    }

    fn is_active(&self) -> bool {
        true
    }
}

/// A terminal has one pane at a time; the navigator just hands out console views.
pub struct ConsoleNavigator {
    console: Console,
    form: Mutex<Option<Arc<ConsoleEditView>>>,
}

impl ConsoleNavigator {
    pub fn new(console: Console) -> Arc<Self> {
        Arc::new(Self {
            console,
            form: Mutex::new(None),
        })
    }

    /// The most recently opened add/edit form.
    pub fn form(&self) -> Option<Arc<ConsoleEditView>> {
        self.form.lock().clone()
    }
}

impl PaneNavigator for ConsoleNavigator {
    fn add_detail_pane(&self, _task_id: &str) -> Arc<dyn TaskDetailView> {
        Arc::new(ConsoleDetailView {
            console: self.console.clone(),
        })
    }

    fn add_edit_pane(&self, _task_id: Option<&str>) -> Arc<dyn AddEditTaskView> {
        let form = Arc::new(ConsoleEditView::default());
        *self.form.lock() = Some(form.clone());
        form
    }

    fn remove_pane(&self) {}
}

fn task_line(task: &Task) -> String {
    format!(
        "[{}] {}  {}",
        if task.completed { "x" } else { " " },
        task.id,
        task.title_for_list()
    )
}

fn no_tasks_message(filter: TaskFilter) -> &'static str {
    match filter {
        TaskFilter::All => "No tasks",
        TaskFilter::Active => "No active tasks",
        TaskFilter::Completed => "No completed tasks",
    }
}
