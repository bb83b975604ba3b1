use std::sync::Arc;

use tasktab_core::model::{Fetched, Task};
use tasktab_core::TaskRepository;

use crate::error::{PresenterError, PresenterResult};
use crate::telemetry::{Event, Handle};
use crate::view::AddEditTaskView;

/// Form presenter for composing a new task or rewriting an existing one.
pub struct AddEditTaskPresenter {
    task_id: Option<String>,
    repo: Arc<TaskRepository>,
    view: Arc<dyn AddEditTaskView>,
    telemetry: Arc<Handle>,
    data_missing: bool,
}

impl AddEditTaskPresenter {
    /// `task_id` of `None` composes a new task.
    pub fn new(
        task_id: Option<String>,
        repo: Arc<TaskRepository>,
        view: Arc<dyn AddEditTaskView>,
        telemetry: Arc<Handle>,
    ) -> Self {
        Self {
            task_id,
            repo,
            view,
            telemetry,
            data_missing: true,
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn is_new_task(&self) -> bool {
        self.task_id.is_none()
    }

    /// True until an existing task has been loaded into the form.
    pub fn is_data_missing(&self) -> bool {
        self.data_missing
    }

    pub async fn start(&mut self) -> PresenterResult<()> {
        if !self.is_new_task() && self.data_missing {
            self.populate().await?;
        }
        Ok(())
    }

    pub async fn populate(&mut self) -> PresenterResult<()> {
        let Some(task_id) = self.task_id.clone() else {
            return Err(PresenterError::NoOpenTask);
        };

        let fetched = self.repo.get_task(&task_id).await;

        if !self.view.is_active() {
            self.telemetry.record(Event::StaleResultDropped("add_edit"));
            return Ok(());
        }
        match fetched {
            Fetched::Available(task) => {
                self.view.set_title(&task.title);
                self.view.set_description(&task.description);
                self.data_missing = false;
                Ok(())
            }
            Fetched::NotAvailable => {
                self.view.show_empty_task_error();
                Err(PresenterError::MissingTask(task_id))
            }
        }
    }

    /// Create or rewrite the task. A task with neither title nor description is refused.
    pub async fn save_task(&self, title: &str, description: &str) -> PresenterResult<Task> {
        let candidate = Task::with_id(
            self.task_id.clone().unwrap_or_default(),
            title,
            description,
        );
        if candidate.is_empty() {
            if self.view.is_active() {
                self.view.show_empty_task_error();
            }
            return Err(PresenterError::EmptyTask);
        }

        let saved = match &self.task_id {
            None => self.repo.create_task(title, description).await,
            Some(task_id) => self.repo.update_task(task_id, title, description).await,
        };
        match saved {
            Ok(task) => {
                self.telemetry.record(Event::MutationApplied(if self.is_new_task() {
                    "create"
                } else {
                    "update"
                }));
                if self.view.is_active() {
                    self.view.show_tasks_list();
                }
                Ok(task)
            }
            Err(err) => {
                tracing::warn!(task_id = ?self.task_id, error = %err, "saving task failed");
                self.telemetry.record(Event::MutationFailed {
                    action: "save",
                    error: err.to_string(),
                });
                Err(err.into())
            }
        }
    }
}
