use std::sync::Arc;

use tasktab_core::model::{Fetched, Task};
use tasktab_core::{RepositoryResult, TaskRepository};

use crate::error::{PresenterError, PresenterResult};
use crate::telemetry::{Event, Handle};
use crate::view::TaskDetailView;

/// Shows one task and forwards the intents available on it.
pub struct TaskDetailPresenter {
    task_id: Option<String>,
    repo: Arc<TaskRepository>,
    view: Arc<dyn TaskDetailView>,
    telemetry: Arc<Handle>,
}

impl TaskDetailPresenter {
    pub fn new(
        task_id: Option<String>,
        repo: Arc<TaskRepository>,
        view: Arc<dyn TaskDetailView>,
        telemetry: Arc<Handle>,
    ) -> Self {
        Self {
            task_id,
            repo,
            view,
            telemetry,
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub async fn start(&self) -> PresenterResult<()> {
        if !self.view.is_active() {
            return Ok(());
        }
        self.open_task().await
    }

    /// Load the task and render it. A task that no store knows about is shown as missing.
    pub async fn open_task(&self) -> PresenterResult<()> {
        let task_id = self.require_task_id()?;
        if self.view.is_active() {
            self.view.set_loading_indicator(true);
        }

        let fetched = self.repo.get_task(task_id).await;

        if !self.view.is_active() {
            self.telemetry.record(Event::StaleResultDropped("detail"));
            return Ok(());
        }
        self.view.set_loading_indicator(false);
        match fetched {
            Fetched::Available(task) => {
                self.show_task(&task);
                Ok(())
            }
            Fetched::NotAvailable => {
                self.view.show_missing_task();
                Err(PresenterError::MissingTask(task_id.to_string()))
            }
        }
    }

    pub fn edit_task(&self) -> PresenterResult<()> {
        let task_id = self.require_task_id()?;
        self.view.show_edit_task(task_id);
        Ok(())
    }

    pub async fn complete_task(&self) -> PresenterResult<()> {
        let task_id = self.require_task_id()?;
        let result = self.repo.complete_task(task_id).await;
        self.confirm("complete", result, |view| view.show_task_marked_complete())
    }

    pub async fn activate_task(&self) -> PresenterResult<()> {
        let task_id = self.require_task_id()?;
        let result = self.repo.activate_task(task_id).await;
        self.confirm("activate", result, |view| view.show_task_marked_active())
    }

    pub async fn delete_task(&self) -> PresenterResult<()> {
        let task_id = self.require_task_id()?;
        let result = self.repo.delete_task(task_id).await;
        self.confirm("delete", result, |view| view.show_task_deleted())
    }

    fn require_task_id(&self) -> PresenterResult<&str> {
        match self.task_id.as_deref() {
            Some(task_id) if !task_id.trim().is_empty() => Ok(task_id),
            other => {
                if self.view.is_active() {
                    self.view.show_missing_task();
                }
                Err(PresenterError::MissingTask(
                    other.unwrap_or_default().to_string(),
                ))
            }
        }
    }

    fn confirm<F>(
        &self,
        action: &'static str,
        result: RepositoryResult<()>,
        show: F,
    ) -> PresenterResult<()>
    where
        F: FnOnce(&dyn TaskDetailView),
    {
        match result {
            Ok(()) => {
                self.telemetry.record(Event::MutationApplied(action));
                if self.view.is_active() {
                    show(self.view.as_ref());
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    action,
                    task_id = ?self.task_id,
                    error = %err,
                    "task detail mutation failed"
                );
                self.telemetry.record(Event::MutationFailed {
                    action,
                    error: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    fn show_task(&self, task: &Task) {
        if task.title.is_empty() {
            self.view.hide_title();
        } else {
            self.view.show_title(&task.title);
        }
        if task.description.is_empty() {
            self.view.hide_description();
        } else {
            self.view.show_description(&task.description);
        }
        self.view.show_completion_status(task.completed);
    }
}
