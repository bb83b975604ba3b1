//! Wide-layout coordination: the task list plus at most one secondary pane.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tasktab_core::model::{Fetched, Task, TaskFilter};
use tasktab_core::TaskRepository;
use tracing::debug;

use crate::add_edit::AddEditTaskPresenter;
use crate::detail::TaskDetailPresenter;
use crate::error::{require_task_id, PresenterError, PresenterResult};
use crate::tasks::TasksPresenter;
use crate::telemetry::{Event, Handle};
use crate::view::{PaneNavigator, TasksView};


/// What the secondary pane is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaneState {
    Closed,
    DetailOpen(String),
    EditOpen(String),
    /// Composing a task that has no id yet.
    AddOpen,
}

impl fmt::Display for PaneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaneState::Closed => write!(f, "closed"),
            PaneState::DetailOpen(id) => write!(f, "detail({id})"),
            PaneState::EditOpen(id) => write!(f, "edit({id})"),
            PaneState::AddOpen => write!(f, "add"),
        }
    }
}

/// Everything needed to rebuild a coordinator after its screen is recreated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneSnapshot {
    #[serde(default)]
    pub filter: TaskFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_task_id: Option<String>,
}

// The presenter lives inside the variant, so a pane and its presenter can't disagree.
enum Pane {
    Closed,
    Detail(TaskDetailPresenter),
    Edit(AddEditTaskPresenter),
}

impl Pane {
    fn state(&self) -> PaneState {
        match self {
            Pane::Closed => PaneState::Closed,
            Pane::Detail(detail) => {
                PaneState::DetailOpen(detail.task_id().unwrap_or_default().to_string())
            }
            Pane::Edit(edit) => match edit.task_id() {
                Some(task_id) => PaneState::EditOpen(task_id.to_string()),
                None => PaneState::AddOpen,
            },
        }
    }

    fn task_id(&self) -> Option<&str> {
        match self {
            Pane::Closed => None,
            Pane::Detail(detail) => detail.task_id(),
            Pane::Edit(edit) => edit.task_id(),
        }
    }
}

pub struct TabletCoordinator {
    repo: Arc<TaskRepository>,
    tasks: TasksPresenter,
    navigator: Arc<dyn PaneNavigator>,
    telemetry: Arc<Handle>,
    pane: Pane,
}

impl TabletCoordinator {
    pub fn new(
        repo: Arc<TaskRepository>,
        list_view: Arc<dyn TasksView>,
        navigator: Arc<dyn PaneNavigator>,
        telemetry: Arc<Handle>,
    ) -> Self {
        let mut tasks = TasksPresenter::new(repo.clone(), list_view, telemetry.clone());
        tasks.force_reload_after_mutations();
        Self {
            repo,
            tasks,
            navigator,
            telemetry,
            pane: Pane::Closed,
        }
    }

    pub fn tasks(&self) -> &TasksPresenter {
        &self.tasks
    }

    pub fn pane_state(&self) -> PaneState {
        self.pane.state()
    }

    /// Id of the task shown in the detail or edit pane.
    pub fn open_task_id(&self) -> Option<&str> {
        self.pane.task_id()
    }

    pub async fn start(&mut self) {
        self.tasks.start().await;
    }

    pub async fn set_filter(&mut self, filter: TaskFilter) {
        self.tasks.set_filter(filter).await;
    }

    pub async fn open_task_details(&mut self, task_id: &str) -> PresenterResult<()> {
        let task_id = require_task_id(task_id)?;
        self.show_detail(task_id).await
    }

    pub async fn add_new_task(&mut self) -> PresenterResult<()> {
        self.show_edit(None).await
    }

    /// Switch the open detail pane to editing the same task.
    pub async fn edit_task(&mut self) -> PresenterResult<()> {
        let task_id = match &self.pane {
            Pane::Detail(detail) => detail.task_id().map(str::to_string),
            _ => None,
        }
        .ok_or(PresenterError::NoOpenTask)?;
        self.show_edit(Some(&task_id)).await
    }

    /// Save the edit pane. Editing returns to the task's detail, adding closes the pane.
    pub async fn save_task(&mut self, title: &str, description: &str) -> PresenterResult<Task> {
        let Pane::Edit(edit) = &self.pane else {
            return Err(PresenterError::NoOpenTask);
        };
        let task = edit.save_task(title, description).await?;
        let was_new = edit.is_new_task();

        self.tasks.on_task_saved().await;
        if was_new {
            self.close_pane();
        } else {
            self.show_detail(&task.id).await?;
        }
        Ok(task)
    }

    pub async fn cancel_edit(&mut self) -> PresenterResult<()> {
        let reopen = match &self.pane {
            Pane::Edit(edit) => edit.task_id().map(str::to_string),
            _ => return Err(PresenterError::NoOpenTask),
        };
        match reopen {
            Some(task_id) => self.show_detail(&task_id).await,
            None => {
                self.close_pane();
                Ok(())
            }
        }
    }

    pub fn close_pane(&mut self) {
        if matches!(self.pane, Pane::Closed) {
            return;
        }
        self.navigator.remove_pane();
        self.transition(Pane::Closed);
    }

    pub async fn complete_open_task(&mut self) -> PresenterResult<()> {
        self.apply_to_open_task(OpenTaskIntent::Complete).await
    }

    pub async fn activate_open_task(&mut self) -> PresenterResult<()> {
        self.apply_to_open_task(OpenTaskIntent::Activate).await
    }

    pub async fn delete_open_task(&mut self) -> PresenterResult<()> {
        self.apply_to_open_task(OpenTaskIntent::Delete).await
    }

    pub async fn complete_task(&mut self, task_id: &str) -> PresenterResult<()> {
        let result = self.tasks.complete_task(task_id).await;
        self.sync_open_pane(task_id, false).await;
        result
    }

    pub async fn activate_task(&mut self, task_id: &str) -> PresenterResult<()> {
        let result = self.tasks.activate_task(task_id).await;
        self.sync_open_pane(task_id, false).await;
        result
    }

    pub async fn delete_task(&mut self, task_id: &str) -> PresenterResult<()> {
        let result = self.tasks.delete_task(task_id).await;
        self.sync_open_pane(task_id, result.is_ok()).await;
        result
    }

    /// Clear completed tasks, closing the pane if its task was among them.
    pub async fn clear_completed_tasks(&mut self) -> PresenterResult<()> {
        // The clear may remove the very task the pane shows, so capture the id first.
        let open_task_id = self.pane.task_id().map(str::to_string);
        let result = self.tasks.clear_completed_tasks().await;

        if let Some(task_id) = open_task_id {
            if let Fetched::NotAvailable = self.repo.get_task_forced(&task_id).await {
                debug!(task_id = task_id.as_str(), "open task was cleared");
                self.close_pane();
            }
        }
        result
    }

    pub fn snapshot(&self) -> PaneSnapshot {
        let (detail_task_id, edit_task_id) = match &self.pane {
            Pane::Closed => (None, None),
            Pane::Detail(detail) => (detail.task_id().map(str::to_string), None),
            Pane::Edit(edit) => (None, edit.task_id().map(str::to_string)),
        };
        PaneSnapshot {
            filter: self.tasks.filter(),
            detail_task_id,
            edit_task_id,
        }
    }

    /// Reopen what a snapshot describes. Call before [`start`](Self::start).
    pub async fn restore(&mut self, snapshot: PaneSnapshot) -> PresenterResult<()> {
        self.tasks.use_filter(snapshot.filter);
        match (snapshot.edit_task_id, snapshot.detail_task_id) {
            (Some(task_id), _) => {
                let task_id = require_task_id(&task_id)?;
                self.show_edit(Some(task_id)).await
            }
            (None, Some(task_id)) => self.open_task_details(&task_id).await,
            (None, None) => {
                self.close_pane();
                Ok(())
            }
        }
    }

    async fn show_detail(&mut self, task_id: &str) -> PresenterResult<()> {
        let view = self.navigator.add_detail_pane(task_id);
        let detail = TaskDetailPresenter::new(
            Some(task_id.to_string()),
            self.repo.clone(),
            view,
            self.telemetry.clone(),
        );
        let started = detail.start().await;
        self.transition(Pane::Detail(detail));
        started
    }

    async fn show_edit(&mut self, task_id: Option<&str>) -> PresenterResult<()> {
        let view = self.navigator.add_edit_pane(task_id);
        let mut edit = AddEditTaskPresenter::new(
            task_id.map(str::to_string),
            self.repo.clone(),
            view,
            self.telemetry.clone(),
        );
        let started = edit.start().await;
        self.transition(Pane::Edit(edit));
        started
    }

    async fn apply_to_open_task(&mut self, intent: OpenTaskIntent) -> PresenterResult<()> {
        let Pane::Detail(detail) = &self.pane else {
            return Err(PresenterError::NoOpenTask);
        };
        let result = match intent {
            OpenTaskIntent::Complete => detail.complete_task().await,
            OpenTaskIntent::Activate => detail.activate_task().await,
            OpenTaskIntent::Delete => detail.delete_task().await,
        };
        self.tasks.load_tasks(true).await;
        result?;

        if intent == OpenTaskIntent::Delete {
            self.close_pane();
            Ok(())
        } else {
            self.reload_pane().await
        }
    }

    /// Keep the open pane in step with a list-level mutation of `task_id`.
    async fn sync_open_pane(&mut self, task_id: &str, removed: bool) {
        if self.pane.task_id() != Some(task_id) {
            return;
        }
        if removed {
            self.close_pane();
        } else if let Err(err) = self.reload_pane().await {
            debug!(task_id, error = %err, "open pane could not be reloaded");
        }
    }

    async fn reload_pane(&mut self) -> PresenterResult<()> {
        match &mut self.pane {
            Pane::Closed => Ok(()),
            Pane::Detail(detail) => detail.open_task().await,
            Pane::Edit(edit) if !edit.is_new_task() => edit.populate().await,
            Pane::Edit(_) => Ok(()),
        }
    }

    fn transition(&mut self, next: Pane) {
        let from = self.pane.state();
        self.pane = next;
        let to = self.pane.state();
        if from != to {
            debug!(from = %from, to = %to, "secondary pane changed");
            self.telemetry.record(Event::PaneChanged {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenTaskIntent {
    Complete,
    Activate,
    Delete,
}
