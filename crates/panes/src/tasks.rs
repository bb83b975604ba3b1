//! Presenter for the master task list.

use std::sync::Arc;

use tasktab_core::model::{Fetched, TaskFilter};
use tasktab_core::{RepositoryResult, TaskRepository};

use crate::error::{require_task_id, PresenterResult};
use crate::telemetry::{Event, Handle};
use crate::view::TasksView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    Idle,
    Loading,
    Loaded,
    Empty,
    NotAvailable,
}

/// Drives a [`TasksView`]. Every mutation goes through the repository and is followed by a
/// fresh read, so the view only ever shows what the repository holds.
pub struct TasksPresenter {
    repo: Arc<TaskRepository>,
    view: Arc<dyn TasksView>,
    telemetry: Arc<Handle>,
    filter: TaskFilter,
    state: ListState,
    first_load: bool,
    force_after_mutation: bool,
}

impl TasksPresenter {
    pub fn new(
        repo: Arc<TaskRepository>,
        view: Arc<dyn TasksView>,
        telemetry: Arc<Handle>,
    ) -> Self {
        Self {
            repo,
            view,
            telemetry,
            filter: TaskFilter::All,
            state: ListState::Idle,
            first_load: true,
            force_after_mutation: false,
        }
    }

    /// Reloads following a mutation bypass the repository cache. Used when another pane
    /// shares the screen and may have written through the same repository.
    pub fn force_reload_after_mutations(&mut self) {
        self.force_after_mutation = true;
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    pub fn filter(&self) -> TaskFilter {
        self.filter
    }

    pub async fn start(&mut self) {
        if self.view.is_active() {
            self.load_tasks(false).await;
        }
    }

    /// Load and show the list. The very first load always invalidates the repository cache.
    pub async fn load_tasks(&mut self, force_update: bool) {
        let forced = force_update || self.first_load;
        self.first_load = false;
        self.load(forced, true).await;
    }

    /// Select a filter without reloading, for restoring a screen before it starts.
    pub fn use_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
    }

    pub async fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.load_tasks(false).await;
    }

    pub fn add_new_task(&self) {
        self.view.show_add_task();
    }

    pub fn open_task_details(&self, task_id: &str) -> PresenterResult<()> {
        let task_id = require_task_id(task_id)?;
        self.view.show_task_details(task_id);
        Ok(())
    }

    pub async fn complete_task(&mut self, task_id: &str) -> PresenterResult<()> {
        let task_id = require_task_id(task_id)?;
        let result = self.repo.complete_task(task_id).await;
        self.after_mutation("complete", result, |view| view.show_task_marked_complete())
            .await
    }

    pub async fn activate_task(&mut self, task_id: &str) -> PresenterResult<()> {
        let task_id = require_task_id(task_id)?;
        let result = self.repo.activate_task(task_id).await;
        self.after_mutation("activate", result, |view| view.show_task_marked_active())
            .await
    }

    pub async fn delete_task(&mut self, task_id: &str) -> PresenterResult<()> {
        let task_id = require_task_id(task_id)?;
        let result = self.repo.delete_task(task_id).await;
        self.after_mutation("delete", result, |view| view.show_task_deleted())
            .await
    }

    pub async fn clear_completed_tasks(&mut self) -> PresenterResult<()> {
        let result = self.repo.clear_completed_tasks().await;
        self.after_mutation("clear completed", result, |view| {
            view.show_completed_tasks_cleared()
        })
        .await
    }

    /// Called when an add/edit flow reports that it saved a task.
    pub async fn on_task_saved(&mut self) {
        if self.view.is_active() {
            self.view.show_successfully_saved_message();
        }
        self.load(self.force_after_mutation, false).await;
    }

    async fn after_mutation<F>(
        &mut self,
        action: &'static str,
        result: RepositoryResult<()>,
        confirm: F,
    ) -> PresenterResult<()>
    where
        F: FnOnce(&dyn TasksView),
    {
        let outcome = match result {
            Ok(()) => {
                self.telemetry.record(Event::MutationApplied(action));
                if self.view.is_active() {
                    confirm(self.view.as_ref());
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(action, error = %err, "task list mutation failed");
                self.telemetry.record(Event::MutationFailed {
                    action,
                    error: err.to_string(),
                });
                Err(err.into())
            }
        };
        self.load(self.force_after_mutation, false).await;
        outcome
    }

    async fn load(&mut self, force_update: bool, show_loading_ui: bool) {
        self.telemetry.record(Event::ListRefreshRequested {
            filter: self.filter,
            forced: force_update,
        });
        if show_loading_ui && self.view.is_active() {
            self.view.set_loading_indicator(true);
            self.state = ListState::Loading;
        }
        let fetched = if force_update {
            self.repo.get_tasks_forced().await
        } else {
            self.repo.get_tasks().await
        };

        if !self.view.is_active() {
            self.telemetry.record(Event::StaleResultDropped("tasks"));
            return;
        }
        if show_loading_ui {
            self.view.set_loading_indicator(false);
        }

        match fetched {
            Fetched::Available(tasks) => {
                let visible = self.filter.apply(&tasks);
                self.telemetry.record(Event::ListLoaded {
                    filter: self.filter,
                    count: visible.len(),
                });
                if visible.is_empty() {
                    self.view.show_no_tasks(self.filter);
                    self.state = ListState::Empty;
                } else {
                    self.view.show_tasks(&visible);
                    self.state = ListState::Loaded;
                }
                self.view.show_filter_label(self.filter);
            }
            Fetched::NotAvailable => {
                self.telemetry.record(Event::ListUnavailable(self.filter));
                self.view.show_loading_tasks_error();
                self.state = ListState::NotAvailable;
            }
        }
    }
}
