//! Capabilities the presenters drive. Implemented by whatever renders the screen.
//!
//! Every view exposes `is_active`. Presenters check it after each store round-trip and drop
//! results for views that went away in the meantime.

use std::sync::Arc;

use tasktab_core::model::{Task, TaskFilter};

pub trait TasksView: Send + Sync {
    fn set_loading_indicator(&self, active: bool);

    fn show_tasks(&self, tasks: &[Task]);

    /// The filtered list is empty.
    fn show_no_tasks(&self, filter: TaskFilter);

    /// Neither store had any tasks to offer.
    fn show_loading_tasks_error(&self);

    fn show_filter_label(&self, filter: TaskFilter);

    fn show_add_task(&self);

    fn show_task_details(&self, task_id: &str);

    fn show_task_marked_complete(&self);

    fn show_task_marked_active(&self);

    fn show_task_deleted(&self);

    fn show_completed_tasks_cleared(&self);

    fn show_successfully_saved_message(&self);

    fn is_active(&self) -> bool;
}

pub trait TaskDetailView: Send + Sync {
    fn set_loading_indicator(&self, active: bool);

    fn show_missing_task(&self);

    fn show_title(&self, title: &str);

    fn hide_title(&self);

    fn show_description(&self, description: &str);

    fn hide_description(&self);

    fn show_completion_status(&self, completed: bool);

    fn show_edit_task(&self, task_id: &str);

    fn show_task_deleted(&self);

    fn show_task_marked_complete(&self);

    fn show_task_marked_active(&self);

    fn is_active(&self) -> bool;
}

pub trait AddEditTaskView: Send + Sync {
    fn show_empty_task_error(&self);

    fn show_tasks_list(&self);

    fn set_title(&self, title: &str);

    fn set_description(&self, description: &str);

    fn is_active(&self) -> bool;
}

/// Opens and closes the secondary pane next to the task list.
///
/// Adding a pane replaces whichever secondary pane is showing.
pub trait PaneNavigator: Send + Sync {
    fn add_detail_pane(&self, task_id: &str) -> Arc<dyn TaskDetailView>;

    /// `None` opens an empty form for a new task.
    fn add_edit_pane(&self, task_id: Option<&str>) -> Arc<dyn AddEditTaskView>;

    fn remove_pane(&self);
}
