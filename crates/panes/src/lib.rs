//! Screen logic for tasktab: presenters that drive view capabilities from a shared
//! [`TaskRepository`](tasktab_core::TaskRepository), and the coordinator for wide layouts.

pub mod add_edit;
pub mod detail;
pub mod error;
pub mod tablet;
pub mod tasks;
pub mod telemetry;
pub mod view;

#[cfg(test)]
mod test_support;

pub use add_edit::AddEditTaskPresenter;
pub use detail::TaskDetailPresenter;
pub use error::{PresenterError, PresenterResult};
pub use tablet::{PaneSnapshot, PaneState, TabletCoordinator};
pub use tasks::{ListState, TasksPresenter};
pub use view::{AddEditTaskView, PaneNavigator, TaskDetailView, TasksView};
