//! Recording views, a recording navigator and a scripted store fixture for presenter tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tasktab_core::model::{Task, TaskFilter};
use tasktab_core::testing::ScriptedSource;
use tasktab_core::{RemoteDataSource, TaskRepository};

use crate::telemetry::Handle;
use crate::view::{AddEditTaskView, PaneNavigator, TaskDetailView, TasksView};

pub(crate) struct Stores {
    pub repo: Arc<TaskRepository>,
    pub local: Arc<ScriptedSource>,
    pub local_store: Arc<RemoteDataSource>,
    pub remote: Arc<ScriptedSource>,
    pub remote_store: Arc<RemoteDataSource>,
    pub telemetry: Arc<Handle>,
}

impl Stores {
    pub fn new() -> Self {
        let (local, local_store) = ScriptedSource::in_memory("local");
        let (remote, remote_store) = ScriptedSource::in_memory("remote");
        let repo = Arc::new(TaskRepository::new(local.clone(), remote.clone()));
        Self {
            repo,
            local,
            local_store,
            remote,
            remote_store,
            telemetry: Arc::new(Handle::new()),
        }
    }

    /// Put a task in the local store behind the repository's back.
    pub fn seed_local(&self, task: Task) -> Task {
        self.local_store.seed([task.clone()]);
        task
    }

    pub fn seed_remote(&self, task: Task) -> Task {
        self.remote_store.seed([task.clone()]);
        task
    }
}

struct Recorder<E> {
    events: Mutex<Vec<E>>,
    active: AtomicBool,
}

impl<E> Recorder<E> {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            active: AtomicBool::new(true),
        }
    }

    fn push(&self, event: E) {
        self.events.lock().push(event);
    }

    fn take(&self) -> Vec<E> {
        std::mem::take(&mut *self.events.lock())
    }

    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListEvent {
    Loading(bool),
    Tasks(Vec<String>),
    NoTasks(TaskFilter),
    LoadingError,
    FilterLabel(TaskFilter),
    AddTask,
    Details(String),
    MarkedComplete,
    MarkedActive,
    Deleted,
    CompletedCleared,
    Saved,
}

pub(crate) struct RecordingTasksView(Recorder<ListEvent>);

impl RecordingTasksView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Recorder::new()))
    }

    pub fn take(&self) -> Vec<ListEvent> {
        self.0.take()
    }

    pub fn set_active(&self, active: bool) {
        self.0.set_active(active);
    }
}

impl TasksView for RecordingTasksView {
    fn set_loading_indicator(&self, active: bool) {
        self.0.push(ListEvent::Loading(active));
    }

    fn show_tasks(&self, tasks: &[Task]) {
        self.0
            .push(ListEvent::Tasks(tasks.iter().map(|task| task.id.clone()).collect()));
    }

    fn show_no_tasks(&self, filter: TaskFilter) {
        self.0.push(ListEvent::NoTasks(filter));
    }

    fn show_loading_tasks_error(&self) {
        self.0.push(ListEvent::LoadingError);
    }

    fn show_filter_label(&self, filter: TaskFilter) {
        self.0.push(ListEvent::FilterLabel(filter));
    }

    fn show_add_task(&self) {
        self.0.push(ListEvent::AddTask);
    }

    fn show_task_details(&self, task_id: &str) {
        self.0.push(ListEvent::Details(task_id.to_string()));
    }

    fn show_task_marked_complete(&self) {
        self.0.push(ListEvent::MarkedComplete);
    }

    fn show_task_marked_active(&self) {
        self.0.push(ListEvent::MarkedActive);
    }

    fn show_task_deleted(&self) {
        self.0.push(ListEvent::Deleted);
    }

    fn show_completed_tasks_cleared(&self) {
        self.0.push(ListEvent::CompletedCleared);
    }

    fn show_successfully_saved_message(&self) {
        self.0.push(ListEvent::Saved);
    }

    fn is_active(&self) -> bool {
        self.0.is_active()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DetailEvent {
    Loading(bool),
    Missing,
    Title(String),
    TitleHidden,
    Description(String),
    DescriptionHidden,
    Completed(bool),
    Edit(String),
    Deleted,
    MarkedComplete,
    MarkedActive,
}

pub(crate) struct RecordingDetailView(Recorder<DetailEvent>);

impl RecordingDetailView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Recorder::new()))
    }

    pub fn take(&self) -> Vec<DetailEvent> {
        self.0.take()
    }

    pub fn set_active(&self, active: bool) {
        self.0.set_active(active);
    }

    pub fn is_attached(&self) -> bool {
        self.0.is_active()
    }
}

impl TaskDetailView for RecordingDetailView {
    fn set_loading_indicator(&self, active: bool) {
        self.0.push(DetailEvent::Loading(active));
    }

    fn show_missing_task(&self) {
        self.0.push(DetailEvent::Missing);
    }

    fn show_title(&self, title: &str) {
        self.0.push(DetailEvent::Title(title.to_string()));
    }

    fn hide_title(&self) {
        self.0.push(DetailEvent::TitleHidden);
    }

    fn show_description(&self, description: &str) {
        self.0.push(DetailEvent::Description(description.to_string()));
    }

    fn hide_description(&self) {
        self.0.push(DetailEvent::DescriptionHidden);
    }

    fn show_completion_status(&self, completed: bool) {
        self.0.push(DetailEvent::Completed(completed));
    }

    fn show_edit_task(&self, task_id: &str) {
        self.0.push(DetailEvent::Edit(task_id.to_string()));
    }

    fn show_task_deleted(&self) {
        self.0.push(DetailEvent::Deleted);
    }

    fn show_task_marked_complete(&self) {
        self.0.push(DetailEvent::MarkedComplete);
    }

    fn show_task_marked_active(&self) {
        self.0.push(DetailEvent::MarkedActive);
    }

    fn is_active(&self) -> bool {
        self.0.is_active()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EditEvent {
    EmptyTaskError,
    TasksList,
    Title(String),
    Description(String),
}

pub(crate) struct RecordingEditView(Recorder<EditEvent>);

impl RecordingEditView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(Recorder::new()))
    }

    pub fn take(&self) -> Vec<EditEvent> {
        self.0.take()
    }

    pub fn set_active(&self, active: bool) {
        self.0.set_active(active);
    }
}

impl AddEditTaskView for RecordingEditView {
    fn show_empty_task_error(&self) {
        self.0.push(EditEvent::EmptyTaskError);
    }

    fn show_tasks_list(&self) {
        self.0.push(EditEvent::TasksList);
    }

    fn set_title(&self, title: &str) {
        self.0.push(EditEvent::Title(title.to_string()));
    }

    fn set_description(&self, description: &str) {
        self.0.push(EditEvent::Description(description.to_string()));
    }

    fn is_active(&self) -> bool {
        self.0.is_active()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NavEvent {
    Detail(String),
    Edit(Option<String>),
    Removed,
}

/// Hands out recording pane views. Replacing or removing a pane detaches its view.
#[derive(Default)]
pub(crate) struct RecordingNavigator {
    log: Mutex<Vec<NavEvent>>,
    details: Mutex<Vec<Arc<RecordingDetailView>>>,
    edits: Mutex<Vec<Arc<RecordingEditView>>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn take(&self) -> Vec<NavEvent> {
        std::mem::take(&mut *self.log.lock())
    }

    pub fn last_detail(&self) -> Option<Arc<RecordingDetailView>> {
        self.details.lock().last().cloned()
    }

    pub fn last_edit(&self) -> Option<Arc<RecordingEditView>> {
        self.edits.lock().last().cloned()
    }

    fn detach_all(&self) {
        for view in self.details.lock().iter() {
            view.set_active(false);
        }
        for view in self.edits.lock().iter() {
            view.set_active(false);
        }
    }
}

impl PaneNavigator for RecordingNavigator {
    fn add_detail_pane(&self, task_id: &str) -> Arc<dyn TaskDetailView> {
        self.detach_all();
        self.log.lock().push(NavEvent::Detail(task_id.to_string()));
        let view = RecordingDetailView::new();
        self.details.lock().push(view.clone());
        view
    }

    fn add_edit_pane(&self, task_id: Option<&str>) -> Arc<dyn AddEditTaskView> {
        self.detach_all();
        self.log
            .lock()
            .push(NavEvent::Edit(task_id.map(str::to_string)));
        let view = RecordingEditView::new();
        self.edits.lock().push(view.clone());
        view
    }

    fn remove_pane(&self) {
        self.detach_all();
        self.log.lock().push(NavEvent::Removed);
    }
}
