//! Store doubles for exercising the repository and anything built on it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::{SourceError, SourceResult};
use crate::model::{Fetched, Task};
use crate::source::{RemoteDataSource, TasksDataSource};

/// Wraps another store, counting reads and optionally holding them until released.
///
/// A held read has already taken its value from the wrapped store; only its completion waits.
pub struct ScriptedSource {
    inner: Arc<dyn TasksDataSource>,
    label: &'static str,
    gate: watch::Sender<bool>,
    task_gate: watch::Sender<bool>,
    get_tasks_calls: AtomicUsize,
    get_task_calls: AtomicUsize,
    fail_writes: AtomicBool,
}

impl ScriptedSource {
    pub fn new(label: &'static str, inner: Arc<dyn TasksDataSource>) -> Arc<Self> {
        let (gate, _) = watch::channel(true);
        let (task_gate, _) = watch::channel(true);
        Arc::new(Self {
            inner,
            label,
            gate,
            task_gate,
            get_tasks_calls: AtomicUsize::new(0),
            get_task_calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        })
    }

    /// An instant in-memory store wrapped for scripting.
    pub fn in_memory(label: &'static str) -> (Arc<Self>, Arc<RemoteDataSource>) {
        let store = Arc::new(RemoteDataSource::in_memory(Duration::ZERO));
        (Self::new(label, store.clone()), store)
    }

    /// Reads issued from now on wait until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.send_replace(false);
        self.task_gate.send_replace(false);
    }

    /// Like [`hold`](Self::hold), but only for single-task reads.
    pub fn hold_task_reads(&self) {
        self.task_gate.send_replace(false);
    }

    pub fn release(&self) {
        self.gate.send_replace(true);
        self.task_gate.send_replace(true);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get_tasks_calls(&self) -> usize {
        self.get_tasks_calls.load(Ordering::SeqCst)
    }

    pub fn get_task_calls(&self) -> usize {
        self.get_task_calls.load(Ordering::SeqCst)
    }

    async fn pass(gate: &watch::Sender<bool>) {
        let mut open = gate.subscribe();
        let _ = open.wait_for(|open| *open).await;
    }

    fn check_write(&self) -> SourceResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SourceError::Open(format!("{} store is read-only", self.label)));
        }
        Ok(())
    }
}

#[async_trait]
impl TasksDataSource for ScriptedSource {
    async fn get_tasks(&self) -> SourceResult<Fetched<Vec<Task>>> {
        self.get_tasks_calls.fetch_add(1, Ordering::SeqCst);
        let fetched = self.inner.get_tasks().await;
        Self::pass(&self.gate).await;
        fetched
    }

    async fn get_task(&self, task_id: &str) -> SourceResult<Fetched<Task>> {
        let fetched = self.inner.get_task(task_id).await;
        self.get_task_calls.fetch_add(1, Ordering::SeqCst);
        Self::pass(&self.task_gate).await;
        fetched
    }

    async fn save_task(&self, task: &Task) -> SourceResult<()> {
        self.check_write()?;
        self.inner.save_task(task).await
    }

    async fn save_tasks(&self, tasks: &[Task]) -> SourceResult<()> {
        self.check_write()?;
        self.inner.save_tasks(tasks).await
    }

    async fn complete_task(&self, task_id: &str) -> SourceResult<()> {
        self.check_write()?;
        self.inner.complete_task(task_id).await
    }

    async fn activate_task(&self, task_id: &str) -> SourceResult<()> {
        self.check_write()?;
        self.inner.activate_task(task_id).await
    }

    async fn clear_completed_tasks(&self) -> SourceResult<()> {
        self.check_write()?;
        self.inner.clear_completed_tasks().await
    }

    async fn delete_task(&self, task_id: &str) -> SourceResult<()> {
        self.check_write()?;
        self.inner.delete_task(task_id).await
    }

    async fn delete_all_tasks(&self) -> SourceResult<()> {
        self.check_write()?;
        self.inner.delete_all_tasks().await
    }

    fn name(&self) -> &'static str {
        self.label
    }
}
