use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::{RepositoryError, RepositoryResult, SourceResult};
use crate::model::{Fetched, Task};
use crate::source::{LocalDataSource, RemoteDataSource, TasksDataSource};

/// Single entry point for task data. Reconciles an in-memory cache with a local and a remote
/// store.
///
/// Reads are served from the cache while it is valid. Otherwise the local store is asked first
/// and the remote only when the local store has nothing; remote results are written through to
/// the local store. Local is assumed to be kept in sync with remote by something outside this
/// type, so a local hit never consults the remote.
///
/// One instance is meant to be shared (via `Arc`) by every screen of a process.
pub struct TaskRepository {
    local: Arc<dyn TasksDataSource>,
    remote: Arc<dyn TasksDataSource>,
    cache: Mutex<TaskCache>,
    // Held by cache rebuilds, single-task store reads and writes, so none of them race a
    // write and callers arriving during a rebuild share its result.
    sync_gate: tokio::sync::Mutex<()>,
}

#[derive(Debug)]
struct TaskCache {
    tasks: BTreeMap<String, Task>,
    dirty: bool,
    // Bumped by every rebuild and write.
    epoch: u64,
    last: GateOutcome,
    // Bumped by `refresh_tasks`; a rebuild that overlaps a refresh must not mark the cache valid.
    invalidations: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateOutcome {
    Loaded,
    Missed,
    Wrote,
}

impl TaskCache {
    fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            dirty: true,
            epoch: 0,
            last: GateOutcome::Wrote,
            invalidations: 0,
        }
    }

    fn snapshot(&self) -> Vec<Task> {
        self.tasks.values().cloned().collect()
    }

    fn invalidate(&mut self) {
        self.dirty = true;
        self.invalidations += 1;
    }

    fn record(&mut self, outcome: GateOutcome) {
        self.epoch += 1;
        self.last = outcome;
    }
}

impl TaskRepository {
    pub fn new(local: Arc<dyn TasksDataSource>, remote: Arc<dyn TasksDataSource>) -> Self {
        Self {
            local,
            remote,
            cache: Mutex::new(TaskCache::new()),
            sync_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Build a repository over the SQLite store and the snapshot-backed remote in `config`.
    pub fn open(config: &AppConfig) -> SourceResult<Self> {
        let local = LocalDataSource::open(config)?;
        let remote = RemoteDataSource::open(config)?;
        Ok(Self::new(Arc::new(local), Arc::new(remote)))
    }

    pub fn is_cache_valid(&self) -> bool {
        !self.cache.lock().dirty
    }

    /// All tasks in id order, or `NotAvailable` when neither store has any.
    pub async fn get_tasks(&self) -> Fetched<Vec<Task>> {
        let seen = {
            let cache = self.cache.lock();
            if !cache.dirty {
                return Fetched::Available(cache.snapshot());
            }
            cache.epoch
        };

        let _gate = self.sync_gate.lock().await;
        let invalidations = {
            let cache = self.cache.lock();
            if !cache.dirty {
                debug!("task list served by a rebuild that finished while waiting");
                return Fetched::Available(cache.snapshot());
            }
            if cache.epoch != seen && cache.last == GateOutcome::Missed {
                return Fetched::NotAvailable;
            }
            cache.invalidations
        };

        let outcome = self.load_from_sources().await;

        let mut cache = self.cache.lock();
        match outcome {
            Fetched::Available(tasks) => {
                cache.tasks = tasks
                    .into_iter()
                    .map(|task| (task.id.clone(), task))
                    .collect();
                if cache.invalidations == invalidations {
                    cache.dirty = false;
                }
                cache.record(GateOutcome::Loaded);
                debug!(count = cache.tasks.len(), "task cache rebuilt");
                Fetched::Available(cache.snapshot())
            }
            Fetched::NotAvailable => {
                cache.record(GateOutcome::Missed);
                Fetched::NotAvailable
            }
        }
    }

    /// Equivalent to [`refresh_tasks`](Self::refresh_tasks) followed by
    /// [`get_tasks`](Self::get_tasks).
    pub async fn get_tasks_forced(&self) -> Fetched<Vec<Task>> {
        self.refresh_tasks().await;
        self.get_tasks().await
    }

    pub async fn get_task(&self, task_id: &str) -> Fetched<Task> {
        if let Some(task) = self.cached_task(task_id) {
            return Fetched::Available(task);
        }

        let _gate = self.sync_gate.lock().await;
        if let Some(task) = self.cached_task(task_id) {
            return Fetched::Available(task);
        }
        self.load_task(task_id).await
    }

    /// Read one task from the stores, bypassing the cache, and bring its cache entry in line
    /// with the result. A task the stores no longer have is dropped from the cache.
    pub async fn get_task_forced(&self, task_id: &str) -> Fetched<Task> {
        let _gate = self.sync_gate.lock().await;
        let fetched = self.load_task(task_id).await;
        if !fetched.is_available() && self.cache.lock().tasks.remove(task_id).is_some() {
            debug!(task_id, "vanished task dropped from cache");
        }
        fetched
    }

    pub async fn save_task(&self, task: Task) -> RepositoryResult<()> {
        let _gate = self.sync_gate.lock().await;
        let local = self.local.save_task(&task).await;
        let remote = self.remote.save_task(&task).await;
        self.settle("save", local, remote, move |tasks| {
            tasks.insert(task.id.clone(), task);
        })
    }

    /// Create and save an active task with a fresh id.
    pub async fn create_task(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> RepositoryResult<Task> {
        let task = Task::new(title, description);
        self.save_task(task.clone()).await?;
        debug!(task_id = task.id.as_str(), "task created");
        Ok(task)
    }

    /// Rewrite title and description of an existing task, keeping its id and completion.
    pub async fn update_task(
        &self,
        task_id: &str,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> RepositoryResult<Task> {
        let existing = self
            .get_task(task_id)
            .await
            .into_option()
            .ok_or_else(|| RepositoryError::TaskNotFound(task_id.to_string()))?;
        let task = Task {
            id: existing.id,
            title: title.into(),
            description: description.into(),
            completed: existing.completed,
        };
        self.save_task(task.clone()).await?;
        Ok(task)
    }

    pub async fn complete_task(&self, task_id: &str) -> RepositoryResult<()> {
        self.set_completed(task_id, true).await
    }

    pub async fn activate_task(&self, task_id: &str) -> RepositoryResult<()> {
        self.set_completed(task_id, false).await
    }

    pub async fn clear_completed_tasks(&self) -> RepositoryResult<()> {
        let _gate = self.sync_gate.lock().await;
        let local = self.local.clear_completed_tasks().await;
        let remote = self.remote.clear_completed_tasks().await;
        self.settle("clear completed", local, remote, |tasks| {
            tasks.retain(|_, task| !task.completed);
        })
    }

    pub async fn delete_task(&self, task_id: &str) -> RepositoryResult<()> {
        let _gate = self.sync_gate.lock().await;
        let local = self.local.delete_task(task_id).await;
        let remote = self.remote.delete_task(task_id).await;
        self.settle("delete", local, remote, |tasks| {
            tasks.remove(task_id);
        })
    }

    pub async fn delete_all_tasks(&self) -> RepositoryResult<()> {
        let _gate = self.sync_gate.lock().await;
        let local = self.local.delete_all_tasks().await;
        let remote = self.remote.delete_all_tasks().await;
        self.settle("delete all", local, remote, |tasks| tasks.clear())
    }

    /// Mark the cache stale. Nothing is fetched until the next read.
    pub async fn refresh_tasks(&self) {
        self.cache.lock().invalidate();
        self.local.refresh_tasks().await;
        self.remote.refresh_tasks().await;
        debug!("task cache invalidated");
    }

    async fn set_completed(&self, task_id: &str, completed: bool) -> RepositoryResult<()> {
        let _gate = self.sync_gate.lock().await;
        let (local, remote) = if completed {
            (
                self.local.complete_task(task_id).await,
                self.remote.complete_task(task_id).await,
            )
        } else {
            (
                self.local.activate_task(task_id).await,
                self.remote.activate_task(task_id).await,
            )
        };
        let action = if completed { "complete" } else { "activate" };
        self.settle(action, local, remote, |tasks| {
            if let Some(task) = tasks.get_mut(task_id) {
                task.completed = completed;
            }
        })
    }

    async fn load_from_sources(&self) -> Fetched<Vec<Task>> {
        match read_tasks(self.local.as_ref()).await {
            Fetched::Available(tasks) if !tasks.is_empty() => {
                debug!(count = tasks.len(), "task list loaded from local store");
                return Fetched::Available(tasks);
            }
            _ => {}
        }

        let Fetched::Available(tasks) = read_tasks(self.remote.as_ref()).await else {
            return Fetched::NotAvailable;
        };
        if let Err(err) = self.local.save_tasks(&tasks).await {
            warn!(count = tasks.len(), error = %err, "failed to write remote tasks through to local store");
        }
        debug!(count = tasks.len(), "task list loaded from remote store");
        Fetched::Available(tasks)
    }

    fn cached_task(&self, task_id: &str) -> Option<Task> {
        let cache = self.cache.lock();
        if cache.dirty {
            return None;
        }
        cache.tasks.get(task_id).cloned()
    }

    // Caller holds the sync gate, so no write lands between the store read and the cache insert.
    async fn load_task(&self, task_id: &str) -> Fetched<Task> {
        if let Fetched::Available(task) = read_task(self.local.as_ref(), task_id).await {
            self.cache_task(task.clone());
            return Fetched::Available(task);
        }

        match read_task(self.remote.as_ref(), task_id).await {
            Fetched::Available(task) => {
                if let Err(err) = self.local.save_task(&task).await {
                    warn!(task_id, error = %err, "failed to write remote task through to local store");
                }
                self.cache_task(task.clone());
                Fetched::Available(task)
            }
            Fetched::NotAvailable => {
                debug!(task_id, "task not available in any store");
                Fetched::NotAvailable
            }
        }
    }

    fn cache_task(&self, task: Task) {
        self.cache.lock().tasks.insert(task.id.clone(), task);
    }

    // Applies a successful write to the cache. A write that failed in either store leaves the
    // cache unable to mirror the stores, so it is invalidated instead.
    fn settle<F>(
        &self,
        action: &'static str,
        local: SourceResult<()>,
        remote: SourceResult<()>,
        apply: F,
    ) -> RepositoryResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, Task>),
    {
        let mut cache = self.cache.lock();
        cache.record(GateOutcome::Wrote);
        match (local, remote) {
            (Ok(()), Ok(())) => {
                apply(&mut cache.tasks);
                Ok(())
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(action, error = %err, "task write failed; invalidating cache");
                cache.invalidate();
                Err(err.into())
            }
        }
    }
}

async fn read_tasks(source: &dyn TasksDataSource) -> Fetched<Vec<Task>> {
    match source.get_tasks().await {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!(source = source.name(), error = %err, "task list read failed");
            Fetched::NotAvailable
        }
    }
}

async fn read_task(source: &dyn TasksDataSource, task_id: &str) -> Fetched<Task> {
    match source.get_task(task_id).await {
        Ok(fetched) => fetched,
        Err(err) => {
            warn!(source = source.name(), task_id, error = %err, "task read failed");
            Fetched::NotAvailable
        }
    }
}
