use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::config::AppConfig;
use crate::error::SourceResult;
use crate::model::{Fetched, Task};

use super::TasksDataSource;

/// Authoritative store reached over a slow link.
///
/// Every operation waits `latency` before touching the data. When built from an
/// [`AppConfig`] the contents are mirrored to a JSON snapshot so separate processes share one
/// remote.
#[derive(Debug)]
pub struct RemoteDataSource {
    tasks: RwLock<BTreeMap<String, Task>>,
    latency: Duration,
    snapshot: Option<PathBuf>,
}

impl RemoteDataSource {
    pub fn in_memory(latency: Duration) -> Self {
        Self {
            tasks: RwLock::new(BTreeMap::new()),
            latency,
            snapshot: None,
        }
    }

    pub fn open(config: &AppConfig) -> SourceResult<Self> {
        let path = config.remote_path().to_path_buf();
        let tasks = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let stored: Vec<Task> = serde_json::from_str(&raw)?;
            stored
                .into_iter()
                .map(|task| (task.id.clone(), task))
                .collect()
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            tasks: RwLock::new(tasks),
            latency: config.remote_latency(),
            snapshot: Some(path),
        })
    }

    /// Seed tasks without simulated latency. Intended for fixtures and first-run data.
    pub fn seed<I>(&self, tasks: I)
    where
        I: IntoIterator<Item = Task>,
    {
        let mut guard = self.tasks.write();
        for task in tasks {
            guard.insert(task.id.clone(), task);
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    async fn mutate<F>(&self, f: F) -> SourceResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, Task>),
    {
        self.round_trip().await;
        let contents = {
            let mut guard = self.tasks.write();
            f(&mut guard);
            self.snapshot
                .as_ref()
                .map(|_| guard.values().cloned().collect::<Vec<_>>())
        };
        if let (Some(path), Some(contents)) = (self.snapshot.as_ref(), contents) {
            let json = serde_json::to_string_pretty(&contents)?;
            tokio::fs::write(path, json).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl TasksDataSource for RemoteDataSource {
    async fn get_tasks(&self) -> SourceResult<Fetched<Vec<Task>>> {
        self.round_trip().await;
        let guard = self.tasks.read();
        if guard.is_empty() {
            return Ok(Fetched::NotAvailable);
        }
        Ok(Fetched::Available(guard.values().cloned().collect()))
    }

    async fn get_task(&self, task_id: &str) -> SourceResult<Fetched<Task>> {
        self.round_trip().await;
        Ok(self.tasks.read().get(task_id).cloned().into())
    }

    async fn save_task(&self, task: &Task) -> SourceResult<()> {
        let task = task.clone();
        self.mutate(move |tasks| {
            tasks.insert(task.id.clone(), task);
        })
        .await
    }

    async fn save_tasks(&self, batch: &[Task]) -> SourceResult<()> {
        self.mutate(|tasks| {
            for task in batch {
                tasks.insert(task.id.clone(), task.clone());
            }
        })
        .await
    }

    async fn complete_task(&self, task_id: &str) -> SourceResult<()> {
        self.mutate(|tasks| {
            if let Some(task) = tasks.get_mut(task_id) {
                task.completed = true;
            }
        })
        .await
    }

    async fn activate_task(&self, task_id: &str) -> SourceResult<()> {
        self.mutate(|tasks| {
            if let Some(task) = tasks.get_mut(task_id) {
                task.completed = false;
            }
        })
        .await
    }

    async fn clear_completed_tasks(&self) -> SourceResult<()> {
        self.mutate(|tasks| tasks.retain(|_, task| !task.completed))
            .await
    }

    async fn delete_task(&self, task_id: &str) -> SourceResult<()> {
        self.mutate(|tasks| {
            tasks.remove(task_id);
        })
        .await
    }

    async fn delete_all_tasks(&self) -> SourceResult<()> {
        self.mutate(|tasks| tasks.clear()).await
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
