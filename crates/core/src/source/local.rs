use std::path::PathBuf;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::database::Database;
use crate::error::SourceResult;
use crate::model::{Fetched, Task};

use super::TasksDataSource;

/// SQLite-backed store. Every operation opens its own connection on the blocking pool.
#[derive(Debug, Clone)]
pub struct LocalDataSource {
    db_path: PathBuf,
}

impl LocalDataSource {
    pub fn open(config: &AppConfig) -> SourceResult<Self> {
        Database::open(config.db_path())?;
        Ok(Self {
            db_path: config.db_path().to_path_buf(),
        })
    }

    async fn with_database<T, F>(&self, f: F) -> SourceResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> SourceResult<T> + Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut db = Database::open(&path)?;
            f(&mut db)
        })
        .await?
    }
}

#[async_trait]
impl TasksDataSource for LocalDataSource {
    async fn get_tasks(&self) -> SourceResult<Fetched<Vec<Task>>> {
        let tasks = self.with_database(|db| db.fetch_tasks()).await?;
        if tasks.is_empty() {
            return Ok(Fetched::NotAvailable);
        }
        Ok(Fetched::Available(tasks))
    }

    async fn get_task(&self, task_id: &str) -> SourceResult<Fetched<Task>> {
        let id = task_id.to_string();
        let task = self.with_database(move |db| db.fetch_task(&id)).await?;
        Ok(task.into())
    }

    async fn save_task(&self, task: &Task) -> SourceResult<()> {
        let task = task.clone();
        self.with_database(move |db| db.upsert_task(&task)).await
    }

    async fn save_tasks(&self, tasks: &[Task]) -> SourceResult<()> {
        let tasks = tasks.to_vec();
        self.with_database(move |db| db.upsert_tasks(&tasks)).await
    }

    async fn complete_task(&self, task_id: &str) -> SourceResult<()> {
        let id = task_id.to_string();
        self.with_database(move |db| db.set_completed(&id, true).map(|_| ()))
            .await
    }

    async fn activate_task(&self, task_id: &str) -> SourceResult<()> {
        let id = task_id.to_string();
        self.with_database(move |db| db.set_completed(&id, false).map(|_| ()))
            .await
    }

    async fn clear_completed_tasks(&self) -> SourceResult<()> {
        let removed = self.with_database(|db| db.delete_completed()).await?;
        tracing::debug!(removed, "local store cleared completed tasks");
        Ok(())
    }

    async fn delete_task(&self, task_id: &str) -> SourceResult<()> {
        let id = task_id.to_string();
        self.with_database(move |db| db.delete_task(&id).map(|_| ()))
            .await
    }

    async fn delete_all_tasks(&self) -> SourceResult<()> {
        self.with_database(|db| db.delete_all().map(|_| ())).await
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
