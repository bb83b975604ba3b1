//! Backing stores the repository reconciles: a fast local store and an authoritative remote.

mod local;
mod remote;

pub use local::LocalDataSource;
pub use remote::RemoteDataSource;

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::model::{Fetched, Task};

/// Keyed async CRUD over tasks.
///
/// Each call completes exactly once and may complete on a different thread than it was
/// issued from. Reads report [`Fetched::NotAvailable`] when the store has nothing to offer;
/// `Err` is reserved for genuine store failures. Toggles and deletes of unknown ids succeed
/// silently.
#[async_trait]
pub trait TasksDataSource: Send + Sync {
    async fn get_tasks(&self) -> SourceResult<Fetched<Vec<Task>>>;

    async fn get_task(&self, task_id: &str) -> SourceResult<Fetched<Task>>;

    /// Upsert by id.
    async fn save_task(&self, task: &Task) -> SourceResult<()>;

    /// Upsert a batch. Stops at the first failure.
    async fn save_tasks(&self, tasks: &[Task]) -> SourceResult<()> {
        for task in tasks {
            self.save_task(task).await?;
        }
        Ok(())
    }

    async fn complete_task(&self, task_id: &str) -> SourceResult<()>;

    async fn activate_task(&self, task_id: &str) -> SourceResult<()>;

    async fn clear_completed_tasks(&self) -> SourceResult<()>;

    async fn delete_task(&self, task_id: &str) -> SourceResult<()>;

    async fn delete_all_tasks(&self) -> SourceResult<()>;

    /// Staleness hint. Stores without a notion of staleness ignore it.
    async fn refresh_tasks(&self) {}

    /// Short label used in log fields.
    fn name(&self) -> &'static str;
}
