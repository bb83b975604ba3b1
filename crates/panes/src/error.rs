use tasktab_core::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PresenterError {
    /// Blank id, or an id no store knows about.
    #[error("No task with id '{0}'")]
    MissingTask(String),

    #[error("A task needs a title or a description")]
    EmptyTask,

    #[error("No task is open in the secondary pane")]
    NoOpenTask,

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for PresenterError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::TaskNotFound(id) => PresenterError::MissingTask(id),
            other => PresenterError::Repository(other),
        }
    }
}

pub type PresenterResult<T> = Result<T, PresenterError>;

/// Reject blank ids before they reach the repository.
pub(crate) fn require_task_id(task_id: &str) -> PresenterResult<&str> {
    if task_id.trim().is_empty() {
        return Err(PresenterError::MissingTask(task_id.to_string()));
    }
    Ok(task_id)
}
