use thiserror::Error;

/// Failure inside a backing store. Distinct from a `NotAvailable` miss.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Background worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Failed to open store: {0}")]
    Open(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
