pub mod config;
pub mod database;
pub mod error;
pub mod model;
pub mod services;
pub mod source;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::AppConfig;
pub use error::{RepositoryError, RepositoryResult, SourceError, SourceResult};
pub use model::*;
pub use services::TaskRepository;
pub use source::{LocalDataSource, RemoteDataSource, TasksDataSource};
