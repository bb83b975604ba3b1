use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;

static DEFAULT_DB_NAME: &str = "tasktab.sqlite3";
static DEFAULT_REMOTE_NAME: &str = "remote.json";
static ENV_DATA_DIR: &str = "TASKTAB_DATA_DIR";
static ENV_REMOTE_LATENCY: &str = "TASKTAB_REMOTE_LATENCY_MS";

static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("dev", "tasktab", "tasktab"));

#[derive(Debug, Clone)]
pub struct AppConfig {
    data_dir: PathBuf,
    db_path: PathBuf,
    remote_path: PathBuf,
    remote_latency: Duration,
}

impl AppConfig {
    /// Construct [`AppConfig`] by resolving the data directory using the provided override,
    /// environment variables, and platform defaults.
    pub fn discover(data_dir_override: Option<PathBuf>) -> Result<Self> {
        let data_dir = resolve_data_dir(data_dir_override)?;
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).with_context(|| {
                format!("Failed to create data directory at {}", data_dir.display())
            })?;
        }
        let mut config = Self::from_data_dir(data_dir)?;
        if let Some(latency) = latency_from_env()? {
            config.remote_latency = latency;
        }
        Ok(config)
    }

    /// Construct [`AppConfig`] directly from a resolved data directory.
    pub fn from_data_dir(data_dir: PathBuf) -> Result<Self> {
        let db_path = data_dir.join(DEFAULT_DB_NAME);
        let remote_path = data_dir.join(DEFAULT_REMOTE_NAME);
        Ok(Self {
            data_dir,
            db_path,
            remote_path,
            remote_latency: Duration::ZERO,
        })
    }

    pub fn with_remote_latency(mut self, latency: Duration) -> Self {
        self.remote_latency = latency;
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn remote_path(&self) -> &Path {
        &self.remote_path
    }

    pub fn remote_latency(&self) -> Duration {
        self.remote_latency
    }
}

fn latency_from_env() -> Result<Option<Duration>> {
    match env::var(ENV_REMOTE_LATENCY) {
        Ok(raw) => {
            let millis: u64 = raw.trim().parse().with_context(|| {
                format!("{} must be a whole number of milliseconds", ENV_REMOTE_LATENCY)
            })?;
            Ok(Some(Duration::from_millis(millis)))
        }
        Err(_) => Ok(None),
    }
}

fn resolve_data_dir(data_dir_override: Option<PathBuf>) -> Result<PathBuf> {
    let resolved = data_dir_override
        .or_else(|| env::var_os(ENV_DATA_DIR).map(PathBuf::from))
        .or_else(dev_data_dir)
        .or_else(|| {
            PROJECT_DIRS
                .as_ref()
                .map(|dirs| dirs.data_dir().to_path_buf())
        })
        .or_else(|| BaseDirs::new().map(|base| base.home_dir().join(".tasktab")));

    match resolved {
        Some(dir) => Ok(dir),
        None => Ok(env::current_dir()
            .context("Failed to determine a data directory")?
            .join(".tasktab")),
    }
}

/// Debug builds keep their stores under the workspace's `tmp/`.
fn dev_data_dir() -> Option<PathBuf> {
    cfg!(debug_assertions).then(|| {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("tmp")
            .join("dev-tasktab")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn from_data_dir_places_stores_inside_dir() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::from_data_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.db_path(), dir.path().join("tasktab.sqlite3"));
        assert_eq!(config.remote_path(), dir.path().join("remote.json"));
        assert_eq!(config.remote_latency(), Duration::ZERO);
    }

    #[test]
    fn discover_creates_missing_override_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("data");
        let config = AppConfig::discover(Some(nested.clone())).unwrap();
        assert!(nested.is_dir());
        assert_eq!(config.data_dir(), nested.as_path());
    }
}
