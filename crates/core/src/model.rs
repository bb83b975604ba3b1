use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use ulid::{Generator, Ulid};

// Shared so ids stay increasing within one millisecond.
static ID_GENERATOR: Lazy<Mutex<Generator>> = Lazy::new(|| Mutex::new(Generator::new()));

fn next_id() -> Ulid {
    // Overflow needs 2^80 ids in the same millisecond.
    ID_GENERATOR.lock().generate().unwrap_or_else(|_| Ulid::new())
}

/// A single to-do item. Identity is the `id`; two tasks with the same id are the same task
/// regardless of their other fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl Task {
    /// Create an active task with a freshly generated id.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_id(next_id().to_string(), title, description)
    }

    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            completed: false,
        }
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// A task with neither title nor description carries no information and is never saved.
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }

    /// Title when present, otherwise the description. Used for one-line listings.
    pub fn title_for_list(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.description
        } else {
            &self.title
        }
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Task {}

impl std::hash::Hash for Task {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Active => "active",
            TaskFilter::Completed => "completed",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => task.is_active(),
            TaskFilter::Completed => task.completed,
        }
    }

    pub fn apply<'a, I>(&self, tasks: I) -> Vec<Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        tasks
            .into_iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect()
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "active" => Ok(TaskFilter::Active),
            "completed" | "done" => Ok(TaskFilter::Completed),
            other => Err(anyhow!(
                "Unknown filter '{}': expected all|active|completed",
                other
            )),
        }
    }
}

/// Outcome of a read against a backing store or the repository.
///
/// `NotAvailable` is a legitimate miss, not a failure: the store had nothing to offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    Available(T),
    NotAvailable,
}

impl<T> Fetched<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Fetched::Available(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Available(value) => Some(value),
            Fetched::NotAvailable => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Fetched::Available(value) => Fetched::Available(f(value)),
            Fetched::NotAvailable => Fetched::NotAvailable,
        }
    }
}

impl<T> From<Option<T>> for Fetched<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Fetched::Available(value),
            None => Fetched::NotAvailable,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TaskStats {
    pub active: usize,
    pub completed: usize,
    pub active_percent: f32,
    pub completed_percent: f32,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        if total == 0 {
            return Self::default();
        }
        let completed = tasks.iter().filter(|task| task.completed).count();
        let active = total - completed;
        Self {
            active,
            completed,
            active_percent: 100.0 * active as f32 / total as f32,
            completed_percent: 100.0 * completed as f32 / total as f32,
        }
    }
}
