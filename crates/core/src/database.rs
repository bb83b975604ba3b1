use std::path::Path;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{SourceError, SourceResult};
use crate::model::Task;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> SourceResult<Self> {
        let conn = Connection::open(path).map_err(|err| {
            SourceError::Open(format!("database at {}: {}", path.display(), err))
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let db = Self { conn };
        db.apply_migrations()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> SourceResult<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.apply_migrations()?;
        Ok(db)
    }

    pub fn fetch_tasks(&self) -> SourceResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, description, completed FROM tasks ORDER BY id ASC")?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(map_task(row)?);
        }
        Ok(tasks)
    }

    pub fn fetch_task(&self, id: &str) -> SourceResult<Option<Task>> {
        let task = self
            .conn
            .query_row(
                "SELECT id, title, description, completed FROM tasks WHERE id = :id LIMIT 1",
                named_params![":id": id],
                map_task,
            )
            .optional()?;
        Ok(task)
    }

    pub fn upsert_task(&self, task: &Task) -> SourceResult<()> {
        self.conn.execute(
            "INSERT INTO tasks (id, title, description, completed)
             VALUES (:id, :title, :description, :completed)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                completed = excluded.completed",
            named_params![
                ":id": &task.id,
                ":title": &task.title,
                ":description": &task.description,
                ":completed": task.completed,
            ],
        )?;
        Ok(())
    }

    pub fn upsert_tasks(&mut self, tasks: &[Task]) -> SourceResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO tasks (id, title, description, completed)
                 VALUES (:id, :title, :description, :completed)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    completed = excluded.completed",
            )?;
            for task in tasks {
                stmt.execute(named_params![
                    ":id": &task.id,
                    ":title": &task.title,
                    ":description": &task.description,
                    ":completed": task.completed,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Returns whether a row was touched. Unknown ids are not an error.
    pub fn set_completed(&self, id: &str, completed: bool) -> SourceResult<bool> {
        let updated = self.conn.execute(
            "UPDATE tasks SET completed = :completed WHERE id = :id",
            named_params![":completed": completed, ":id": id],
        )?;
        Ok(updated > 0)
    }

    pub fn delete_completed(&self) -> SourceResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM tasks WHERE completed = 1", [])?)
    }

    pub fn delete_task(&self, id: &str) -> SourceResult<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM tasks WHERE id = :id", named_params![":id": id])?;
        Ok(affected > 0)
    }

    pub fn delete_all(&self) -> SourceResult<usize> {
        Ok(self.conn.execute("DELETE FROM tasks", [])?)
    }

    fn apply_migrations(&self) -> SourceResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                completed INTEGER NOT NULL DEFAULT 0
             );
             CREATE INDEX IF NOT EXISTS idx_tasks_completed ON tasks(completed);
            ",
        )?;
        Ok(())
    }
}

fn map_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn upsert_is_idempotent_and_overwrites() {
        let db = Database::open_in_memory().expect("open db");
        let mut task = Task::with_id("01", "Buy milk", "");
        db.upsert_task(&task).expect("insert");
        db.upsert_task(&task).expect("insert again");

        task.title = "Buy oat milk".into();
        db.upsert_task(&task).expect("update");

        let tasks = db.fetch_tasks().expect("fetch");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy oat milk");
    }

    #[test]
    fn completion_toggle_ignores_unknown_ids() {
        let db = Database::open_in_memory().expect("open db");
        db.upsert_task(&Task::with_id("01", "Write docs", ""))
            .expect("insert");

        assert!(db.set_completed("01", true).expect("complete"));
        assert!(!db.set_completed("missing", true).expect("complete missing"));

        let task = db.fetch_task("01").expect("fetch").expect("task exists");
        assert!(task.completed);
    }

    #[test]
    fn delete_completed_keeps_active_tasks() {
        let mut db = Database::open_in_memory().expect("open db");
        db.upsert_tasks(&[
            Task::with_id("01", "active", ""),
            Task::with_id("02", "done", "").completed(),
            Task::with_id("03", "also done", "").completed(),
        ])
        .expect("bulk insert");

        assert_eq!(db.delete_completed().expect("clear"), 2);
        let ids: Vec<String> = db
            .fetch_tasks()
            .expect("fetch")
            .into_iter()
            .map(|task| task.id)
            .collect();
        assert_eq!(ids, vec!["01".to_string()]);
    }

    #[test]
    fn open_persists_between_connections() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("tasks.sqlite3");
        {
            let db = Database::open(&path).expect("open");
            db.upsert_task(&Task::with_id("01", "Persist me", "please"))
                .expect("insert");
        }
        let db = Database::open(&path).expect("reopen");
        let task = db.fetch_task("01").expect("fetch").expect("task exists");
        assert_eq!(task.description, "please");
        assert!(db.delete_task("01").expect("delete"));
        assert_eq!(db.delete_all().expect("delete all"), 0);
    }
}
