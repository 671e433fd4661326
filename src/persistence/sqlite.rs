use super::{PersistenceError, PersistenceResult, ProjectStore};
use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::metadata::ProjectMetadata;
use crate::project::Project;
use crate::task::Task;
use rusqlite::{Connection, OptionalExtension, Transaction, params};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Stores each project as a metadata row plus one JSON row per task.
pub struct SqliteProjectStore {
    connection: Mutex<Connection>,
}

impl SqliteProjectStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                metadata_json TEXT NOT NULL,
                calendar_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                task_json TEXT NOT NULL,
                PRIMARY KEY (project_id, position)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    fn save_header(&self, tx: &Transaction, project: &Project) -> PersistenceResult<()> {
        let metadata_json = serde_json::to_string(project.metadata())?;
        let calendar_json = serde_json::to_string(&project.calendar_config())?;
        tx.execute(
            "INSERT INTO projects (id, metadata_json, calendar_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                 metadata_json = excluded.metadata_json,
                 calendar_json = excluded.calendar_json",
            params![project.id(), metadata_json, calendar_json],
        )?;
        Ok(())
    }

    fn save_tasks(&self, tx: &Transaction, project: &Project) -> PersistenceResult<()> {
        tx.execute(
            "DELETE FROM tasks WHERE project_id = ?1",
            params![project.id()],
        )?;
        let mut stmt =
            tx.prepare("INSERT INTO tasks (project_id, position, task_json) VALUES (?1, ?2, ?3)")?;
        for (position, task) in project.tasks().iter().enumerate() {
            let json = serde_json::to_string(task)?;
            stmt.execute(params![project.id(), position as i64, json])?;
        }
        Ok(())
    }
}

impl ProjectStore for SqliteProjectStore {
    fn save_project(&self, project: &Project) -> PersistenceResult<()> {
        super::validate_tasks(project.tasks())?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        self.save_header(&tx, project)?;
        self.save_tasks(&tx, project)?;
        tx.commit()?;
        info!(project = %project.id(), tasks = project.tasks().len(), "project stored");
        Ok(())
    }

    fn load_project(&self, project_id: &str) -> PersistenceResult<Option<Project>> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT metadata_json, calendar_json FROM projects WHERE id = ?1")?;
        let header: Option<(String, String)> = stmt
            .query_row(params![project_id], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((metadata_json, calendar_json)) = header else {
            debug!(project = project_id, "project not found in store");
            return Ok(None);
        };

        let metadata: ProjectMetadata = serde_json::from_str(&metadata_json)?;
        let calendar_config: WorkCalendarConfig = serde_json::from_str(&calendar_json)?;
        let calendar = WorkCalendar::from_config(&calendar_config)
            .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;

        let mut stmt =
            conn.prepare("SELECT task_json FROM tasks WHERE project_id = ?1 ORDER BY position ASC")?;
        let rows = stmt.query_map(params![project_id], |row| row.get::<_, String>(0))?;

        let mut tasks = Vec::new();
        for json in rows {
            let json = json?;
            let task: Task = serde_json::from_str(&json)?;
            tasks.push(task);
        }

        super::validate_tasks(&tasks)?;
        let project = Project::from_parts(project_id.to_string(), metadata, calendar, tasks)?;
        Ok(Some(project))
    }

    fn list_project_ids(&self) -> PersistenceResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id FROM projects ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(id?);
        }
        Ok(ids)
    }

    fn delete_project(&self, project_id: &str) -> PersistenceResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM tasks WHERE project_id = ?1",
            params![project_id],
        )?;
        let removed = tx.execute("DELETE FROM projects WHERE id = ?1", params![project_id])?;
        tx.commit()?;
        Ok(removed > 0)
    }
}
