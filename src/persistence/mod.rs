use crate::project::{Project, ProjectError};
use crate::task::Task;
use crate::task_validation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl From<ProjectError> for PersistenceError {
    fn from(value: ProjectError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait ProjectStore {
    fn save_project(&self, project: &Project) -> PersistenceResult<()>;
    fn load_project(&self, project_id: &str) -> PersistenceResult<Option<Project>>;
    fn list_project_ids(&self) -> PersistenceResult<Vec<String>>;
    /// Returns whether a project was removed.
    fn delete_project(&self, project_id: &str) -> PersistenceResult<bool>;
}

pub fn validate_tasks(tasks: &[Task]) -> PersistenceResult<()> {
    task_validation::validate_task_collection(tasks)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_project_from_json, load_tasks_from_csv, save_analysis_to_csv, save_project_to_json,
    save_tasks_to_csv,
};
