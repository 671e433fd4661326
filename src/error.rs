use crate::task_validation::TaskValidationError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CpmError {
    #[error("invalid task: {0}")]
    InvalidTask(#[from] TaskValidationError),
    #[error("cyclic dependency detected at task {task_id}")]
    CyclicDependency { task_id: String },
    #[error("invalid analyzer config: {0}")]
    InvalidConfig(String),
    #[error("task {task_id} needs {days} days, more than the {max} day limit")]
    DurationTooLong { task_id: String, days: f64, max: i64 },
    #[error("schedule offsets overflow at task {task_id}")]
    ScheduleOverflow { task_id: String },
}
