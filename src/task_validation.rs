use crate::task::Task;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskValidationError {
    #[error("task id must not be empty")]
    EmptyId,
    #[error("duplicate task id {0}")]
    DuplicateId(String),
    #[error("task {task_id} has invalid estimated_hours {hours} (must be finite and non-negative)")]
    InvalidEstimate { task_id: String, hours: f64 },
    #[error("task {task_id} has invalid actual_hours {hours} (must be finite and non-negative)")]
    InvalidActualHours { task_id: String, hours: f64 },
    #[error("task {task_id} has invalid progress {progress} (must be between 0 and 100)")]
    InvalidProgress { task_id: String, progress: f64 },
}

pub fn validate_task(task: &Task) -> Result<(), TaskValidationError> {
    if task.id.trim().is_empty() {
        return Err(TaskValidationError::EmptyId);
    }

    if !task.estimated_hours.is_finite() || task.estimated_hours < 0.0 {
        return Err(TaskValidationError::InvalidEstimate {
            task_id: task.id.clone(),
            hours: task.estimated_hours,
        });
    }

    if let Some(actual) = task.actual_hours {
        if !actual.is_finite() || actual < 0.0 {
            return Err(TaskValidationError::InvalidActualHours {
                task_id: task.id.clone(),
                hours: actual,
            });
        }
    }

    if !task.progress.is_finite() || !(0.0..=100.0).contains(&task.progress) {
        return Err(TaskValidationError::InvalidProgress {
            task_id: task.id.clone(),
            progress: task.progress,
        });
    }

    Ok(())
}

pub fn validate_task_collection(tasks: &[Task]) -> Result<(), TaskValidationError> {
    let mut seen_ids = HashSet::with_capacity(tasks.len());
    for task in tasks {
        validate_task(task)?;
        if !seen_ids.insert(task.id.as_str()) {
            return Err(TaskValidationError::DuplicateId(task.id.clone()));
        }
    }
    Ok(())
}
