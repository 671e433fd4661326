pub mod backward_pass;
pub mod critical_path;
pub mod forward_pass;
pub mod risk;
pub mod timeline;

use crate::error::CpmError;
use crate::task::{MAX_DURATION_DAYS, Task, duration_days};
use serde::{Deserialize, Serialize};

/// Per-task CPM timing, in whole-day offsets from project day 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpmNode {
    pub id: String,
    pub duration_days: i64,
    pub earliest_start: i64,
    pub earliest_finish: i64,
    pub latest_start: i64,
    pub latest_finish: i64,
    pub slack: i64,
    pub is_critical: bool,
}

/// Durations in days, indexed by task position.
pub fn task_durations(tasks: &[Task], hours_per_day: f64) -> Result<Vec<i64>, CpmError> {
    tasks
        .iter()
        .map(|task| {
            let days = (task.estimated_hours / hours_per_day).ceil();
            if days > MAX_DURATION_DAYS as f64 {
                return Err(CpmError::DurationTooLong {
                    task_id: task.id.clone(),
                    days,
                    max: MAX_DURATION_DAYS,
                });
            }
            Ok(duration_days(task.estimated_hours, hours_per_day))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_past_the_limit_are_rejected() {
        let tasks = vec![
            Task::new("ok", "Ok", 8.0 * MAX_DURATION_DAYS as f64),
            Task::new("huge", "Huge", 1e300),
        ];
        let err = task_durations(&tasks, 8.0).unwrap_err();
        assert!(matches!(
            err,
            CpmError::DurationTooLong { ref task_id, .. } if task_id == "huge"
        ));
        assert_eq!(
            task_durations(&tasks[..1], 8.0).unwrap(),
            vec![MAX_DURATION_DAYS]
        );
    }
}
