use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hours in one working day when no configuration overrides it.
pub const DEFAULT_HOURS_PER_DAY: f64 = 8.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Review,
    Completed,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Review => "review",
            TaskStatus::Completed => "completed",
            TaskStatus::Blocked => "blocked",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "todo" | "pending" => Ok(TaskStatus::Todo),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "completed" | "done" => Ok(TaskStatus::Completed),
            "blocked" => Ok(TaskStatus::Blocked),
            other => Err(format!("unknown task status '{other}'")),
        }
    }
}

/// A unit of project work as delivered by the project-management data layer.
///
/// Only `id`, `estimated_hours` and `dependencies` take part in the CPM
/// arithmetic. The remaining fields feed risk metrics and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub estimated_hours: f64,
    /// Ids of tasks that must finish first. Ids with no matching task are ignored.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    /// Completion percentage in `0..=100`.
    #[serde(default)]
    pub progress: f64,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, estimated_hours: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            estimated_hours,
            dependencies: Vec::new(),
            status: TaskStatus::default(),
            actual_hours: None,
            assignee: None,
            progress: 0.0,
        }
    }

    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_actual_hours(mut self, hours: f64) -> Self {
        self.actual_hours = Some(hours);
        self
    }

    /// Whole working days this task occupies at the default 8 hour day.
    pub fn duration_days(&self) -> i64 {
        duration_days(self.estimated_hours, DEFAULT_HOURS_PER_DAY)
    }

    /// True when actual effort exceeds the estimate by more than 10%.
    pub fn is_over_estimate(&self) -> bool {
        match self.actual_hours {
            Some(actual) => actual > self.estimated_hours * 1.1,
            None => false,
        }
    }
}

/// Converts an hour estimate into whole days, rounding any partial day up.
///
/// Callers validate `hours` as finite and non-negative and `hours_per_day`
/// as positive before reaching this point.
/// Longer estimates are rejected by the analyzer before any arithmetic on
/// day offsets.
pub const MAX_DURATION_DAYS: i64 = 1_000_000;

pub fn duration_days(hours: f64, hours_per_day: f64) -> i64 {
    (hours / hours_per_day).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_rounds_partial_days_up() {
        assert_eq!(duration_days(1.0, 8.0), 1);
        assert_eq!(duration_days(8.0, 8.0), 1);
        assert_eq!(duration_days(8.5, 8.0), 2);
        assert_eq!(duration_days(16.0, 8.0), 2);
        assert_eq!(duration_days(0.0, 8.0), 0);
        assert_eq!(duration_days(10.0, 4.0), 3);
    }

    #[test]
    fn status_parses_aliases() {
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Completed);
        assert_eq!(
            "In-Progress".parse::<TaskStatus>().unwrap(),
            TaskStatus::InProgress
        );
        assert!("finished".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn over_estimate_requires_more_than_ten_percent() {
        let task = Task::new("a", "A", 10.0).with_actual_hours(11.0);
        assert!(!task.is_over_estimate());
        let task = Task::new("a", "A", 10.0).with_actual_hours(11.5);
        assert!(task.is_over_estimate());
        assert!(!Task::new("b", "B", 10.0).is_over_estimate());
    }

    #[test]
    fn task_deserializes_with_defaults() {
        let task: Task =
            serde_json::from_str(r#"{"id":"t1","estimated_hours":12}"#).unwrap();
        assert_eq!(task.id, "t1");
        assert!(task.dependencies.is_empty());
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.actual_hours, None);
        assert_eq!(task.duration_days(), 2);
    }
}
