pub mod analyzer;
pub mod calculations;
pub mod calendar;
pub mod config;
pub mod error;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod metadata;
pub mod persistence;
pub mod portfolio;
pub mod project;
pub mod task;
pub mod task_validation;

pub use analyzer::{CriticalPathAnalysis, compute_critical_path, compute_critical_path_with};
pub use calculations::CpmNode;
pub use calculations::risk::{RiskLevel, RiskMetrics};
pub use calculations::timeline::{Timeline, TimelineEntry};
pub use calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
pub use config::{AnalyzerConfig, RiskThresholds, SinkAnchor};
pub use error::CpmError;
pub use metadata::ProjectMetadata;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteProjectStore;
pub use persistence::{
    PersistenceError, PersistenceResult, ProjectStore, load_project_from_json,
    load_tasks_from_csv, save_analysis_to_csv, save_project_to_json, save_tasks_to_csv,
};
pub use portfolio::Portfolio;
pub use project::{Project, ProjectAnalysis, ProjectError};
pub use task::{DEFAULT_HOURS_PER_DAY, MAX_DURATION_DAYS, Task, TaskStatus};
pub use task_validation::TaskValidationError;
