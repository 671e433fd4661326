use crate::analyzer::{CriticalPathAnalysis, compute_critical_path_with};
use crate::calculations::risk::RiskMetrics;
use crate::calculations::timeline::Timeline;
use crate::calendar::{CalendarError, WorkCalendar, WorkCalendarConfig};
use crate::config::AnalyzerConfig;
use crate::error::CpmError;
use crate::metadata::ProjectMetadata;
use crate::task::{Task, TaskStatus};
use crate::task_validation::{self, TaskValidationError};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Validation(#[from] TaskValidationError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Analysis(#[from] CpmError),
    #[error("task {0} not found")]
    TaskNotFound(String),
}

/// Everything the critical-path page shows for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub project_id: String,
    pub cpm: CriticalPathAnalysis,
    pub risk: RiskMetrics,
    pub timeline: Timeline,
}

impl ProjectAnalysis {
    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.cpm.nodes.len()));
        parts.push(format!("critical={}", self.risk.critical_task_count));
        parts.push(format!("duration={}d", self.cpm.project_duration_days));
        if let Some(date) = self.timeline.project_finish {
            parts.push(format!("finish={}", date));
        }
        if self.risk.overrun_count > 0 {
            parts.push(format!("overruns={}", self.risk.overrun_count));
        }
        parts.push(format!("risk={}", self.risk.risk_level));
        if !self.cpm.critical_path.is_empty() {
            parts.push(format!("crit_path={}", self.cpm.critical_path.join("->")));
        }
        parts.join(", ")
    }

    /// One row per task with CPM offsets and calendar dates.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let nodes = &self.cpm.nodes;
        let entries = &self.timeline.entries;
        let columns = vec![
            Series::new("id".into(), nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>())
                .into_column(),
            Series::new(
                "duration_days".into(),
                nodes.iter().map(|n| n.duration_days).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new("es".into(), nodes.iter().map(|n| n.earliest_start).collect::<Vec<_>>())
                .into_column(),
            Series::new("ef".into(), nodes.iter().map(|n| n.earliest_finish).collect::<Vec<_>>())
                .into_column(),
            Series::new("ls".into(), nodes.iter().map(|n| n.latest_start).collect::<Vec<_>>())
                .into_column(),
            Series::new("lf".into(), nodes.iter().map(|n| n.latest_finish).collect::<Vec<_>>())
                .into_column(),
            Series::new("slack".into(), nodes.iter().map(|n| n.slack).collect::<Vec<_>>())
                .into_column(),
            Series::new(
                "is_critical".into(),
                nodes.iter().map(|n| n.is_critical).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                "start_date".into(),
                entries
                    .iter()
                    .map(|e| e.start_date.to_string())
                    .collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                "finish_date".into(),
                entries
                    .iter()
                    .map(|e| e.finish_date.to_string())
                    .collect::<Vec<_>>(),
            )
            .into_column(),
        ];
        DataFrame::new(columns)
    }
}

/// A project's metadata, working calendar and ordered task list.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    id: String,
    metadata: ProjectMetadata,
    calendar: WorkCalendar,
    tasks: Vec<Task>,
}

impl Project {
    pub fn new(id: impl Into<String>, metadata: ProjectMetadata) -> Self {
        Self {
            id: id.into(),
            metadata,
            calendar: WorkCalendar::default(),
            tasks: Vec::new(),
        }
    }

    pub fn with_calendar(mut self, calendar: WorkCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    pub(crate) fn from_parts(
        id: String,
        metadata: ProjectMetadata,
        calendar: WorkCalendar,
        tasks: Vec<Task>,
    ) -> Result<Self, ProjectError> {
        task_validation::validate_task_collection(&tasks)?;
        Ok(Self {
            id,
            metadata,
            calendar,
            tasks,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: ProjectMetadata) {
        self.metadata = metadata;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.metadata.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.metadata.description = description.into();
    }

    pub fn set_start_date(&mut self, date: NaiveDate) {
        self.metadata.start_date = date;
    }

    pub fn calendar(&self) -> &WorkCalendar {
        &self.calendar
    }

    pub fn calendar_config(&self) -> WorkCalendarConfig {
        self.calendar.to_config()
    }

    pub fn set_calendar(&mut self, calendar: WorkCalendar) {
        self.calendar = calendar;
    }

    pub fn set_calendar_from_config(
        &mut self,
        config: &WorkCalendarConfig,
    ) -> Result<(), ProjectError> {
        self.calendar = WorkCalendar::from_config(config)?;
        Ok(())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == task_id)
    }

    /// Replaces the task with the same id in place, or appends a new one.
    pub fn upsert_task_record(&mut self, task: Task) -> Result<(), ProjectError> {
        task_validation::validate_task(&task)?;
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        Ok(())
    }

    pub fn replace_tasks(&mut self, tasks: Vec<Task>) -> Result<(), ProjectError> {
        task_validation::validate_task_collection(&tasks)?;
        self.tasks = tasks;
        Ok(())
    }

    /// Creates or updates the CPM fields of a task. `None` dependencies keep
    /// whatever the task already had.
    pub fn upsert_task(
        &mut self,
        id: &str,
        name: &str,
        estimated_hours: f64,
        dependencies: Option<Vec<String>>,
    ) -> Result<(), ProjectError> {
        let mut task = self
            .find_task(id)
            .cloned()
            .unwrap_or_else(|| Task::new(id, name, estimated_hours));
        task.name = name.to_string();
        task.estimated_hours = estimated_hours;
        if let Some(dependencies) = dependencies {
            task.dependencies = dependencies;
        }
        self.upsert_task_record(task)
    }

    /// Removes a task and strips it from every other task's dependencies.
    pub fn delete_task(&mut self, task_id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != task_id);
        if self.tasks.len() == before {
            return false;
        }
        for task in &mut self.tasks {
            task.dependencies.retain(|dep| dep != task_id);
        }
        debug!(project = %self.id, task = task_id, "task deleted");
        true
    }

    pub fn set_status(&mut self, task_id: &str, status: TaskStatus) -> Result<(), ProjectError> {
        self.update_task(task_id, |task| task.status = status)
    }

    pub fn set_actual_hours(&mut self, task_id: &str, hours: f64) -> Result<(), ProjectError> {
        self.update_task(task_id, |task| task.actual_hours = Some(hours))
    }

    pub fn set_assignee(&mut self, task_id: &str, assignee: &str) -> Result<(), ProjectError> {
        self.update_task(task_id, |task| task.assignee = Some(assignee.to_string()))
    }

    pub fn set_progress(&mut self, task_id: &str, progress: f64) -> Result<(), ProjectError> {
        self.update_task(task_id, |task| task.progress = progress)
    }

    fn update_task<F>(&mut self, task_id: &str, mutator: F) -> Result<(), ProjectError>
    where
        F: FnOnce(&mut Task),
    {
        let mut task = self
            .find_task(task_id)
            .cloned()
            .ok_or_else(|| ProjectError::TaskNotFound(task_id.to_string()))?;
        mutator(&mut task);
        self.upsert_task_record(task)
    }

    /// Runs CPM over the current tasks and derives risk metrics and dates.
    pub fn analyze(&self, config: &AnalyzerConfig) -> Result<ProjectAnalysis, ProjectError> {
        let cpm = compute_critical_path_with(&self.tasks, config)?;
        let risk = RiskMetrics::compute(&self.tasks, &cpm.nodes, &config.risk);
        let timeline = Timeline::build(&cpm.nodes, &self.calendar, self.metadata.start_date)?;
        Ok(ProjectAnalysis {
            project_id: self.id.clone(),
            cpm,
            risk,
            timeline,
        })
    }

    /// Tabular view of the task list.
    pub fn tasks_frame(&self) -> PolarsResult<DataFrame> {
        let tasks = &self.tasks;
        let columns = vec![
            Series::new("id".into(), tasks.iter().map(|t| t.id.as_str()).collect::<Vec<_>>())
                .into_column(),
            Series::new("name".into(), tasks.iter().map(|t| t.name.as_str()).collect::<Vec<_>>())
                .into_column(),
            Series::new(
                "estimated_hours".into(),
                tasks.iter().map(|t| t.estimated_hours).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                "dependencies".into(),
                tasks
                    .iter()
                    .map(|t| t.dependencies.join(","))
                    .collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                "status".into(),
                tasks.iter().map(|t| t.status.as_str()).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                "actual_hours".into(),
                tasks.iter().map(|t| t.actual_hours).collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new(
                "assignee".into(),
                tasks
                    .iter()
                    .map(|t| t.assignee.as_deref())
                    .collect::<Vec<_>>(),
            )
            .into_column(),
            Series::new("progress".into(), tasks.iter().map(|t| t.progress).collect::<Vec<_>>())
                .into_column(),
        ];
        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Project {
        let mut metadata = ProjectMetadata::default();
        metadata.start_date = d(2025, 1, 6);
        let mut project = Project::new("p1", metadata);
        project.upsert_task("a", "Design", 8.0, None).unwrap();
        project
            .upsert_task("b", "Build", 16.0, Some(vec!["a".into()]))
            .unwrap();
        project
            .upsert_task("c", "Docs", 8.0, Some(vec!["a".into()]))
            .unwrap();
        project
    }

    #[test]
    fn upsert_keeps_position_and_dependencies() {
        let mut project = sample();
        project.upsert_task("b", "Build v2", 24.0, None).unwrap();
        let ids: Vec<&str> = project.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let b = project.find_task("b").unwrap();
        assert_eq!(b.name, "Build v2");
        assert_eq!(b.dependencies, vec!["a".to_string()]);
    }

    #[test]
    fn delete_strips_dependency_references() {
        let mut project = sample();
        assert!(project.delete_task("a"));
        assert!(!project.delete_task("a"));
        assert!(project.tasks().iter().all(|t| t.dependencies.is_empty()));
    }

    #[test]
    fn setters_validate_and_report_missing_tasks() {
        let mut project = sample();
        project.set_progress("a", 40.0).unwrap();
        assert!(matches!(
            project.set_progress("a", 140.0),
            Err(ProjectError::Validation(_))
        ));
        assert_eq!(project.find_task("a").unwrap().progress, 40.0);
        assert_eq!(
            project.set_status("zzz", TaskStatus::Completed),
            Err(ProjectError::TaskNotFound("zzz".into()))
        );
    }

    #[test]
    fn analyze_combines_cpm_risk_and_timeline() {
        let mut project = sample();
        project.set_status("a", TaskStatus::Completed).unwrap();
        let analysis = project.analyze(&AnalyzerConfig::default()).unwrap();
        assert_eq!(analysis.project_id, "p1");
        assert_eq!(analysis.cpm.project_duration_days, 3);
        assert_eq!(analysis.timeline.project_finish, Some(d(2025, 1, 8)));
        assert_eq!(analysis.risk.critical_completed_count, 1);
        let summary = analysis.to_cli_summary();
        assert!(summary.contains("duration=3d"), "{summary}");
        assert!(summary.contains("crit_path=a->b"), "{summary}");
    }

    #[test]
    fn frames_have_one_row_per_task() {
        let project = sample();
        assert_eq!(project.tasks_frame().unwrap().height(), 3);
        let analysis = project.analyze(&AnalyzerConfig::default()).unwrap();
        let df = analysis.to_dataframe().unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 10);
    }
}
