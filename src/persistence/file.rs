use super::{PersistenceError, PersistenceResult};
use crate::calendar::{WorkCalendar, WorkCalendarConfig};
use crate::metadata::ProjectMetadata;
use crate::project::{Project, ProjectAnalysis};
use crate::task::{Task, TaskStatus};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

#[derive(Serialize, Deserialize)]
struct ProjectSnapshot {
    id: String,
    metadata: ProjectMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    calendar: Option<WorkCalendarConfig>,
    tasks: Vec<Task>,
}

impl ProjectSnapshot {
    fn from_project(project: &Project) -> PersistenceResult<Self> {
        super::validate_tasks(project.tasks())?;
        Ok(Self {
            id: project.id().to_string(),
            metadata: project.metadata().clone(),
            calendar: Some(project.calendar_config()),
            tasks: project.tasks().to_vec(),
        })
    }

    fn into_project(self) -> PersistenceResult<Project> {
        super::validate_tasks(&self.tasks)?;
        let calendar = match self.calendar {
            Some(config) => WorkCalendar::from_config(&config)
                .map_err(|err| PersistenceError::InvalidData(err.to_string()))?,
            None => WorkCalendar::default(),
        };
        Ok(Project::from_parts(
            self.id,
            self.metadata,
            calendar,
            self.tasks,
        )?)
    }
}

pub fn save_project_to_json<P: AsRef<Path>>(project: &Project, path: P) -> PersistenceResult<()> {
    let snapshot = ProjectSnapshot::from_project(project)?;
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    info!(project = %project.id(), path = %path.as_ref().display(), "project saved");
    Ok(())
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Project> {
    let file = File::open(path.as_ref())?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    let project = snapshot.into_project()?;
    info!(project = %project.id(), tasks = project.tasks().len(), "project loaded");
    Ok(project)
}

#[derive(Default, Serialize, Deserialize)]
struct TaskCsvRecord {
    id: String,
    name: String,
    estimated_hours: f64,
    dependencies: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    actual_hours: String,
    #[serde(default)]
    assignee: String,
    #[serde(default)]
    progress: String,
}

impl From<&Task> for TaskCsvRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            estimated_hours: task.estimated_hours,
            dependencies: task.dependencies.join(","),
            status: task.status.as_str().to_string(),
            actual_hours: task.actual_hours.map(|h| h.to_string()).unwrap_or_default(),
            assignee: task.assignee.clone().unwrap_or_default(),
            progress: task.progress.to_string(),
        }
    }
}

impl TaskCsvRecord {
    fn into_task(self) -> PersistenceResult<Task> {
        let mut task = Task::new(self.id, self.name, self.estimated_hours);
        task.dependencies = split_ids(&self.dependencies);
        if !self.status.trim().is_empty() {
            task.status =
                TaskStatus::from_str(&self.status).map_err(PersistenceError::InvalidData)?;
        }
        task.actual_hours = parse_f64(&self.actual_hours)?;
        task.assignee = parse_string_option(self.assignee);
        task.progress = parse_f64(&self.progress)?.unwrap_or(0.0);
        Ok(task)
    }
}

#[derive(Serialize)]
struct NodeCsvRecord<'a> {
    id: &'a str,
    duration_days: i64,
    earliest_start: i64,
    earliest_finish: i64,
    latest_start: i64,
    latest_finish: i64,
    slack: i64,
    is_critical: bool,
    start_date: String,
    finish_date: String,
}

pub fn save_tasks_to_csv<P: AsRef<Path>>(tasks: &[Task], path: P) -> PersistenceResult<()> {
    super::validate_tasks(tasks)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for task in tasks {
        writer.serialize(TaskCsvRecord::from(task))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_tasks_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Task>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut tasks = Vec::new();
    for record in reader.deserialize::<TaskCsvRecord>() {
        tasks.push(record?.into_task()?);
    }
    super::validate_tasks(&tasks)?;
    Ok(tasks)
}

/// Writes one row per CPM node with its calendar dates.
pub fn save_analysis_to_csv<P: AsRef<Path>>(
    analysis: &ProjectAnalysis,
    path: P,
) -> PersistenceResult<()> {
    if analysis.cpm.nodes.len() != analysis.timeline.entries.len() {
        return Err(PersistenceError::InvalidData(
            "analysis nodes and timeline entries differ in length".into(),
        ));
    }
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for (node, entry) in analysis.cpm.nodes.iter().zip(&analysis.timeline.entries) {
        writer.serialize(NodeCsvRecord {
            id: &node.id,
            duration_days: node.duration_days,
            earliest_start: node.earliest_start,
            earliest_finish: node.earliest_finish,
            latest_start: node.latest_start,
            latest_finish: node.latest_finish,
            slack: node.slack,
            is_critical: node.is_critical,
            start_date: entry.start_date.format("%Y-%m-%d").to_string(),
            finish_date: entry.finish_date.format("%Y-%m-%d").to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_f64(input: &str) -> PersistenceResult<Option<f64>> {
    if input.trim().is_empty() {
        return Ok(None);
    }
    input
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid number '{input}': {e}")))
}

fn split_ids(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
