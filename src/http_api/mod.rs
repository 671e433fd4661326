use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    AnalyzerConfig, CpmError, CriticalPathAnalysis, Portfolio, Project, ProjectAnalysis,
    ProjectError, ProjectMetadata, Task, WorkCalendar, WorkCalendarConfig,
    compute_critical_path_with,
};

#[derive(Clone)]
pub struct AppState {
    portfolio: Arc<RwLock<Portfolio>>,
    config: Arc<AnalyzerConfig>,
}

impl AppState {
    pub fn new(portfolio: Portfolio, config: AnalyzerConfig) -> Self {
        Self {
            portfolio: Arc::new(RwLock::new(portfolio)),
            config: Arc::new(config),
        }
    }

    fn portfolio(&self) -> Arc<RwLock<Portfolio>> {
        self.portfolio.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    fn project_not_found(project_id: &str) -> Self {
        ApiError::not_found(format!("project {project_id} not found"))
    }
}

impl From<ProjectError> for ApiError {
    fn from(value: ProjectError) -> Self {
        match value {
            ProjectError::TaskNotFound(_) => ApiError::NotFound(value.to_string()),
            other => ApiError::Invalid(other.to_string()),
        }
    }
}

impl From<CpmError> for ApiError {
    fn from(value: CpmError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => {
                warn!(%message, "rejected request");
                (StatusCode::BAD_REQUEST, "invalid_request", message)
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct CreateProjectPayload {
    id: String,
    #[serde(default)]
    metadata: Option<ProjectMetadata>,
    #[serde(default)]
    calendar: Option<WorkCalendarConfig>,
    #[serde(default)]
    tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
struct ProjectView {
    id: String,
    metadata: ProjectMetadata,
    calendar: WorkCalendarConfig,
    tasks: Vec<Task>,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id().to_string(),
            metadata: project.metadata().clone(),
            calendar: project.calendar_config(),
            tasks: project.tasks().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProjectSummary {
    id: String,
    name: String,
    task_count: usize,
}

#[derive(Debug, Serialize)]
struct PortfolioEntry {
    project_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<ProjectAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", get(get_project).delete(delete_project))
        .route("/projects/:id/tasks", get(list_tasks).post(create_task))
        .route(
            "/projects/:id/tasks/:task_id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/projects/:id/critical-path", get(project_critical_path))
        .route("/critical-path", get(portfolio_critical_path))
        .route("/analyze", post(analyze_tasks))
        .with_state(state)
}

pub async fn serve(
    addr: SocketAddr,
    portfolio: Portfolio,
    config: AnalyzerConfig,
) -> std::io::Result<()> {
    let state = AppState::new(portfolio, config);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_projects(State(state): State<AppState>) -> Json<Vec<ProjectSummary>> {
    let portfolio = state.portfolio();
    let summaries = {
        let guard = portfolio.read();
        guard
            .projects()
            .map(|project| ProjectSummary {
                id: project.id().to_string(),
                name: project.metadata().name.clone(),
                task_count: project.tasks().len(),
            })
            .collect()
    };
    Json(summaries)
}

async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProjectPayload>,
) -> Result<(StatusCode, Json<ProjectView>), ApiError> {
    if payload.id.trim().is_empty() {
        return Err(ApiError::invalid("project id must not be empty"));
    }
    let calendar = match payload.calendar {
        Some(config) => WorkCalendar::from_config(&config)
            .map_err(|err| ApiError::invalid(err.to_string()))?,
        None => WorkCalendar::default(),
    };
    let project = Project::from_parts(
        payload.id,
        payload.metadata.unwrap_or_default(),
        calendar,
        payload.tasks,
    )?;

    let portfolio = state.portfolio();
    let view = {
        let mut guard = portfolio.write();
        if guard.contains(project.id()) {
            return Err(ApiError::Conflict(format!(
                "project {} already exists",
                project.id()
            )));
        }
        let view = ProjectView::from(&project);
        guard.insert(project);
        view
    };
    info!(project = %view.id, "project created");
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectView>, ApiError> {
    let portfolio = state.portfolio();
    let guard = portfolio.read();
    guard
        .get(&project_id)
        .map(|project| Json(ProjectView::from(project)))
        .ok_or_else(|| ApiError::project_not_found(&project_id))
}

async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let portfolio = state.portfolio();
    let removed = {
        let mut guard = portfolio.write();
        guard.remove(&project_id)
    };
    match removed {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::project_not_found(&project_id)),
    }
}

async fn list_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let portfolio = state.portfolio();
    let guard = portfolio.read();
    let project = guard
        .get(&project_id)
        .ok_or_else(|| ApiError::project_not_found(&project_id))?;
    Ok(Json(project.tasks().to_vec()))
}

async fn get_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> Result<Json<Task>, ApiError> {
    let portfolio = state.portfolio();
    let guard = portfolio.read();
    let project = guard
        .get(&project_id)
        .ok_or_else(|| ApiError::project_not_found(&project_id))?;
    project
        .find_task(&task_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {task_id} not found")))
}

async fn create_task(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Json(task): Json<Task>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let portfolio = state.portfolio();
    let created = {
        let mut guard = portfolio.write();
        let project = guard
            .get_mut(&project_id)
            .ok_or_else(|| ApiError::project_not_found(&project_id))?;
        if project.find_task(&task.id).is_some() {
            return Err(ApiError::Conflict(format!(
                "task {} already exists",
                task.id
            )));
        }
        project.upsert_task_record(task.clone())?;
        project
            .find_task(&task.id)
            .cloned()
            .ok_or_else(|| ApiError::internal("task not found after creation"))?
    };
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
    Json(task): Json<Task>,
) -> Result<Json<Task>, ApiError> {
    if task.id != task_id {
        return Err(ApiError::invalid(
            "task id in payload does not match path parameter",
        ));
    }
    let portfolio = state.portfolio();
    let updated = {
        let mut guard = portfolio.write();
        let project = guard
            .get_mut(&project_id)
            .ok_or_else(|| ApiError::project_not_found(&project_id))?;
        if project.find_task(&task_id).is_none() {
            return Err(ApiError::not_found(format!("task {task_id} not found")));
        }
        project.upsert_task_record(task)?;
        project
            .find_task(&task_id)
            .cloned()
            .ok_or_else(|| ApiError::internal("task not found after update"))?
    };
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<AppState>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let portfolio = state.portfolio();
    let removed = {
        let mut guard = portfolio.write();
        let project = guard
            .get_mut(&project_id)
            .ok_or_else(|| ApiError::project_not_found(&project_id))?;
        project.delete_task(&task_id)
    };
    if !removed {
        return Err(ApiError::not_found(format!("task {task_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn project_critical_path(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectAnalysis>, ApiError> {
    let portfolio = state.portfolio();
    let analysis = {
        let guard = portfolio.read();
        let project = guard
            .get(&project_id)
            .ok_or_else(|| ApiError::project_not_found(&project_id))?;
        project.analyze(&state.config)?
    };
    Ok(Json(analysis))
}

async fn portfolio_critical_path(State(state): State<AppState>) -> Json<Vec<PortfolioEntry>> {
    let portfolio = state.portfolio();
    let results = {
        let guard = portfolio.read();
        guard.analyze_all(&state.config)
    };
    let entries = results
        .into_iter()
        .map(|(project_id, result)| match result {
            Ok(analysis) => PortfolioEntry {
                project_id,
                analysis: Some(analysis),
                error: None,
            },
            Err(err) => PortfolioEntry {
                project_id,
                analysis: None,
                error: Some(err.to_string()),
            },
        })
        .collect();
    Json(entries)
}

async fn analyze_tasks(
    State(state): State<AppState>,
    Json(tasks): Json<Vec<Task>>,
) -> Result<Json<CriticalPathAnalysis>, ApiError> {
    let analysis = compute_critical_path_with(&tasks, &state.config)?;
    Ok(Json(analysis))
}
