//! In-process stub of the Taskdeck backend REST contract.
//!
//! Test tooling only: an axum server holding projects in memory, with
//! switches for the behaviors the client must cope with (legacy task
//! route, stalled deletes, an oracle that disagrees with local task
//! state, error-body extraction). Started on an OS-assigned port; each
//! test gets its own instance.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::json;

use taskdeck::config::ClientConfig;
use taskdeck::store::ProjectStore;
use taskdeck_api::{
    CompletionStatus, CreateProjectRequest, Project, ProjectId, Task, TaskId, TaskStatus,
    UpdateProjectRequest, derive_completion,
};

/// Behavior switches for the stub backend, fixed at start time.
#[derive(Debug, Default, Clone)]
pub struct StubOptions {
    /// Serve tasks only at the legacy `/tasks/project/{id}` route;
    /// `/projects/{id}/tasks` answers 404.
    pub legacy_tasks_only: bool,
    /// Strip embedded tasks from `GET /projects/{id}` responses so the
    /// client has to fetch them through the task routes.
    pub strip_tasks_on_get: bool,
    /// Sleep this long before answering any delete.
    pub delete_stall: Option<Duration>,
    /// Answer every update with 500 and this error message.
    pub fail_updates_with: Option<String>,
    /// Answer every status query with 500 (oracle down).
    pub status_unavailable: bool,
}

/// Shared state of one stub backend instance.
pub struct StubState {
    pub projects: Mutex<Vec<Project>>,
    options: StubOptions,
    /// Project ids whose status oracle reports completed regardless of
    /// stored task state. Mutable so tests can flip the oracle after
    /// the store has already cached local state.
    completed_overrides: Mutex<Vec<String>>,
    next_id: AtomicU64,
}

impl StubState {
    fn find(&self, id: &str) -> Option<Project> {
        self.projects
            .lock()
            .iter()
            .find(|p| p.id.as_str() == id)
            .cloned()
    }

    /// Makes the oracle report this project as completed from now on.
    pub fn mark_completed(&self, id: &str) {
        self.completed_overrides.lock().push(id.to_string());
    }
}

/// A running stub backend bound to an OS-assigned port.
pub struct StubServer {
    pub addr: SocketAddr,
    pub state: Arc<StubState>,
    _handle: tokio::task::JoinHandle<()>,
}

impl StubServer {
    /// Client configuration pointing at this instance, with short
    /// timeouts and a fast refresh delay suitable for tests.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: format!("http://{}", self.addr),
            request_timeout: Duration::from_secs(5),
            delete_timeout: Duration::from_secs(1),
            refresh_delay: Duration::from_millis(50),
        }
    }

    /// A fresh store wired to this instance.
    pub fn store(&self) -> ProjectStore {
        ProjectStore::from_config(&self.client_config()).unwrap()
    }
}

/// Starts a stub backend with default options.
pub async fn start(initial: Vec<Project>) -> StubServer {
    start_with(StubOptions::default(), initial).await
}

/// Starts a stub backend with explicit options.
pub async fn start_with(options: StubOptions, initial: Vec<Project>) -> StubServer {
    let state = Arc::new(StubState {
        projects: Mutex::new(initial),
        options,
        completed_overrides: Mutex::new(Vec::new()),
        next_id: AtomicU64::new(1),
    });

    let app = Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/{id}/tasks", get(project_tasks))
        .route("/tasks/project/{id}", get(legacy_project_tasks))
        .route("/projects/{id}/status", get(project_status))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubServer {
        addr,
        state,
        _handle: handle,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

async fn list_projects(State(state): State<Arc<StubState>>) -> Json<Vec<Project>> {
    Json(state.projects.lock().clone())
}

async fn create_project(
    State(state): State<Arc<StubState>>,
    Json(req): Json<CreateProjectRequest>,
) -> impl IntoResponse {
    let id = format!("stub-{}", state.next_id.fetch_add(1, Ordering::Relaxed));
    let project = Project {
        id: ProjectId::new(&id),
        name: req.name,
        description: req.description,
        owner: req.owner,
        tasks: req.tasks,
    };
    state.projects.lock().push(project.clone());
    (StatusCode::CREATED, Json(project))
}

async fn get_project(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    match state.find(&id) {
        Some(mut project) => {
            if state.options.strip_tasks_on_get {
                project.tasks = Vec::new();
            }
            Json(project).into_response()
        }
        None => not_found("project not found"),
    }
}

async fn update_project(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProjectRequest>,
) -> Response {
    if let Some(message) = &state.options.fail_updates_with {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response();
    }
    let mut projects = state.projects.lock();
    let Some(project) = projects.iter_mut().find(|p| p.id.as_str() == id) else {
        return not_found("project not found");
    };
    if let Some(name) = req.name {
        project.name = name;
    }
    if let Some(description) = req.description {
        project.description = Some(description);
    }
    if let Some(owner) = req.owner {
        project.owner = Some(owner);
    }
    Json(project.clone()).into_response()
}

async fn delete_project(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    if let Some(stall) = state.options.delete_stall {
        tokio::time::sleep(stall).await;
    }
    let mut projects = state.projects.lock();
    let before = projects.len();
    projects.retain(|p| p.id.as_str() != id);
    if projects.len() == before {
        return not_found("project not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn project_tasks(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    if state.options.legacy_tasks_only {
        return not_found("route not found");
    }
    match state.find(&id) {
        Some(project) => Json(project.tasks).into_response(),
        None => not_found("project not found"),
    }
}

async fn legacy_project_tasks(
    State(state): State<Arc<StubState>>,
    Path(id): Path<String>,
) -> Response {
    match state.find(&id) {
        Some(project) => Json(project.tasks).into_response(),
        None => not_found("project not found"),
    }
}

async fn project_status(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    if state.options.status_unavailable {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "status service down" })),
        )
            .into_response();
    }
    match state.find(&id) {
        Some(project) => {
            if state.completed_overrides.lock().iter().any(|o| o == &id) {
                let total = project.tasks.len();
                return Json(CompletionStatus {
                    is_completed: true,
                    completed_count: total,
                    total_count: total,
                })
                .into_response();
            }
            Json(derive_completion(&project.tasks)).into_response()
        }
        None => not_found("project not found"),
    }
}

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

/// Builds a task fixture.
pub fn make_task(id: &str, status: TaskStatus) -> Task {
    Task {
        id: TaskId::new(id),
        title: format!("task {id}"),
        description: None,
        status,
        deadline: None,
    }
}

/// Builds a project fixture.
pub fn make_project(id: &str, name: &str, tasks: Vec<Task>) -> Project {
    Project {
        id: ProjectId::new(id),
        name: name.to_string(),
        description: None,
        owner: None,
        tasks,
    }
}
