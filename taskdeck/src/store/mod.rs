//! Cached project state with reconciliation toward the backend's
//! status oracle.
//!
//! [`ProjectStore`] is the single in-memory source of truth for
//! consumers: it owns the cached project list and the currently
//! selected project, and mediates every read and write. Consumers get
//! clones, never references into the cache, so nothing outside the
//! store can mutate cached records in place.
//!
//! # Failure contract
//!
//! Public operations never surface an `Err`. Each one catches the
//! underlying [`ApiError`] at the method boundary, stores a
//! human-readable message retrievable via [`ProjectStore::take_error`],
//! and returns a conservative default (`[]`, `None`, or `false`).
//! Nothing is retried automatically; the consumer decides whether to
//! re-invoke.

pub mod reconcile;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;

use taskdeck_api::{
    CompletionStatus, CreateProjectRequest, Project, ProjectId, UpdateProjectRequest,
    derive_completion,
};

use crate::config::ClientConfig;
use crate::rest::{ApiClient, ApiError};
use reconcile::patch_toward_oracle;

/// Cached state guarded by one lock: readers see a consistent triple.
#[derive(Default)]
struct CacheState {
    projects: Vec<Project>,
    selected: Option<Project>,
    last_error: Option<String>,
}

struct StoreInner {
    api: ApiClient,
    refresh_delay: Duration,
    state: RwLock<CacheState>,
    /// One scheduled authoritative refresh per project id; a newer
    /// schedule supersedes (aborts) the older one.
    refreshes: Mutex<HashMap<ProjectId, JoinHandle<()>>>,
}

/// In-memory source of truth for project data.
///
/// Cheap to clone (shared inner state); clones observe and mutate the
/// same cache.
#[derive(Clone)]
pub struct ProjectStore {
    inner: Arc<StoreInner>,
}

impl ProjectStore {
    /// Creates a store around an existing [`ApiClient`].
    #[must_use]
    pub fn new(api: ApiClient, refresh_delay: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                api,
                refresh_delay,
                state: RwLock::new(CacheState::default()),
                refreshes: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Creates a store and its [`ApiClient`] from the resolved
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(ApiClient::new(config)?, config.refresh_delay))
    }

    /// Fetches all projects, reconciles each against the status oracle,
    /// and replaces the cached list.
    ///
    /// For every project with a non-empty task list the oracle is
    /// queried; where it reports completed but local derivation
    /// disagrees, every task is patched to done before caching. A
    /// per-project oracle failure is not fatal: the project keeps its
    /// local task state and the failure is logged.
    ///
    /// Returns the (possibly patched) list, or `[]` on failure.
    pub async fn load_projects(&self) -> Vec<Project> {
        match self.try_load().await {
            Ok(projects) => {
                self.clear_error();
                projects
            }
            Err(err) => {
                self.record_error(&err);
                Vec::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Vec<Project>, ApiError> {
        let mut projects = self.inner.api.list_projects().await?;
        for project in &mut projects {
            if project.tasks.is_empty() {
                continue;
            }
            match self.inner.api.project_status(&project.id).await {
                Ok(remote) => {
                    if patch_toward_oracle(project, &remote) {
                        tracing::info!(
                            project = %project.id,
                            "reconciled cached tasks toward completed oracle state"
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        project = %project.id,
                        error = %err,
                        "status oracle unavailable, keeping local derivation"
                    );
                }
            }
        }
        self.inner.state.write().projects = projects.clone();
        Ok(projects)
    }

    /// Fetches one project and stores it as the selected project.
    ///
    /// An empty id is rejected client-side: the call returns `None`,
    /// records an invalid-argument message, and leaves the selected
    /// project untouched. When the project document arrives without
    /// embedded tasks, the task routes are tried; a 404 there means the
    /// project genuinely has no tasks.
    pub async fn get_project(&self, id: &ProjectId) -> Option<Project> {
        match self.try_get(id).await {
            Ok(project) => {
                self.clear_error();
                self.inner.state.write().selected = Some(project.clone());
                Some(project)
            }
            Err(err) => {
                self.record_error(&err);
                None
            }
        }
    }

    async fn try_get(&self, id: &ProjectId) -> Result<Project, ApiError> {
        let mut project = self.inner.api.project(id).await?;
        if project.tasks.is_empty() {
            match self.inner.api.project_tasks(id).await {
                Ok(tasks) => project.tasks = tasks,
                Err(ApiError::NotFound { .. }) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(project)
    }

    /// Creates a project and appends it to the cached list.
    ///
    /// The created id ends up in the cache exactly once, even if the
    /// backend echoes an id that was already cached.
    pub async fn create_project(&self, req: &CreateProjectRequest) -> Option<Project> {
        match self.inner.api.create_project(req).await {
            Ok(created) => {
                self.clear_error();
                let mut state = self.inner.state.write();
                if let Some(slot) = state.projects.iter_mut().find(|p| p.id == created.id) {
                    *slot = created.clone();
                } else {
                    state.projects.push(created.clone());
                }
                drop(state);
                Some(created)
            }
            Err(err) => {
                self.record_error(&err);
                None
            }
        }
    }

    /// Updates a project and replaces the cached entry wholesale.
    pub async fn update_project(
        &self,
        id: &ProjectId,
        req: &UpdateProjectRequest,
    ) -> Option<Project> {
        match self.inner.api.update_project(id, req).await {
            Ok(updated) => {
                self.clear_error();
                let mut state = self.inner.state.write();
                if let Some(slot) = state.projects.iter_mut().find(|p| p.id == updated.id) {
                    *slot = updated.clone();
                }
                if state.selected.as_ref().is_some_and(|p| p.id == updated.id) {
                    state.selected = Some(updated.clone());
                }
                drop(state);
                Some(updated)
            }
            Err(err) => {
                self.record_error(&err);
                None
            }
        }
    }

    /// Deletes a project and removes it from the cache.
    ///
    /// A backend 404 counts as success (the project is gone either
    /// way). Returns `false` only on a real failure, including the
    /// delete abort window elapsing.
    pub async fn delete_project(&self, id: &ProjectId) -> bool {
        match self.inner.api.delete_project(id).await {
            Ok(()) => {
                self.clear_error();
                {
                    let mut state = self.inner.state.write();
                    state.projects.retain(|p| &p.id != id);
                    if state.selected.as_ref().is_some_and(|p| &p.id == id) {
                        state.selected = None;
                    }
                }
                self.cancel_refresh(id);
                true
            }
            Err(err) => {
                self.record_error(&err);
                false
            }
        }
    }

    /// Queries the status oracle for a project.
    ///
    /// When the oracle reports completion, the matching cached project
    /// (and the selected project, if it matches) is immediately patched
    /// to all-done, and a full authoritative [`Self::load_projects`]
    /// refresh is scheduled after the configured delay. The optimistic
    /// patch keeps consumers responsive; the delayed refresh pulls the
    /// real task data.
    pub async fn project_status(&self, id: &ProjectId) -> Option<CompletionStatus> {
        match self.inner.api.project_status(id).await {
            Ok(status) => {
                self.clear_error();
                if status.is_completed {
                    {
                        let mut state = self.inner.state.write();
                        if let Some(project) = state.projects.iter_mut().find(|p| &p.id == id) {
                            if patch_toward_oracle(project, &status) {
                                tracing::debug!(
                                    project = %id,
                                    "optimistically patched cached tasks ahead of refresh"
                                );
                            }
                        }
                        if let Some(selected) = state.selected.as_mut()
                            && &selected.id == id
                        {
                            patch_toward_oracle(selected, &status);
                        }
                    }
                    self.schedule_refresh(id);
                }
                Some(status)
            }
            Err(err) => {
                self.record_error(&err);
                None
            }
        }
    }

    /// Derives a cached project's completion summary locally.
    ///
    /// This is the read path for consumers that only need the derived
    /// counts; it goes through the one canonical derivation rule.
    #[must_use]
    pub fn derived_completion(&self, id: &ProjectId) -> Option<CompletionStatus> {
        let state = self.inner.state.read();
        state
            .projects
            .iter()
            .find(|p| &p.id == id)
            .map(|p| derive_completion(&p.tasks))
    }

    /// Returns a clone of the cached project list.
    #[must_use]
    pub fn projects(&self) -> Vec<Project> {
        self.inner.state.read().projects.clone()
    }

    /// Returns a clone of the selected project, if any.
    #[must_use]
    pub fn selected(&self) -> Option<Project> {
        self.inner.state.read().selected.clone()
    }

    /// Returns the current error message without clearing it.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner.state.read().last_error.clone()
    }

    /// Hands the current error message to the consumer exactly once.
    #[must_use]
    pub fn take_error(&self) -> Option<String> {
        self.inner.state.write().last_error.take()
    }

    /// Number of scheduled authoritative refreshes not yet fired.
    #[must_use]
    pub fn pending_refreshes(&self) -> usize {
        self.inner
            .refreshes
            .lock()
            .values()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Schedules the delayed authoritative refresh for a project,
    /// superseding any not-yet-fired refresh for the same id.
    fn schedule_refresh(&self, id: &ProjectId) {
        let mut refreshes = self.inner.refreshes.lock();
        refreshes.retain(|_, handle| !handle.is_finished());
        if let Some(stale) = refreshes.remove(id) {
            stale.abort();
            tracing::debug!(project = %id, "superseded previously scheduled refresh");
        }

        let store = self.clone();
        let project = id.clone();
        let delay = self.inner.refresh_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!(project = %project, "running scheduled authoritative refresh");
            let _ = store.load_projects().await;
        });
        refreshes.insert(id.clone(), handle);
    }

    fn cancel_refresh(&self, id: &ProjectId) {
        if let Some(handle) = self.inner.refreshes.lock().remove(id) {
            handle.abort();
        }
    }

    fn record_error(&self, err: &ApiError) {
        tracing::warn!(error = %err, "store operation failed");
        self.inner.state.write().last_error = Some(err.to_string());
    }

    fn clear_error(&self) {
        self.inner.state.write().last_error = None;
    }
}
