//! REST client for the Taskdeck backend.
//!
//! Thin `reqwest` wrapper that knows the backend's routes and error
//! body convention. All methods return [`ApiError`]; nothing here is
//! retried automatically. The one piece of route cleverness is the
//! legacy task route fallback: older backend deployments serve tasks at
//! `/tasks/project/{id}` instead of `/projects/{id}/tasks`, and the
//! client tries the modern route first.

use std::time::Duration;

use reqwest::StatusCode;

use taskdeck_api::{
    CompletionStatus, CreateProjectRequest, Project, ProjectId, Task, UpdateProjectRequest,
};

use crate::config::ClientConfig;

/// Errors produced by [`ApiClient`] calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered 404 for the requested resource.
    #[error("{resource} not found")]
    NotFound {
        /// Human-readable description of what was looked up.
        resource: String,
    },

    /// No usable response: connect failure, timeout, or unreadable body.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status and a message.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The caller passed an id the client refuses to send.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// HTTP client bound to one backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    delete_timeout: Duration,
}

impl ApiClient {
    /// Builds a client from the resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the underlying HTTP client
    /// cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            delete_timeout: config.delete_timeout,
        })
    }

    /// Fetches all projects.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport or backend failure.
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let resp = self.http.get(self.url("/projects")).send().await?;
        let resp = Self::success(resp, "projects").await?;
        Ok(resp.json().await?)
    }

    /// Fetches a single project.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidArgument`] for an empty id without
    /// touching the network, [`ApiError::NotFound`] on 404, and the
    /// usual transport/backend kinds otherwise.
    pub async fn project(&self, id: &ProjectId) -> Result<Project, ApiError> {
        Self::require_id(id)?;
        let resp = self
            .http
            .get(self.url(&format!("/projects/{id}")))
            .send()
            .await?;
        let resp = Self::success(resp, &format!("project {id}")).await?;
        Ok(resp.json().await?)
    }

    /// Fetches the tasks of a project, falling back to the legacy route
    /// when the modern one 404s.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] only when both routes 404.
    pub async fn project_tasks(&self, id: &ProjectId) -> Result<Vec<Task>, ApiError> {
        Self::require_id(id)?;
        let resp = self
            .http
            .get(self.url(&format!("/projects/{id}/tasks")))
            .send()
            .await?;
        let resp = if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!(project = %id, "tasks route missing, trying legacy route");
            let legacy = self
                .http
                .get(self.url(&format!("/tasks/project/{id}")))
                .send()
                .await?;
            Self::success(legacy, &format!("tasks of project {id}")).await?
        } else {
            Self::success(resp, &format!("tasks of project {id}")).await?
        };
        Ok(resp.json().await?)
    }

    /// Queries the backend's status oracle for a project.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown project id.
    pub async fn project_status(&self, id: &ProjectId) -> Result<CompletionStatus, ApiError> {
        Self::require_id(id)?;
        let resp = self
            .http
            .get(self.url(&format!("/projects/{id}/status")))
            .send()
            .await?;
        let resp = Self::success(resp, &format!("status of project {id}")).await?;
        Ok(resp.json().await?)
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport or backend failure.
    pub async fn create_project(&self, req: &CreateProjectRequest) -> Result<Project, ApiError> {
        let resp = self
            .http
            .post(self.url("/projects"))
            .json(req)
            .send()
            .await?;
        let resp = Self::success(resp, "created project").await?;
        Ok(resp.json().await?)
    }

    /// Updates a project (partial update; absent fields unchanged).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on any transport or backend failure.
    pub async fn update_project(
        &self,
        id: &ProjectId,
        req: &UpdateProjectRequest,
    ) -> Result<Project, ApiError> {
        Self::require_id(id)?;
        let resp = self
            .http
            .put(self.url(&format!("/projects/{id}")))
            .json(req)
            .send()
            .await?;
        let resp = Self::success(resp, &format!("project {id}")).await?;
        Ok(resp.json().await?)
    }

    /// Deletes a project under a dedicated client-side abort window.
    ///
    /// A 404 response counts as success: the project is gone either
    /// way (idempotent-delete convention).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when the abort window elapses
    /// without a response.
    pub async fn delete_project(&self, id: &ProjectId) -> Result<(), ApiError> {
        Self::require_id(id)?;
        let resp = self
            .http
            .delete(self.url(&format!("/projects/{id}")))
            .timeout(self.delete_timeout)
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!(project = %id, "delete answered 404, treating as already deleted");
            return Ok(());
        }
        Self::success(resp, &format!("project {id}")).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn require_id(id: &ProjectId) -> Result<(), ApiError> {
        if id.is_empty() {
            return Err(ApiError::InvalidArgument(
                "project id must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Maps a non-2xx response to an [`ApiError`], reading the body for
    /// the backend's error message.
    async fn success(
        resp: reqwest::Response,
        resource: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound {
                resource: resource.to_string(),
            });
        }
        let body = resp.text().await.unwrap_or_default();
        let message = extract_message(&body).unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        });
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pulls the backend's error string out of a JSON body.
///
/// Express-style backends answer `{"error": "..."}`; some handlers use
/// `{"message": "..."}` instead. Both are accepted.
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .or_else(|| value.get("message"))?
        .as_str()
        .map(str::to_string)
}
