//! Project records and the CRUD request shapes the backend accepts.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Unique identifier for a project, minted by the backend.
///
/// Opaque to the client; compared only for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a `ProjectId` from a backend-provided string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the id is the empty string.
    ///
    /// An empty id is never valid on the wire; callers reject it before
    /// issuing a request.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A project: a container of tasks plus ownership metadata.
///
/// Task order is preserved exactly as received (display order).
/// Completion derivation over the tasks is order-independent; see
/// [`crate::status::derive_completion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Backend-minted identifier (the backend also sends it as `_id`).
    #[serde(alias = "_id")]
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional owner display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Tasks belonging to this project, in display order.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Request body for `POST /projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional owner display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Initial tasks, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Task>,
}

impl CreateProjectRequest {
    /// Creates a request with just a name; other fields default.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            owner: None,
            tasks: Vec::new(),
        }
    }
}

/// Request body for `PUT /projects/{id}`.
///
/// All fields optional: absent fields are left unchanged by the
/// backend. Task status transitions happen on tasks, never through a
/// project update, so no task list appears here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProjectRequest {
    /// New project name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New owner display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}
