//! Task records as the backend serves them.
//!
//! The backend stores task status as Turkish string literals. Those
//! literals are part of the wire contract and must round-trip byte for
//! byte; everything else in the client works with the [`TaskStatus`]
//! enum and never touches the raw strings.

use serde::{Deserialize, Serialize};

/// Unique identifier for a task, minted by the backend.
///
/// The client treats it as an opaque string (the backend uses
/// Mongo-style hex ids) and never parses or orders it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Creates a `TaskId` from a backend-provided string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the id is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a task.
///
/// The serialized forms are the backend's exact string literals:
/// `"beklemede"` (pending), `"yapiliyor"` (in progress),
/// `"tamamlandi"` (done). Completion logic only ever compares against
/// [`TaskStatus::Done`]; there is no total order over statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Task has not been started.
    #[serde(rename = "beklemede")]
    Pending,
    /// Task is actively being worked on.
    #[serde(rename = "yapiliyor")]
    InProgress,
    /// Task has been completed.
    #[serde(rename = "tamamlandi")]
    Done,
}

impl TaskStatus {
    /// Returns the wire literal for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "beklemede",
            Self::InProgress => "yapiliyor",
            Self::Done => "tamamlandi",
        }
    }

    /// Returns `true` for [`TaskStatus::Done`].
    ///
    /// This is the only status predicate completion derivation may use.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A unit of work inside a project.
///
/// `deadline` is presentational; the client displays it verbatim and
/// never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Backend-minted identifier (the backend also sends it as `_id`).
    #[serde(alias = "_id")]
    pub id: TaskId,
    /// Task title.
    pub title: String,
    /// Optional longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current status.
    pub status: TaskStatus,
    /// Optional deadline string, displayed verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}
