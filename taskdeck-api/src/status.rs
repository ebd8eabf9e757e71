//! Canonical completion derivation.
//!
//! Every surface that needs "is this project done" calls
//! [`derive_completion`]; the rule is defined once, here. The backend's
//! status endpoint returns the same shape ([`CompletionStatus`]) and is
//! treated as authoritative when the two disagree.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// A project's completion summary.
///
/// Serialized camelCase to match the backend's status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStatus {
    /// `true` iff the project has at least one task and all are done.
    pub is_completed: bool,
    /// Number of tasks with status done.
    pub completed_count: usize,
    /// Total number of tasks.
    pub total_count: usize,
}

/// Derives a project's completion summary from its task list.
///
/// A project with zero tasks is active, never completed; that is a
/// product decision, not an artifact of the counting rule.
#[must_use]
pub fn derive_completion(tasks: &[Task]) -> CompletionStatus {
    let total_count = tasks.len();
    let completed_count = tasks.iter().filter(|t| t.status.is_done()).count();
    CompletionStatus {
        is_completed: total_count > 0 && completed_count == total_count,
        completed_count,
        total_count,
    }
}
