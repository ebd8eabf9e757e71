//! Reconciliation of cached task state toward the status oracle.

use taskdeck_api::{CompletionStatus, Project, TaskStatus, derive_completion};

/// Patches a project's cached tasks toward an authoritative completed
/// state reported by the oracle.
///
/// The patch is one-way: only an oracle report of *completed* rewrites
/// anything, and only when local derivation disagrees. An oracle report
/// of incomplete never un-completes locally done tasks, and a project
/// with an empty task list is never touched (an empty project is
/// active, never completed).
///
/// Returns `true` if any task status was rewritten.
pub fn patch_toward_oracle(project: &mut Project, remote: &CompletionStatus) -> bool {
    if !remote.is_completed || project.tasks.is_empty() {
        return false;
    }
    if derive_completion(&project.tasks).is_completed {
        return false;
    }
    for task in &mut project.tasks {
        task.status = TaskStatus::Done;
    }
    true
}
