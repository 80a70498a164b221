//! Record maintenance errors.

use crate::infrastructure::ports::RepoError;

/// Failures that stop a maintenance run.
///
/// A single bad record never does; it is counted as invalid instead.
#[derive(Debug, thiserror::Error)]
pub enum MaintenanceError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
