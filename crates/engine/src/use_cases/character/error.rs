//! Character operation errors.

use crate::infrastructure::ports::RepoError;
use gamebook_domain::DomainError;

/// Errors that can occur during character operations.
///
/// An unknown id surfaces as `Repo(RepoError::NotFound { .. })`.
#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl CharacterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Repo(e) if e.is_not_found())
    }
}
