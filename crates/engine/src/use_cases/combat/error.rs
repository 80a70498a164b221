//! Combat operation errors.

use crate::infrastructure::ports::RepoError;
use gamebook_domain::DomainError;

/// Errors that can occur while driving a combat.
#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    /// Bad injected roll, finished session, or a character that cannot fight
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl CombatError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Repo(e) if e.is_not_found())
    }
}
