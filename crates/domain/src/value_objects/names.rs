//! Validated name newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for a character name
const MAX_NAME_LENGTH: usize = 200;

const COPY_SUFFIX: &str = " (Copy)";

/// A validated character name (non-empty, <=200 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CharacterName(String);

impl CharacterName {
    /// Create a new validated character name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The name is empty after trimming
    /// - The name exceeds 200 characters after trimming
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Character name cannot be empty"));
        }
        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Character name cannot exceed {} characters",
                MAX_NAME_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name given to a duplicate of this character.
    ///
    /// The base is shortened when needed so the suffixed name still fits.
    pub fn copy_name(&self) -> Self {
        let room = MAX_NAME_LENGTH - COPY_SUFFIX.chars().count();
        let base: String = self.0.chars().take(room).collect();
        Self(format!("{}{}", base.trim_end(), COPY_SUFFIX))
    }
}

impl fmt::Display for CharacterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CharacterName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CharacterName> for String {
    fn from(name: CharacterName) -> String {
        name.0
    }
}

/// Reject blank labels (item and weapon names).
pub(crate) fn require_label(label: &str, what: &str) -> Result<(), DomainError> {
    if label.trim().is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", what)));
    }
    Ok(())
}
