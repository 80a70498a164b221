//! Repository port traits for character storage.

use async_trait::async_trait;
use gamebook_domain::{Character, CharacterId, RawRecord};

use super::error::RepoError;

// =============================================================================
// Character Storage
// =============================================================================

/// Typed access to stored characters.
///
/// Implementations persist raw records and run them through the migration
/// chain when loading, so callers only ever see current, validated
/// characters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    /// Insert or replace.
    async fn save(&self, character: &Character) -> Result<(), RepoError>;
    async fn find_by_id(&self, id: &CharacterId) -> Result<Option<Character>, RepoError>;
    async fn find_all(&self) -> Result<Vec<Character>, RepoError>;
    /// Fails with [`RepoError::NotFound`] when nothing is stored under `id`.
    async fn delete(&self, id: &CharacterId) -> Result<(), RepoError>;
    async fn exists(&self, id: &CharacterId) -> Result<bool, RepoError>;
}

// =============================================================================
// Raw Record Storage
// =============================================================================

/// One entry of a record store, before any migration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    /// Storage key (the character id)
    pub key: String,
    /// The stored JSON object, or why it could not be read as one
    pub contents: Result<RawRecord, String>,
}

/// Untyped access used by record maintenance.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_raw(&self) -> Result<Vec<StoredRecord>, RepoError>;
    async fn put_raw(&self, key: &str, record: RawRecord) -> Result<(), RepoError>;
}
