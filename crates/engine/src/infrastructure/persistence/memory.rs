//! In-memory character store for development and testing
//!
//! Records live in a map keyed by character id. Nothing is persisted.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use gamebook_domain::{Character, CharacterId, RawRecord};
use tokio::sync::RwLock;

use super::{hydrate_all, hydrate_stored, to_record, ENTITY};
use crate::infrastructure::ports::{CharacterRepo, RecordStore, RepoError, StoredRecord};

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<BTreeMap<String, RawRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-existing raw records, as if loaded from an older release.
    pub async fn seed(&self, records: impl IntoIterator<Item = (String, RawRecord)>) {
        self.records.write().await.extend(records);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CharacterRepo for InMemoryStore {
    async fn save(&self, character: &Character) -> Result<(), RepoError> {
        let record = to_record(character)?;
        self.records
            .write()
            .await
            .insert(character.id().to_string(), record);
        Ok(())
    }

    async fn find_by_id(&self, id: &CharacterId) -> Result<Option<Character>, RepoError> {
        let raw = self.records.read().await.get(id.as_str()).cloned();
        raw.map(|raw| hydrate_stored(id, raw)).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Character>, RepoError> {
        let snapshot = self.records.read().await.clone();
        Ok(hydrate_all(snapshot))
    }

    async fn delete(&self, id: &CharacterId) -> Result<(), RepoError> {
        match self.records.write().await.remove(id.as_str()) {
            Some(_) => Ok(()),
            None => Err(RepoError::not_found(ENTITY, id)),
        }
    }

    async fn exists(&self, id: &CharacterId) -> Result<bool, RepoError> {
        Ok(self.records.read().await.contains_key(id.as_str()))
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list_raw(&self) -> Result<Vec<StoredRecord>, RepoError> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .map(|(key, raw)| StoredRecord {
                key: key.clone(),
                contents: Ok(raw.clone()),
            })
            .collect())
    }

    async fn put_raw(&self, key: &str, record: RawRecord) -> Result<(), RepoError> {
        self.records.write().await.insert(key.to_string(), record);
        Ok(())
    }
}
