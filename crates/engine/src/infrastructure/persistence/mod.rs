//! Character storage adapters.
//!
//! Both adapters keep raw records and hydrate them through the migration
//! chain on every load, so a store full of old records keeps working.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

use gamebook_domain::{Character, CharacterId, RawRecord};

use crate::infrastructure::ports::RepoError;

const ENTITY: &str = "Character";

/// Stored form of `character`, keeping its own update time.
fn to_record(character: &Character) -> Result<RawRecord, RepoError> {
    character
        .to_record(character.updated_at())
        .map_err(RepoError::serialization)
}

/// Migrate and validate the record stored under `key`.
fn hydrate(key: &str, raw: RawRecord) -> Result<Character, RepoError> {
    Character::hydrate(raw)
        .map_err(|e| RepoError::serialization(format!("record '{}': {}", key, e)))
}

/// Hydrate the record stored under `id`, which must also carry that id.
fn hydrate_stored(id: &CharacterId, raw: RawRecord) -> Result<Character, RepoError> {
    let character = hydrate(id.as_str(), raw)?;
    if character.id() != id {
        return Err(RepoError::serialization(format!(
            "record '{}' holds character '{}'",
            id,
            character.id()
        )));
    }
    Ok(character)
}

/// Hydrate every record, skipping (and logging) the ones that fail.
fn hydrate_all(records: impl IntoIterator<Item = (String, RawRecord)>) -> Vec<Character> {
    records
        .into_iter()
        .filter_map(|(key, raw)| match hydrate(&key, raw) {
            Ok(character) => Some(character),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Skipping unreadable character record");
                None
            }
        })
        .collect()
}
