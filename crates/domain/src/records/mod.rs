//! Storage-boundary representation of a character
//!
//! Adapters persist [`RawRecord`]s. On the way in a record is migrated to the
//! current schema, deserialized into [`CharacterData`] and validated by
//! `Character::from_data`; on the way out `Character::to_data` produces the
//! record shape again.

mod data;
pub mod migrations;

use serde_json::Value;

use crate::error::DomainError;

pub use data::{CharacterData, InventoryData, ProgressData, StatsData};
pub use migrations::{
    migrate, needs_migration, pending_migrations, record_version, Migration, CURRENT_SCHEMA_VERSION,
    LEGACY_SCHEMA_VERSION, MIGRATIONS,
};

/// An untyped JSON object as it sits in storage.
pub type RawRecord = serde_json::Map<String, Value>;

/// Serialize a record to its raw JSON object.
pub fn to_raw(data: &CharacterData) -> Result<RawRecord, DomainError> {
    match serde_json::to_value(data)? {
        Value::Object(raw) => Ok(raw),
        other => Err(DomainError::parse(format!(
            "Character record serialized to a non-object: {}",
            other
        ))),
    }
}

/// Deserialize a raw object that is already at the current schema version.
pub fn from_raw(raw: RawRecord) -> Result<CharacterData, DomainError> {
    Ok(serde_json::from_value(Value::Object(raw))?)
}
