//! Record maintenance use case.
//!
//! Walks every stored record, runs it through the migration chain and
//! validation, and rewrites the ones that were behind the current schema.

mod error;

pub use error::MaintenanceError;

use std::sync::Arc;

use serde::Serialize;

use gamebook_domain::records::{needs_migration, pending_migrations, record_version};
use gamebook_domain::{Character, DomainError, RawRecord, CURRENT_SCHEMA_VERSION};

use crate::infrastructure::ports::{RecordStore, StoredRecord};

/// Outcome of one maintenance run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceReport {
    pub scanned: usize,
    pub upgraded: usize,
    pub already_current: usize,
    /// Keys of records that could not be read, migrated or validated
    pub invalid: Vec<String>,
    /// Whether upgrades were only reported, not written
    pub dry_run: bool,
}

impl MaintenanceReport {
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Migrate-and-validate pass over a record store.
pub struct RecordMaintenance {
    store: Arc<dyn RecordStore>,
    dry_run: bool,
}

impl RecordMaintenance {
    pub fn new(store: Arc<dyn RecordStore>, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    pub async fn execute(&self) -> Result<MaintenanceReport, MaintenanceError> {
        let stored = self.store.list_raw().await?;
        let mut report = MaintenanceReport {
            scanned: stored.len(),
            dry_run: self.dry_run,
            ..MaintenanceReport::default()
        };

        for StoredRecord { key, contents } in stored {
            let raw = match contents {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Record is not a JSON object");
                    report.invalid.push(key);
                    continue;
                }
            };

            let from_version = record_version(&raw);
            let outdated = needs_migration(&raw);
            for step in pending_migrations(&raw) {
                tracing::debug!(key = %key, version = step.version, step = step.description, "Pending migration");
            }
            let upgraded = match upgrade(raw) {
                Ok(upgraded) => upgraded,
                Err(e) => {
                    tracing::warn!(key = %key, from_version, error = %e, "Record failed validation");
                    report.invalid.push(key);
                    continue;
                }
            };

            if !outdated {
                report.already_current += 1;
                continue;
            }

            report.upgraded += 1;
            if self.dry_run {
                tracing::info!(key = %key, from_version, to_version = CURRENT_SCHEMA_VERSION, "Would upgrade record");
            } else {
                self.store.put_raw(&key, upgraded).await?;
                tracing::info!(key = %key, from_version, to_version = CURRENT_SCHEMA_VERSION, "Upgraded record");
            }
        }

        tracing::info!(
            scanned = report.scanned,
            upgraded = report.upgraded,
            already_current = report.already_current,
            invalid = report.invalid.len(),
            dry_run = report.dry_run,
            "Record maintenance finished"
        );
        Ok(report)
    }
}

/// Migrate, validate and re-serialize one record in canonical form.
fn upgrade(raw: RawRecord) -> Result<RawRecord, DomainError> {
    let character = Character::hydrate(raw)?;
    character.to_record(character.updated_at())
}
