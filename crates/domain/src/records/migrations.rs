//! Record migration chain
//!
//! Stored character records carry a `schemaVersion`. Every schema change adds
//! one entry to [`MIGRATIONS`], a pure transform from the previous version to
//! the one it is tagged with. Transforms never fail: a field that cannot be
//! recovered gets its documented default and construction-time validation
//! decides whether the upgraded record is usable.

use serde_json::{json, Value};

use super::RawRecord;

/// Version assumed for records written before versioning existed.
pub const LEGACY_SCHEMA_VERSION: u32 = 1;

/// Version every record is upgraded to before it is hydrated.
pub const CURRENT_SCHEMA_VERSION: u32 = 8;

const VERSION_KEY: &str = "schemaVersion";
const EPOCH: &str = "1970-01-01T00:00:00Z";

/// Titles used before the book was stored as a number.
const LEGACY_BOOK_TITLES: [(&str, i64); 3] = [
    ("La Harpe des Quatre Saisons", 1),
    ("La Confrérie de NUADA", 2),
    ("Les Entrailles du temps", 3),
];

/// One step of the chain.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    /// Version the record has after this step
    pub version: u32,
    pub description: &'static str,
    pub migrate: fn(RawRecord) -> RawRecord,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 2,
        description: "add game mode",
        migrate: add_game_mode,
    },
    Migration {
        version: 3,
        description: "add optional constitution",
        migrate: add_constitution,
    },
    Migration {
        version: 4,
        description: "store book as a number",
        migrate: book_title_to_number,
    },
    Migration {
        version: 5,
        description: "add edition-gated reputation",
        migrate: add_reputation,
    },
    Migration {
        version: 6,
        description: "ensure the purse is carried",
        migrate: ensure_purse,
    },
    Migration {
        version: 7,
        description: "backfill partial legacy records",
        migrate: backfill_legacy_fields,
    },
    Migration {
        version: 8,
        description: "add day tracking",
        migrate: add_day_tracking,
    },
];

/// Version a raw record claims, [`LEGACY_SCHEMA_VERSION`] when absent or not
/// a non-negative integer.
pub fn record_version(record: &RawRecord) -> u32 {
    record
        .get(VERSION_KEY)
        .and_then(Value::as_u64)
        .and_then(|version| u32::try_from(version).ok())
        .unwrap_or(LEGACY_SCHEMA_VERSION)
}

/// Whether `record` still needs at least one migration.
pub fn needs_migration(record: &RawRecord) -> bool {
    record_version(record) < CURRENT_SCHEMA_VERSION
}

/// Steps [`migrate`] would apply to `record`, oldest first.
pub fn pending_migrations(record: &RawRecord) -> impl Iterator<Item = &'static Migration> {
    steps_after(record_version(record))
}

fn steps_after(version: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS.iter().filter(move |step| step.version > version)
}

/// Upgrade `record` to [`CURRENT_SCHEMA_VERSION`].
///
/// Records at the current version (or a newer one) come back untouched.
pub fn migrate(record: RawRecord) -> RawRecord {
    let version = record_version(&record);
    steps_after(version).fold(record, |record, step| {
        let mut upgraded = (step.migrate)(record);
        upgraded.insert(VERSION_KEY.to_string(), json!(step.version));
        upgraded
    })
}

// =============================================================================
// Helpers
// =============================================================================

/// Take a nested object out of the record, or an empty one if it is missing
/// or not an object.
fn take_section(record: &mut RawRecord, key: &str) -> RawRecord {
    match record.remove(key) {
        Some(Value::Object(section)) => section,
        _ => RawRecord::new(),
    }
}

fn put_section(record: &mut RawRecord, key: &str, section: RawRecord) {
    record.insert(key.to_string(), Value::Object(section));
}

fn edit_section(mut record: RawRecord, key: &str, edit: impl FnOnce(&mut RawRecord)) -> RawRecord {
    let mut section = take_section(&mut record, key);
    edit(&mut section);
    put_section(&mut record, key, section);
    record
}

fn is_book_two(record: &RawRecord) -> bool {
    record.get("book").and_then(Value::as_i64) == Some(2)
}

fn set_default(section: &mut RawRecord, key: &str, default: Value) {
    section.entry(key.to_string()).or_insert(default);
}

fn set_if_not(section: &mut RawRecord, key: &str, keep: fn(&Value) -> bool, default: Value) {
    if !section.get(key).is_some_and(keep) {
        section.insert(key.to_string(), default);
    }
}

// =============================================================================
// Steps
// =============================================================================

fn add_game_mode(mut record: RawRecord) -> RawRecord {
    set_default(&mut record, "gameMode", json!("mortal"));
    record
}

fn add_constitution(record: RawRecord) -> RawRecord {
    edit_section(record, "stats", |stats| {
        set_default(stats, "constitution", Value::Null);
    })
}

fn book_title_to_number(mut record: RawRecord) -> RawRecord {
    let book = match record.remove("book") {
        Some(Value::Number(number)) => Value::Number(number),
        Some(Value::String(title)) => json!(book_number_from_title(&title)),
        _ => json!(1),
    };
    record.insert("book".to_string(), book);
    record
}

fn book_number_from_title(title: &str) -> i64 {
    let title = title.trim();
    LEGACY_BOOK_TITLES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(title))
        .map(|(_, number)| *number)
        .or_else(|| title.parse::<i64>().ok())
        .unwrap_or(1)
}

fn add_reputation(record: RawRecord) -> RawRecord {
    let default = if is_book_two(&record) { json!(0) } else { Value::Null };
    edit_section(record, "stats", |stats| {
        set_default(stats, "reputation", default);
    })
}

fn ensure_purse(record: RawRecord) -> RawRecord {
    edit_section(record, "inventory", |inventory| {
        let mut items = match inventory.remove("items") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let has_purse = items
            .iter()
            .any(|item| item.get("name").and_then(Value::as_str) == Some("Purse"));
        if !has_purse {
            items.insert(
                0,
                json!({ "name": "Purse", "possessed": true, "kind": "special" }),
            );
        }
        inventory.insert("items".to_string(), Value::Array(items));
    })
}

fn backfill_legacy_fields(mut record: RawRecord) -> RawRecord {
    set_if_not(&mut record, "notes", Value::is_string, json!(""));
    set_if_not(&mut record, "talent", Value::is_string, json!(""));

    let progress_saved_at = record
        .get("progress")
        .and_then(|progress| progress.get("lastSavedAt"))
        .filter(|value| value.is_string())
        .cloned();
    let created_at = record.get("createdAt").filter(|v| v.is_string()).cloned();
    let updated_at = record.get("updatedAt").filter(|v| v.is_string()).cloned();
    let fallback = updated_at
        .clone()
        .or_else(|| created_at.clone())
        .or(progress_saved_at)
        .unwrap_or_else(|| json!(EPOCH));
    record.insert(
        "createdAt".to_string(),
        created_at.unwrap_or_else(|| fallback.clone()),
    );
    record.insert(
        "updatedAt".to_string(),
        updated_at.unwrap_or_else(|| fallback.clone()),
    );

    let record = edit_section(record, "inventory", |inventory| {
        set_if_not(inventory, "currency", Value::is_i64, json!(0));

        match inventory.get_mut("weapon") {
            Some(Value::Object(weapon)) => {
                set_if_not(weapon, "attackBonus", Value::is_i64, json!(0));
            }
            Some(_) | None => {
                inventory.insert("weapon".to_string(), Value::Null);
            }
        }

        if let Some(Value::Array(items)) = inventory.get_mut("items") {
            for item in items.iter_mut().filter_map(Value::as_object_mut) {
                if !item.contains_key("kind") {
                    let kind = item.remove("type").filter(Value::is_string);
                    item.insert("kind".to_string(), kind.unwrap_or_else(|| json!("item")));
                }
                set_if_not(item, "possessed", Value::is_boolean, json!(true));
            }
        }
    });

    edit_section(record, "progress", |progress| {
        set_if_not(progress, "currentPosition", Value::is_i64, json!(1));
        let position = progress.get("currentPosition").cloned().unwrap_or(json!(1));
        set_if_not(progress, "history", Value::is_array, json!([position]));
        set_if_not(progress, "lastSavedAt", Value::is_string, fallback);
    })
}

fn add_day_tracking(record: RawRecord) -> RawRecord {
    let default_days = if is_book_two(&record) { json!(0) } else { Value::Null };
    edit_section(record, "progress", |progress| {
        set_default(progress, "daysElapsed", default_days);
        set_default(progress, "nextWakeUpPosition", Value::Null);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(value: Value) -> RawRecord {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }

    fn step(version: u32) -> fn(RawRecord) -> RawRecord {
        MIGRATIONS
            .iter()
            .find(|m| m.version == version)
            .map(|m| m.migrate)
            .unwrap()
    }

    /// A record as the very first release wrote it.
    fn legacy_record() -> RawRecord {
        record(json!({
            "id": "legacy-1",
            "name": "Aldric",
            "book": "La Confrérie de NUADA",
            "talent": "Archer",
            "createdAt": "2023-05-01T10:00:00Z",
            "updatedAt": "2023-05-02T10:00:00Z",
            "stats": {
                "dexterity": 9,
                "luck": 7,
                "initialLuck": 8,
                "maxHealth": 20,
                "currentHealth": 14
            },
            "inventory": {
                "currency": 12,
                "weapon": { "name": "Bow" },
                "items": [{ "name": "Rope", "type": "item" }]
            },
            "progress": {
                "currentPosition": 57,
                "history": [1, 22, 57],
                "lastSavedAt": "2023-05-02T10:00:00Z"
            },
            "notes": "Met the ferryman"
        }))
    }

    mod registry {
        use super::*;

        #[test]
        fn versions_are_contiguous_from_two() {
            let versions: Vec<u32> = MIGRATIONS.iter().map(|m| m.version).collect();
            assert_eq!(versions.first(), Some(&(LEGACY_SCHEMA_VERSION + 1)));
            for pair in versions.windows(2) {
                assert_eq!(pair[1], pair[0] + 1, "gap after version {}", pair[0]);
            }
        }

        #[test]
        fn last_version_is_current() {
            assert_eq!(
                MIGRATIONS.last().map(|m| m.version),
                Some(CURRENT_SCHEMA_VERSION)
            );
        }
    }

    mod versioning {
        use super::*;

        #[test]
        fn missing_or_garbage_version_is_legacy() {
            assert_eq!(record_version(&RawRecord::new()), 1);
            assert_eq!(record_version(&record(json!({ "schemaVersion": "7" }))), 1);
            assert_eq!(record_version(&record(json!({ "schemaVersion": -2 }))), 1);
            assert_eq!(record_version(&record(json!({ "schemaVersion": 5 }))), 5);
        }

        #[test]
        fn current_record_is_returned_unchanged() {
            let current = migrate(legacy_record());
            assert!(!needs_migration(&current));
            assert_eq!(migrate(current.clone()), current);
        }

        #[test]
        fn pending_steps_follow_the_stored_version() {
            let at_five = record(json!({ "schemaVersion": 5 }));
            let pending: Vec<(u32, &str)> = pending_migrations(&at_five)
                .map(|m| (m.version, m.description))
                .collect();
            assert_eq!(
                pending,
                vec![
                    (6, "ensure the purse is carried"),
                    (7, "backfill partial legacy records"),
                    (8, "add day tracking"),
                ]
            );
            assert_eq!(pending_migrations(&migrate(at_five)).count(), 0);
        }

        #[test]
        fn newer_record_is_left_alone() {
            let future = record(json!({ "schemaVersion": 99, "book": "unknown" }));
            assert_eq!(migrate(future.clone()), future);
        }

        #[test]
        fn only_later_steps_run() {
            // Already at version 4: the book title is no longer converted.
            let partial = record(json!({ "schemaVersion": 4, "book": "odd" }));
            let migrated = migrate(partial);
            assert_eq!(migrated["book"], json!("odd"));
            assert_eq!(migrated["schemaVersion"], json!(CURRENT_SCHEMA_VERSION));
        }
    }

    mod steps {
        use super::*;

        #[test]
        fn game_mode_defaults_to_mortal() {
            let migrated = step(2)(RawRecord::new());
            assert_eq!(migrated["gameMode"], json!("mortal"));

            let kept = step(2)(record(json!({ "gameMode": "narrative" })));
            assert_eq!(kept["gameMode"], json!("narrative"));
        }

        #[test]
        fn constitution_defaults_to_null() {
            let migrated = step(3)(record(json!({ "stats": { "dexterity": 7 } })));
            assert_eq!(migrated["stats"]["constitution"], Value::Null);
            assert_eq!(migrated["stats"]["dexterity"], json!(7));

            let kept = step(3)(record(json!({ "stats": { "constitution": 4 } })));
            assert_eq!(kept["stats"]["constitution"], json!(4));
        }

        #[test]
        fn book_titles_become_numbers() {
            let cases = [
                (json!("La Harpe des Quatre Saisons"), json!(1)),
                (json!("La Confrérie de NUADA"), json!(2)),
                (json!("Les Entrailles du temps"), json!(3)),
                (json!("  les entrailles du temps "), json!(3)),
                (json!("2"), json!(2)),
                (json!("Some other book"), json!(1)),
                (json!(3), json!(3)),
                (Value::Null, json!(1)),
            ];
            for (book, expected) in cases {
                let migrated = step(4)(record(json!({ "book": book })));
                assert_eq!(migrated["book"], expected, "book {}", book);
            }
        }

        #[test]
        fn reputation_depends_on_book() {
            let two = step(5)(record(json!({ "book": 2, "stats": {} })));
            assert_eq!(two["stats"]["reputation"], json!(0));

            let one = step(5)(record(json!({ "book": 1, "stats": {} })));
            assert_eq!(one["stats"]["reputation"], Value::Null);

            let kept = step(5)(record(json!({ "book": 2, "stats": { "reputation": 6 } })));
            assert_eq!(kept["stats"]["reputation"], json!(6));
        }

        #[test]
        fn purse_inserted_at_head_once() {
            let migrated = step(6)(record(json!({
                "inventory": { "items": [{ "name": "Rope" }] }
            })));
            let items = migrated["inventory"]["items"].as_array().unwrap();
            assert_eq!(items.len(), 2);
            assert_eq!(items[0]["name"], json!("Purse"));
            assert_eq!(items[0]["kind"], json!("special"));

            let again = step(6)(migrated.clone());
            assert_eq!(again, migrated);
        }

        #[test]
        fn backfill_fills_partial_shapes() {
            let migrated = step(7)(record(json!({
                "createdAt": "2023-01-01T00:00:00Z",
                "inventory": {
                    "weapon": { "name": "Club" },
                    "items": [{ "name": "Purse" }, { "name": "Map", "type": "special" }]
                },
                "progress": { "currentPosition": 30 }
            })));

            assert_eq!(migrated["notes"], json!(""));
            assert_eq!(migrated["talent"], json!(""));
            assert_eq!(migrated["updatedAt"], json!("2023-01-01T00:00:00Z"));
            assert_eq!(migrated["inventory"]["currency"], json!(0));
            assert_eq!(migrated["inventory"]["weapon"]["attackBonus"], json!(0));
            assert_eq!(migrated["inventory"]["items"][0]["kind"], json!("item"));
            assert_eq!(migrated["inventory"]["items"][0]["possessed"], json!(true));
            assert_eq!(migrated["inventory"]["items"][1]["kind"], json!("special"));
            assert_eq!(migrated["progress"]["history"], json!([30]));
            assert_eq!(
                migrated["progress"]["lastSavedAt"],
                json!("2023-01-01T00:00:00Z")
            );
        }

        #[test]
        fn backfill_without_any_timestamp_uses_epoch() {
            let migrated = step(7)(RawRecord::new());
            assert_eq!(migrated["createdAt"], json!(EPOCH));
            assert_eq!(migrated["updatedAt"], json!(EPOCH));
            assert_eq!(migrated["progress"]["lastSavedAt"], json!(EPOCH));
            assert_eq!(migrated["progress"]["currentPosition"], json!(1));
        }

        #[test]
        fn day_tracking_depends_on_book() {
            let two = step(8)(record(json!({ "book": 2, "progress": {} })));
            assert_eq!(two["progress"]["daysElapsed"], json!(0));
            assert_eq!(two["progress"]["nextWakeUpPosition"], Value::Null);

            let three = step(8)(record(json!({ "book": 3, "progress": {} })));
            assert_eq!(three["progress"]["daysElapsed"], Value::Null);

            let kept = step(8)(record(json!({
                "book": 2,
                "progress": { "daysElapsed": 3, "nextWakeUpPosition": 120 }
            })));
            assert_eq!(kept["progress"]["daysElapsed"], json!(3));
            assert_eq!(kept["progress"]["nextWakeUpPosition"], json!(120));
        }

        #[test]
        fn non_object_sections_are_replaced() {
            let migrated = migrate(record(json!({
                "stats": 12,
                "inventory": "full",
                "progress": [1, 2]
            })));
            assert!(migrated["stats"].is_object());
            assert!(migrated["inventory"].is_object());
            assert!(migrated["progress"].is_object());
            assert_eq!(migrated["inventory"]["items"][0]["name"], json!("Purse"));
        }
    }

    mod chain {
        use super::*;

        #[test]
        fn legacy_record_reaches_current_shape() {
            let migrated = migrate(legacy_record());

            assert_eq!(migrated["schemaVersion"], json!(CURRENT_SCHEMA_VERSION));
            assert_eq!(migrated["book"], json!(2));
            assert_eq!(migrated["gameMode"], json!("mortal"));
            assert_eq!(migrated["stats"]["constitution"], Value::Null);
            assert_eq!(migrated["stats"]["reputation"], json!(0));
            assert_eq!(migrated["progress"]["daysElapsed"], json!(0));
            assert_eq!(migrated["progress"]["history"], json!([1, 22, 57]));
            assert_eq!(migrated["inventory"]["weapon"]["attackBonus"], json!(0));

            let items = migrated["inventory"]["items"].as_array().unwrap();
            assert_eq!(items[0]["name"], json!("Purse"));
            assert_eq!(items[1]["name"], json!("Rope"));
            assert_eq!(items[1]["kind"], json!("item"));
            assert_eq!(migrated["notes"], json!("Met the ferryman"));
        }

        #[test]
        fn migrate_is_idempotent() {
            let once = migrate(legacy_record());
            assert_eq!(migrate(once.clone()), once);
        }
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z ]{0,12}".prop_map(Value::from),
        ]
    }

    fn section() -> impl Strategy<Value = Value> {
        let keys = prop::sample::select(vec![
            "dexterity",
            "items",
            "weapon",
            "currency",
            "history",
            "currentPosition",
            "name",
        ]);
        prop_oneof![
            leaf(),
            prop::collection::btree_map(keys, leaf(), 0..5).prop_map(|map| {
                Value::Object(map.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
            }),
        ]
    }

    proptest! {
        #[test]
        fn migration_never_panics_and_is_idempotent(
            book in leaf(),
            version in leaf(),
            stats in section(),
            inventory in section(),
            progress in section(),
        ) {
            let raw = record(json!({
                "book": book,
                "schemaVersion": version,
                "stats": stats,
                "inventory": inventory,
                "progress": progress,
            }));
            let once = migrate(raw);
            prop_assert_eq!(record_version(&once) >= CURRENT_SCHEMA_VERSION, true);
            prop_assert_eq!(migrate(once.clone()), once);
        }
    }
}
