//! Runtime settings read from the environment
//!
//! | Variable            | Meaning                          | Default              |
//! |---------------------|----------------------------------|----------------------|
//! | `GAMEBOOK_DATA_DIR` | directory of JSON records        | `./data/characters`  |
//! | `GAMEBOOK_STORAGE`  | `file` or `memory`               | `file`               |
//! | `GAMEBOOK_DRY_RUN`  | report upgrades without writing  | `false`              |
//!
//! Malformed values fall back to the default with a warning.

use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_DIR: &str = "./data/characters";

const DATA_DIR_VAR: &str = "GAMEBOOK_DATA_DIR";
const STORAGE_VAR: &str = "GAMEBOOK_STORAGE";
const DRY_RUN_VAR: &str = "GAMEBOOK_DRY_RUN";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageKind {
    /// One JSON file per character under the data directory
    #[default]
    File,
    /// Process-local map, nothing survives a restart
    Memory,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" | "json" => Ok(Self::File),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(format!("unknown storage kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    pub dry_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage: StorageKind::default(),
            dry_run: false,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns a variable's raw value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_dir = lookup(DATA_DIR_VAR)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let storage = match lookup(STORAGE_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(variable = STORAGE_VAR, error = %e, "Falling back to file storage");
                defaults.storage
            }),
            None => defaults.storage,
        };

        let dry_run = match lookup(DRY_RUN_VAR) {
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                tracing::warn!(variable = DRY_RUN_VAR, value = %raw, "Not a boolean, dry run disabled");
                defaults.dry_run
            }),
            None => defaults.dry_run,
        };

        Self {
            data_dir,
            storage,
            dry_run,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
