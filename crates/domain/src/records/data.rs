//! Persisted record shapes
//!
//! These structs mirror the stored JSON exactly (camelCase keys). They carry
//! no invariants of their own; `Character::from_data` and the value objects'
//! `from_data` constructors validate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{GameMode, InventoryItem, Weapon};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterData {
    pub id: String,
    pub name: String,
    pub book: i32,
    pub talent: String,
    pub game_mode: GameMode,
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub stats: StatsData,
    pub inventory: InventoryData,
    pub progress: ProgressData,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub dexterity: i32,
    #[serde(default)]
    pub constitution: Option<i32>,
    pub luck: i32,
    pub initial_luck: i32,
    pub max_health: i32,
    pub current_health: i32,
    #[serde(default)]
    pub reputation: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryData {
    pub currency: i32,
    #[serde(default)]
    pub weapon: Option<Weapon>,
    pub items: Vec<InventoryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    pub current_position: i32,
    pub history: Vec<i32>,
    pub last_saved_at: DateTime<Utc>,
    #[serde(default)]
    pub days_elapsed: Option<i32>,
    #[serde(default)]
    pub next_wake_up_position: Option<i32>,
}
