//! Gamebook character sheet domain
//!
//! Pure core: no I/O, no clock, no random number generator. Time and dice are
//! always passed in by the caller.

pub mod aggregates;
pub mod combat;
pub mod error;
pub mod ids;
pub mod records;
pub mod value_objects;

pub use aggregates::Character;
pub use combat::{
    apply_damage, calculate_damage, check_hit, resolve_round, CombatRound, CombatSession,
    CombatStatus, Combatant, Enemy, Side,
};
pub use error::DomainError;
pub use ids::CharacterId;
pub use records::{CharacterData, RawRecord, CURRENT_SCHEMA_VERSION};
pub use value_objects::{
    Book, CharacterName, DiceRolls, DieSource, GameMode, Inventory, InventoryItem, ItemKind,
    Progress, ScriptedDice, Stats, StatsPatch, Weapon,
};
