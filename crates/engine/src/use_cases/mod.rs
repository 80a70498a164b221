//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.

pub mod character;
pub mod combat;
pub mod maintenance;

// Re-export main types
pub use character::{CharacterError, CharacterOps, CreateCharacter};
pub use combat::{CombatError, CombatOps};
pub use maintenance::{MaintenanceError, MaintenanceReport, RecordMaintenance};
