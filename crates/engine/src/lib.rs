//! Gamebook Engine library.
//!
//! Application layer around the `gamebook-domain` crate.
//!
//! ## Structure
//!
//! - `use_cases/` - Character, combat and record maintenance operations
//! - `infrastructure/` - Ports plus their adapters (storage, clock, random, settings)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
