//! Aggregate roots - domain objects that own their related data
//!
//! An aggregate:
//! - Has a unique identity
//! - Owns all its constituent value objects
//! - Exposes behavior through methods, not public fields
//! - Never mutates in place: every operation returns a new value

pub mod character;

pub use character::Character;
