//! Unified error types for the domain layer
//!
//! Every value object and the `Character` aggregate report failures through
//! [`DomainError`]. Capacity, funds and protected-item errors are refinements of
//! validation and report `true` from [`DomainError::is_validation`].

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Inventory is at capacity
    #[error("Inventory full: {current}/{max} items")]
    InventoryFull { current: usize, max: usize },

    /// Not enough currency for a removal
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i32, available: i32 },

    /// Attempt to discard an item that must always be carried
    #[error("Item cannot be discarded: {0}")]
    ProtectedItem(String),

    /// Positional access outside a list
    #[error("Index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Record could not be decoded into domain types
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if dexterity < 1 {
    ///     return Err(DomainError::validation("Dexterity must be at least 1"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an inventory full error
    pub fn inventory_full(current: usize, max: usize) -> Self {
        Self::InventoryFull { current, max }
    }

    /// Create an insufficient funds error
    pub fn insufficient_funds(requested: i32, available: i32) -> Self {
        Self::InsufficientFunds {
            requested,
            available,
        }
    }

    /// Create a protected item error
    pub fn protected_item(name: impl Into<String>) -> Self {
        Self::ProtectedItem(name.into())
    }

    /// Create an index out of range error
    pub fn index_out_of_range(index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Creates a parse error for records that cannot be decoded.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// True for validation errors and their business-rule refinements.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InventoryFull { .. }
                | Self::InsufficientFunds { .. }
                | Self::ProtectedItem(_)
                | Self::IndexOutOfRange { .. }
        )
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
