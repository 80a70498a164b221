//! Stats - a character's attributes and endurance
//!
//! Immutable value object. Every operation validates the complete set of
//! bounds and returns a new instance; the only clamping operations are
//! `decrease_luck`, `take_damage` and `heal`.

use crate::error::DomainError;
use crate::records::StatsData;

/// Numeric attributes and health of a character.
///
/// # Invariants
///
/// - `dexterity >= 1`
/// - `constitution`, when present, is `>= 0`
/// - `luck >= 0` and `initial_luck >= 0`
/// - `max_health >= 1` and `0 <= current_health <= max_health`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    dexterity: i32,
    constitution: Option<i32>,
    luck: i32,
    initial_luck: i32,
    max_health: i32,
    current_health: i32,
    reputation: Option<i32>,
}

/// Partial change set for [`Stats::update`].
///
/// `None` leaves a field untouched. The optional attributes use a nested
/// option so they can be cleared: `Some(None)` removes the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsPatch {
    pub dexterity: Option<i32>,
    pub constitution: Option<Option<i32>>,
    pub luck: Option<i32>,
    pub initial_luck: Option<i32>,
    pub max_health: Option<i32>,
    pub current_health: Option<i32>,
    pub reputation: Option<Option<i32>>,
}

impl StatsPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dexterity(mut self, value: i32) -> Self {
        self.dexterity = Some(value);
        self
    }

    pub fn constitution(mut self, value: Option<i32>) -> Self {
        self.constitution = Some(value);
        self
    }

    pub fn luck(mut self, value: i32) -> Self {
        self.luck = Some(value);
        self
    }

    pub fn initial_luck(mut self, value: i32) -> Self {
        self.initial_luck = Some(value);
        self
    }

    pub fn max_health(mut self, value: i32) -> Self {
        self.max_health = Some(value);
        self
    }

    pub fn current_health(mut self, value: i32) -> Self {
        self.current_health = Some(value);
        self
    }

    pub fn reputation(mut self, value: Option<i32>) -> Self {
        self.reputation = Some(value);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Stats {
    /// Starting stats for a fresh character: full health, luck at its initial value.
    pub fn new(dexterity: i32, luck: i32, max_health: i32) -> Result<Self, DomainError> {
        Self {
            dexterity,
            constitution: None,
            luck,
            initial_luck: luck,
            max_health,
            current_health: max_health,
            reputation: None,
        }
        .validated()
    }

    /// Rebuild stats from their persisted form, re-checking every bound.
    pub fn from_data(data: &StatsData) -> Result<Self, DomainError> {
        Self {
            dexterity: data.dexterity,
            constitution: data.constitution,
            luck: data.luck,
            initial_luck: data.initial_luck,
            max_health: data.max_health,
            current_health: data.current_health,
            reputation: data.reputation,
        }
        .validated()
    }

    pub fn to_data(&self) -> StatsData {
        StatsData {
            dexterity: self.dexterity,
            constitution: self.constitution,
            luck: self.luck,
            initial_luck: self.initial_luck,
            max_health: self.max_health,
            current_health: self.current_health,
            reputation: self.reputation,
        }
    }

    fn validated(self) -> Result<Self, DomainError> {
        if self.dexterity < 1 {
            return Err(DomainError::validation("Dexterity must be at least 1"));
        }
        if matches!(self.constitution, Some(c) if c < 0) {
            return Err(DomainError::validation("Constitution cannot be negative"));
        }
        if self.luck < 0 {
            return Err(DomainError::validation("Luck cannot be negative"));
        }
        if self.initial_luck < 0 {
            return Err(DomainError::validation("Initial luck cannot be negative"));
        }
        if self.max_health < 1 {
            return Err(DomainError::validation("Maximum health must be at least 1"));
        }
        if self.current_health < 0 {
            return Err(DomainError::validation("Current health cannot be negative"));
        }
        if self.current_health > self.max_health {
            return Err(DomainError::validation(format!(
                "Current health {} exceeds maximum {}",
                self.current_health, self.max_health
            )));
        }
        Ok(self)
    }

    // ──────────────────────────────────────────────────────────────────────────
    // Read accessors
    // ──────────────────────────────────────────────────────────────────────────

    pub fn dexterity(&self) -> i32 {
        self.dexterity
    }

    pub fn constitution(&self) -> Option<i32> {
        self.constitution
    }

    pub fn luck(&self) -> i32 {
        self.luck
    }

    pub fn initial_luck(&self) -> i32 {
        self.initial_luck
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn current_health(&self) -> i32 {
        self.current_health
    }

    pub fn reputation(&self) -> Option<i32> {
        self.reputation
    }

    // ──────────────────────────────────────────────────────────────────────────
    // Transformations (return a new instance)
    // ──────────────────────────────────────────────────────────────────────────

    /// Merge `patch` over the current values; the whole update is rejected if
    /// the merged result breaks any bound.
    pub fn update(&self, patch: &StatsPatch) -> Result<Self, DomainError> {
        Self {
            dexterity: patch.dexterity.unwrap_or(self.dexterity),
            constitution: patch.constitution.unwrap_or(self.constitution),
            luck: patch.luck.unwrap_or(self.luck),
            initial_luck: patch.initial_luck.unwrap_or(self.initial_luck),
            max_health: patch.max_health.unwrap_or(self.max_health),
            current_health: patch.current_health.unwrap_or(self.current_health),
            reputation: patch.reputation.unwrap_or(self.reputation),
        }
        .validated()
    }

    /// Spend one point of luck after a luck test. Never goes below zero.
    pub fn decrease_luck(&self) -> Self {
        Self {
            luck: (self.luck - 1).max(0),
            ..self.clone()
        }
    }

    /// Bring luck back to its starting value.
    pub fn restore_luck(&self) -> Self {
        Self {
            luck: self.initial_luck,
            ..self.clone()
        }
    }

    pub fn take_damage(&self, amount: i32) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation("Damage cannot be negative"));
        }
        Ok(Self {
            current_health: self.current_health.saturating_sub(amount).max(0),
            ..self.clone()
        })
    }

    pub fn heal(&self, amount: i32) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation("Healing cannot be negative"));
        }
        Ok(Self {
            current_health: self
                .current_health
                .saturating_add(amount)
                .min(self.max_health),
            ..self.clone()
        })
    }

    /// Replace the edition-gated reputation score.
    pub(crate) fn with_reputation(&self, reputation: Option<i32>) -> Self {
        Self {
            reputation,
            ..self.clone()
        }
    }

    // ──────────────────────────────────────────────────────────────────────────
    // Queries
    // ──────────────────────────────────────────────────────────────────────────

    pub fn is_dead(&self) -> bool {
        self.current_health == 0
    }

    /// At or below a quarter of maximum health (integer division), but alive.
    pub fn is_critical_health(&self) -> bool {
        self.current_health > 0 && self.current_health <= self.max_health / 4
    }
}
