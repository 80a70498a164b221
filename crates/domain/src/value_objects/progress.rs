//! Progress - where the reader is in the book and where they have been

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::records::ProgressData;

/// Highest value of the day counter.
pub const MAX_DAYS_ELAPSED: i32 = 4;

/// Reading position, visit history and the optional day tracking of book 2.
///
/// # Invariants
///
/// - `current_position >= 1`, every history entry `>= 1`
/// - `history` only ever grows, one entry per move, duplicates allowed
/// - `days_elapsed`, when present, is within `0..=4`
/// - `next_wake_up_position`, when present, is `>= 1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    current_position: i32,
    history: Vec<i32>,
    last_saved_at: DateTime<Utc>,
    days_elapsed: Option<i32>,
    next_wake_up_position: Option<i32>,
}

impl Progress {
    /// Progress of a reader opening the book at paragraph 1.
    pub fn start(days_elapsed: Option<i32>, now: DateTime<Utc>) -> Self {
        Self {
            current_position: 1,
            history: vec![1],
            last_saved_at: now,
            days_elapsed,
            next_wake_up_position: None,
        }
    }

    pub fn from_data(data: &ProgressData) -> Result<Self, DomainError> {
        let progress = Self {
            current_position: data.current_position,
            history: data.history.clone(),
            last_saved_at: data.last_saved_at,
            days_elapsed: data.days_elapsed,
            next_wake_up_position: data.next_wake_up_position,
        };
        check_position(progress.current_position)?;
        if let Some(bad) = progress.history.iter().find(|p| **p < 1) {
            return Err(DomainError::validation(format!(
                "History contains invalid paragraph {}",
                bad
            )));
        }
        if let Some(days) = progress.days_elapsed {
            check_days(days)?;
        }
        if let Some(position) = progress.next_wake_up_position {
            check_position(position)?;
        }
        Ok(progress)
    }

    pub fn to_data(&self) -> ProgressData {
        ProgressData {
            current_position: self.current_position,
            history: self.history.clone(),
            last_saved_at: self.last_saved_at,
            days_elapsed: self.days_elapsed,
            next_wake_up_position: self.next_wake_up_position,
        }
    }

    pub fn current_position(&self) -> i32 {
        self.current_position
    }

    pub fn history(&self) -> &[i32] {
        &self.history
    }

    pub fn last_saved_at(&self) -> DateTime<Utc> {
        self.last_saved_at
    }

    pub fn days_elapsed(&self) -> Option<i32> {
        self.days_elapsed
    }

    pub fn next_wake_up_position(&self) -> Option<i32> {
        self.next_wake_up_position
    }

    /// Move to `paragraph`, recording the visit.
    pub fn go_to_paragraph(&self, paragraph: i32, now: DateTime<Utc>) -> Result<Self, DomainError> {
        check_position(paragraph)?;
        let mut history = self.history.clone();
        history.push(paragraph);
        Ok(Self {
            current_position: paragraph,
            history,
            last_saved_at: now,
            ..self.clone()
        })
    }

    pub fn update_days_elapsed(&self, days: i32) -> Result<Self, DomainError> {
        check_days(days)?;
        Ok(Self {
            days_elapsed: Some(days),
            ..self.clone()
        })
    }

    pub fn update_next_wake_up_paragraph(&self, paragraph: Option<i32>) -> Result<Self, DomainError> {
        if let Some(position) = paragraph {
            check_position(position)?;
        }
        Ok(Self {
            next_wake_up_position: paragraph,
            ..self.clone()
        })
    }

    /// Replace both day-tracking fields at once (edition changes).
    pub(crate) fn with_day_tracking(&self, days_elapsed: Option<i32>, next_wake_up: Option<i32>) -> Self {
        Self {
            days_elapsed,
            next_wake_up_position: next_wake_up,
            ..self.clone()
        }
    }
}

fn check_position(paragraph: i32) -> Result<(), DomainError> {
    if paragraph < 1 {
        return Err(DomainError::validation(format!(
            "Paragraph number must be at least 1, got {}",
            paragraph
        )));
    }
    Ok(())
}

fn check_days(days: i32) -> Result<(), DomainError> {
    if !(0..=MAX_DAYS_ELAPSED).contains(&days) {
        return Err(DomainError::validation(format!(
            "Days elapsed must be between 0 and {}, got {}",
            MAX_DAYS_ELAPSED, days
        )));
    }
    Ok(())
}
