//! Book (edition) selector and game mode
//!
//! The edition decides which optional fields a character carries. Book 2 is
//! the only edition with a reputation score and day tracking; every other
//! edition leaves those fields absent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Which book of the series a character plays through (1..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Book(u8);

impl Book {
    pub const FIRST: u8 = 1;
    pub const LAST: u8 = 3;

    pub fn new(number: u8) -> Result<Self, DomainError> {
        if !(Self::FIRST..=Self::LAST).contains(&number) {
            return Err(DomainError::validation(format!(
                "Book must be between {} and {}, got {}",
                Self::FIRST,
                Self::LAST,
                number
            )));
        }
        Ok(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Whether characters of this edition track a reputation score.
    pub fn has_reputation(self) -> bool {
        self.0 == 2
    }

    /// Whether characters of this edition track elapsed days and wake-ups.
    pub fn tracks_days(self) -> bool {
        self.0 == 2
    }

    /// Reputation a new character of this edition starts with.
    pub fn starting_reputation(self) -> Option<i32> {
        self.has_reputation().then_some(0)
    }

    /// Day count a new character of this edition starts with.
    pub fn starting_days_elapsed(self) -> Option<i32> {
        self.tracks_days().then_some(0)
    }
}

impl TryFrom<u8> for Book {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Book> for u8 {
    fn from(book: Book) -> u8 {
        book.0
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Book {}", self.0)
    }
}

/// Rule strictness chosen at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Story only, combat outcomes are chosen freely
    Narrative,
    /// Combat is resolved but death is not final
    Simplified,
    /// Full rules, death ends the adventure
    #[default]
    Mortal,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Narrative => "narrative",
            Self::Simplified => "simplified",
            Self::Mortal => "mortal",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "narrative" => Ok(Self::Narrative),
            "simplified" => Ok(Self::Simplified),
            "mortal" => Ok(Self::Mortal),
            _ => Err(DomainError::parse(format!("Unknown game mode: {}", s))),
        }
    }
}
