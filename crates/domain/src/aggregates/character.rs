//! Character aggregate - the reader's adventure sheet
//!
//! # Design Decisions
//!
//! - **Immutable**: every mutator takes `&self` and returns a new `Character`
//! - **Explicit time**: operations that stamp `updated_at` receive `now`
//! - **Edition gating**: book 2 carries reputation and day tracking, other
//!   books never do (applied on creation, duplication, `update_book` and
//!   hydration)

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::ids::CharacterId;
use crate::records::{self, CharacterData, RawRecord, CURRENT_SCHEMA_VERSION};
use crate::value_objects::{
    Book, CharacterName, GameMode, Inventory, InventoryItem, Progress, Stats, StatsPatch, Weapon,
};

/// A character sheet for one play-through of one book.
///
/// # Invariants
///
/// - `name` is non-empty after trimming and at most 200 characters
/// - `stats`, `inventory` and `progress` satisfy their own invariants
/// - `reputation` is present only for book 2; so are `days_elapsed` and
///   `next_wake_up_position`
/// - `id` and `created_at` never change after creation
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use gamebook_domain::aggregates::Character;
/// use gamebook_domain::value_objects::{Book, CharacterName, Stats};
///
/// let now = Utc::now();
/// let name = CharacterName::new("Aldric").unwrap();
/// let stats = Stats::new(9, 7, 20).unwrap();
/// let character = Character::create(name, Book::new(2).unwrap(), stats, now);
///
/// assert_eq!(character.progress().history(), &[1]);
/// assert_eq!(character.stats().reputation(), Some(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    id: CharacterId,
    name: CharacterName,
    book: Book,
    /// Free-form specialization label, no mechanical effect
    talent: String,
    game_mode: GameMode,
    schema_version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    stats: Stats,
    inventory: Inventory,
    progress: Progress,
    notes: String,
}

impl Character {
    /// Create a brand-new character at the start of `book`.
    ///
    /// Inventory starts with only the purse and progress at paragraph 1.
    /// Edition-gated fields are set from the book: reputation 0 and day
    /// count 0 for book 2, absent otherwise.
    pub fn create(name: CharacterName, book: Book, stats: Stats, now: DateTime<Utc>) -> Self {
        let stats = gate_reputation(&stats, book);
        Self {
            id: CharacterId::new(),
            name,
            book,
            talent: String::new(),
            game_mode: GameMode::default(),
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: now,
            updated_at: now,
            stats,
            inventory: Inventory::new(),
            progress: Progress::start(book.starting_days_elapsed(), now),
            notes: String::new(),
        }
    }

    /// Set the talent chosen at creation.
    pub fn with_talent(mut self, talent: impl Into<String>) -> Self {
        self.talent = talent.into();
        self
    }

    /// Set the game mode chosen at creation.
    pub fn with_game_mode(mut self, game_mode: GameMode) -> Self {
        self.game_mode = game_mode;
        self
    }

    /// A fresh character with the same stats, book, talent and mode.
    ///
    /// Identity, inventory, progress and notes start over; the name gets a
    /// ` (Copy)` suffix.
    pub fn duplicate(&self, now: DateTime<Utc>) -> Self {
        Self::create(self.name.copy_name(), self.book, self.stats.clone(), now)
            .with_talent(self.talent.clone())
            .with_game_mode(self.game_mode)
    }

    // =========================================================================
    // Persistence boundary
    // =========================================================================

    /// Rebuild a character from a record already at the current schema.
    ///
    /// Every invariant is re-checked. Records at any other schema version are
    /// rejected; run them through [`records::migrate`] first (or use
    /// [`Character::hydrate`]).
    pub fn from_data(data: CharacterData) -> Result<Self, DomainError> {
        if data.schema_version != CURRENT_SCHEMA_VERSION {
            return Err(DomainError::validation(format!(
                "Record is at schema version {}, expected {}",
                data.schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        let book = u8::try_from(data.book)
            .map_err(|_| DomainError::validation(format!("Book must be between 1 and 3, got {}", data.book)))
            .and_then(Book::new)?;
        let stats = Stats::from_data(&data.stats)?;
        let progress = Progress::from_data(&data.progress)?;
        if !book.has_reputation() && stats.reputation().is_some() {
            return Err(DomainError::validation(format!(
                "{} does not track reputation",
                book
            )));
        }
        if !book.tracks_days()
            && (progress.days_elapsed().is_some() || progress.next_wake_up_position().is_some())
        {
            return Err(DomainError::validation(format!(
                "{} does not track elapsed days",
                book
            )));
        }

        Ok(Self {
            id: CharacterId::parse(data.id)?,
            name: CharacterName::new(data.name)?,
            book,
            talent: data.talent,
            game_mode: data.game_mode,
            schema_version: data.schema_version,
            created_at: data.created_at,
            updated_at: data.updated_at,
            stats,
            inventory: Inventory::from_data(&data.inventory)?,
            progress,
            notes: data.notes,
        })
    }

    /// Snapshot for storage, stamped with `now` as the update time.
    pub fn to_data(&self, now: DateTime<Utc>) -> CharacterData {
        CharacterData {
            id: self.id.to_string(),
            name: self.name.to_string(),
            book: i32::from(self.book.number()),
            talent: self.talent.clone(),
            game_mode: self.game_mode,
            schema_version: self.schema_version,
            created_at: self.created_at,
            updated_at: now.max(self.updated_at),
            stats: self.stats.to_data(),
            inventory: self.inventory.to_data(),
            progress: self.progress.to_data(),
            notes: self.notes.clone(),
        }
    }

    /// Migrate, deserialize and validate a stored record.
    pub fn hydrate(raw: RawRecord) -> Result<Self, DomainError> {
        Self::from_data(records::from_raw(records::migrate(raw))?)
    }

    /// Raw storage form of [`Character::to_data`].
    pub fn to_record(&self, now: DateTime<Utc>) -> Result<RawRecord, DomainError> {
        records::to_raw(&self.to_data(now))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> &CharacterId {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    #[inline]
    pub fn book(&self) -> Book {
        self.book
    }

    #[inline]
    pub fn talent(&self) -> &str {
        &self.talent
    }

    #[inline]
    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    #[inline]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[inline]
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    #[inline]
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    #[inline]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    #[inline]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Returns true once health has reached 0.
    pub fn is_dead(&self) -> bool {
        self.stats.is_dead()
    }

    /// Returns true when alive with at most a quarter of maximum health.
    pub fn is_critical_health(&self) -> bool {
        self.stats.is_critical_health()
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    fn touched(&self, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now,
            ..self.clone()
        }
    }

    fn with_stats(&self, stats: Stats, now: DateTime<Utc>) -> Self {
        Self {
            stats,
            ..self.touched(now)
        }
    }

    fn with_inventory(&self, inventory: Inventory, now: DateTime<Utc>) -> Self {
        Self {
            inventory,
            ..self.touched(now)
        }
    }

    fn with_progress(&self, progress: Progress, now: DateTime<Utc>) -> Self {
        Self {
            progress,
            ..self.touched(now)
        }
    }

    pub fn update_name(&self, name: impl Into<String>, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(Self {
            name: CharacterName::new(name)?,
            ..self.touched(now)
        })
    }

    pub fn update_stats(&self, patch: &StatsPatch, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let stats = self.stats.update(patch)?;
        if !self.book.has_reputation() && stats.reputation().is_some() {
            return Err(DomainError::validation(format!(
                "{} does not track reputation",
                self.book
            )));
        }
        Ok(self.with_stats(stats, now))
    }

    pub fn take_damage(&self, amount: i32, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(self.with_stats(self.stats.take_damage(amount)?, now))
    }

    pub fn heal(&self, amount: i32, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(self.with_stats(self.stats.heal(amount)?, now))
    }

    pub fn decrease_luck(&self, now: DateTime<Utc>) -> Self {
        self.with_stats(self.stats.decrease_luck(), now)
    }

    pub fn restore_luck(&self, now: DateTime<Utc>) -> Self {
        self.with_stats(self.stats.restore_luck(), now)
    }

    pub fn equip_weapon(&self, weapon: Weapon, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(self.with_inventory(self.inventory.equip_weapon(weapon)?, now))
    }

    pub fn unequip_weapon(&self, now: DateTime<Utc>) -> Self {
        self.with_inventory(self.inventory.unequip_weapon(), now)
    }

    pub fn add_item(&self, item: InventoryItem, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(self.with_inventory(self.inventory.add_item(item)?, now))
    }

    pub fn remove_item(&self, index: usize, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(self.with_inventory(self.inventory.remove_item(index)?, now))
    }

    pub fn toggle_item_possession(&self, index: usize, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(self.with_inventory(self.inventory.toggle_item_possession(index)?, now))
    }

    pub fn add_currency(&self, amount: i32, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(self.with_inventory(self.inventory.add_currency(amount)?, now))
    }

    pub fn remove_currency(&self, amount: i32, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(self.with_inventory(self.inventory.remove_currency(amount)?, now))
    }

    pub fn go_to_paragraph(&self, paragraph: i32, now: DateTime<Utc>) -> Result<Self, DomainError> {
        Ok(self.with_progress(self.progress.go_to_paragraph(paragraph, now)?, now))
    }

    pub fn update_days_elapsed(&self, days: i32, now: DateTime<Utc>) -> Result<Self, DomainError> {
        self.require_day_tracking()?;
        Ok(self.with_progress(self.progress.update_days_elapsed(days)?, now))
    }

    pub fn update_next_wake_up_paragraph(
        &self,
        paragraph: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        self.require_day_tracking()?;
        Ok(self.with_progress(self.progress.update_next_wake_up_paragraph(paragraph)?, now))
    }

    pub fn update_notes(&self, notes: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            notes: notes.into(),
            ..self.touched(now)
        }
    }

    pub fn update_talent(&self, talent: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            talent: talent.into(),
            ..self.touched(now)
        }
    }

    pub fn update_game_mode(&self, game_mode: GameMode, now: DateTime<Utc>) -> Self {
        Self {
            game_mode,
            ..self.touched(now)
        }
    }

    /// Switch to another book, adding or dropping edition-gated fields.
    pub fn update_book(&self, number: u8, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let book = Book::new(number)?;
        let progress = if book.tracks_days() {
            self.progress.with_day_tracking(
                self.progress.days_elapsed().or(book.starting_days_elapsed()),
                self.progress.next_wake_up_position(),
            )
        } else {
            self.progress.with_day_tracking(None, None)
        };
        Ok(Self {
            book,
            stats: gate_reputation(&self.stats, book),
            progress,
            ..self.touched(now)
        })
    }

    fn require_day_tracking(&self) -> Result<(), DomainError> {
        if !self.book.tracks_days() {
            return Err(DomainError::validation(format!(
                "{} does not track elapsed days",
                self.book
            )));
        }
        Ok(())
    }
}

/// Keep an existing reputation when the book tracks one, otherwise drop it.
fn gate_reputation(stats: &Stats, book: Book) -> Stats {
    if book.has_reputation() {
        stats.with_reputation(stats.reputation().or(book.starting_reputation()))
    } else {
        stats.with_reputation(None)
    }
}
