//! Character use cases.
//!
//! Load a character, apply one domain operation stamped with the clock's
//! time, store the result. Every operation returns the updated character.

mod error;

pub use error::CharacterError;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gamebook_domain::{
    Book, Character, CharacterId, CharacterName, DomainError, GameMode, InventoryItem, Stats,
    StatsPatch, Weapon,
};

use crate::infrastructure::ports::{CharacterRepo, ClockPort, RepoError};

/// Everything chosen on the creation screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCharacter {
    pub name: String,
    pub book: u8,
    pub talent: String,
    pub game_mode: GameMode,
    pub dexterity: i32,
    pub luck: i32,
    pub max_health: i32,
    pub constitution: Option<i32>,
}

/// Character operations.
pub struct CharacterOps {
    repo: Arc<dyn CharacterRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CharacterOps {
    pub fn new(repo: Arc<dyn CharacterRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { repo, clock }
    }

    pub async fn create(&self, input: CreateCharacter) -> Result<Character, CharacterError> {
        let name = CharacterName::new(input.name)?;
        let book = Book::new(input.book)?;
        let mut stats = Stats::new(input.dexterity, input.luck, input.max_health)?;
        if input.constitution.is_some() {
            stats = stats.update(&StatsPatch::new().constitution(input.constitution))?;
        }

        let character = Character::create(name, book, stats, self.clock.now())
            .with_talent(input.talent)
            .with_game_mode(input.game_mode);
        self.repo.save(&character).await?;

        tracing::info!(
            character_id = %character.id(),
            book = book.number(),
            game_mode = %character.game_mode(),
            "Character created"
        );
        Ok(character)
    }

    pub async fn get(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::not_found("Character", id).into())
    }

    pub async fn list(&self) -> Result<Vec<Character>, CharacterError> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn delete(&self, id: &CharacterId) -> Result<(), CharacterError> {
        if !self.repo.exists(id).await? {
            return Err(RepoError::not_found("Character", id).into());
        }
        self.repo.delete(id).await?;
        tracing::info!(character_id = %id, "Character deleted");
        Ok(())
    }

    /// Store a fresh copy of `id` (new identity, " (Copy)" name, reset progress).
    pub async fn duplicate(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        let original = self.get(id).await?;
        let copy = original.duplicate(self.clock.now());
        self.repo.save(&copy).await?;
        tracing::info!(
            character_id = %copy.id(),
            source_id = %id,
            "Character duplicated"
        );
        Ok(copy)
    }

    async fn modify<F>(
        &self,
        id: &CharacterId,
        operation: &'static str,
        change: F,
    ) -> Result<Character, CharacterError>
    where
        F: FnOnce(&Character, DateTime<Utc>) -> Result<Character, DomainError> + Send,
    {
        let current = self.get(id).await?;
        let updated = change(&current, self.clock.now())?;
        self.repo.save(&updated).await?;
        tracing::debug!(character_id = %id, operation, "Character updated");
        Ok(updated)
    }

    // =========================================================================
    // Identity and metadata
    // =========================================================================

    pub async fn update_name(&self, id: &CharacterId, name: String) -> Result<Character, CharacterError> {
        self.modify(id, "update_name", |c, now| c.update_name(name, now))
            .await
    }

    pub async fn update_notes(&self, id: &CharacterId, notes: String) -> Result<Character, CharacterError> {
        self.modify(id, "update_notes", |c, now| Ok(c.update_notes(notes, now)))
            .await
    }

    pub async fn update_talent(&self, id: &CharacterId, talent: String) -> Result<Character, CharacterError> {
        self.modify(id, "update_talent", |c, now| Ok(c.update_talent(talent, now)))
            .await
    }

    pub async fn update_game_mode(
        &self,
        id: &CharacterId,
        game_mode: GameMode,
    ) -> Result<Character, CharacterError> {
        self.modify(id, "update_game_mode", |c, now| {
            Ok(c.update_game_mode(game_mode, now))
        })
        .await
    }

    pub async fn update_book(&self, id: &CharacterId, book: u8) -> Result<Character, CharacterError> {
        self.modify(id, "update_book", |c, now| c.update_book(book, now))
            .await
    }

    // =========================================================================
    // Stats
    // =========================================================================

    pub async fn update_stats(&self, id: &CharacterId, patch: StatsPatch) -> Result<Character, CharacterError> {
        self.modify(id, "update_stats", |c, now| c.update_stats(&patch, now))
            .await
    }

    pub async fn apply_damage(&self, id: &CharacterId, amount: i32) -> Result<Character, CharacterError> {
        let updated = self
            .modify(id, "apply_damage", |c, now| c.take_damage(amount, now))
            .await?;
        if updated.is_dead() {
            tracing::info!(character_id = %id, "Character died");
        }
        Ok(updated)
    }

    pub async fn heal(&self, id: &CharacterId, amount: i32) -> Result<Character, CharacterError> {
        self.modify(id, "heal", |c, now| c.heal(amount, now)).await
    }

    pub async fn decrease_luck(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        self.modify(id, "decrease_luck", |c, now| Ok(c.decrease_luck(now)))
            .await
    }

    pub async fn restore_luck(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        self.modify(id, "restore_luck", |c, now| Ok(c.restore_luck(now)))
            .await
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    pub async fn equip_weapon(&self, id: &CharacterId, weapon: Weapon) -> Result<Character, CharacterError> {
        self.modify(id, "equip_weapon", |c, now| c.equip_weapon(weapon, now))
            .await
    }

    pub async fn unequip_weapon(&self, id: &CharacterId) -> Result<Character, CharacterError> {
        self.modify(id, "unequip_weapon", |c, now| Ok(c.unequip_weapon(now)))
            .await
    }

    pub async fn add_item(&self, id: &CharacterId, item: InventoryItem) -> Result<Character, CharacterError> {
        self.modify(id, "add_item", |c, now| c.add_item(item, now)).await
    }

    pub async fn remove_item(&self, id: &CharacterId, index: usize) -> Result<Character, CharacterError> {
        self.modify(id, "remove_item", |c, now| c.remove_item(index, now))
            .await
    }

    pub async fn toggle_item_possession(
        &self,
        id: &CharacterId,
        index: usize,
    ) -> Result<Character, CharacterError> {
        self.modify(id, "toggle_item_possession", |c, now| {
            c.toggle_item_possession(index, now)
        })
        .await
    }

    pub async fn add_currency(&self, id: &CharacterId, amount: i32) -> Result<Character, CharacterError> {
        self.modify(id, "add_currency", |c, now| c.add_currency(amount, now))
            .await
    }

    pub async fn remove_currency(&self, id: &CharacterId, amount: i32) -> Result<Character, CharacterError> {
        self.modify(id, "remove_currency", |c, now| c.remove_currency(amount, now))
            .await
    }

    // =========================================================================
    // Progress
    // =========================================================================

    pub async fn go_to_paragraph(&self, id: &CharacterId, paragraph: i32) -> Result<Character, CharacterError> {
        self.modify(id, "go_to_paragraph", |c, now| c.go_to_paragraph(paragraph, now))
            .await
    }

    pub async fn update_days_elapsed(&self, id: &CharacterId, days: i32) -> Result<Character, CharacterError> {
        self.modify(id, "update_days_elapsed", |c, now| {
            c.update_days_elapsed(days, now)
        })
        .await
    }

    pub async fn update_next_wake_up_paragraph(
        &self,
        id: &CharacterId,
        paragraph: Option<i32>,
    ) -> Result<Character, CharacterError> {
        self.modify(id, "update_next_wake_up_paragraph", |c, now| {
            c.update_next_wake_up_paragraph(paragraph, now)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::persistence::InMemoryStore;
    use crate::infrastructure::ports::{MockCharacterRepo, MockClockPort};
    use chrono::TimeZone;
    use mockall::predicate::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn t1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 13, 0, 0).unwrap()
    }

    fn input(book: u8) -> CreateCharacter {
        CreateCharacter {
            name: "  Aldric ".to_string(),
            book,
            talent: "Archer".to_string(),
            game_mode: GameMode::Simplified,
            dexterity: 9,
            luck: 7,
            max_health: 20,
            constitution: Some(3),
        }
    }

    fn stored(book: u8) -> Character {
        Character::create(
            CharacterName::new("Aldric").unwrap(),
            Book::new(book).unwrap(),
            Stats::new(9, 7, 20).unwrap(),
            t0(),
        )
    }

    fn fixed_clock(at: DateTime<Utc>) -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(at))
    }

    mod lifecycle {
        use super::*;

        #[tokio::test]
        async fn create_builds_and_saves() {
            let mut repo = MockCharacterRepo::new();
            repo.expect_save()
                .withf(|c| c.name().as_str() == "Aldric" && c.stats().constitution() == Some(3))
                .times(1)
                .returning(|_| Ok(()));
            let mut clock = MockClockPort::new();
            clock.expect_now().returning(t0);

            let ops = CharacterOps::new(Arc::new(repo), Arc::new(clock));
            let c = ops.create(input(2)).await.unwrap();

            assert_eq!(c.talent(), "Archer");
            assert_eq!(c.game_mode(), GameMode::Simplified);
            assert_eq!(c.stats().reputation(), Some(0));
            assert_eq!(c.created_at(), t0());
        }

        #[tokio::test]
        async fn create_rejects_invalid_input_without_saving() {
            let mut repo = MockCharacterRepo::new();
            repo.expect_save().never();
            let ops = CharacterOps::new(Arc::new(repo), fixed_clock(t0()));

            let mut bad = input(1);
            bad.name = "   ".to_string();
            assert!(matches!(
                ops.create(bad).await.unwrap_err(),
                CharacterError::Domain(_)
            ));

            let mut bad = input(1);
            bad.book = 9;
            assert!(ops.create(bad).await.is_err());

            let mut bad = input(1);
            bad.dexterity = 0;
            assert!(ops.create(bad).await.is_err());
        }

        #[tokio::test]
        async fn get_unknown_is_not_found() {
            let mut repo = MockCharacterRepo::new();
            repo.expect_find_by_id().returning(|_| Ok(None));
            let ops = CharacterOps::new(Arc::new(repo), fixed_clock(t0()));

            let err = ops.get(&CharacterId::new()).await.unwrap_err();
            assert!(err.is_not_found());
        }

        #[tokio::test]
        async fn delete_checks_existence_first() {
            let id = CharacterId::new();
            let mut repo = MockCharacterRepo::new();
            repo.expect_exists()
                .with(eq(id.clone()))
                .returning(|_| Ok(false));
            repo.expect_delete().never();
            let ops = CharacterOps::new(Arc::new(repo), fixed_clock(t0()));

            assert!(ops.delete(&id).await.unwrap_err().is_not_found());
        }

        #[tokio::test]
        async fn delete_existing() {
            let mut repo = MockCharacterRepo::new();
            repo.expect_exists().returning(|_| Ok(true));
            repo.expect_delete().times(1).returning(|_| Ok(()));
            let ops = CharacterOps::new(Arc::new(repo), fixed_clock(t0()));

            ops.delete(&CharacterId::new()).await.unwrap();
        }

        #[tokio::test]
        async fn duplicate_saves_a_new_character() {
            let store = Arc::new(InMemoryStore::new());
            let ops = CharacterOps::new(store.clone(), fixed_clock(t1()));
            let original = ops.create(input(1)).await.unwrap();
            let original = ops.go_to_paragraph(original.id(), 40).await.unwrap();

            let copy = ops.duplicate(original.id()).await.unwrap();
            assert_ne!(copy.id(), original.id());
            assert_eq!(copy.name().as_str(), "Aldric (Copy)");
            assert_eq!(copy.progress().history(), &[1]);
            assert_eq!(ops.list().await.unwrap().len(), 2);
        }
    }

    mod updates {
        use super::*;

        #[tokio::test]
        async fn modify_stamps_clock_time_and_saves() {
            let c = stored(1);
            let id = c.id().clone();
            let mut repo = MockCharacterRepo::new();
            repo.expect_find_by_id()
                .with(eq(id.clone()))
                .returning(move |_| Ok(Some(c.clone())));
            repo.expect_save()
                .withf(|c| c.progress().history() == [1, 42] && c.updated_at() == t1())
                .times(1)
                .returning(|_| Ok(()));
            let ops = CharacterOps::new(Arc::new(repo), fixed_clock(t1()));

            let updated = ops.go_to_paragraph(&id, 42).await.unwrap();
            assert_eq!(updated.progress().current_position(), 42);
        }

        #[tokio::test]
        async fn domain_errors_do_not_save() {
            let c = stored(1);
            let id = c.id().clone();
            let mut repo = MockCharacterRepo::new();
            repo.expect_find_by_id()
                .returning(move |_| Ok(Some(c.clone())));
            repo.expect_save().never();
            let ops = CharacterOps::new(Arc::new(repo), fixed_clock(t1()));

            let err = ops.remove_currency(&id, 5).await.unwrap_err();
            assert!(matches!(
                err,
                CharacterError::Domain(DomainError::InsufficientFunds { .. })
            ));
            let err = ops.remove_item(&id, 0).await.unwrap_err();
            assert!(matches!(
                err,
                CharacterError::Domain(DomainError::ProtectedItem(_))
            ));
        }

        #[tokio::test]
        async fn full_sheet_flow_against_memory_store() {
            let store = Arc::new(InMemoryStore::new());
            let ops = CharacterOps::new(store, fixed_clock(t1()));
            let id = ops.create(input(2)).await.unwrap().id().clone();

            ops.update_name(&id, "Brenna".to_string()).await.unwrap();
            ops.equip_weapon(&id, Weapon::new("Spear", 2).unwrap())
                .await
                .unwrap();
            ops.add_item(&id, InventoryItem::item("Lantern")).await.unwrap();
            ops.toggle_item_possession(&id, 1).await.unwrap();
            ops.add_currency(&id, 15).await.unwrap();
            ops.remove_currency(&id, 5).await.unwrap();
            ops.apply_damage(&id, 12).await.unwrap();
            ops.heal(&id, 4).await.unwrap();
            ops.decrease_luck(&id).await.unwrap();
            ops.update_days_elapsed(&id, 2).await.unwrap();
            ops.update_next_wake_up_paragraph(&id, Some(210)).await.unwrap();
            ops.update_stats(&id, StatsPatch::new().reputation(Some(3)))
                .await
                .unwrap();
            ops.update_notes(&id, "The bridge is out".to_string())
                .await
                .unwrap();

            let c = ops.get(&id).await.unwrap();
            assert_eq!(c.name().as_str(), "Brenna");
            assert_eq!(c.inventory().attack_bonus(), 2);
            assert!(!c.inventory().items()[1].possessed);
            assert_eq!(c.inventory().currency(), 10);
            assert_eq!(c.stats().current_health(), 12);
            assert_eq!(c.stats().luck(), 6);
            assert_eq!(c.stats().reputation(), Some(3));
            assert_eq!(c.progress().days_elapsed(), Some(2));
            assert_eq!(c.progress().next_wake_up_position(), Some(210));
            assert_eq!(c.notes(), "The bridge is out");

            let c = ops.update_book(&id, 1).await.unwrap();
            assert_eq!(c.stats().reputation(), None);
            assert_eq!(c.progress().days_elapsed(), None);

            let c = ops.restore_luck(&id).await.unwrap();
            assert_eq!(c.stats().luck(), 7);
            let c = ops.unequip_weapon(&id).await.unwrap();
            assert!(c.inventory().weapon().is_none());
            let c = ops.update_talent(&id, "Scout".to_string()).await.unwrap();
            assert_eq!(c.talent(), "Scout");
            let c = ops.update_game_mode(&id, GameMode::Narrative).await.unwrap();
            assert_eq!(c.game_mode(), GameMode::Narrative);
        }
    }
}
