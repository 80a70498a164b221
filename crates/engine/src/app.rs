//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    persistence::{InMemoryStore, JsonFileStore},
    ports::{CharacterRepo, ClockPort, RandomPort, RecordStore, RepoError},
    settings::{Settings, StorageKind},
};
use crate::use_cases;

/// Main application state.
///
/// Holds the storage ports and every use case built on them.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for the storage ports.
pub struct Repositories {
    pub character: Arc<dyn CharacterRepo>,
    pub records: Arc<dyn RecordStore>,
}

/// Container for all use cases.
pub struct UseCases {
    pub character: Arc<use_cases::CharacterOps>,
    pub combat: Arc<use_cases::CombatOps>,
    pub maintenance: Arc<use_cases::RecordMaintenance>,
}

impl App {
    /// Wire every use case onto one store that serves both typed and raw access.
    pub fn new<S>(
        store: Arc<S>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        dry_run: bool,
    ) -> Self
    where
        S: CharacterRepo + RecordStore + 'static,
    {
        let character: Arc<dyn CharacterRepo> = store.clone();
        let records: Arc<dyn RecordStore> = store;

        let use_cases = UseCases {
            character: Arc::new(use_cases::CharacterOps::new(
                character.clone(),
                clock.clone(),
            )),
            combat: Arc::new(use_cases::CombatOps::new(
                character.clone(),
                clock,
                random,
            )),
            maintenance: Arc::new(use_cases::RecordMaintenance::new(
                records.clone(),
                dry_run,
            )),
        };

        Self {
            repositories: Repositories { character, records },
            use_cases,
        }
    }

    /// Build the application for `settings` with the system clock and RNG.
    pub async fn open(settings: &Settings) -> Result<Self, RepoError> {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let random: Arc<dyn RandomPort> = Arc::new(SystemRandom::new());

        match settings.storage {
            StorageKind::File => {
                let store = JsonFileStore::open(&settings.data_dir).await?;
                tracing::info!(dir = %settings.data_dir.display(), "Using JSON file storage");
                Ok(Self::new(Arc::new(store), clock, random, settings.dry_run))
            }
            StorageKind::Memory => {
                tracing::info!("Using in-memory storage");
                Ok(Self::new(
                    Arc::new(InMemoryStore::new()),
                    clock,
                    random,
                    settings.dry_run,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::CreateCharacter;
    use gamebook_domain::{DiceRolls, Enemy, GameMode};

    fn memory_settings() -> Settings {
        Settings {
            storage: StorageKind::Memory,
            ..Settings::default()
        }
    }

    fn aldric() -> CreateCharacter {
        CreateCharacter {
            name: "Aldric".to_string(),
            book: 2,
            talent: "Archer".to_string(),
            game_mode: GameMode::Mortal,
            dexterity: 12,
            luck: 7,
            max_health: 20,
            constitution: None,
        }
    }

    #[tokio::test]
    async fn memory_app_shares_one_store() {
        let app = App::open(&memory_settings()).await.unwrap();
        let created = app.use_cases.character.create(aldric()).await.unwrap();

        assert!(app.repositories.character.exists(created.id()).await.unwrap());
        assert_eq!(app.repositories.records.list_raw().await.unwrap().len(), 1);

        let report = app.use_cases.maintenance.execute().await.unwrap();
        assert_eq!(report.already_current, 1);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn combat_flows_back_into_the_sheet() {
        let app = App::open(&memory_settings()).await.unwrap();
        let id = app.use_cases.character.create(aldric()).await.unwrap().id().clone();

        let combat = &app.use_cases.combat;
        let session = combat
            .start(&id, Enemy::new("Wolf", 8, 4).unwrap())
            .await
            .unwrap();
        // 5 <= 12 hits for 1 + 3 with no weapon, which is all the wolf has.
        let (session, _) = combat
            .play_round(&session, DiceRolls::injected(5, 3))
            .unwrap();
        assert!(session.is_finished());

        let after = combat.finish(&id, &session).await.unwrap();
        assert_eq!(after.stats().current_health(), 20);
    }

    #[tokio::test]
    async fn file_app_uses_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            data_dir: dir.path().join("sheets"),
            storage: StorageKind::File,
            dry_run: true,
        };
        let app = App::open(&settings).await.unwrap();
        app.use_cases.character.create(aldric()).await.unwrap();

        let files = std::fs::read_dir(dir.path().join("sheets")).unwrap().count();
        assert_eq!(files, 1);
    }
}
