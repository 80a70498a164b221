//! Combat use cases.
//!
//! A session is started from a stored character, played one round per call
//! with dice from the [`RandomPort`] (unless the caller injects its own
//! rolls), and finished by folding the player's lost endurance back into the
//! stored character.

mod error;

pub use error::CombatError;

use std::sync::Arc;

use gamebook_domain::value_objects::DIE_FACES;
use gamebook_domain::{
    Character, CharacterId, CombatRound, CombatSession, CombatStatus, Combatant, DiceRolls,
    DieSource, DomainError, Enemy, Side,
};

use crate::infrastructure::ports::{CharacterRepo, ClockPort, RandomPort, RepoError};

/// Die source drawing from the injected random port.
struct PortDice<'a> {
    random: &'a dyn RandomPort,
}

impl DieSource for PortDice<'_> {
    fn roll_die(&mut self) -> u8 {
        // Out-of-range values map to 0, which the dice rules reject.
        u8::try_from(self.random.gen_range(1, i32::from(DIE_FACES))).unwrap_or(0)
    }
}

/// Combat operations.
pub struct CombatOps {
    repo: Arc<dyn CharacterRepo>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
}

impl CombatOps {
    pub fn new(
        repo: Arc<dyn CharacterRepo>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            repo,
            clock,
            random,
        }
    }

    async fn load(&self, id: &CharacterId) -> Result<Character, CombatError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::not_found("Character", id).into())
    }

    /// Open a fight between a stored character and `enemy`; the player strikes first.
    pub async fn start(&self, id: &CharacterId, enemy: Enemy) -> Result<CombatSession, CombatError> {
        let character = self.load(id).await?;
        if character.is_dead() {
            return Err(DomainError::invalid_state_transition(format!(
                "{} is dead and cannot fight",
                character.name()
            ))
            .into());
        }

        tracing::info!(
            character_id = %id,
            enemy = enemy.name(),
            enemy_endurance = enemy.endurance(),
            "Combat started"
        );
        Ok(CombatSession::start(
            Combatant::from_character(&character),
            enemy,
            Side::Player,
        ))
    }

    /// Resolve the next round. Rolls missing from `rolls` are drawn.
    pub fn play_round(
        &self,
        session: &CombatSession,
        rolls: DiceRolls,
    ) -> Result<(CombatSession, CombatRound), CombatError> {
        let mut dice = PortDice {
            random: self.random.as_ref(),
        };
        let (next, round) = session.play_round(rolls, &mut dice)?;

        tracing::debug!(
            round = round.round_number,
            attacker = ?round.attacker_role,
            hit_roll = round.hit_roll,
            hit = round.hit_success,
            damage = ?round.total_damage,
            "Combat round resolved"
        );
        Ok((next, round))
    }

    /// Apply the endurance the player lost during `session` to the stored
    /// character and save it.
    ///
    /// May be called before the session is over (the player fled).
    pub async fn finish(&self, id: &CharacterId, session: &CombatSession) -> Result<Character, CombatError> {
        let character = self.load(id).await?;
        let damage = session.player_damage_taken();
        let updated = character.take_damage(damage, self.clock.now())?;
        self.repo.save(&updated).await?;

        let outcome = match session.status() {
            CombatStatus::Victory => "victory",
            CombatStatus::Defeat => "defeat",
            CombatStatus::Ongoing { .. } => "fled",
        };
        tracing::info!(
            character_id = %id,
            outcome,
            rounds = session.rounds().len(),
            damage_taken = damage,
            "Combat finished"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, ScriptedRandom};
    use crate::infrastructure::persistence::InMemoryStore;
    use crate::infrastructure::ports::{MockCharacterRepo, MockRandomPort};
    use chrono::{DateTime, TimeZone, Utc};
    use gamebook_domain::{Book, CharacterName, Stats, Weapon};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn fighter() -> Character {
        Character::create(
            CharacterName::new("Aldric").unwrap(),
            Book::new(1).unwrap(),
            Stats::new(12, 7, 20).unwrap(),
            now(),
        )
        .equip_weapon(Weapon::new("Sword", 3).unwrap(), now())
        .unwrap()
    }

    async fn setup(random: impl RandomPort + 'static) -> (CombatOps, CharacterId) {
        let store = Arc::new(InMemoryStore::new());
        let c = fighter();
        store.save(&c).await.unwrap();
        let ops = CombatOps::new(store, Arc::new(FixedClock(now())), Arc::new(random));
        (ops, c.id().clone())
    }

    #[tokio::test]
    async fn start_snapshots_the_character() {
        let (ops, id) = setup(ScriptedRandom::new([])).await;
        let session = ops
            .start(&id, Enemy::new("Goblin", 7, 15).unwrap())
            .await
            .unwrap();

        assert_eq!(session.player().dexterity, 12);
        assert_eq!(session.player().endurance, 20);
        assert_eq!(session.player().weapon_bonus, 3);
        assert_eq!(session.next_attacker(), Some(Side::Player));
    }

    #[tokio::test]
    async fn start_for_unknown_character_is_not_found() {
        let mut repo = MockCharacterRepo::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let ops = CombatOps::new(
            Arc::new(repo),
            Arc::new(FixedClock(now())),
            Arc::new(ScriptedRandom::new([])),
        );
        let err = ops
            .start(&CharacterId::new(), Enemy::new("Goblin", 7, 15).unwrap())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn dead_characters_cannot_fight() {
        let store = Arc::new(InMemoryStore::new());
        let dead = fighter().take_damage(20, now()).unwrap();
        store.save(&dead).await.unwrap();
        let ops = CombatOps::new(
            store,
            Arc::new(FixedClock(now())),
            Arc::new(ScriptedRandom::new([])),
        );
        let err = ops
            .start(dead.id(), Enemy::new("Goblin", 7, 15).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CombatError::Domain(DomainError::InvalidStateTransition(_))
        ));
    }

    #[tokio::test]
    async fn rounds_draw_d6_from_the_random_port() {
        let mut random = MockRandomPort::new();
        let mut faces = vec![4, 4, 4].into_iter();
        random
            .expect_gen_range()
            .withf(|min, max| *min == 1 && *max == 6)
            .times(3)
            .returning(move |_, _| faces.next().unwrap_or(1));
        let (ops, id) = setup(random).await;

        let session = ops
            .start(&id, Enemy::new("Goblin", 7, 15).unwrap())
            .await
            .unwrap();
        let (session, round) = ops.play_round(&session, DiceRolls::drawn()).unwrap();

        // 4 + 4 = 8 <= 12 hits; 1 + 4 + 3 = 8 damage
        assert_eq!(round.hit_roll, 8);
        assert_eq!(round.total_damage, Some(8));
        assert_eq!(session.enemy().endurance(), 7);
    }

    #[tokio::test]
    async fn bad_port_values_are_rejected() {
        let (ops, id) = setup(ScriptedRandom::new([9, 9])).await;
        let session = ops
            .start(&id, Enemy::new("Goblin", 7, 15).unwrap())
            .await
            .unwrap();
        assert!(ops.play_round(&session, DiceRolls::drawn()).is_err());
    }

    #[tokio::test]
    async fn finish_applies_damage_taken() {
        let (ops, id) = setup(ScriptedRandom::new([])).await;
        let session = ops
            .start(&id, Enemy::new("Troll", 9, 30).unwrap().with_attack_bonus(2).unwrap())
            .await
            .unwrap();

        // Player hits for 1 + 1 + 3 = 5, troll answers for 1 + 5 + 2 = 8.
        let (session, player_round) = ops
            .play_round(&session, DiceRolls::injected(2, 1))
            .unwrap();
        assert_eq!(session.enemy().endurance(), 25);
        assert_eq!(player_round.total_damage, Some(5));
        let (session, enemy_round) = ops
            .play_round(&session, DiceRolls::injected(6, 5))
            .unwrap();
        assert_eq!(enemy_round.total_damage, Some(8));

        let updated = ops.finish(&id, &session).await.unwrap();
        assert_eq!(updated.stats().current_health(), 12);
    }

    #[tokio::test]
    async fn full_fight_to_victory() {
        let (ops, id) = setup(ScriptedRandom::new([])).await;
        let mut session = ops
            .start(&id, Enemy::new("Rat", 5, 6).unwrap())
            .await
            .unwrap();

        while !session.is_finished() {
            let rolls = match session.next_attacker() {
                Some(Side::Player) => DiceRolls::injected(2, 6),
                _ => DiceRolls::injected(12, 1),
            };
            session = ops.play_round(&session, rolls).unwrap().0;
        }

        assert_eq!(session.status(), CombatStatus::Victory);
        assert_eq!(session.rounds().len(), 1);
        let updated = ops.finish(&id, &session).await.unwrap();
        assert_eq!(updated.stats().current_health(), 20);
    }
}
