//! Combat session state machine
//!
//! ```text
//! Ongoing { next_attacker } --play_round--> Ongoing { next_attacker.opponent() }
//!                                      \--> Victory   (enemy endurance 0)
//!                                       \-> Defeat    (player endurance 0)
//! ```

use serde::{Deserialize, Serialize};

use super::round::{resolve_round, CombatRound, Combatant, Side};
use crate::error::DomainError;
use crate::value_objects::{require_label, DiceRolls, DieSource};

/// An opponent from the book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enemy {
    name: String,
    dexterity: i32,
    endurance: i32,
    max_endurance: i32,
    attack_bonus: i32,
}

impl Enemy {
    /// An unarmed enemy at full endurance.
    pub fn new(name: impl Into<String>, dexterity: i32, endurance: i32) -> Result<Self, DomainError> {
        Self {
            name: name.into(),
            dexterity,
            endurance,
            max_endurance: endurance,
            attack_bonus: 0,
        }
        .validated()
    }

    pub fn with_attack_bonus(self, attack_bonus: i32) -> Result<Self, DomainError> {
        Self {
            attack_bonus,
            ..self
        }
        .validated()
    }

    /// Start the fight already wounded.
    pub fn with_endurance(self, endurance: i32) -> Result<Self, DomainError> {
        Self { endurance, ..self }.validated()
    }

    fn validated(self) -> Result<Self, DomainError> {
        require_label(&self.name, "Enemy name")?;
        if self.dexterity < 1 {
            return Err(DomainError::validation("Enemy dexterity must be at least 1"));
        }
        if self.max_endurance < 1 {
            return Err(DomainError::validation(
                "Enemy maximum endurance must be at least 1",
            ));
        }
        if !(0..=self.max_endurance).contains(&self.endurance) {
            return Err(DomainError::validation(format!(
                "Enemy endurance must be between 0 and {}, got {}",
                self.max_endurance, self.endurance
            )));
        }
        if self.attack_bonus < 0 {
            return Err(DomainError::validation("Enemy attack bonus cannot be negative"));
        }
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dexterity(&self) -> i32 {
        self.dexterity
    }

    pub fn endurance(&self) -> i32 {
        self.endurance
    }

    pub fn max_endurance(&self) -> i32 {
        self.max_endurance
    }

    pub fn attack_bonus(&self) -> i32 {
        self.attack_bonus
    }

    pub fn combatant(&self) -> Combatant {
        Combatant::new(self.dexterity, self.endurance, self.attack_bonus)
    }
}

/// Where a session stands, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CombatStatus {
    #[serde(rename_all = "camelCase")]
    Ongoing { next_attacker: Side },
    Victory,
    Defeat,
}

impl CombatStatus {
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Ongoing { .. })
    }

    fn after(player_endurance: i32, enemy_endurance: i32, next_attacker: Side) -> Self {
        if player_endurance <= 0 {
            Self::Defeat
        } else if enemy_endurance <= 0 {
            Self::Victory
        } else {
            Self::Ongoing { next_attacker }
        }
    }
}

/// One fight between the player and a single enemy, driven a round at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatSession {
    player: Combatant,
    starting_player_endurance: i32,
    enemy: Enemy,
    rounds: Vec<CombatRound>,
    status: CombatStatus,
}

impl CombatSession {
    pub fn start(player: Combatant, enemy: Enemy, first_attacker: Side) -> Self {
        let status = CombatStatus::after(player.endurance, enemy.endurance(), first_attacker);
        Self {
            starting_player_endurance: player.endurance,
            player,
            enemy,
            rounds: Vec::new(),
            status,
        }
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn enemy(&self) -> &Enemy {
        &self.enemy
    }

    pub fn rounds(&self) -> &[CombatRound] {
        &self.rounds
    }

    pub fn status(&self) -> CombatStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn next_attacker(&self) -> Option<Side> {
        match self.status {
            CombatStatus::Ongoing { next_attacker } => Some(next_attacker),
            _ => None,
        }
    }

    /// Health the player has lost since the session started; apply it with
    /// `Character::take_damage`.
    pub fn player_damage_taken(&self) -> i32 {
        self.starting_player_endurance - self.player.endurance
    }

    /// Resolve the next round and return the advanced session with the
    /// round's record.
    pub fn play_round(
        &self,
        rolls: DiceRolls,
        dice: &mut dyn DieSource,
    ) -> Result<(Self, CombatRound), DomainError> {
        let attacker_role = self.next_attacker().ok_or_else(|| {
            DomainError::invalid_state_transition(format!(
                "Combat against {} is already over",
                self.enemy.name
            ))
        })?;
        let round_number = u32::try_from(self.rounds.len() + 1)
            .map_err(|_| DomainError::invalid_state_transition("Too many combat rounds"))?;

        let enemy = self.enemy.combatant();
        let (attacker, defender) = match attacker_role {
            Side::Player => (self.player, enemy),
            Side::Enemy => (enemy, self.player),
        };
        let round = resolve_round(round_number, attacker_role, &attacker, &defender, rolls, dice)?;

        let (player_endurance, enemy_endurance) = match attacker_role {
            Side::Player => (round.attacker_endurance_after, round.defender_endurance_after),
            Side::Enemy => (round.defender_endurance_after, round.attacker_endurance_after),
        };
        let mut rounds = self.rounds.clone();
        rounds.push(round.clone());

        let next = Self {
            player: self.player.with_endurance(player_endurance),
            starting_player_endurance: self.starting_player_endurance,
            enemy: Enemy {
                endurance: enemy_endurance,
                ..self.enemy.clone()
            },
            rounds,
            status: CombatStatus::after(player_endurance, enemy_endurance, attacker_role.opponent()),
        };
        Ok((next, round))
    }
}
