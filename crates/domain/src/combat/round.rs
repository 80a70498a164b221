//! Single-round resolution
//!
//! Pure functions over numeric snapshots. Nothing here touches a `Character`;
//! callers fold the outcome back through `Character::take_damage`.

use serde::{Deserialize, Serialize};

use crate::aggregates::Character;
use crate::error::DomainError;
use crate::value_objects::{one_die, two_dice, DiceRolls, DieSource};

/// Which side of the fight a combatant is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

/// What the rules need to know about one fighter for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combatant {
    pub dexterity: i32,
    pub endurance: i32,
    pub weapon_bonus: i32,
}

impl Combatant {
    pub fn new(dexterity: i32, endurance: i32, weapon_bonus: i32) -> Self {
        Self {
            dexterity,
            endurance,
            weapon_bonus,
        }
    }

    /// Snapshot of a character: dexterity, current health and the equipped
    /// weapon's bonus (0 when unarmed).
    pub fn from_character(character: &Character) -> Self {
        Self {
            dexterity: character.stats().dexterity(),
            endurance: character.stats().current_health(),
            weapon_bonus: character.inventory().attack_bonus(),
        }
    }

    pub fn with_endurance(self, endurance: i32) -> Self {
        Self { endurance, ..self }
    }
}

/// Outcome of one attacker/defender exchange.
///
/// Damage fields are only present when the attack hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatRound {
    pub round_number: u32,
    pub attacker_role: Side,
    pub hit_roll: u8,
    pub hit_success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage_roll: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon_bonus: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_damage: Option<i32>,
    pub attacker_endurance_after: i32,
    pub defender_endurance_after: i32,
}

/// A hit lands when the two-dice roll does not exceed dexterity.
pub fn check_hit(roll: u8, dexterity: i32) -> bool {
    i32::from(roll) <= dexterity
}

/// `1 + damage_roll + weapon_bonus`, saturating at `i32::MAX`.
pub fn calculate_damage(damage_roll: u8, weapon_bonus: i32) -> i32 {
    (1 + i32::from(damage_roll)).saturating_add(weapon_bonus.max(0))
}

/// Endurance left after taking `damage`, never below zero.
pub fn apply_damage(endurance: i32, damage: i32) -> i32 {
    endurance.saturating_sub(damage.max(0)).max(0)
}

/// Resolve one round.
///
/// Missing rolls are drawn from `dice`; injected rolls are range-checked
/// whether or not they end up being used.
pub fn resolve_round(
    round_number: u32,
    attacker_role: Side,
    attacker: &Combatant,
    defender: &Combatant,
    rolls: DiceRolls,
    dice: &mut dyn DieSource,
) -> Result<CombatRound, DomainError> {
    let hit_roll = two_dice(rolls.hit, dice)?;
    let hit_success = check_hit(hit_roll, attacker.dexterity);

    if !hit_success {
        if let Some(unused) = rolls.damage {
            one_die(Some(unused), dice)?;
        }
        return Ok(CombatRound {
            round_number,
            attacker_role,
            hit_roll,
            hit_success,
            damage_roll: None,
            weapon_bonus: None,
            total_damage: None,
            attacker_endurance_after: attacker.endurance,
            defender_endurance_after: defender.endurance,
        });
    }

    let damage_roll = one_die(rolls.damage, dice)?;
    let total_damage = calculate_damage(damage_roll, attacker.weapon_bonus);
    Ok(CombatRound {
        round_number,
        attacker_role,
        hit_roll,
        hit_success,
        damage_roll: Some(damage_roll),
        weapon_bonus: Some(attacker.weapon_bonus),
        total_damage: Some(total_damage),
        attacker_endurance_after: attacker.endurance,
        defender_endurance_after: apply_damage(defender.endurance, total_damage),
    })
}
