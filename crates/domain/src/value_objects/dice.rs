//! Six-sided dice for combat resolution
//!
//! The domain never owns a random number generator. Callers either inject
//! the rolls they already made ([`DiceRolls`]) or lend a [`DieSource`] the
//! engine draws from when a roll is missing.

use std::collections::VecDeque;

use crate::error::DomainError;

/// Faces on every die used by the rules.
pub const DIE_FACES: u8 = 6;

/// Anything that can produce a uniform d6 result in `1..=6`.
///
/// Closures implement it, so `&mut || rng.gen_range(1..=6)` is a valid source.
pub trait DieSource {
    fn roll_die(&mut self) -> u8;
}

impl<F> DieSource for F
where
    F: FnMut() -> u8,
{
    fn roll_die(&mut self) -> u8 {
        self()
    }
}

/// Plays back a fixed sequence of die faces; used to replay a combat.
///
/// Once the script runs out every further roll is `1`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    faces: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(faces: impl IntoIterator<Item = u8>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DieSource for ScriptedDice {
    fn roll_die(&mut self) -> u8 {
        self.faces.pop_front().unwrap_or(1)
    }
}

/// Rolls the caller already made for one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiceRolls {
    /// Two-dice total for the hit test (2..=12)
    pub hit: Option<u8>,
    /// Single die for damage (1..=6), only read when the attack hits
    pub damage: Option<u8>,
}

impl DiceRolls {
    /// No injected rolls: everything is drawn from the die source.
    pub fn drawn() -> Self {
        Self::default()
    }

    pub fn injected(hit: u8, damage: u8) -> Self {
        Self {
            hit: Some(hit),
            damage: Some(damage),
        }
    }

    pub fn with_hit(mut self, roll: u8) -> Self {
        self.hit = Some(roll);
        self
    }

    pub fn with_damage(mut self, roll: u8) -> Self {
        self.damage = Some(roll);
        self
    }
}

/// Two-dice total for a hit test, injected or drawn.
pub fn two_dice(injected: Option<u8>, source: &mut dyn DieSource) -> Result<u8, DomainError> {
    let roll = match injected {
        Some(roll) => roll,
        None => checked_face(source.roll_die())? + checked_face(source.roll_die())?,
    };
    if !(2..=2 * DIE_FACES).contains(&roll) {
        return Err(DomainError::validation(format!(
            "Hit roll must be between 2 and {}, got {}",
            2 * DIE_FACES,
            roll
        )));
    }
    Ok(roll)
}

/// Single die result, injected or drawn.
pub fn one_die(injected: Option<u8>, source: &mut dyn DieSource) -> Result<u8, DomainError> {
    match injected {
        Some(roll) => checked_face(roll),
        None => checked_face(source.roll_die()),
    }
}

fn checked_face(face: u8) -> Result<u8, DomainError> {
    if !(1..=DIE_FACES).contains(&face) {
        return Err(DomainError::validation(format!(
            "Die roll must be between 1 and {}, got {}",
            DIE_FACES, face
        )));
    }
    Ok(face)
}
