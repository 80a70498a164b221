//! Combat resolution
//!
//! [`resolve_round`] applies the dice rules to two numeric snapshots;
//! [`CombatSession`] strings rounds together until one side drops to zero.

mod round;
mod session;

pub use round::{
    apply_damage, calculate_damage, check_hit, resolve_round, CombatRound, Combatant, Side,
};
pub use session::{CombatSession, CombatStatus, Enemy};
