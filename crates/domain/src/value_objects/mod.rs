//! Value objects - Immutable objects defined by their attributes

mod dice;
mod edition;
mod inventory;
mod names;
mod progress;
mod stats;

pub use dice::{one_die, two_dice, DiceRolls, DieSource, ScriptedDice, DIE_FACES};
pub use edition::{Book, GameMode};
pub use inventory::{
    Inventory, InventoryItem, ItemKind, Weapon, MAX_ITEMS, PURSE_ITEM_NAME,
};
pub use names::CharacterName;
pub(crate) use names::require_label;
pub use progress::{Progress, MAX_DAYS_ELAPSED};
pub use stats::{Stats, StatsPatch};
