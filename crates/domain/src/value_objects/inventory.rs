//! Inventory - currency, equipped weapon and carried items

use serde::{Deserialize, Serialize};

use super::names::require_label;
use crate::error::DomainError;
use crate::records::InventoryData;

/// Hard cap on carried items, purse included.
pub const MAX_ITEMS: usize = 14;

/// Name of the item every character carries and can never discard.
pub const PURSE_ITEM_NAME: &str = "Purse";

/// The single weapon a character can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    pub name: String,
    /// Bonus added to every damage roll
    pub attack_bonus: i32,
}

impl Weapon {
    pub fn new(name: impl Into<String>, attack_bonus: i32) -> Result<Self, DomainError> {
        let weapon = Self {
            name: name.into(),
            attack_bonus,
        };
        weapon.validate()?;
        Ok(weapon)
    }

    fn validate(&self) -> Result<(), DomainError> {
        require_label(&self.name, "Weapon name")?;
        if self.attack_bonus < 0 {
            return Err(DomainError::validation("Weapon attack bonus cannot be negative"));
        }
        Ok(())
    }
}

/// Whether an entry is an ordinary item or a story-significant one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Item,
    Special,
}

/// One line of the item list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub name: String,
    /// Whether the character currently holds the item (unticked entries stay listed)
    pub possessed: bool,
    pub kind: ItemKind,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, possessed: bool, kind: ItemKind) -> Self {
        Self {
            name: name.into(),
            possessed,
            kind,
        }
    }

    /// An ordinary item the character holds.
    pub fn item(name: impl Into<String>) -> Self {
        Self::new(name, true, ItemKind::Item)
    }

    /// A special item the character holds.
    pub fn special(name: impl Into<String>) -> Self {
        Self::new(name, true, ItemKind::Special)
    }

    pub fn purse() -> Self {
        Self::special(PURSE_ITEM_NAME)
    }

    pub fn is_purse(&self) -> bool {
        self.name == PURSE_ITEM_NAME
    }
}

/// Currency, weapon slot and item list.
///
/// # Invariants
///
/// - `currency >= 0`
/// - the weapon, when present, has a non-empty name and a non-negative bonus
/// - at most [`MAX_ITEMS`] items, the purse among them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    currency: i32,
    weapon: Option<Weapon>,
    items: Vec<InventoryItem>,
}

impl Default for Inventory {
    /// Starting inventory: no money, no weapon, just the purse.
    fn default() -> Self {
        Self {
            currency: 0,
            weapon: None,
            items: vec![InventoryItem::purse()],
        }
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_data(data: &InventoryData) -> Result<Self, DomainError> {
        Self {
            currency: data.currency,
            weapon: data.weapon.clone(),
            items: data.items.clone(),
        }
        .validated()
    }

    pub fn to_data(&self) -> InventoryData {
        InventoryData {
            currency: self.currency,
            weapon: self.weapon.clone(),
            items: self.items.clone(),
        }
    }

    fn validated(self) -> Result<Self, DomainError> {
        if self.currency < 0 {
            return Err(DomainError::validation("Currency cannot be negative"));
        }
        if let Some(weapon) = &self.weapon {
            weapon.validate()?;
        }
        if self.items.len() > MAX_ITEMS {
            return Err(DomainError::inventory_full(self.items.len(), MAX_ITEMS));
        }
        for item in &self.items {
            require_label(&item.name, "Item name")?;
        }
        if !self.items.iter().any(InventoryItem::is_purse) {
            return Err(DomainError::validation(format!(
                "Inventory must contain the {}",
                PURSE_ITEM_NAME
            )));
        }
        Ok(self)
    }

    pub fn currency(&self) -> i32 {
        self.currency
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    /// Bonus of the equipped weapon, zero when unarmed.
    pub fn attack_bonus(&self) -> i32 {
        self.weapon.as_ref().map_or(0, |w| w.attack_bonus)
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_ITEMS
    }

    /// Equip `weapon`, replacing whatever was held.
    pub fn equip_weapon(&self, weapon: Weapon) -> Result<Self, DomainError> {
        weapon.validate()?;
        Ok(Self {
            weapon: Some(weapon),
            ..self.clone()
        })
    }

    pub fn unequip_weapon(&self) -> Self {
        Self {
            weapon: None,
            ..self.clone()
        }
    }

    pub fn add_item(&self, item: InventoryItem) -> Result<Self, DomainError> {
        if self.is_full() {
            return Err(DomainError::inventory_full(self.items.len(), MAX_ITEMS));
        }
        require_label(&item.name, "Item name")?;
        let mut items = self.items.clone();
        items.push(item);
        Ok(Self {
            items,
            ..self.clone()
        })
    }

    /// Remove the item at `index`. The purse can never be removed.
    pub fn remove_item(&self, index: usize) -> Result<Self, DomainError> {
        let item = self
            .items
            .get(index)
            .ok_or_else(|| DomainError::index_out_of_range(index, self.items.len()))?;
        if item.is_purse() {
            return Err(DomainError::protected_item(PURSE_ITEM_NAME));
        }
        let mut items = self.items.clone();
        items.remove(index);
        Ok(Self {
            items,
            ..self.clone()
        })
    }

    pub fn toggle_item_possession(&self, index: usize) -> Result<Self, DomainError> {
        let mut items = self.items.clone();
        let len = items.len();
        let item = items
            .get_mut(index)
            .ok_or_else(|| DomainError::index_out_of_range(index, len))?;
        item.possessed = !item.possessed;
        Ok(Self {
            items,
            ..self.clone()
        })
    }

    pub fn add_currency(&self, amount: i32) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation("Amount to add cannot be negative"));
        }
        let currency = self
            .currency
            .checked_add(amount)
            .ok_or_else(|| DomainError::validation("Currency overflow"))?;
        Ok(Self {
            currency,
            ..self.clone()
        })
    }

    pub fn remove_currency(&self, amount: i32) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::validation("Amount to remove cannot be negative"));
        }
        if amount > self.currency {
            return Err(DomainError::insufficient_funds(amount, self.currency));
        }
        Ok(Self {
            currency: self.currency - amount,
            ..self.clone()
        })
    }
}
