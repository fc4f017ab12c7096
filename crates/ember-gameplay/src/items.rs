//! Item definitions.
//!
//! Items are immutable content shared by reference ([`ItemRef`]) between
//! inventory slots, equipment slots and dropped loot.

use std::sync::Arc;

use ember_common::ItemId;
use serde::{Deserialize, Serialize};

use crate::stats::Substats;

/// Default maximum quantity per inventory slot for stackable items.
pub const DEFAULT_MAX_STACK: u32 = 99;

/// Shared handle to an immutable item definition.
pub type ItemRef = Arc<ItemDefinition>;

/// Broad category of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Miscellaneous item.
    #[default]
    Generic,
    /// Weapon.
    Weapon,
    /// Armor piece.
    Armor,
    /// Usable item that restores health or mana.
    Consumable,
    /// Quest item.
    QuestItem,
    /// Crafting material.
    Material,
}

/// Equipment slot an item occupies when equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipSlot {
    /// Helmet.
    Head,
    /// Body armor.
    Chest,
    /// Leg armor.
    Legs,
    /// Boots.
    Feet,
    /// Gloves.
    Hands,
    /// One-handed weapon.
    MainHand,
    /// Shield or off-hand weapon.
    OffHand,
    /// Weapon that uses both hands.
    TwoHanded,
    /// First ring.
    Ring1,
    /// Second ring.
    Ring2,
    /// Necklace.
    Necklace,
    /// Companion trinket.
    #[serde(alias = "Fairy")]
    Trinket,
}

impl EquipSlot {
    /// Number of equipment slots.
    pub const COUNT: usize = 12;

    /// All slots in display order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Head,
        Self::Chest,
        Self::Legs,
        Self::Feet,
        Self::Hands,
        Self::MainHand,
        Self::OffHand,
        Self::TwoHanded,
        Self::Ring1,
        Self::Ring2,
        Self::Necklace,
        Self::Trinket,
    ];

    /// Dense index of this slot, in `0..COUNT`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Slots that must be empty while this one is occupied.
    #[must_use]
    pub const fn exclusive_with(self) -> &'static [Self] {
        match self {
            Self::TwoHanded => &[Self::MainHand, Self::OffHand],
            Self::MainHand | Self::OffHand => &[Self::TwoHanded],
            _ => &[],
        }
    }

    /// Check if this slot holds a weapon.
    #[must_use]
    pub const fn is_hand(self) -> bool {
        matches!(self, Self::MainHand | Self::OffHand | Self::TwoHanded)
    }
}

const fn default_true() -> bool {
    true
}

const fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

/// Immutable definition of an item type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique item id.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Flavor text.
    #[serde(default)]
    pub description: String,
    /// Gold value.
    #[serde(default)]
    pub value: u32,
    /// Category.
    #[serde(default)]
    pub kind: ItemKind,
    /// Slot used when equipped, if any.
    #[serde(default)]
    pub equip_slot: Option<EquipSlot>,
    /// Substat bonuses granted while equipped.
    #[serde(default)]
    pub bonuses: Substats,
    /// Health restored on use (consumables).
    #[serde(default)]
    pub health_restore: f32,
    /// Mana restored on use (consumables).
    #[serde(default)]
    pub mana_restore: f32,
    /// Whether multiple units share a slot.
    #[serde(default = "default_true")]
    pub stackable: bool,
    /// Maximum units per slot when stackable.
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

impl ItemDefinition {
    /// Creates a generic stackable item.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            value: 0,
            kind: ItemKind::Generic,
            equip_slot: None,
            bonuses: Substats::default(),
            health_restore: 0.0,
            mana_restore: 0.0,
            stackable: true,
            max_stack: DEFAULT_MAX_STACK,
        }
    }

    /// Creates a non-stackable equippable item.
    #[must_use]
    pub fn equipment(id: ItemId, name: impl Into<String>, slot: EquipSlot) -> Self {
        let kind = if slot.is_hand() {
            ItemKind::Weapon
        } else {
            ItemKind::Armor
        };
        Self::new(id, name)
            .with_kind(kind)
            .with_equip_slot(slot)
            .with_stacking(false, 1)
    }

    /// Creates a stackable consumable.
    #[must_use]
    pub fn consumable(id: ItemId, name: impl Into<String>, health: f32, mana: f32) -> Self {
        let mut item = Self::new(id, name).with_kind(ItemKind::Consumable);
        item.health_restore = health;
        item.mana_restore = mana;
        item
    }

    /// Set category.
    #[must_use]
    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set equipment slot.
    #[must_use]
    pub fn with_equip_slot(mut self, slot: EquipSlot) -> Self {
        self.equip_slot = Some(slot);
        self
    }

    /// Set equipment bonuses.
    #[must_use]
    pub fn with_bonuses(mut self, bonuses: Substats) -> Self {
        self.bonuses = bonuses;
        self
    }

    /// Set stacking rules.
    #[must_use]
    pub fn with_stacking(mut self, stackable: bool, max_stack: u32) -> Self {
        self.stackable = stackable;
        self.max_stack = max_stack;
        self
    }

    /// Set gold value.
    #[must_use]
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    /// Effective maximum units per slot (1 for non-stackable items).
    #[must_use]
    pub fn max_stack_size(&self) -> u32 {
        if self.stackable {
            self.max_stack.max(1)
        } else {
            1
        }
    }

    /// Check if the item can be equipped.
    #[must_use]
    pub fn is_equippable(&self) -> bool {
        self.equip_slot.is_some()
    }

    /// Check if the item can be used from the inventory.
    #[must_use]
    pub fn is_consumable(&self) -> bool {
        self.kind == ItemKind::Consumable
    }

    /// Wraps the definition in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> ItemRef {
        Arc::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_stackable_max_stack_is_one() {
        let sword = ItemDefinition::equipment(ItemId::new(1), "Sword", EquipSlot::MainHand);
        assert_eq!(sword.max_stack_size(), 1);
        assert_eq!(sword.kind, ItemKind::Weapon);
        assert!(sword.is_equippable());
    }

    #[test]
    fn test_exclusive_slots() {
        assert_eq!(
            EquipSlot::TwoHanded.exclusive_with(),
            &[EquipSlot::MainHand, EquipSlot::OffHand]
        );
        assert_eq!(EquipSlot::OffHand.exclusive_with(), &[EquipSlot::TwoHanded]);
        assert!(EquipSlot::Head.exclusive_with().is_empty());
    }

    #[test]
    fn test_slot_indices_are_dense() {
        for (i, slot) in EquipSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }

    #[test]
    fn test_deserialize_defaults_and_fairy_alias() {
        let item: ItemDefinition = toml::from_str(
            r#"
            id = 5
            name = "Wisp"
            equip_slot = "Fairy"
            "#,
        )
        .expect("valid item");
        assert_eq!(item.equip_slot, Some(EquipSlot::Trinket));
        assert!(item.stackable);
        assert_eq!(item.max_stack, DEFAULT_MAX_STACK);
        assert!(item.bonuses.is_zero());
    }
}
