//! Equipment slots and stat bonus aggregation.
//!
//! Equipping and unequipping move items between the [`Inventory`] and the
//! [`Equipment`] ledger. Both operations work on a scratch copy of the
//! inventory and only commit when every displaced item found a place, so a
//! failed call leaves inventory, equipment and stats untouched.

use ember_common::ItemId;
use thiserror::Error;
use tracing::{debug, warn};

use crate::inventory::{Inventory, InventoryError};
use crate::items::{EquipSlot, ItemRef};
use crate::stats::{StatBlock, Substats};

/// Equipment error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquipmentError {
    /// Item is not in the inventory
    #[error("Item not in inventory: {0}")]
    NotInInventory(ItemId),
    /// Item declares no equipment slot
    #[error("Item has no equipment slot: {0}")]
    NoEquipSlot(ItemId),
    /// Nothing equipped in the slot
    #[error("Nothing equipped in {0:?}")]
    SlotEmpty(EquipSlot),
    /// Displaced items do not fit back into the inventory
    #[error("No room to return displaced items: {0}")]
    NoRoom(#[from] InventoryError),
}

/// Result type for equipment operations.
pub type EquipmentResult<T> = Result<T, EquipmentError>;

/// Items currently worn, one per slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equipment {
    slots: [Option<ItemRef>; EquipSlot::COUNT],
}

impl Equipment {
    /// Creates empty equipment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Item in `slot`, if any.
    #[must_use]
    pub fn get(&self, slot: EquipSlot) -> Option<&ItemRef> {
        self.slots[slot.index()].as_ref()
    }

    /// Iterates over occupied slots.
    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, &ItemRef)> {
        EquipSlot::ALL
            .iter()
            .filter_map(|&slot| self.get(slot).map(|item| (slot, item)))
    }

    /// Checks if nothing is equipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Sum of bonuses over every equipped item.
    #[must_use]
    pub fn total_bonuses(&self) -> Substats {
        let mut total = Substats::default();
        for (_, item) in self.iter() {
            total.accumulate(&item.bonuses);
        }
        total
    }

    /// Rebuilds `stats` equipment bonuses from scratch and recomputes.
    pub fn apply_to(&self, stats: &mut StatBlock) {
        stats.reset_equipment_bonuses();
        for (_, item) in self.iter() {
            stats.add_equipment_bonuses(&item.bonuses);
        }
        stats.recompute();
    }

    /// Equips `item` from `inventory` into its declared slot.
    ///
    /// The current occupant and any two-handed counterparts go back to the
    /// inventory. Returns the items that were displaced.
    pub fn equip(
        &mut self,
        item: ItemId,
        inventory: &mut Inventory,
        stats: &mut StatBlock,
    ) -> EquipmentResult<Vec<ItemRef>> {
        let definition = inventory
            .find(item)
            .cloned()
            .ok_or(EquipmentError::NotInInventory(item))?;
        let Some(slot) = definition.equip_slot else {
            warn!(item = %item, name = %definition.name, "Item has no equipment slot");
            return Err(EquipmentError::NoEquipSlot(item));
        };

        let mut scratch = inventory.clone();
        let equipped = scratch
            .take_one(item)
            .map_err(|_| EquipmentError::NotInInventory(item))?;

        let mut displaced = Vec::new();
        for target in std::iter::once(slot).chain(slot.exclusive_with().iter().copied()) {
            if let Some(previous) = self.get(target) {
                scratch.add_item(previous, 1)?;
                displaced.push(ItemRef::clone(previous));
            }
        }

        *inventory = scratch;
        for &other in slot.exclusive_with() {
            self.slots[other.index()] = None;
        }
        self.slots[slot.index()] = Some(equipped);
        self.apply_to(stats);

        debug!(item = %item, ?slot, displaced = displaced.len(), "Equipped");
        Ok(displaced)
    }

    /// Moves the item in `slot` back into `inventory`.
    pub fn unequip(
        &mut self,
        slot: EquipSlot,
        inventory: &mut Inventory,
        stats: &mut StatBlock,
    ) -> EquipmentResult<ItemRef> {
        let item = self
            .get(slot)
            .cloned()
            .ok_or(EquipmentError::SlotEmpty(slot))?;
        inventory.add_item(&item, 1)?;
        self.slots[slot.index()] = None;
        self.apply_to(stats);

        debug!(item = %item.id, ?slot, "Unequipped");
        Ok(item)
    }
}
