//! Inventory system.
//!
//! A fixed number of ordered slots, each empty or holding one stack of a
//! single item. Stacks never hold zero units and never exceed the item's
//! maximum stack size.

use ember_common::ItemId;
use thiserror::Error;
use tracing::{debug, warn};

use crate::items::ItemRef;
use crate::stats::StatBlock;

/// Inventory error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Not enough room for the whole addition
    #[error("Inventory full: room for {room}, requested {requested}")]
    Full {
        /// Units that would have fit
        room: u32,
        /// Units requested
        requested: u32,
    },
    /// Item not present
    #[error("Item not found: {0}")]
    NotFound(ItemId),
    /// Slot index outside the inventory
    #[error("Invalid slot {index} (capacity {capacity})")]
    InvalidSlot {
        /// Requested index
        index: usize,
        /// Inventory capacity
        capacity: usize,
    },
    /// Slot holds nothing
    #[error("Slot {0} is empty")]
    EmptySlot(usize),
    /// Item cannot be used
    #[error("Item is not consumable: {0}")]
    NotConsumable(ItemId),
    /// The user has no health left
    #[error("Cannot use {0} while dead")]
    UserDead(ItemId),
}

/// Result type for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// One occupied inventory slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStack {
    item: ItemRef,
    quantity: u32,
}

impl ItemStack {
    /// The item in this stack.
    #[must_use]
    pub fn item(&self) -> &ItemRef {
        &self.item
    }

    /// Units in this stack (always ≥ 1).
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Id of the stacked item.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        self.item.id
    }

    fn space(&self) -> u32 {
        self.item.max_stack_size().saturating_sub(self.quantity)
    }
}

/// What a slot move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Stack relocated into an empty slot.
    Moved,
    /// Units transferred onto a matching stack.
    Stacked {
        /// Units transferred
        transferred: u32,
    },
    /// The two slots exchanged contents.
    Swapped,
    /// Source and destination were the same slot.
    Unchanged,
}

/// Amounts restored by using a consumable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumeReport {
    /// Health actually restored
    pub health: f32,
    /// Mana actually restored
    pub mana: f32,
}

/// A slot-based inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    slots: Vec<Option<ItemStack>>,
}

impl Inventory {
    /// Creates an empty inventory with `capacity` slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Contents of slot `index`.
    #[must_use]
    pub fn slot(&self, index: usize) -> Option<&ItemStack> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Iterates over every slot in order.
    pub fn slots(&self) -> impl Iterator<Item = Option<&ItemStack>> {
        self.slots.iter().map(Option::as_ref)
    }

    /// Iterates over occupied slots with their indices.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|stack| (i, stack)))
    }

    /// Total units of `item` across all slots.
    #[must_use]
    pub fn count(&self, item: ItemId) -> u32 {
        self.occupied()
            .filter(|(_, s)| s.item_id() == item)
            .map(|(_, s)| s.quantity)
            .sum()
    }

    /// Checks if the inventory holds at least `quantity` units of `item`.
    #[must_use]
    pub fn has_item(&self, item: ItemId, quantity: u32) -> bool {
        self.count(item) >= quantity
    }

    /// Number of empty slots.
    #[must_use]
    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Checks for at least one empty slot.
    #[must_use]
    pub fn has_free_slot(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// Checks if no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// First stored handle for `item`, if any.
    #[must_use]
    pub fn find(&self, item: ItemId) -> Option<&ItemRef> {
        self.occupied()
            .find(|(_, s)| s.item_id() == item)
            .map(|(_, s)| &s.item)
    }

    /// Units of `item` that could be added right now.
    #[must_use]
    pub fn room_for(&self, item: &ItemRef) -> u32 {
        let per_slot = item.max_stack_size();
        let topping: u32 = if item.stackable {
            self.occupied()
                .filter(|(_, s)| s.item_id() == item.id)
                .map(|(_, s)| s.space())
                .sum()
        } else {
            0
        };
        let fresh = (self.free_slots() as u32).saturating_mul(per_slot);
        topping.saturating_add(fresh)
    }

    /// Adds `quantity` units of `item`.
    ///
    /// Existing partial stacks are topped up first, then empty slots are
    /// filled in order. The addition is all-or-nothing: if the whole
    /// quantity does not fit, nothing changes.
    pub fn add_item(&mut self, item: &ItemRef, quantity: u32) -> InventoryResult<()> {
        if quantity == 0 {
            return Ok(());
        }
        let room = self.room_for(item);
        if room < quantity {
            warn!(item = %item.id, room, requested = quantity, "Inventory full");
            return Err(InventoryError::Full {
                room,
                requested: quantity,
            });
        }

        let mut remaining = quantity;
        if item.stackable {
            for stack in self.slots.iter_mut().flatten() {
                if remaining == 0 {
                    break;
                }
                if stack.item_id() == item.id {
                    let moved = stack.space().min(remaining);
                    stack.quantity += moved;
                    remaining -= moved;
                }
            }
        }

        let per_slot = item.max_stack_size();
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            if slot.is_none() {
                let placed = per_slot.min(remaining);
                *slot = Some(ItemStack {
                    item: ItemRef::clone(item),
                    quantity: placed,
                });
                remaining -= placed;
            }
        }

        debug!(item = %item.id, quantity, "Added to inventory");
        Ok(())
    }

    /// Removes up to `quantity` units of `item`, draining slots in order.
    ///
    /// Emptied slots are cleared. Returns the number of units removed.
    pub fn remove_item(&mut self, item: ItemId, quantity: u32) -> u32 {
        let mut remaining = quantity;
        for slot in &mut self.slots {
            if remaining == 0 {
                break;
            }
            let Some(stack) = slot else { continue };
            if stack.item_id() != item {
                continue;
            }
            let taken = stack.quantity.min(remaining);
            stack.quantity -= taken;
            remaining -= taken;
            if stack.quantity == 0 {
                *slot = None;
            }
        }
        quantity - remaining
    }

    /// Moves the contents of slot `from` onto slot `to`.
    ///
    /// Empty destination relocates; a matching stackable item transfers as
    /// many units as fit (swapping if none fit); anything else swaps.
    pub fn move_item(&mut self, from: usize, to: usize) -> InventoryResult<MoveOutcome> {
        let capacity = self.capacity();
        for index in [from, to] {
            if index >= capacity {
                return Err(InventoryError::InvalidSlot { index, capacity });
            }
        }
        if self.slots[from].is_none() {
            return Err(InventoryError::EmptySlot(from));
        }
        if from == to {
            return Ok(MoveOutcome::Unchanged);
        }

        if self.slots[to].is_none() {
            self.slots.swap(from, to);
            return Ok(MoveOutcome::Moved);
        }

        let transfer = match (&self.slots[from], &self.slots[to]) {
            (Some(src), Some(dst)) if src.item_id() == dst.item_id() && src.item.stackable => {
                src.quantity.min(dst.space())
            },
            _ => 0,
        };

        if transfer == 0 {
            self.slots.swap(from, to);
            return Ok(MoveOutcome::Swapped);
        }

        if let Some(dst) = self.slots[to].as_mut() {
            dst.quantity += transfer;
        }
        if let Some(src) = self.slots[from].as_mut() {
            src.quantity -= transfer;
            if src.quantity == 0 {
                self.slots[from] = None;
            }
        }
        Ok(MoveOutcome::Stacked {
            transferred: transfer,
        })
    }

    /// Uses one unit of a consumable, restoring health and mana on `stats`.
    ///
    /// Dead users cannot consume anything; the item stays in the inventory.
    pub fn use_item(&mut self, item: ItemId, stats: &mut StatBlock) -> InventoryResult<ConsumeReport> {
        if stats.is_dead() {
            return Err(InventoryError::UserDead(item));
        }
        let definition = self
            .find(item)
            .cloned()
            .ok_or(InventoryError::NotFound(item))?;
        if !definition.is_consumable() {
            warn!(item = %item, "Tried to use a non-consumable item");
            return Err(InventoryError::NotConsumable(item));
        }

        let report = ConsumeReport {
            health: stats.heal(definition.health_restore),
            mana: stats.restore_mana(definition.mana_restore),
        };
        self.remove_item(item, 1);
        debug!(item = %item, health = report.health, mana = report.mana, "Used consumable");
        Ok(report)
    }

    /// Takes one unit of `item` out of the inventory, returning its handle.
    pub fn take_one(&mut self, item: ItemId) -> InventoryResult<ItemRef> {
        let handle = self
            .find(item)
            .cloned()
            .ok_or(InventoryError::NotFound(item))?;
        self.remove_item(item, 1);
        Ok(handle)
    }
}
