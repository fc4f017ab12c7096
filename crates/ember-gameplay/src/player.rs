//! The player character.
//!
//! Bundles the player's stats with the ledgers and timers that act on them:
//! inventory, equipment, ability bar and the auto-attack timer.

use ember_common::{planar_distance, EntityId, ItemId, Position};
use tracing::debug;

use crate::abilities::AbilityBook;
use crate::combat::{AttackOutcome, AttackTimer, CombatResolver, DamageKind};
use crate::config::GameplayConfig;
use crate::equipment::{Equipment, EquipmentResult};
use crate::inventory::{ConsumeReport, Inventory, InventoryResult};
use crate::items::{EquipSlot, ItemRef};
use crate::stats::{Attribute, Attributes, StatBlock};

/// Why an auto-attack did not happen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackBlocked {
    /// The player is dead.
    PlayerDead,
    /// The target is dead.
    TargetDead,
    /// The target is beyond attack range.
    OutOfRange {
        /// Distance to the target
        distance: f32,
    },
    /// The attack timer has not elapsed.
    Cooldown {
        /// Seconds remaining
        remaining: f32,
    },
}

/// The player character.
#[derive(Debug, Clone)]
pub struct PlayerCharacter {
    id: EntityId,
    position: Position,
    stats: StatBlock,
    inventory: Inventory,
    equipment: Equipment,
    abilities: AbilityBook,
    attack_timer: AttackTimer,
    selected_target: Option<EntityId>,
}

impl PlayerCharacter {
    /// Creates a player at `position`, sized by `config`.
    #[must_use]
    pub fn new(attributes: Attributes, level: u32, position: Position, config: &GameplayConfig) -> Self {
        Self {
            id: EntityId::new(),
            position,
            stats: StatBlock::new(attributes, level),
            inventory: Inventory::new(config.inventory_size),
            equipment: Equipment::new(),
            abilities: AbilityBook::new(config.ability_slots),
            attack_timer: AttackTimer::ready(),
            selected_target: None,
        }
    }

    /// Entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Moves the player. Movement itself is driven by the host.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    /// Stats.
    #[must_use]
    pub const fn stats(&self) -> &StatBlock {
        &self.stats
    }

    /// Mutable stats.
    pub fn stats_mut(&mut self) -> &mut StatBlock {
        &mut self.stats
    }

    /// Inventory.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable inventory, for slot moves.
    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Equipped items.
    #[must_use]
    pub const fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    /// Ability bar.
    #[must_use]
    pub const fn abilities(&self) -> &AbilityBook {
        &self.abilities
    }

    /// Mutable ability bar, for slot assignment.
    pub fn abilities_mut(&mut self) -> &mut AbilityBook {
        &mut self.abilities
    }

    /// Splits the player into the parts a cast needs at once.
    pub fn casting_parts(&mut self) -> (&mut AbilityBook, &mut StatBlock) {
        (&mut self.abilities, &mut self.stats)
    }

    /// Currently selected target.
    #[must_use]
    pub const fn selected_target(&self) -> Option<EntityId> {
        self.selected_target
    }

    /// Selects (or clears) the target used by auto-attack and casting.
    pub fn select_target(&mut self, target: Option<EntityId>) {
        self.selected_target = target;
    }

    /// Check if the player is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    /// Regenerates stats and advances cooldowns.
    pub fn tick(&mut self, dt: f32) {
        self.stats.tick(dt);
        self.abilities.tick(dt);
        self.attack_timer.tick(dt);
    }

    /// Spends an unallocated point on `attribute`. No-op without points.
    pub fn allocate_attribute(&mut self, attribute: Attribute) -> bool {
        self.stats.allocate_attribute(attribute)
    }

    /// Adds items to the inventory.
    pub fn add_item(&mut self, item: &ItemRef, quantity: u32) -> InventoryResult<()> {
        self.inventory.add_item(item, quantity)
    }

    /// Removes up to `quantity` units. Returns how many were removed.
    pub fn remove_item(&mut self, item: ItemId, quantity: u32) -> u32 {
        self.inventory.remove_item(item, quantity)
    }

    /// Uses one consumable.
    pub fn use_item(&mut self, item: ItemId) -> InventoryResult<ConsumeReport> {
        self.inventory.use_item(item, &mut self.stats)
    }

    /// Equips an item from the inventory.
    pub fn equip(&mut self, item: ItemId) -> EquipmentResult<Vec<ItemRef>> {
        self.equipment.equip(item, &mut self.inventory, &mut self.stats)
    }

    /// Returns the item in `slot` to the inventory.
    pub fn unequip(&mut self, slot: EquipSlot) -> EquipmentResult<ItemRef> {
        self.equipment.unequip(slot, &mut self.inventory, &mut self.stats)
    }

    /// Checks whether an auto-attack on a target at `target_position` may happen now.
    pub fn can_attack(&self, target_position: Position, target: &StatBlock) -> Result<(), AttackBlocked> {
        if self.stats.is_dead() {
            return Err(AttackBlocked::PlayerDead);
        }
        if target.is_dead() {
            return Err(AttackBlocked::TargetDead);
        }
        let distance = planar_distance(self.position, target_position);
        if distance > self.stats.attack_range() {
            return Err(AttackBlocked::OutOfRange { distance });
        }
        let speed = self.stats.substats().attack_speed;
        if !self.attack_timer.is_ready(speed) {
            return Err(AttackBlocked::Cooldown {
                remaining: self.attack_timer.remaining(speed),
            });
        }
        Ok(())
    }

    /// Resolves one auto-attack against `target` if range and timer allow.
    pub fn attack(
        &mut self,
        target_position: Position,
        target: &mut StatBlock,
        resolver: &mut CombatResolver,
    ) -> Result<AttackOutcome, AttackBlocked> {
        self.can_attack(target_position, target)?;
        let outcome = resolver.resolve_attack(&self.stats, target, DamageKind::Physical);
        self.attack_timer.reset();
        debug!(player = %self.id, ?outcome, "Player attacked");
        Ok(outcome)
    }
}
