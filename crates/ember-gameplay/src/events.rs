//! Event bus for gameplay diagnostics and presentation feedback.
//!
//! The core publishes what happened during a tick; presentation layers
//! drain the bus once per frame. Publishing never blocks.

use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

use ember_common::{AbilityId, EntityId, ItemId, Position};

use crate::combat::DamageKind;
use crate::enemy::EnemyState;
use crate::items::EquipSlot;

/// Event types that can be sent through the event bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Damage landed on an entity
    DamageDealt {
        /// Attacker, if any
        source: Option<EntityId>,
        /// Entity that took the damage
        target: EntityId,
        /// Amount after mitigation
        amount: f32,
        /// Damage kind
        kind: DamageKind,
    },
    /// An attack missed (distinct from a zero-damage hit)
    AttackMissed {
        /// Attacker
        source: EntityId,
        /// Intended target
        target: EntityId,
    },
    /// Health restored
    Healed {
        /// Entity healed
        target: EntityId,
        /// Amount actually restored
        amount: f32,
    },
    /// An ability passed every gate and was executed
    AbilityCast {
        /// Caster
        caster: EntityId,
        /// Slot index
        slot: usize,
        /// Ability cast
        ability: AbilityId,
    },
    /// A cast was rejected by a gate
    CastFailed {
        /// Caster
        caster: EntityId,
        /// Slot index
        slot: usize,
        /// Human-readable reason
        reason: String,
    },
    /// An enemy changed behavior state
    EnemyStateChanged {
        /// Enemy
        enemy: EntityId,
        /// Previous state
        from: EnemyState,
        /// New state
        to: EnemyState,
    },
    /// An enemy died
    EnemyDied {
        /// Enemy
        enemy: EntityId,
        /// Entity credited with the kill
        killer: Option<EntityId>,
    },
    /// An enemy came back at its spawn point
    EnemyRespawned {
        /// Enemy
        enemy: EntityId,
        /// Spawn position
        position: Position,
    },
    /// Loot was dropped in the world
    LootDropped {
        /// Enemy that dropped it
        enemy: EntityId,
        /// Item dropped
        item: ItemId,
        /// Units dropped
        quantity: u32,
    },
    /// The player gained experience
    ExperienceGained {
        /// Amount gained
        amount: f32,
    },
    /// The player levelled up
    LevelUp {
        /// New level
        level: u32,
        /// Points available to allocate
        unallocated_points: u32,
    },
    /// The player died
    PlayerDied {
        /// Entity that dealt the killing blow
        killer: EntityId,
    },
    /// A projectile was launched
    ProjectileSpawned {
        /// Projectile
        projectile: EntityId,
        /// Ability that fired it
        ability: AbilityId,
    },
    /// A projectile ran out of lifetime or target
    ProjectileExpired {
        /// Projectile
        projectile: EntityId,
    },
    /// A consumable was used
    ItemUsed {
        /// Item used
        item: ItemId,
    },
    /// An item was equipped
    ItemEquipped {
        /// Item equipped
        item: ItemId,
        /// Slot used
        slot: EquipSlot,
    },
    /// An item was unequipped
    ItemUnequipped {
        /// Item unequipped
        item: ItemId,
        /// Slot freed
        slot: EquipSlot,
    },
}

/// Event bus for broadcasting events to subscribers.
#[derive(Debug)]
pub struct EventBus {
    /// Sender for broadcasting events
    sender: Sender<GameEvent>,
    /// Receiver for collecting events
    receiver: Receiver<GameEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an event to the bus.
    pub fn publish(&self, event: GameEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<GameEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a new sender handle for publishing events.
    #[must_use]
    pub fn sender(&self) -> Sender<GameEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(GameEvent::ExperienceGained { amount: 10.0 });
        bus.publish(GameEvent::ItemUsed { item: ItemId::new(1) });
        assert_eq!(bus.pending_count(), 2);

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops_events() {
        let bus = EventBus::new(1);
        bus.publish(GameEvent::ExperienceGained { amount: 1.0 });
        bus.publish(GameEvent::ExperienceGained { amount: 2.0 });
        assert_eq!(bus.drain(), vec![GameEvent::ExperienceGained { amount: 1.0 }]);
    }

    #[test]
    fn test_sender_handle_publishes() {
        let bus = EventBus::default();
        let sender = bus.sender();
        sender
            .try_send(GameEvent::ProjectileExpired {
                projectile: EntityId::from_raw(9),
            })
            .expect("room on bus");
        assert_eq!(bus.pending_count(), 1);
    }
}
