//! # Ember Gameplay
//!
//! The simulation core of Project Ember.
//!
//! This crate provides every gameplay rule of the action-RPG, with no I/O:
//! - Character stats, experience and attribute allocation
//! - Combat resolution (hit rolls, damage kinds, attack cadence)
//! - Abilities with gated casting, targeting and projectiles
//! - Enemy behavior state machine, loot and respawn
//! - Inventory and equipment ledgers
//! - Content catalog and the `GameWorld` orchestrator
//! - Event bus for presentation feedback

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod abilities;
pub mod catalog;
pub mod combat;
pub mod config;
pub mod enemy;
pub mod equipment;
pub mod events;
pub mod inventory;
pub mod items;
pub mod loot;
pub mod player;
pub mod projectile;
pub mod session;
pub mod stats;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::abilities::*;
    pub use crate::catalog::*;
    pub use crate::combat::*;
    pub use crate::config::*;
    pub use crate::enemy::*;
    pub use crate::equipment::*;
    pub use crate::events::*;
    pub use crate::inventory::*;
    pub use crate::items::*;
    pub use crate::loot::*;
    pub use crate::player::*;
    pub use crate::projectile::*;
    pub use crate::session::*;
    pub use crate::stats::*;
    pub use crate::world::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::{ItemId, Position};

    #[test]
    fn test_inventory_add_remove() {
        let potion = ItemDefinition::consumable(ItemId::new(1), "Potion", 25.0, 0.0).into_ref();
        let mut inv = Inventory::new(10);

        assert!(inv.add_item(&potion, 5).is_ok());
        assert_eq!(inv.count(potion.id), 5);

        assert_eq!(inv.remove_item(potion.id, 3), 3);
        assert_eq!(inv.count(potion.id), 2);
    }

    #[test]
    fn test_world_runs_without_content() {
        let config = GameplayConfig::default();
        let player = PlayerCharacter::new(Attributes::default(), 1, Position::ZERO, &config);
        let mut world = GameWorld::new(
            config,
            ContentCatalog::new(),
            player,
            MockNavigation::new(),
            MockProbe::new(),
            RecordingSpawner::new(),
        );
        world.tick(1.0 / 60.0);
        assert!(world.player().is_alive());
        assert!(world.drain_events().is_empty());
    }
}
