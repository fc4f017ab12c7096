//! Gameplay tunables.

use serde::{Deserialize, Serialize};

/// Tunable constants of the simulation core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Player inventory slots
    pub inventory_size: usize,
    /// Player ability slots
    pub ability_slots: usize,
    /// Distance at which a wander destination counts as reached
    pub wander_arrival_distance: f32,
    /// Ability projectile speed (units per second)
    pub projectile_speed: f32,
    /// Ability projectile lifetime (seconds)
    pub projectile_lifetime: f32,
    /// Distance at which a projectile strikes an enemy
    pub projectile_contact_radius: f32,
    /// Radius around a ground hit searched for the closest enemy
    pub smart_cast_radius: f32,
    /// Experience granted by monsters that do not define any
    pub default_kill_experience: f32,
    /// Event bus capacity
    pub event_capacity: usize,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            inventory_size: 20,
            ability_slots: 4,
            wander_arrival_distance: 1.0,
            projectile_speed: 10.0,
            projectile_lifetime: 5.0,
            projectile_contact_radius: 0.5,
            smart_cast_radius: 2.0,
            default_kill_experience: 10.0,
            event_capacity: 1024,
        }
    }
}

impl GameplayConfig {
    /// Returns a copy with nonsensical values replaced by their minimums.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.inventory_size = self.inventory_size.max(1);
        self.ability_slots = self.ability_slots.max(1);
        self.wander_arrival_distance = self.wander_arrival_distance.max(0.01);
        self.projectile_speed = self.projectile_speed.max(0.0);
        self.projectile_lifetime = self.projectile_lifetime.max(0.0);
        self.projectile_contact_radius = self.projectile_contact_radius.max(0.01);
        self.smart_cast_radius = self.smart_cast_radius.max(0.0);
        self.default_kill_experience = self.default_kill_experience.max(0.0);
        self.event_capacity = self.event_capacity.max(1);
        self
    }
}
