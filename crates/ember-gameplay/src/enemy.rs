//! Enemy behavior.
//!
//! Each enemy runs a small state machine:
//!
//! ```text
//! Wandering --player within sight--> Chasing --within attack range--> Attacking
//!     ^                                 |  ^                              |
//!     +--player too far from spawn------+  +----beyond attack range-------+
//! ```
//!
//! An enemy that gives up a chase walks back to its spawn point before it
//! looks for the player again, unless the player re-enters its territory.
//! `take_aggro` forces Chasing from any state. Idle has no outgoing
//! transitions and is only entered on request or on death.

use std::f32::consts::{PI, TAU};
use std::sync::Arc;

use ember_common::{heading_towards, move_towards, planar_distance, EntityId, MonsterId, Position};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::combat::{AttackOutcome, AttackTimer, CombatResolver, DamageKind};
use crate::loot::{LootDrop, LootTable};
use crate::stats::{Attributes, StatBlock, DEFAULT_ATTACK_RANGE, DEFAULT_MOVEMENT_SPEED};
use crate::world::NavigationService;

/// Distance at which a wander destination counts as reached.
pub const DEFAULT_ARRIVAL_DISTANCE: f32 = 1.0;

// ============================================================================
// Definitions
// ============================================================================

/// Shared handle to an immutable monster definition.
pub type MonsterRef = Arc<MonsterDefinition>;

const fn default_level() -> u32 {
    1
}

const fn default_attack_range() -> f32 {
    DEFAULT_ATTACK_RANGE
}

const fn default_movement_speed() -> f32 {
    DEFAULT_MOVEMENT_SPEED
}

const fn default_hovering_radius() -> f32 {
    5.0
}

const fn default_chase_radius() -> f32 {
    10.0
}

const fn default_respawn_time() -> f32 {
    5.0
}

/// Static data for one kind of monster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterDefinition {
    /// Unique monster id.
    pub id: MonsterId,
    /// Display name.
    pub name: String,
    /// Base attributes.
    #[serde(default)]
    pub attributes: Attributes,
    /// Level.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Melee reach.
    #[serde(default = "default_attack_range")]
    pub attack_range: f32,
    /// Movement speed (units per second).
    #[serde(default = "default_movement_speed")]
    pub movement_speed: f32,
    /// How far a wander step may go.
    #[serde(default = "default_hovering_radius")]
    pub hovering_radius: f32,
    /// Maximum distance between spawn and player before giving up a chase.
    #[serde(default = "default_chase_radius")]
    pub chase_radius: f32,
    /// Detection range; defaults to `chase_radius`.
    #[serde(default)]
    pub sight_range: Option<f32>,
    /// Experience granted on defeat; the gameplay default applies if unset.
    #[serde(default)]
    pub experience: Option<f32>,
    /// Seconds between death and respawn.
    #[serde(default = "default_respawn_time")]
    pub respawn_time: f32,
    /// Drops rolled on death.
    #[serde(default)]
    pub loot: LootTable,
}

impl MonsterDefinition {
    /// Creates a definition with default attributes and radii.
    #[must_use]
    pub fn new(id: MonsterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            attributes: Attributes::default(),
            level: default_level(),
            attack_range: default_attack_range(),
            movement_speed: default_movement_speed(),
            hovering_radius: default_hovering_radius(),
            chase_radius: default_chase_radius(),
            sight_range: None,
            experience: None,
            respawn_time: default_respawn_time(),
            loot: LootTable::default(),
        }
    }

    /// Set attributes and level.
    #[must_use]
    pub fn with_attributes(mut self, attributes: Attributes, level: u32) -> Self {
        self.attributes = attributes;
        self.level = level;
        self
    }

    /// Set wander and chase radii.
    #[must_use]
    pub fn with_radii(mut self, hovering: f32, chase: f32) -> Self {
        self.hovering_radius = hovering;
        self.chase_radius = chase;
        self
    }

    /// Set a sight range distinct from the chase radius.
    #[must_use]
    pub fn with_sight_range(mut self, range: f32) -> Self {
        self.sight_range = Some(range);
        self
    }

    /// Set attack range and movement speed.
    #[must_use]
    pub fn with_movement(mut self, attack_range: f32, movement_speed: f32) -> Self {
        self.attack_range = attack_range;
        self.movement_speed = movement_speed;
        self
    }

    /// Set the experience reward.
    #[must_use]
    pub fn with_experience(mut self, experience: f32) -> Self {
        self.experience = Some(experience);
        self
    }

    /// Set the respawn delay.
    #[must_use]
    pub fn with_respawn_time(mut self, seconds: f32) -> Self {
        self.respawn_time = seconds;
        self
    }

    /// Set the loot table.
    #[must_use]
    pub fn with_loot(mut self, loot: LootTable) -> Self {
        self.loot = loot;
        self
    }

    /// Effective detection range.
    #[must_use]
    pub fn sight_range(&self) -> f32 {
        self.sight_range.unwrap_or(self.chase_radius)
    }

    /// Fresh stat block for an instance of this monster.
    #[must_use]
    pub fn spawn_stats(&self) -> StatBlock {
        StatBlock::new(self.attributes, self.level)
            .with_attack_range(self.attack_range)
            .with_movement_speed(self.movement_speed)
    }

    /// Wraps the definition in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> MonsterRef {
        Arc::new(self)
    }
}

// ============================================================================
// State Machine
// ============================================================================

/// Behavior state of an enemy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyState {
    /// Roaming near its current position.
    #[default]
    Wandering,
    /// Pursuing its target.
    Chasing,
    /// In reach of its target and attacking.
    Attacking,
    /// Doing nothing.
    Idle,
}

/// The player as seen by an enemy during one tick.
#[derive(Debug)]
pub struct PlayerTarget<'a> {
    /// Player entity.
    pub id: EntityId,
    /// Player position.
    pub position: Position,
    /// Player stats, mutated by enemy attacks.
    pub stats: &'a mut StatBlock,
}

/// What one enemy tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EnemyUpdate {
    /// State change, if any.
    pub transition: Option<(EnemyState, EnemyState)>,
    /// Attack resolved against the player, if any.
    pub attack: Option<AttackOutcome>,
    /// Set when the enemy came back to life this tick.
    pub respawned: bool,
}

/// A live (or respawning) enemy.
#[derive(Debug, Clone)]
pub struct Enemy {
    id: EntityId,
    definition: MonsterRef,
    stats: StatBlock,
    position: Position,
    spawn: Position,
    facing: f32,
    state: EnemyState,
    destination: Option<Position>,
    returning: bool,
    attack_timer: AttackTimer,
    target: Option<EntityId>,
    respawn_timer: Option<f32>,
    arrival_distance: f32,
}

impl Enemy {
    /// Spawns an enemy of `definition` at `spawn`.
    #[must_use]
    pub fn new(definition: MonsterRef, spawn: Position) -> Self {
        Self {
            id: EntityId::new(),
            stats: definition.spawn_stats(),
            definition,
            position: spawn,
            spawn,
            facing: 0.0,
            state: EnemyState::Wandering,
            destination: None,
            returning: false,
            attack_timer: AttackTimer::cooling(),
            target: None,
            respawn_timer: None,
            arrival_distance: DEFAULT_ARRIVAL_DISTANCE,
        }
    }

    /// Sets the distance at which wander destinations count as reached.
    #[must_use]
    pub fn with_arrival_distance(mut self, distance: f32) -> Self {
        self.arrival_distance = distance.max(0.0);
        self
    }

    /// Entity id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Monster definition.
    #[must_use]
    pub fn definition(&self) -> &MonsterRef {
        &self.definition
    }

    /// Current stats.
    #[must_use]
    pub const fn stats(&self) -> &StatBlock {
        &self.stats
    }

    /// Mutable stats, for damage and healing from outside.
    pub fn stats_mut(&mut self) -> &mut StatBlock {
        &mut self.stats
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Spawn position.
    #[must_use]
    pub const fn spawn(&self) -> Position {
        self.spawn
    }

    /// Heading in radians around the vertical axis.
    #[must_use]
    pub const fn facing(&self) -> f32 {
        self.facing
    }

    /// Current behavior state.
    #[must_use]
    pub const fn state(&self) -> EnemyState {
        self.state
    }

    /// Current wander destination.
    #[must_use]
    pub const fn destination(&self) -> Option<Position> {
        self.destination
    }

    /// Whether the enemy is walking back to spawn after giving up a chase.
    #[must_use]
    pub const fn is_returning(&self) -> bool {
        self.returning
    }

    /// Current aggro target.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Check if the enemy is alive and interactive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.respawn_timer.is_none() && self.stats.is_alive()
    }

    /// Seconds until respawn, while dead.
    #[must_use]
    pub const fn respawn_remaining(&self) -> Option<f32> {
        self.respawn_timer
    }

    /// Moves the enemy without touching its spawn point.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    fn set_state(&mut self, state: EnemyState) -> Option<(EnemyState, EnemyState)> {
        if self.state == state {
            return None;
        }
        let from = self.state;
        self.state = state;
        debug!(enemy = %self.id, ?from, to = ?state, "Enemy state changed");
        Some((from, state))
    }

    /// Forces the enemy to chase `attacker`, whatever its state or distance.
    ///
    /// Dead enemies ignore aggro.
    pub fn take_aggro(&mut self, attacker: EntityId) -> Option<(EnemyState, EnemyState)> {
        if !self.is_alive() {
            return None;
        }
        self.target = Some(attacker);
        self.destination = None;
        self.returning = false;
        self.set_state(EnemyState::Chasing)
    }

    /// Puts the enemy to rest. It stays Idle until aggroed or respawned.
    pub fn set_idle(&mut self) -> Option<(EnemyState, EnemyState)> {
        self.destination = None;
        self.returning = false;
        self.set_state(EnemyState::Idle)
    }

    /// Handles death: leaves every active state, rolls loot and starts the respawn timer.
    pub fn on_death(&mut self, resolver: &mut CombatResolver) -> Vec<LootDrop> {
        if self.respawn_timer.is_some() {
            return Vec::new();
        }
        self.target = None;
        self.destination = None;
        self.returning = false;
        self.set_state(EnemyState::Idle);
        self.respawn_timer = Some(self.definition.respawn_time.max(0.0));
        info!(enemy = %self.id, monster = %self.definition.name, "Enemy died");

        if self.definition.loot.is_empty() {
            warn!(monster = %self.definition.name, "Monster has no loot table");
            return Vec::new();
        }
        self.definition.loot.roll(resolver.rng_mut())
    }

    fn respawn(&mut self) {
        self.stats.restore_full();
        self.position = self.spawn;
        self.destination = None;
        self.returning = false;
        self.target = None;
        self.attack_timer = AttackTimer::cooling();
        self.respawn_timer = None;
        self.state = EnemyState::Wandering;
        info!(enemy = %self.id, monster = %self.definition.name, "Enemy respawned");
    }

    /// Advances the enemy by `dt` seconds.
    pub fn tick(
        &mut self,
        dt: f32,
        player: &mut PlayerTarget<'_>,
        nav: &dyn NavigationService,
        resolver: &mut CombatResolver,
    ) -> EnemyUpdate {
        let dt = dt.max(0.0);
        let mut update = EnemyUpdate::default();

        if let Some(remaining) = self.respawn_timer {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.respawn();
                update.respawned = true;
                update.transition = Some((EnemyState::Idle, EnemyState::Wandering));
            } else {
                self.respawn_timer = Some(remaining);
            }
            return update;
        }

        self.stats.tick(dt);
        self.attack_timer.tick(dt);

        let player_alive = player.stats.is_alive();
        if matches!(self.state, EnemyState::Chasing | EnemyState::Attacking)
            && (!player_alive || self.target != Some(player.id))
        {
            self.target = None;
            update.transition = self.set_state(EnemyState::Wandering);
            return update;
        }

        match self.state {
            EnemyState::Wandering => {
                update.transition = self.wander(dt, player, player_alive, nav, resolver);
            },
            EnemyState::Chasing => {
                update.transition = self.chase(dt, player.position, nav);
            },
            EnemyState::Attacking => {
                let (transition, attack) = self.attack(dt, player, nav, resolver);
                update.transition = transition;
                update.attack = attack;
            },
            EnemyState::Idle => {},
        }
        update
    }

    fn wander(
        &mut self,
        dt: f32,
        player: &PlayerTarget<'_>,
        player_alive: bool,
        nav: &dyn NavigationService,
        resolver: &mut CombatResolver,
    ) -> Option<(EnemyState, EnemyState)> {
        let in_sight =
            player_alive && planar_distance(self.position, player.position) <= self.definition.sight_range();
        // On the way home only a player back inside the territory counts.
        let in_territory = planar_distance(self.spawn, player.position) <= self.definition.chase_radius;
        if in_sight && (!self.returning || in_territory) {
            self.target = Some(player.id);
            self.destination = None;
            self.returning = false;
            return self.set_state(EnemyState::Chasing);
        }

        if self.destination.is_none() {
            self.destination = self.pick_wander_point(nav, resolver);
        }
        if let Some(destination) = self.destination {
            if !self.step_towards(destination, dt, nav)
                || planar_distance(self.position, destination) < self.arrival_distance
            {
                self.destination = None;
                self.returning = false;
            }
        }
        None
    }

    fn pick_wander_point(
        &self,
        nav: &dyn NavigationService,
        resolver: &mut CombatResolver,
    ) -> Option<Position> {
        let radius = self.definition.hovering_radius.max(0.0);
        let rng = resolver.rng_mut();
        let angle = rng.f32() * TAU;
        // sqrt keeps the samples uniform over the disc
        let distance = radius * rng.f32().sqrt();
        let candidate = self.position + Position::new(angle.cos() * distance, 0.0, angle.sin() * distance);
        nav.find_nearest_navigable_point(candidate, radius)
    }

    fn chase(
        &mut self,
        dt: f32,
        player_position: Position,
        nav: &dyn NavigationService,
    ) -> Option<(EnemyState, EnemyState)> {
        if planar_distance(self.spawn, player_position) > self.definition.chase_radius {
            self.destination = Some(self.spawn);
            self.returning = true;
            return self.set_state(EnemyState::Wandering);
        }
        if planar_distance(self.position, player_position) <= self.stats.attack_range() {
            return self.set_state(EnemyState::Attacking);
        }
        self.step_towards(player_position, dt, nav);
        None
    }

    fn attack(
        &mut self,
        dt: f32,
        player: &mut PlayerTarget<'_>,
        nav: &dyn NavigationService,
        resolver: &mut CombatResolver,
    ) -> (Option<(EnemyState, EnemyState)>, Option<AttackOutcome>) {
        if planar_distance(self.position, player.position) > self.stats.attack_range() {
            return (self.set_state(EnemyState::Chasing), None);
        }
        self.turn_towards(player.position, dt, nav.angular_speed());

        let mut outcome = None;
        if self.attack_timer.is_ready(self.stats.substats().attack_speed) {
            outcome = Some(resolver.resolve_attack(&self.stats, player.stats, DamageKind::Physical));
            self.attack_timer.reset();
        }
        (None, outcome)
    }

    /// Moves one step along the navigation route. Returns false if unreachable.
    fn step_towards(&mut self, destination: Position, dt: f32, nav: &dyn NavigationService) -> bool {
        let Some(waypoint) = nav.next_waypoint(self.position, destination) else {
            return false;
        };
        self.turn_towards(waypoint, dt, nav.angular_speed());
        self.position = move_towards(self.position, waypoint, self.stats.movement_speed() * dt);
        true
    }

    fn turn_towards(&mut self, point: Position, dt: f32, angular_speed: f32) {
        let Some(heading) = heading_towards(self.position, point) else {
            return;
        };
        let delta = wrap_angle(heading - self.facing);
        let max_turn = angular_speed.max(0.0) * dt;
        self.facing = wrap_angle(self.facing + delta.clamp(-max_turn, max_turn));
    }
}

/// Wraps an angle into (-PI, PI].
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loot::DropEntry;
    use crate::world::MockNavigation;
    use ember_common::ItemId;

    fn goblin() -> MonsterRef {
        MonsterDefinition::new(MonsterId::new(1), "Goblin")
            .with_radii(5.0, 10.0)
            .with_movement(2.0, 5.0)
            .into_ref()
    }

    fn player_at(stats: &mut StatBlock, x: f32, z: f32) -> PlayerTarget<'_> {
        PlayerTarget {
            id: EntityId::from_raw(1),
            position: Position::new(x, 0.0, z),
            stats,
        }
    }

    #[test]
    fn test_sight_range_boundary_is_inclusive() {
        let nav = MockNavigation::new().with_unreachable(true);
        let mut resolver = CombatResolver::with_seed(1);
        let mut stats = StatBlock::default();

        let mut far = Enemy::new(goblin(), Position::ZERO);
        let update = far.tick(0.1, &mut player_at(&mut stats, 10.01, 0.0), &nav, &mut resolver);
        assert_eq!(update.transition, None);
        assert_eq!(far.state(), EnemyState::Wandering);

        let mut edge = Enemy::new(goblin(), Position::ZERO);
        let update = edge.tick(0.1, &mut player_at(&mut stats, 10.0, 0.0), &nav, &mut resolver);
        assert_eq!(update.transition, Some((EnemyState::Wandering, EnemyState::Chasing)));
        assert_eq!(edge.target(), Some(EntityId::from_raw(1)));
    }

    #[test]
    fn test_give_up_measures_from_spawn() {
        let nav = MockNavigation::new();
        let mut resolver = CombatResolver::with_seed(2);
        let mut stats = StatBlock::default();

        let mut enemy = Enemy::new(goblin(), Position::ZERO);
        enemy.set_position(Position::new(20.0, 0.0, 0.0));
        enemy.take_aggro(EntityId::from_raw(1));

        // Player is right next to the enemy but 23 units from its spawn.
        let update = enemy.tick(0.1, &mut player_at(&mut stats, 23.0, 0.0), &nav, &mut resolver);
        assert_eq!(update.transition, Some((EnemyState::Chasing, EnemyState::Wandering)));
        assert_eq!(enemy.destination(), Some(Position::ZERO));
    }

    #[test]
    fn test_chase_then_attack_then_chase() {
        let nav = MockNavigation::new();
        let mut resolver = CombatResolver::with_seed(3);
        let mut stats = StatBlock::default();
        let mut enemy = Enemy::new(goblin(), Position::ZERO);
        enemy.take_aggro(EntityId::from_raw(1));

        // Closes 0.5 units per tick from 4 units away.
        let mut attacking = false;
        for _ in 0..10 {
            let update = enemy.tick(0.1, &mut player_at(&mut stats, 4.0, 0.0), &nav, &mut resolver);
            if update.transition == Some((EnemyState::Chasing, EnemyState::Attacking)) {
                attacking = true;
                break;
            }
        }
        assert!(attacking);
        assert!(planar_distance(enemy.position(), Position::new(4.0, 0.0, 0.0)) <= 2.0);

        let update = enemy.tick(0.1, &mut player_at(&mut stats, 9.0, 0.0), &nav, &mut resolver);
        assert_eq!(update.transition, Some((EnemyState::Attacking, EnemyState::Chasing)));
    }

    #[test]
    fn test_attack_cadence_follows_attack_speed() {
        let nav = MockNavigation::new();
        let mut resolver = CombatResolver::with_seed(4);
        let mut stats = StatBlock::default();
        let mut enemy = Enemy::new(goblin(), Position::ZERO);
        enemy.take_aggro(EntityId::from_raw(1));
        enemy.tick(0.0, &mut player_at(&mut stats, 1.0, 0.0), &nav, &mut resolver);
        assert_eq!(enemy.state(), EnemyState::Attacking);

        // attack speed 1.2 -> one attack every 0.8333 s
        let mut attacks = 0;
        for _ in 0..20 {
            let update = enemy.tick(0.1, &mut player_at(&mut stats, 1.0, 0.0), &nav, &mut resolver);
            if update.attack.is_some() {
                attacks += 1;
            }
        }
        assert_eq!(attacks, 2);
    }

    #[test]
    fn test_aggro_overrides_idle_and_distance() {
        let nav = MockNavigation::new();
        let mut resolver = CombatResolver::with_seed(5);
        let mut stats = StatBlock::default();
        let mut enemy = Enemy::new(goblin(), Position::ZERO);
        enemy.set_idle();
        enemy.tick(1.0, &mut player_at(&mut stats, 1.0, 0.0), &nav, &mut resolver);
        assert_eq!(enemy.state(), EnemyState::Idle);

        assert_eq!(
            enemy.take_aggro(EntityId::from_raw(1)),
            Some((EnemyState::Idle, EnemyState::Chasing))
        );
    }

    #[test]
    fn test_dead_player_releases_target() {
        let nav = MockNavigation::new();
        let mut resolver = CombatResolver::with_seed(6);
        let mut stats = StatBlock::default();
        stats.take_damage(f32::MAX);
        let mut enemy = Enemy::new(goblin(), Position::ZERO);
        enemy.take_aggro(EntityId::from_raw(1));

        let update = enemy.tick(0.1, &mut player_at(&mut stats, 1.0, 0.0), &nav, &mut resolver);
        assert_eq!(update.transition, Some((EnemyState::Chasing, EnemyState::Wandering)));
        assert_eq!(enemy.target(), None);

        let update = enemy.tick(0.1, &mut player_at(&mut stats, 1.0, 0.0), &nav, &mut resolver);
        assert_eq!(update.transition, None);
    }

    #[test]
    fn test_death_loot_and_respawn() {
        let definition = MonsterDefinition::new(MonsterId::new(2), "Slime")
            .with_respawn_time(1.0)
            .with_loot(LootTable::default().with_entry(DropEntry::new(ItemId::new(7), 1.0)))
            .into_ref();
        let nav = MockNavigation::new().with_unreachable(true);
        let mut resolver = CombatResolver::with_seed(7);
        let mut stats = StatBlock::default();

        let mut enemy = Enemy::new(definition, Position::new(3.0, 0.0, 3.0));
        enemy.set_position(Position::new(8.0, 0.0, 3.0));
        enemy.stats_mut().take_damage(f32::MAX);
        let drops = enemy.on_death(&mut resolver);
        assert_eq!(drops, vec![LootDrop { item: ItemId::new(7), quantity: 1 }]);
        assert!(!enemy.is_alive());
        assert!(enemy.on_death(&mut resolver).is_empty());
        assert_eq!(enemy.take_aggro(EntityId::from_raw(1)), None);

        let update = enemy.tick(0.6, &mut player_at(&mut stats, 50.0, 0.0), &nav, &mut resolver);
        assert!(!update.respawned);
        let update = enemy.tick(0.6, &mut player_at(&mut stats, 50.0, 0.0), &nav, &mut resolver);
        assert!(update.respawned);
        assert!(enemy.is_alive());
        assert_eq!(enemy.position(), enemy.spawn());
        assert_eq!(enemy.state(), EnemyState::Wandering);
        assert_eq!(enemy.stats().health(), enemy.stats().max_health());
    }

    #[test]
    fn test_wander_picks_destination_within_radius() {
        let nav = MockNavigation::new();
        let mut stats = StatBlock::default();
        for seed in 0..20 {
            let mut resolver = CombatResolver::with_seed(seed);
            let mut enemy = Enemy::new(goblin(), Position::ZERO).with_arrival_distance(0.0);
            enemy.tick(0.01, &mut player_at(&mut stats, 100.0, 100.0), &nav, &mut resolver);
            let destination = enemy.destination().expect("wander destination");
            assert!(planar_distance(destination, Position::ZERO) <= 5.0 + 1e-4);
        }
    }

    #[test]
    fn test_wander_destination_clears_on_arrival() {
        let nav = MockNavigation::new();
        let mut resolver = CombatResolver::with_seed(8);
        let mut stats = StatBlock::default();
        let mut enemy = Enemy::new(goblin(), Position::ZERO);

        let mut previous = None;
        let mut arrived = false;
        for _ in 0..30 {
            enemy.tick(0.1, &mut player_at(&mut stats, 100.0, 100.0), &nav, &mut resolver);
            if let (Some(destination), None) = (previous, enemy.destination()) {
                assert!(planar_distance(enemy.position(), destination) < DEFAULT_ARRIVAL_DISTANCE);
                arrived = true;
                break;
            }
            previous = enemy.destination();
        }
        assert!(arrived);
        assert_eq!(enemy.state(), EnemyState::Wandering);
    }

    #[test]
    fn test_gives_up_and_walks_home() {
        let nav = MockNavigation::new();
        let mut resolver = CombatResolver::with_seed(9);
        let mut stats = StatBlock::default();
        let mut enemy = Enemy::new(goblin(), Position::ZERO);
        enemy.set_position(Position::new(20.0, 0.0, 0.0));
        enemy.take_aggro(EntityId::from_raw(1));

        // Player stays in sight of the enemy but outside its territory.
        let update = enemy.tick(0.1, &mut player_at(&mut stats, 23.0, 0.0), &nav, &mut resolver);
        assert_eq!(update.transition, Some((EnemyState::Chasing, EnemyState::Wandering)));
        assert!(enemy.is_returning());

        let mut distance = planar_distance(enemy.position(), enemy.spawn());
        for _ in 0..19 {
            let update = enemy.tick(0.1, &mut player_at(&mut stats, 23.0, 0.0), &nav, &mut resolver);
            assert_eq!(update.transition, None);
            let now = planar_distance(enemy.position(), enemy.spawn());
            assert!(now < distance);
            distance = now;
        }
        assert!(distance < 11.0);

        for _ in 0..30 {
            enemy.tick(0.1, &mut player_at(&mut stats, 23.0, 0.0), &nav, &mut resolver);
        }
        assert!(!enemy.is_returning());
        assert!(planar_distance(enemy.position(), enemy.spawn()) <= 5.0 + DEFAULT_ARRIVAL_DISTANCE);
        assert_eq!(enemy.state(), EnemyState::Wandering);
    }

    #[test]
    fn test_returning_enemy_reengages_inside_territory() {
        let nav = MockNavigation::new();
        let mut resolver = CombatResolver::with_seed(10);
        let mut stats = StatBlock::default();
        let mut enemy = Enemy::new(goblin(), Position::ZERO);
        enemy.set_position(Position::new(20.0, 0.0, 0.0));
        enemy.take_aggro(EntityId::from_raw(1));
        enemy.tick(0.1, &mut player_at(&mut stats, 23.0, 0.0), &nav, &mut resolver);
        enemy.tick(0.1, &mut player_at(&mut stats, 23.0, 0.0), &nav, &mut resolver);
        assert!(enemy.is_returning());

        // Enemy is at 19.5; the player steps back within 10 of spawn and of the enemy.
        let update = enemy.tick(0.1, &mut player_at(&mut stats, 10.0, 0.0), &nav, &mut resolver);
        assert_eq!(update.transition, Some((EnemyState::Wandering, EnemyState::Chasing)));
        assert!(!enemy.is_returning());
        assert_eq!(enemy.target(), Some(EntityId::from_raw(1)));
    }

    #[test]
    fn test_no_attack_once_target_leaves_range() {
        let nav = MockNavigation::new();
        let mut resolver = CombatResolver::with_seed(11);
        let mut stats = StatBlock::default();
        let mut enemy = Enemy::new(goblin(), Position::ZERO);
        enemy.take_aggro(EntityId::from_raw(1));
        enemy.tick(0.0, &mut player_at(&mut stats, 1.0, 0.0), &nav, &mut resolver);
        assert_eq!(enemy.state(), EnemyState::Attacking);

        // Long enough for the attack timer to be ready.
        let health = stats.health();
        let update = enemy.tick(5.0, &mut player_at(&mut stats, 9.0, 0.0), &nav, &mut resolver);
        assert_eq!(update.transition, Some((EnemyState::Attacking, EnemyState::Chasing)));
        assert_eq!(update.attack, None);
        assert_eq!(stats.health(), health);
    }

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-0.5) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sight_defaults_to_chase_radius() {
        let definition: MonsterDefinition = toml::from_str(
            r#"
            id = 3
            name = "Bat"
            chase_radius = 12.0
            "#,
        )
        .expect("valid monster");
        assert_eq!(definition.sight_range(), 12.0);
        assert_eq!(definition.level, 1);
        assert_eq!(definition.respawn_time, 5.0);
    }
}
