//! Headless host for the gameplay core.
//!
//! Supplies an open-field world (straight-line navigation, scripted aim,
//! logging spawner) and an autopilot that plays the character: it picks the
//! nearest enemy, walks into range, casts what is ready, drinks potions and
//! picks up loot.

use ember_common::{move_towards, planar_distance, AbilityId, EntityId, ItemId, Position};
use ember_gameplay::{
    AbilityKind, AbilityRef, Attribute, FloatingText, GameEvent, GameWorld, ItemKind, ItemRef,
    NavigationService, ProbeHit, SpawnFactory, TargetKind, WorldProbe,
};
use tracing::{debug, info, warn};

/// World driven by the headless host.
pub type DemoWorld = GameWorld<OpenField, ScriptedAim, LogSpawner>;

// ============================================================================
// Collaborators
// ============================================================================

/// Navigation over flat, obstacle-free ground.
#[derive(Debug, Clone)]
pub struct OpenField {
    angular_speed: f32,
}

impl Default for OpenField {
    fn default() -> Self {
        Self {
            angular_speed: std::f32::consts::TAU,
        }
    }
}

impl NavigationService for OpenField {
    fn find_nearest_navigable_point(&self, point: Position, _radius: f32) -> Option<Position> {
        Some(Position::new(point.x, 0.0, point.z))
    }

    fn next_waypoint(&self, _from: Position, to: Position) -> Option<Position> {
        Some(to)
    }

    fn angular_speed(&self) -> f32 {
        self.angular_speed
    }
}

/// Aim probe that reports whatever the autopilot last aimed at.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAim {
    hit: Option<ProbeHit>,
}

impl ScriptedAim {
    /// Points the aim at `hit` (or at nothing).
    pub fn aim(&mut self, hit: Option<ProbeHit>) {
        self.hit = hit;
    }
}

impl WorldProbe for ScriptedAim {
    fn probe(&mut self) -> Option<ProbeHit> {
        self.hit
    }
}

/// Spawner that logs presentation requests and counts them.
#[derive(Debug, Clone, Default)]
pub struct LogSpawner {
    floating_texts: usize,
    items_dropped: usize,
    projectiles: usize,
}

impl LogSpawner {
    /// Floating texts shown.
    #[must_use]
    pub const fn floating_texts(&self) -> usize {
        self.floating_texts
    }

    /// Item units dropped.
    #[must_use]
    pub const fn items_dropped(&self) -> usize {
        self.items_dropped
    }

    /// Projectile visuals created.
    #[must_use]
    pub const fn projectiles(&self) -> usize {
        self.projectiles
    }
}

impl SpawnFactory for LogSpawner {
    fn spawn_floating_text(&mut self, position: Position, text: FloatingText) {
        self.floating_texts += 1;
        debug!(?position, ?text, "Floating text");
    }

    fn spawn_item(&mut self, item: &ItemRef, position: Position) {
        self.items_dropped += 1;
        debug!(item = %item.id, name = %item.name, ?position, "Item dropped");
    }

    fn spawn_projectile(&mut self, id: EntityId, ability: AbilityId, position: Position) {
        self.projectiles += 1;
        debug!(projectile = %id, %ability, ?position, "Projectile spawned");
    }

    fn despawn(&mut self, id: EntityId) {
        debug!(entity = %id, "Despawned");
    }

    fn set_active(&mut self, id: EntityId, active: bool) {
        debug!(entity = %id, active, "Activity toggled");
    }
}

// ============================================================================
// Autopilot
// ============================================================================

/// Tallies of what happened during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Steps simulated
    pub ticks: u64,
    /// Enemies killed
    pub kills: u32,
    /// Abilities cast
    pub casts: u32,
    /// Casts rejected by a gate
    pub failed_casts: u32,
    /// Damage dealt by the player
    pub damage_dealt: f32,
    /// Damage taken by the player
    pub damage_taken: f32,
    /// Attacks that missed, either way
    pub misses: u32,
    /// Item units picked up
    pub items_looted: u32,
    /// Experience gained
    pub experience: f32,
    /// Times the player died
    pub deaths: u32,
}

impl RunSummary {
    /// Logs the summary.
    pub fn log(&self) {
        info!(
            ticks = self.ticks,
            kills = self.kills,
            casts = self.casts,
            failed_casts = self.failed_casts,
            damage_dealt = self.damage_dealt,
            damage_taken = self.damage_taken,
            misses = self.misses,
            items_looted = self.items_looted,
            experience = self.experience,
            deaths = self.deaths,
            "Run finished"
        );
    }
}

/// Plays the character without input.
#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Attribute that receives every unallocated point
    focus: Attribute,
    /// Health fraction below which a potion is used
    potion_threshold: f32,
    /// Health fraction below which heal abilities are cast
    heal_threshold: f32,
    summary: RunSummary,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            focus: Attribute::Strength,
            potion_threshold: 0.3,
            heal_threshold: 0.6,
            summary: RunSummary::default(),
        }
    }
}

impl Autopilot {
    /// Creates an autopilot putting points into `focus`.
    #[must_use]
    pub fn new(focus: Attribute) -> Self {
        Self {
            focus,
            ..Self::default()
        }
    }

    /// Tallies so far.
    #[must_use]
    pub const fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Plays one step: decide, advance the world, then react to its events.
    pub fn step(&mut self, world: &mut DemoWorld, dt: f32) {
        if world.player().is_alive() {
            self.spend_points(world);
            self.drink_if_low(world);
            if let Some((target, position)) = Self::nearest_enemy(world) {
                world.select_target(Some(target));
                Self::approach(world, position, dt);
                world.probe_mut().aim(Some(ProbeHit::enemy(target, position)));
                self.cast_ready(world, position);
            } else {
                world.select_target(None);
                world.probe_mut().aim(None);
            }
        }

        world.tick(dt);
        self.summary.ticks += 1;

        for event in world.drain_events() {
            self.record(world, &event);
        }
    }

    fn nearest_enemy(world: &DemoWorld) -> Option<(EntityId, Position)> {
        let origin = world.player().position();
        world
            .enemies()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| (enemy.id(), enemy.position()))
            .min_by(|a, b| planar_distance(origin, a.1).total_cmp(&planar_distance(origin, b.1)))
    }

    fn approach(world: &mut DemoWorld, target: Position, dt: f32) {
        let player = world.player();
        let reach = player.stats().attack_range() * 0.9;
        let from = player.position();
        if planar_distance(from, target) <= reach {
            return;
        }
        let Some(waypoint) = world.navigation().next_waypoint(from, target) else {
            return;
        };
        let step = player.stats().movement_speed() * dt;
        let next = move_towards(from, waypoint, step);
        world.player_mut().set_position(next);
    }

    fn spend_points(&self, world: &mut DemoWorld) {
        while world.allocate_attribute(self.focus) {}
    }

    fn drink_if_low(&self, world: &mut DemoWorld) {
        if world.player().stats().health_percent() >= self.potion_threshold {
            return;
        }
        let potion = world
            .player()
            .inventory()
            .occupied()
            .map(|(_, stack)| stack.item())
            .find(|item| item.kind == ItemKind::Consumable && item.health_restore > 0.0)
            .map(|item| item.id);
        if let Some(potion) = potion {
            if let Err(e) = world.use_item(potion) {
                debug!(item = %potion, error = %e, "Potion not used");
            }
        }
    }

    fn cast_ready(&self, world: &mut DemoWorld, target: Position) {
        let slots = world.player().abilities().slot_count();
        for slot in 0..slots {
            let Some(ability) = world.player().abilities().ability(slot).cloned() else {
                continue;
            };
            if !self.wants_cast(world, slot, &ability, target) {
                continue;
            }
            // Failures are published as events and tallied there
            let _ = world.cast_ability(slot);
        }
    }

    fn wants_cast(&self, world: &DemoWorld, slot: usize, ability: &AbilityRef, target: Position) -> bool {
        let player = world.player();
        if player.abilities().cooldown_remaining(slot) > 0.0 || !player.stats().has_mana(ability.mana_cost) {
            return false;
        }
        if ability.kind == AbilityKind::Heal {
            return player.stats().health_percent() < self.heal_threshold;
        }
        match ability.target {
            TargetKind::Caster | TargetKind::NoTarget => true,
            TargetKind::AreaOfEffect => planar_distance(player.position(), target) <= ability.area_radius,
            TargetKind::SingleTarget | TargetKind::PointTarget => {
                planar_distance(player.position(), target) <= ability.range
            },
        }
    }

    fn pick_up(&mut self, world: &mut DemoWorld, item: ItemId, quantity: u32) {
        match world.give_item(item, quantity) {
            Ok(Ok(())) => self.summary.items_looted += quantity,
            Ok(Err(e)) => debug!(%item, error = %e, "Loot left on the ground"),
            Err(e) => warn!(%item, error = %e, "Dropped item is not in the catalog"),
        }
    }

    fn record(&mut self, world: &mut DemoWorld, event: &GameEvent) {
        let player = world.player().id();
        match event {
            GameEvent::DamageDealt { target, amount, .. } => {
                if *target == player {
                    self.summary.damage_taken += amount;
                } else {
                    self.summary.damage_dealt += amount;
                }
            },
            GameEvent::AttackMissed { .. } => self.summary.misses += 1,
            GameEvent::AbilityCast { ability, .. } => {
                self.summary.casts += 1;
                debug!(%ability, "Ability cast");
            },
            GameEvent::CastFailed { slot, reason, .. } => {
                self.summary.failed_casts += 1;
                debug!(slot, %reason, "Cast failed");
            },
            GameEvent::EnemyDied { enemy, killer } => {
                if *killer == Some(player) {
                    self.summary.kills += 1;
                }
                info!(%enemy, "Enemy died");
            },
            GameEvent::LootDropped { item, quantity, .. } => self.pick_up(world, *item, *quantity),
            GameEvent::ExperienceGained { amount } => self.summary.experience += amount,
            GameEvent::LevelUp { level, .. } => info!(level, "Level up"),
            GameEvent::PlayerDied { killer } => {
                self.summary.deaths += 1;
                warn!(%killer, "Player died");
            },
            other => debug!(event = ?other, "Event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::MonsterId;
    use ember_gameplay::{
        Attributes, ContentCatalog, DropEntry, GameplayConfig, ItemDefinition, LootTable,
        MonsterDefinition, PlayerCharacter,
    };

    fn world_with(monster: MonsterDefinition, at: Position) -> DemoWorld {
        let config = GameplayConfig::default();
        let catalog = ContentCatalog::from_definitions(
            vec![ItemDefinition::consumable(ItemId::new(1), "Potion", 50.0, 0.0)],
            Vec::new(),
            vec![monster],
        )
        .expect("valid content");
        let player = PlayerCharacter::new(Attributes::default(), 1, Position::ZERO, &config);
        let mut world = GameWorld::new(
            config,
            catalog,
            player,
            OpenField::default(),
            ScriptedAim::default(),
            LogSpawner::default(),
        )
        .with_seed(3);
        world.spawn_enemy(MonsterId::new(1), at).expect("known monster");
        world
    }

    #[test]
    fn test_open_field_routes_straight() {
        let field = OpenField::default();
        let to = Position::new(3.0, 0.0, 4.0);
        assert_eq!(field.next_waypoint(Position::ZERO, to), Some(to));
        assert_eq!(
            field.find_nearest_navigable_point(Position::new(1.0, 2.0, 1.0), 5.0),
            Some(Position::new(1.0, 0.0, 1.0))
        );
    }

    #[test]
    fn test_scripted_aim_repeats_last_aim() {
        let mut aim = ScriptedAim::default();
        assert!(aim.probe().is_none());
        aim.aim(Some(ProbeHit::ground(Position::ZERO)));
        assert!(aim.probe().is_some());
        assert!(aim.probe().is_some());
    }

    #[test]
    fn test_autopilot_walks_towards_enemy() {
        let monster = MonsterDefinition::new(MonsterId::new(1), "Dummy").with_radii(0.0, 0.0);
        let mut world = world_with(monster, Position::new(20.0, 0.0, 0.0));
        let mut pilot = Autopilot::default();

        pilot.step(&mut world, 0.1);

        let x = world.player().position().x;
        assert!(x > 0.0 && x < 20.0);
        assert!(world.player().selected_target().is_some());
        assert_eq!(pilot.summary().ticks, 1);
    }

    #[test]
    fn test_autopilot_kills_and_loots() {
        let monster = MonsterDefinition::new(MonsterId::new(1), "Dummy")
            .with_attributes(
                Attributes {
                    constitution: 1,
                    ..Attributes::default()
                },
                1,
            )
            .with_radii(0.0, 0.0)
            .with_experience(5.0)
            .with_loot(LootTable::default().with_entry(DropEntry::new(ItemId::new(1), 1.0)));
        let mut world = world_with(monster, Position::new(1.0, 0.0, 0.0));
        let mut pilot = Autopilot::default();

        for _ in 0..600 {
            pilot.step(&mut world, 0.1);
            if pilot.summary().kills > 0 {
                break;
            }
        }

        assert_eq!(pilot.summary().kills, 1);
        assert_eq!(pilot.summary().items_looted, 1);
        assert!(world.player().inventory().has_item(ItemId::new(1), 1));
        assert!(pilot.summary().experience >= 5.0);
        assert!(world.spawner().items_dropped() >= 1);
    }

    #[test]
    fn test_potion_used_when_low() {
        let monster = MonsterDefinition::new(MonsterId::new(1), "Dummy").with_radii(0.0, 0.0);
        let mut world = world_with(monster, Position::new(50.0, 0.0, 0.0));
        world.give_item(ItemId::new(1), 1).expect("in catalog").expect("room");
        let max = world.player().stats().max_health();
        world.player_mut().stats_mut().take_damage(max * 0.8);

        let mut pilot = Autopilot::default();
        pilot.step(&mut world, 0.0);

        assert!(!world.player().inventory().has_item(ItemId::new(1), 1));
        assert!(world.player().stats().health_percent() > 0.2);
    }
}
