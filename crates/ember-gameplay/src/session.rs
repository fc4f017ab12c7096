//! Game world orchestration.
//!
//! `GameWorld` owns the player, an explicit registry of enemies keyed by
//! [`EntityId`], in-flight projectiles, the combat RNG and the event bus.
//! Host collaborators are injected at construction; a single `tick(dt)`
//! advances everything in a fixed order:
//!
//! 1. player regeneration, cooldowns and attack timer
//! 2. player auto-attack on the selected target
//! 3. enemy state machines (including respawn timers)
//! 4. projectiles

use std::collections::BTreeMap;

use ember_common::{planar_distance, EmberResult, EntityId, ItemId, MonsterId, Position};
use tracing::{debug, info, warn};

use crate::abilities::{AbilityEffect, CastContext, CastPlan, CastResult, EnemyLocator};
use crate::catalog::ContentCatalog;
use crate::combat::{AttackOutcome, CombatResolver, DamageKind, DamageReport};
use crate::config::GameplayConfig;
use crate::enemy::{Enemy, EnemyState, MonsterRef, PlayerTarget};
use crate::equipment::EquipmentResult;
use crate::events::{EventBus, GameEvent};
use crate::inventory::{ConsumeReport, InventoryResult, MoveOutcome};
use crate::items::{EquipSlot, ItemRef};
use crate::player::PlayerCharacter;
use crate::projectile::{Projectile, ProjectileStep};
use crate::stats::Attribute;
use crate::world::{FloatingText, NavigationService, SpawnFactory, WorldProbe};

/// Live enemies as seen by targeting and projectiles.
struct EnemyIndex<'a>(&'a BTreeMap<EntityId, Enemy>);

impl EnemyLocator for EnemyIndex<'_> {
    fn enemy_position(&self, id: EntityId) -> Option<Position> {
        self.0
            .get(&id)
            .filter(|enemy| enemy.is_alive())
            .map(Enemy::position)
    }

    fn closest_enemy(&self, point: Position, radius: f32) -> Option<(EntityId, Position)> {
        self.0
            .values()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| (enemy.id(), enemy.position(), planar_distance(point, enemy.position())))
            .filter(|(_, _, distance)| *distance <= radius)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(id, position, _)| (id, position))
    }
}

/// The simulation: player, enemies, projectiles and their collaborators.
pub struct GameWorld<N, P, S> {
    config: GameplayConfig,
    catalog: ContentCatalog,
    player: PlayerCharacter,
    enemies: BTreeMap<EntityId, Enemy>,
    projectiles: Vec<Projectile>,
    navigation: N,
    probe: P,
    spawner: S,
    resolver: CombatResolver,
    events: EventBus,
}

impl<N, P, S> GameWorld<N, P, S>
where
    N: NavigationService,
    P: WorldProbe,
    S: SpawnFactory,
{
    /// Creates a world around `player`.
    pub fn new(
        config: GameplayConfig,
        catalog: ContentCatalog,
        player: PlayerCharacter,
        navigation: N,
        probe: P,
        spawner: S,
    ) -> Self {
        let config = config.sanitized();
        Self {
            events: EventBus::new(config.event_capacity),
            config,
            catalog,
            player,
            enemies: BTreeMap::new(),
            projectiles: Vec::new(),
            navigation,
            probe,
            spawner,
            resolver: CombatResolver::new(),
        }
    }

    /// Replaces the combat RNG with a seeded one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.resolver = CombatResolver::with_seed(seed);
        self
    }

    // === Queries ===

    /// Gameplay configuration.
    #[must_use]
    pub const fn config(&self) -> &GameplayConfig {
        &self.config
    }

    /// Content definitions.
    #[must_use]
    pub const fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    /// The player.
    #[must_use]
    pub const fn player(&self) -> &PlayerCharacter {
        &self.player
    }

    /// Mutable player, for host-driven movement and slot assignment.
    pub fn player_mut(&mut self) -> &mut PlayerCharacter {
        &mut self.player
    }

    /// Enemy by id.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    /// Mutable enemy by id.
    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.get_mut(&id)
    }

    /// Every enemy, ordered by id.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.values()
    }

    /// In-flight projectiles.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Navigation collaborator.
    #[must_use]
    pub const fn navigation(&self) -> &N {
        &self.navigation
    }

    /// Aim probe collaborator.
    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    /// Spawn collaborator.
    #[must_use]
    pub const fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Event bus.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Drains pending events.
    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.events.drain()
    }

    // === Spawning ===

    /// Spawns an enemy of catalog monster `monster` at `position`.
    pub fn spawn_enemy(&mut self, monster: MonsterId, position: Position) -> EmberResult<EntityId> {
        let definition = self.catalog.require_monster(monster)?;
        Ok(self.spawn_enemy_from(definition, position))
    }

    /// Spawns an enemy from a definition handle.
    pub fn spawn_enemy_from(&mut self, definition: MonsterRef, position: Position) -> EntityId {
        let enemy = Enemy::new(definition, position).with_arrival_distance(self.config.wander_arrival_distance);
        let id = enemy.id();
        debug!(enemy = %id, monster = %enemy.definition().name, "Enemy spawned");
        self.enemies.insert(id, enemy);
        id
    }

    // === Commands ===

    /// Selects (or clears) the player's target.
    pub fn select_target(&mut self, target: Option<EntityId>) {
        self.player.select_target(target);
    }

    /// Spends an unallocated attribute point.
    pub fn allocate_attribute(&mut self, attribute: Attribute) -> bool {
        self.player.allocate_attribute(attribute)
    }

    /// Adds items to the player's inventory.
    pub fn add_item(&mut self, item: &ItemRef, quantity: u32) -> InventoryResult<()> {
        self.player.add_item(item, quantity)
    }

    /// Adds catalog items to the player's inventory.
    pub fn give_item(&mut self, item: ItemId, quantity: u32) -> EmberResult<InventoryResult<()>> {
        let item = self.catalog.require_item(item)?;
        Ok(self.player.add_item(&item, quantity))
    }

    /// Removes items from the player's inventory.
    pub fn remove_item(&mut self, item: ItemId, quantity: u32) -> u32 {
        self.player.remove_item(item, quantity)
    }

    /// Moves an inventory slot onto another.
    pub fn move_item(&mut self, from: usize, to: usize) -> InventoryResult<MoveOutcome> {
        self.player.inventory_mut().move_item(from, to)
    }

    /// Uses a consumable.
    pub fn use_item(&mut self, item: ItemId) -> InventoryResult<ConsumeReport> {
        let report = self.player.use_item(item)?;
        self.events.publish(GameEvent::ItemUsed { item });
        if report.health > 0.0 {
            self.spawner
                .spawn_floating_text(self.player.position(), FloatingText::Heal(report.health));
            self.events.publish(GameEvent::Healed {
                target: self.player.id(),
                amount: report.health,
            });
        }
        Ok(report)
    }

    /// Equips an item from the inventory.
    pub fn equip(&mut self, item: ItemId) -> EquipmentResult<Vec<ItemRef>> {
        let displaced = self.player.equip(item)?;
        for previous in &displaced {
            if let Some(slot) = previous.equip_slot {
                self.events.publish(GameEvent::ItemUnequipped {
                    item: previous.id,
                    slot,
                });
            }
        }
        if let Some(slot) = self
            .player
            .equipment()
            .iter()
            .find(|(_, equipped)| equipped.id == item)
            .map(|(slot, _)| slot)
        {
            self.events.publish(GameEvent::ItemEquipped { item, slot });
        }
        Ok(displaced)
    }

    /// Moves the item in `slot` back to the inventory.
    pub fn unequip(&mut self, slot: EquipSlot) -> EquipmentResult<ItemRef> {
        let item = self.player.unequip(slot)?;
        self.events.publish(GameEvent::ItemUnequipped { item: item.id, slot });
        Ok(item)
    }

    /// Forces enemy `enemy` to chase `attacker`.
    pub fn take_aggro(&mut self, enemy: EntityId, attacker: EntityId) -> bool {
        let Some(target) = self.enemies.get_mut(&enemy) else {
            return false;
        };
        let transition = target.take_aggro(attacker);
        let alive = target.is_alive();
        self.publish_transition(enemy, transition);
        alive
    }

    /// Casts the ability in `slot`.
    ///
    /// Gate failures leave mana and cooldowns untouched and publish
    /// [`GameEvent::CastFailed`].
    pub fn cast_ability(&mut self, slot: usize) -> CastResult<CastPlan> {
        let caster = self.player.id();
        let index = EnemyIndex(&self.enemies);
        let mut ctx = CastContext {
            caster_position: self.player.position(),
            selected_target: self.player.selected_target(),
            probe: &mut self.probe,
            enemies: &index,
            smart_cast_radius: self.config.smart_cast_radius,
        };
        let (book, stats) = self.player.casting_parts();
        let result = book.cast(slot, stats, &mut ctx);

        let plan = match result {
            Ok(plan) => plan,
            Err(err) => {
                debug!(slot, error = %err, "Cast rejected");
                self.events.publish(GameEvent::CastFailed {
                    caster,
                    slot,
                    reason: err.to_string(),
                });
                return Err(err);
            },
        };

        self.events.publish(GameEvent::AbilityCast {
            caster,
            slot,
            ability: plan.ability.id,
        });
        self.apply_effect(&plan);
        Ok(plan)
    }

    fn apply_effect(&mut self, plan: &CastPlan) {
        let caster = self.player.id();
        match plan.effect {
            AbilityEffect::DamageTarget { target, amount, kind } => {
                self.damage_enemy(target, caster, amount, kind);
            },
            AbilityEffect::LaunchProjectile {
                target,
                amount,
                kind,
                spec,
            } => {
                let projectile = Projectile::launch(
                    plan.ability.id,
                    caster,
                    target,
                    self.player.position(),
                    amount,
                    kind,
                    spec,
                    &self.config,
                );
                self.spawner
                    .spawn_projectile(projectile.id(), projectile.ability(), projectile.position());
                self.events.publish(GameEvent::ProjectileSpawned {
                    projectile: projectile.id(),
                    ability: projectile.ability(),
                });
                self.projectiles.push(projectile);
            },
            AbilityEffect::DamageArea {
                center,
                radius,
                amount,
                kind,
            } => {
                let victims: Vec<EntityId> = self
                    .enemies
                    .values()
                    .filter(|enemy| enemy.is_alive())
                    .filter(|enemy| planar_distance(center, enemy.position()) <= radius)
                    .map(Enemy::id)
                    .collect();
                debug!(ability = %plan.ability.name, victims = victims.len(), "Area burst");
                for victim in victims {
                    self.damage_enemy(victim, caster, amount, kind);
                }
            },
            AbilityEffect::HealCaster { amount } => self.heal_player(amount),
            AbilityEffect::HealTarget { target, amount } => {
                if target == caster {
                    self.heal_player(amount);
                } else {
                    warn!(target = %target, ability = %plan.ability.name, "Heal target is not an ally");
                }
            },
            AbilityEffect::Fizzle | AbilityEffect::Unimplemented(_) => {},
        }
    }

    fn heal_player(&mut self, amount: f32) {
        let healed = self.player.stats_mut().heal(amount);
        self.spawner
            .spawn_floating_text(self.player.position(), FloatingText::Heal(healed));
        self.events.publish(GameEvent::Healed {
            target: self.player.id(),
            amount: healed,
        });
    }

    /// Applies precomputed damage to an enemy through defense, with aggro and kill handling.
    fn damage_enemy(&mut self, enemy_id: EntityId, source: EntityId, raw: f32, kind: DamageKind) -> Option<DamageReport> {
        let enemy = self.enemies.get_mut(&enemy_id).filter(|enemy| enemy.is_alive())?;
        let report = CombatResolver::apply_damage(enemy.stats_mut(), raw, kind);
        let position = enemy.position();
        let transition = if report.killed { None } else { enemy.take_aggro(source) };

        self.spawner
            .spawn_floating_text(position, FloatingText::Damage(report.amount));
        self.events.publish(GameEvent::DamageDealt {
            source: Some(source),
            target: enemy_id,
            amount: report.amount,
            kind,
        });
        self.publish_transition(enemy_id, transition);
        if report.killed {
            self.handle_enemy_death(enemy_id, Some(source));
        }
        Some(report)
    }

    fn handle_enemy_death(&mut self, enemy_id: EntityId, killer: Option<EntityId>) {
        let Some(enemy) = self.enemies.get_mut(&enemy_id) else {
            return;
        };
        let before = enemy.state();
        let drops = enemy.on_death(&mut self.resolver);
        let after = enemy.state();
        let position = enemy.position();
        let definition = MonsterRef::clone(enemy.definition());

        if before != after {
            self.publish_transition(enemy_id, Some((before, after)));
        }
        self.spawner.set_active(enemy_id, false);
        self.events.publish(GameEvent::EnemyDied { enemy: enemy_id, killer });
        if self.player.selected_target() == Some(enemy_id) {
            self.player.select_target(None);
        }

        for drop in drops {
            let Some(item) = self.catalog.item(drop.item) else {
                warn!(item = %drop.item, monster = %definition.name, "Loot item missing from catalog");
                continue;
            };
            for _ in 0..drop.quantity {
                self.spawner.spawn_item(item, position);
            }
            self.events.publish(GameEvent::LootDropped {
                enemy: enemy_id,
                item: drop.item,
                quantity: drop.quantity,
            });
        }

        if killer == Some(self.player.id()) {
            let amount = definition
                .experience
                .unwrap_or(self.config.default_kill_experience);
            self.grant_experience(amount);
        }
    }

    /// Gives the player experience, publishing level-ups.
    pub fn grant_experience(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let levels = self.player.stats_mut().gain_experience(amount);
        self.events.publish(GameEvent::ExperienceGained { amount });
        if levels > 0 {
            let stats = self.player.stats();
            info!(level = stats.level(), points = stats.unallocated_points(), "Player levelled up");
            self.events.publish(GameEvent::LevelUp {
                level: stats.level(),
                unallocated_points: stats.unallocated_points(),
            });
        }
    }

    fn publish_transition(&self, enemy: EntityId, transition: Option<(EnemyState, EnemyState)>) {
        if let Some((from, to)) = transition {
            self.events
                .publish(GameEvent::EnemyStateChanged { enemy, from, to });
        }
    }

    // === Tick ===

    /// Advances the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.player.tick(dt);
        self.player_auto_attack();
        self.tick_enemies(dt);
        self.tick_projectiles(dt);
    }

    fn player_auto_attack(&mut self) {
        let Some(target_id) = self.player.selected_target() else {
            return;
        };
        let Some(enemy) = self.enemies.get_mut(&target_id).filter(|enemy| enemy.is_alive()) else {
            return;
        };
        let position = enemy.position();
        let Ok(outcome) = self.player.attack(position, enemy.stats_mut(), &mut self.resolver) else {
            return;
        };

        let player_id = self.player.id();
        let transition = if outcome.killed() { None } else { enemy.take_aggro(player_id) };
        self.publish_transition(target_id, transition);
        self.publish_attack(player_id, target_id, position, outcome);
        if outcome.killed() {
            self.handle_enemy_death(target_id, Some(player_id));
        }
    }

    fn publish_attack(&mut self, source: EntityId, target: EntityId, position: Position, outcome: AttackOutcome) {
        match outcome {
            AttackOutcome::Hit(report) => {
                self.spawner
                    .spawn_floating_text(position, FloatingText::Damage(report.amount));
                self.events.publish(GameEvent::DamageDealt {
                    source: Some(source),
                    target,
                    amount: report.amount,
                    kind: DamageKind::Physical,
                });
            },
            AttackOutcome::Miss => {
                self.spawner.spawn_floating_text(position, FloatingText::Miss);
                self.events
                    .publish(GameEvent::AttackMissed { source, target });
            },
            AttackOutcome::TargetDead => {},
        }
    }

    fn tick_enemies(&mut self, dt: f32) {
        let ids: Vec<EntityId> = self.enemies.keys().copied().collect();
        for id in ids {
            let Some(enemy) = self.enemies.get_mut(&id) else {
                continue;
            };
            let player_id = self.player.id();
            let player_position = self.player.position();
            let mut target = PlayerTarget {
                id: player_id,
                position: player_position,
                stats: self.player.stats_mut(),
            };
            let update = enemy.tick(dt, &mut target, &self.navigation, &mut self.resolver);

            if update.respawned {
                let spawn = enemy.spawn();
                self.spawner.set_active(id, true);
                self.events.publish(GameEvent::EnemyRespawned {
                    enemy: id,
                    position: spawn,
                });
            }
            self.publish_transition(id, update.transition);

            if let Some(outcome) = update.attack {
                self.publish_attack(id, player_id, player_position, outcome);
                if outcome.killed() {
                    info!(killer = %id, "Player died");
                    self.events.publish(GameEvent::PlayerDied { killer: id });
                }
            }
        }
    }

    fn tick_projectiles(&mut self, dt: f32) {
        let contact = self.config.projectile_contact_radius;
        let projectiles = std::mem::take(&mut self.projectiles);
        for mut projectile in projectiles {
            let step = projectile.tick(dt, &EnemyIndex(&self.enemies), contact);
            match step {
                ProjectileStep::Flying => {
                    self.projectiles.push(projectile);
                    continue;
                },
                ProjectileStep::Struck(enemy) => {
                    self.damage_enemy(enemy, projectile.source(), projectile.amount(), projectile.kind());
                },
                ProjectileStep::Expired | ProjectileStep::Fizzled => {
                    self.events.publish(GameEvent::ProjectileExpired {
                        projectile: projectile.id(),
                    });
                },
            }
            self.spawner.despawn(projectile.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{AbilityDefinition, AbilityKind, ProjectileSpec, TargetKind};
    use crate::enemy::MonsterDefinition;
    use crate::inventory::InventoryError;
    use crate::items::ItemDefinition;
    use crate::loot::{DropEntry, LootTable};
    use crate::stats::Attributes;
    use crate::world::{MockNavigation, MockProbe, ProbeHit, RecordingSpawner, SpawnRecord};
    use ember_common::AbilityId;

    type TestWorld = GameWorld<MockNavigation, MockProbe, RecordingSpawner>;

    const GOO: ItemId = ItemId::new(1);
    const SLIME: MonsterId = MonsterId::new(1);

    fn catalog() -> ContentCatalog {
        ContentCatalog::from_definitions(
            vec![
                ItemDefinition::new(GOO, "Goo"),
                ItemDefinition::consumable(ItemId::new(2), "Potion", 50.0, 0.0),
            ],
            Vec::new(),
            vec![MonsterDefinition::new(SLIME, "Slime")
                .with_experience(40.0)
                .with_respawn_time(2.0)
                .with_loot(LootTable::default().with_entry(DropEntry::new(GOO, 1.0).with_quantity(2, 2)))],
        )
        .expect("valid content")
    }

    fn world() -> TestWorld {
        let config = GameplayConfig::default();
        let player = PlayerCharacter::new(Attributes::default(), 1, Position::ZERO, &config);
        GameWorld::new(
            config,
            catalog(),
            player,
            MockNavigation::new().with_unreachable(true),
            MockProbe::new(),
            RecordingSpawner::new(),
        )
        .with_seed(99)
    }

    fn nuke(target: TargetKind) -> AbilityDefinition {
        AbilityDefinition::new(AbilityId::new(1), "Nuke", AbilityKind::Damage, target)
            .with_costs(1.0, 10.0)
            .with_range(10.0, 3.0)
            .with_base_value(10_000.0)
            .with_damage_kind(DamageKind::Pure)
    }

    fn assign(world: &mut TestWorld, ability: AbilityDefinition) {
        world
            .player_mut()
            .abilities_mut()
            .assign(0, Some(ability.into_ref()))
            .expect("slot 0");
    }

    #[test]
    fn test_cast_kill_grants_experience_and_loot() {
        let mut world = world();
        assign(&mut world, nuke(TargetKind::SingleTarget));
        let enemy = world
            .spawn_enemy(SLIME, Position::new(3.0, 0.0, 0.0))
            .expect("slime exists");
        world.select_target(Some(enemy));

        world.cast_ability(0).expect("cast succeeds");
        assert!(!world.enemy(enemy).expect("registered").is_alive());
        assert_eq!(world.player().stats().experience(), 40.0);
        assert_eq!(world.spawner().dropped(GOO), 2);
        assert_eq!(world.player().selected_target(), None);

        let events = world.drain_events();
        assert!(events.contains(&GameEvent::EnemyDied {
            enemy,
            killer: Some(world.player().id())
        }));
        assert!(events.contains(&GameEvent::LootDropped {
            enemy,
            item: GOO,
            quantity: 2
        }));
        assert!(events.contains(&GameEvent::ExperienceGained { amount: 40.0 }));
    }

    #[test]
    fn test_failed_cast_publishes_and_changes_nothing() {
        let mut world = world();
        assign(&mut world, nuke(TargetKind::SingleTarget));
        let mana = world.player().stats().mana();

        let err = world.cast_ability(0).expect_err("nothing to hit");
        assert_eq!(err, crate::abilities::CastError::NoTarget);
        assert_eq!(world.player().stats().mana(), mana);
        assert_eq!(world.player().abilities().cooldown_remaining(0), 0.0);
        assert!(matches!(
            world.drain_events().as_slice(),
            [GameEvent::CastFailed { slot: 0, .. }]
        ));
    }

    #[test]
    fn test_area_burst_centers_on_caster() {
        let mut world = world();
        assign(&mut world, nuke(TargetKind::AreaOfEffect));
        let near = world.spawn_enemy(SLIME, Position::new(2.0, 0.0, 0.0)).expect("slime");
        let edge = world.spawn_enemy(SLIME, Position::new(0.0, 0.0, 3.0)).expect("slime");
        let far = world.spawn_enemy(SLIME, Position::new(8.0, 0.0, 0.0)).expect("slime");
        world.select_target(Some(far));

        world.cast_ability(0).expect("far target within cast range");
        assert!(!world.enemy(near).expect("near").is_alive());
        assert!(!world.enemy(edge).expect("edge").is_alive());
        assert!(world.enemy(far).expect("far").is_alive());
    }

    #[test]
    fn test_point_target_bursts_at_ground_point() {
        let mut world = world();
        assign(&mut world, nuke(TargetKind::PointTarget));
        let hit = world.spawn_enemy(SLIME, Position::new(6.0, 0.0, 1.0)).expect("slime");
        let safe = world.spawn_enemy(SLIME, Position::new(1.0, 0.0, 0.0)).expect("slime");
        world
            .probe_mut()
            .push(Some(ProbeHit::ground(Position::new(6.0, 0.0, 0.0))));

        world.cast_ability(0).expect("ground hit");
        assert!(!world.enemy(hit).expect("hit").is_alive());
        assert!(world.enemy(safe).expect("safe").is_alive());
    }

    #[test]
    fn test_projectile_flies_then_strikes() {
        let mut world = world();
        assign(
            &mut world,
            nuke(TargetKind::SingleTarget).with_projectile(ProjectileSpec::default()),
        );
        let enemy = world.spawn_enemy(SLIME, Position::new(5.0, 0.0, 0.0)).expect("slime");
        world.select_target(Some(enemy));
        world.enemy_mut(enemy).expect("slime").set_idle();

        world.cast_ability(0).expect("cast");
        assert_eq!(world.projectiles().len(), 1);
        assert!(world.enemy(enemy).expect("slime").is_alive());

        for _ in 0..10 {
            world.tick(0.1);
        }
        assert!(world.projectiles().is_empty());
        assert!(!world.enemy(enemy).expect("slime").is_alive());
        assert!(world
            .spawner()
            .records()
            .iter()
            .any(|r| matches!(r, SpawnRecord::Projectile(_, id) if *id == AbilityId::new(1))));
    }

    #[test]
    fn test_self_heal_restores_player() {
        let mut world = world();
        assign(
            &mut world,
            AbilityDefinition::new(AbilityId::new(2), "Mend", AbilityKind::Heal, TargetKind::Caster)
                .with_base_value(30.0),
        );
        world.player_mut().stats_mut().take_damage(50.0);
        let before = world.player().stats().health();
        world.cast_ability(0).expect("self cast");
        assert_eq!(world.player().stats().health(), before + 30.0);
    }

    #[test]
    fn test_enemy_attacks_reach_the_player() {
        let mut world = world();
        let enemy = world.spawn_enemy(SLIME, Position::new(1.0, 0.0, 0.0)).expect("slime");
        world.take_aggro(enemy, world.player().id());

        for _ in 0..40 {
            world.tick(0.1);
        }
        let events = world.drain_events();
        let swings = events
            .iter()
            .filter(|e| {
                matches!(e, GameEvent::DamageDealt { source: Some(s), .. } if *s == enemy)
                    || matches!(e, GameEvent::AttackMissed { source, .. } if *source == enemy)
            })
            .count();
        assert!(swings >= 3, "swings = {swings}");
        assert_eq!(world.enemy(enemy).expect("slime").state(), EnemyState::Attacking);
    }

    #[test]
    fn test_player_auto_attack_forces_aggro() {
        let mut world = world();
        let enemy = world.spawn_enemy(SLIME, Position::new(1.0, 0.0, 0.0)).expect("slime");
        world.enemy_mut(enemy).expect("slime").set_idle();
        world.select_target(Some(enemy));

        world.tick(0.1);
        let slime = world.enemy(enemy).expect("slime");
        assert_eq!(slime.target(), Some(world.player().id()));
        assert_ne!(slime.state(), EnemyState::Idle);
    }

    #[test]
    fn test_dead_enemy_respawns() {
        let mut world = world();
        assign(&mut world, nuke(TargetKind::SingleTarget));
        let enemy = world.spawn_enemy(SLIME, Position::new(3.0, 0.0, 0.0)).expect("slime");
        world.select_target(Some(enemy));
        world.cast_ability(0).expect("cast");
        world.drain_events();

        for _ in 0..21 {
            world.tick(0.1);
        }
        assert!(world.enemy(enemy).expect("slime").is_alive());
        assert!(world
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::EnemyRespawned { enemy: id, .. } if *id == enemy)));
        assert!(world
            .spawner()
            .records()
            .contains(&SpawnRecord::Active(enemy, true)));
    }

    #[test]
    fn test_use_item_heals_and_reports() {
        let mut world = world();
        world
            .give_item(ItemId::new(2), 1)
            .expect("in catalog")
            .expect("room");
        world.player_mut().stats_mut().take_damage(100.0);
        let report = world.use_item(ItemId::new(2)).expect("consumable");
        assert_eq!(report.health, 50.0);
        assert!(world
            .drain_events()
            .contains(&GameEvent::ItemUsed { item: ItemId::new(2) }));
    }

    #[test]
    fn test_dead_player_cannot_drink() {
        let mut world = world();
        world
            .give_item(ItemId::new(2), 1)
            .expect("in catalog")
            .expect("room");
        world.player_mut().stats_mut().take_damage(f32::MAX);
        world.drain_events();

        assert_eq!(
            world.use_item(ItemId::new(2)),
            Err(InventoryError::UserDead(ItemId::new(2)))
        );
        assert!(!world.player().is_alive());
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn test_unknown_monster_is_an_error() {
        let mut world = world();
        assert!(world.spawn_enemy(MonsterId::new(77), Position::ZERO).is_err());
    }
}
