//! Run orchestration.
//!
//! Builds the world from the engine config and content tables, then drives it
//! for the configured number of fixed steps.

use std::path::Path;

use anyhow::{Context, Result};
use ember_common::Position;
use ember_gameplay::{GameWorld, PlayerCharacter};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::content;
use crate::demo::{Autopilot, DemoWorld, LogSpawner, OpenField, RunSummary, ScriptedAim};
use crate::timing::StepClock;

/// Builds the world described by `config`.
///
/// Relative content paths resolve against `config_path`'s directory.
pub fn build_world(config: &EngineConfig, config_path: &Path) -> Result<DemoWorld> {
    let content_dir = config.content_path(config_path);
    let catalog = content::load_catalog(&content_dir)
        .with_context(|| format!("loading content from {}", content_dir.display()))?;

    let setup = &config.player;
    let player = PlayerCharacter::new(setup.attributes, setup.level, Position::ZERO, &config.gameplay);
    let mut world = GameWorld::new(
        config.gameplay.clone(),
        catalog,
        player,
        OpenField::default(),
        ScriptedAim::default(),
        LogSpawner::default(),
    );
    if let Some(seed) = config.seed {
        world = world.with_seed(seed);
    }

    for (slot, &id) in setup.abilities.iter().enumerate() {
        let ability = world.catalog().require_ability(id)?;
        world
            .player_mut()
            .abilities_mut()
            .assign(slot, Some(ability))
            .with_context(|| format!("assigning ability {id} to slot {slot}"))?;
    }

    for entry in &setup.items {
        world
            .give_item(entry.item, entry.quantity)?
            .with_context(|| format!("adding {} x {}", entry.quantity, entry.item))?;
    }

    for &item in &setup.equip {
        world
            .equip(item)
            .with_context(|| format!("equipping item {item}"))?;
    }

    for spawn in &config.spawns {
        let id = world.spawn_enemy(spawn.monster, Position::from_array(spawn.position))?;
        debug!(enemy = %id, monster = %spawn.monster, "Spawn point placed");
    }

    // Setup events are not part of the run
    world.drain_events();
    info!(
        enemies = config.spawns.len(),
        abilities = setup.abilities.len(),
        "World ready"
    );
    Ok(world)
}

/// Drives `world` for the configured duration and returns the tallies.
pub fn simulate(world: &mut DemoWorld, config: &EngineConfig) -> RunSummary {
    let total = config.total_ticks();
    let mut pilot = Autopilot::new(config.player.focus);
    let mut clock = StepClock::new(config.fixed_dt());

    if config.realtime {
        clock.reset();
        let mut ticks = 0;
        while ticks < total {
            let dt = clock.delta_time();
            for _ in 0..clock.accumulate(dt) {
                if ticks >= total {
                    break;
                }
                pilot.step(world, clock.fixed_dt());
                ticks += 1;
            }
            clock.sleep_remainder();
        }
    } else {
        for _ in 0..total {
            pilot.step(world, clock.fixed_dt());
        }
    }

    pilot.summary().clone()
}

/// Loads everything, runs, and logs the outcome.
pub fn run(config_path: &Path, config: &EngineConfig) -> Result<()> {
    let mut world = build_world(config, config_path)?;
    info!(
        ticks = config.total_ticks(),
        tick_rate = config.tick_rate,
        realtime = config.realtime,
        "Simulation starting"
    );

    let summary = simulate(&mut world, config);
    summary.log();

    let spawner = world.spawner();
    let stats = world.player().stats();
    info!(
        level = stats.level(),
        health = stats.health(),
        floating_texts = spawner.floating_texts(),
        projectiles = spawner.projectiles(),
        items_dropped = spawner.items_dropped(),
        "Final state"
    );
    Ok(())
}
