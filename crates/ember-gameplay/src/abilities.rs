//! Ability casting.
//!
//! This module provides:
//! - Ability definitions with stat-scaled damage and healing
//! - Per-slot cooldown tracking
//! - Gated casting: cooldown, mana, target acquisition, range
//! - Effect planning (what a successful cast does to the world)
//!
//! A cast either passes every gate and commits mana and cooldown together,
//! or fails and leaves the caster untouched. Applying the planned effect to
//! enemies is the caller's job (see `session`).

use std::sync::Arc;

use ember_common::{planar_distance, AbilityId, EntityId, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::combat::DamageKind;
use crate::stats::{StatBlock, StatKind};
use crate::world::{ProbeTarget, WorldProbe};

/// Casting error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    /// Slot index outside the ability bar
    #[error("Invalid ability slot {slot} (bar has {slots})")]
    InvalidSlot {
        /// Requested slot
        slot: usize,
        /// Slots available
        slots: usize,
    },
    /// No ability assigned to the slot
    #[error("No ability in slot {0}")]
    EmptySlot(usize),
    /// Caster is dead
    #[error("Caster is dead")]
    CasterDead,
    /// Ability still cooling down
    #[error("Ability on cooldown: {remaining:.1}s remaining")]
    OnCooldown {
        /// Seconds remaining
        remaining: f32,
    },
    /// Not enough mana
    #[error("Not enough mana: need {required}, have {available}")]
    InsufficientMana {
        /// Mana cost
        required: f32,
        /// Current mana
        available: f32,
    },
    /// Targeting found nothing usable
    #[error("No valid target")]
    NoTarget,
    /// Target beyond cast range
    #[error("Target out of range: distance {distance:.1}, range {range:.1}")]
    OutOfRange {
        /// Distance to the target
        distance: f32,
        /// Ability range
        range: f32,
    },
}

/// Result type for casting.
pub type CastResult<T> = Result<T, CastError>;

// ============================================================================
// Definitions
// ============================================================================

/// Shared handle to an immutable ability definition.
pub type AbilityRef = Arc<AbilityDefinition>;

/// What an ability does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Deals damage.
    #[default]
    Damage,
    /// Restores health.
    Heal,
    /// Temporary positive effect.
    Buff,
    /// Temporary negative effect.
    Debuff,
    /// Moves the caster.
    Movement,
    /// Miscellaneous effect.
    Utility,
    /// Summons allies.
    Summon,
}

/// How an ability picks what it affects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// The caster.
    #[serde(rename = "Self")]
    Caster,
    /// One enemy (or ally for heals).
    #[default]
    SingleTarget,
    /// Every enemy in a radius.
    AreaOfEffect,
    /// A point on the ground.
    PointTarget,
    /// No target at all.
    NoTarget,
}

impl TargetKind {
    /// Check if casting must acquire a target and check its range.
    #[must_use]
    pub const fn needs_target(self) -> bool {
        matches!(
            self,
            Self::SingleTarget | Self::AreaOfEffect | Self::PointTarget
        )
    }
}

/// How a scaling entry combines with the total.
///
/// Both tags currently evaluate to `stat × factor` added to the total. The
/// tag is kept so content can express intent.
// TODO: give Multiplicative its own formula once content designers settle on one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalingOperation {
    /// `stat × factor` added to the total.
    #[default]
    Additive,
    /// Same arithmetic as `Additive` for now.
    Multiplicative,
}

/// One stat contribution to an ability's value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingEntry {
    /// Stat read from the caster.
    pub stat: StatKind,
    /// Multiplier applied to the stat.
    #[serde(default = "unit_factor")]
    pub factor: f32,
    /// Combination tag.
    #[serde(default)]
    pub operation: ScalingOperation,
}

const fn unit_factor() -> f32 {
    1.0
}

impl ScalingEntry {
    /// Creates an additive entry.
    #[must_use]
    pub const fn new(stat: StatKind, factor: f32) -> Self {
        Self {
            stat,
            factor,
            operation: ScalingOperation::Additive,
        }
    }

    /// Contribution of this entry for `stats`.
    #[must_use]
    pub fn contribution(&self, stats: &StatBlock) -> f32 {
        let value = stats.value(self.stat);
        match self.operation {
            ScalingOperation::Additive | ScalingOperation::Multiplicative => value * self.factor,
        }
    }
}

/// `base + Σ contribution` over `entries`, in order.
#[must_use]
pub fn evaluate_scaling(base: f32, entries: &[ScalingEntry], stats: &StatBlock) -> f32 {
    base + entries.iter().map(|e| e.contribution(stats)).sum::<f32>()
}

/// Projectile overrides for abilities that fire one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileSpec {
    /// Speed override (units per second).
    pub speed: Option<f32>,
    /// Lifetime override (seconds).
    pub lifetime: Option<f32>,
}

const fn default_range() -> f32 {
    10.0
}

const fn default_area_radius() -> f32 {
    5.0
}

const fn default_cooldown() -> f32 {
    5.0
}

const fn default_mana_cost() -> f32 {
    10.0
}

/// Immutable definition of an ability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Unique ability id.
    pub id: AbilityId,
    /// Display name.
    pub name: String,
    /// Tooltip text.
    #[serde(default)]
    pub description: String,
    /// Effect category.
    #[serde(default)]
    pub kind: AbilityKind,
    /// Targeting mode.
    #[serde(default)]
    pub target: TargetKind,
    /// Cooldown in seconds.
    #[serde(default = "default_cooldown")]
    pub cooldown: f32,
    /// Mana cost.
    #[serde(default = "default_mana_cost")]
    pub mana_cost: f32,
    /// Maximum cast distance.
    #[serde(default = "default_range")]
    pub range: f32,
    /// Radius of area effects.
    #[serde(default = "default_area_radius")]
    pub area_radius: f32,
    /// Damage kind for damage abilities.
    #[serde(default)]
    pub damage_kind: DamageKind,
    /// Value before scaling.
    #[serde(default)]
    pub base_value: f32,
    /// Scaling entries for damage.
    #[serde(default)]
    pub damage_scalings: Vec<ScalingEntry>,
    /// Scaling entries for healing.
    #[serde(default)]
    pub healing_scalings: Vec<ScalingEntry>,
    /// Fires a seeking projectile instead of hitting instantly.
    #[serde(default)]
    pub projectile: Option<ProjectileSpec>,
}

impl AbilityDefinition {
    /// Creates an ability with default costs and range.
    #[must_use]
    pub fn new(id: AbilityId, name: impl Into<String>, kind: AbilityKind, target: TargetKind) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            kind,
            target,
            cooldown: default_cooldown(),
            mana_cost: default_mana_cost(),
            range: default_range(),
            area_radius: default_area_radius(),
            damage_kind: DamageKind::Physical,
            base_value: 0.0,
            damage_scalings: Vec::new(),
            healing_scalings: Vec::new(),
            projectile: None,
        }
    }

    /// Set cooldown and mana cost.
    #[must_use]
    pub fn with_costs(mut self, cooldown: f32, mana_cost: f32) -> Self {
        self.cooldown = cooldown;
        self.mana_cost = mana_cost;
        self
    }

    /// Set range and area radius.
    #[must_use]
    pub fn with_range(mut self, range: f32, area_radius: f32) -> Self {
        self.range = range;
        self.area_radius = area_radius;
        self
    }

    /// Set base value.
    #[must_use]
    pub fn with_base_value(mut self, value: f32) -> Self {
        self.base_value = value;
        self
    }

    /// Set damage kind.
    #[must_use]
    pub fn with_damage_kind(mut self, kind: DamageKind) -> Self {
        self.damage_kind = kind;
        self
    }

    /// Add a damage scaling entry.
    #[must_use]
    pub fn with_damage_scaling(mut self, entry: ScalingEntry) -> Self {
        self.damage_scalings.push(entry);
        self
    }

    /// Add a healing scaling entry.
    #[must_use]
    pub fn with_healing_scaling(mut self, entry: ScalingEntry) -> Self {
        self.healing_scalings.push(entry);
        self
    }

    /// Fire a projectile.
    #[must_use]
    pub fn with_projectile(mut self, spec: ProjectileSpec) -> Self {
        self.projectile = Some(spec);
        self
    }

    /// Wraps the definition in a shared handle.
    #[must_use]
    pub fn into_ref(self) -> AbilityRef {
        Arc::new(self)
    }

    /// Scaled damage for `stats`.
    #[must_use]
    pub fn damage_value(&self, stats: &StatBlock) -> f32 {
        evaluate_scaling(self.base_value, &self.damage_scalings, stats)
    }

    /// Scaled healing for `stats`.
    #[must_use]
    pub fn healing_value(&self, stats: &StatBlock) -> f32 {
        evaluate_scaling(self.base_value, &self.healing_scalings, stats)
    }
}

// ============================================================================
// Targeting
// ============================================================================

/// Read access to live enemies for target acquisition.
pub trait EnemyLocator {
    /// Position of a live enemy, `None` if unknown or dead.
    fn enemy_position(&self, id: EntityId) -> Option<Position>;

    /// Closest live enemy to `point` within `radius`.
    fn closest_enemy(&self, point: Position, radius: f32) -> Option<(EntityId, Position)>;
}

/// What a cast resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedTarget {
    /// Nothing (Self and NoTarget abilities).
    None,
    /// A specific entity.
    Entity {
        /// Entity id
        id: EntityId,
        /// Position at cast time
        position: Position,
    },
    /// A point on the ground.
    Point(Position),
}

impl ResolvedTarget {
    /// Position of the target, if it has one.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::None => None,
            Self::Entity { position, .. } | Self::Point(position) => Some(*position),
        }
    }
}

/// Everything a cast needs to know about its surroundings.
pub struct CastContext<'a> {
    /// Caster position.
    pub caster_position: Position,
    /// Currently selected target, if any.
    pub selected_target: Option<EntityId>,
    /// Aim probe used when nothing is selected.
    pub probe: &'a mut dyn WorldProbe,
    /// Live enemy lookup.
    pub enemies: &'a dyn EnemyLocator,
    /// Radius around a ground hit searched for an enemy.
    pub smart_cast_radius: f32,
}

/// Resolves the target for `target_kind` without checking range.
///
/// Prefers the selected target; otherwise probes once.
pub fn acquire_target(target_kind: TargetKind, ctx: &mut CastContext<'_>) -> CastResult<ResolvedTarget> {
    if !target_kind.needs_target() {
        return Ok(ResolvedTarget::None);
    }

    if let Some(id) = ctx.selected_target {
        if let Some(position) = ctx.enemies.enemy_position(id) {
            return Ok(match target_kind {
                TargetKind::PointTarget => ResolvedTarget::Point(position),
                _ => ResolvedTarget::Entity { id, position },
            });
        }
    }

    let Some(hit) = ctx.probe.probe() else {
        return Err(CastError::NoTarget);
    };

    match (target_kind, hit.target) {
        (TargetKind::PointTarget, ProbeTarget::Ground) => Ok(ResolvedTarget::Point(hit.point)),
        (TargetKind::SingleTarget | TargetKind::AreaOfEffect, ProbeTarget::Enemy(id)) => ctx
            .enemies
            .enemy_position(id)
            .map(|position| ResolvedTarget::Entity { id, position })
            .ok_or(CastError::NoTarget),
        (TargetKind::SingleTarget | TargetKind::AreaOfEffect, ProbeTarget::Ground) => ctx
            .enemies
            .closest_enemy(hit.point, ctx.smart_cast_radius)
            .map(|(id, position)| ResolvedTarget::Entity { id, position })
            .ok_or(CastError::NoTarget),
        _ => Err(CastError::NoTarget),
    }
}

// ============================================================================
// Effects
// ============================================================================

/// What a successful cast does.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityEffect {
    /// Damage one enemy immediately.
    DamageTarget {
        /// Enemy hit
        target: EntityId,
        /// Raw amount before defense
        amount: f32,
        /// Damage kind
        kind: DamageKind,
    },
    /// Fire a seeking projectile at one enemy.
    LaunchProjectile {
        /// Enemy sought
        target: EntityId,
        /// Raw amount before defense
        amount: f32,
        /// Damage kind
        kind: DamageKind,
        /// Overrides for speed and lifetime
        spec: ProjectileSpec,
    },
    /// Damage every enemy within `radius` of `center`, no falloff.
    DamageArea {
        /// Burst center
        center: Position,
        /// Burst radius
        radius: f32,
        /// Raw amount before defense, per enemy
        amount: f32,
        /// Damage kind
        kind: DamageKind,
    },
    /// Heal the caster.
    HealCaster {
        /// Amount healed
        amount: f32,
    },
    /// Heal another entity.
    HealTarget {
        /// Entity healed
        target: EntityId,
        /// Amount healed
        amount: f32,
    },
    /// The kind/target combination has no effect.
    Fizzle,
    /// Effect kind not simulated by the core.
    Unimplemented(AbilityKind),
}

/// Works out the effect of `ability` cast by `stats` at `target`.
#[must_use]
pub fn plan_effect(
    ability: &AbilityDefinition,
    stats: &StatBlock,
    caster_position: Position,
    target: ResolvedTarget,
) -> AbilityEffect {
    match ability.kind {
        AbilityKind::Damage => {
            let amount = ability.damage_value(stats);
            let kind = ability.damage_kind;
            match (ability.target, target) {
                (TargetKind::SingleTarget, ResolvedTarget::Entity { id, .. }) => {
                    match ability.projectile {
                        Some(spec) => AbilityEffect::LaunchProjectile {
                            target: id,
                            amount,
                            kind,
                            spec,
                        },
                        None => AbilityEffect::DamageTarget {
                            target: id,
                            amount,
                            kind,
                        },
                    }
                },
                (TargetKind::AreaOfEffect | TargetKind::PointTarget, _) => {
                    let center = match target {
                        ResolvedTarget::Point(point) => point,
                        ResolvedTarget::Entity { .. } | ResolvedTarget::None => caster_position,
                    };
                    AbilityEffect::DamageArea {
                        center,
                        radius: ability.area_radius,
                        amount,
                        kind,
                    }
                },
                (target_kind, _) => {
                    warn!(ability = %ability.name, ?target_kind, "Damage ability has no damageable target");
                    AbilityEffect::Fizzle
                },
            }
        },
        AbilityKind::Heal => {
            let amount = ability.healing_value(stats);
            match (ability.target, target) {
                (TargetKind::Caster, _) => AbilityEffect::HealCaster { amount },
                (TargetKind::SingleTarget, ResolvedTarget::Entity { id, .. }) => {
                    AbilityEffect::HealTarget { target: id, amount }
                },
                (target_kind, _) => {
                    warn!(ability = %ability.name, ?target_kind, "Unsupported healing target");
                    AbilityEffect::Fizzle
                },
            }
        },
        other => {
            debug!(ability = %ability.name, kind = ?other, "Ability kind not simulated");
            AbilityEffect::Unimplemented(other)
        },
    }
}

// ============================================================================
// Ability Bar
// ============================================================================

/// A successful cast, ready to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CastPlan {
    /// Slot cast from.
    pub slot: usize,
    /// Ability cast.
    pub ability: AbilityRef,
    /// Resolved target.
    pub target: ResolvedTarget,
    /// Effect to apply.
    pub effect: AbilityEffect,
}

/// Ability slots with their cooldown timers.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityBook {
    slots: Vec<Option<AbilityRef>>,
    cooldowns: Vec<f32>,
}

impl AbilityBook {
    /// Creates an empty bar with `slot_count` slots.
    #[must_use]
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
            cooldowns: vec![0.0; slot_count],
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn check_slot(&self, slot: usize) -> CastResult<()> {
        if slot < self.slots.len() {
            Ok(())
        } else {
            Err(CastError::InvalidSlot {
                slot,
                slots: self.slots.len(),
            })
        }
    }

    /// Puts `ability` into `slot` (or clears it). Cooldown is reset.
    pub fn assign(&mut self, slot: usize, ability: Option<AbilityRef>) -> CastResult<()> {
        self.check_slot(slot)?;
        self.slots[slot] = ability;
        self.cooldowns[slot] = 0.0;
        Ok(())
    }

    /// Ability in `slot`.
    #[must_use]
    pub fn ability(&self, slot: usize) -> Option<&AbilityRef> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Seconds of cooldown left in `slot` (0 for unknown slots).
    #[must_use]
    pub fn cooldown_remaining(&self, slot: usize) -> f32 {
        self.cooldowns.get(slot).copied().unwrap_or(0.0)
    }

    /// Cooldown remaining for every slot.
    #[must_use]
    pub fn cooldowns(&self) -> &[f32] {
        &self.cooldowns
    }

    /// Decrements every cooldown, flooring at zero.
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for cooldown in &mut self.cooldowns {
            *cooldown = (*cooldown - dt).max(0.0);
        }
    }

    /// Attempts to cast `slot`.
    ///
    /// Gates run in order (slot, caster alive, cooldown, mana, target,
    /// range) and are read-only. Mana and cooldown are committed only once
    /// all of them pass.
    pub fn cast(
        &mut self,
        slot: usize,
        stats: &mut StatBlock,
        ctx: &mut CastContext<'_>,
    ) -> CastResult<CastPlan> {
        self.check_slot(slot)?;
        let Some(ability) = self.slots[slot].clone() else {
            warn!(slot, "No ability assigned to slot");
            return Err(CastError::EmptySlot(slot));
        };
        if stats.is_dead() {
            return Err(CastError::CasterDead);
        }

        let remaining = self.cooldowns[slot];
        if remaining > 0.0 {
            return Err(CastError::OnCooldown { remaining });
        }
        if !stats.has_mana(ability.mana_cost) {
            return Err(CastError::InsufficientMana {
                required: ability.mana_cost,
                available: stats.mana(),
            });
        }

        let target = acquire_target(ability.target, ctx)?;
        if let Some(position) = target.position() {
            let distance = planar_distance(ctx.caster_position, position);
            if distance > ability.range {
                return Err(CastError::OutOfRange {
                    distance,
                    range: ability.range,
                });
            }
        }

        stats.spend_mana(ability.mana_cost);
        self.cooldowns[slot] = ability.cooldown.max(0.0);

        let effect = plan_effect(&ability, stats, ctx.caster_position, target);
        debug!(ability = %ability.name, slot, mana = stats.mana(), "Cast");
        Ok(CastPlan {
            slot,
            ability,
            target,
            effect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::Attributes;
    use crate::world::{MockProbe, ProbeHit};
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Enemies(BTreeMap<EntityId, Position>);

    impl EnemyLocator for Enemies {
        fn enemy_position(&self, id: EntityId) -> Option<Position> {
            self.0.get(&id).copied()
        }

        fn closest_enemy(&self, point: Position, radius: f32) -> Option<(EntityId, Position)> {
            self.0
                .iter()
                .map(|(&id, &pos)| (id, pos, planar_distance(point, pos)))
                .filter(|(_, _, d)| *d <= radius)
                .min_by(|a, b| a.2.total_cmp(&b.2))
                .map(|(id, pos, _)| (id, pos))
        }
    }

    fn bolt() -> AbilityRef {
        AbilityDefinition::new(
            AbilityId::new(1),
            "Bolt",
            AbilityKind::Damage,
            TargetKind::SingleTarget,
        )
        .with_costs(3.0, 20.0)
        .with_range(10.0, 0.0)
        .with_base_value(5.0)
        .with_damage_kind(DamageKind::Magical)
        .with_damage_scaling(ScalingEntry::new(StatKind::Spirit, 2.0))
        .into_ref()
    }

    fn mend() -> AbilityRef {
        AbilityDefinition::new(AbilityId::new(2), "Mend", AbilityKind::Heal, TargetKind::Caster)
            .with_costs(1.0, 10.0)
            .with_base_value(15.0)
            .into_ref()
    }

    fn book_with(ability: AbilityRef) -> AbilityBook {
        let mut book = AbilityBook::new(4);
        book.assign(0, Some(ability)).expect("slot exists");
        book
    }

    fn enemy_at(x: f32) -> (EntityId, Enemies) {
        let id = EntityId::new();
        let mut enemies = Enemies::default();
        enemies.0.insert(id, Position::new(x, 0.0, 0.0));
        (id, enemies)
    }

    #[test]
    fn test_scaling_additive_and_multiplicative_agree() {
        let stats = StatBlock::new(Attributes::default().with_spirit(20), 1);
        let additive = [ScalingEntry::new(StatKind::Spirit, 1.5)];
        let multiplicative = [ScalingEntry {
            operation: ScalingOperation::Multiplicative,
            ..ScalingEntry::new(StatKind::Spirit, 1.5)
        }];
        assert_eq!(evaluate_scaling(10.0, &additive, &stats), 40.0);
        assert_eq!(evaluate_scaling(10.0, &multiplicative, &stats), 40.0);
    }

    #[test]
    fn test_selected_target_cast_commits_once() {
        let (id, enemies) = enemy_at(5.0);
        let mut probe = MockProbe::new();
        let mut book = book_with(bolt());
        let mut stats = StatBlock::default();
        let mana = stats.mana();

        let mut ctx = CastContext {
            caster_position: Position::ZERO,
            selected_target: Some(id),
            probe: &mut probe,
            enemies: &enemies,
            smart_cast_radius: 2.0,
        };
        let plan = book.cast(0, &mut stats, &mut ctx).expect("cast succeeds");
        assert_eq!(
            plan.effect,
            AbilityEffect::DamageTarget {
                target: id,
                amount: 25.0,
                kind: DamageKind::Magical
            }
        );
        assert_eq!(stats.mana(), mana - 20.0);
        assert_eq!(book.cooldown_remaining(0), 3.0);

        let second = book.cast(0, &mut stats, &mut ctx);
        assert_eq!(second, Err(CastError::OnCooldown { remaining: 3.0 }));
        assert_eq!(stats.mana(), mana - 20.0);
        assert_eq!(book.cooldown_remaining(0), 3.0);
        assert_eq!(probe.calls(), 0);
    }

    #[test]
    fn test_exact_mana_succeeds_and_one_less_fails() {
        let (id, enemies) = enemy_at(1.0);
        let mut probe = MockProbe::new();
        let mut book = book_with(bolt());
        let mut stats = StatBlock::default();
        stats.spend_mana(stats.mana() - 20.0);
        assert_eq!(stats.mana(), 20.0);

        let mut ctx = CastContext {
            caster_position: Position::ZERO,
            selected_target: Some(id),
            probe: &mut probe,
            enemies: &enemies,
            smart_cast_radius: 2.0,
        };
        book.cast(0, &mut stats, &mut ctx).expect("exact mana is enough");
        assert_eq!(stats.mana(), 0.0);

        let mut poor = StatBlock::default();
        poor.spend_mana(poor.mana() - 19.0);
        let mut fresh = book_with(bolt());
        let err = fresh.cast(0, &mut poor, &mut ctx).expect_err("one short");
        assert!(matches!(err, CastError::InsufficientMana { .. }));
        assert_eq!(poor.mana(), 19.0);
        assert_eq!(fresh.cooldown_remaining(0), 0.0);
    }

    #[test]
    fn test_out_of_range_leaves_state_untouched() {
        let (id, enemies) = enemy_at(12.0);
        let mut probe = MockProbe::new();
        let mut book = book_with(bolt());
        let mut stats = StatBlock::default();
        let mana = stats.mana();
        let mut ctx = CastContext {
            caster_position: Position::ZERO,
            selected_target: Some(id),
            probe: &mut probe,
            enemies: &enemies,
            smart_cast_radius: 2.0,
        };
        let err = book.cast(0, &mut stats, &mut ctx).expect_err("too far");
        assert!(matches!(err, CastError::OutOfRange { .. }));
        assert_eq!(stats.mana(), mana);
        assert_eq!(book.cooldown_remaining(0), 0.0);
    }

    #[test]
    fn test_probe_enemy_and_smart_cast() {
        let (id, enemies) = enemy_at(4.0);
        let mut probe = MockProbe::new();
        probe.push(Some(ProbeHit::enemy(id, Position::new(4.0, 0.0, 0.0))));
        probe.push(Some(ProbeHit::ground(Position::new(5.0, 0.0, 0.5))));
        probe.push(Some(ProbeHit::ground(Position::new(9.0, 0.0, 9.0))));

        let mut ctx = CastContext {
            caster_position: Position::ZERO,
            selected_target: None,
            probe: &mut probe,
            enemies: &enemies,
            smart_cast_radius: 2.0,
        };
        let direct = acquire_target(TargetKind::SingleTarget, &mut ctx).expect("enemy hit");
        assert!(matches!(direct, ResolvedTarget::Entity { id: hit, .. } if hit == id));
        let smart = acquire_target(TargetKind::AreaOfEffect, &mut ctx).expect("enemy near cursor");
        assert!(matches!(smart, ResolvedTarget::Entity { id: hit, .. } if hit == id));
        let miss = acquire_target(TargetKind::SingleTarget, &mut ctx);
        assert_eq!(miss, Err(CastError::NoTarget));
    }

    #[test]
    fn test_point_target_needs_ground() {
        let enemies = Enemies::default();
        let mut probe = MockProbe::new();
        probe.push(Some(ProbeHit {
            target: ProbeTarget::Other,
            point: Position::ZERO,
        }));
        probe.push(Some(ProbeHit::ground(Position::new(3.0, 0.0, 0.0))));
        let mut ctx = CastContext {
            caster_position: Position::ZERO,
            selected_target: None,
            probe: &mut probe,
            enemies: &enemies,
            smart_cast_radius: 2.0,
        };
        assert_eq!(
            acquire_target(TargetKind::PointTarget, &mut ctx),
            Err(CastError::NoTarget)
        );
        assert_eq!(
            acquire_target(TargetKind::PointTarget, &mut ctx),
            Ok(ResolvedTarget::Point(Position::new(3.0, 0.0, 0.0)))
        );
    }

    #[test]
    fn test_self_heal_skips_targeting() {
        let enemies = Enemies::default();
        let mut probe = MockProbe::new();
        let mut book = book_with(mend());
        let mut stats = StatBlock::default();
        let mut ctx = CastContext {
            caster_position: Position::ZERO,
            selected_target: None,
            probe: &mut probe,
            enemies: &enemies,
            smart_cast_radius: 2.0,
        };
        let plan = book.cast(0, &mut stats, &mut ctx).expect("self cast");
        assert_eq!(plan.effect, AbilityEffect::HealCaster { amount: 15.0 });
        assert_eq!(plan.target, ResolvedTarget::None);
        assert_eq!(probe.calls(), 0);
    }

    #[test]
    fn test_projectile_and_area_effects() {
        let stats = StatBlock::default();
        let caster = Position::new(1.0, 0.0, 1.0);
        let id = EntityId::new();
        let entity = ResolvedTarget::Entity {
            id,
            position: Position::ZERO,
        };

        let arrow = AbilityDefinition::new(
            AbilityId::new(3),
            "Arrow",
            AbilityKind::Damage,
            TargetKind::SingleTarget,
        )
        .with_projectile(ProjectileSpec::default());
        assert!(matches!(
            plan_effect(&arrow, &stats, caster, entity),
            AbilityEffect::LaunchProjectile { target, .. } if target == id
        ));

        let nova = AbilityDefinition::new(
            AbilityId::new(4),
            "Nova",
            AbilityKind::Damage,
            TargetKind::AreaOfEffect,
        );
        assert!(matches!(
            plan_effect(&nova, &stats, caster, entity),
            AbilityEffect::DamageArea { center, .. } if center == caster
        ));

        let quake = AbilityDefinition::new(
            AbilityId::new(5),
            "Quake",
            AbilityKind::Damage,
            TargetKind::PointTarget,
        );
        let point = Position::new(6.0, 0.0, 0.0);
        assert!(matches!(
            plan_effect(&quake, &stats, caster, ResolvedTarget::Point(point)),
            AbilityEffect::DamageArea { center, .. } if center == point
        ));

        let haste = AbilityDefinition::new(AbilityId::new(6), "Haste", AbilityKind::Buff, TargetKind::Caster);
        assert_eq!(
            plan_effect(&haste, &stats, caster, ResolvedTarget::None),
            AbilityEffect::Unimplemented(AbilityKind::Buff)
        );
    }

    #[test]
    fn test_empty_and_invalid_slots() {
        let enemies = Enemies::default();
        let mut probe = MockProbe::new();
        let mut book = AbilityBook::new(2);
        let mut stats = StatBlock::default();
        let mut ctx = CastContext {
            caster_position: Position::ZERO,
            selected_target: None,
            probe: &mut probe,
            enemies: &enemies,
            smart_cast_radius: 2.0,
        };
        assert_eq!(book.cast(1, &mut stats, &mut ctx), Err(CastError::EmptySlot(1)));
        assert_eq!(
            book.cast(5, &mut stats, &mut ctx),
            Err(CastError::InvalidSlot { slot: 5, slots: 2 })
        );
    }

    #[test]
    fn test_cooldown_ticks_down_to_zero() {
        let mut book = book_with(mend());
        book.cooldowns[0] = 1.0;
        book.tick(0.4);
        assert!((book.cooldown_remaining(0) - 0.6).abs() < 1e-6);
        book.tick(5.0);
        assert_eq!(book.cooldown_remaining(0), 0.0);
    }

    #[test]
    fn test_deserialize_self_target() {
        let ability: AbilityDefinition = toml::from_str(
            r#"
            id = 9
            name = "Rest"
            kind = "Heal"
            target = "Self"
            "#,
        )
        .expect("valid ability");
        assert_eq!(ability.target, TargetKind::Caster);
        assert_eq!(ability.range, 10.0);
        assert!(ability.projectile.is_none());
    }
}
