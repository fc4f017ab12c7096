//! Combat resolution.
//!
//! This module provides:
//! - Hit/miss rolls weighted by hit points against dodge points
//! - Damage rolls from the attacker's damage range
//! - Defense mitigation per damage kind
//! - Attack cadence timers owned by each attacker
//!
//! The resolver owns only its random source. Cooldown state lives with the
//! caller in an [`AttackTimer`], which is always evaluated against the
//! attacker's current attack speed.

use fastrand::Rng;
use serde::{Deserialize, Serialize};

use crate::stats::StatBlock;

// ============================================================================
// Damage Kinds
// ============================================================================

/// How incoming damage interacts with defense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageKind {
    /// Reduced by defense, rolled from the physical range.
    #[default]
    Physical,
    /// Reduced by defense, rolled from the magical range.
    Magical,
    /// Ignores defense entirely.
    Pure,
}

impl DamageKind {
    /// Check if this damage kind ignores defense.
    #[must_use]
    pub const fn bypasses_defense(self) -> bool {
        matches!(self, Self::Pure)
    }

    /// Applies defense to a raw amount. Never negative.
    #[must_use]
    pub fn mitigate(self, raw: f32, defense: f32) -> f32 {
        let raw = raw.max(0.0);
        if self.bypasses_defense() {
            raw
        } else {
            (raw - defense.max(0.0)).max(0.0)
        }
    }
}

/// Probability that an attack with `hit_points` lands against `dodge_points`.
///
/// Returns 0 when the ratio is undefined or non-positive, so a 0/0 matchup
/// is a guaranteed miss instead of NaN.
#[must_use]
pub fn hit_chance(hit_points: f32, dodge_points: f32) -> f32 {
    let total = hit_points + dodge_points;
    if total.is_nan() || total <= 0.0 || hit_points.is_nan() || hit_points <= 0.0 {
        return 0.0;
    }
    (hit_points / total).clamp(0.0, 1.0)
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of applying damage to a stat block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageReport {
    /// Amount removed after mitigation.
    pub amount: f32,
    /// Whether this damage killed the defender.
    pub killed: bool,
}

/// Result of one attack resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    /// The attack landed.
    Hit(DamageReport),
    /// The attack missed. Distinct from a zero-damage hit.
    Miss,
    /// The defender was already dead; nothing was rolled.
    TargetDead,
}

impl AttackOutcome {
    /// Check if the attack landed.
    #[must_use]
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Check if the attack missed.
    #[must_use]
    pub const fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }

    /// Damage dealt (zero for misses).
    #[must_use]
    pub const fn damage(&self) -> f32 {
        match self {
            Self::Hit(report) => report.amount,
            Self::Miss | Self::TargetDead => 0.0,
        }
    }

    /// Whether the attack killed the defender.
    #[must_use]
    pub const fn killed(&self) -> bool {
        match self {
            Self::Hit(report) => report.killed,
            Self::Miss | Self::TargetDead => false,
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Rolls hits and damage between two stat blocks.
#[derive(Debug, Clone)]
pub struct CombatResolver {
    rng: Rng,
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CombatResolver {
    /// Creates a resolver with a randomly seeded generator.
    #[must_use]
    pub fn new() -> Self {
        Self { rng: Rng::new() }
    }

    /// Creates a resolver with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Rng::with_seed(seed),
        }
    }

    /// Rolls whether `attacker` hits `defender`.
    pub fn roll_hit(&mut self, attacker: &StatBlock, defender: &StatBlock) -> bool {
        let chance = hit_chance(
            attacker.substats().hit_points,
            defender.substats().dodge_points,
        );
        chance > 0.0 && self.rng.f32() <= chance
    }

    /// Rolls a raw damage amount from the attacker's range for `kind`.
    ///
    /// Magical uses the magical range; Physical and Pure use the physical range.
    pub fn roll_damage(&mut self, attacker: &StatBlock, kind: DamageKind) -> f32 {
        let s = attacker.substats();
        let (a, b) = match kind {
            DamageKind::Magical => (s.min_magical_damage, s.max_magical_damage),
            DamageKind::Physical | DamageKind::Pure => {
                (s.min_physical_damage, s.max_physical_damage)
            },
        };
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        lo + self.rng.f32() * (hi - lo)
    }

    /// Resolves one attack: hit roll, damage roll, mitigation, application.
    pub fn resolve_attack(
        &mut self,
        attacker: &StatBlock,
        defender: &mut StatBlock,
        kind: DamageKind,
    ) -> AttackOutcome {
        if defender.is_dead() {
            return AttackOutcome::TargetDead;
        }
        if !self.roll_hit(attacker, defender) {
            return AttackOutcome::Miss;
        }
        let raw = self.roll_damage(attacker, kind);
        AttackOutcome::Hit(Self::apply_damage(defender, raw, kind))
    }

    /// Applies an already-computed raw amount through defense mitigation.
    ///
    /// Used by abilities and projectiles, which skip the hit roll.
    pub fn apply_damage(defender: &mut StatBlock, raw: f32, kind: DamageKind) -> DamageReport {
        let amount = kind.mitigate(raw, defender.substats().defense);
        let before = defender.health();
        let killed = defender.take_damage(amount);
        DamageReport {
            amount: before - defender.health(),
            killed,
        }
    }

    /// Draws a uniform value in [0, 1) from the resolver's generator.
    pub fn roll_unit(&mut self) -> f32 {
        self.rng.f32()
    }

    /// Mutable access to the underlying generator.
    pub fn rng_mut(&mut self) -> &mut Rng {
        &mut self.rng
    }
}

// ============================================================================
// Attack Cadence
// ============================================================================

/// Time since an attacker's last attack.
///
/// The gate is `elapsed >= 1 / attack_speed`, with `attack_speed` read at
/// the moment of the check so stat changes apply immediately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackTimer {
    elapsed: f32,
}

impl Default for AttackTimer {
    fn default() -> Self {
        Self::ready()
    }
}

impl AttackTimer {
    /// A timer that allows an attack immediately.
    #[must_use]
    pub const fn ready() -> Self {
        Self { elapsed: f32::MAX }
    }

    /// A timer that has just fired.
    #[must_use]
    pub const fn cooling() -> Self {
        Self { elapsed: 0.0 }
    }

    /// Advances the timer.
    pub fn tick(&mut self, dt: f32) {
        if dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(f32::MAX);
        }
    }

    /// Seconds between attacks at `attack_speed`.
    #[must_use]
    pub fn interval(attack_speed: f32) -> f32 {
        1.0 / attack_speed.max(f32::EPSILON)
    }

    /// Check if an attack is allowed at `attack_speed`.
    #[must_use]
    pub fn is_ready(&self, attack_speed: f32) -> bool {
        self.elapsed >= Self::interval(attack_speed)
    }

    /// Seconds until the next attack is allowed.
    #[must_use]
    pub fn remaining(&self, attack_speed: f32) -> f32 {
        (Self::interval(attack_speed) - self.elapsed).max(0.0)
    }

    /// Restarts the timer after an attack.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
