//! Character statistics.
//!
//! This module provides:
//! - Base attributes (strength, agility, constitution, spirit, accuracy)
//! - Derived substats computed from attributes, level and equipment bonuses
//! - Health, mana and experience pools with level progression
//!
//! A [`StatBlock`] never recomputes implicitly. Anything that changes
//! attributes, level or equipment bonuses calls [`StatBlock::recompute`]
//! afterwards (the mutating helpers in this module already do).

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default value for every base attribute of a fresh character.
pub const DEFAULT_ATTRIBUTE: u32 = 10;

/// Experience required to go from level 1 to level 2 before scaling.
pub const BASE_LEVEL_EXPERIENCE: f32 = 100.0;

/// Default melee reach in world units.
pub const DEFAULT_ATTACK_RANGE: f32 = 2.0;

/// Default movement speed in world units per second.
pub const DEFAULT_MOVEMENT_SPEED: f32 = 5.0;

// ============================================================================
// Attributes
// ============================================================================

/// One of the five base attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Physical damage.
    Strength,
    /// Dodge and attack speed.
    Agility,
    /// Defense, health and health regeneration.
    Constitution,
    /// Magical damage, mana and mana regeneration.
    Spirit,
    /// Ranged damage and hit points.
    Accuracy,
}

impl Attribute {
    /// All attributes in display order.
    pub const ALL: [Self; 5] = [
        Self::Strength,
        Self::Agility,
        Self::Constitution,
        Self::Spirit,
        Self::Accuracy,
    ];
}

/// The five base attributes of a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Strength.
    pub strength: u32,
    /// Agility.
    pub agility: u32,
    /// Constitution.
    pub constitution: u32,
    /// Spirit.
    pub spirit: u32,
    /// Accuracy.
    pub accuracy: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self::uniform(DEFAULT_ATTRIBUTE)
    }
}

impl Attributes {
    /// Creates attributes with every value set to `value`.
    #[must_use]
    pub const fn uniform(value: u32) -> Self {
        Self {
            strength: value,
            agility: value,
            constitution: value,
            spirit: value,
            accuracy: value,
        }
    }

    /// Sets strength.
    #[must_use]
    pub const fn with_strength(mut self, value: u32) -> Self {
        self.strength = value;
        self
    }

    /// Sets agility.
    #[must_use]
    pub const fn with_agility(mut self, value: u32) -> Self {
        self.agility = value;
        self
    }

    /// Sets constitution.
    #[must_use]
    pub const fn with_constitution(mut self, value: u32) -> Self {
        self.constitution = value;
        self
    }

    /// Sets spirit.
    #[must_use]
    pub const fn with_spirit(mut self, value: u32) -> Self {
        self.spirit = value;
        self
    }

    /// Sets accuracy.
    #[must_use]
    pub const fn with_accuracy(mut self, value: u32) -> Self {
        self.accuracy = value;
        self
    }

    /// Returns the value of one attribute.
    #[must_use]
    pub const fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Agility => self.agility,
            Attribute::Constitution => self.constitution,
            Attribute::Spirit => self.spirit,
            Attribute::Accuracy => self.accuracy,
        }
    }

    fn get_mut(&mut self, attribute: Attribute) -> &mut u32 {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Agility => &mut self.agility,
            Attribute::Constitution => &mut self.constitution,
            Attribute::Spirit => &mut self.spirit,
            Attribute::Accuracy => &mut self.accuracy,
        }
    }
}

// ============================================================================
// Substats
// ============================================================================

/// Derived combat statistics.
///
/// The same shape doubles as the equipment bonus accumulator and as the
/// per-item bonus table, one additive field per derived substat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Substats {
    /// Lower bound of a melee damage roll.
    pub min_physical_damage: f32,
    /// Upper bound of a melee damage roll.
    pub max_physical_damage: f32,
    /// Denominator weight against incoming hit rolls.
    pub dodge_points: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Flat mitigation against physical and magical damage.
    pub defense: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Health regenerated per second.
    pub health_regen: f32,
    /// Lower bound of a magical damage roll.
    pub min_magical_damage: f32,
    /// Upper bound of a magical damage roll.
    pub max_magical_damage: f32,
    /// Maximum mana.
    pub max_mana: f32,
    /// Mana regenerated per second.
    pub mana_regen: f32,
    /// Lower bound of a ranged damage roll.
    pub ranged_min_physical_damage: f32,
    /// Upper bound of a ranged damage roll.
    pub ranged_max_physical_damage: f32,
    /// Numerator weight of outgoing hit rolls.
    pub hit_points: f32,
}

impl Substats {
    /// Adds every field of `other` into `self`.
    pub fn accumulate(&mut self, other: &Self) {
        self.min_physical_damage += other.min_physical_damage;
        self.max_physical_damage += other.max_physical_damage;
        self.dodge_points += other.dodge_points;
        self.attack_speed += other.attack_speed;
        self.defense += other.defense;
        self.max_health += other.max_health;
        self.health_regen += other.health_regen;
        self.min_magical_damage += other.min_magical_damage;
        self.max_magical_damage += other.max_magical_damage;
        self.max_mana += other.max_mana;
        self.mana_regen += other.mana_regen;
        self.ranged_min_physical_damage += other.ranged_min_physical_damage;
        self.ranged_max_physical_damage += other.ranged_max_physical_damage;
        self.hit_points += other.hit_points;
    }

    /// Returns true if every field is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Raw formula values for the given attributes and level, before bonuses and floors.
    #[must_use]
    pub fn from_attributes(attributes: &Attributes, level: u32) -> Self {
        let str = attributes.strength as f32;
        let agi = attributes.agility as f32;
        let con = attributes.constitution as f32;
        let spi = attributes.spirit as f32;
        let acc = attributes.accuracy as f32;
        let lvl = level as f32;

        Self {
            min_physical_damage: str * 0.8 + lvl * 0.2,
            max_physical_damage: str * 1.2 + lvl * 0.3,
            dodge_points: agi * 0.5 + lvl * 0.1,
            attack_speed: 1.0 + agi * 0.02,
            defense: con * 0.6 + lvl * 0.15,
            max_health: 100.0 + con * 5.0 + lvl * 10.0,
            health_regen: con * 0.1 + lvl * 0.05,
            min_magical_damage: spi * 0.7 + lvl * 0.2,
            max_magical_damage: spi * 1.3 + lvl * 0.3,
            max_mana: 50.0 + spi * 3.0 + lvl * 5.0,
            mana_regen: spi * 0.15 + lvl * 0.07,
            ranged_min_physical_damage: acc * 0.7 + lvl * 0.2,
            ranged_max_physical_damage: acc * 1.1 + lvl * 0.3,
            hit_points: acc * 0.6 + lvl * 0.1,
        }
    }

    /// Clamps every field to its documented floor.
    #[must_use]
    pub fn floored(mut self) -> Self {
        self.min_physical_damage = self.min_physical_damage.max(1.0);
        self.max_physical_damage = self.max_physical_damage.max(1.0);
        self.dodge_points = self.dodge_points.max(0.0);
        self.attack_speed = self.attack_speed.max(0.5);
        self.defense = self.defense.max(0.0);
        self.max_health = self.max_health.max(1.0);
        self.health_regen = self.health_regen.max(0.0);
        self.min_magical_damage = self.min_magical_damage.max(1.0);
        self.max_magical_damage = self.max_magical_damage.max(1.0);
        self.max_mana = self.max_mana.max(1.0);
        self.mana_regen = self.mana_regen.max(0.0);
        self.ranged_min_physical_damage = self.ranged_min_physical_damage.max(1.0);
        self.ranged_max_physical_damage = self.ranged_max_physical_damage.max(1.0);
        self.hit_points = self.hit_points.max(0.0);
        self
    }
}

/// Any readable statistic, used by ability scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    /// Strength attribute.
    Strength,
    /// Agility attribute.
    Agility,
    /// Constitution attribute.
    Constitution,
    /// Spirit attribute.
    Spirit,
    /// Accuracy attribute.
    Accuracy,
    /// Minimum physical damage.
    MinPhysicalDamage,
    /// Maximum physical damage.
    MaxPhysicalDamage,
    /// Dodge points.
    DodgePoints,
    /// Attack speed.
    AttackSpeed,
    /// Defense.
    Defense,
    /// Maximum health.
    MaxHealth,
    /// Health regeneration per second.
    HealthRegen,
    /// Minimum magical damage.
    MinMagicalDamage,
    /// Maximum magical damage.
    MaxMagicalDamage,
    /// Maximum mana.
    MaxMana,
    /// Mana regeneration per second.
    ManaRegen,
    /// Minimum ranged damage.
    RangedMinPhysicalDamage,
    /// Maximum ranged damage.
    RangedMaxPhysicalDamage,
    /// Hit points.
    HitPoints,
}

// ============================================================================
// Stat Block
// ============================================================================

/// Complete statistics of one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    attributes: Attributes,
    level: u32,
    unallocated_points: u32,
    health: f32,
    mana: f32,
    experience: f32,
    next_level_experience: f32,
    substats: Substats,
    equipment_bonuses: Substats,
    attack_range: f32,
    movement_speed: f32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self::new(Attributes::default(), 1)
    }
}

impl StatBlock {
    /// Creates a stat block with full health and mana.
    ///
    /// Levels below 1 are raised to 1. The experience threshold is the one a
    /// block that levelled up to `level` would have.
    #[must_use]
    pub fn new(attributes: Attributes, level: u32) -> Self {
        let level = level.max(1);
        let next_level_experience = if level == 1 {
            BASE_LEVEL_EXPERIENCE
        } else {
            Self::experience_for_level(level)
        };
        let mut block = Self {
            attributes,
            level,
            unallocated_points: 0,
            health: 0.0,
            mana: 0.0,
            experience: 0.0,
            next_level_experience,
            substats: Substats::default(),
            equipment_bonuses: Substats::default(),
            attack_range: DEFAULT_ATTACK_RANGE,
            movement_speed: DEFAULT_MOVEMENT_SPEED,
        };
        block.recompute();
        block.restore_full();
        block
    }

    /// Sets the melee reach.
    #[must_use]
    pub fn with_attack_range(mut self, range: f32) -> Self {
        self.attack_range = range.max(0.0);
        self
    }

    /// Sets the movement speed.
    #[must_use]
    pub fn with_movement_speed(mut self, speed: f32) -> Self {
        self.movement_speed = speed.max(0.0);
        self
    }

    // === Queries ===

    /// Base attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Current level (always ≥ 1).
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Attribute points waiting to be allocated.
    #[must_use]
    pub const fn unallocated_points(&self) -> u32 {
        self.unallocated_points
    }

    /// Derived substats as of the last recompute.
    #[must_use]
    pub const fn substats(&self) -> &Substats {
        &self.substats
    }

    /// Accumulated equipment bonuses.
    #[must_use]
    pub const fn equipment_bonuses(&self) -> &Substats {
        &self.equipment_bonuses
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.substats.max_health
    }

    /// Current mana.
    #[must_use]
    pub const fn mana(&self) -> f32 {
        self.mana
    }

    /// Maximum mana.
    #[must_use]
    pub const fn max_mana(&self) -> f32 {
        self.substats.max_mana
    }

    /// Experience accumulated towards the next level.
    #[must_use]
    pub const fn experience(&self) -> f32 {
        self.experience
    }

    /// Experience needed to reach the next level.
    #[must_use]
    pub const fn next_level_experience(&self) -> f32 {
        self.next_level_experience
    }

    /// Melee reach in world units.
    #[must_use]
    pub const fn attack_range(&self) -> f32 {
        self.attack_range
    }

    /// Movement speed in world units per second.
    #[must_use]
    pub const fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    /// Check if dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Check if alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// Health percentage (0.0-1.0).
    #[must_use]
    pub fn health_percent(&self) -> f32 {
        (self.health / self.max_health()).clamp(0.0, 1.0)
    }

    /// Reads any statistic by kind.
    #[must_use]
    pub fn value(&self, kind: StatKind) -> f32 {
        let s = &self.substats;
        match kind {
            StatKind::Strength => self.attributes.strength as f32,
            StatKind::Agility => self.attributes.agility as f32,
            StatKind::Constitution => self.attributes.constitution as f32,
            StatKind::Spirit => self.attributes.spirit as f32,
            StatKind::Accuracy => self.attributes.accuracy as f32,
            StatKind::MinPhysicalDamage => s.min_physical_damage,
            StatKind::MaxPhysicalDamage => s.max_physical_damage,
            StatKind::DodgePoints => s.dodge_points,
            StatKind::AttackSpeed => s.attack_speed,
            StatKind::Defense => s.defense,
            StatKind::MaxHealth => s.max_health,
            StatKind::HealthRegen => s.health_regen,
            StatKind::MinMagicalDamage => s.min_magical_damage,
            StatKind::MaxMagicalDamage => s.max_magical_damage,
            StatKind::MaxMana => s.max_mana,
            StatKind::ManaRegen => s.mana_regen,
            StatKind::RangedMinPhysicalDamage => s.ranged_min_physical_damage,
            StatKind::RangedMaxPhysicalDamage => s.ranged_max_physical_damage,
            StatKind::HitPoints => s.hit_points,
        }
    }

    // === Derivation ===

    /// Re-derives every substat from attributes, level and equipment bonuses.
    ///
    /// Floors are applied after bonuses, and current health/mana are clamped
    /// into the new maxima.
    pub fn recompute(&mut self) {
        let mut derived = Substats::from_attributes(&self.attributes, self.level);
        derived.accumulate(&self.equipment_bonuses);
        self.substats = derived.floored();
        self.health = self.health.clamp(0.0, self.substats.max_health);
        self.mana = self.mana.clamp(0.0, self.substats.max_mana);
    }

    /// Zeroes every equipment bonus accumulator.
    ///
    /// Substats are left stale until the caller re-applies bonuses and recomputes.
    pub fn reset_equipment_bonuses(&mut self) {
        self.equipment_bonuses = Substats::default();
    }

    /// Adds one item's bonuses to the accumulators.
    pub fn add_equipment_bonuses(&mut self, bonuses: &Substats) {
        self.equipment_bonuses.accumulate(bonuses);
    }

    // === Progression ===

    /// Experience threshold for leaving `level`.
    #[must_use]
    pub fn experience_for_level(level: u32) -> f32 {
        let step = level.max(1) - 1;
        let segment = (step / 10) as f32;
        let within = (step % 10 + 1) as f32;
        BASE_LEVEL_EXPERIENCE * (1.0 + 0.5 * segment) * (1.0 + 0.05 * within)
    }

    /// Adds experience, levelling up as many times as it allows.
    ///
    /// Returns the number of levels gained.
    pub fn gain_experience(&mut self, amount: f32) -> u32 {
        if amount <= 0.0 || !amount.is_finite() {
            return 0;
        }
        self.experience += amount;

        let mut gained = 0;
        while self.experience >= self.next_level_experience {
            self.experience -= self.next_level_experience;
            self.level += 1;
            self.unallocated_points += 1;
            if self.level % 10 == 0 {
                self.unallocated_points += 3;
            }
            self.next_level_experience = Self::experience_for_level(self.level);
            gained += 1;
        }

        if gained > 0 {
            self.recompute();
            self.restore_full();
            debug!(
                level = self.level,
                points = self.unallocated_points,
                "Level up"
            );
        }
        gained
    }

    /// Spends one unallocated point on `attribute`.
    ///
    /// Returns false (and changes nothing) if no points are available.
    pub fn allocate_attribute(&mut self, attribute: Attribute) -> bool {
        if self.unallocated_points == 0 {
            return false;
        }
        self.unallocated_points -= 1;
        *self.attributes.get_mut(attribute) += 1;
        self.recompute();
        true
    }

    /// Grants unallocated points without levelling.
    pub fn grant_attribute_points(&mut self, points: u32) {
        self.unallocated_points += points;
    }

    // === Pools ===

    /// Removes health, clamped to [0, max].
    ///
    /// Returns true only if this call brought health from above zero to zero.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.is_alive();
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        self.health = (self.health - amount).clamp(0.0, self.max_health());
        was_alive && self.is_dead()
    }

    /// Restores health, clamped to max. Returns the amount actually restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health());
        self.health - before
    }

    /// Restores mana, clamped to max. Returns the amount actually restored.
    pub fn restore_mana(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.mana;
        self.mana = (self.mana + amount).min(self.max_mana());
        self.mana - before
    }

    /// Check if has at least `amount` mana.
    #[must_use]
    pub fn has_mana(&self, amount: f32) -> bool {
        self.mana >= amount
    }

    /// Consumes mana (returns true if successful).
    pub fn spend_mana(&mut self, amount: f32) -> bool {
        if !self.has_mana(amount) {
            return false;
        }
        self.mana = (self.mana - amount.max(0.0)).max(0.0);
        true
    }

    /// Sets health and mana to their maxima.
    pub fn restore_full(&mut self) {
        self.health = self.max_health();
        self.mana = self.max_mana();
    }

    /// Regenerates health and mana for `dt` seconds. Dead characters do not regenerate.
    pub fn tick(&mut self, dt: f32) {
        if self.is_dead() || dt <= 0.0 {
            return;
        }
        self.health = (self.health + self.substats.health_regen * dt).min(self.max_health());
        self.mana = (self.mana + self.substats.mana_regen * dt).min(self.max_mana());
    }
}
