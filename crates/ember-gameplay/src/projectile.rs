//! Seeking ability projectiles.

use ember_common::{move_towards, AbilityId, EntityId, Position};
use tracing::trace;

use crate::abilities::{EnemyLocator, ProjectileSpec};
use crate::combat::DamageKind;
use crate::config::GameplayConfig;

/// Height above the caster at which projectiles are launched.
pub const LAUNCH_HEIGHT: f32 = 1.0;

/// What happened to a projectile during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileStep {
    /// Still flying.
    Flying,
    /// Touched an enemy; damage should be applied and the projectile removed.
    Struck(EntityId),
    /// Lifetime ran out.
    Expired,
    /// Target vanished and nothing was in contact.
    Fizzled,
}

impl ProjectileStep {
    /// Check if the projectile should be removed.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Flying)
    }
}

/// A projectile carrying precomputed ability damage towards an enemy.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    id: EntityId,
    ability: AbilityId,
    source: EntityId,
    target: EntityId,
    position: Position,
    amount: f32,
    kind: DamageKind,
    speed: f32,
    lifetime: f32,
}

impl Projectile {
    /// Creates a projectile at `origin`, using `config` for any value `spec` leaves unset.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn launch(
        ability: AbilityId,
        source: EntityId,
        target: EntityId,
        origin: Position,
        amount: f32,
        kind: DamageKind,
        spec: ProjectileSpec,
        config: &GameplayConfig,
    ) -> Self {
        Self {
            id: EntityId::new(),
            ability,
            source,
            target,
            position: origin + Position::Y * LAUNCH_HEIGHT,
            amount,
            kind,
            speed: spec.speed.unwrap_or(config.projectile_speed).max(0.0),
            lifetime: spec.lifetime.unwrap_or(config.projectile_lifetime).max(0.0),
        }
    }

    /// Projectile id.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Ability that fired it.
    #[must_use]
    pub const fn ability(&self) -> AbilityId {
        self.ability
    }

    /// Entity credited with the damage.
    #[must_use]
    pub const fn source(&self) -> EntityId {
        self.source
    }

    /// Enemy being sought.
    #[must_use]
    pub const fn target(&self) -> EntityId {
        self.target
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Raw damage carried.
    #[must_use]
    pub const fn amount(&self) -> f32 {
        self.amount
    }

    /// Damage kind carried.
    #[must_use]
    pub const fn kind(&self) -> DamageKind {
        self.kind
    }

    /// Seconds of flight left.
    #[must_use]
    pub const fn lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Advances the projectile by `dt` seconds.
    ///
    /// Seeks the target while it is alive. Once it is gone the projectile
    /// stops and strikes whatever enemy it is touching, or fizzles.
    pub fn tick(&mut self, dt: f32, enemies: &dyn EnemyLocator, contact_radius: f32) -> ProjectileStep {
        let dt = dt.max(0.0);
        self.lifetime -= dt;

        let Some(target_position) = enemies.enemy_position(self.target) else {
            return match enemies.closest_enemy(self.position, contact_radius) {
                Some((enemy, _)) => ProjectileStep::Struck(enemy),
                None => {
                    trace!(projectile = %self.id, "Target lost");
                    ProjectileStep::Fizzled
                },
            };
        };

        self.position = move_towards(self.position, target_position, self.speed * dt);

        if let Some((enemy, _)) = enemies.closest_enemy(self.position, contact_radius) {
            return ProjectileStep::Struck(enemy);
        }
        if self.position.distance(target_position) <= contact_radius {
            return ProjectileStep::Struck(self.target);
        }
        if self.lifetime <= 0.0 {
            return ProjectileStep::Expired;
        }
        ProjectileStep::Flying
    }
}
