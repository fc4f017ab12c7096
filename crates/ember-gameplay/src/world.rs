//! Interfaces to the host world.
//!
//! The gameplay core never walks a scene graph. Navigation, aim probing and
//! object spawning are collaborators handed in at construction time. Mock
//! implementations live here as well so tests and tools can drive the core
//! without a host.

use std::collections::{HashSet, VecDeque};

use ember_common::{AbilityId, EntityId, ItemId, Position};

use crate::items::ItemRef;

// ============================================================================
// Navigation
// ============================================================================

/// Path queries against the walkable surface.
pub trait NavigationService {
    /// Nearest walkable point within `radius` of `point`, if any.
    fn find_nearest_navigable_point(&self, point: Position, radius: f32) -> Option<Position>;

    /// Next point to steer towards on the way from `from` to `to`.
    ///
    /// `None` means the destination is unreachable and the mover should stop.
    fn next_waypoint(&self, from: Position, to: Position) -> Option<Position>;

    /// Turning speed used to smooth facing changes, in radians per second.
    fn angular_speed(&self) -> f32;
}

// ============================================================================
// Aim Probe
// ============================================================================

/// What an aim probe struck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeTarget {
    /// Walkable ground.
    Ground,
    /// A live enemy.
    Enemy(EntityId),
    /// Anything else (walls, props).
    Other,
}

/// Result of an aim probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// What was hit.
    pub target: ProbeTarget,
    /// World point of the hit.
    pub point: Position,
}

impl ProbeHit {
    /// A ground hit at `point`.
    #[must_use]
    pub const fn ground(point: Position) -> Self {
        Self {
            target: ProbeTarget::Ground,
            point,
        }
    }

    /// An enemy hit at `point`.
    #[must_use]
    pub const fn enemy(id: EntityId, point: Position) -> Self {
        Self {
            target: ProbeTarget::Enemy(id),
            point,
        }
    }
}

/// Casts the player's aim ray (cursor, stick) into the world.
pub trait WorldProbe {
    /// Probes once from the current aim. `None` if nothing was hit.
    fn probe(&mut self) -> Option<ProbeHit>;
}

// ============================================================================
// Spawning
// ============================================================================

/// Payload of a floating combat text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloatingText {
    /// Damage dealt.
    Damage(f32),
    /// Health restored.
    Heal(f32),
    /// An attack missed.
    Miss,
}

/// Creates and destroys presentation objects in the host world.
pub trait SpawnFactory {
    /// Shows a floating number or "miss" marker at `position`.
    fn spawn_floating_text(&mut self, position: Position, text: FloatingText);

    /// Drops one unit of `item` at `position`.
    fn spawn_item(&mut self, item: &ItemRef, position: Position);

    /// Creates the visual for projectile `id` fired by `ability`.
    fn spawn_projectile(&mut self, id: EntityId, ability: AbilityId, position: Position);

    /// Destroys the object backing `id`.
    fn despawn(&mut self, id: EntityId);

    /// Shows or hides an entity and toggles its interaction.
    fn set_active(&mut self, id: EntityId, active: bool);
}

// ============================================================================
// Mocks
// ============================================================================

/// Mock navigation over an unbounded open field.
#[derive(Debug, Clone)]
pub struct MockNavigation {
    /// When set, every navigable-point query fails.
    unreachable: bool,
    /// Destinations that `next_waypoint` refuses to route to.
    blocked: HashSet<(i32, i32)>,
    angular_speed: f32,
}

impl Default for MockNavigation {
    fn default() -> Self {
        Self {
            unreachable: false,
            blocked: HashSet::new(),
            angular_speed: std::f32::consts::TAU,
        }
    }
}

impl MockNavigation {
    /// Creates an open-field navigation mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every navigable-point query fail.
    #[must_use]
    pub const fn with_unreachable(mut self, unreachable: bool) -> Self {
        self.unreachable = unreachable;
        self
    }

    /// Sets the turning speed.
    #[must_use]
    pub const fn with_angular_speed(mut self, speed: f32) -> Self {
        self.angular_speed = speed;
        self
    }

    /// Blocks routing to the integer cell containing `x`, `z`.
    pub fn block(&mut self, x: i32, z: i32) {
        self.blocked.insert((x, z));
    }
}

impl NavigationService for MockNavigation {
    fn find_nearest_navigable_point(&self, point: Position, _radius: f32) -> Option<Position> {
        if self.unreachable {
            None
        } else {
            Some(point)
        }
    }

    fn next_waypoint(&self, _from: Position, to: Position) -> Option<Position> {
        let cell = (to.x.floor() as i32, to.z.floor() as i32);
        if self.blocked.contains(&cell) {
            None
        } else {
            Some(to)
        }
    }

    fn angular_speed(&self) -> f32 {
        self.angular_speed
    }
}

/// Mock aim probe returning queued hits, then a fallback.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    queued: VecDeque<Option<ProbeHit>>,
    fallback: Option<ProbeHit>,
    calls: usize,
}

impl MockProbe {
    /// Creates a probe that never hits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result returned once the queue is empty.
    #[must_use]
    pub fn with_fallback(mut self, hit: Option<ProbeHit>) -> Self {
        self.fallback = hit;
        self
    }

    /// Queues a single result.
    pub fn push(&mut self, hit: Option<ProbeHit>) {
        self.queued.push_back(hit);
    }

    /// Number of times the probe was used.
    #[must_use]
    pub const fn calls(&self) -> usize {
        self.calls
    }
}

impl WorldProbe for MockProbe {
    fn probe(&mut self) -> Option<ProbeHit> {
        self.calls += 1;
        self.queued.pop_front().unwrap_or(self.fallback)
    }
}

/// One call recorded by [`RecordingSpawner`].
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnRecord {
    /// Floating text.
    Text(Position, FloatingText),
    /// Dropped item.
    Item(ItemId, Position),
    /// Projectile created.
    Projectile(EntityId, AbilityId),
    /// Object destroyed.
    Despawn(EntityId),
    /// Entity shown or hidden.
    Active(EntityId, bool),
}

/// Spawn factory that records every call.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpawner {
    records: Vec<SpawnRecord>,
}

impl RecordingSpawner {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded call in order.
    #[must_use]
    pub fn records(&self) -> &[SpawnRecord] {
        &self.records
    }

    /// Number of "miss" texts shown.
    #[must_use]
    pub fn miss_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, SpawnRecord::Text(_, FloatingText::Miss)))
            .count()
    }

    /// Units of `item` dropped.
    #[must_use]
    pub fn dropped(&self, item: ItemId) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, SpawnRecord::Item(id, _) if *id == item))
            .count()
    }

    /// Clears the log.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl SpawnFactory for RecordingSpawner {
    fn spawn_floating_text(&mut self, position: Position, text: FloatingText) {
        self.records.push(SpawnRecord::Text(position, text));
    }

    fn spawn_item(&mut self, item: &ItemRef, position: Position) {
        self.records.push(SpawnRecord::Item(item.id, position));
    }

    fn spawn_projectile(&mut self, id: EntityId, ability: AbilityId, _position: Position) {
        self.records.push(SpawnRecord::Projectile(id, ability));
    }

    fn despawn(&mut self, id: EntityId) {
        self.records.push(SpawnRecord::Despawn(id));
    }

    fn set_active(&mut self, id: EntityId, active: bool) {
        self.records.push(SpawnRecord::Active(id, active));
    }
}
