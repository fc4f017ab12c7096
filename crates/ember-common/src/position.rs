//! World-space positions.
//!
//! The simulation is laid out on the ground plane: `x` and `z` are the
//! horizontal axes and `y` is height. Every range, radius and arrival check
//! in gameplay measures on the ground plane so that terrain height never
//! changes whether an enemy is "in range".

use glam::Vec3;

/// A position in world space.
pub type Position = Vec3;

/// Distance between two positions on the ground plane (ignores `y`).
#[must_use]
pub fn planar_distance(a: Position, b: Position) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}

/// Unit direction from `from` towards `to` on the ground plane.
///
/// Returns zero when the points coincide.
#[must_use]
pub fn planar_direction(from: Position, to: Position) -> Position {
    Vec3::new(to.x - from.x, 0.0, to.z - from.z).normalize_or_zero()
}

/// Heading angle (radians, around `y`) looking from `from` towards `to`.
///
/// Returns `None` when the points coincide on the ground plane.
#[must_use]
pub fn heading_towards(from: Position, to: Position) -> Option<f32> {
    let dir = planar_direction(from, to);
    if dir == Vec3::ZERO {
        None
    } else {
        Some(dir.x.atan2(dir.z))
    }
}

/// Moves `current` towards `target` by at most `max_step`, never overshooting.
#[must_use]
pub fn move_towards(current: Position, target: Position, max_step: f32) -> Position {
    let delta = target - current;
    let dist = delta.length();
    if dist <= max_step || dist <= f32::EPSILON {
        target
    } else {
        current + delta / dist * max_step
    }
}
