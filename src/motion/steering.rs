//! Steering primitives for planar movement
//!
//! Clamped seeking toward a point and smoothed yaw facing. Shared by the
//! local avatar and by interpolated minions.

use glam::{Quat, Vec2};

/// Result of one clamped seek step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekStep {
    /// Position after the step
    pub position: Vec2,
    /// Unit direction of travel (zero if already there)
    pub direction: Vec2,
    /// Distance travelled this step
    pub travelled: f32,
    /// Distance still left to the target
    pub remaining: f32,
}

/// Move from `position` toward `target` by at most `max_step`.
///
/// Lands exactly on the target instead of overshooting it.
#[must_use]
pub fn seek(position: Vec2, target: Vec2, max_step: f32) -> SeekStep {
    let to_target = target - position;
    let distance = to_target.length();
    let direction = to_target.normalize_or_zero();

    if distance <= max_step.max(0.0) {
        return SeekStep {
            position: target,
            direction,
            travelled: distance,
            remaining: 0.0,
        };
    }

    let travelled = max_step.max(0.0);
    SeekStep {
        position: position + direction * travelled,
        direction,
        travelled,
        remaining: distance - travelled,
    }
}

/// Position after a clamped seek step
#[must_use]
pub fn step_toward(position: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    seek(position, target, max_step).position
}

/// Yaw rotation about +Y that turns local +Z toward a planar direction
#[must_use]
pub fn facing(direction: Vec2) -> Quat {
    Quat::from_rotation_y(direction.x.atan2(direction.y))
}

/// Blend `current` toward facing `direction` by a fixed fraction
#[must_use]
pub fn turn_toward(current: Quat, direction: Vec2, blend: f32) -> Quat {
    if direction == Vec2::ZERO {
        return current;
    }
    current.slerp(facing(direction), blend.clamp(0.0, 1.0))
}

/// Planar heading in radians of a facing produced by [`facing`]
#[must_use]
pub fn yaw_of(rotation: Quat) -> f32 {
    let forward = rotation * glam::Vec3::Z;
    forward.x.atan2(forward.z)
}
