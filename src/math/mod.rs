//! Small math helpers shared by perception, leashing, and streaming.
//!
//! Gameplay distances in this simulation are measured on the XZ plane;
//! elevation differences are intentionally ignored so a target standing on
//! a ledge directly above an agent still counts as "in range".

use glam::Vec3;

/// Distance between two points projected onto the XZ plane.
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;
    (dx * dx + dz * dz).sqrt()
}

/// Unit direction from `from` to `to` on the XZ plane.
///
/// Returns `Vec3::ZERO` when the points coincide.
pub fn flat_direction(from: Vec3, to: Vec3) -> Vec3 {
    let d = Vec3::new(to.x - from.x, 0.0, to.z - from.z);
    let len = d.length();
    if len > 1e-6 { d / len } else { Vec3::ZERO }
}

/// Cosine of the angle between `forward` and the direction toward `target`,
/// both projected onto the XZ plane.
///
/// Values above 0.5 mean the target is within a ~60 degree half-angle cone.
pub fn facing_cosine(position: Vec3, forward: Vec3, target: Vec3) -> f32 {
    let dir = flat_direction(position, target);
    if dir == Vec3::ZERO {
        return 1.0;
    }
    let fwd = Vec3::new(forward.x, 0.0, forward.z);
    let len = fwd.length();
    if len > 1e-6 { fwd.dot(dir) / len } else { 0.0 }
}
