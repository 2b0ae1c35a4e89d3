//! Bridge to the rigid-body physics collaborator (rapier3d).
//!
//! The simulation treats physics as a black box: it supplies static
//! heightfield colliders per terrain chunk and dynamic capsule bodies per
//! agent, steps the pipeline once per tick, and reads back world-space
//! transforms. Nothing else in the crate touches rapier types directly
//! except through the handles this module returns.

use glam::Vec3;
use rapier3d::na::{DMatrix, Vector3};
use rapier3d::prelude::*;

/// Terminal fall speed. Bad collision responses are clamped here at the
/// point of integration instead of propagating extreme velocities.
const TERMINAL_FALL_SPEED: f32 = 55.0;

/// Hard cap on total body speed.
const MAX_BODY_SPEED: f32 = 80.0;

/// Owns the rapier world and exposes the narrow surface the simulation
/// needs: chunk colliders, agent bodies, stepping, transform access.
pub struct PhysicsBridge {
    gravity: Vector3<f32>,
    integration: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
}

impl PhysicsBridge {
    pub fn new() -> Self {
        Self {
            gravity: Vector3::new(0.0, -9.81, 0.0),
            integration: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
        }
    }

    /// Step the collision/integration pipeline by `dt` seconds, then clamp
    /// body velocities to sane maxima.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &(),
        );
        self.clamp_velocities();
    }

    fn clamp_velocities(&mut self) {
        for (_, body) in self.bodies.iter_mut() {
            let mut v = *body.linvel();
            let mut changed = false;
            if !v.norm().is_finite() {
                v = Vector3::zeros();
                changed = true;
            }
            if v.y < -TERMINAL_FALL_SPEED {
                v.y = -TERMINAL_FALL_SPEED;
                changed = true;
            }
            let speed = v.norm();
            if speed > MAX_BODY_SPEED {
                v *= MAX_BODY_SPEED / speed;
                changed = true;
            }
            if changed {
                body.set_linvel(v, false);
            }
        }
    }

    /// Insert a static heightfield collider. `heights` is sampled row-major
    /// with rows along +Z and columns along +X; the field spans `size`
    /// units on each side, centered at (center_x, 0, center_z).
    pub fn add_heightfield(
        &mut self,
        heights: DMatrix<f32>,
        size: f32,
        center_x: f32,
        center_z: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::heightfield(heights, Vector3::new(size, 1.0, size))
            .translation(Vector3::new(center_x, 0.0, center_z))
            .friction(0.9)
            .build();
        self.colliders.insert(collider)
    }

    pub fn remove_collider(&mut self, handle: ColliderHandle) {
        self.colliders
            .remove(handle, &mut self.islands, &mut self.bodies, false);
    }

    /// Include or exclude a collider from the collision world without
    /// freeing it. Used by the chunk streamer's 3x3 physics window.
    pub fn set_collider_enabled(&mut self, handle: ColliderHandle, enabled: bool) {
        if let Some(collider) = self.colliders.get_mut(handle) {
            collider.set_enabled(enabled);
        }
    }

    pub fn collider_enabled(&self, handle: ColliderHandle) -> bool {
        self.colliders.get(handle).is_some_and(|c| c.is_enabled())
    }

    /// Spawn a locked-rotation dynamic capsule for an agent or the player.
    pub fn add_character_body(
        &mut self,
        position: Vec3,
        half_height: f32,
        radius: f32,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector3::new(position.x, position.y, position.z))
            .lock_rotations()
            .linear_damping(0.2)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .density(1.0)
            .friction(0.7)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn body_position(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies
            .get(handle)
            .map(|b| Vec3::new(b.translation().x, b.translation().y, b.translation().z))
    }

    pub fn set_body_position(&mut self, handle: RigidBodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(Vector3::new(position.x, position.y, position.z), true);
        }
    }

    pub fn body_velocity(&self, handle: RigidBodyHandle) -> Option<Vec3> {
        self.bodies
            .get(handle)
            .map(|b| Vec3::new(b.linvel().x, b.linvel().y, b.linvel().z))
    }

    /// Set the horizontal velocity components, preserving vertical motion
    /// (gravity and knockback arcs stay under the solver's control).
    pub fn set_horizontal_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            let y = body.linvel().y;
            body.set_linvel(Vector3::new(velocity.x, y, velocity.z), true);
        }
    }

    /// Overwrite the full velocity. Used for ground snapping and sanity
    /// resets.
    pub fn set_body_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(Vector3::new(velocity.x, velocity.y, velocity.z), true);
        }
    }

    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_impulse(Vector3::new(impulse.x, impulse.y, impulse.z), true);
        }
    }

    /// Number of live colliders, enabled or not.
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl Default for PhysicsBridge {
    fn default() -> Self {
        Self::new()
    }
}
