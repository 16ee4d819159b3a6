//! The simulator seam the drive loop talks to.
//!
//! [`PhysicsWorld`](crate::physics::PhysicsWorld) is the rapier-backed
//! implementation. Tests substitute in-memory doubles.

use nalgebra::{UnitQuaternion, Vector3};
use thiserror::Error;

use crate::physics::RigidState;

/// Identifier of a body inside a simulator.
pub type ObjectId = u64;

/// Failures reported by a simulator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// No body with this id exists (never added, or removed).
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    /// The pose of a static body cannot be written.
    #[error("object {0} is static and cannot be moved")]
    StaticObject(ObjectId),

    /// A collision shape could not be built.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
}

/// Operations a kinematic drive needs from the world it runs in.
///
/// Every call is synchronous. The simulator owns the authoritative pose of
/// each body; callers read and write it only through these methods.
pub trait Simulator {
    /// Current pose of `object`.
    fn rigid_state(&self, object: ObjectId) -> Result<RigidState, SimError>;

    fn set_translation(&mut self, translation: Vector3<f32>, object: ObjectId) -> Result<(), SimError>;

    fn set_rotation(&mut self, rotation: UnitQuaternion<f32>, object: ObjectId) -> Result<(), SimError>;

    /// Projects a proposed move from `previous` to `target` onto the walkable
    /// surface and returns where the move actually ends. Whether blocked
    /// motion slides along obstacles or stops is governed by
    /// [`allow_sliding`](Simulator::allow_sliding).
    fn step_filter(
        &mut self,
        previous: Vector3<f32>,
        target: Vector3<f32>,
    ) -> Result<Vector3<f32>, SimError>;

    /// Advances the physics world by `dt` seconds.
    fn step_physics(&mut self, dt: f32) -> Result<(), SimError>;

    /// Total simulated time in seconds.
    fn world_time(&self) -> f64;

    /// Whether `step_filter` may redirect blocked motion along obstacles.
    fn allow_sliding(&self) -> bool;
}
