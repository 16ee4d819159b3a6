//! Velocity-driven kinematic integration.
//!
//! [`VelocityControl`] is a free-standing control record: callers integrate it
//! by hand with [`VelocityControl::integrate_transform`] and decide what to do
//! with the result. [`BodyVelocityControl`] is the control attached to a body
//! inside [`PhysicsWorld`](super::PhysicsWorld); the world consumes it on every
//! physics step. Keeping the two as separate types makes it explicit which
//! code path moves a given body.

use nalgebra::{UnitQuaternion, Vector3};

use super::rigid_state::RigidState;

/// Desired linear and angular velocity for a body.
///
/// Each velocity only contributes while its `controlling_*` flag is set.
/// The `*_is_local` flags say whether the vector is expressed in the body
/// frame (rotated by the current orientation before use) or in world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityControl {
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub controlling_lin_vel: bool,
    pub controlling_ang_vel: bool,
    pub lin_vel_is_local: bool,
    pub ang_vel_is_local: bool,
}

impl Default for VelocityControl {
    fn default() -> Self {
        Self {
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            controlling_lin_vel: false,
            controlling_ang_vel: false,
            lin_vel_is_local: false,
            ang_vel_is_local: false,
        }
    }
}

impl VelocityControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engages linear control with the given velocity and frame.
    pub fn with_linear_velocity(mut self, velocity: Vector3<f32>, is_local: bool) -> Self {
        self.linear_velocity = velocity;
        self.controlling_lin_vel = true;
        self.lin_vel_is_local = is_local;
        self
    }

    /// Engages angular control with the given rate vector (rad/s) and frame.
    pub fn with_angular_velocity(mut self, velocity: Vector3<f32>, is_local: bool) -> Self {
        self.angular_velocity = velocity;
        self.controlling_ang_vel = true;
        self.ang_vel_is_local = is_local;
        self
    }

    /// True when at least one of the two velocities is applied.
    pub fn is_engaged(&self) -> bool {
        self.controlling_lin_vel || self.controlling_ang_vel
    }

    /// World-frame linear velocity for a body currently at `rotation`.
    pub fn effective_linear_velocity(&self, rotation: &UnitQuaternion<f32>) -> Vector3<f32> {
        resolve_frame(
            self.linear_velocity,
            self.controlling_lin_vel,
            self.lin_vel_is_local,
            rotation,
        )
    }

    /// World-frame angular velocity for a body currently at `rotation`.
    pub fn effective_angular_velocity(&self, rotation: &UnitQuaternion<f32>) -> Vector3<f32> {
        resolve_frame(
            self.angular_velocity,
            self.controlling_ang_vel,
            self.ang_vel_is_local,
            rotation,
        )
    }

    /// Integrates one explicit Euler step of length `dt` from `previous`.
    ///
    /// Translation advances by `v * dt`. Rotation is left-composed with the
    /// rotation whose axis is `ω` and whose angle is `|ω| * dt`, then
    /// renormalized. Both velocities are resolved against the *previous*
    /// orientation, so the scheme is first order: large `dt` or fast turns
    /// accumulate truncation error.
    ///
    /// `dt` must be positive and `previous.rotation` unit length; neither is
    /// checked.
    pub fn integrate_transform(&self, dt: f32, previous: &RigidState) -> RigidState {
        let linear = self.effective_linear_velocity(&previous.rotation);
        let translation = previous.translation + linear * dt;

        let rotation = if self.controlling_ang_vel {
            let angular = self.effective_angular_velocity(&previous.rotation);
            let mut rotation = UnitQuaternion::from_scaled_axis(angular * dt) * previous.rotation;
            rotation.renormalize();
            rotation
        } else {
            previous.rotation
        };

        RigidState {
            translation,
            rotation,
        }
    }
}

fn resolve_frame(
    velocity: Vector3<f32>,
    controlling: bool,
    is_local: bool,
    rotation: &UnitQuaternion<f32>,
) -> Vector3<f32> {
    if !controlling {
        Vector3::zeros()
    } else if is_local {
        rotation * velocity
    } else {
        velocity
    }
}

/// Velocity control attached to a simulated body.
///
/// Only [`PhysicsWorld`](super::PhysicsWorld) creates these. Every
/// `step_physics` integrates the pose of a kinematic owner and drives the
/// velocities of a dynamic owner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyVelocityControl {
    control: VelocityControl,
}

impl BodyVelocityControl {
    pub(crate) fn new(control: VelocityControl) -> Self {
        Self { control }
    }

    pub fn control(&self) -> &VelocityControl {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut VelocityControl {
        &mut self.control
    }

    /// Replaces the whole control record.
    pub fn set(&mut self, control: VelocityControl) {
        self.control = control;
    }

    /// Stops both linear and angular control without touching the vectors.
    pub fn release(&mut self) {
        self.control.controlling_lin_vel = false;
        self.control.controlling_ang_vel = false;
    }
}
