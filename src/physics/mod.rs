//! Poses, velocity control and the rapier-backed world.

pub mod constants;
mod rigid_state;
mod velocity_control;
mod world;

pub use rigid_state::RigidState;
pub use velocity_control::{BodyVelocityControl, VelocityControl};
pub use world::{MotionType, PhysicsWorld, SimObject};
