//! Kinedrive library
//!
//! Velocity-controlled kinematic bodies driven across a walkable surface:
//! explicit integration, navigation filtering, collision detection and a
//! rapier-backed world to run them in.

pub mod config;
pub mod drive;
pub mod error;
pub mod physics;
pub mod scenario;
pub mod sim;

pub use error::{Error, Result};
