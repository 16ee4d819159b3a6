use serde::Serialize;

use crate::physics::RigidState;

/// Pose of the driven body after one step, as recorded in a trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DriveFrame {
    /// Elapsed drive time at the end of the step
    pub time: f64,
    pub translation: [f32; 3],
    /// Quaternion [x, y, z, w]
    pub rotation: [f32; 4],
    pub collided: bool,
}

impl DriveFrame {
    pub fn new(time: f64, state: &RigidState, collided: bool) -> Self {
        Self {
            time,
            translation: state.translation_array(),
            rotation: state.rotation_array(),
            collided,
        }
    }
}

/// Outcome of a complete drive run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriveReport {
    pub allow_sliding: bool,
    pub steps: u64,
    pub collisions: u64,
    pub elapsed: f64,
    /// Path length actually travelled after filtering
    pub distance: f32,
    pub start_translation: [f32; 3],
    pub final_translation: [f32; 3],
    pub final_rotation: [f32; 4],
    pub frames: Vec<DriveFrame>,
}

impl DriveReport {
    /// Share of steps that ended in a collision.
    pub fn collision_fraction(&self) -> f32 {
        if self.steps == 0 {
            0.0
        } else {
            self.collisions as f32 / self.steps as f32
        }
    }

    /// Straight-line distance between start and end.
    pub fn displacement(&self) -> f32 {
        let [ax, ay, az] = self.start_translation;
        let [bx, by, bz] = self.final_translation;
        ((bx - ax).powi(2) + (by - ay).powi(2) + (bz - az).powi(2)).sqrt()
    }
}
