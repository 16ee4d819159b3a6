//! Navmesh-constrained kinematic drive loop.
//!
//! Each fixed step reads the body pose, integrates a [`VelocityControl`],
//! pushes the proposed translation through the simulator's navigation filter,
//! flags a collision when the filter shortened the move, writes the pose back
//! and steps physics. Rotation is never filtered.

mod collision;
mod report;

use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::WanderConfig;
use crate::physics::constants::drive as drive_consts;
use crate::physics::{RigidState, VelocityControl};
use crate::sim::{ObjectId, SimError, Simulator};

pub use collision::{detect_collision, is_blocked, CollisionCheck};
pub use report::{DriveFrame, DriveReport};

/// Fixed parameters of a drive run.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveSettings {
    pub object: ObjectId,
    pub duration: f32,
    pub time_step: f32,
    /// Pose written to the body by [`DriveLoop::reset`]
    pub start: RigidState,
    pub wander: Option<WanderConfig>,
    pub seed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrivePhase {
    Running,
    Done,
}

/// What happened during one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveStep {
    /// Elapsed drive time after this step
    pub time: f64,
    pub previous: RigidState,
    pub target: RigidState,
    /// Translation returned by the navigation filter and applied to the body
    pub end_translation: Vector3<f32>,
    pub collision: CollisionCheck,
}

/// Drives one body with a manually held [`VelocityControl`].
///
/// The control here is never attached to the body, so the simulator does not
/// consume it during `step_physics`; only this loop integrates it.
pub struct DriveLoop {
    settings: DriveSettings,
    initial_control: VelocityControl,
    control: VelocityControl,
    steps: u64,
    /// Steps between wander redraws
    wander_every: Option<u64>,
    rng: StdRng,
}

impl DriveLoop {
    pub fn new(settings: DriveSettings, control: VelocityControl) -> Self {
        let rng = StdRng::seed_from_u64(settings.seed);
        let wander_every = settings
            .wander
            .as_ref()
            .map(|wander| steps_covering(wander.period, settings.time_step));
        Self {
            settings,
            initial_control: control,
            control,
            steps: 0,
            wander_every,
            rng,
        }
    }

    pub fn settings(&self) -> &DriveSettings {
        &self.settings
    }

    pub fn control(&self) -> &VelocityControl {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut VelocityControl {
        &mut self.control
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Elapsed drive time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.steps as f64 * f64::from(self.settings.time_step)
    }

    pub fn phase(&self) -> DrivePhase {
        let slack = f64::from(self.settings.time_step) * drive_consts::STEP_TIME_SLACK;
        if self.elapsed() + slack < f64::from(self.settings.duration) {
            DrivePhase::Running
        } else {
            DrivePhase::Done
        }
    }

    /// Rewinds elapsed time, restores the initial control and random stream,
    /// and moves the body back to the start pose.
    pub fn reset<S: Simulator + ?Sized>(&mut self, sim: &mut S) -> Result<(), SimError> {
        self.steps = 0;
        self.control = self.initial_control;
        self.rng = StdRng::seed_from_u64(self.settings.seed);

        let start = self.settings.start;
        sim.set_translation(start.translation, self.settings.object)?;
        sim.set_rotation(start.rotation, self.settings.object)?;
        Ok(())
    }

    /// Runs one read-integrate-filter-write-advance step.
    pub fn step<S: Simulator + ?Sized>(&mut self, sim: &mut S) -> Result<DriveStep, SimError> {
        let object = self.settings.object;
        let dt = self.settings.time_step;

        // Read the authoritative pose.
        let previous = sim.rigid_state(object)?;

        // Integrate the proposed pose.
        let target = self.control.integrate_transform(dt, &previous);

        // Project the translation onto the walkable surface.
        let end_translation = sim.step_filter(previous.translation, target.translation)?;
        let collision = detect_collision(&previous.translation, &target.translation, &end_translation);
        if collision.collided {
            tracing::debug!(
                step = self.steps,
                moved_before = collision.moved_before,
                moved_after = collision.moved_after,
                "drive step blocked"
            );
        }

        // Write back; rotation bypasses the filter.
        sim.set_translation(end_translation, object)?;
        sim.set_rotation(target.rotation, object)?;

        // Let the rest of the world react.
        sim.step_physics(dt)?;

        self.steps += 1;
        self.advance_wander();

        Ok(DriveStep {
            time: self.elapsed(),
            previous,
            target,
            end_translation,
            collision,
        })
    }

    /// Resets, then steps until the duration is used up.
    pub fn run<S: Simulator + ?Sized>(&mut self, sim: &mut S) -> Result<DriveReport, SimError> {
        self.reset(sim)?;
        let start = sim.rigid_state(self.settings.object)?;
        tracing::info!(
            object = self.settings.object,
            duration = self.settings.duration,
            time_step = self.settings.time_step,
            allow_sliding = sim.allow_sliding(),
            "starting drive"
        );

        let mut frames = Vec::new();
        let mut collisions = 0;
        let mut distance = 0.0;
        while self.phase() == DrivePhase::Running {
            let step = self.step(sim)?;
            if step.collision.collided {
                collisions += 1;
            }
            distance += step.collision.moved_after;

            let observed = sim.rigid_state(self.settings.object)?;
            frames.push(DriveFrame::new(step.time, &observed, step.collision.collided));
        }

        let end = sim.rigid_state(self.settings.object)?;
        tracing::info!(steps = self.steps, collisions, distance, "drive finished");

        Ok(DriveReport {
            allow_sliding: sim.allow_sliding(),
            steps: self.steps,
            collisions,
            elapsed: self.elapsed(),
            distance,
            start_translation: start.translation_array(),
            final_translation: end.translation_array(),
            final_rotation: end.rotation_array(),
            frames,
        })
    }

    /// Redraws the yaw rate once per wander period.
    fn advance_wander(&mut self) {
        let (Some(wander), Some(every)) = (&self.settings.wander, self.wander_every) else {
            return;
        };
        if self.steps % every == 0 {
            let rate = self.rng.gen_range(-wander.max_rate..=wander.max_rate);
            self.control.angular_velocity = Vector3::new(0.0, rate, 0.0);
            self.control.controlling_ang_vel = true;
            tracing::debug!(step = self.steps, rate, "wander yaw rate");
        }
    }
}

/// Fewest whole steps of `time_step` that cover `period`, at least one.
fn steps_covering(period: f32, time_step: f32) -> u64 {
    let ratio = f64::from(period) / f64::from(time_step);
    (ratio - drive_consts::STEP_TIME_SLACK).ceil().max(1.0) as u64
}
