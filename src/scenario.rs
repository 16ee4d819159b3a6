//! Runs the drive section of a scene against a fresh [`PhysicsWorld`].

use crate::config::SceneConfig;
use crate::drive::{DriveLoop, DriveReport, DriveSettings};
use crate::error::{Error, Result};
use crate::physics::PhysicsWorld;

/// Builds the drive loop for a scene's `[drive]` section inside `world`.
pub fn drive_for_scene(scene: &SceneConfig, world: &PhysicsWorld) -> Result<DriveLoop> {
    let drive = scene.drive.as_ref().ok_or(Error::MissingDrive)?;
    let object = world
        .object_id(&drive.object)
        .ok_or_else(|| Error::UnknownDriveObject(drive.object.clone()))?;
    let start = scene
        .drive_start_pose()
        .ok_or_else(|| Error::UnknownDriveObject(drive.object.clone()))?;

    let settings = DriveSettings {
        object,
        duration: drive.duration,
        time_step: drive.time_step,
        start,
        wander: drive.wander.clone(),
        seed: world.config().seed,
    };
    Ok(DriveLoop::new(settings, drive.control.to_control()))
}

/// Runs the scene once with the given sliding mode on a new world.
pub fn run_scene(scene: &SceneConfig, allow_sliding: bool) -> Result<DriveReport> {
    let simulator = scene.simulator.with_allow_sliding(allow_sliding);
    let mut world = PhysicsWorld::from_scene(scene, simulator)?;
    let mut drive = drive_for_scene(scene, &world)?;
    Ok(drive.run(&mut world)?)
}

/// Runs the sliding and the non-sliding variant side by side. Each variant
/// owns its own world. Returns `[sliding, non_sliding]`.
pub fn compare_sliding(scene: &SceneConfig) -> Result<[DriveReport; 2]> {
    let (sliding, non_sliding) = rayon::join(|| run_scene(scene, true), || run_scene(scene, false));
    Ok([sliding?, non_sliding?])
}
