//! Scene configuration parsing from TOML files.
//!
//! Everything here is plain data: defaults are merged once by serde at load
//! time and the resulting structs are passed by reference from then on.

use nalgebra::Vector3;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::physics::constants::{drive as drive_consts, navigation as nav_consts, physics as consts};
use crate::physics::{MotionType, RigidState, VelocityControl};

/// `[simulator]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Whether blocked motion may slide along obstacles in `step_filter`
    pub allow_sliding: bool,
    /// Fixed physics timestep in seconds
    pub timestep: f32,
    pub gravity: [f32; 3],
    /// Seed for anything random in a run (wander)
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            allow_sliding: true,
            timestep: consts::TIMESTEP,
            gravity: [0.0, -consts::DEFAULT_GRAVITY, 0.0],
            seed: 0,
        }
    }
}

impl SimulatorConfig {
    /// Copy of this config with a different sliding mode.
    pub fn with_allow_sliding(&self, allow_sliding: bool) -> Self {
        Self {
            allow_sliding,
            ..self.clone()
        }
    }
}

/// `[navigation]` section: the agent capsule swept by `step_filter`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub agent_radius: f32,
    /// Total capsule height (cylinder part plus both caps)
    pub agent_height: f32,
    pub max_step_height: f32,
    pub max_slope_degrees: f32,
    pub offset: f32,
    pub snap_to_ground: f32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            agent_radius: nav_consts::AGENT_RADIUS,
            agent_height: nav_consts::AGENT_HEIGHT,
            max_step_height: nav_consts::MAX_STEP_HEIGHT,
            max_slope_degrees: nav_consts::MAX_SLOPE_DEGREES,
            offset: nav_consts::OFFSET,
            snap_to_ground: nav_consts::SNAP_TO_GROUND,
        }
    }
}

/// Collision shape of an object, one fixed field set per kind.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeSpec {
    /// Box with full edge lengths
    Block { size: [f32; 3] },
    Ball { radius: f32 },
    /// Y-aligned cylinder
    Cylinder { radius: f32, height: f32 },
    /// Y-aligned capsule, `height` includes both caps
    Capsule { radius: f32, height: f32 },
    /// Ramp: flat bottom, slope rising from +X to -X
    Wedge { size: [f32; 3] },
}

impl ShapeSpec {
    fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        let dims: Vec<f32> = match *self {
            ShapeSpec::Block { size } | ShapeSpec::Wedge { size } => size.to_vec(),
            ShapeSpec::Ball { radius } => vec![radius],
            ShapeSpec::Cylinder { radius, height } | ShapeSpec::Capsule { radius, height } => {
                vec![radius, height]
            }
        };
        if dims.iter().all(|d| d.is_finite() && *d > 0.0) {
            Ok(())
        } else {
            Err(ConfigError::Invalid(format!(
                "object '{}' has non-positive shape dimensions {:?}",
                owner, self
            )))
        }
    }
}

/// Velocity control as written in a scene file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControlSpec {
    pub linear_velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    pub controlling_lin_vel: bool,
    pub controlling_ang_vel: bool,
    pub lin_vel_is_local: bool,
    pub ang_vel_is_local: bool,
}

impl ControlSpec {
    pub fn to_control(&self) -> VelocityControl {
        VelocityControl {
            linear_velocity: Vector3::from(self.linear_velocity),
            angular_velocity: Vector3::from(self.angular_velocity),
            controlling_lin_vel: self.controlling_lin_vel,
            controlling_ang_vel: self.controlling_ang_vel,
            lin_vel_is_local: self.lin_vel_is_local,
            ang_vel_is_local: self.ang_vel_is_local,
        }
    }
}

/// `[[objects]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObjectConfig {
    pub name: String,
    pub shape: ShapeSpec,
    #[serde(default = "default_motion")]
    pub motion: MotionType,
    #[serde(default)]
    pub translation: [f32; 3],
    /// Quaternion [x, y, z, w]
    #[serde(default = "default_rotation")]
    pub rotation: [f32; 4],
    /// Non-colliding objects become sensors and are ignored by navigation
    #[serde(default = "default_can_collide")]
    pub can_collide: bool,
    /// Control attached to the body and consumed by every physics step
    #[serde(default)]
    pub velocity_control: Option<ControlSpec>,
}

impl ObjectConfig {
    pub fn pose(&self) -> RigidState {
        RigidState::from_arrays(self.translation, self.rotation)
    }
}

fn default_motion() -> MotionType {
    MotionType::Static
}

fn default_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_can_collide() -> bool {
    true
}

/// `[drive.wander]`: periodic random yaw rate
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Seconds between re-draws
    pub period: f32,
    /// Yaw rate is drawn uniformly from [-max_rate, max_rate] rad/s
    pub max_rate: f32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            period: drive_consts::DEFAULT_WANDER_PERIOD,
            max_rate: drive_consts::DEFAULT_WANDER_MAX_RATE,
        }
    }
}

/// `[drive]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DriveConfig {
    /// Name of the object being driven
    pub object: String,
    #[serde(default = "default_duration")]
    pub duration: f32,
    #[serde(default = "default_time_step")]
    pub time_step: f32,
    /// Start pose; falls back to the object's own pose
    #[serde(default)]
    pub start_translation: Option<[f32; 3]>,
    #[serde(default)]
    pub start_rotation: Option<[f32; 4]>,
    #[serde(default)]
    pub control: ControlSpec,
    #[serde(default)]
    pub wander: Option<WanderConfig>,
}

fn default_duration() -> f32 {
    drive_consts::DEFAULT_DURATION
}

fn default_time_step() -> f32 {
    consts::TIMESTEP
}

/// A whole scene file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub objects: Vec<ObjectConfig>,
    #[serde(default)]
    pub drive: Option<DriveConfig>,
}

impl SceneConfig {
    /// Load and validate a scene from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a scene from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let scene: SceneConfig = toml::from_str(content)?;
        scene.validate()?;
        Ok(scene)
    }

    pub fn object(&self, name: &str) -> Option<&ObjectConfig> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Start pose of the driven object: explicit drive overrides first,
    /// then the object's own pose.
    pub fn drive_start_pose(&self) -> Option<RigidState> {
        let drive = self.drive.as_ref()?;
        let object = self.object(&drive.object)?;
        Some(RigidState::from_arrays(
            drive.start_translation.unwrap_or(object.translation),
            drive.start_rotation.unwrap_or(object.rotation),
        ))
    }

    /// Checks what serde cannot: positive times and sizes, unique names,
    /// usable quaternions, and a drivable target object.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sim = &self.simulator;
        if !(sim.timestep > 0.0 && sim.timestep.is_finite()) {
            return Err(invalid(format!("simulator.timestep must be positive, got {}", sim.timestep)));
        }

        let nav = &self.navigation;
        if !(nav.agent_radius > 0.0) || !(nav.agent_height > 0.0) {
            return Err(invalid("navigation agent radius and height must be positive"));
        }
        if !(nav.offset > 0.0) {
            return Err(invalid("navigation.offset must be positive"));
        }

        let mut names = HashSet::new();
        for object in &self.objects {
            if !names.insert(object.name.as_str()) {
                return Err(invalid(format!("duplicate object name '{}'", object.name)));
            }
            object.shape.validate(&object.name)?;
            check_quaternion(&object.rotation, &object.name)?;
        }

        if let Some(drive) = &self.drive {
            let Some(object) = self.object(&drive.object) else {
                return Err(invalid(format!("drive.object '{}' is not a scene object", drive.object)));
            };
            if object.motion == MotionType::Static {
                return Err(invalid(format!("drive.object '{}' is static", drive.object)));
            }
            if !(drive.time_step > 0.0 && drive.time_step.is_finite()) {
                return Err(invalid(format!("drive.time_step must be positive, got {}", drive.time_step)));
            }
            if !(drive.duration > 0.0 && drive.duration.is_finite()) {
                return Err(invalid(format!("drive.duration must be positive, got {}", drive.duration)));
            }
            let steps = f64::from(drive.duration) / f64::from(drive.time_step);
            if steps > drive_consts::MAX_STEPS {
                return Err(invalid(format!(
                    "drive of {}s at {}s per step exceeds {} steps",
                    drive.duration,
                    drive.time_step,
                    drive_consts::MAX_STEPS
                )));
            }
            if let Some(rotation) = &drive.start_rotation {
                check_quaternion(rotation, "drive.start_rotation")?;
            }
            if let Some(wander) = &drive.wander {
                // The draw range spans 2 * max_rate, which must stay finite.
                let span = 2.0 * wander.max_rate;
                let period_ok = wander.period > 0.0 && wander.period.is_finite();
                if !period_ok || !(wander.max_rate >= 0.0 && span.is_finite()) {
                    return Err(invalid("drive.wander needs a positive period and a finite, non-negative max_rate"));
                }
            }
        }
        Ok(())
    }
}

fn check_quaternion(q: &[f32; 4], owner: &str) -> Result<(), ConfigError> {
    let norm_sq: f32 = q.iter().map(|c| c * c).sum();
    if norm_sq.is_finite() && norm_sq > consts::EPSILON {
        Ok(())
    } else {
        Err(invalid(format!("'{}' has a zero or non-finite rotation {:?}", owner, q)))
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(message.into())
}

/// Errors that can occur when loading a scene
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse scene: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid scene: {0}")]
    Invalid(String),
}
