use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;

use super::constants::navigation as nav_consts;
use super::rigid_state::RigidState;
use super::velocity_control::{BodyVelocityControl, VelocityControl};
use crate::config::{ControlSpec, NavigationConfig, ObjectConfig, SceneConfig, ShapeSpec, SimulatorConfig};
use crate::sim::{ObjectId, SimError, Simulator};

// Static scene geometry is the only thing the navigation filter sees.
// Kinematic and dynamic objects still collide with everything during stepping.
const GROUP_STATIC: Group = Group::GROUP_1; // Floors, walls, stairs
const GROUP_OBJECT: Group = Group::GROUP_2; // Kinematic and dynamic bodies
const GROUP_AGENT: Group = Group::GROUP_3; // Navigation sweeps

/// How a body takes part in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionType {
    /// Never moves; part of the walkable scene.
    Static,
    /// Moved by pose writes or by its attached velocity control.
    Kinematic,
    /// Moved by the physics solver.
    Dynamic,
}

impl MotionType {
    fn body_type(self) -> RigidBodyType {
        match self {
            MotionType::Static => RigidBodyType::Fixed,
            MotionType::Kinematic => RigidBodyType::KinematicPositionBased,
            MotionType::Dynamic => RigidBodyType::Dynamic,
        }
    }

    fn interaction_groups(self) -> InteractionGroups {
        match self {
            MotionType::Static => InteractionGroups::new(GROUP_STATIC, Group::ALL),
            _ => InteractionGroups::new(GROUP_OBJECT, Group::ALL),
        }
    }
}

/// Book-keeping for one simulated body.
#[derive(Debug, Clone)]
pub struct SimObject {
    pub name: String,
    pub body_handle: RigidBodyHandle,
    pub motion_type: MotionType,
    pub velocity_control: BodyVelocityControl,
}

/// Character-controller sweep of the navigation agent against static geometry.
#[derive(Clone)]
struct NavigationFilter {
    shape: SharedShape,
    controller: KinematicCharacterController,
}

impl NavigationFilter {
    fn new(config: &NavigationConfig) -> Self {
        let half_height = (config.agent_height - 2.0 * config.agent_radius).max(0.0) / 2.0;
        let controller = KinematicCharacterController {
            offset: CharacterLength::Absolute(config.offset),
            autostep: Some(CharacterAutostep {
                max_height: CharacterLength::Absolute(config.max_step_height),
                min_width: CharacterLength::Absolute(nav_consts::MIN_STEP_WIDTH),
                include_dynamic_bodies: false,
            }),
            max_slope_climb_angle: config.max_slope_degrees.to_radians(),
            min_slope_slide_angle: nav_consts::MIN_SLOPE_SLIDE_DEGREES
                .min(config.max_slope_degrees)
                .to_radians(),
            snap_to_ground: Some(CharacterLength::Absolute(config.snap_to_ground)),
            ..Default::default()
        };
        Self {
            shape: SharedShape::capsule_y(half_height, config.agent_radius),
            controller,
        }
    }
}

/// Builds a collider with the correct shape for a given ShapeSpec.
fn build_collider(shape: &ShapeSpec, motion: MotionType, can_collide: bool) -> Result<Collider, SimError> {
    let shared_shape = match *shape {
        ShapeSpec::Block { size: [sx, sy, sz] } => SharedShape::cuboid(sx / 2.0, sy / 2.0, sz / 2.0),
        ShapeSpec::Ball { radius } => SharedShape::ball(radius),
        ShapeSpec::Cylinder { radius, height } => SharedShape::cylinder(height / 2.0, radius),
        ShapeSpec::Capsule { radius, height } => {
            SharedShape::capsule_y((height - 2.0 * radius).max(0.0) / 2.0, radius)
        }
        ShapeSpec::Wedge { size: [sx, sy, sz] } => {
            // Triangular prism: flat bottom, slope rises from +X to -X
            let hx = sx / 2.0;
            let hy = sy / 2.0;
            let hz = sz / 2.0;
            let points = [
                point![-hx, -hy, -hz],
                point![ hx, -hy, -hz],
                point![-hx, -hy,  hz],
                point![ hx, -hy,  hz],
                point![-hx,  hy, -hz],
                point![-hx,  hy,  hz],
            ];
            SharedShape::convex_hull(&points)
                .ok_or_else(|| SimError::InvalidShape(format!("degenerate wedge {:?}", [sx, sy, sz])))?
        }
    };
    Ok(ColliderBuilder::new(shared_shape)
        .sensor(!can_collide)
        .collision_groups(motion.interaction_groups())
        .build())
}

/// Rapier-backed simulator: rigid bodies, attached velocity controls, and a
/// navigation filter that sweeps an agent capsule against static geometry.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,

    config: SimulatorConfig,
    navigation: NavigationFilter,
    world_time: f64,
    next_object_id: ObjectId,
    objects: HashMap<ObjectId, SimObject>,
    /// Maps Rapier rigid body handle to object id (reverse lookup)
    body_to_object: HashMap<RigidBodyHandle, ObjectId>,
    name_to_object: HashMap<String, ObjectId>,
}

impl PhysicsWorld {
    pub fn new(config: SimulatorConfig, navigation: &NavigationConfig) -> Self {
        let [gx, gy, gz] = config.gravity;
        Self {
            gravity: vector![gx, gy, gz],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            config,
            navigation: NavigationFilter::new(navigation),
            world_time: 0.0,
            next_object_id: 1,
            objects: HashMap::new(),
            body_to_object: HashMap::new(),
            name_to_object: HashMap::new(),
        }
    }

    /// Builds a world holding every object of the scene. `simulator`
    /// overrides the scene's own simulator section (used to flip sliding).
    pub fn from_scene(scene: &SceneConfig, simulator: SimulatorConfig) -> Result<Self, SimError> {
        let mut world = Self::new(simulator, &scene.navigation);
        for object in &scene.objects {
            world.add_object(object)?;
        }
        tracing::debug!(
            objects = world.objects.len(),
            allow_sliding = world.config.allow_sliding,
            "built physics world from scene"
        );
        Ok(world)
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn set_gravity(&mut self, gravity: Vector3<f32>) {
        self.gravity = gravity;
    }

    /// Adds a body and returns its id.
    pub fn add_object(&mut self, object: &ObjectConfig) -> Result<ObjectId, SimError> {
        let state = RigidState::from_arrays(object.translation, object.rotation);
        let body = RigidBodyBuilder::new(object.motion.body_type())
            .translation(state.translation)
            .rotation(state.rotation.scaled_axis())
            .build();
        let collider = build_collider(&object.shape, object.motion, object.can_collide)?;

        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        let id = self.next_object_id;
        self.next_object_id += 1;

        let control = object
            .velocity_control
            .as_ref()
            .map(ControlSpec::to_control)
            .unwrap_or_default();
        self.objects.insert(
            id,
            SimObject {
                name: object.name.clone(),
                body_handle: handle,
                motion_type: object.motion,
                velocity_control: BodyVelocityControl::new(control),
            },
        );
        self.body_to_object.insert(handle, id);
        self.name_to_object.insert(object.name.clone(), id);

        tracing::debug!(id, name = %object.name, motion = ?object.motion, "added object");
        Ok(id)
    }

    /// Removes a body. Returns false when the id is unknown.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        let Some(object) = self.objects.remove(&id) else {
            return false;
        };
        self.body_to_object.remove(&object.body_handle);
        if self.name_to_object.get(&object.name) == Some(&id) {
            self.name_to_object.remove(&object.name);
        }
        self.rigid_body_set.remove(
            object.body_handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        tracing::debug!(id, name = %object.name, "removed object");
        true
    }

    pub fn has_object(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Looks up an object id by scene name.
    pub fn object_id(&self, name: &str) -> Option<ObjectId> {
        self.name_to_object.get(name).copied()
    }

    /// Ids of all objects, ascending.
    pub fn object_ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<_> = self.objects.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn object(&self, id: ObjectId) -> Result<&SimObject, SimError> {
        self.objects.get(&id).ok_or(SimError::UnknownObject(id))
    }

    /// Gets the object id owning a Rapier body
    pub fn object_for_body(&self, handle: RigidBodyHandle) -> Option<ObjectId> {
        self.body_to_object.get(&handle).copied()
    }

    pub fn motion_type(&self, id: ObjectId) -> Result<MotionType, SimError> {
        Ok(self.object(id)?.motion_type)
    }

    /// Switches a body between static, kinematic and dynamic.
    pub fn set_motion_type(&mut self, id: ObjectId, motion: MotionType) -> Result<(), SimError> {
        let object = self.objects.get_mut(&id).ok_or(SimError::UnknownObject(id))?;
        let body = self
            .rigid_body_set
            .get_mut(object.body_handle)
            .ok_or(SimError::UnknownObject(id))?;
        body.set_body_type(motion.body_type(), true);

        let colliders: Vec<_> = body.colliders().to_vec();
        for collider_handle in colliders {
            if let Some(collider) = self.collider_set.get_mut(collider_handle) {
                collider.set_collision_groups(motion.interaction_groups());
            }
        }
        object.motion_type = motion;
        tracing::debug!(id, motion = ?motion, "changed motion type");
        Ok(())
    }

    /// The control the world consumes for this body on every step.
    pub fn velocity_control(&self, id: ObjectId) -> Result<&BodyVelocityControl, SimError> {
        Ok(&self.object(id)?.velocity_control)
    }

    pub fn velocity_control_mut(&mut self, id: ObjectId) -> Result<&mut BodyVelocityControl, SimError> {
        self.objects
            .get_mut(&id)
            .map(|object| &mut object.velocity_control)
            .ok_or(SimError::UnknownObject(id))
    }

    pub fn linear_velocity(&self, id: ObjectId) -> Result<Vector3<f32>, SimError> {
        Ok(*self.body(id)?.linvel())
    }

    pub fn angular_velocity(&self, id: ObjectId) -> Result<Vector3<f32>, SimError> {
        Ok(*self.body(id)?.angvel())
    }

    /// Zeroes world time and the velocities of every dynamic body.
    pub fn reset(&mut self) {
        self.world_time = 0.0;
        for object in self.objects.values() {
            if object.motion_type != MotionType::Dynamic {
                continue;
            }
            if let Some(body) = self.rigid_body_set.get_mut(object.body_handle) {
                body.set_linvel(Vector3::zeros(), true);
                body.set_angvel(Vector3::zeros(), true);
            }
        }
    }

    fn body(&self, id: ObjectId) -> Result<&RigidBody, SimError> {
        let object = self.object(id)?;
        self.rigid_body_set
            .get(object.body_handle)
            .ok_or(SimError::UnknownObject(id))
    }

    /// Mutable body for a pose write; static bodies are refused.
    fn movable_body_mut(&mut self, id: ObjectId) -> Result<&mut RigidBody, SimError> {
        let object = self.objects.get(&id).ok_or(SimError::UnknownObject(id))?;
        if object.motion_type == MotionType::Static {
            return Err(SimError::StaticObject(id));
        }
        self.rigid_body_set
            .get_mut(object.body_handle)
            .ok_or(SimError::UnknownObject(id))
    }

    /// Applies every engaged attached control ahead of a physics step.
    fn apply_velocity_controls(&mut self, dt: f32) {
        for object in self.objects.values() {
            let control = object.velocity_control.control();
            if !control.is_engaged() {
                continue;
            }
            let Some(body) = self.rigid_body_set.get_mut(object.body_handle) else {
                continue;
            };
            match object.motion_type {
                MotionType::Kinematic => {
                    let current = RigidState::from_isometry(body.position());
                    let next = control.integrate_transform(dt, &current);
                    body.set_next_kinematic_position(next.to_isometry());
                }
                MotionType::Dynamic => apply_dynamic_control(body, control),
                MotionType::Static => {}
            }
        }
    }

    /// One character-controller sweep of the agent capsule against static,
    /// non-sensor geometry. Returns the achieved translation.
    fn sweep(&self, previous: Vector3<f32>, desired: Vector3<f32>, slide: bool) -> Vector3<f32> {
        let controller = KinematicCharacterController {
            slide,
            ..self.navigation.controller
        };
        let filter = QueryFilter::default()
            .exclude_sensors()
            .groups(InteractionGroups::new(GROUP_AGENT, GROUP_STATIC));
        let position = Isometry3::translation(previous.x, previous.y, previous.z);

        controller
            .move_shape(
                self.config.timestep,
                &self.rigid_body_set,
                &self.collider_set,
                &self.query_pipeline,
                &*self.navigation.shape,
                &position,
                desired,
                filter,
                |_collision| {},
            )
            .translation
    }
}

/// Whether the horizontal part of `achieved` leaves the line of `desired`.
fn is_deflected(desired: &Vector3<f32>, achieved: &Vector3<f32>) -> bool {
    let desired = Vector3::new(desired.x, 0.0, desired.z);
    let achieved = Vector3::new(achieved.x, 0.0, achieved.z);
    let sideways = match desired.try_normalize(f32::EPSILON) {
        Some(dir) => achieved - dir * achieved.dot(&dir),
        None => achieved,
    };
    sideways.norm() > nav_consts::SLIDE_DEFLECTION
}

fn apply_dynamic_control(body: &mut RigidBody, control: &VelocityControl) {
    let rotation = *body.rotation();
    if control.controlling_lin_vel {
        body.set_linvel(control.effective_linear_velocity(&rotation), true);
    }
    if control.controlling_ang_vel {
        body.set_angvel(control.effective_angular_velocity(&rotation), true);
    }
}

impl Simulator for PhysicsWorld {
    fn rigid_state(&self, object: ObjectId) -> Result<RigidState, SimError> {
        Ok(RigidState::from_isometry(self.body(object)?.position()))
    }

    /// Teleports the body; its next kinematic target moves with it.
    fn set_translation(&mut self, translation: Vector3<f32>, object: ObjectId) -> Result<(), SimError> {
        self.movable_body_mut(object)?.set_translation(translation, true);
        Ok(())
    }

    fn set_rotation(&mut self, rotation: UnitQuaternion<f32>, object: ObjectId) -> Result<(), SimError> {
        self.movable_body_mut(object)?.set_rotation(rotation, true);
        Ok(())
    }

    /// Sweeps the agent along the walkable surface. Without sliding, a move
    /// the obstacles would turn sideways stops at the first contact instead;
    /// floor contact, steps and slopes behave the same in both modes.
    fn step_filter(
        &mut self,
        previous: Vector3<f32>,
        target: Vector3<f32>,
    ) -> Result<Vector3<f32>, SimError> {
        // Update query pipeline so the sweep sees current static geometry.
        self.query_pipeline.update(&self.collider_set);

        let desired = target - previous;
        let slid = self.sweep(previous, desired, true);
        if self.config.allow_sliding || !is_deflected(&desired, &slid) {
            return Ok(previous + slid);
        }
        Ok(previous + self.sweep(previous, desired, false))
    }

    /// Steps the physics simulation forward by dt seconds; a non-positive
    /// dt uses the configured fixed timestep.
    fn step_physics(&mut self, dt: f32) -> Result<(), SimError> {
        let dt = if dt > 0.0 { dt } else { self.config.timestep };
        self.apply_velocity_controls(dt);

        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
        self.world_time += f64::from(dt);
        Ok(())
    }

    fn world_time(&self) -> f64 {
        self.world_time
    }

    fn allow_sliding(&self) -> bool {
        self.config.allow_sliding
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(SimulatorConfig::default(), &NavigationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::physics::constants::physics as consts;

    fn object(name: &str, shape: ShapeSpec, motion: MotionType, translation: [f32; 3]) -> ObjectConfig {
        ObjectConfig {
            name: name.to_string(),
            shape,
            motion,
            translation,
            rotation: [0.0, 0.0, 0.0, 1.0],
            can_collide: true,
            velocity_control: None,
        }
    }

    fn ball(name: &str, motion: MotionType) -> ObjectConfig {
        object(name, ShapeSpec::Ball { radius: 0.5 }, motion, [0.0, 1.0, 0.0])
    }

    fn weightless_world() -> PhysicsWorld {
        let config = SimulatorConfig {
            gravity: [0.0, 0.0, 0.0],
            ..Default::default()
        };
        PhysicsWorld::new(config, &NavigationConfig::default())
    }

    fn step_n(world: &mut PhysicsWorld, n: usize, dt: f32) {
        for _ in 0..n {
            world.step_physics(dt).unwrap();
        }
    }

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::default();
        assert_eq!(world.gravity.y, -consts::DEFAULT_GRAVITY);
        assert_eq!(world.world_time(), 0.0);
        assert!(world.allow_sliding());
        assert!(world.object_ids().is_empty());
    }

    #[test]
    fn test_add_static_part() {
        let mut world = PhysicsWorld::default();
        let id = world
            .add_object(&object(
                "floor",
                ShapeSpec::Block { size: [4.0, 1.0, 2.0] },
                MotionType::Static,
                [0.0, 10.0, 0.0],
            ))
            .unwrap();

        assert!(world.has_object(id));
        assert_eq!(world.object_id("floor"), Some(id));
        assert_eq!(world.motion_type(id).unwrap(), MotionType::Static);
        let handle = world.object(id).unwrap().body_handle;
        assert_eq!(world.object_for_body(handle), Some(id));
        assert_eq!(world.rigid_state(id).unwrap().translation_array(), [0.0, 10.0, 0.0]);
    }

    #[test]
    fn test_dynamic_part_falls() {
        let mut world = PhysicsWorld::default();
        let id = world
            .add_object(&object(
                "crate",
                ShapeSpec::Block { size: [1.0, 1.0, 1.0] },
                MotionType::Dynamic,
                [0.0, 10.0, 0.0],
            ))
            .unwrap();

        let initial = world.rigid_state(id).unwrap();
        step_n(&mut world, 10, 1.0 / 60.0);
        let fallen = world.rigid_state(id).unwrap();

        // Y position should be lower due to gravity
        assert!(fallen.translation.y < initial.translation.y);
    }

    #[test]
    fn test_attached_control_drives_kinematic_body() {
        let mut world = weightless_world();
        let id = world.add_object(&ball("robot", MotionType::Kinematic)).unwrap();
        world.velocity_control_mut(id).unwrap().set(
            VelocityControl::new()
                .with_linear_velocity(Vector3::new(1.0, 0.0, 0.0), false)
                .with_angular_velocity(Vector3::new(0.0, 1.0, 0.0), false),
        );

        step_n(&mut world, 60, 1.0 / 60.0);

        let state = world.rigid_state(id).unwrap();
        assert_abs_diff_eq!(state.translation.x, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(state.translation.y, 1.0, epsilon = 1e-4);
        let expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.0);
        assert!(state.rotation.angle_to(&expected) < 1e-3);
        assert_abs_diff_eq!(world.world_time(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_attached_control_drives_dynamic_body() {
        let mut world = weightless_world();
        let id = world.add_object(&ball("probe", MotionType::Dynamic)).unwrap();
        world.velocity_control_mut(id).unwrap().set(
            VelocityControl::new()
                .with_linear_velocity(Vector3::new(1.0, 0.0, 0.0), false)
                .with_angular_velocity(Vector3::new(0.0, 1.0, 0.0), false),
        );

        step_n(&mut world, 60, 1.0 / 60.0);

        let state = world.rigid_state(id).unwrap();
        assert_abs_diff_eq!(state.translation.x, 1.0, epsilon = 0.02);
        let expected = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 1.0);
        assert!(state.rotation.angle_to(&expected) < 0.02);
        assert_abs_diff_eq!(world.linear_velocity(id).unwrap().x, 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(world.angular_velocity(id).unwrap().y, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_local_dynamic_control_follows_body_heading() {
        let mut world = weightless_world();
        let mut config = ball("probe", MotionType::Dynamic);
        // Yawed +90° about Y: local -Z points along world -X.
        config.rotation = [0.0, std::f32::consts::FRAC_1_SQRT_2, 0.0, std::f32::consts::FRAC_1_SQRT_2];
        config.velocity_control = Some(crate::config::ControlSpec {
            linear_velocity: [0.0, 0.0, -1.0],
            controlling_lin_vel: true,
            lin_vel_is_local: true,
            ..Default::default()
        });
        let id = world.add_object(&config).unwrap();

        world.step_physics(1.0 / 60.0).unwrap();

        let v = world.linear_velocity(id).unwrap();
        assert_abs_diff_eq!(v.x, -1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(v.z, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_disengaged_body_stays_put() {
        let mut world = weightless_world();
        let id = world.add_object(&ball("robot", MotionType::Kinematic)).unwrap();
        world.velocity_control_mut(id).unwrap().control_mut().linear_velocity = Vector3::new(5.0, 0.0, 0.0);

        step_n(&mut world, 30, 1.0 / 60.0);

        assert_eq!(world.rigid_state(id).unwrap().translation_array(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_static_pose_write_is_rejected() {
        let mut world = PhysicsWorld::default();
        let id = world.add_object(&ball("pillar", MotionType::Static)).unwrap();

        assert_eq!(
            world.set_translation(Vector3::new(1.0, 0.0, 0.0), id),
            Err(SimError::StaticObject(id))
        );
        assert_eq!(
            world.set_rotation(UnitQuaternion::identity(), id),
            Err(SimError::StaticObject(id))
        );
    }

    #[test]
    fn test_removed_object_is_unknown() {
        let mut world = PhysicsWorld::default();
        let id = world.add_object(&ball("robot", MotionType::Kinematic)).unwrap();

        assert!(world.remove_object(id));
        assert!(!world.remove_object(id));
        assert_eq!(world.object_id("robot"), None);
        assert_eq!(world.rigid_state(id), Err(SimError::UnknownObject(id)));
        assert_eq!(
            world.set_translation(Vector3::zeros(), id),
            Err(SimError::UnknownObject(id))
        );
        assert!(world.velocity_control(id).is_err());
    }

    #[test]
    fn test_set_translation_teleports_kinematic_body() {
        let mut world = weightless_world();
        let id = world.add_object(&ball("robot", MotionType::Kinematic)).unwrap();

        world.set_translation(Vector3::new(2.0, 1.0, -3.0), id).unwrap();
        assert_eq!(world.rigid_state(id).unwrap().translation_array(), [2.0, 1.0, -3.0]);

        world.step_physics(1.0 / 60.0).unwrap();
        let after = world.rigid_state(id).unwrap().translation;
        assert_abs_diff_eq!((after - Vector3::new(2.0, 1.0, -3.0)).norm(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_motion_type_change_enables_control() {
        let mut world = weightless_world();
        let id = world.add_object(&ball("lamp", MotionType::Static)).unwrap();
        world.velocity_control_mut(id).unwrap().set(
            VelocityControl::new().with_linear_velocity(Vector3::new(0.0, 0.0, -1.0), false),
        );

        // Static bodies ignore their control.
        step_n(&mut world, 10, 0.1);
        assert_eq!(world.rigid_state(id).unwrap().translation_array(), [0.0, 1.0, 0.0]);

        world.set_motion_type(id, MotionType::Kinematic).unwrap();
        assert_eq!(world.motion_type(id).unwrap(), MotionType::Kinematic);
        step_n(&mut world, 10, 0.1);
        assert_abs_diff_eq!(world.rigid_state(id).unwrap().translation.z, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_non_positive_dt_uses_fixed_timestep() {
        let mut world = PhysicsWorld::default();
        world.step_physics(0.0).unwrap();
        world.step_physics(-1.0).unwrap();
        assert_abs_diff_eq!(world.world_time(), 2.0 * f64::from(consts::TIMESTEP), epsilon = 1e-9);
    }

    #[test]
    fn test_reset_clears_time_and_dynamic_velocity() {
        let mut world = weightless_world();
        let id = world.add_object(&ball("probe", MotionType::Dynamic)).unwrap();
        world.velocity_control_mut(id).unwrap().set(
            VelocityControl::new().with_linear_velocity(Vector3::new(0.0, 2.0, 0.0), false),
        );
        step_n(&mut world, 5, 0.1);
        world.velocity_control_mut(id).unwrap().release();

        world.reset();

        assert_eq!(world.world_time(), 0.0);
        assert_eq!(world.linear_velocity(id).unwrap(), Vector3::zeros());
    }

    #[test]
    fn test_deflection_ignores_vertical_and_shortened_motion() {
        let desired = Vector3::new(0.1, 0.0, -0.1);

        // Shortened, stepped up or snapped down: still on the desired line.
        assert!(!is_deflected(&desired, &Vector3::new(0.02, 0.0, -0.02)));
        assert!(!is_deflected(&desired, &Vector3::new(0.1, 0.3, -0.1)));
        assert!(!is_deflected(&desired, &Vector3::new(0.05, -0.01, -0.05)));
        assert!(!is_deflected(&desired, &Vector3::zeros()));

        // Turned along a wall.
        assert!(is_deflected(&desired, &Vector3::new(0.1, 0.0, 0.0)));

        // A purely vertical request must not move sideways.
        let vertical = Vector3::new(0.0, -0.2, 0.0);
        assert!(!is_deflected(&vertical, &Vector3::new(0.0, -0.1, 0.0)));
        assert!(is_deflected(&vertical, &Vector3::new(0.01, -0.1, 0.0)));
    }

    #[test]
    fn test_wedge_collider_builds() {
        let mut world = PhysicsWorld::default();
        let id = world
            .add_object(&object(
                "ramp",
                ShapeSpec::Wedge { size: [2.0, 1.0, 2.0] },
                MotionType::Static,
                [0.0, 0.5, 0.0],
            ))
            .unwrap();
        let handle = world.object(id).unwrap().body_handle;
        assert_eq!(world.rigid_body_set.get(handle).unwrap().colliders().len(), 1);
    }
}
