use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};

/// World-space pose of a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidState {
    pub translation: Vector3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl RigidState {
    pub fn new(translation: Vector3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Builds a pose from a translation and an `[x, y, z, w]` quaternion.
    /// The quaternion is normalized on the way in.
    pub fn from_arrays(translation: [f32; 3], rotation: [f32; 4]) -> Self {
        let [x, y, z, w] = rotation;
        Self {
            translation: Vector3::from(translation),
            rotation: UnitQuaternion::from_quaternion(Quaternion::new(w, x, y, z)),
        }
    }

    pub fn translation_array(&self) -> [f32; 3] {
        [self.translation.x, self.translation.y, self.translation.z]
    }

    /// Rotation as quaternion [x, y, z, w]
    pub fn rotation_array(&self) -> [f32; 4] {
        let q = self.rotation;
        [q.i, q.j, q.k, q.w]
    }

    pub fn to_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.translation), self.rotation)
    }

    pub fn from_isometry(iso: &Isometry3<f32>) -> Self {
        Self {
            translation: iso.translation.vector,
            rotation: iso.rotation,
        }
    }
}

impl Default for RigidState {
    fn default() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_conversion_uses_xyzw_order() {
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let state = RigidState::from_arrays([1.0, 2.0, 3.0], [0.0, half, 0.0, half]);
        assert_eq!(state.translation_array(), [1.0, 2.0, 3.0]);

        let [x, y, z, w] = state.rotation_array();
        assert!(x.abs() < 1e-6 && z.abs() < 1e-6);
        assert!((y - half).abs() < 1e-6);
        assert!((w - half).abs() < 1e-6);
    }

    #[test]
    fn test_from_arrays_normalizes_rotation() {
        let state = RigidState::from_arrays([0.0; 3], [0.0, 0.0, 0.0, 2.0]);
        assert!((state.rotation.quaternion().norm() - 1.0).abs() < 1e-6);
        assert!(state.rotation.angle() < 1e-6);
    }

    #[test]
    fn test_isometry_round_trip_keeps_pose() {
        let state = RigidState::new(
            Vector3::new(0.5, -1.0, 2.0),
            UnitQuaternion::from_euler_angles(0.0, 0.3, 0.0),
        );
        assert_eq!(RigidState::from_isometry(&state.to_isometry()), state);
    }
}
