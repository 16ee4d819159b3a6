//! Displacement-shrink collision test.
//!
//! Comparing the filtered end point with the target directly reports false
//! collisions on stairs and slopes, where the filter redirects motion without
//! blocking it. Blocked motion always shortens the displacement, so only a
//! shrink counts. A deflection of equal length in another direction is not
//! reported; that miss is kept for parity with the navigation filter's users.

use nalgebra::Vector3;

use crate::physics::constants::drive::COLLISION_EPSILON;

/// Displacements of one step before and after the navigation filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionCheck {
    pub moved_before: f32,
    pub moved_after: f32,
    pub collided: bool,
}

/// True when the filtered move is shorter than the proposed one by more than
/// [`COLLISION_EPSILON`].
pub fn is_blocked(moved_before: f32, moved_after: f32) -> bool {
    moved_after + COLLISION_EPSILON < moved_before
}

pub fn detect_collision(
    previous: &Vector3<f32>,
    target: &Vector3<f32>,
    end: &Vector3<f32>,
) -> CollisionCheck {
    let moved_before = (target - previous).norm();
    let moved_after = (end - previous).norm();
    CollisionCheck {
        moved_before,
        moved_after,
        collided: is_blocked(moved_before, moved_after),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_displacement_is_not_a_collision() {
        assert!(!is_blocked(1.0, 1.0));
    }

    #[test]
    fn test_halved_displacement_is_a_collision() {
        assert!(is_blocked(1.0, 0.5));
    }

    #[test]
    fn test_shrink_within_epsilon_is_not_a_collision() {
        assert!(!is_blocked(1.0, 0.999991));
        assert!(is_blocked(1.0, 0.9999));
    }

    #[test]
    fn test_redirected_step_is_not_a_collision() {
        // Climbing a step: same length, different direction.
        let previous = Vector3::new(0.0, 0.0, 0.0);
        let target = Vector3::new(0.0, 0.0, -0.1);
        let end = Vector3::new(0.0, 0.06, -0.08);
        let check = detect_collision(&previous, &target, &end);
        assert!((check.moved_after - check.moved_before).abs() < 1e-6);
        assert!(!check.collided);
    }

    #[test]
    fn test_wall_stop_is_a_collision() {
        let previous = Vector3::new(1.0, 0.5, 1.0);
        let target = Vector3::new(1.0, 0.5, 0.9);
        let check = detect_collision(&previous, &target, &previous);
        assert_eq!(check.moved_after, 0.0);
        assert!(check.collided);
    }

    #[test]
    fn test_no_motion_is_not_a_collision() {
        let p = Vector3::new(3.0, 0.0, -2.0);
        let check = detect_collision(&p, &p, &p);
        assert!(!check.collided);
    }
}
