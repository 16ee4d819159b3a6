//! Physics, navigation and drive-loop constants.
//! Scene files fall back to these when a field is omitted.

/// Physics constants
pub mod physics {
    /// Default gravity in m/s² (applied along -Y)
    pub const DEFAULT_GRAVITY: f32 = 9.81;

    /// Fixed timestep for physics simulation (60 Hz)
    pub const TIMESTEP: f32 = 1.0 / 60.0;

    /// Small epsilon for float comparisons
    pub const EPSILON: f32 = 0.001;
}

/// Navigation filter defaults (agent capsule swept against static geometry)
pub mod navigation {
    /// Agent capsule radius
    pub const AGENT_RADIUS: f32 = 0.1;

    /// Agent capsule total height
    pub const AGENT_HEIGHT: f32 = 0.5;

    /// Tallest ledge the agent steps onto without being blocked
    pub const MAX_STEP_HEIGHT: f32 = 0.2;

    /// Smallest ledge width accepted by autostep
    pub const MIN_STEP_WIDTH: f32 = 0.01;

    /// Steepest walkable slope in degrees
    pub const MAX_SLOPE_DEGREES: f32 = 45.0;

    /// Slope (degrees) past which the agent slides down
    pub const MIN_SLOPE_SLIDE_DEGREES: f32 = 30.0;

    /// Gap kept between the agent and obstacles
    pub const OFFSET: f32 = 0.05;

    /// Sideways change (metres) of a sweep's horizontal motion that counts
    /// as sliding along an obstacle
    pub const SLIDE_DEFLECTION: f32 = 1e-4;

    /// Snap-to-ground distance
    pub const SNAP_TO_GROUND: f32 = 0.2;
}

/// Drive loop constants
pub mod drive {
    /// Displacement shrink (metres) that counts as a collision
    pub const COLLISION_EPSILON: f32 = 1e-5;

    /// Default run duration in seconds
    pub const DEFAULT_DURATION: f32 = 6.0;

    /// Default wander period in seconds
    pub const DEFAULT_WANDER_PERIOD: f32 = 1.0;

    /// Default wander yaw-rate bound in rad/s
    pub const DEFAULT_WANDER_MAX_RATE: f32 = 1.0;

    /// Fraction of a step by which elapsed time may fall short of the
    /// duration and still count as done (absorbs f32 rounding of `n * dt`)
    pub const STEP_TIME_SLACK: f64 = 1e-3;

    /// Longest accepted run, in steps
    pub const MAX_STEPS: f64 = 1.0e6;
}
