//! Robopath - kinematic motion planning for a holonomic field robot
//!
//! Core modules:
//! - `geometry`: Pure polygon/footprint predicates (no state)
//! - `path`: Path data model and Bezier evaluation
//! - `profile`: Acceleration-limited motion profiles and timeline assembly
//! - `collision`: Footprint sampling against obstacles, keep-in zones and the field boundary
//! - `optimizer`: Generational search over control-point perturbations
//! - `settings`: Kinematic and optimizer configuration
//! - `project`: Serializable input bundle from the editor
//!
//! Data flows one way: optimizer -> profile -> collision -> geometry.

pub mod collision;
pub mod error;
pub mod geometry;
pub mod optimizer;
pub mod path;
pub mod profile;
pub mod project;
pub mod settings;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use collision::{CollisionKind, CollisionMarker, get_collisions, min_clearance};
pub use error::{PlanError, PlanResult};
pub use optimizer::{
    ActiveStop, GenerationReport, OptimizationResult, Optimizer, StopHandle, optimize,
};
pub use path::{EventMarker, HeadingMode, Line, Point, SequenceItem, Shape, ShapeKind};
pub use profile::{TimePrediction, TimelineEvent, WaitKind, compute_timeline};
pub use project::Project;
pub use settings::{OptimizerSettings, Settings};

/// Engine constants
pub mod consts {
    /// Samples per geometric segment (sample points = SAMPLE_COUNT + 1)
    pub const SAMPLE_COUNT: usize = 50;

    /// Gravity proxy for the friction cornering model (not true physics)
    pub const GRAVITY: f64 = 9.81;

    /// Turn radius reported for cusps (near-zero first derivative)
    pub const RADIUS_EPSILON: f64 = 1e-6;
    /// Derivative magnitude below which a sample counts as a cusp
    pub const VELOCITY_EPSILON: f64 = 1e-9;

    /// Lower bound for the cornering speed limit
    pub const MIN_SPEED_LIMIT: f64 = 0.01;
    /// Floor for the averaged velocity when integrating segment time
    pub const MIN_AVERAGE_VELOCITY: f64 = 1e-6;

    /// Heading difference (degrees) that triggers an automatic rotation
    pub const HEADING_TOLERANCE_DEG: f64 = 0.1;

    /// Footprint samples taken across a stationary rotation
    pub const ROTATION_SAMPLES: usize = 8;

    /// Default square field extent
    pub const DEFAULT_FIELD_SIZE: f64 = 144.0;
}

/// Normalize an angle in degrees to (-180, 180]
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Shortest signed rotation (degrees) taking `from` to `to`, in (-180, 180]
#[inline]
pub fn shortest_angle_diff(from: f64, to: f64) -> f64 {
    normalize_degrees(to - from)
}
