//! Motion profiling: per-segment velocity solves, rotations, and the timeline

mod rotation;
mod segment;
mod timeline;
mod trapezoid;

pub use rotation::RotationProfile;
pub use segment::{SegmentProfile, integrate_times, profile_segment, solve_velocities, speed_limit};
pub use timeline::{TimePrediction, TimelineEvent, WaitKind, compute_timeline};
pub use trapezoid::TrapezoidProfile;
