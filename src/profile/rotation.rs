//! Stationary rotation profile

use serde::{Deserialize, Serialize};

use super::trapezoid::TrapezoidProfile;
use crate::settings::Settings;
use crate::{normalize_degrees, shortest_angle_diff};

/// Turn in place from one heading to another along the shortest direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationProfile {
    pub start_deg: f64,
    pub target_deg: f64,
    /// Signed shortest difference, in (-180, 180]
    pub delta_deg: f64,
    /// Angular motion in radians
    pub motion: TrapezoidProfile,
}

impl RotationProfile {
    pub fn new(start_deg: f64, target_deg: f64, settings: &Settings) -> Self {
        let delta_deg = shortest_angle_diff(start_deg, target_deg);
        let alpha = settings.angular_acceleration();
        let motion = TrapezoidProfile::new(
            delta_deg.abs().to_radians(),
            settings.a_velocity,
            alpha,
            alpha,
        );
        Self {
            start_deg: normalize_degrees(start_deg),
            target_deg: normalize_degrees(target_deg),
            delta_deg,
            motion,
        }
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.motion.duration()
    }

    /// Heading `t` seconds into the rotation
    pub fn heading_at(&self, t: f64) -> f64 {
        normalize_degrees(self.start_deg + self.delta_deg * self.motion.progress_at(t))
    }
}
