//! Closed-form acceleration-limited 1-D motion
//!
//! Shared by rotations and by the straight-segment cross-check: a move of a
//! given distance from rest to rest, either cruising at the velocity cap
//! (trapezoidal) or peaking mid-move (triangular).

use serde::{Deserialize, Serialize};

/// Rest-to-rest motion over a fixed distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrapezoidProfile {
    pub distance: f64,
    pub peak_velocity: f64,
    pub acceleration: f64,
    pub deceleration: f64,
    pub accel_time: f64,
    pub cruise_time: f64,
    pub decel_time: f64,
}

impl TrapezoidProfile {
    /// Plan a move; limits must be positive
    pub fn new(distance: f64, max_velocity: f64, acceleration: f64, deceleration: f64) -> Self {
        let distance = if distance.is_finite() { distance.abs() } else { 0.0 };
        if distance == 0.0 {
            return Self {
                distance,
                peak_velocity: 0.0,
                acceleration,
                deceleration,
                accel_time: 0.0,
                cruise_time: 0.0,
                decel_time: 0.0,
            };
        }

        let accel_distance = max_velocity * max_velocity / (2.0 * acceleration);
        let decel_distance = max_velocity * max_velocity / (2.0 * deceleration);

        if accel_distance + decel_distance >= distance {
            // Triangular: v²/2a + v²/2d = distance
            let peak = (2.0 * distance * acceleration * deceleration
                / (acceleration + deceleration))
                .sqrt();
            Self {
                distance,
                peak_velocity: peak,
                acceleration,
                deceleration,
                accel_time: peak / acceleration,
                cruise_time: 0.0,
                decel_time: peak / deceleration,
            }
        } else {
            Self {
                distance,
                peak_velocity: max_velocity,
                acceleration,
                deceleration,
                accel_time: max_velocity / acceleration,
                cruise_time: (distance - accel_distance - decel_distance) / max_velocity,
                decel_time: max_velocity / deceleration,
            }
        }
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.accel_time + self.cruise_time + self.decel_time
    }

    /// True when the velocity cap is never reached
    #[inline]
    pub fn is_triangular(&self) -> bool {
        self.cruise_time == 0.0
    }

    /// Distance covered after `t` seconds (clamped to the move)
    pub fn position_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, self.duration());
        let accel_distance = 0.5 * self.acceleration * self.accel_time * self.accel_time;
        if t <= self.accel_time {
            return 0.5 * self.acceleration * t * t;
        }
        let cruise_end = self.accel_time + self.cruise_time;
        if t <= cruise_end {
            return accel_distance + self.peak_velocity * (t - self.accel_time);
        }
        let td = t - cruise_end;
        let s = accel_distance
            + self.peak_velocity * self.cruise_time
            + self.peak_velocity * td
            - 0.5 * self.deceleration * td * td;
        s.min(self.distance)
    }

    /// Velocity after `t` seconds
    pub fn velocity_at(&self, t: f64) -> f64 {
        if t <= 0.0 || t >= self.duration() {
            return 0.0;
        }
        if t <= self.accel_time {
            return self.acceleration * t;
        }
        let cruise_end = self.accel_time + self.cruise_time;
        if t <= cruise_end {
            return self.peak_velocity;
        }
        (self.peak_velocity - self.deceleration * (t - cruise_end)).max(0.0)
    }

    /// Fraction of the distance covered after `t` seconds, in [0, 1]
    pub fn progress_at(&self, t: f64) -> f64 {
        if self.distance == 0.0 {
            return 1.0;
        }
        (self.position_at(t) / self.distance).clamp(0.0, 1.0)
    }
}
