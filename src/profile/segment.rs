//! Velocity profile along one sampled segment
//!
//! Feed-rate style planning: a per-sample cornering limit, a forward pass
//! bounded by acceleration, a backward pass bounded by deceleration, and the
//! pointwise minimum of the three. Every segment starts and ends at rest.

use crate::consts::{GRAVITY, MIN_AVERAGE_VELOCITY, MIN_SPEED_LIMIT, SAMPLE_COUNT};
use crate::path::{Segment, SegmentSample, sample_segment};
use crate::settings::Settings;

/// Sampled motion along one segment; all vectors are index-aligned
#[derive(Debug, Clone)]
pub struct SegmentProfile {
    pub samples: Vec<SegmentSample>,
    /// Cornering/velocity cap at each sample
    pub speed_limits: Vec<f64>,
    /// Planned speed at each sample
    pub velocities: Vec<f64>,
    /// Time since segment start at each sample
    pub times: Vec<f64>,
}

impl SegmentProfile {
    pub fn duration(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    pub fn distance(&self) -> f64 {
        self.samples.last().map(|s| s.distance).unwrap_or(0.0)
    }

    pub fn peak_velocity(&self) -> f64 {
        self.velocities.iter().copied().fold(0.0, f64::max)
    }

    pub fn min_turn_radius(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.radius)
            .fold(f64::INFINITY, f64::min)
    }
}

/// Speed cap for a local turn radius: min(vmax, sqrt(k·g·r)), never below a
/// small positive floor
pub fn speed_limit(radius: f64, settings: &Settings) -> f64 {
    // Straight stretches are never cornering-bound, even with zero friction
    if radius.is_infinite() {
        return settings.max_velocity;
    }
    let cornering = (settings.k_friction * GRAVITY * radius).sqrt();
    let floor = MIN_SPEED_LIMIT.min(settings.max_velocity);
    let limit = if cornering.is_nan() {
        floor
    } else {
        settings.max_velocity.min(cornering)
    };
    limit.max(floor)
}

/// Forward/backward sweep over `limits` with chord steps `deltas`
///
/// `deltas[i]` is the distance from sample `i - 1` to sample `i`.
pub fn solve_velocities(deltas: &[f64], limits: &[f64], accel: f64, decel: f64) -> Vec<f64> {
    let n = limits.len();
    if n == 0 {
        return Vec::new();
    }

    let mut forward = vec![0.0; n];
    for i in 1..n {
        let reachable = (forward[i - 1] * forward[i - 1] + 2.0 * accel * deltas[i]).sqrt();
        forward[i] = reachable.min(limits[i]);
    }

    let mut backward = vec![0.0; n];
    for i in (0..n - 1).rev() {
        let reachable = (backward[i + 1] * backward[i + 1] + 2.0 * decel * deltas[i + 1]).sqrt();
        backward[i] = reachable.min(limits[i]);
    }

    (0..n)
        .map(|i| forward[i].min(backward[i]).min(limits[i]))
        .collect()
}

/// Integrate Δs / v_avg sample by sample (trapezoidal velocity average)
pub fn integrate_times(deltas: &[f64], velocities: &[f64]) -> Vec<f64> {
    let mut times = Vec::with_capacity(velocities.len());
    let mut t = 0.0;
    for (i, &ds) in deltas.iter().enumerate() {
        if i > 0 && ds > 0.0 {
            let avg = ((velocities[i - 1] + velocities[i]) / 2.0).max(MIN_AVERAGE_VELOCITY);
            t += ds / avg;
        }
        times.push(t);
    }
    times
}

/// Profile a segment under the kinematic limits in `settings`
pub fn profile_segment(segment: &Segment, settings: &Settings) -> SegmentProfile {
    let samples = sample_segment(segment, SAMPLE_COUNT);
    let deltas: Vec<f64> = samples.iter().map(|s| s.delta_length).collect();
    let speed_limits: Vec<f64> = samples
        .iter()
        .map(|s| speed_limit(s.radius, settings))
        .collect();
    let velocities = solve_velocities(
        &deltas,
        &speed_limits,
        settings.max_acceleration,
        settings.max_deceleration,
    );
    let times = integrate_times(&deltas, &velocities);

    SegmentProfile {
        samples,
        speed_limits,
        velocities,
        times,
    }
}
