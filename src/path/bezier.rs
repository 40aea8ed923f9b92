//! Bezier evaluation and fixed-count sampling
//!
//! Positions come from De Casteljau. Derivatives are evaluated analytically
//! through the hodograph control points, so turn radii carry no
//! finite-difference noise.

use glam::DVec2;

use crate::consts::{RADIUS_EPSILON, VELOCITY_EPSILON};

/// Curve geometry of one line, degree 1 to 3
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Linear([DVec2; 2]),
    Quadratic([DVec2; 3]),
    Cubic([DVec2; 4]),
}

/// Repeated linear interpolation over `points` (len <= 4)
///
/// Each step is `a + (b - a) * t` so coincident points stay exact.
fn de_casteljau(points: &[DVec2], t: f64) -> DVec2 {
    let mut work = [DVec2::ZERO; 4];
    let n = points.len();
    work[..n].copy_from_slice(points);
    for level in (1..n).rev() {
        for i in 0..level {
            work[i] = work[i] + (work[i + 1] - work[i]) * t;
        }
    }
    work[0]
}

impl Segment {
    /// Control polygon including both endpoints
    pub fn points(&self) -> &[DVec2] {
        match self {
            Segment::Linear(p) => p,
            Segment::Quadratic(p) => p,
            Segment::Cubic(p) => p,
        }
    }

    pub fn degree(&self) -> usize {
        self.points().len() - 1
    }

    pub fn start(&self) -> DVec2 {
        self.points()[0]
    }

    pub fn end(&self) -> DVec2 {
        self.points()[self.degree()]
    }

    /// Position at parameter `t` in [0, 1]
    pub fn point_at(&self, t: f64) -> DVec2 {
        de_casteljau(self.points(), t)
    }

    /// First derivative dB/dt
    pub fn derivative(&self, t: f64) -> DVec2 {
        let p = self.points();
        let n = self.degree();
        let mut hodograph = [DVec2::ZERO; 3];
        for i in 0..n {
            hodograph[i] = (p[i + 1] - p[i]) * n as f64;
        }
        de_casteljau(&hodograph[..n], t)
    }

    /// Second derivative d²B/dt²
    pub fn second_derivative(&self, t: f64) -> DVec2 {
        let p = self.points();
        let n = self.degree();
        if n < 2 {
            return DVec2::ZERO;
        }
        let scale = (n * (n - 1)) as f64;
        let mut second = [DVec2::ZERO; 2];
        for i in 0..n - 1 {
            second[i] = (p[i + 2] - 2.0 * p[i + 1] + p[i]) * scale;
        }
        de_casteljau(&second[..n - 1], t)
    }

    /// Local turn radius |v|³ / |v × a|
    ///
    /// Straight stretches return infinity. Cusps (vanishing first derivative)
    /// clamp to `RADIUS_EPSILON` rather than dividing by zero.
    pub fn turn_radius(&self, t: f64) -> f64 {
        let v = self.derivative(t);
        let speed = v.length();
        if speed < VELOCITY_EPSILON {
            return RADIUS_EPSILON;
        }
        let cross = v.perp_dot(self.second_derivative(t)).abs();
        if cross <= f64::EPSILON * speed * speed * speed {
            return f64::INFINITY;
        }
        (speed * speed * speed / cross).max(RADIUS_EPSILON)
    }

    /// Direction of travel in degrees, `None` at interior cusps
    ///
    /// Where a control point sits on an endpoint the derivative vanishes
    /// there; the limiting direction is then the first (or last) non-zero
    /// edge of the control polygon.
    pub fn tangent_deg(&self, t: f64) -> Option<f64> {
        let v = self.derivative(t);
        if v.length() >= VELOCITY_EPSILON {
            return Some(v.y.atan2(v.x).to_degrees());
        }
        let p = self.points();
        let edge = if t <= 0.0 {
            p.windows(2).map(|w| w[1] - w[0]).find(|e| e.length() > VELOCITY_EPSILON)
        } else if t >= 1.0 {
            p.windows(2).rev().map(|w| w[1] - w[0]).find(|e| e.length() > VELOCITY_EPSILON)
        } else {
            None
        };
        edge.map(|e| e.y.atan2(e.x).to_degrees())
    }

    /// Chord distance between the endpoints
    pub fn chord_length(&self) -> f64 {
        self.start().distance(self.end())
    }
}

/// One sample along a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSample {
    /// Curve parameter
    pub t: f64,
    pub position: DVec2,
    /// Chord length from the previous sample (0 for the first)
    pub delta_length: f64,
    /// Accumulated chord length from the segment start
    pub distance: f64,
    /// Local turn radius (infinite on straight stretches)
    pub radius: f64,
    /// Travel direction, `None` at cusps
    pub tangent_deg: Option<f64>,
}

/// Sample `segment` at `count + 1` evenly spaced parameters
pub fn sample_segment(segment: &Segment, count: usize) -> Vec<SegmentSample> {
    let count = count.max(1);
    let mut samples = Vec::with_capacity(count + 1);
    let mut prev = segment.start();
    let mut distance = 0.0;

    for i in 0..=count {
        let t = i as f64 / count as f64;
        let position = segment.point_at(t);
        let delta_length = if i == 0 { 0.0 } else { position.distance(prev) };
        distance += delta_length;
        samples.push(SegmentSample {
            t,
            position,
            delta_length,
            distance,
            radius: segment.turn_radius(t),
            tangent_deg: segment.tangent_deg(t),
        });
        prev = position;
    }
    samples
}
