//! Selection, crossover and Gaussian mutation over control points

use glam::DVec2;
use rand::Rng;
use rand_distr::StandardNormal;

use super::candidate::Candidate;
use crate::path::Line;

/// Contestants per tournament
const TOURNAMENT_SIZE: usize = 3;

/// Lowest-fitness candidate of a few drawn at random
pub(crate) fn tournament<'a, R: Rng>(population: &'a [Candidate], rng: &mut R) -> &'a Candidate {
    let mut best = &population[rng.random_range(0..population.len())];
    for _ in 1..TOURNAMENT_SIZE {
        let contender = &population[rng.random_range(0..population.len())];
        if contender.fitness < best.fitness {
            best = contender;
        }
    }
    best
}

/// Child taking each line's control points from one parent or the other
pub(crate) fn crossover<R: Rng>(a: &[Line], b: &[Line], rng: &mut R) -> Vec<Line> {
    a.iter()
        .zip(b)
        .map(|(la, lb)| {
            let mut child = la.clone();
            if rng.random_bool(0.5) {
                child.control_points.clone_from(&lb.control_points);
            }
            child
        })
        .collect()
}

/// Gaussian offset with standard deviation `strength` on each axis
pub(crate) fn gaussian_offset<R: Rng>(rng: &mut R, strength: f64) -> DVec2 {
    let nx: f64 = rng.sample(StandardNormal);
    let ny: f64 = rng.sample(StandardNormal);
    DVec2::new(nx, ny) * strength
}

/// Nudge each control point with probability `rate`, keeping it on the field
pub(crate) fn mutate<R: Rng>(
    lines: &mut [Line],
    rate: f64,
    strength: f64,
    field_size: f64,
    rng: &mut R,
) {
    for line in lines {
        for point in &mut line.control_points {
            if rng.random_bool(rate) {
                *point = (*point + gaussian_offset(rng, strength))
                    .clamp(DVec2::ZERO, DVec2::splat(field_size));
            }
        }
    }
}
