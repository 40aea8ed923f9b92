//! Initial population
//!
//! The unmodified lines always come first. Heuristic seeds follow when the
//! original collides: colliding curves straightened, and single-bend detours
//! to either side of each colliding chord. Random perturbations fill the rest.

use glam::DVec2;
use rand::Rng;

use super::candidate::{Candidate, Problem, evaluate};
use super::mutation::gaussian_offset;
use crate::path::{Line, SequenceItem};

/// Detour offsets tried, in multiples of the inflated robot width
const DETOUR_STEPS: [f64; 4] = [1.0, 2.0, 3.0, 4.0];

/// Where each line starts the first time the sequence runs it
///
/// Lines the sequence never runs have no start and are left untouched.
pub(crate) fn line_starts(problem: &Problem) -> Vec<Option<DVec2>> {
    let mut starts = vec![None; problem.lines.len()];
    let mut position = problem.start.position();
    for item in &problem.sequence {
        if let SequenceItem::Path { line_id } = item {
            if let Some(index) = problem.lines.iter().position(|l| &l.id == line_id) {
                if starts[index].is_none() {
                    starts[index] = Some(position);
                }
                position = problem.lines[index].end_point.position();
            }
        }
    }
    starts
}

/// Copy of `lines` with the listed lines made straight
fn straightened(lines: &[Line], which: impl Fn(usize) -> bool) -> Option<Vec<Line>> {
    let mut changed = false;
    let out: Vec<Line> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut line = line.clone();
            if which(i) && !line.control_points.is_empty() {
                line.control_points.clear();
                changed = true;
            }
            line
        })
        .collect();
    changed.then_some(out)
}

/// Single-control-point bends pushing the midpoint of line `index` sideways
fn detours(problem: &Problem, starts: &[Option<DVec2>], index: usize) -> Vec<Vec<Line>> {
    let Some(start) = starts[index] else {
        return Vec::new();
    };
    let end = problem.lines[index].end_point.position();
    let chord = end - start;
    if chord.length() < 1e-9 {
        return Vec::new();
    }
    let normal = chord.perp().normalize();
    let mid = (start + end) / 2.0;
    let (_, width) = problem.settings.inflated_footprint();
    let field = DVec2::splat(problem.settings.field_size);

    let mut out = Vec::new();
    for step in DETOUR_STEPS {
        for side in [1.0, -1.0] {
            let control = (mid + normal * side * step * width).clamp(DVec2::ZERO, field);
            let mut lines = problem.lines.clone();
            lines[index].control_points = vec![control];
            out.push(lines);
        }
    }
    out
}

/// Original lines with every used line bent or nudged at random
fn perturbed<R: Rng>(problem: &Problem, starts: &[Option<DVec2>], rng: &mut R) -> Vec<Line> {
    let strength = problem.config.optimization_mutation_strength;
    let field = DVec2::splat(problem.settings.field_size);
    let mut lines = problem.lines.clone();
    for (line, start) in lines.iter_mut().zip(starts) {
        let Some(start) = start else { continue };
        if line.control_points.is_empty() {
            let mid = (*start + line.end_point.position()) / 2.0;
            line.control_points
                .push((mid + gaussian_offset(rng, strength)).clamp(DVec2::ZERO, field));
        } else {
            for point in &mut line.control_points {
                *point = (*point + gaussian_offset(rng, strength)).clamp(DVec2::ZERO, field);
            }
        }
    }
    lines
}

/// Build and score the first generation; `original` is the scored input lines
pub(crate) fn seed_population<R: Rng>(
    problem: &Problem,
    original: &Candidate,
    rng: &mut R,
) -> Vec<Candidate> {
    let size = problem.config.population_size;
    let starts = line_starts(problem);
    let mut population = vec![original.clone()];

    let mut heuristics: Vec<Vec<Line>> = Vec::new();
    if !original.colliding_lines.is_empty() {
        if let Some(lines) = straightened(&problem.lines, |i| original.colliding_lines.contains(&i)) {
            heuristics.push(lines);
        }
        for &index in &original.colliding_lines {
            heuristics.extend(detours(problem, &starts, index));
        }
    }
    if let Some(lines) = straightened(&problem.lines, |_| true) {
        heuristics.push(lines);
    }

    let heuristic_count = heuristics.len().min(size.saturating_sub(1));
    for lines in heuristics.into_iter().take(heuristic_count) {
        population.push(evaluate(problem, lines));
    }
    while population.len() < size {
        let lines = perturbed(problem, &starts, rng);
        population.push(evaluate(problem, lines));
    }

    log::debug!(
        "Seeded {} candidates ({} heuristic), original fitness {:.3}",
        population.len(),
        heuristic_count,
        original.fitness
    );
    population
}
