//! Fitness evaluation

use crate::collision::get_collisions;
use crate::error::PlanResult;
use crate::path::{Line, Point, SequenceItem, Shape};
use crate::profile::{TimelineEvent, compute_timeline};
use crate::settings::{OptimizerSettings, Settings};

/// Fixed inputs of one optimization run
#[derive(Debug, Clone)]
pub(crate) struct Problem {
    pub start: Point,
    pub lines: Vec<Line>,
    pub sequence: Vec<SequenceItem>,
    pub shapes: Vec<Shape>,
    pub settings: Settings,
    pub config: OptimizerSettings,
}

/// One member of the population
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub lines: Vec<Line>,
    /// Total time plus collision penalties; infinite when unusable
    pub fitness: f64,
    pub total_time: f64,
    /// Penalised markers only
    pub collision_count: usize,
    /// Indices into `lines` of travels with a penalised marker
    pub colliding_lines: Vec<usize>,
}

impl Candidate {
    fn unusable(lines: Vec<Line>) -> Self {
        Self {
            lines,
            fitness: f64::INFINITY,
            total_time: f64::INFINITY,
            collision_count: 0,
            colliding_lines: Vec::new(),
        }
    }
}

struct Score {
    total_time: f64,
    collision_count: usize,
    colliding_lines: Vec<usize>,
}

fn score(problem: &Problem, lines: &[Line]) -> PlanResult<Score> {
    let prediction = compute_timeline(&problem.start, lines, &problem.settings, &problem.sequence)?;
    let markers = get_collisions(&prediction, lines, &problem.shapes, &problem.settings)?;

    let mut collision_count = 0;
    let mut colliding_lines = Vec::new();
    for marker in markers.iter().filter(|m| m.kind.is_geometric()) {
        collision_count += 1;
        if let Some(TimelineEvent::Travel { line_index, .. }) =
            prediction.timeline.get(marker.segment_index)
        {
            if !colliding_lines.contains(line_index) {
                colliding_lines.push(*line_index);
            }
        }
    }

    Ok(Score {
        total_time: prediction.total_time,
        collision_count,
        colliding_lines,
    })
}

/// Score `lines`; evaluation failures and non-finite times never win
pub(crate) fn evaluate(problem: &Problem, lines: Vec<Line>) -> Candidate {
    match score(problem, &lines) {
        Ok(score) if score.total_time.is_finite() => {
            let fitness =
                score.total_time + problem.config.collision_penalty * score.collision_count as f64;
            Candidate {
                lines,
                fitness,
                total_time: score.total_time,
                collision_count: score.collision_count,
                colliding_lines: score.colliding_lines,
            }
        }
        Ok(score) => {
            log::warn!("Discarding candidate with non-finite time {}", score.total_time);
            Candidate::unusable(lines)
        }
        Err(e) => {
            log::warn!("Discarding candidate: {}", e);
            Candidate::unusable(lines)
        }
    }
}
