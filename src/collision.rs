//! Collision evaluation over a timeline
//!
//! Every stored sample of a travel event, and a handful of samples across each
//! stationary rotation, is turned into an inflated robot footprint and tested
//! against obstacles, keep-in zones and the field boundary. Consecutive
//! violations of one kind inside one timeline event merge into a single
//! marker; runs never merge across events.

use glam::DVec2;
use serde::Serialize;

use crate::consts::ROTATION_SAMPLES;
use crate::error::{PlanError, PlanResult};
use crate::geometry::{any_vertex_inside, min_distance_to_polygon, point_in_polygon, robot_corners};
use crate::path::{Line, Shape, ShapeKind};
use crate::profile::{TimePrediction, TimelineEvent};
use crate::settings::Settings;

/// Distance below which a travel counts as zero-length
const ZERO_LENGTH_EPSILON: f64 = 1e-9;

/// Violation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionKind {
    Obstacle,
    Boundary,
    KeepIn,
    ZeroLength,
}

impl CollisionKind {
    const GEOMETRIC: [CollisionKind; 3] = [
        CollisionKind::Obstacle,
        CollisionKind::Boundary,
        CollisionKind::KeepIn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionKind::Obstacle => "obstacle",
            CollisionKind::Boundary => "boundary",
            CollisionKind::KeepIn => "keep-in",
            CollisionKind::ZeroLength => "zero-length",
        }
    }

    /// Whether moving control points can resolve this violation
    pub fn is_geometric(&self) -> bool {
        !matches!(self, CollisionKind::ZeroLength)
    }
}

/// One violation, or a merged run of consecutive violations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionMarker {
    pub x: f64,
    pub y: f64,
    pub time: f64,
    /// Index of the timeline event the violation belongs to
    pub segment_index: usize,
    #[serde(rename = "type")]
    pub kind: CollisionKind,
    /// Set when the marker spans more than one sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

impl CollisionMarker {
    fn new(kind: CollisionKind, segment_index: usize, pose: &PoseSample) -> Self {
        Self {
            x: pose.position.x,
            y: pose.position.y,
            time: pose.time,
            segment_index,
            kind,
            end_x: None,
            end_y: None,
            end_time: None,
        }
    }

    fn extend(&mut self, pose: &PoseSample) {
        self.end_x = Some(pose.position.x);
        self.end_y = Some(pose.position.y);
        self.end_time = Some(pose.time);
    }

    /// True for a merged run
    pub fn is_run(&self) -> bool {
        self.end_x.is_some()
    }
}

/// Robot pose at one sampled instant
#[derive(Debug, Clone, Copy)]
struct PoseSample {
    position: DVec2,
    heading: f64,
    time: f64,
}

/// Poses checked for one timeline event
fn event_samples(event: &TimelineEvent) -> Vec<PoseSample> {
    match event {
        TimelineEvent::Travel {
            motion_profile,
            heading_profile,
            position_profile,
            ..
        } => motion_profile
            .iter()
            .zip(heading_profile)
            .zip(position_profile)
            .map(|((&time, &heading), &position)| PoseSample {
                position,
                heading,
                time,
            })
            .collect(),
        TimelineEvent::Wait {
            start_time,
            at_point,
            start_heading,
            rotation: Some(rotation),
            ..
        } if rotation.duration() > 0.0 => (0..=ROTATION_SAMPLES)
            .map(|i| {
                let dt = rotation.duration() * i as f64 / ROTATION_SAMPLES as f64;
                PoseSample {
                    position: *at_point,
                    heading: if i == 0 {
                        *start_heading
                    } else {
                        rotation.heading_at(dt)
                    },
                    time: start_time + dt,
                }
            })
            .collect(),
        TimelineEvent::Wait {
            start_time,
            at_point,
            start_heading,
            ..
        } => vec![PoseSample {
            position: *at_point,
            heading: *start_heading,
            time: *start_time,
        }],
    }
}

/// Reject polygons the predicates cannot use
fn validate_shapes(shapes: &[Shape]) -> PlanResult<()> {
    for (index, shape) in shapes.iter().enumerate() {
        if shape.vertices.len() < 3 {
            return Err(PlanError::InvalidShape {
                index,
                vertices: shape.vertices.len(),
            });
        }
    }
    Ok(())
}

/// Field polygons split by role
struct FieldShapes<'a> {
    obstacles: Vec<&'a [DVec2]>,
    keep_ins: Vec<&'a [DVec2]>,
}

impl<'a> FieldShapes<'a> {
    fn new(shapes: &'a [Shape]) -> Self {
        let mut obstacles = Vec::new();
        let mut keep_ins = Vec::new();
        for shape in shapes {
            match shape.kind {
                ShapeKind::Obstacle => obstacles.push(shape.vertices.as_slice()),
                ShapeKind::KeepIn => keep_ins.push(shape.vertices.as_slice()),
            }
        }
        Self {
            obstacles,
            keep_ins,
        }
    }

    /// Which geometric checks the footprint fails, in `CollisionKind::GEOMETRIC` order
    fn violations(&self, corners: &[DVec2; 4], field_size: f64) -> [bool; 3] {
        let obstacle = self
            .obstacles
            .iter()
            .any(|poly| any_vertex_inside(corners, poly) || any_vertex_inside(poly, corners));

        let boundary = corners
            .iter()
            .any(|c| c.x < 0.0 || c.x > field_size || c.y < 0.0 || c.y > field_size);

        let keep_in = !self.keep_ins.is_empty()
            && corners
                .iter()
                .any(|&c| !self.keep_ins.iter().any(|zone| point_in_polygon(c, zone)));

        [obstacle, boundary, keep_in]
    }
}

/// Whether a travel event starts and ends at the same place with no
/// control point pulling it elsewhere
fn is_zero_length(event: &TimelineEvent, lines: &[Line]) -> bool {
    let TimelineEvent::Travel {
        line_index,
        position_profile,
        distance_profile,
        ..
    } = event
    else {
        return false;
    };
    let distance = distance_profile.last().copied().unwrap_or(0.0);
    if distance > ZERO_LENGTH_EPSILON {
        return false;
    }
    let start = position_profile.first().copied().unwrap_or(DVec2::ZERO);
    lines.get(*line_index).is_none_or(|line| {
        line.control_points
            .iter()
            .all(|c| c.distance(start) <= ZERO_LENGTH_EPSILON)
    })
}

/// Collect merged violation markers for a computed timeline
///
/// `lines` must be the slice the timeline was computed from. Fails on
/// invalid settings or polygons with fewer than three vertices.
pub fn get_collisions(
    prediction: &TimePrediction,
    lines: &[Line],
    shapes: &[Shape],
    settings: &Settings,
) -> PlanResult<Vec<CollisionMarker>> {
    settings.validate()?;
    validate_shapes(shapes)?;

    let field = FieldShapes::new(shapes);
    let (length, width) = settings.inflated_footprint();
    let mut markers = Vec::new();

    for (segment_index, event) in prediction.timeline.iter().enumerate() {
        let samples = event_samples(event);

        if is_zero_length(event, lines) {
            if let Some(first) = samples.first() {
                markers.push(CollisionMarker::new(
                    CollisionKind::ZeroLength,
                    segment_index,
                    first,
                ));
            }
        }

        // Index into `markers` of the run currently open for each kind
        let mut open: [Option<usize>; 3] = [None; 3];
        for pose in &samples {
            let corners = robot_corners(
                pose.position.x,
                pose.position.y,
                pose.heading,
                length,
                width,
            );
            let hits = field.violations(&corners, settings.field_size);
            for (k, kind) in CollisionKind::GEOMETRIC.iter().enumerate() {
                if !hits[k] {
                    open[k] = None;
                    continue;
                }
                match open[k] {
                    Some(idx) => markers[idx].extend(pose),
                    None => {
                        open[k] = Some(markers.len());
                        markers.push(CollisionMarker::new(*kind, segment_index, pose));
                    }
                }
            }
        }
    }

    log::debug!(
        "Collision check: {} events, {} shapes, {} markers",
        prediction.timeline.len(),
        shapes.len(),
        markers.len()
    );
    Ok(markers)
}

/// Smallest distance from the sampled robot centre to any obstacle
///
/// Zero while the centre is inside an obstacle; infinite with no obstacles.
pub fn min_clearance(prediction: &TimePrediction, shapes: &[Shape]) -> PlanResult<f64> {
    validate_shapes(shapes)?;
    let field = FieldShapes::new(shapes);

    let mut clearance = f64::INFINITY;
    for event in &prediction.timeline {
        for pose in event_samples(event) {
            for poly in &field.obstacles {
                let d = if point_in_polygon(pose.position, poly) {
                    0.0
                } else {
                    min_distance_to_polygon(pose.position, poly)
                };
                clearance = clearance.min(d);
            }
        }
    }
    Ok(clearance)
}
