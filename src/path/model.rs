//! Points, lines, sequence items and field shapes

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::path::bezier::Segment;
use crate::{normalize_degrees, shortest_angle_diff};

/// How the robot heading evolves while travelling toward a point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "heading", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HeadingMode {
    /// Fixed heading (degrees)
    Constant { degrees: f64 },
    /// Heading interpolated over travel progress (degrees)
    Linear { start_deg: f64, end_deg: f64 },
    /// Heading follows the path tangent, optionally flipped 180°
    Tangential { reverse: bool },
}

impl Default for HeadingMode {
    fn default() -> Self {
        HeadingMode::Tangential { reverse: false }
    }
}

impl HeadingMode {
    /// Heading at `progress` in [0, 1] of the travel
    ///
    /// `tangent_deg` is the local path direction, `None` where the path has no
    /// direction (cusps, zero-length segments); `fallback` is used then.
    pub fn heading_at(&self, progress: f64, tangent_deg: Option<f64>, fallback: f64) -> f64 {
        match *self {
            HeadingMode::Constant { degrees } => normalize_degrees(degrees),
            HeadingMode::Linear { start_deg, end_deg } => {
                let progress = progress.clamp(0.0, 1.0);
                normalize_degrees(start_deg + shortest_angle_diff(start_deg, end_deg) * progress)
            }
            HeadingMode::Tangential { reverse } => match tangent_deg {
                Some(t) if reverse => normalize_degrees(t + 180.0),
                Some(t) => normalize_degrees(t),
                None => fallback,
            },
        }
    }
}

/// A field position with a heading mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(flatten)]
    pub heading: HeadingMode,
}

impl Point {
    pub fn new(x: f64, y: f64, heading: HeadingMode) -> Self {
        Self { x, y, heading }
    }

    /// Point with a constant heading
    pub fn constant(x: f64, y: f64, degrees: f64) -> Self {
        Self::new(x, y, HeadingMode::Constant { degrees })
    }

    /// Point with a linearly interpolated heading
    pub fn linear(x: f64, y: f64, start_deg: f64, end_deg: f64) -> Self {
        Self::new(x, y, HeadingMode::Linear { start_deg, end_deg })
    }

    /// Point with a tangent-following heading
    pub fn tangential(x: f64, y: f64, reverse: bool) -> Self {
        Self::new(x, y, HeadingMode::Tangential { reverse })
    }

    #[inline]
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Heading of a start point before any motion
    ///
    /// Tangential start points have no heading of their own and return `None`;
    /// the robot then adopts whatever the first path requires.
    pub fn initial_heading(&self) -> Option<f64> {
        match self.heading {
            HeadingMode::Constant { degrees } => Some(normalize_degrees(degrees)),
            HeadingMode::Linear { start_deg, .. } => Some(normalize_degrees(start_deg)),
            HeadingMode::Tangential { .. } => None,
        }
    }
}

/// A named trigger placed along a path or wait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMarker {
    pub name: String,
    /// Fraction of the owning item, in [0, 1]
    pub position: f64,
}

/// A path segment ending at `end_point`
///
/// The segment starts wherever the robot is when the line executes. Zero
/// control points is a straight line, one a quadratic and two a cubic Bezier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub id: String,
    pub end_point: Point,
    #[serde(default)]
    pub control_points: Vec<DVec2>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub event_markers: Vec<EventMarker>,
}

impl Line {
    /// Straight line to `end_point`
    pub fn new(id: impl Into<String>, end_point: Point) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            end_point,
            control_points: Vec::new(),
            color: String::new(),
            event_markers: Vec::new(),
        }
    }

    /// Builder-style control point setter
    pub fn with_control_points(mut self, control_points: Vec<DVec2>) -> Self {
        self.control_points = control_points;
        self
    }

    /// Check the line can be evaluated
    pub fn validate(&self) -> PlanResult<()> {
        if self.control_points.len() > 2 {
            return Err(PlanError::InvalidLine {
                id: self.id.clone(),
                reason: format!(
                    "{} control points (at most 2 supported)",
                    self.control_points.len()
                ),
            });
        }
        let finite = self.end_point.position().is_finite()
            && self.control_points.iter().all(|c| c.is_finite());
        if !finite {
            return Err(PlanError::InvalidLine {
                id: self.id.clone(),
                reason: "non-finite coordinate".to_string(),
            });
        }
        Ok(())
    }

    /// Curve geometry when starting from `start`
    pub fn segment(&self, start: DVec2) -> PlanResult<Segment> {
        self.validate()?;
        let end = self.end_point.position();
        Ok(match self.control_points.as_slice() {
            [] => Segment::Linear([start, end]),
            [c] => Segment::Quadratic([start, *c, end]),
            [c1, c2] => Segment::Cubic([start, *c1, *c2, end]),
            _ => unreachable!("validated above"),
        })
    }
}

/// One step of the execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SequenceItem {
    /// Travel along the line with this id
    Path { line_id: String },
    /// Hold position for a fixed time
    Wait {
        duration_ms: f64,
        #[serde(default)]
        event_markers: Vec<EventMarker>,
    },
    /// Turn in place to an absolute heading (degrees)
    Rotate {
        degrees: f64,
        #[serde(default)]
        name: String,
    },
}

impl SequenceItem {
    pub fn path(line_id: impl Into<String>) -> Self {
        SequenceItem::Path {
            line_id: line_id.into(),
        }
    }

    pub fn wait(duration_ms: f64) -> Self {
        SequenceItem::Wait {
            duration_ms,
            event_markers: Vec::new(),
        }
    }

    pub fn rotate(degrees: f64) -> Self {
        SequenceItem::Rotate {
            degrees,
            name: String::new(),
        }
    }
}

/// Role of a field polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    /// The footprint must not touch it
    Obstacle,
    /// The footprint must stay inside (union across all keep-in zones)
    KeepIn,
}

/// A tagged field polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(default)]
    pub name: String,
    pub kind: ShapeKind,
    pub vertices: Vec<DVec2>,
}

impl Shape {
    pub fn obstacle(vertices: Vec<DVec2>) -> Self {
        Self {
            name: String::new(),
            kind: ShapeKind::Obstacle,
            vertices,
        }
    }

    pub fn keep_in(vertices: Vec<DVec2>) -> Self {
        Self {
            name: String::new(),
            kind: ShapeKind::KeepIn,
            vertices,
        }
    }

    /// Axis-aligned rectangle helper
    pub fn rectangle(kind: ShapeKind, min: DVec2, max: DVec2) -> Self {
        Self {
            name: String::new(),
            kind,
            vertices: vec![
                DVec2::new(min.x, min.y),
                DVec2::new(max.x, min.y),
                DVec2::new(max.x, max.y),
                DVec2::new(min.x, max.y),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_modes() {
        let constant = HeadingMode::Constant { degrees: 370.0 };
        assert!((constant.heading_at(0.5, Some(45.0), 0.0) - 10.0).abs() < 1e-9);

        let linear = HeadingMode::Linear {
            start_deg: 0.0,
            end_deg: 90.0,
        };
        assert!((linear.heading_at(0.0, None, 0.0) - 0.0).abs() < 1e-9);
        assert!((linear.heading_at(0.5, None, 0.0) - 45.0).abs() < 1e-9);
        assert!((linear.heading_at(1.0, None, 0.0) - 90.0).abs() < 1e-9);

        // Interpolation takes the short way across ±180
        let wrap = HeadingMode::Linear {
            start_deg: 170.0,
            end_deg: -170.0,
        };
        assert!((wrap.heading_at(0.5, None, 0.0) - 180.0).abs() < 1e-9);

        let tangential = HeadingMode::Tangential { reverse: true };
        assert!((tangential.heading_at(0.3, Some(30.0), 0.0) - (-150.0)).abs() < 1e-9);
        assert_eq!(tangential.heading_at(0.3, None, 12.0), 12.0);
    }

    #[test]
    fn test_initial_heading() {
        assert_eq!(Point::constant(0.0, 0.0, 90.0).initial_heading(), Some(90.0));
        assert_eq!(Point::linear(0.0, 0.0, 10.0, 20.0).initial_heading(), Some(10.0));
        assert_eq!(Point::tangential(0.0, 0.0, false).initial_heading(), None);
    }

    #[test]
    fn test_line_segment_degree() {
        let end = Point::constant(10.0, 0.0, 0.0);
        let start = DVec2::ZERO;
        let line = Line::new("l1", end);
        assert!(matches!(line.segment(start).unwrap(), Segment::Linear(_)));

        let line = line.with_control_points(vec![DVec2::new(5.0, 5.0)]);
        assert!(matches!(line.segment(start).unwrap(), Segment::Quadratic(_)));

        let line = line.with_control_points(vec![DVec2::new(3.0, 5.0), DVec2::new(7.0, 5.0)]);
        assert!(matches!(line.segment(start).unwrap(), Segment::Cubic(_)));

        let line = line.with_control_points(vec![DVec2::ONE; 3]);
        assert!(matches!(
            line.segment(start),
            Err(PlanError::InvalidLine { .. })
        ));
    }

    #[test]
    fn test_sequence_item_json() {
        let json = r#"[
            {"kind": "path", "lineId": "a"},
            {"kind": "wait", "durationMs": 1000, "eventMarkers": [{"name": "intake", "position": 0.5}]},
            {"kind": "rotate", "degrees": 45}
        ]"#;
        let items: Vec<SequenceItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0], SequenceItem::path("a"));
        match &items[1] {
            SequenceItem::Wait {
                duration_ms,
                event_markers,
            } => {
                assert_eq!(*duration_ms, 1000.0);
                assert_eq!(event_markers[0].name, "intake");
            }
            other => panic!("expected wait, got {:?}", other),
        }
        assert_eq!(items[2], SequenceItem::rotate(45.0));
    }

    #[test]
    fn test_point_and_shape_json() {
        let json = r#"{"x": 1.0, "y": 2.0, "heading": "linear", "startDeg": 0, "endDeg": 90}"#;
        let p: Point = serde_json::from_str(json).unwrap();
        assert_eq!(p, Point::linear(1.0, 2.0, 0.0, 90.0));

        let json = r#"{"kind": "keep-in", "vertices": [[0, 0], [1, 0], [1, 1]]}"#;
        let s: Shape = serde_json::from_str(json).unwrap();
        assert_eq!(s.kind, ShapeKind::KeepIn);
        assert_eq!(s.vertices.len(), 3);
    }
}
