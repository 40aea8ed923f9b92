//! Project bundle
//!
//! Everything the editor hands over for one planning call, as a single JSON
//! document: start point, lines, the flattened sequence, field shapes and
//! both settings blocks.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::PlanResult;
use crate::optimizer::Optimizer;
use crate::path::{EventMarker, Line, Point, SequenceItem, Shape, ShapeKind};
use crate::profile::{TimePrediction, compute_timeline};
use crate::settings::{OptimizerSettings, Settings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub start_point: Point,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub sequence: Vec<SequenceItem>,
    #[serde(default)]
    pub shapes: Vec<Shape>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub optimizer: OptimizerSettings,
}

impl Project {
    pub fn from_json(json: &str) -> PlanResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a project file from disk
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> PlanResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Timeline for this project's sequence
    pub fn timeline(&self) -> PlanResult<TimePrediction> {
        compute_timeline(&self.start_point, &self.lines, &self.settings, &self.sequence)
    }

    /// Optimizer seeded from this project
    pub fn optimizer(&self) -> PlanResult<Optimizer> {
        Optimizer::new(
            self.start_point,
            self.lines.clone(),
            self.sequence.clone(),
            self.shapes.clone(),
            self.settings.clone(),
            self.optimizer.clone(),
        )
    }

    /// Copy of this project with its lines replaced (e.g. by an optimizer result)
    pub fn with_lines(&self, lines: Vec<Line>) -> Self {
        Self {
            lines,
            ..self.clone()
        }
    }

    /// Small demo field: a scoring run around a central obstacle
    pub fn demo() -> Self {
        let mut to_goal = Line::new("to-goal", Point::tangential(120.0, 72.0, false));
        to_goal.name = "Drive to goal".to_string();
        to_goal.color = "#3b82f6".to_string();
        to_goal.event_markers.push(EventMarker {
            name: "raise-arm".to_string(),
            position: 0.75,
        });

        let mut return_home = Line::new("return", Point::linear(24.0, 120.0, 0.0, 180.0))
            .with_control_points(vec![DVec2::new(120.0, 120.0), DVec2::new(72.0, 136.0)]);
        return_home.name = "Return".to_string();
        return_home.color = "#f97316".to_string();

        Self {
            start_point: Point::constant(24.0, 72.0, 0.0),
            lines: vec![to_goal, return_home],
            sequence: vec![
                SequenceItem::path("to-goal"),
                SequenceItem::Wait {
                    duration_ms: 750.0,
                    event_markers: vec![EventMarker {
                        name: "score".to_string(),
                        position: 0.5,
                    }],
                },
                SequenceItem::Rotate {
                    degrees: 90.0,
                    name: "face wall".to_string(),
                },
                SequenceItem::path("return"),
            ],
            shapes: vec![
                Shape {
                    name: "center block".to_string(),
                    ..Shape::rectangle(
                        ShapeKind::Obstacle,
                        DVec2::new(62.0, 62.0),
                        DVec2::new(82.0, 82.0),
                    )
                },
                Shape {
                    name: "field".to_string(),
                    ..Shape::rectangle(ShapeKind::KeepIn, DVec2::ZERO, DVec2::splat(144.0))
                },
            ],
            settings: Settings::default(),
            optimizer: OptimizerSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip_preserves_project() {
        let project = Project::demo();
        let json = project.to_json().unwrap();
        assert_eq!(Project::from_json(&json).unwrap(), project);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "startPoint": {"x": 10, "y": 10, "heading": "constant", "degrees": 0},
            "lines": [{"id": "a", "endPoint": {"x": 20, "y": 10, "heading": "tangential", "reverse": false}}],
            "sequence": [{"kind": "path", "lineId": "a"}],
            "settings": {"maxVelocity": 10, "maxAcceleration": 5, "maxDeceleration": 5}
        }"#;
        let project = Project::from_json(json).unwrap();
        assert_eq!(project.settings.robot_width, Settings::default().robot_width);
        assert_eq!(project.optimizer, OptimizerSettings::default());
        let prediction = project.timeline().unwrap();
        assert!((prediction.total_time - 2.828).abs() < 1e-2);
    }

    #[test]
    fn test_bad_json_is_a_serialization_error() {
        let err = Project::from_json("{ not json").unwrap_err();
        assert!(matches!(err, crate::error::PlanError::Serialization(_)));
    }

    #[test]
    fn test_demo_runs() {
        let project = Project::demo();
        let prediction = project.timeline().unwrap();
        assert!(prediction.total_time > 0.0);
        assert_eq!(prediction.travel_count(), 2);
        assert!(project.optimizer().is_ok());
    }
}
