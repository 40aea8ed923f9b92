//! Timeline assembly
//!
//! Walks the sequence in order, tracking position and heading, and emits one
//! contiguous event list. Rotations needed to line up with a path's starting
//! heading are inserted as derived wait events; they never feed back into the
//! sequence.

use glam::DVec2;
use serde::Serialize;

use super::rotation::RotationProfile;
use super::segment::profile_segment;
use crate::consts::HEADING_TOLERANCE_DEG;
use crate::error::{PlanError, PlanResult};
use crate::path::{EventMarker, Line, Point, SequenceItem};
use crate::settings::Settings;
use crate::{normalize_degrees, shortest_angle_diff};

/// Why the robot is stationary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WaitKind {
    /// Explicit `Wait` item
    Wait,
    /// Explicit `Rotate` item
    Rotate,
    /// Rotation inserted to reach a path's starting heading
    AutoRotate,
}

impl WaitKind {
    pub fn is_rotation(&self) -> bool {
        matches!(self, WaitKind::Rotate | WaitKind::AutoRotate)
    }
}

/// One entry of the timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TimelineEvent {
    Travel {
        /// Index into the `lines` slice
        line_index: usize,
        line_id: String,
        start_time: f64,
        end_time: f64,
        /// Absolute time at each sample
        motion_profile: Vec<f64>,
        /// Speed at each sample
        velocity_profile: Vec<f64>,
        /// Heading (degrees) at each sample
        heading_profile: Vec<f64>,
        /// Robot centre at each sample
        position_profile: Vec<DVec2>,
        /// Distance travelled at each sample
        distance_profile: Vec<f64>,
        /// Sampled path length
        distance: f64,
        peak_velocity: f64,
        min_turn_radius: f64,
        event_markers: Vec<EventMarker>,
    },
    Wait {
        start_time: f64,
        end_time: f64,
        at_point: DVec2,
        start_heading: f64,
        target_heading: f64,
        kind: WaitKind,
        /// Present for rotations
        rotation: Option<RotationProfile>,
        event_markers: Vec<EventMarker>,
    },
}

impl TimelineEvent {
    pub fn start_time(&self) -> f64 {
        match self {
            TimelineEvent::Travel { start_time, .. } | TimelineEvent::Wait { start_time, .. } => {
                *start_time
            }
        }
    }

    pub fn end_time(&self) -> f64 {
        match self {
            TimelineEvent::Travel { end_time, .. } | TimelineEvent::Wait { end_time, .. } => {
                *end_time
            }
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time() - self.start_time()
    }

    pub fn is_travel(&self) -> bool {
        matches!(self, TimelineEvent::Travel { .. })
    }

    /// Robot position and heading at absolute time `t` (clamped to the event)
    pub fn pose_at(&self, t: f64) -> (DVec2, f64) {
        match self {
            TimelineEvent::Travel {
                motion_profile,
                heading_profile,
                position_profile,
                ..
            } => {
                let last = motion_profile.len().saturating_sub(1);
                if t <= motion_profile[0] {
                    return (position_profile[0], heading_profile[0]);
                }
                if t >= motion_profile[last] {
                    return (position_profile[last], heading_profile[last]);
                }
                // First sample at or after t
                let i = motion_profile.partition_point(|&time| time < t).max(1);
                let (t0, t1) = (motion_profile[i - 1], motion_profile[i]);
                let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 1.0 };
                let position = position_profile[i - 1].lerp(position_profile[i], f);
                let h0 = heading_profile[i - 1];
                let heading = normalize_degrees(h0 + shortest_angle_diff(h0, heading_profile[i]) * f);
                (position, heading)
            }
            TimelineEvent::Wait {
                start_time,
                at_point,
                start_heading,
                rotation,
                ..
            } => match rotation {
                Some(r) => (*at_point, r.heading_at(t - start_time)),
                None => (*at_point, *start_heading),
            },
        }
    }
}

/// Output of timeline assembly
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePrediction {
    pub total_time: f64,
    pub timeline: Vec<TimelineEvent>,
    pub total_distance: f64,
    /// Duration of each travel event, in execution order
    pub segment_times: Vec<f64>,
}

impl TimePrediction {
    /// Robot pose at `time`, clamped to [0, total_time]
    ///
    /// Returns `None` for an empty timeline.
    pub fn pose_at(&self, time: f64) -> Option<(DVec2, f64)> {
        if self.timeline.is_empty() {
            return None;
        }
        let time = time.clamp(0.0, self.total_time);
        let index = self
            .timeline
            .iter()
            .position(|e| time <= e.end_time())
            .unwrap_or(self.timeline.len() - 1);
        Some(self.timeline[index].pose_at(time))
    }

    /// Absolute firing time of every event marker, in execution order
    pub fn marker_times(&self) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        for event in &self.timeline {
            match event {
                TimelineEvent::Travel {
                    motion_profile,
                    distance_profile,
                    event_markers,
                    ..
                } => {
                    let total = distance_profile.last().copied().unwrap_or(0.0);
                    for marker in event_markers {
                        let time = if total > 0.0 {
                            time_at_distance(
                                motion_profile,
                                distance_profile,
                                marker.position.clamp(0.0, 1.0) * total,
                            )
                        } else {
                            event.start_time()
                        };
                        out.push((marker.name.clone(), time));
                    }
                }
                TimelineEvent::Wait { event_markers, .. } => {
                    for marker in event_markers {
                        let time = event.start_time() + marker.position.clamp(0.0, 1.0) * event.duration();
                        out.push((marker.name.clone(), time));
                    }
                }
            }
        }
        out.sort_by(|a, b| a.1.total_cmp(&b.1));
        out
    }

    /// Number of travel events
    pub fn travel_count(&self) -> usize {
        self.timeline.iter().filter(|e| e.is_travel()).count()
    }
}

fn time_at_distance(times: &[f64], distances: &[f64], target: f64) -> f64 {
    let i = distances.partition_point(|&d| d < target);
    if i == 0 {
        return times[0];
    }
    if i >= distances.len() {
        return times[times.len() - 1];
    }
    let (d0, d1) = (distances[i - 1], distances[i]);
    let f = if d1 > d0 { (target - d0) / (d1 - d0) } else { 0.0 };
    times[i - 1] + (times[i] - times[i - 1]) * f
}

fn find_line<'a>(lines: &'a [Line], id: &str) -> PlanResult<(usize, &'a Line)> {
    lines
        .iter()
        .enumerate()
        .find(|(_, line)| line.id == id)
        .ok_or_else(|| PlanError::UnknownLine(id.to_string()))
}

/// Heading before any motion; tangential start points adopt the first path's
/// starting tangent
fn resolve_initial_heading(start: &Point, lines: &[Line], sequence: &[SequenceItem]) -> PlanResult<f64> {
    if let Some(heading) = start.initial_heading() {
        return Ok(heading);
    }
    for item in sequence {
        if let SequenceItem::Path { line_id } = item {
            let (_, line) = find_line(lines, line_id)?;
            let segment = line.segment(start.position())?;
            return Ok(line
                .end_point
                .heading
                .heading_at(0.0, segment.tangent_deg(0.0), 0.0));
        }
    }
    Ok(0.0)
}

/// Build the timeline for `sequence`
///
/// Fails fast on invalid settings, unknown line ids, unusable lines and
/// negative waits. Degenerate geometry yields valid, near-zero-duration events.
pub fn compute_timeline(
    start: &Point,
    lines: &[Line],
    settings: &Settings,
    sequence: &[SequenceItem],
) -> PlanResult<TimePrediction> {
    settings.validate()?;

    let mut position = start.position();
    let mut heading = resolve_initial_heading(start, lines, sequence)?;
    let mut time = 0.0;
    let mut total_distance = 0.0;
    let mut timeline = Vec::with_capacity(sequence.len() * 2);
    let mut segment_times = Vec::new();

    for (index, item) in sequence.iter().enumerate() {
        match item {
            SequenceItem::Path { line_id } => {
                let (line_index, line) = find_line(lines, line_id)?;
                let segment = line.segment(position)?;
                let mode = line.end_point.heading;

                let required = mode.heading_at(0.0, segment.tangent_deg(0.0), heading);
                if shortest_angle_diff(heading, required).abs() > HEADING_TOLERANCE_DEG {
                    let rotation = RotationProfile::new(heading, required, settings);
                    log::debug!(
                        "Auto-rotating {:.1}° -> {:.1}° before line '{}'",
                        heading,
                        required,
                        line.id
                    );
                    let end_time = time + rotation.duration();
                    timeline.push(TimelineEvent::Wait {
                        start_time: time,
                        end_time,
                        at_point: position,
                        start_heading: rotation.start_deg,
                        target_heading: rotation.target_deg,
                        kind: WaitKind::AutoRotate,
                        rotation: Some(rotation),
                        event_markers: Vec::new(),
                    });
                    time = end_time;
                    heading = rotation.target_deg;
                }

                let profile = profile_segment(&segment, settings);
                let distance = profile.distance();
                let mut heading_profile = Vec::with_capacity(profile.samples.len());
                let mut prev_heading = heading;
                for sample in &profile.samples {
                    let progress = if distance > 0.0 {
                        sample.distance / distance
                    } else {
                        sample.t
                    };
                    let h = mode.heading_at(progress, sample.tangent_deg, prev_heading);
                    heading_profile.push(h);
                    prev_heading = h;
                }

                let end_time = time + profile.duration();
                timeline.push(TimelineEvent::Travel {
                    line_index,
                    line_id: line.id.clone(),
                    start_time: time,
                    end_time,
                    motion_profile: profile.times.iter().map(|t| time + t).collect(),
                    velocity_profile: profile.velocities.clone(),
                    heading_profile,
                    position_profile: profile.samples.iter().map(|s| s.position).collect(),
                    distance_profile: profile.samples.iter().map(|s| s.distance).collect(),
                    distance,
                    peak_velocity: profile.peak_velocity(),
                    min_turn_radius: profile.min_turn_radius(),
                    event_markers: line.event_markers.clone(),
                });

                segment_times.push(profile.duration());
                total_distance += distance;
                time = end_time;
                position = segment.end();
                heading = prev_heading;
            }
            SequenceItem::Wait {
                duration_ms,
                event_markers,
            } => {
                if !duration_ms.is_finite() || *duration_ms < 0.0 {
                    return Err(PlanError::InvalidWait {
                        index,
                        reason: "duration must be a non-negative number",
                    });
                }
                let end_time = time + duration_ms / 1000.0;
                timeline.push(TimelineEvent::Wait {
                    start_time: time,
                    end_time,
                    at_point: position,
                    start_heading: heading,
                    target_heading: heading,
                    kind: WaitKind::Wait,
                    rotation: None,
                    event_markers: event_markers.clone(),
                });
                time = end_time;
            }
            SequenceItem::Rotate { degrees, .. } => {
                let rotation = RotationProfile::new(heading, *degrees, settings);
                let end_time = time + rotation.duration();
                timeline.push(TimelineEvent::Wait {
                    start_time: time,
                    end_time,
                    at_point: position,
                    start_heading: rotation.start_deg,
                    target_heading: rotation.target_deg,
                    kind: WaitKind::Rotate,
                    rotation: Some(rotation),
                    event_markers: Vec::new(),
                });
                time = end_time;
                heading = rotation.target_deg;
            }
        }
    }

    log::debug!(
        "Timeline: {} events, {} travels, {:.3} s, {:.2} units",
        timeline.len(),
        segment_times.len(),
        time,
        total_distance
    );

    Ok(TimePrediction {
        total_time: time,
        timeline,
        total_distance,
        segment_times,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            max_velocity: 10.0,
            max_acceleration: 5.0,
            max_deceleration: 5.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_straight_line() {
        let start = Point::constant(0.0, 0.0, 0.0);
        let lines = vec![Line::new("l1", Point::constant(10.0, 0.0, 0.0))];
        let seq = vec![SequenceItem::path("l1")];
        let pred = compute_timeline(&start, &lines, &settings(), &seq).unwrap();
        assert_eq!(pred.timeline.len(), 1);
        assert!((pred.total_time - 2.828).abs() < 1e-2);
        assert!((pred.total_distance - 10.0).abs() < 1e-9);
        assert_eq!(pred.segment_times.len(), 1);
        assert_eq!(pred.timeline[0].start_time(), 0.0);
    }

    #[test]
    fn test_auto_rotation_inserted_before_path() {
        let start = Point::constant(0.0, 0.0, 0.0);
        let lines = vec![
            Line::new("L1", Point::constant(10.0, 0.0, 0.0)),
            Line::new("L2", Point::tangential(10.0, 10.0, false)),
        ];
        let seq = vec![
            SequenceItem::path("L1"),
            SequenceItem::wait(1000.0),
            SequenceItem::rotate(45.0),
            SequenceItem::path("L2"),
        ];
        let pred = compute_timeline(&start, &lines, &settings(), &seq).unwrap();

        let shape: Vec<Option<WaitKind>> = pred
            .timeline
            .iter()
            .map(|e| match e {
                TimelineEvent::Travel { .. } => None,
                TimelineEvent::Wait { kind, .. } => Some(*kind),
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                None,
                Some(WaitKind::Wait),
                Some(WaitKind::Rotate),
                Some(WaitKind::AutoRotate),
                None,
            ]
        );

        assert!((pred.timeline[1].duration() - 1.0).abs() < 1e-12);
        match &pred.timeline[3] {
            TimelineEvent::Wait {
                start_heading,
                target_heading,
                ..
            } => {
                assert!((start_heading - 45.0).abs() < 1e-9);
                assert!((target_heading - 90.0).abs() < 1e-9);
            }
            other => panic!("expected auto-rotation, got {:?}", other),
        }

        assert_eq!(pred.timeline[0].start_time(), 0.0);
        for pair in pred.timeline.windows(2) {
            assert_eq!(pair[0].end_time(), pair[1].start_time());
        }
        assert_eq!(pred.timeline.last().unwrap().end_time(), pred.total_time);
        assert_eq!(pred.segment_times.len(), 2);
    }

    #[test]
    fn test_zero_length_travel_is_valid() {
        let start = Point::constant(5.0, 5.0, 0.0);
        let lines = vec![Line::new("stay", Point::constant(5.0, 5.0, 0.0))];
        let seq = vec![SequenceItem::path("stay")];
        let pred = compute_timeline(&start, &lines, &settings(), &seq).unwrap();
        assert_eq!(pred.timeline.len(), 1);
        assert_eq!(pred.total_time, 0.0);
        assert_eq!(pred.total_distance, 0.0);
    }

    #[test]
    fn test_unknown_line_fails() {
        let start = Point::constant(0.0, 0.0, 0.0);
        let seq = vec![SequenceItem::path("missing")];
        let err = compute_timeline(&start, &[], &settings(), &seq).unwrap_err();
        assert!(matches!(err, PlanError::UnknownLine(id) if id == "missing"));
    }

    #[test]
    fn test_negative_wait_fails() {
        let start = Point::constant(0.0, 0.0, 0.0);
        let seq = vec![SequenceItem::wait(-5.0)];
        let err = compute_timeline(&start, &[], &settings(), &seq).unwrap_err();
        assert!(matches!(err, PlanError::InvalidWait { index: 0, .. }));
    }

    #[test]
    fn test_invalid_settings_fail_fast() {
        let start = Point::constant(0.0, 0.0, 0.0);
        let bad = Settings {
            max_velocity: -1.0,
            ..settings()
        };
        assert!(compute_timeline(&start, &[], &bad, &[]).is_err());
    }

    #[test]
    fn test_sequence_order_not_line_order() {
        let start = Point::constant(0.0, 0.0, 0.0);
        // Lines listed in reverse of execution order
        let lines = vec![
            Line::new("second", Point::constant(10.0, 10.0, 0.0)),
            Line::new("first", Point::constant(10.0, 0.0, 0.0)),
        ];
        let seq = vec![SequenceItem::path("first"), SequenceItem::path("second")];
        let pred = compute_timeline(&start, &lines, &settings(), &seq).unwrap();
        let travels: Vec<usize> = pred
            .timeline
            .iter()
            .filter_map(|e| match e {
                TimelineEvent::Travel { line_index, .. } => Some(*line_index),
                _ => None,
            })
            .collect();
        assert_eq!(travels, vec![1, 0]);
        // Second line starts where the first ended: 10 units straight up
        assert!((pred.total_distance - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_tangential_start_adopts_first_tangent() {
        let start = Point::tangential(0.0, 0.0, false);
        let lines = vec![Line::new("up", Point::tangential(0.0, 10.0, false))];
        let seq = vec![SequenceItem::path("up")];
        let pred = compute_timeline(&start, &lines, &settings(), &seq).unwrap();
        // No rotation inserted: the robot already faces 90°
        assert_eq!(pred.timeline.len(), 1);
        match &pred.timeline[0] {
            TimelineEvent::Travel {
                heading_profile, ..
            } => assert!(heading_profile.iter().all(|h| (h - 90.0).abs() < 1e-9)),
            other => panic!("expected travel, got {:?}", other),
        }
    }

    #[test]
    fn test_tangential_heading_with_control_point_on_start() {
        let start = Point::tangential(0.0, 0.0, false);
        let lines = vec![
            Line::new("diag", Point::tangential(10.0, 10.0, false))
                .with_control_points(vec![DVec2::ZERO]),
        ];
        let seq = vec![SequenceItem::path("diag")];
        let pred = compute_timeline(&start, &lines, &settings(), &seq).unwrap();
        assert_eq!(pred.timeline.len(), 1);
        match &pred.timeline[0] {
            TimelineEvent::Travel {
                heading_profile, ..
            } => assert!(heading_profile.iter().all(|h| (h - 45.0).abs() < 1e-9)),
            other => panic!("expected travel, got {:?}", other),
        }
    }

    #[test]
    fn test_pose_at_interpolates() {
        let start = Point::constant(0.0, 0.0, 0.0);
        let lines = vec![Line::new("l1", Point::constant(10.0, 0.0, 0.0))];
        let seq = vec![SequenceItem::path("l1"), SequenceItem::rotate(90.0)];
        let pred = compute_timeline(&start, &lines, &settings(), &seq).unwrap();

        let (p, h) = pred.pose_at(0.0).unwrap();
        assert!(p.distance(DVec2::ZERO) < 1e-9);
        assert!(h.abs() < 1e-9);

        // Symmetric triangular profile: halfway in time is halfway in distance
        let half = pred.timeline[0].end_time() / 2.0;
        let (p, _) = pred.pose_at(half).unwrap();
        assert!((p.x - 5.0).abs() < 0.05);

        let (p, h) = pred.pose_at(pred.total_time + 10.0).unwrap();
        assert!(p.distance(DVec2::new(10.0, 0.0)) < 1e-9);
        assert!((h - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_marker_times() {
        let start = Point::constant(0.0, 0.0, 0.0);
        let mut line = Line::new("l1", Point::constant(10.0, 0.0, 0.0));
        line.event_markers.push(EventMarker {
            name: "mid".to_string(),
            position: 0.5,
        });
        let seq = vec![
            SequenceItem::path("l1"),
            SequenceItem::Wait {
                duration_ms: 2000.0,
                event_markers: vec![EventMarker {
                    name: "shoot".to_string(),
                    position: 0.25,
                }],
            },
        ];
        let pred = compute_timeline(&start, &[line], &settings(), &seq).unwrap();
        let markers = pred.marker_times();
        assert_eq!(markers.len(), 2);
        let travel_end = pred.timeline[0].end_time();
        assert_eq!(markers[0].0, "mid");
        assert!((markers[0].1 - travel_end / 2.0).abs() < 1e-2);
        assert_eq!(markers[1].0, "shoot");
        assert!((markers[1].1 - (travel_end + 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_sequence() {
        let start = Point::constant(0.0, 0.0, 0.0);
        let pred = compute_timeline(&start, &[], &settings(), &[]).unwrap();
        assert_eq!(pred.total_time, 0.0);
        assert!(pred.timeline.is_empty());
        assert!(pred.pose_at(1.0).is_none());
    }
}
