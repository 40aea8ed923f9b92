//! End-to-end planning scenarios through the public API

use std::future::Future;
use std::pin::pin;
use std::task::{Context, Poll, Waker};

use glam::DVec2;
use robopath::{
    CollisionKind, Line, OptimizerSettings, Point, Project, SequenceItem, Settings, Shape,
    ShapeKind, StopHandle, TimelineEvent, WaitKind, compute_timeline, get_collisions, optimize,
};

fn block_on<F: Future>(fut: F) -> F::Output {
    let mut fut = pin!(fut);
    let mut cx = Context::from_waker(Waker::noop());
    loop {
        if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
            return out;
        }
    }
}

fn obstacle_project() -> Project {
    Project {
        start_point: Point::constant(20.0, 72.0, 0.0),
        lines: vec![Line::new("across", Point::constant(124.0, 72.0, 0.0))],
        sequence: vec![SequenceItem::path("across")],
        shapes: vec![Shape::rectangle(
            ShapeKind::Obstacle,
            DVec2::new(60.0, 60.0),
            DVec2::new(84.0, 84.0),
        )],
        settings: Settings::default(),
        optimizer: OptimizerSettings {
            optimization_iterations: 12,
            population_size: 16,
            ..Default::default()
        },
    }
}

#[test]
fn test_triangular_straight_line() {
    let settings = Settings {
        max_velocity: 10.0,
        max_acceleration: 5.0,
        max_deceleration: 5.0,
        ..Default::default()
    };
    let prediction = compute_timeline(
        &Point::constant(0.0, 0.0, 0.0),
        &[Line::new("l1", Point::constant(10.0, 0.0, 0.0))],
        &settings,
        &[SequenceItem::path("l1")],
    )
    .unwrap();
    assert!((prediction.total_time - 2.828).abs() < 1e-2);
    match &prediction.timeline[0] {
        TimelineEvent::Travel { peak_velocity, .. } => {
            assert!((peak_velocity - 7.07).abs() < 1e-2);
        }
        other => panic!("expected travel, got {:?}", other),
    }
}

#[test]
fn test_explicit_and_inserted_rotations() {
    let lines = vec![
        Line::new("L1", Point::constant(40.0, 40.0, 0.0)),
        Line::new("L2", Point::constant(40.0, 80.0, 90.0)),
    ];
    let sequence = vec![
        SequenceItem::path("L1"),
        SequenceItem::wait(1000.0),
        SequenceItem::rotate(45.0),
        SequenceItem::path("L2"),
    ];
    let prediction = compute_timeline(
        &Point::constant(10.0, 40.0, 0.0),
        &lines,
        &Settings::default(),
        &sequence,
    )
    .unwrap();

    let rotations: Vec<WaitKind> = prediction
        .timeline
        .iter()
        .filter_map(|e| match e {
            TimelineEvent::Wait { kind, .. } if kind.is_rotation() => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(rotations, vec![WaitKind::Rotate, WaitKind::AutoRotate]);
    assert_eq!(prediction.timeline.len(), 5);
    assert!(prediction.timeline[0].is_travel());
    assert!(prediction.timeline[4].is_travel());
    assert_eq!(prediction.segment_times.len(), 2);
}

#[test]
fn test_cusp_radius_is_tiny_but_finite() {
    let line = Line::new("out-and-back", Point::constant(0.0, 0.0, 0.0))
        .with_control_points(vec![DVec2::new(10.0, 0.0)]);
    let prediction = compute_timeline(
        &Point::constant(0.0, 0.0, 0.0),
        &[line],
        &Settings::default(),
        &[SequenceItem::path("out-and-back")],
    )
    .unwrap();
    match &prediction.timeline[0] {
        TimelineEvent::Travel {
            min_turn_radius, ..
        } => {
            assert!(*min_turn_radius < 1e-3);
            assert!(*min_turn_radius > 0.0);
        }
        other => panic!("expected travel, got {:?}", other),
    }
    assert!(prediction.total_time.is_finite());
    assert!((prediction.total_distance - 10.0).abs() < 1e-6);
}

#[test]
fn test_optimized_lines_clear_the_obstacle() {
    let project = obstacle_project();
    let before = project.timeline().unwrap();
    let markers = get_collisions(&before, &project.lines, &project.shapes, &project.settings).unwrap();
    assert!(markers.iter().any(|m| m.kind == CollisionKind::Obstacle));

    let mut history = Vec::new();
    let result = project.optimizer().unwrap().run(|r| history.push(r.best_time));
    assert!(!result.stopped);
    assert_eq!(history.len(), 12);
    assert!(history.windows(2).all(|w| w[1] <= w[0]));

    let optimized = project.with_lines(result.lines);
    let after = optimized.timeline().unwrap();
    let markers = get_collisions(&after, &optimized.lines, &optimized.shapes, &optimized.settings).unwrap();
    assert!(markers.is_empty(), "{:?}", markers);
    assert!((after.total_time - result.total_time).abs() < 1e-9);
}

#[test]
fn test_stop_is_observed_between_generations() {
    let project = obstacle_project();
    let stop = StopHandle::new();
    let optimizer = project.optimizer().unwrap().with_stop_handle(stop.clone());

    let mut updates = 0;
    let result = block_on(optimize(
        optimizer,
        |_| {
            updates += 1;
            if updates == 2 {
                stop.stop();
            }
        },
        || std::future::ready(()),
    ));
    assert!(result.stopped);
    assert_eq!(updates, 2);
    assert!(updates < project.optimizer.optimization_iterations);
    assert_eq!(result.generations, 2);
}

#[test]
fn test_project_json_drives_everything() {
    let json = r#"{
        "startPoint": {"x": 24, "y": 24, "heading": "constant", "degrees": 0},
        "lines": [
            {"id": "a", "endPoint": {"x": 120, "y": 24, "heading": "tangential", "reverse": false},
             "eventMarkers": [{"name": "halfway", "position": 0.5}]},
            {"id": "b", "endPoint": {"x": 120, "y": 120, "heading": "linear", "startDeg": 0, "endDeg": 90},
             "controlPoints": [[140, 60], [100, 100]]}
        ],
        "sequence": [
            {"kind": "path", "lineId": "a"},
            {"kind": "wait", "durationMs": 250},
            {"kind": "path", "lineId": "b"}
        ],
        "shapes": [{"kind": "keep-in", "vertices": [[0, 0], [144, 0], [144, 144], [0, 144]]}],
        "settings": {"maxVelocity": 40, "robotLength": 16, "robotWidth": 16}
    }"#;
    let project = Project::from_json(json).unwrap();
    let prediction = project.timeline().unwrap();
    assert_eq!(prediction.travel_count(), 2);

    let markers = prediction.marker_times();
    assert_eq!(markers.len(), 1);
    let first_travel = &prediction.timeline[0];
    assert!(markers[0].1 > first_travel.start_time());
    assert!(markers[0].1 < first_travel.end_time());

    let (position, _) = prediction.pose_at(prediction.total_time).unwrap();
    assert!(position.distance(DVec2::new(120.0, 120.0)) < 1e-9);

    // The serialized timeline uses the editor's field names
    let value = serde_json::to_value(&prediction).unwrap();
    assert!(value["totalTime"].is_number());
    assert_eq!(value["timeline"][0]["type"], "travel");
    assert!(value["timeline"][0]["velocityProfile"].is_array());
    assert_eq!(value["timeline"][1]["type"], "wait");
}
