//! Robopath entry point
//!
//! Native: plans a project file (or the built-in demo), prints timeline
//! statistics and collisions, then runs the optimizer. The web build goes
//! through the library's wasm bindings instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let path = std::env::args().nth(1);
    if let Err(e) = native::run(path.as_deref()) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the library's `wasm_start`, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use robopath::geometry::polygon_center;
    use robopath::{PlanResult, Project, TimePrediction, TimelineEvent, get_collisions, min_clearance};

    pub fn run(path: Option<&str>) -> PlanResult<()> {
        let project = match path {
            Some(path) => {
                log::info!("Loading project from {}", path);
                Project::load(path)?
            }
            None => {
                log::info!("No project given, using the demo field");
                Project::demo()
            }
        };

        for shape in &project.shapes {
            let center = polygon_center(&shape.vertices);
            println!(
                "Shape {:<14} {:?} centred at ({:.1}, {:.1})",
                shape.name, shape.kind, center.x, center.y
            );
        }

        let prediction = project.timeline()?;
        print_timeline(&prediction);

        let markers = get_collisions(&prediction, &project.lines, &project.shapes, &project.settings)?;
        println!("\nCollisions: {}", markers.len());
        for m in &markers {
            match (m.end_x, m.end_y, m.end_time) {
                (Some(ex), Some(ey), Some(et)) => println!(
                    "  [{}] {} ({:.1}, {:.1}) @ {:.2}s -> ({:.1}, {:.1}) @ {:.2}s",
                    m.segment_index,
                    m.kind.as_str(),
                    m.x,
                    m.y,
                    m.time,
                    ex,
                    ey,
                    et
                ),
                _ => println!(
                    "  [{}] {} ({:.1}, {:.1}) @ {:.2}s",
                    m.segment_index,
                    m.kind.as_str(),
                    m.x,
                    m.y,
                    m.time
                ),
            }
        }
        println!(
            "Min obstacle clearance: {:.2}",
            min_clearance(&prediction, &project.shapes)?
        );

        println!(
            "\nOptimizing ({} generations x {} candidates)...",
            project.optimizer.optimization_iterations, project.optimizer.population_size
        );
        let result = project.optimizer()?.run(|report| {
            log::debug!(
                "gen {:>3}: best {:.3}s, {} collisions",
                report.generation,
                report.best_time,
                report.collision_count
            );
        });
        println!(
            "Best: {:.3}s travel ({} collisions) after {} generations (was {:.3}s)",
            result.total_time, result.collision_count, result.generations, prediction.total_time
        );

        let optimized = project.with_lines(result.lines);
        for line in &optimized.lines {
            if !line.control_points.is_empty() {
                let points: Vec<String> = line
                    .control_points
                    .iter()
                    .map(|c| format!("({:.1}, {:.1})", c.x, c.y))
                    .collect();
                println!("  {} control points: {}", line.id, points.join(" "));
            }
        }
        Ok(())
    }

    fn print_timeline(prediction: &TimePrediction) {
        println!(
            "Total time: {:.3}s over {:.1} units ({} travels)",
            prediction.total_time,
            prediction.total_distance,
            prediction.travel_count()
        );
        for (i, event) in prediction.timeline.iter().enumerate() {
            match event {
                TimelineEvent::Travel {
                    line_id,
                    start_time,
                    end_time,
                    peak_velocity,
                    min_turn_radius,
                    ..
                } => println!(
                    "  {:>2} travel {:<12} {:>7.3}s -> {:>7.3}s  peak {:.1} u/s  min radius {:.1}",
                    i, line_id, start_time, end_time, peak_velocity, min_turn_radius
                ),
                TimelineEvent::Wait {
                    start_time,
                    end_time,
                    kind,
                    start_heading,
                    target_heading,
                    ..
                } => println!(
                    "  {:>2} {:<19} {:>7.3}s -> {:>7.3}s  heading {:.1} -> {:.1}",
                    i,
                    format!("{:?}", kind).to_lowercase(),
                    start_time,
                    end_time,
                    start_heading,
                    target_heading
                ),
            }
        }
        for (name, time) in prediction.marker_times() {
            println!("  marker {:<12} @ {:.3}s", name, time);
        }
    }
}
