//! Geometry kernel
//!
//! Pure functions over points and polygons. Polygons are vertex slices with an
//! implicit closing edge from the last vertex back to the first.

pub mod footprint;
pub mod hull;
pub mod polygon;

pub use footprint::robot_corners;
pub use hull::convex_hull;
pub use polygon::{
    any_vertex_inside, min_distance_to_polygon, point_in_polygon, point_to_line_distance,
    polygon_center,
};
