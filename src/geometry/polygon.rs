//! Point/polygon predicates and distances

use glam::DVec2;

/// Ray-casting containment test
///
/// Counts crossings of a horizontal ray from `p` toward +x. Each edge is
/// half-open in y (it owns its lower endpoint only), so points on a left or
/// bottom edge count as inside and points on a right or top edge count as
/// outside. This tie-break is deterministic but not symmetric under
/// reflection.
pub fn point_in_polygon(p: DVec2, vertices: &[DVec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from `p` to the closest point of segment `[a, b]`
pub fn point_to_line_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-18 {
        // Degenerate segment
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Minimum distance from `p` to any edge of the closed polygon
///
/// Returns `f64::INFINITY` for an empty vertex list.
pub fn min_distance_to_polygon(p: DVec2, vertices: &[DVec2]) -> f64 {
    match vertices.len() {
        0 => f64::INFINITY,
        1 => p.distance(vertices[0]),
        n => (0..n)
            .map(|i| point_to_line_distance(p, vertices[i], vertices[(i + 1) % n]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Vertex average of a polygon
///
/// This is the vertex centroid, not the area centroid; the two differ for
/// irregular polygons.
pub fn polygon_center(vertices: &[DVec2]) -> DVec2 {
    if vertices.is_empty() {
        return DVec2::ZERO;
    }
    let sum: DVec2 = vertices.iter().copied().sum();
    sum / vertices.len() as f64
}

/// True if any vertex of `points` lies inside `polygon`
#[inline]
pub fn any_vertex_inside(points: &[DVec2], polygon: &[DVec2]) -> bool {
    points.iter().any(|&p| point_in_polygon(p, polygon))
}
