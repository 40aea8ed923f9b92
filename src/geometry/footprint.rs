//! Rotated rectangle footprint

use glam::DVec2;

/// Corners of a `length` x `width` rectangle centred at `(x, y)`, rotated by
/// `heading_deg`
///
/// Order is fixed: front-left, front-right, back-right, back-left, so
/// consecutive corners share an edge.
pub fn robot_corners(x: f64, y: f64, heading_deg: f64, length: f64, width: f64) -> [DVec2; 4] {
    let center = DVec2::new(x, y);
    let dir = DVec2::from_angle(heading_deg.to_radians());
    let forward = dir * (length / 2.0);
    let left = dir.perp() * (width / 2.0);

    [
        center + forward + left,
        center + forward - left,
        center - forward - left,
        center - forward + left,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: DVec2, b: DVec2) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn test_corners_axis_aligned() {
        let c = robot_corners(10.0, 5.0, 0.0, 4.0, 2.0);
        assert!(close(c[0], DVec2::new(12.0, 6.0))); // front-left
        assert!(close(c[1], DVec2::new(12.0, 4.0))); // front-right
        assert!(close(c[2], DVec2::new(8.0, 4.0))); // back-right
        assert!(close(c[3], DVec2::new(8.0, 6.0))); // back-left
    }

    #[test]
    fn test_corners_rotated_quarter_turn() {
        let c = robot_corners(0.0, 0.0, 90.0, 4.0, 2.0);
        assert!(close(c[0], DVec2::new(-1.0, 2.0)));
        assert!(close(c[1], DVec2::new(1.0, 2.0)));
        assert!(close(c[2], DVec2::new(1.0, -2.0)));
        assert!(close(c[3], DVec2::new(-1.0, -2.0)));
    }

    #[test]
    fn test_corner_edges_are_adjacent() {
        let c = robot_corners(3.0, -2.0, 37.0, 6.0, 3.0);
        // Front edge spans the width, side edge spans the length
        assert!((c[0].distance(c[1]) - 3.0).abs() < 1e-9);
        assert!((c[1].distance(c[2]) - 6.0).abs() < 1e-9);
        assert!((c[2].distance(c[3]) - 3.0).abs() < 1e-9);
        assert!((c[3].distance(c[0]) - 6.0).abs() < 1e-9);
    }
}
