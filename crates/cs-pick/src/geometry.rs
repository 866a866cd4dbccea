//! Geometric predicates used by the hit tester.
//!
//! The planning authority owns the exact road and zone geometry, so the
//! predicates sit behind [`PickGeometry`]: an authority can override them
//! with its own, and the provided methods fall back to local kurbo geometry.

use glam::DVec2;
use kurbo::{BezPath, Line, ParamCurve, Point, Shape as _, Vec2};

/// Where a point landed relative to a path band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathProjection {
    /// The queried point.
    pub point: DVec2,
    /// Foot of the perpendicular on the center line.
    pub projected: DVec2,
    /// Unit tangent of the center line at `projected`.
    pub direction: DVec2,
}

impl PathProjection {
    /// Signed perpendicular offset of `point`; positive is right of travel.
    pub fn offset(&self) -> f64 {
        (self.point - self.projected).dot(right_normal(self.direction))
    }
}

/// Right-hand normal of a direction: `(x, y)` → `(y, -x)`.
pub fn right_normal(direction: DVec2) -> DVec2 {
    DVec2::new(direction.y, -direction.x)
}

pub trait PickGeometry {
    /// Whether `point` lies inside the closed polygon `area`.
    fn point_in_area(&self, point: DVec2, area: &[DVec2]) -> bool {
        point_in_polygon(point, area)
    }

    /// Project `point` onto `path` and accept it if its perpendicular offset
    /// lies within `[-max_distance_left, max_distance_right]`.
    fn point_close_to_path(
        &self,
        point: DVec2,
        path: &[DVec2],
        max_distance_right: f64,
        max_distance_left: f64,
    ) -> Option<PathProjection> {
        let projection = project_onto_path(point, path)?;
        let offset = projection.offset();
        (offset >= -max_distance_left && offset <= max_distance_right).then_some(projection)
    }
}

/// Geometry computed locally, without consulting the authority.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGeometry;

impl PickGeometry for LocalGeometry {}

/// Nonzero-winding containment test on the XY ring.
pub fn point_in_polygon(point: DVec2, vertices: &[DVec2]) -> bool {
    if vertices.len() < 3 || !point.is_finite() {
        return false;
    }
    let mut ring = BezPath::new();
    ring.move_to(to_kurbo(vertices[0]));
    for v in &vertices[1..] {
        ring.line_to(to_kurbo(*v));
    }
    ring.close_path();
    ring.contains(to_kurbo(point))
}

/// Perpendicular projection onto the nearest segment whose foot falls
/// inside that segment. Points beyond both ends of every segment miss.
pub fn project_onto_path(point: DVec2, path: &[DVec2]) -> Option<PathProjection> {
    if !point.is_finite() {
        return None;
    }
    let p = to_kurbo(point);
    let mut best: Option<(f64, Point, Vec2)> = None;

    for pair in path.windows(2) {
        let line = Line::new(to_kurbo(pair[0]), to_kurbo(pair[1]));
        let along = line.p1 - line.p0;
        let length_sq = along.hypot2();
        if length_sq <= f64::EPSILON {
            continue;
        }
        let t = (p - line.p0).dot(along) / length_sq;
        if !(0.0..=1.0).contains(&t) {
            continue;
        }
        let foot = line.eval(t);
        let distance_sq = (p - foot).hypot2();
        if best.is_none_or(|(d, _, _)| distance_sq < d) {
            best = Some((distance_sq, foot, along / length_sq.sqrt()));
        }
    }

    best.map(|(_, foot, direction)| PathProjection {
        point,
        projected: DVec2::new(foot.x, foot.y),
        direction: DVec2::new(direction.x, direction.y),
    })
}

fn to_kurbo(v: DVec2) -> Point {
    Point::new(v.x, v.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<DVec2> {
        vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ]
    }

    #[test]
    fn polygon_containment() {
        assert!(point_in_polygon(DVec2::new(5.0, 5.0), &square()));
        assert!(!point_in_polygon(DVec2::new(15.0, 5.0), &square()));
        assert!(!point_in_polygon(DVec2::new(-0.1, 5.0), &square()));
    }

    #[test]
    fn clockwise_polygon_also_contains() {
        let mut ring = square();
        ring.reverse();
        assert!(point_in_polygon(DVec2::new(2.0, 8.0), &ring));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        assert!(!point_in_polygon(DVec2::ZERO, &[DVec2::ZERO, DVec2::X]));
        assert!(!point_in_polygon(DVec2::NAN, &square()));
    }

    #[test]
    fn projection_onto_straight_path() {
        let path = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)];
        let hit = project_onto_path(DVec2::new(4.0, -3.0), &path).unwrap();
        assert_eq!(hit.projected, DVec2::new(4.0, 0.0));
        assert_eq!(hit.direction, DVec2::X);
        // -Y is to the right when walking along +X
        assert!((hit.offset() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn projection_picks_nearest_segment() {
        let path = [
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
        ];
        let hit = project_onto_path(DVec2::new(9.0, 6.0), &path).unwrap();
        assert_eq!(hit.projected, DVec2::new(10.0, 6.0));
        assert_eq!(hit.direction, DVec2::Y);
    }

    #[test]
    fn points_past_the_ends_miss() {
        let path = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)];
        assert!(project_onto_path(DVec2::new(12.0, 0.0), &path).is_none());
        assert!(project_onto_path(DVec2::new(-1.0, 1.0), &path).is_none());
        assert!(project_onto_path(DVec2::ZERO, &[DVec2::ZERO]).is_none());
    }

    #[test]
    fn band_is_asymmetric() {
        let path = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)];
        let geometry = LocalGeometry;
        // right side (-Y) reaches 5, left side (+Y) only 1
        assert!(geometry.point_close_to_path(DVec2::new(3.0, -4.5), &path, 5.0, 1.0).is_some());
        assert!(geometry.point_close_to_path(DVec2::new(3.0, 1.5), &path, 5.0, 1.0).is_none());
        assert!(geometry.point_close_to_path(DVec2::new(3.0, 0.5), &path, 5.0, 1.0).is_some());
    }
}
