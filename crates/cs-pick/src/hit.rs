//! Hit testing: world point → topmost interactive shape.
//!
//! Shapes are visited by descending z-index; equal z-indices keep their
//! input order. The first containing shape wins and fully occludes every
//! lower one, regardless of how things are drawn.

use crate::geometry::PickGeometry;
use crate::shape::{InteractiveShape, Shape};
use glam::{DVec2, DVec3};
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit<'a> {
    pub shape: &'a InteractiveShape,
    /// Cursor position, or its projection on the center line for paths.
    pub projected: DVec3,
    /// Local tangent for path hits.
    pub direction: Option<DVec2>,
}

/// Find the highest-priority shape under `point`.
/// Returns `None` for a non-finite point or when nothing matches.
pub fn find_top_shape_at<'a>(
    point: DVec3,
    shapes: &'a [InteractiveShape],
    geometry: &dyn PickGeometry,
) -> Option<Hit<'a>> {
    if !point.is_finite() {
        log::trace!("pick skipped: cursor point {point} is not finite");
        return None;
    }

    let mut order: Vec<&InteractiveShape> = shapes.iter().collect();
    // stable: ties stay in input order
    order.sort_by_key(|s| Reverse(s.z_index));

    order
        .into_iter()
        .find_map(|shape| hit_shape(point, shape, geometry))
}

fn hit_shape<'a>(
    point: DVec3,
    shape: &'a InteractiveShape,
    geometry: &dyn PickGeometry,
) -> Option<Hit<'a>> {
    let plain = || Hit {
        shape,
        projected: point,
        direction: None,
    };

    match &shape.shape {
        Shape::Circle { center, radius } => (point.distance(*center) < *radius).then(plain),
        Shape::Polygon { vertices } => geometry.point_in_area(point.truncate(), vertices).then(plain),
        Shape::Path {
            centerline,
            max_distance_left,
            max_distance_right,
        } => {
            let flat: Vec<DVec2> = centerline.iter().map(|p| p.truncate()).collect();
            geometry
                .point_close_to_path(point.truncate(), &flat, *max_distance_right, *max_distance_left)
                .map(|projection| Hit {
                    shape,
                    projected: projection.projected.extend(0.0),
                    direction: Some(projection.direction),
                })
        }
        Shape::Everywhere => Some(plain()),
    }
}
