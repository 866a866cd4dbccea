//! Interactive shape descriptors.
//!
//! Shapes are rebuilt every render pass. They carry geometry, a pick priority
//! and cursor hints only; what happens when one is hit is looked up by id
//! at dispatch time.

use cs_core::ShapeId;
use glam::{DVec2, DVec3};
use serde::Serialize;

/// Pickable geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Circle {
        center: DVec3,
        radius: f64,
    },
    Polygon {
        vertices: Vec<DVec2>,
    },
    /// Band around a center line; left/right relative to walking direction.
    #[serde(rename_all = "camelCase")]
    Path {
        centerline: Vec<DVec3>,
        max_distance_left: f64,
        max_distance_right: f64,
    },
    Everywhere,
}

/// CSS cursor hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
    Crosshair,
    ColResize,
    EwResize,
}

impl Cursor {
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
            Cursor::Crosshair => "crosshair",
            Cursor::ColResize => "col-resize",
            Cursor::EwResize => "ew-resize",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveShape {
    pub id: ShapeId,
    pub shape: Shape,
    /// Higher is checked first.
    pub z_index: i32,
    pub cursor_hover: Cursor,
    pub cursor_active: Cursor,
}

impl InteractiveShape {
    pub fn new(id: ShapeId, shape: Shape, z_index: i32) -> Self {
        Self {
            id,
            shape,
            z_index,
            cursor_hover: Cursor::Pointer,
            cursor_active: Cursor::Pointer,
        }
    }

    pub fn with_cursors(mut self, hover: Cursor, active: Cursor) -> Self {
        self.cursor_hover = hover;
        self.cursor_active = active;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_serialize_with_type_tag() {
        let shape = InteractiveShape::new(
            ShapeId::intern("road:split"),
            Shape::Path {
                centerline: vec![DVec3::ZERO, DVec3::X],
                max_distance_left: 1.0,
                max_distance_right: 2.0,
            },
            3,
        )
        .with_cursors(Cursor::ColResize, Cursor::ColResize);
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["id"], "road:split");
        assert_eq!(json["zIndex"], 3);
        assert_eq!(json["cursorHover"], "col-resize");
        assert_eq!(json["shape"]["type"], "path");
        assert_eq!(json["shape"]["maxDistanceRight"], 2.0);
    }

    #[test]
    fn everywhere_serializes_as_bare_tag() {
        let json = serde_json::to_string(&Shape::Everywhere).unwrap();
        assert_eq!(json, r#"{"type":"everywhere"}"#);
    }
}
