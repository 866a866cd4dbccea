//! Builds the interactive shape set from the planning mirror.
//!
//! Called before every pointer event and every frame. Ids are derived from
//! gesture ids so a rebuilt shape keeps its identity.

use crate::handlers::ShapeRole;
use crate::planning::PlanningState;
use cs_core::{GestureId, PlanningMode, PlanningSettings, RoadInfo, ShapeId};
use cs_pick::{Cursor, InteractiveShape, Shape};
use glam::DVec2;
use std::collections::HashMap;

pub const CANVAS_SHAPE_ID: &str = "planning-canvas";

const Z_CONTROL_POINT: i32 = 5;
const Z_CONTROL_POINT_WHILE_DRAWING: i32 = 0;
const Z_INSERT: i32 = 4;
const Z_SPLIT: i32 = 3;
const Z_CHANGE_LANES: i32 = 2;
const Z_CANVAS: i32 = 1;

/// Shapes plus the role each id plays.
#[derive(Debug, Clone, Default)]
pub struct ShapeSet {
    pub shapes: Vec<InteractiveShape>,
    roles: HashMap<ShapeId, ShapeRole>,
}

impl ShapeSet {
    pub fn push(&mut self, shape: InteractiveShape, role: ShapeRole) {
        self.roles.insert(shape.id, role);
        self.shapes.push(shape);
    }

    pub fn role(&self, id: ShapeId) -> Option<&ShapeRole> {
        self.roles.get(&id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

pub fn build_shapes(state: &PlanningState, settings: &PlanningSettings) -> ShapeSet {
    let mut set = ShapeSet::default();
    if state.current_project.is_none() || state.mode == PlanningMode::Off {
        return set;
    }
    let drawing = state.canvas.is_drawing();

    for displayed in state.gestures_for_display() {
        if !state.mode.is_relevant(&displayed.gesture.intent) {
            continue;
        }
        push_control_points(&mut set, displayed.id, &displayed.gesture.points, drawing, settings);
    }

    if state.mode == PlanningMode::Roads && !drawing {
        let mut roads: Vec<(&GestureId, &RoadInfo)> = state.road_infos.iter().collect();
        roads.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        for (gesture, info) in roads {
            push_road_bands(&mut set, *gesture, info, settings);
        }
    }

    set.push(
        InteractiveShape::new(ShapeId::intern(CANVAS_SHAPE_ID), Shape::Everywhere, Z_CANVAS)
            .with_cursors(Cursor::Crosshair, Cursor::Pointer),
        ShapeRole::GestureCanvas,
    );
    set
}

fn push_control_points(
    set: &mut ShapeSet,
    gesture: GestureId,
    points: &[DVec2],
    drawing: bool,
    settings: &PlanningSettings,
) {
    let z = if drawing {
        Z_CONTROL_POINT_WHILE_DRAWING
    } else {
        Z_CONTROL_POINT
    };
    let last = points.len().saturating_sub(1);
    for (index, point) in points.iter().enumerate() {
        let shape = InteractiveShape::new(
            ShapeId::for_gesture(gesture, &format!("point:{index}")),
            Shape::Circle {
                center: point.extend(0.0),
                radius: settings.control_point_radius,
            },
            z,
        )
        .with_cursors(Cursor::Grab, Cursor::Grabbing);
        set.push(
            shape,
            ShapeRole::ControlPoint {
                gesture,
                index,
                is_first: index == 0,
                is_last: index == last,
            },
        );
    }
}

fn push_road_bands(
    set: &mut ShapeSet,
    gesture: GestureId,
    info: &RoadInfo,
    settings: &PlanningSettings,
) {
    let centerline: Vec<_> = info.center_line.iter().map(|p| p.extend(0.0)).collect();
    let left = settings.lane_width * f64::from(info.n_lanes_backward);
    let right = settings.lane_width * f64::from(info.n_lanes_forward);
    let band = |left: f64, right: f64| Shape::Path {
        centerline: centerline.clone(),
        max_distance_left: left,
        max_distance_right: right,
    };

    let insert = settings.insert_band_half_width;
    set.push(
        InteractiveShape::new(
            ShapeId::for_gesture(gesture, "insert"),
            band(insert, insert),
            Z_INSERT,
        )
        .with_cursors(Cursor::Pointer, Cursor::Grabbing),
        ShapeRole::InsertPoint { gesture },
    );

    set.push(
        InteractiveShape::new(ShapeId::for_gesture(gesture, "split"), band(left, right), Z_SPLIT)
            .with_cursors(Cursor::ColResize, Cursor::ColResize),
        ShapeRole::SplitPoint { gesture },
    );

    let margin = settings.change_lanes_margin;
    set.push(
        InteractiveShape::new(
            ShapeId::for_gesture(gesture, "lanes"),
            band(left + margin, right + margin),
            Z_CHANGE_LANES,
        )
        .with_cursors(Cursor::EwResize, Cursor::EwResize),
        ShapeRole::ChangeLanes {
            gesture,
            n_lanes_forward: info.n_lanes_forward,
            n_lanes_backward: info.n_lanes_backward,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_core::{Gesture, Intent, LandUse, ProjectId};
    use pretty_assertions::assert_eq;

    fn ids(set: &ShapeSet) -> Vec<&str> {
        set.shapes.iter().map(|s| s.id.as_str()).collect()
    }

    fn roads_state() -> PlanningState {
        let road = GestureId::intern("shp-road");
        let zone = GestureId::intern("shp-zone");
        let mut state = PlanningState::new();
        state.master.insert(
            road,
            Gesture::new(
                Intent::Road {
                    n_lanes_forward: 2,
                    n_lanes_backward: 1,
                },
                vec![DVec2::ZERO, DVec2::new(10.0, 0.0), DVec2::new(20.0, 0.0)],
            ),
        );
        state.master.insert(
            zone,
            Gesture::new(
                Intent::Zone {
                    land_use: LandUse::Residential,
                },
                vec![DVec2::ZERO],
            ),
        );
        state.road_infos.insert(
            road,
            RoadInfo {
                center_line: vec![DVec2::ZERO, DVec2::new(20.0, 0.0)],
                n_lanes_forward: 2,
                n_lanes_backward: 1,
            },
        );
        state.set_current_project(Some(ProjectId::intern("shp-p")));
        state.set_mode(PlanningMode::Roads);
        state
    }

    #[test]
    fn nothing_without_project_or_mode() {
        let mut state = roads_state();
        state.set_mode(PlanningMode::Off);
        assert!(build_shapes(&state, &PlanningSettings::default()).is_empty());

        let mut state = roads_state();
        state.set_current_project(None);
        assert!(build_shapes(&state, &PlanningSettings::default()).is_empty());
    }

    #[test]
    fn roads_mode_builds_points_bands_and_canvas() {
        let state = roads_state();
        let set = build_shapes(&state, &PlanningSettings::default());
        assert_eq!(
            ids(&set),
            vec![
                "shp-road:point:0",
                "shp-road:point:1",
                "shp-road:point:2",
                "shp-road:insert",
                "shp-road:split",
                "shp-road:lanes",
                "planning-canvas",
            ]
        );
        assert_eq!(
            set.role(ShapeId::intern("shp-road:point:2")),
            Some(&ShapeRole::ControlPoint {
                gesture: GestureId::intern("shp-road"),
                index: 2,
                is_first: false,
                is_last: true,
            })
        );
    }

    #[test]
    fn split_band_spans_the_lanes() {
        let settings = PlanningSettings::default();
        let set = build_shapes(&roads_state(), &settings);
        let split = set
            .shapes
            .iter()
            .find(|s| s.id.as_str() == "shp-road:split")
            .unwrap();
        let Shape::Path {
            max_distance_left,
            max_distance_right,
            ..
        } = &split.shape
        else {
            panic!("split band must be a path");
        };
        assert_eq!(*max_distance_left, settings.lane_width);
        assert_eq!(*max_distance_right, 2.0 * settings.lane_width);
    }

    #[test]
    fn drawing_sinks_points_and_hides_bands() {
        let mut state = roads_state();
        state.canvas.current_gesture = Some(GestureId::intern("shp-road"));
        let set = build_shapes(&state, &PlanningSettings::default());
        assert_eq!(set.len(), 4);
        assert!(
            set.shapes
                .iter()
                .filter(|s| s.id.as_str().contains(":point:"))
                .all(|s| s.z_index == 0)
        );
    }

    #[test]
    fn zoning_mode_shows_only_zone_points() {
        let mut state = roads_state();
        state.set_mode(PlanningMode::Zoning);
        let set = build_shapes(&state, &PlanningSettings::default());
        assert_eq!(ids(&set), vec!["shp-zone:point:0", "planning-canvas"]);
    }
}
