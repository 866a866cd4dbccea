//! What each kind of planning shape does with the events routed to it.
//!
//! Shapes carry only an id; the role is looked up at dispatch time from the
//! freshly built [`ShapeSet`](crate::shapes::ShapeSet), so a shape rebuilt
//! mid-drag keeps receiving events under the same id.

use crate::planning::PathMarker;
use crate::protocol::{EditContext, lane_counts_from_drag, should_finish};
use crate::stage::{DragPhase, HoverPhase, InteractionEvent};
use cs_core::{EditError, GestureId};
use cs_pick::right_normal;

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeRole {
    /// One editable vertex of a gesture.
    ControlPoint {
        gesture: GestureId,
        index: usize,
        is_first: bool,
        is_last: bool,
    },
    /// Band along a road center line; dragging inserts a point.
    InsertPoint { gesture: GestureId },
    /// Band covering the road's lanes; dragging splits the road.
    SplitPoint { gesture: GestureId },
    /// Band just beyond the outer lanes; dragging changes lane counts.
    ChangeLanes {
        gesture: GestureId,
        n_lanes_forward: u8,
        n_lanes_backward: u8,
    },
    /// Catch-all for drawing new gestures.
    GestureCanvas,
}

/// Apply one routed event.
pub fn handle(
    role: &ShapeRole,
    event: &InteractionEvent,
    ctx: &mut EditContext<'_>,
) -> Result<(), EditError> {
    match role {
        ShapeRole::ControlPoint {
            gesture,
            index,
            is_first,
            is_last,
        } => control_point(*gesture, *index, *is_first, *is_last, event, ctx),
        ShapeRole::InsertPoint { gesture } => insert_point(*gesture, event, ctx),
        ShapeRole::SplitPoint { gesture } => split_point(*gesture, event, ctx),
        ShapeRole::ChangeLanes {
            gesture,
            n_lanes_forward,
            n_lanes_backward,
        } => change_lanes(*gesture, (*n_lanes_forward, *n_lanes_backward), event, ctx),
        ShapeRole::GestureCanvas => canvas(event, ctx),
    }
}

// ─── Control points ──────────────────────────────────────────────────────

fn control_point(
    gesture: GestureId,
    index: usize,
    is_first: bool,
    is_last: bool,
    event: &InteractionEvent,
    ctx: &mut EditContext<'_>,
) -> Result<(), EditError> {
    match *event {
        InteractionEvent::Hover { phase, .. } => {
            let hovered = &mut ctx.state.hovered;
            match phase {
                HoverPhase::Start => {
                    hovered.control_point = Some((gesture, index));
                    hovered.insert_point = None;
                }
                HoverPhase::End => hovered.control_point = None,
                HoverPhase::Now => {}
            }
            Ok(())
        }
        InteractionEvent::Drag { anchor, phase } => match phase {
            DragPhase::Start => Ok(()),
            DragPhase::Now(position) => ctx.move_control_point(gesture, index, position, false),
            DragPhase::End(position) => {
                let is_end = is_first || is_last;
                if is_end && position.distance(anchor.start) < ctx.settings.move_vs_click_distance
                {
                    // a click on an end point resumes drawing from that end
                    ctx.continue_gesture(gesture, is_last, position)
                } else {
                    ctx.move_control_point(gesture, index, position, true)
                }
            }
        },
    }
}

// ─── Road bands ──────────────────────────────────────────────────────────

fn insert_point(
    gesture: GestureId,
    event: &InteractionEvent,
    ctx: &mut EditContext<'_>,
) -> Result<(), EditError> {
    match *event {
        InteractionEvent::Hover {
            phase, projected, ..
        } => {
            ctx.state.hovered.insert_point = match phase {
                HoverPhase::Start | HoverPhase::Now => Some(projected.truncate()),
                HoverPhase::End => None,
            };
            Ok(())
        }
        InteractionEvent::Drag { phase, .. } => match phase {
            DragPhase::Start => Ok(()),
            DragPhase::Now(p) => ctx.insert_control_point(gesture, p, false),
            DragPhase::End(p) => ctx.insert_control_point(gesture, p, true),
        },
    }
}

fn split_point(
    gesture: GestureId,
    event: &InteractionEvent,
    ctx: &mut EditContext<'_>,
) -> Result<(), EditError> {
    match *event {
        InteractionEvent::Hover {
            phase,
            projected,
            direction,
            ..
        } => {
            ctx.state.hovered.split_point = match (phase, direction) {
                (HoverPhase::Start | HoverPhase::Now, Some(direction)) => Some(PathMarker {
                    point: projected.truncate(),
                    direction,
                }),
                _ => None,
            };
            Ok(())
        }
        InteractionEvent::Drag { phase, .. } => match phase {
            DragPhase::Start => Ok(()),
            DragPhase::Now(p) => ctx.split_gesture(gesture, p, false),
            DragPhase::End(p) => ctx.split_gesture(gesture, p, true),
        },
    }
}

fn change_lanes(
    gesture: GestureId,
    current: (u8, u8),
    event: &InteractionEvent,
    ctx: &mut EditContext<'_>,
) -> Result<(), EditError> {
    let lane_width = ctx.settings.lane_width;
    match *event {
        InteractionEvent::Hover {
            phase,
            point,
            projected,
            direction,
        } => {
            ctx.state.hovered.change_lanes_point = match (phase, direction) {
                (HoverPhase::Start | HoverPhase::Now, Some(direction)) => {
                    // sit on the outer edge of the side being hovered
                    let right = right_normal(direction);
                    let projected = projected.truncate();
                    let offset = (point.truncate() - projected).dot(right);
                    let (forward, backward) = current;
                    let edge = if offset > 0.0 {
                        projected + right * (lane_width * f64::from(forward))
                    } else {
                        projected - right * (lane_width * f64::from(backward))
                    };
                    Some(PathMarker {
                        point: edge,
                        direction,
                    })
                }
                _ => None,
            };
            Ok(())
        }
        InteractionEvent::Drag { anchor, phase } => {
            let (position, done) = match phase {
                DragPhase::Start => return Ok(()),
                DragPhase::Now(p) => (p, false),
                DragPhase::End(p) => (p, true),
            };
            let Some(direction) = anchor.direction else {
                log::debug!("change-lanes drag on {gesture} has no path direction");
                return Ok(());
            };
            let (forward, backward) = lane_counts_from_drag(
                position.truncate(),
                anchor.projected.truncate(),
                direction,
                current,
                lane_width,
            );
            ctx.set_lane_count(gesture, forward, backward, done)
        }
    }
}

// ─── Gesture canvas ──────────────────────────────────────────────────────

fn canvas(event: &InteractionEvent, ctx: &mut EditContext<'_>) -> Result<(), EditError> {
    match *event {
        InteractionEvent::Hover {
            phase: HoverPhase::Now,
            point,
            ..
        } if ctx.state.canvas.is_drawing() => ctx.add_control_point(point, false),
        InteractionEvent::Hover { .. } => Ok(()),
        InteractionEvent::Drag {
            phase: DragPhase::End(click),
            ..
        } => {
            if ctx.state.canvas.is_drawing() {
                let finish_distance = ctx.settings.finish_gesture_distance;
                if should_finish(ctx.state.canvas.previous_click, click, finish_distance) {
                    ctx.finish_gesture()
                } else {
                    ctx.add_control_point(click, true)
                }
            } else if ctx.state.canvas.intent.is_some() {
                ctx.start_gesture(click).map(|_| ())
            } else {
                Ok(())
            }
        }
        InteractionEvent::Drag { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::{AuthorityCall, RecordingAuthority};
    use crate::planning::PlanningState;
    use crate::stage::DragAnchor;
    use cs_core::{PlanningSettings, ProjectId};
    use glam::{DVec2, DVec3};
    use pretty_assertions::assert_eq;

    fn hover(phase: HoverPhase, point: DVec3, projected: DVec3) -> InteractionEvent {
        InteractionEvent::Hover {
            phase,
            point,
            projected,
            direction: Some(DVec2::X),
        }
    }

    #[test]
    fn insert_marker_follows_hover() {
        let mut state = PlanningState::new();
        let mut authority = RecordingAuthority::new();
        let settings = PlanningSettings::default();
        let mut ctx = EditContext::new(&mut state, &mut authority, &settings);
        let role = ShapeRole::InsertPoint {
            gesture: GestureId::intern("hand-g1"),
        };

        let p = DVec3::new(4.0, 1.0, 0.0);
        let on_line = DVec3::new(4.0, 0.0, 0.0);
        handle(&role, &hover(HoverPhase::Start, p, on_line), &mut ctx).unwrap();
        assert_eq!(ctx.state.hovered.insert_point, Some(DVec2::new(4.0, 0.0)));
        handle(&role, &hover(HoverPhase::End, p, p), &mut ctx).unwrap();
        assert_eq!(ctx.state.hovered.insert_point, None);
    }

    #[test]
    fn change_lanes_marker_sits_on_the_hovered_edge() {
        let mut state = PlanningState::new();
        let mut authority = RecordingAuthority::new();
        let settings = PlanningSettings::default();
        let mut ctx = EditContext::new(&mut state, &mut authority, &settings);
        let role = ShapeRole::ChangeLanes {
            gesture: GestureId::intern("hand-g2"),
            n_lanes_forward: 2,
            n_lanes_backward: 1,
        };

        // right of +X travel is -Y
        let on_line = DVec3::new(5.0, 0.0, 0.0);
        handle(
            &role,
            &hover(HoverPhase::Now, DVec3::new(5.0, -8.0, 0.0), on_line),
            &mut ctx,
        )
        .unwrap();
        let marker = ctx.state.hovered.change_lanes_point.unwrap();
        assert!((marker.point - DVec2::new(5.0, -2.0 * settings.lane_width)).length() < 1e-9);

        handle(
            &role,
            &hover(HoverPhase::Now, DVec3::new(5.0, 8.0, 0.0), on_line),
            &mut ctx,
        )
        .unwrap();
        let marker = ctx.state.hovered.change_lanes_point.unwrap();
        assert!((marker.point - DVec2::new(5.0, settings.lane_width)).length() < 1e-9);
    }

    #[test]
    fn lane_drag_reports_new_counts() {
        let project = ProjectId::intern("hand-p3");
        let gesture = GestureId::intern("hand-g3");
        let mut state = PlanningState::new();
        state.set_current_project(Some(project));
        let mut authority = RecordingAuthority::new();
        let settings = PlanningSettings::default();
        let mut ctx = EditContext::new(&mut state, &mut authority, &settings);
        let role = ShapeRole::ChangeLanes {
            gesture,
            n_lanes_forward: 1,
            n_lanes_backward: 1,
        };
        let anchor = DragAnchor {
            start: DVec3::new(2.0, -4.0, 0.0),
            projected: DVec3::new(2.0, 0.0, 0.0),
            direction: Some(DVec2::X),
        };

        handle(
            &role,
            &InteractionEvent::Drag {
                anchor,
                phase: DragPhase::End(DVec3::new(2.0, -5.0, 0.0)),
            },
            &mut ctx,
        )
        .unwrap();
        assert_eq!(
            authority.calls,
            vec![AuthorityCall::SetNLanes {
                project,
                gesture,
                n_lanes_forward: 2,
                n_lanes_backward: 1,
                done: true,
            }]
        );
    }

    #[test]
    fn canvas_without_intent_ignores_clicks() {
        let mut state = PlanningState::new();
        state.set_current_project(Some(ProjectId::intern("hand-p4")));
        let mut authority = RecordingAuthority::new();
        let settings = PlanningSettings::default();
        let mut ctx = EditContext::new(&mut state, &mut authority, &settings);

        let click = InteractionEvent::Drag {
            anchor: DragAnchor {
                start: DVec3::ZERO,
                projected: DVec3::ZERO,
                direction: None,
            },
            phase: DragPhase::End(DVec3::ZERO),
        };
        handle(&ShapeRole::GestureCanvas, &click, &mut ctx).unwrap();
        assert!(authority.calls.is_empty());
    }
}
