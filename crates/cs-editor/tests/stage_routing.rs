//! Integration tests: pointer routing through a full planning session.
//!
//! Pointer positions are given in world units and converted to pixels with
//! the session's own frame, so every sample goes through projection,
//! shape building, hit-testing, and the stage.

use cs_core::{DVec2, DVec3, Gesture, GestureId, Intent, PlanningMode, RoadInfo};
use cs_editor::{
    AuthorityCall, PlanningSession, PlanningUpdate, RecordingAuthority, StageState, TouchPhase,
};
use cs_pick::{Cursor, Viewport};
use pretty_assertions::assert_eq;
use std::collections::HashMap;

const VIEWPORT: Viewport = Viewport {
    width: 1280.0,
    height: 720.0,
};

type Session = PlanningSession<RecordingAuthority>;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pixel(session: &Session, x: f64, y: f64) -> DVec2 {
    session
        .frame()
        .project_world_to_pixel(DVec3::new(x, y, 0.0))
        .expect("point in front of the camera")
}

fn down(session: &mut Session, x: f64, y: f64) -> bool {
    let p = pixel(session, x, y);
    session.pointer_down(p.x, p.y)
}

fn hover(session: &mut Session, x: f64, y: f64) -> bool {
    let p = pixel(session, x, y);
    session.pointer_move(p.x, p.y)
}

fn up(session: &mut Session, x: f64, y: f64) -> bool {
    let p = pixel(session, x, y);
    session.pointer_up(p.x, p.y)
}

/// A road along +X from (0,0) to (40,0), one lane each way.
fn road_session() -> (Session, GestureId) {
    init_logs();
    let road = GestureId::intern("route-road");
    let mut session = PlanningSession::new(RecordingAuthority::new(), VIEWPORT);
    session.start_new_project().unwrap();
    session.set_planning_mode(PlanningMode::Roads);
    session.apply_update(PlanningUpdate::Master {
        gestures: HashMap::from([(
            road,
            Gesture::new(
                Intent::Road {
                    n_lanes_forward: 1,
                    n_lanes_backward: 1,
                },
                vec![DVec2::ZERO, DVec2::new(40.0, 0.0)],
            ),
        )]),
    });
    session.apply_update(PlanningUpdate::RoadInfos {
        infos: HashMap::from([(
            road,
            RoadInfo {
                center_line: vec![DVec2::ZERO, DVec2::new(40.0, 0.0)],
                n_lanes_forward: 1,
                n_lanes_backward: 1,
            },
        )]),
    });
    session.authority_mut().drain();
    (session, road)
}

// ─── Hover ──────────────────────────────────────────────────────────────

#[test]
fn hover_moves_from_lanes_band_to_insert_band() {
    let (mut session, _) = road_session();

    // right of travel, beyond the lanes but inside the margin
    hover(&mut session, 20.0, -4.5);
    assert_eq!(
        session.stage_state(),
        StageState::Hovering(cs_core::ShapeId::intern("route-road:lanes"))
    );
    assert!(session.state().hovered.change_lanes_point.is_some());
    assert_eq!(session.cursor(), Cursor::EwResize);

    // onto the center line: insert band wins over split and lanes bands
    hover(&mut session, 20.0, -1.0);
    assert_eq!(
        session.stage_state(),
        StageState::Hovering(cs_core::ShapeId::intern("route-road:insert"))
    );
    assert!(session.state().hovered.change_lanes_point.is_none());
    let marker = session.state().hovered.insert_point.unwrap();
    assert!((marker - DVec2::new(20.0, 0.0)).length() < 1e-6, "{marker}");
    assert_eq!(session.cursor(), Cursor::Pointer);
}

#[test]
fn control_point_outranks_every_band() {
    let (mut session, road) = road_session();
    hover(&mut session, 40.0, 0.5);
    assert_eq!(session.state().hovered.control_point, Some((road, 1)));
    assert_eq!(session.cursor(), Cursor::Grab);

    hover(&mut session, 80.0, 30.0);
    assert_eq!(session.state().hovered.control_point, None);
    assert_eq!(
        session.stage_state(),
        StageState::Hovering(cs_core::ShapeId::intern("planning-canvas"))
    );
    assert_eq!(session.cursor(), Cursor::Crosshair);
}

// ─── Drag capture ───────────────────────────────────────────────────────

#[test]
fn drag_stays_with_the_captured_shape() {
    let (mut session, road) = road_session();

    assert!(down(&mut session, 0.0, 0.5));
    assert_eq!(session.cursor(), Cursor::Grabbing);

    // over the road body and then far away: still the control point
    hover(&mut session, 20.0, 0.0);
    hover(&mut session, 20.0, 30.0);
    up(&mut session, 20.0, 30.0);

    let calls = session.authority_mut().drain();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| matches!(
        c,
        AuthorityCall::MoveGesturePoint { gesture, index: 0, .. } if *gesture == road
    )));
    assert!(matches!(
        calls[2],
        AuthorityCall::MoveGesturePoint { done: true, .. }
    ));
    assert_eq!(session.stage_state(), StageState::Idle);
    assert_eq!(session.cursor(), Cursor::Default);
}

#[test]
fn press_on_nothing_is_not_consumed() {
    init_logs();
    let mut session = PlanningSession::new(RecordingAuthority::new(), VIEWPORT);
    // no project open: no shapes at all
    assert!(!down(&mut session, 0.0, 0.0));
    assert!(!up(&mut session, 0.0, 0.0));
    assert_eq!(session.stage_state(), StageState::Idle);
}

#[test]
fn touch_drives_the_same_sequence() {
    let (mut session, road) = road_session();
    let start = pixel(&session, 40.0, 0.0);
    let end = pixel(&session, 45.0, 5.0);

    session.touch(TouchPhase::Start, start.x, start.y);
    session.touch(TouchPhase::Move, end.x, end.y);
    session.touch(TouchPhase::End, end.x, end.y);

    let calls = session.authority_mut().drain();
    assert_eq!(calls.len(), 2);
    let AuthorityCall::MoveGesturePoint {
        gesture,
        index,
        position,
        done,
        ..
    } = &calls[1]
    else {
        panic!("unexpected call {:?}", calls[1]);
    };
    assert_eq!((*gesture, *index, *done), (road, 1, true));
    assert!((*position - DVec2::new(45.0, 5.0)).length() < 1e-6);
}

// ─── Shape set changes ──────────────────────────────────────────────────

#[test]
fn switching_mode_drops_capture_and_shapes() {
    let (mut session, _) = road_session();
    down(&mut session, 0.0, 0.0);
    session.set_planning_mode(PlanningMode::Zoning);
    assert_eq!(session.stage_state(), StageState::Idle);
    assert!(!up(&mut session, 0.0, 0.0));
    assert!(session.authority().calls.is_empty());
}

#[test]
fn raced_delete_drops_the_drag_silently() {
    let (mut session, _) = road_session();
    down(&mut session, 40.0, 0.0);
    session.authority_mut().drain();

    // the authority deletes the road while the drag is running
    session.apply_update(PlanningUpdate::Master {
        gestures: HashMap::new(),
    });
    session.apply_update(PlanningUpdate::RoadInfos {
        infos: HashMap::new(),
    });
    hover(&mut session, 45.0, 0.0);
    up(&mut session, 45.0, 0.0);

    assert!(session.authority().calls.is_empty());
    assert_eq!(session.stage_state(), StageState::Idle);
}

#[test]
fn leaving_a_vanished_band_clears_its_marker() {
    let (mut session, _) = road_session();
    hover(&mut session, 20.0, 0.5);
    assert!(session.state().hovered.insert_point.is_some());

    // an undo echo removes the road under the pointer
    session.apply_update(PlanningUpdate::Master {
        gestures: HashMap::new(),
    });
    session.apply_update(PlanningUpdate::RoadInfos {
        infos: HashMap::new(),
    });
    hover(&mut session, 80.0, 30.0);

    assert_eq!(
        session.stage_state(),
        StageState::Hovering(cs_core::ShapeId::intern("planning-canvas"))
    );
    assert_eq!(session.state().hovered.insert_point, None);
    assert!(session.authority().calls.is_empty());
}
