//! Planning edit protocol.
//!
//! Each operation forwards to the authority and applies whatever local
//! bookkeeping makes the UI reflect the edit before the echo arrives.
//! Local state is only touched after the authority accepted the call.

use crate::authority::PlanningAuthority;
use crate::planning::PlanningState;
use cs_core::{EditError, GestureId, PlanningSettings, ProjectId};
use cs_pick::right_normal;
use glam::{DVec2, DVec3};

/// Whether a click at `click` finishes the gesture instead of extending it.
pub fn should_finish(previous_click: Option<DVec3>, click: DVec3, finish_distance: f64) -> bool {
    previous_click.is_some_and(|prev| prev.distance(click) < finish_distance)
}

/// Lane counts after dragging the change-lanes band to `position`.
///
/// The signed offset of `position` from the anchor's projected center-line
/// point (positive is right of travel) sets the forward count; a negative
/// offset sets the backward count. The other side is left alone.
pub fn lane_counts_from_drag(
    position: DVec2,
    projected: DVec2,
    direction: DVec2,
    current: (u8, u8),
    lane_width: f64,
) -> (u8, u8) {
    let offset = (position - projected).dot(right_normal(direction));
    let lanes = (offset.abs() / lane_width).round().clamp(0.0, u8::MAX as f64) as u8;
    let (forward, backward) = current;
    if offset > 0.0 {
        (lanes, backward)
    } else {
        (forward, lanes)
    }
}

/// Everything an edit needs: the mirror, the authority, and the tunables.
pub struct EditContext<'a> {
    pub state: &'a mut PlanningState,
    pub authority: &'a mut dyn PlanningAuthority,
    pub settings: &'a PlanningSettings,
}

impl<'a> EditContext<'a> {
    pub fn new(
        state: &'a mut PlanningState,
        authority: &'a mut dyn PlanningAuthority,
        settings: &'a PlanningSettings,
    ) -> Self {
        Self {
            state,
            authority,
            settings,
        }
    }

    fn project(&self) -> Result<ProjectId, EditError> {
        self.state
            .current_project
            .ok_or(EditError::NoCurrentProject)
    }

    fn active_gesture(&self) -> Result<GestureId, EditError> {
        self.state
            .canvas
            .current_gesture
            .ok_or(EditError::NoActiveGesture)
    }

    // ─── Projects ────────────────────────────────────────────────────────

    pub fn start_new_project(&mut self) -> Result<ProjectId, EditError> {
        let project = ProjectId::generate();
        self.authority.start_new_project(project)?;
        self.state.set_current_project(Some(project));
        log::info!("started project {project}");
        Ok(project)
    }

    pub fn implement_project(&mut self) -> Result<(), EditError> {
        let project = self.project()?;
        self.authority.implement_project(project)?;
        self.state.set_current_project(None);
        log::info!("implemented project {project}");
        Ok(())
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        let project = self.project()?;
        self.authority.undo(project)
    }

    pub fn redo(&mut self) -> Result<(), EditError> {
        let project = self.project()?;
        self.authority.redo(project)
    }

    // ─── Drawing ─────────────────────────────────────────────────────────

    /// Begin a new gesture with the selected intent at `start`.
    pub fn start_gesture(&mut self, start: DVec3) -> Result<GestureId, EditError> {
        let project = self.project()?;
        let intent = self.state.canvas.intent.clone().ok_or(EditError::NoIntent)?;
        let gesture = GestureId::generate();

        self.authority
            .start_new_gesture(project, gesture, &intent, start.truncate())?;

        let canvas = &mut self.state.canvas;
        canvas.current_gesture = Some(gesture);
        canvas.add_to_end = true;
        canvas.previous_click = Some(start);
        log::debug!("started gesture {gesture} with {intent:?}");
        Ok(gesture)
    }

    /// Extend the gesture being drawn. A `done` point is a committed click;
    /// the rest are rubber-band previews.
    pub fn add_control_point(&mut self, point: DVec3, done: bool) -> Result<(), EditError> {
        let project = self.project()?;
        let gesture = self.active_gesture()?;
        if self.state.latest_gesture(project, gesture).is_none() {
            log::debug!("gesture {gesture} not echoed yet; sending point anyway");
        }

        let add_to_end = self.state.canvas.add_to_end;
        self.authority
            .add_control_point(project, gesture, point.truncate(), add_to_end, done)?;

        if done {
            self.state.canvas.previous_click = Some(point);
        }
        Ok(())
    }

    /// Resume drawing an existing gesture from one of its ends.
    pub fn continue_gesture(
        &mut self,
        gesture: GestureId,
        add_to_end: bool,
        click: DVec3,
    ) -> Result<(), EditError> {
        let project = self.project()?;
        if self.state.latest_gesture(project, gesture).is_none() {
            return Err(EditError::UnknownGesture { project, gesture });
        }
        self.state.mark_echoed(gesture);
        let canvas = &mut self.state.canvas;
        canvas.current_gesture = Some(gesture);
        canvas.add_to_end = add_to_end;
        canvas.previous_click = Some(click);
        log::debug!("continuing gesture {gesture} at its {}", if add_to_end { "end" } else { "start" });
        Ok(())
    }

    pub fn finish_gesture(&mut self) -> Result<(), EditError> {
        let project = self.project()?;
        let gesture = self.active_gesture()?;
        self.authority.finish_gesture(project, gesture)?;
        self.state.canvas.detach_gesture();
        log::debug!("finished gesture {gesture}");
        Ok(())
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    /// Move one control point. The cached copy follows immediately; when the
    /// gesture can't be resolved the move is dropped without a call.
    pub fn move_control_point(
        &mut self,
        gesture: GestureId,
        index: usize,
        position: DVec3,
        done: bool,
    ) -> Result<(), EditError> {
        let project = self.project()?;
        let position = position.truncate();
        // resolve before calling out, so a raced undo turns into a no-op
        let known = self
            .state
            .gesture_as_of(project, gesture)
            .ok_or(EditError::UnknownGesture { project, gesture })?;
        if index >= known.points.len() {
            return Err(EditError::PointOutOfRange { gesture, index });
        }

        self.authority
            .move_gesture_point(project, gesture, index, position, done)?;
        self.state
            .speculate_point_move(project, gesture, index, position)
    }

    pub fn insert_control_point(
        &mut self,
        gesture: GestureId,
        point: DVec3,
        done: bool,
    ) -> Result<(), EditError> {
        let project = self.project()?;
        self.authority
            .insert_control_point(project, gesture, point.truncate(), done)?;
        self.state.hovered.insert_point = None;
        Ok(())
    }

    pub fn split_gesture(
        &mut self,
        gesture: GestureId,
        point: DVec3,
        done: bool,
    ) -> Result<(), EditError> {
        let project = self.project()?;
        self.authority
            .split_gesture(project, gesture, point.truncate(), done)?;
        self.state.hovered.split_point = None;
        Ok(())
    }

    pub fn set_lane_count(
        &mut self,
        gesture: GestureId,
        n_lanes_forward: u8,
        n_lanes_backward: u8,
        done: bool,
    ) -> Result<(), EditError> {
        let project = self.project()?;
        self.authority
            .set_n_lanes(project, gesture, n_lanes_forward, n_lanes_backward, done)?;
        self.state.hovered.change_lanes_point = None;
        Ok(())
    }
}
