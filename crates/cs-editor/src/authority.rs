//! The planning authority: the external owner of gestures and projects.
//!
//! Calls are fire-and-forget. Results come back later as
//! [`PlanningUpdate`](crate::planning::PlanningUpdate)s; the `Result` here
//! only reports whether the call could be delivered.

use cs_core::{DVec2, EditError, GestureId, Intent, ProjectId};
use cs_pick::PickGeometry;

pub type AuthorityResult = Result<(), EditError>;

/// Operations the edit protocol forwards to the authority.
///
/// The authority also answers geometric pick queries; the provided
/// [`PickGeometry`] methods compute them locally.
pub trait PlanningAuthority: PickGeometry {
    fn start_new_project(&mut self, project: ProjectId) -> AuthorityResult;

    fn implement_project(&mut self, project: ProjectId) -> AuthorityResult;

    fn undo(&mut self, project: ProjectId) -> AuthorityResult;

    fn redo(&mut self, project: ProjectId) -> AuthorityResult;

    fn start_new_gesture(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        intent: &Intent,
        start: DVec2,
    ) -> AuthorityResult;

    fn add_control_point(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        add_to_end: bool,
        done: bool,
    ) -> AuthorityResult;

    fn move_gesture_point(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        index: usize,
        position: DVec2,
        done: bool,
    ) -> AuthorityResult;

    fn insert_control_point(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        done: bool,
    ) -> AuthorityResult;

    fn split_gesture(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        done: bool,
    ) -> AuthorityResult;

    fn set_n_lanes(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        n_lanes_forward: u8,
        n_lanes_backward: u8,
        done: bool,
    ) -> AuthorityResult;

    fn finish_gesture(&mut self, project: ProjectId, gesture: GestureId) -> AuthorityResult;
}

// ─── Recording authority ─────────────────────────────────────────────────

/// One call received by a [`RecordingAuthority`].
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorityCall {
    StartNewProject(ProjectId),
    ImplementProject(ProjectId),
    Undo(ProjectId),
    Redo(ProjectId),
    StartNewGesture {
        project: ProjectId,
        gesture: GestureId,
        intent: Intent,
        start: DVec2,
    },
    AddControlPoint {
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        add_to_end: bool,
        done: bool,
    },
    MoveGesturePoint {
        project: ProjectId,
        gesture: GestureId,
        index: usize,
        position: DVec2,
        done: bool,
    },
    InsertControlPoint {
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        done: bool,
    },
    SplitGesture {
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        done: bool,
    },
    SetNLanes {
        project: ProjectId,
        gesture: GestureId,
        n_lanes_forward: u8,
        n_lanes_backward: u8,
        done: bool,
    },
    FinishGesture {
        project: ProjectId,
        gesture: GestureId,
    },
}

/// An in-process authority that only records what it is asked to do.
/// Useful for headless hosts and for tests.
#[derive(Debug, Default)]
pub struct RecordingAuthority {
    pub calls: Vec<AuthorityCall>,
    /// When set, every call fails with this reason and is not recorded.
    pub failure: Option<String>,
}

impl RecordingAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the calls received so far.
    pub fn drain(&mut self) -> Vec<AuthorityCall> {
        std::mem::take(&mut self.calls)
    }

    fn record(&mut self, name: &'static str, call: AuthorityCall) -> AuthorityResult {
        if let Some(reason) = &self.failure {
            return Err(EditError::authority(name, reason.clone()));
        }
        log::trace!("authority <- {call:?}");
        self.calls.push(call);
        Ok(())
    }
}

impl PickGeometry for RecordingAuthority {}

impl PlanningAuthority for RecordingAuthority {
    fn start_new_project(&mut self, project: ProjectId) -> AuthorityResult {
        self.record("start_new_project", AuthorityCall::StartNewProject(project))
    }

    fn implement_project(&mut self, project: ProjectId) -> AuthorityResult {
        self.record("implement_project", AuthorityCall::ImplementProject(project))
    }

    fn undo(&mut self, project: ProjectId) -> AuthorityResult {
        self.record("undo", AuthorityCall::Undo(project))
    }

    fn redo(&mut self, project: ProjectId) -> AuthorityResult {
        self.record("redo", AuthorityCall::Redo(project))
    }

    fn start_new_gesture(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        intent: &Intent,
        start: DVec2,
    ) -> AuthorityResult {
        self.record(
            "start_new_gesture",
            AuthorityCall::StartNewGesture {
                project,
                gesture,
                intent: intent.clone(),
                start,
            },
        )
    }

    fn add_control_point(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        add_to_end: bool,
        done: bool,
    ) -> AuthorityResult {
        self.record(
            "add_control_point",
            AuthorityCall::AddControlPoint {
                project,
                gesture,
                point,
                add_to_end,
                done,
            },
        )
    }

    fn move_gesture_point(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        index: usize,
        position: DVec2,
        done: bool,
    ) -> AuthorityResult {
        self.record(
            "move_gesture_point",
            AuthorityCall::MoveGesturePoint {
                project,
                gesture,
                index,
                position,
                done,
            },
        )
    }

    fn insert_control_point(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        done: bool,
    ) -> AuthorityResult {
        self.record(
            "insert_control_point",
            AuthorityCall::InsertControlPoint {
                project,
                gesture,
                point,
                done,
            },
        )
    }

    fn split_gesture(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        done: bool,
    ) -> AuthorityResult {
        self.record(
            "split_gesture",
            AuthorityCall::SplitGesture {
                project,
                gesture,
                point,
                done,
            },
        )
    }

    fn set_n_lanes(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        n_lanes_forward: u8,
        n_lanes_backward: u8,
        done: bool,
    ) -> AuthorityResult {
        self.record(
            "set_n_lanes",
            AuthorityCall::SetNLanes {
                project,
                gesture,
                n_lanes_forward,
                n_lanes_backward,
                done,
            },
        )
    }

    fn finish_gesture(&mut self, project: ProjectId, gesture: GestureId) -> AuthorityResult {
        self.record(
            "finish_gesture",
            AuthorityCall::FinishGesture { project, gesture },
        )
    }
}
