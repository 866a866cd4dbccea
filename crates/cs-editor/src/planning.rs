//! Local mirror of authority-owned planning state.
//!
//! Everything here is a read-through cache: the authority pushes
//! [`PlanningUpdate`]s and each one replaces the cached value it names.
//! Speculative control-point moves are written into the current project's
//! ongoing step and vanish with the next authoritative copy of that project.

use cs_core::{
    CanvasMode, EditError, Gesture, GestureId, GestureOrigin, Intent, PlanningMode, Project,
    ProjectId, RoadInfo,
};
use glam::DVec2;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};

/// A state delivery from the planning authority.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlanningUpdate {
    /// The committed baseline, replaced wholesale.
    Master { gestures: HashMap<GestureId, Gesture> },
    /// One project, replaced wholesale.
    Project { project: ProjectId, data: Project },
    ProjectRemoved { project: ProjectId },
    /// Derived road geometry, replaced wholesale.
    RoadInfos { infos: HashMap<GestureId, RoadInfo> },
}

impl PlanningUpdate {
    pub fn from_json(json: &str) -> Result<Self, EditError> {
        serde_json::from_str(json).map_err(|e| EditError::Update(e.to_string()))
    }
}

/// A point on a center line plus its local tangent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathMarker {
    pub point: DVec2,
    pub direction: DVec2,
}

/// Hover feedback drawn by the renderer, owned by shape handlers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverMarkers {
    pub control_point: Option<(GestureId, usize)>,
    pub insert_point: Option<DVec2>,
    pub split_point: Option<PathMarker>,
    pub change_lanes_point: Option<PathMarker>,
}

/// A gesture as it should currently be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedGesture {
    pub id: GestureId,
    pub origin: GestureOrigin,
    pub gesture: Gesture,
}

#[derive(Debug, Clone, Default)]
pub struct PlanningState {
    pub mode: PlanningMode,
    pub master: HashMap<GestureId, Gesture>,
    pub projects: HashMap<ProjectId, Project>,
    pub road_infos: HashMap<GestureId, RoadInfo>,
    pub current_project: Option<ProjectId>,
    pub canvas: CanvasMode,
    pub hovered: HoverMarkers,
    speculative: HashSet<(ProjectId, GestureId)>,
    /// Gesture under construction that some delivery has already contained.
    echoed: Option<GestureId>,
}

impl PlanningState {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Authority deliveries ────────────────────────────────────────────

    pub fn apply_update(&mut self, update: PlanningUpdate) {
        match update {
            PlanningUpdate::Master { gestures } => {
                log::debug!("master plan updated: {} gestures", gestures.len());
                self.master = gestures;
            }
            PlanningUpdate::Project { project, data } => {
                self.speculative.retain(|(p, _)| *p != project);
                self.projects.insert(project, data);
                if self.current_project == Some(project) {
                    self.validate_canvas();
                }
            }
            PlanningUpdate::ProjectRemoved { project } => {
                self.speculative.retain(|(p, _)| *p != project);
                self.projects.remove(&project);
                if self.current_project == Some(project) {
                    log::info!("current project {project} was removed");
                    self.set_current_project(None);
                }
            }
            PlanningUpdate::RoadInfos { infos } => {
                self.road_infos = infos;
            }
        }
    }

    /// Drop the gesture being drawn if the authority knew it once and no
    /// longer does, e.g. after an undo removed it. A delivery that predates
    /// the gesture's creation leaves it alone.
    fn validate_canvas(&mut self) {
        let (Some(project), Some(gesture)) = (self.current_project, self.canvas.current_gesture)
        else {
            return;
        };
        if self.latest_gesture(project, gesture).is_some() {
            self.echoed = Some(gesture);
        } else if self.echoed == Some(gesture) {
            log::info!("gesture {gesture} disappeared from project {project}; stop drawing");
            self.echoed = None;
            self.canvas.detach_gesture();
        } else {
            log::debug!("gesture {gesture} not echoed yet; keep drawing");
        }
    }

    /// Record that the authority already knows `gesture`, so a later
    /// delivery without it means it was removed.
    pub(crate) fn mark_echoed(&mut self, gesture: GestureId) {
        self.echoed = Some(gesture);
    }

    // ─── Local UI state ──────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: PlanningMode) {
        if self.mode != mode {
            self.mode = mode;
            self.canvas = CanvasMode::default();
            self.hovered = HoverMarkers::default();
        }
    }

    pub fn set_current_project(&mut self, project: Option<ProjectId>) {
        if self.current_project != project {
            self.current_project = project;
            self.canvas = CanvasMode::default();
            self.hovered = HoverMarkers::default();
        }
    }

    /// Pick the intent of new gestures. Stops drawing the current one.
    pub fn set_intent(&mut self, intent: Option<Intent>) {
        self.canvas.intent = intent;
        self.canvas.detach_gesture();
    }

    // ─── Lookups ─────────────────────────────────────────────────────────

    /// The gesture's state as of the project's most recent history step that
    /// mentions it, falling back to the master plan.
    pub fn gesture_as_of(&self, project: ProjectId, gesture: GestureId) -> Option<&Gesture> {
        self.projects
            .get(&project)
            .and_then(|p| {
                p.undoable_history
                    .iter()
                    .rev()
                    .find_map(|step| step.gestures.get(&gesture))
            })
            .or_else(|| self.master.get(&gesture))
    }

    /// Like [`gesture_as_of`](Self::gesture_as_of), but the project's
    /// ongoing step wins over its history.
    pub fn latest_gesture(&self, project: ProjectId, gesture: GestureId) -> Option<&Gesture> {
        self.projects
            .get(&project)
            .and_then(|p| p.ongoing.gestures.get(&gesture))
            .or_else(|| self.gesture_as_of(project, gesture))
    }

    pub fn is_speculative(&self, project: ProjectId, gesture: GestureId) -> bool {
        self.speculative.contains(&(project, gesture))
    }

    /// Master gestures overlaid with the current project's history and then
    /// its ongoing step, sorted by id.
    pub fn gestures_for_display(&self) -> Vec<DisplayedGesture> {
        let mut merged: HashMap<GestureId, (GestureOrigin, &Gesture)> = self
            .master
            .iter()
            .map(|(id, g)| (*id, (GestureOrigin::Master, g)))
            .collect();

        if let Some(project_id) = self.current_project
            && let Some(project) = self.projects.get(&project_id)
        {
            let steps = project
                .undoable_history
                .iter()
                .chain(std::iter::once(&project.ongoing));
            for step in steps {
                for (id, g) in &step.gestures {
                    merged.insert(*id, (GestureOrigin::Project(project_id), g));
                }
            }
        }

        let mut out: Vec<DisplayedGesture> = merged
            .into_iter()
            .map(|(id, (origin, gesture))| DisplayedGesture {
                id,
                origin,
                gesture: gesture.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        out
    }

    // ─── Speculation ─────────────────────────────────────────────────────

    /// Move a control point locally ahead of the authority's echo.
    pub fn speculate_point_move(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        index: usize,
        position: DVec2,
    ) -> Result<(), EditError> {
        let base = self
            .gesture_as_of(project, gesture)
            .ok_or(EditError::UnknownGesture { project, gesture })?;
        let moved = base
            .with_point_moved(index, position)
            .ok_or(EditError::PointOutOfRange { gesture, index })?;

        self.projects
            .entry(project)
            .or_default()
            .ongoing
            .gestures
            .insert(gesture, moved);
        self.speculative.insert((project, gesture));
        Ok(())
    }
}
