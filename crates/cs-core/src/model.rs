//! Planning data model mirrored from the planning authority.
//!
//! The authority owns gestures and projects; this side keeps a read-through
//! copy for picking and rendering, plus the transient canvas edit mode.

use crate::id::{GestureId, ProjectId};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Land-use category painted by a zone gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandUse {
    Residential,
    Commercial,
    Industrial,
    Agricultural,
    Recreational,
    Administrative,
}

/// What a gesture means to the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    Road {
        n_lanes_forward: u8,
        n_lanes_backward: u8,
    },
    Zone {
        land_use: LandUse,
    },
}

impl Intent {
    pub fn is_road(&self) -> bool {
        matches!(self, Intent::Road { .. })
    }

    pub fn is_zone(&self) -> bool {
        matches!(self, Intent::Zone { .. })
    }
}

/// A user-drawn planning primitive: an intent plus its control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    pub intent: Intent,
    pub points: Vec<DVec2>,
}

impl Gesture {
    pub fn new(intent: Intent, points: Vec<DVec2>) -> Self {
        Self { intent, points }
    }

    /// Copy of this gesture with one control point replaced.
    /// Returns `None` when `index` is out of range.
    pub fn with_point_moved(&self, index: usize, position: DVec2) -> Option<Gesture> {
        if index >= self.points.len() {
            return None;
        }
        let mut moved = self.clone();
        moved.points[index] = position;
        Some(moved)
    }
}

/// One step of a project's history: the gestures touched in that step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStep {
    #[serde(default)]
    pub gestures: HashMap<GestureId, Gesture>,
}

/// An undoable editing session layered over the master plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub undoable_history: Vec<ProjectStep>,
    #[serde(default)]
    pub ongoing: ProjectStep,
}

/// Which kind of planning the user is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlanningMode {
    #[default]
    Off,
    Roads,
    Zoning,
}

impl PlanningMode {
    /// Whether gestures with this intent are editable in this mode.
    pub fn is_relevant(self, intent: &Intent) -> bool {
        match self {
            PlanningMode::Off => false,
            PlanningMode::Roads => intent.is_road(),
            PlanningMode::Zoning => intent.is_zone(),
        }
    }
}

/// Road geometry the authority derives for a road gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadInfo {
    pub center_line: Vec<DVec2>,
    pub n_lanes_forward: u8,
    pub n_lanes_backward: u8,
}

/// Transient state of the free-draw gesture canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasMode {
    /// Intent of new gestures, if the user picked a drawing tool.
    pub intent: Option<Intent>,
    /// Gesture currently being extended.
    pub current_gesture: Option<GestureId>,
    /// Whether new points append (`true`) or prepend.
    pub add_to_end: bool,
    /// Last committed click, for finish detection.
    pub previous_click: Option<DVec3>,
}

impl Default for CanvasMode {
    fn default() -> Self {
        Self {
            intent: None,
            current_gesture: None,
            add_to_end: true,
            previous_click: None,
        }
    }
}

impl CanvasMode {
    /// Drop the gesture being drawn but keep the selected intent.
    pub fn detach_gesture(&mut self) {
        self.current_gesture = None;
        self.previous_click = None;
    }

    pub fn is_drawing(&self) -> bool {
        self.current_gesture.is_some()
    }
}

/// Where gestures in a merged view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOrigin {
    Master,
    Project(ProjectId),
}
