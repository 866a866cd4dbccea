//! User-tunable settings.
//!
//! Delivered by the host as JSON (camelCase keys). Missing keys fall back to
//! defaults; out-of-range values are clamped rather than rejected.

use crate::error::EditError;
use serde::{Deserialize, Serialize};

/// Spacing between lane centers, in world units.
pub const LANE_DISTANCE: f64 = 0.8 * 3.9;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub planning: PlanningSettings,
    pub camera: CameraSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanningSettings {
    /// A click this close to the previous one finishes the gesture.
    pub finish_gesture_distance: f64,
    /// Dragging an end point less than this counts as a click on it.
    pub move_vs_click_distance: f64,
    /// Width of one lane, used to turn drag offsets into lane counts.
    pub lane_width: f64,
    pub control_point_radius: f64,
    /// Half width of the band around a road center line that inserts points.
    pub insert_band_half_width: f64,
    /// Extra reach of the change-lanes band beyond the outermost lane.
    pub change_lanes_margin: f64,
}

impl Default for PlanningSettings {
    fn default() -> Self {
        Self {
            finish_gesture_distance: 3.0,
            move_vs_click_distance: 3.0,
            lane_width: LANE_DISTANCE,
            control_point_radius: 3.0,
            insert_band_half_width: 2.0,
            change_lanes_margin: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraSettings {
    /// Vertical field of view as a fraction of π.
    pub vertical_fov: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            vertical_fov: 0.3,
            near: 0.1,
            far: 50000.0,
        }
    }
}

impl CameraSettings {
    pub fn vertical_fov_radians(&self) -> f64 {
        self.vertical_fov * std::f64::consts::PI
    }
}

impl Settings {
    /// Parse settings from JSON, clamping every value into its range.
    pub fn from_json(json: &str) -> Result<Self, EditError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| EditError::Settings(e.to_string()))?;
        Ok(settings.clamped())
    }

    pub fn clamped(mut self) -> Self {
        let p = &mut self.planning;
        p.finish_gesture_distance = clamp_or(p.finish_gesture_distance, 0.5, 10.0, 3.0);
        p.move_vs_click_distance = clamp_or(p.move_vs_click_distance, 0.1, 10.0, 3.0);
        p.lane_width = clamp_or(p.lane_width, 0.5, 20.0, LANE_DISTANCE);
        p.control_point_radius = clamp_or(p.control_point_radius, 0.5, 20.0, 3.0);
        p.insert_band_half_width = clamp_or(p.insert_band_half_width, 0.1, 20.0, 2.0);
        p.change_lanes_margin = clamp_or(p.change_lanes_margin, 0.0, 20.0, 2.0);

        let c = &mut self.camera;
        c.vertical_fov = clamp_or(c.vertical_fov, 0.1, 0.9, 0.3);
        c.near = clamp_or(c.near, 1.0e-3, 100.0, 0.1);
        c.far = clamp_or(c.far, c.near * 2.0, 1.0e7, 50000.0);
        self
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        log::warn!("non-finite setting replaced by default {fallback}");
        fallback
    }
}
