//! WASM bridge for CityStage: exposes the planning session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The page owns rendering and
//! the simulation; it feeds pointer input and authority updates in, and
//! reads shapes, markers, and the cursor back out.

mod authority;
mod console;

use authority::JsAuthority;
use cs_core::{DVec2, DVec3, GestureOrigin, Intent, PlanningMode, ProjectId, Settings};
use cs_editor::{Modifiers, PlanningSession, PlanningUpdate, ShortcutAction, TouchPhase};
use cs_pick::{CameraParams, OrbitCamera, Viewport};
use serde_json::json;
use wasm_bindgen::prelude::*;

/// The main WASM-facing planning controller.
///
/// Holds the session and its JS-backed authority. All interaction from the
/// page goes through this struct.
#[wasm_bindgen]
pub struct PlanningCanvas {
    session: PlanningSession<JsAuthority>,
}

#[wasm_bindgen]
impl PlanningCanvas {
    /// Create a controller for a drawing surface of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console::console_error_panic_hook_setup();
        console::init_logging(log::LevelFilter::Info);

        Self {
            session: PlanningSession::new(JsAuthority, Viewport { width, height }),
        }
    }

    /// `"off" | "error" | "warn" | "info" | "debug" | "trace"`.
    pub fn set_log_level(&self, level: &str) {
        console::init_logging(console::level_from_name(level));
    }

    // ─── Settings & camera ───────────────────────────────────────────────

    /// Replace settings from JSON. Returns `false` if the JSON is invalid.
    pub fn set_settings_json(&mut self, json: &str) -> bool {
        match Settings::from_json(json) {
            Ok(settings) => {
                self.session.set_settings(settings);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    pub fn get_settings_json(&self) -> String {
        serde_json::to_string(self.session.settings()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.resize(Viewport { width, height });
    }

    /// Set the camera from an explicit eye and target.
    /// `vertical_fov` is in radians.
    #[allow(clippy::too_many_arguments)]
    pub fn set_camera(
        &mut self,
        eye_x: f64,
        eye_y: f64,
        eye_z: f64,
        target_x: f64,
        target_y: f64,
        target_z: f64,
        vertical_fov: f64,
    ) {
        let camera = self.session.settings().camera.clone();
        self.session.set_camera(CameraParams {
            eye: DVec3::new(eye_x, eye_y, eye_z),
            target: DVec3::new(target_x, target_y, target_z),
            vertical_fov,
            near: camera.near,
            far: camera.far,
        });
    }

    /// Set the camera as an orbit around a ground target.
    pub fn set_orbit(
        &mut self,
        target_x: f64,
        target_y: f64,
        heading: f64,
        pitch: f64,
        distance: f64,
    ) {
        self.session.set_orbit(&OrbitCamera {
            target: DVec3::new(target_x, target_y, 0.0),
            heading,
            pitch,
            distance,
        });
    }

    /// Call once per animation frame, before drawing.
    pub fn render_frame(&mut self) {
        self.session.render_frame();
    }

    /// Ground point under a pixel as `[x, y, z]`.
    pub fn project_pixel(&self, x: f64, y: f64) -> Vec<f64> {
        self.session.project(x, y).to_array().to_vec()
    }

    /// Pixel of a world point as `[x, y]`, or `[]` behind the camera.
    pub fn world_to_pixel(&self, x: f64, y: f64, z: f64) -> Vec<f64> {
        self.session
            .frame()
            .project_world_to_pixel(DVec3::new(x, y, z))
            .map(|p| p.to_array().to_vec())
            .unwrap_or_default()
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Returns `true` if a shape received an event.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_down(x, y)
    }

    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_move(x, y)
    }

    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> bool {
        self.session.pointer_up(x, y)
    }

    /// `phase` is `"start" | "move" | "end"`, for the first changed touch.
    pub fn handle_touch(&mut self, phase: &str, x: f64, y: f64) -> bool {
        match touch_phase(phase) {
            Some(phase) => self.session.touch(phase, x, y),
            None => {
                log::warn!("unknown touch phase {phase:?}");
                false
            }
        }
    }

    /// Wheel belongs to the camera; always `false`.
    pub fn handle_wheel(&mut self, dx: f64, dy: f64) -> bool {
        self.session
            .handle_input(&cs_editor::InputEvent::Wheel { dx, dy })
    }

    /// CSS cursor for the current interaction state.
    pub fn get_cursor(&self) -> String {
        self.session.cursor().as_css().to_string()
    }

    // ─── Render data ─────────────────────────────────────────────────────

    /// Current interactive shapes as a JSON array.
    pub fn get_shapes_json(&self) -> String {
        serde_json::to_string(&self.session.shapes().shapes).unwrap_or_else(|_| "[]".to_string())
    }

    /// Gestures to draw, master overlaid with the open project.
    pub fn get_gestures_json(&self) -> String {
        let gestures: Vec<serde_json::Value> = self
            .session
            .state()
            .gestures_for_display()
            .into_iter()
            .map(|d| {
                json!({
                    "id": d.id,
                    "fromMaster": d.origin == GestureOrigin::Master,
                    "intent": d.gesture.intent,
                    "points": d.gesture.points,
                })
            })
            .collect();
        serde_json::Value::Array(gestures).to_string()
    }

    /// Hover feedback markers as JSON.
    pub fn get_hover_markers_json(&self) -> String {
        let hovered = &self.session.state().hovered;
        let marker = |m: Option<cs_editor::PathMarker>| {
            m.map(|m| json!({ "point": m.point, "direction": m.direction }))
        };
        json!({
            "controlPoint": hovered
                .control_point
                .map(|(gesture, index)| json!({ "gesture": gesture, "index": index })),
            "insertPoint": hovered.insert_point,
            "splitPoint": marker(hovered.split_point),
            "changeLanesPoint": marker(hovered.change_lanes_point),
        })
        .to_string()
    }

    // ─── Planning state ──────────────────────────────────────────────────

    /// Apply an authority update. Returns `false` if the JSON is invalid.
    pub fn apply_update_json(&mut self, json: &str) -> bool {
        match PlanningUpdate::from_json(json) {
            Ok(update) => {
                self.session.apply_update(update);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }

    /// `"off" | "roads" | "zoning"`.
    pub fn set_planning_mode(&mut self, name: &str) -> bool {
        match planning_mode(name) {
            Some(mode) => {
                self.session.set_planning_mode(mode);
                true
            }
            None => false,
        }
    }

    /// Intent JSON (e.g. `{"Road":{"n_lanes_forward":1,"n_lanes_backward":1}}`)
    /// or `null` to stop drawing.
    pub fn set_intent_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Option<Intent>>(json) {
            Ok(intent) => {
                self.session.set_intent(intent);
                true
            }
            Err(e) => {
                log::warn!("invalid intent: {e}");
                false
            }
        }
    }

    /// Open a project by id; an empty id closes it.
    pub fn open_project(&mut self, id: &str) {
        let project = (!id.is_empty()).then(|| ProjectId::intern(id));
        self.session.open_project(project);
    }

    pub fn get_current_project(&self) -> String {
        self.session
            .state()
            .current_project
            .map(|p| p.as_str().to_string())
            .unwrap_or_default()
    }

    /// Start and open a new project. Returns its id, or `""` on failure.
    pub fn start_new_project(&mut self) -> String {
        match self.session.start_new_project() {
            Ok(project) => project.as_str().to_string(),
            Err(e) => {
                log::warn!("{e}");
                String::new()
            }
        }
    }

    pub fn implement_project(&mut self) -> bool {
        report(self.session.implement_project())
    }

    pub fn undo(&mut self) -> bool {
        report(self.session.undo())
    }

    pub fn redo(&mut self) -> bool {
        report(self.session.redo())
    }

    pub fn finish_gesture(&mut self) -> bool {
        report(self.session.finish_gesture())
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"handled":bool, "action":"<action_name>"}`
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let action = self.session.handle_key(
            key,
            Modifiers {
                shift,
                ctrl,
                alt,
                meta,
            },
        );
        key_result_json(action)
    }
}

fn report(result: Result<(), cs_core::EditError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("{e}");
            false
        }
    }
}

fn touch_phase(name: &str) -> Option<TouchPhase> {
    match name {
        "start" => Some(TouchPhase::Start),
        "move" => Some(TouchPhase::Move),
        "end" | "cancel" => Some(TouchPhase::End),
        _ => None,
    }
}

fn planning_mode(name: &str) -> Option<PlanningMode> {
    serde_json::from_value(serde_json::Value::String(name.to_string())).ok()
}

fn key_result_json(action: Option<ShortcutAction>) -> String {
    match action {
        Some(action) => format!(r#"{{"handled":true,"action":"{}"}}"#, action.name()),
        None => r#"{"handled":false,"action":"none"}"#.to_string(),
    }
}

// ─── Standalone validation functions (no canvas needed) ──────────────────

/// Validate settings JSON. Returns `{"ok":true,"settings":{...}}` with the
/// clamped values, or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_settings(json: &str) -> String {
    match Settings::from_json(json) {
        Ok(settings) => json!({ "ok": true, "settings": settings }).to_string(),
        Err(e) => json!({ "ok": false, "error": e.to_string() }).to_string(),
    }
}

/// Ground point under a pixel for a one-off camera, as `[x, y, z]`.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn project_pixel_to_world(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    eye_x: f64,
    eye_y: f64,
    eye_z: f64,
    target_x: f64,
    target_y: f64,
    target_z: f64,
    vertical_fov: f64,
) -> Vec<f64> {
    let camera = CameraParams::new(
        DVec3::new(eye_x, eye_y, eye_z),
        DVec3::new(target_x, target_y, target_z),
        vertical_fov,
    );
    cs_pick::project_pixel_to_world(DVec2::new(x, y), &camera, Viewport { width, height })
        .to_array()
        .to_vec()
}
