//! Planning authority backed by JavaScript.
//!
//! Every call goes to a function on the global `cbPlanningAuthority`
//! object. Ids cross as strings, points as two numbers, intents as JSON.
//! A thrown exception becomes [`EditError::Authority`].

use cs_core::{DVec2, EditError, GestureId, Intent, ProjectId};
use cs_editor::{AuthorityResult, PlanningAuthority};
use cs_pick::PickGeometry;
use wasm_bindgen::JsValue;

mod js {
    use wasm_bindgen::prelude::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority, js_name = startNewProject)]
        pub fn start_new_project(project: &str) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority, js_name = implementProject)]
        pub fn implement_project(project: &str) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority)]
        pub fn undo(project: &str) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority)]
        pub fn redo(project: &str) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority, js_name = startNewGesture)]
        pub fn start_new_gesture(
            project: &str,
            gesture: &str,
            intent_json: &str,
            x: f64,
            y: f64,
        ) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority, js_name = addControlPoint)]
        pub fn add_control_point(
            project: &str,
            gesture: &str,
            x: f64,
            y: f64,
            add_to_end: bool,
            done: bool,
        ) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority, js_name = moveGesturePoint)]
        pub fn move_gesture_point(
            project: &str,
            gesture: &str,
            index: u32,
            x: f64,
            y: f64,
            done: bool,
        ) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority, js_name = insertControlPoint)]
        pub fn insert_control_point(
            project: &str,
            gesture: &str,
            x: f64,
            y: f64,
            done: bool,
        ) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority, js_name = splitGesture)]
        pub fn split_gesture(
            project: &str,
            gesture: &str,
            x: f64,
            y: f64,
            done: bool,
        ) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority, js_name = setNLanes)]
        pub fn set_n_lanes(
            project: &str,
            gesture: &str,
            n_lanes_forward: u8,
            n_lanes_backward: u8,
            done: bool,
        ) -> Result<(), JsValue>;

        #[wasm_bindgen(catch, js_namespace = cbPlanningAuthority, js_name = finishGesture)]
        pub fn finish_gesture(project: &str, gesture: &str) -> Result<(), JsValue>;
    }
}

/// Turn a thrown JS value into an authority error.
fn thrown(call: &'static str) -> impl FnOnce(JsValue) -> EditError {
    move |value| {
        let reason = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        EditError::authority(call, reason)
    }
}

#[derive(Debug, Default)]
pub struct JsAuthority;

impl PickGeometry for JsAuthority {}

impl PlanningAuthority for JsAuthority {
    fn start_new_project(&mut self, project: ProjectId) -> AuthorityResult {
        js::start_new_project(project.as_str()).map_err(thrown("start_new_project"))
    }

    fn implement_project(&mut self, project: ProjectId) -> AuthorityResult {
        js::implement_project(project.as_str()).map_err(thrown("implement_project"))
    }

    fn undo(&mut self, project: ProjectId) -> AuthorityResult {
        js::undo(project.as_str()).map_err(thrown("undo"))
    }

    fn redo(&mut self, project: ProjectId) -> AuthorityResult {
        js::redo(project.as_str()).map_err(thrown("redo"))
    }

    fn start_new_gesture(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        intent: &Intent,
        start: DVec2,
    ) -> AuthorityResult {
        let intent_json = serde_json::to_string(intent)
            .map_err(|e| EditError::authority("start_new_gesture", e.to_string()))?;
        js::start_new_gesture(
            project.as_str(),
            gesture.as_str(),
            &intent_json,
            start.x,
            start.y,
        )
        .map_err(thrown("start_new_gesture"))
    }

    fn add_control_point(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        add_to_end: bool,
        done: bool,
    ) -> AuthorityResult {
        js::add_control_point(
            project.as_str(),
            gesture.as_str(),
            point.x,
            point.y,
            add_to_end,
            done,
        )
        .map_err(thrown("add_control_point"))
    }

    fn move_gesture_point(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        index: usize,
        position: DVec2,
        done: bool,
    ) -> AuthorityResult {
        let index = u32::try_from(index)
            .map_err(|_| EditError::PointOutOfRange { gesture, index })?;
        js::move_gesture_point(
            project.as_str(),
            gesture.as_str(),
            index,
            position.x,
            position.y,
            done,
        )
        .map_err(thrown("move_gesture_point"))
    }

    fn insert_control_point(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        done: bool,
    ) -> AuthorityResult {
        js::insert_control_point(project.as_str(), gesture.as_str(), point.x, point.y, done)
            .map_err(thrown("insert_control_point"))
    }

    fn split_gesture(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        point: DVec2,
        done: bool,
    ) -> AuthorityResult {
        js::split_gesture(project.as_str(), gesture.as_str(), point.x, point.y, done)
            .map_err(thrown("split_gesture"))
    }

    fn set_n_lanes(
        &mut self,
        project: ProjectId,
        gesture: GestureId,
        n_lanes_forward: u8,
        n_lanes_backward: u8,
        done: bool,
    ) -> AuthorityResult {
        js::set_n_lanes(
            project.as_str(),
            gesture.as_str(),
            n_lanes_forward,
            n_lanes_backward,
            done,
        )
        .map_err(thrown("set_n_lanes"))
    }

    fn finish_gesture(&mut self, project: ProjectId, gesture: GestureId) -> AuthorityResult {
        js::finish_gesture(project.as_str(), gesture.as_str()).map_err(thrown("finish_gesture"))
    }
}
