//! Planning session: the single owner of interaction state.
//!
//! Pixel-space input goes in; routed events come out as edit operations
//! against the authority. Shapes are rebuilt from the planning mirror for
//! every pointer sample, and roles are resolved from that fresh set. A hover
//! that ends on a shape the rebuild dropped still reaches its old role, so
//! the markers it owned get cleared.

use crate::authority::PlanningAuthority;
use crate::handlers;
use crate::input::{InputEvent, Modifiers, TouchPhase};
use crate::planning::{PlanningState, PlanningUpdate};
use crate::protocol::EditContext;
use crate::shapes::{ShapeSet, build_shapes};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::stage::{Dispatches, HoverPhase, InteractionEvent, Stage, StageState};
use cs_core::{EditError, Intent, PlanningMode, ProjectId, Settings};
use cs_pick::{CameraParams, Cursor, FrameMatrices, OrbitCamera, Viewport};
use glam::{DVec2, DVec3};

pub struct PlanningSession<A: PlanningAuthority> {
    settings: Settings,
    camera: CameraParams,
    viewport: Viewport,
    frame: FrameMatrices,
    stage: Stage,
    state: PlanningState,
    authority: A,
    /// Shape set of the last pointer sample.
    previous_shapes: ShapeSet,
}

impl<A: PlanningAuthority> PlanningSession<A> {
    pub fn new(authority: A, viewport: Viewport) -> Self {
        let settings = Settings::default();
        let camera = CameraParams::from_orbit(&OrbitCamera::default(), &settings.camera);
        Self {
            frame: FrameMatrices::compute(&camera, viewport),
            settings,
            camera,
            viewport,
            stage: Stage::new(),
            state: PlanningState::new(),
            authority,
            previous_shapes: ShapeSet::default(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &PlanningState {
        &self.state
    }

    pub fn stage_state(&self) -> StageState {
        self.stage.state()
    }

    pub fn authority(&self) -> &A {
        &self.authority
    }

    pub fn authority_mut(&mut self) -> &mut A {
        &mut self.authority
    }

    pub fn frame(&self) -> &FrameMatrices {
        &self.frame
    }

    pub fn cursor(&self) -> Cursor {
        self.stage.cursor()
    }

    pub fn shapes(&self) -> ShapeSet {
        build_shapes(&self.state, &self.settings.planning)
    }

    // ─── Camera ──────────────────────────────────────────────────────────

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings.clamped();
    }

    /// Takes effect at the next [`render_frame`](Self::render_frame).
    pub fn set_camera(&mut self, camera: CameraParams) {
        self.camera = camera;
    }

    pub fn set_orbit(&mut self, orbit: &OrbitCamera) {
        self.camera = CameraParams::from_orbit(orbit, &self.settings.camera);
    }

    /// Takes effect at the next [`render_frame`](Self::render_frame).
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Recompute the frame matrices used to project pointer events.
    pub fn render_frame(&mut self) {
        self.frame = FrameMatrices::compute(&self.camera, self.viewport);
    }

    pub fn project(&self, x: f64, y: f64) -> DVec3 {
        self.frame.project_pixel_to_world(DVec2::new(x, y))
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Returns `true` if a shape received an event.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        let point = self.project(x, y);
        log::trace!("pointer down ({x}, {y}) -> {point}");
        let shapes = self.shapes();
        let out = self.stage.pointer_down(point, &shapes.shapes, &self.authority);
        self.dispatch(shapes, out)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        let point = self.project(x, y);
        log::trace!("pointer move ({x}, {y}) -> {point}");
        let shapes = self.shapes();
        let out = self.stage.pointer_move(point, &shapes.shapes, &self.authority);
        self.dispatch(shapes, out)
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> bool {
        let point = self.project(x, y);
        log::trace!("pointer up ({x}, {y}) -> {point}");
        let shapes = self.shapes();
        let out = self.stage.pointer_up(point);
        self.dispatch(shapes, out)
    }

    /// First changed touch only.
    pub fn touch(&mut self, phase: TouchPhase, x: f64, y: f64) -> bool {
        self.handle_input(&InputEvent::from_touch(phase, x, y))
    }

    /// Returns whether the event was consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(*x, *y),
            InputEvent::PointerMove { x, y } => self.pointer_move(*x, *y),
            InputEvent::PointerUp { x, y } => self.pointer_up(*x, *y),
            // the camera owns the wheel
            InputEvent::Wheel { .. } => false,
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers).is_some(),
        }
    }

    fn dispatch(&mut self, shapes: ShapeSet, dispatches: Dispatches) -> bool {
        let delivered = !dispatches.is_empty();
        for dispatch in dispatches {
            let role = match (shapes.role(dispatch.target), &dispatch.event) {
                (Some(role), _) => role,
                (
                    None,
                    InteractionEvent::Hover {
                        phase: HoverPhase::End,
                        ..
                    },
                ) => match self.previous_shapes.role(dispatch.target) {
                    Some(role) => role,
                    None => continue,
                },
                (None, _) => {
                    log::debug!("no shape {:?} this frame; event dropped", dispatch.target);
                    continue;
                }
            };
            let mut ctx =
                EditContext::new(&mut self.state, &mut self.authority, &self.settings.planning);
            if let Err(err) = handlers::handle(role, &dispatch.event, &mut ctx) {
                log::warn!("{:?}: {err}", dispatch.target);
            }
        }
        self.previous_shapes = shapes;
        delivered
    }

    // ─── Planning state ──────────────────────────────────────────────────

    pub fn apply_update(&mut self, update: PlanningUpdate) {
        self.state.apply_update(update);
    }

    pub fn set_planning_mode(&mut self, mode: PlanningMode) {
        if self.state.mode != mode {
            self.stage.reset();
        }
        self.state.set_mode(mode);
    }

    pub fn set_intent(&mut self, intent: Option<Intent>) {
        self.state.set_intent(intent);
    }

    pub fn open_project(&mut self, project: Option<ProjectId>) {
        if self.state.current_project != project {
            self.stage.reset();
        }
        self.state.set_current_project(project);
    }

    fn edit(&mut self) -> EditContext<'_> {
        EditContext::new(&mut self.state, &mut self.authority, &self.settings.planning)
    }

    pub fn start_new_project(&mut self) -> Result<ProjectId, EditError> {
        self.stage.reset();
        self.edit().start_new_project()
    }

    pub fn implement_project(&mut self) -> Result<(), EditError> {
        self.stage.reset();
        self.edit().implement_project()
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        self.edit().undo()
    }

    pub fn redo(&mut self) -> Result<(), EditError> {
        self.edit().redo()
    }

    pub fn finish_gesture(&mut self) -> Result<(), EditError> {
        self.edit().finish_gesture()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Resolve and run a shortcut. Returns the action if the key was bound,
    /// whether or not running it succeeded.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(
            key,
            modifiers.ctrl,
            modifiers.shift,
            modifiers.alt,
            modifiers.meta,
        )?;
        let result = match action {
            ShortcutAction::ImplementProject => self.implement_project(),
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::FinishGesture if self.state.canvas.is_drawing() => {
                self.finish_gesture()
            }
            ShortcutAction::FinishGesture => Ok(()),
        };
        if let Err(err) = result {
            log::warn!("shortcut {}: {err}", action.name());
        }
        Some(action)
    }
}
