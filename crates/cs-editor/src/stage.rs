//! Pointer routing state machine.
//!
//! Turns raw world-space pointer samples into hover and drag events
//! addressed to shape ids. At most one shape holds the drag capture; while
//! it does, hover tracking is suspended and every move goes to the captor.
//!
//! ```text
//!   Idle ──move over S──▶ Hovering(S) ──move over T──▶ Hovering(T)
//!    │                        │
//!    └──────down on S─────────┴──▶ Dragging(S) ──up──▶ Idle
//! ```

use cs_core::ShapeId;
use cs_pick::{Cursor, InteractiveShape, PickGeometry, find_top_shape_at};
use glam::{DVec2, DVec3};
use smallvec::SmallVec;

/// Where a drag began, fixed for the life of the drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragAnchor {
    /// Cursor world position at pointer-down.
    pub start: DVec3,
    /// Projection of `start` onto the captured shape (center line for paths).
    pub projected: DVec3,
    /// Path tangent at `projected`, when the captor is a path.
    pub direction: Option<DVec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverPhase {
    Start,
    Now,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragPhase {
    Start,
    /// Pointer moved to this world position.
    Now(DVec3),
    /// Pointer released at this world position.
    End(DVec3),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    Hover {
        phase: HoverPhase,
        /// Cursor world position.
        point: DVec3,
        /// Cursor projected onto the hovered shape.
        projected: DVec3,
        direction: Option<DVec2>,
    },
    Drag {
        anchor: DragAnchor,
        phase: DragPhase,
    },
}

/// An event addressed to a shape id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dispatch {
    pub target: ShapeId,
    pub event: InteractionEvent,
}

/// Events produced by one pointer sample, in delivery order.
pub type Dispatches = SmallVec<[Dispatch; 2]>;

/// Observable state, for hosts and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Idle,
    Hovering(ShapeId),
    Dragging(ShapeId),
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    shape: ShapeId,
    anchor: DragAnchor,
    cursor: Cursor,
}

#[derive(Debug, Clone, Copy)]
struct Hovered {
    shape: ShapeId,
    cursor: Cursor,
}

#[derive(Debug, Clone, Default)]
pub struct Stage {
    active: Option<ActiveDrag>,
    hovered: Option<Hovered>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StageState {
        match (&self.active, &self.hovered) {
            (Some(drag), _) => StageState::Dragging(drag.shape),
            (None, Some(hover)) => StageState::Hovering(hover.shape),
            (None, None) => StageState::Idle,
        }
    }

    /// Cursor hint: the captor's active hint, else the hovered shape's
    /// hover hint, else the default arrow.
    pub fn cursor(&self) -> Cursor {
        if let Some(drag) = &self.active {
            drag.cursor
        } else if let Some(hover) = &self.hovered {
            hover.cursor
        } else {
            Cursor::Default
        }
    }

    /// Capture the topmost shape under `point`. A press on empty space does
    /// nothing. Hover ends before the capture starts. A press while something
    /// is already captured replaces the capture without ending the old drag.
    pub fn pointer_down(
        &mut self,
        point: DVec3,
        shapes: &[InteractiveShape],
        geometry: &dyn PickGeometry,
    ) -> Dispatches {
        let mut out = Dispatches::new();
        let Some(hit) = find_top_shape_at(point, shapes, geometry) else {
            return out;
        };

        if let Some(previous) = self.active.take() {
            log::debug!(
                "pointer down while {:?} held the capture; recapturing {:?}",
                previous.shape,
                hit.shape.id
            );
        }
        if let Some(old) = self.hovered.take() {
            out.push(Dispatch {
                target: old.shape,
                event: InteractionEvent::Hover {
                    phase: HoverPhase::End,
                    point,
                    projected: point,
                    direction: None,
                },
            });
        }

        let anchor = DragAnchor {
            start: point,
            projected: hit.projected,
            direction: hit.direction,
        };
        self.active = Some(ActiveDrag {
            shape: hit.shape.id,
            anchor,
            cursor: hit.shape.cursor_active,
        });
        out.push(Dispatch {
            target: hit.shape.id,
            event: InteractionEvent::Drag {
                anchor,
                phase: DragPhase::Start,
            },
        });
        out
    }

    /// Feed a move. While dragging, the captor gets `drag now`. Otherwise
    /// hover transitions are emitted: `end` on the old shape before `start`
    /// on the new one, or `now` when the shape is unchanged.
    pub fn pointer_move(
        &mut self,
        point: DVec3,
        shapes: &[InteractiveShape],
        geometry: &dyn PickGeometry,
    ) -> Dispatches {
        let mut out = Dispatches::new();

        if let Some(drag) = &self.active {
            out.push(Dispatch {
                target: drag.shape,
                event: InteractionEvent::Drag {
                    anchor: drag.anchor,
                    phase: DragPhase::Now(point),
                },
            });
            return out;
        }

        let hit = find_top_shape_at(point, shapes, geometry);
        let hit_id = hit.as_ref().map(|h| h.shape.id);

        if let Some(hit) = &hit
            && self.hovered.as_ref().is_some_and(|h| h.shape == hit.shape.id)
        {
            self.hovered = Some(Hovered {
                shape: hit.shape.id,
                cursor: hit.shape.cursor_hover,
            });
            out.push(Dispatch {
                target: hit.shape.id,
                event: InteractionEvent::Hover {
                    phase: HoverPhase::Now,
                    point,
                    projected: hit.projected,
                    direction: hit.direction,
                },
            });
            return out;
        }

        if let Some(old) = self.hovered.take() {
            log::trace!("hover left {:?} for {:?}", old.shape, hit_id);
            out.push(Dispatch {
                target: old.shape,
                event: InteractionEvent::Hover {
                    phase: HoverPhase::End,
                    point,
                    projected: point,
                    direction: None,
                },
            });
        }

        if let Some(hit) = hit {
            self.hovered = Some(Hovered {
                shape: hit.shape.id,
                cursor: hit.shape.cursor_hover,
            });
            out.push(Dispatch {
                target: hit.shape.id,
                event: InteractionEvent::Hover {
                    phase: HoverPhase::Start,
                    point,
                    projected: hit.projected,
                    direction: hit.direction,
                },
            });
        }
        out
    }

    /// Release the capture, if any, with `drag end`. Hover is not
    /// re-evaluated until the next move.
    pub fn pointer_up(&mut self, point: DVec3) -> Dispatches {
        let mut out = Dispatches::new();
        if let Some(drag) = self.active.take() {
            out.push(Dispatch {
                target: drag.shape,
                event: InteractionEvent::Drag {
                    anchor: drag.anchor,
                    phase: DragPhase::End(point),
                },
            });
        }
        out
    }

    /// Forget hover and capture without emitting anything, e.g. when the
    /// planning mode switches and every shape disappears.
    pub fn reset(&mut self) {
        self.active = None;
        self.hovered = None;
    }
}
