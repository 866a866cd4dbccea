//! Input abstraction layer.
//!
//! Normalizes mouse, pointer, and touch events into a unified `InputEvent`
//! consumed by the session. Coordinates are pixels relative to the
//! drawing surface's top-left corner.

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// Lifecycle of a single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, pen contact, touch start).
    PointerDown { x: f64, y: f64 },

    /// Pointer moved, with or without a button held.
    PointerMove { x: f64, y: f64 },

    /// Pointer released.
    PointerUp { x: f64, y: f64 },

    /// Wheel / trackpad scroll. Belongs to the camera, not to picking.
    Wheel { dx: f64, dy: f64 },

    /// Keyboard shortcut.
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    /// Map the first changed touch to the pointer sequence.
    pub fn from_touch(phase: TouchPhase, x: f64, y: f64) -> Self {
        match phase {
            TouchPhase::Start => Self::PointerDown { x, y },
            TouchPhase::Move => Self::PointerMove { x, y },
            TouchPhase::End => Self::PointerUp { x, y },
        }
    }
}
