//! Interaction layer for road and zone planning.
//!
//! `stage` routes pointer samples to shape ids, `handlers` turns routed
//! events into `protocol` edits, and `session` owns it all.

pub mod authority;
pub mod handlers;
pub mod input;
pub mod planning;
pub mod protocol;
pub mod session;
pub mod shapes;
pub mod shortcuts;
pub mod stage;

pub use authority::{AuthorityCall, AuthorityResult, PlanningAuthority, RecordingAuthority};
pub use handlers::ShapeRole;
pub use input::{InputEvent, Modifiers, TouchPhase};
pub use planning::{DisplayedGesture, HoverMarkers, PathMarker, PlanningState, PlanningUpdate};
pub use protocol::{EditContext, lane_counts_from_drag, should_finish};
pub use session::PlanningSession;
pub use shapes::{CANVAS_SHAPE_ID, ShapeSet, build_shapes};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use stage::{
    Dispatch, Dispatches, DragAnchor, DragPhase, HoverPhase, InteractionEvent, Stage, StageState,
};
