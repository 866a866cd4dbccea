//! Recoverable failures of edit operations.
//!
//! None of these ever cross the pointer-event boundary: the session logs
//! them and carries on with the next event.

use crate::id::{GestureId, ProjectId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("no project is open for editing")]
    NoCurrentProject,

    #[error("no gesture is being drawn")]
    NoActiveGesture,

    #[error("no intent selected for a new gesture")]
    NoIntent,

    #[error("gesture {gesture} is unknown in project {project} and in the master plan")]
    UnknownGesture {
        project: ProjectId,
        gesture: GestureId,
    },

    #[error("control point {index} is out of range for gesture {gesture}")]
    PointOutOfRange { gesture: GestureId, index: usize },

    #[error("planning authority call `{call}` failed: {reason}")]
    Authority { call: &'static str, reason: String },

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("invalid planning update: {0}")]
    Update(String),
}

impl EditError {
    /// Shorthand for an authority failure.
    pub fn authority(call: &'static str, reason: impl Into<String>) -> Self {
        EditError::Authority {
            call,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_ids() {
        let err = EditError::UnknownGesture {
            project: ProjectId::intern("p7"),
            gesture: GestureId::intern("g9"),
        };
        let msg = err.to_string();
        assert!(msg.contains("g9") && msg.contains("p7"), "{msg}");
    }
}
