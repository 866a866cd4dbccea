pub mod error;
pub mod id;
pub mod model;
pub mod settings;

pub use error::EditError;
pub use id::{GestureId, ProjectId, ShapeId};
pub use model::*;
pub use settings::{CameraSettings, LANE_DISTANCE, PlanningSettings, Settings};

// Re-export the vector types so downstream crates agree on one math crate
pub use glam::{DVec2, DVec3};
