//! Picking: where is the cursor in the world, and which shape is it over.

pub mod camera;
pub mod geometry;
pub mod hit;
pub mod shape;

pub use camera::{CameraParams, FrameMatrices, OrbitCamera, Viewport, project_pixel_to_world};
pub use geometry::{LocalGeometry, PathProjection, PickGeometry, right_normal};
pub use hit::{Hit, find_top_shape_at};
pub use shape::{Cursor, InteractiveShape, Shape};
