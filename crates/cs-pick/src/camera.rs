//! Camera parameters and pixel ↔ world projection.
//!
//! The camera itself is steered elsewhere; this module only turns its
//! current parameters into matrices and casts the cursor ray onto the
//! ground plane (z = 0).

use cs_core::CameraSettings;
use glam::{DMat4, DVec2, DVec3, DVec4};

/// Size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Camera orbiting a target on the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: DVec3,
    /// Angle around +Z, radians.
    pub heading: f64,
    /// Elevation above the ground, radians.
    pub pitch: f64,
    pub distance: f64,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: DVec3::ZERO,
            heading: 0.25 * std::f64::consts::PI,
            pitch: 0.25 * std::f64::consts::PI,
            distance: 212.0,
        }
    }
}

impl OrbitCamera {
    pub fn eye(&self) -> DVec3 {
        let behind = DVec3::new(
            -self.distance * self.heading.cos(),
            -self.distance * self.heading.sin(),
            0.0,
        );
        let height = DVec3::new(0.0, 0.0, self.distance * self.pitch.sin());
        self.target + height + behind * self.pitch.cos()
    }
}

/// Everything the projection needs to know about the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraParams {
    pub eye: DVec3,
    pub target: DVec3,
    /// Vertical field of view in radians.
    pub vertical_fov: f64,
    pub near: f64,
    pub far: f64,
}

impl CameraParams {
    pub fn new(eye: DVec3, target: DVec3, vertical_fov: f64) -> Self {
        let defaults = CameraSettings::default();
        Self {
            eye,
            target,
            vertical_fov,
            near: defaults.near,
            far: defaults.far,
        }
    }

    pub fn from_orbit(orbit: &OrbitCamera, settings: &CameraSettings) -> Self {
        Self {
            eye: orbit.eye(),
            target: orbit.target,
            vertical_fov: settings.vertical_fov_radians(),
            near: settings.near,
            far: settings.far,
        }
    }
}

/// Matrices derived once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub eye: DVec3,
    pub viewport: Viewport,
    pub view: DMat4,
    pub perspective: DMat4,
    pub inverse_view: DMat4,
    pub inverse_perspective: DMat4,
}

impl FrameMatrices {
    pub fn compute(camera: &CameraParams, viewport: Viewport) -> Self {
        let view = DMat4::look_at_rh(camera.eye, camera.target, DVec3::Z);
        let perspective = DMat4::perspective_rh_gl(
            camera.vertical_fov,
            viewport.aspect(),
            camera.near,
            camera.far,
        );
        Self {
            eye: camera.eye,
            viewport,
            view,
            perspective,
            inverse_view: view.inverse(),
            inverse_perspective: perspective.inverse(),
        }
    }

    /// Cast the ray under `pixel` onto the ground plane.
    ///
    /// When the ray runs parallel to the ground the result is infinite or NaN;
    /// callers treat a non-finite point as "nothing under the cursor".
    pub fn project_pixel_to_world(&self, pixel: DVec2) -> DVec3 {
        let ndc = DVec4::new(
            (pixel.x / self.viewport.width) * 2.0 - 1.0,
            (-pixel.y / self.viewport.height) * 2.0 + 1.0,
            -1.0,
            1.0,
        );
        let mut from_camera = self.inverse_perspective * ndc;
        from_camera.w = 0.0;
        let direction = (self.inverse_view * from_camera).truncate();

        let t = -self.eye.z / direction.z;
        self.eye + direction * t
    }

    /// Project a world point back to pixel coordinates.
    /// Returns `None` for points behind the camera.
    pub fn project_world_to_pixel(&self, world: DVec3) -> Option<DVec2> {
        let ndc = self.world_to_ndc(world)?;
        Some(DVec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.width,
            (1.0 - ndc.y) * 0.5 * self.viewport.height,
        ))
    }

    /// Forward transform to normalized device coordinates.
    pub fn world_to_ndc(&self, world: DVec3) -> Option<DVec2> {
        let clip = self.perspective * self.view * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(DVec2::new(clip.x / clip.w, clip.y / clip.w))
    }
}

/// Convenience wrapper: compute matrices and project in one go.
pub fn project_pixel_to_world(pixel: DVec2, camera: &CameraParams, viewport: Viewport) -> DVec3 {
    FrameMatrices::compute(camera, viewport).project_pixel_to_world(pixel)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 600.0,
    };

    fn tilted_camera() -> CameraParams {
        CameraParams::from_orbit(&OrbitCamera::default(), &CameraSettings::default())
    }

    #[test]
    fn center_pixel_hits_the_target() {
        let camera = tilted_camera();
        let world = project_pixel_to_world(DVec2::new(400.0, 300.0), &camera, VIEWPORT);
        assert!(world.z.abs() < 1e-6);
        assert!(world.distance(camera.target) < 1e-6, "got {world}");
    }

    #[test]
    fn projected_points_lie_on_the_ground() {
        let frame = FrameMatrices::compute(&tilted_camera(), VIEWPORT);
        let world = frame.project_pixel_to_world(DVec2::new(13.0, 577.0));
        assert!(world.z.abs() < 1e-6);
    }

    #[test]
    fn pixel_world_pixel_round_trip() {
        let frame = FrameMatrices::compute(&tilted_camera(), VIEWPORT);
        for &(px, py) in &[(0.0, 0.0), (400.0, 300.0), (799.0, 599.0), (120.5, 480.25), (650.0, 20.0)] {
            let pixel = DVec2::new(px, py);
            let world = frame.project_pixel_to_world(pixel);
            let ndc = frame.world_to_ndc(world).expect("in front of camera");
            let expected = DVec2::new((px / 800.0) * 2.0 - 1.0, (-py / 600.0) * 2.0 + 1.0);
            assert!(
                (ndc - expected).length() < 1e-6,
                "pixel {pixel}: ndc {ndc} vs {expected}"
            );
            let back = frame.project_world_to_pixel(world).unwrap();
            assert!((back - pixel).length() < 1e-4);
        }
    }

    #[test]
    fn top_down_camera_maps_pixels_symmetrically() {
        let camera = CameraParams::new(DVec3::new(0.0, -0.001, 100.0), DVec3::ZERO, 0.5);
        let frame = FrameMatrices::compute(&camera, VIEWPORT);
        let left = frame.project_pixel_to_world(DVec2::new(0.0, 300.0));
        let right = frame.project_pixel_to_world(DVec2::new(800.0, 300.0));
        assert!(left.x < 0.0 && right.x > 0.0);
        assert!((left.x + right.x).abs() < 1e-3);
    }

    #[test]
    fn ray_parallel_to_ground_does_not_panic() {
        let camera = CameraParams::new(DVec3::new(0.0, -100.0, 0.0), DVec3::new(0.0, 0.0, 0.0), 0.5);
        let world = project_pixel_to_world(DVec2::new(400.0, 300.0), &camera, VIEWPORT);
        assert!(!world.is_finite());
    }

    #[test]
    fn orbit_eye_sits_above_and_behind_target() {
        let orbit = OrbitCamera::default();
        let eye = orbit.eye();
        assert!(eye.z > 0.0);
        assert!((eye.distance(orbit.target) - orbit.distance).abs() < 1e-9);
    }
}
