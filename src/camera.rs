use glam::{DMat3, DMat4, DQuat, DVec3, DVec4};

use crate::descriptor::Viewport;

/// Degrees of rotation per unit of drag delta
pub const ORBIT_SENSITIVITY: f64 = 0.01;
/// World units of look-at translation per unit of drag delta
pub const PAN_SENSITIVITY: f64 = 5e-4;
/// Linear zoom gain per wheel tick
pub const SCALE_GAIN: f64 = 0.01;
/// Constant drift added on every wheel tick
pub const SCALE_BIAS: f64 = 1e-4;

pub const MIN_FOVY_DEG: f64 = 1.0;
pub const MAX_FOVY_DEG: f64 = 179.0;

/// World up axis used for horizontal orbiting
const WORLD_UP: DVec3 = DVec3::Y;

/// Selects which pose derivation feeds the renderer.
///
/// The two compositions are not interchangeable: `Orbit` pushes the camera
/// back along z and rotates it around the look-at center, `Free` applies the
/// accumulated pan offset and zoom scale in a translate-scale-rotate chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    Orbit,
    #[default]
    Free,
}

/// Turntable camera over a reconstructed scene.
///
/// Orientation is kept as a unit quaternion and only ever updated by
/// composing axis-angle rotations onto it, so it stays a valid rotation
/// under arbitrarily long drag sequences.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    viewport: Viewport,
    /// Look-at point in world space
    pub center: DVec3,
    rotation: DQuat,
    /// Camera distance along the local forward axis
    pub radius: f64,
    fovy_deg: f64,
    /// Accumulated screen-relative translation, used by the free pose
    pub pan_offset: DVec3,
    /// Additive zoom factor, used by the free pose
    pub zoom_scale: f64,
}

impl OrbitCamera {
    pub fn new(viewport: Viewport, radius: f64, fovy_deg: f64) -> Self {
        Self {
            viewport,
            center: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            radius,
            fovy_deg: fovy_deg.clamp(MIN_FOVY_DEG, MAX_FOVY_DEG),
            pan_offset: DVec3::new(0.0, 0.0, radius),
            zoom_scale: 1.0,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    pub fn fovy_deg(&self) -> f64 {
        self.fovy_deg
    }

    /// Set the vertical field of view from the UI slider.
    ///
    /// Non-finite values are dropped and finite ones clamped away from the
    /// degenerate 0/180 endpoints so the focal length derived downstream
    /// stays finite.
    pub fn set_fovy(&mut self, fovy_deg: f64) {
        if fovy_deg.is_finite() {
            self.fovy_deg = fovy_deg.clamp(MIN_FOVY_DEG, MAX_FOVY_DEG);
        } else {
            log::warn!("ignoring non-finite fovy {fovy_deg}");
        }
    }

    /// Rotate the camera around the look-at center.
    ///
    /// `dx` turns about the world up axis, `dy` about the camera's current
    /// side axis (first column of the orientation matrix), so successive
    /// orbits compose the way the user expects. Order is fixed:
    /// up-rotation, then side-rotation, then the previous orientation.
    pub fn orbit(&mut self, dx: f64, dy: f64) {
        let side = DMat3::from_quat(self.rotation).col(0);
        let rot_x = DQuat::from_axis_angle(WORLD_UP, (ORBIT_SENSITIVITY * dx).to_radians());
        let rot_y = DQuat::from_axis_angle(side, (ORBIT_SENSITIVITY * dy).to_radians());
        self.rotation = (rot_x * rot_y * self.rotation).normalize();
    }

    /// Translate the look-at center. Deltas are camera-space and rotated
    /// into world space, so "right" follows the current side axis.
    pub fn pan(&mut self, dx: f64, dy: f64, dz: f64) {
        let delta = DMat3::from_quat(self.rotation) * DVec3::new(dx, dy, dz);
        self.center += PAN_SENSITIVITY * delta;
    }

    /// Accumulate the zoom factor. Linear, not exponential: callers must
    /// not assume a multiplicative zoom curve.
    pub fn scale(&mut self, delta: f64) {
        self.zoom_scale += SCALE_GAIN * delta + SCALE_BIAS;
    }

    /// Orbit pose: push the camera back `radius` along z, rotate, then
    /// subtract `center` from the translation column.
    pub fn pose(&self) -> DMat4 {
        let translation = self.rotation * DVec3::new(0.0, 0.0, -self.radius) - self.center;
        DMat4::from_rotation_translation(self.rotation, translation)
    }

    /// Free pose: `T(pan_offset - center) * S(zoom_scale) * R`.
    ///
    /// The zoom scale deliberately lands in the 3x3 block; the renderer
    /// consumes it as part of the extracted rotation, matching the
    /// translate-scale-rotate camera this mode models.
    pub fn free_pose(&self) -> DMat4 {
        DMat4::from_translation(self.pan_offset - self.center)
            * DMat4::from_scale(DVec3::splat(self.zoom_scale))
            * DMat4::from_quat(self.rotation)
    }

    pub fn pose_for(&self, mode: CameraMode) -> DMat4 {
        match mode {
            CameraMode::Orbit => self.pose(),
            CameraMode::Free => self.free_pose(),
        }
    }

    /// Pinhole intrinsics `(fx, fy, cx, cy)` with the principal point at
    /// the exact viewport center. No distortion or skew terms.
    pub fn intrinsics(&self) -> (f64, f64, f64, f64) {
        let focal = self.viewport.height as f64 / (2.0 * (self.fovy_deg.to_radians() / 2.0).tan());
        (
            focal,
            focal,
            self.viewport.width as f64 / 2.0,
            self.viewport.height as f64 / 2.0,
        )
    }
}

/// True when every element of the matrix is finite.
pub fn is_finite_mat4(m: &DMat4) -> bool {
    [m.x_axis, m.y_axis, m.z_axis, m.w_axis]
        .iter()
        .all(|c: &DVec4| c.x.is_finite() && c.y.is_finite() && c.z.is_finite() && c.w.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(Viewport::new(100, 100), 2.0, 60.0)
    }

    #[test]
    fn test_default_pose_pushes_back_along_z() {
        let cam = camera();
        let pose = cam.pose();

        let rot = DMat3::from_mat4(pose);
        assert!((rot - DMat3::IDENTITY).abs_diff_eq(DMat3::ZERO, 1e-12));

        let t = pose.w_axis;
        assert!(t.x.abs() < 1e-12);
        assert!(t.y.abs() < 1e-12);
        assert!(
            (t.z + 2.0).abs() < 1e-12,
            "z translation should be -radius, got {}",
            t.z
        );
    }

    #[test]
    fn test_orbit_zero_is_noop() {
        let mut cam = camera();
        let before = cam.rotation();
        cam.orbit(0.0, 0.0);
        assert!(before.abs_diff_eq(cam.rotation(), 1e-12));
    }

    #[test]
    fn test_orbit_keeps_unit_quaternion() {
        let mut cam = camera();
        for i in 0..500 {
            cam.orbit((i % 17) as f64 - 8.0, (i % 11) as f64 - 5.0);
        }
        assert!((cam.rotation().length() - 1.0).abs() < 1e-9);

        let rot = DMat3::from_quat(cam.rotation());
        assert!(
            (rot.determinant() - 1.0).abs() < 1e-9,
            "orientation must stay a proper rotation"
        );
    }

    #[test]
    fn test_pan_round_trip_restores_center() {
        let mut cam = camera();
        cam.orbit(120.0, -45.0);
        let before = cam.center;

        cam.pan(3.0, -7.0, 0.0);
        cam.pan(-3.0, 7.0, 0.0);

        assert!(cam.center.abs_diff_eq(before, 1e-12));
    }

    #[test]
    fn test_scale_accumulates_linearly() {
        let mut cam = camera();
        cam.scale(1.0);
        cam.scale(1.0);
        assert!((cam.zoom_scale - (1.0 + 2.0 * (SCALE_GAIN + SCALE_BIAS))).abs() < 1e-12);
    }

    #[test]
    fn test_intrinsics_focal_scales_with_height() {
        let small = OrbitCamera::new(Viewport::new(100, 100), 2.0, 60.0);
        let tall = OrbitCamera::new(Viewport::new(100, 200), 2.0, 60.0);

        let (fx_s, fy_s, cx_s, cy_s) = small.intrinsics();
        let (_, fy_t, _, cy_t) = tall.intrinsics();

        assert!(
            (fy_t - 2.0 * fy_s).abs() < 1e-9,
            "doubling height must double focal"
        );
        assert_eq!(fx_s, fy_s);
        assert_eq!(cx_s, 50.0);
        assert_eq!(cy_s, 50.0);
        assert_eq!(cy_t, 100.0);
    }

    #[test]
    fn test_set_fovy_rejects_non_finite() {
        let mut cam = camera();
        cam.set_fovy(f64::NAN);
        assert_eq!(cam.fovy_deg(), 60.0);
        cam.set_fovy(f64::INFINITY);
        assert_eq!(cam.fovy_deg(), 60.0);
        cam.set_fovy(0.0);
        assert_eq!(cam.fovy_deg(), MIN_FOVY_DEG);
        cam.set_fovy(200.0);
        assert_eq!(cam.fovy_deg(), MAX_FOVY_DEG);
    }

    #[test]
    fn test_free_pose_carries_zoom_in_rotation_block() {
        let mut cam = camera();
        cam.scale(100.0);
        let pose = cam.free_pose();
        let block = DMat3::from_mat4(pose);
        let expected = 1.0 + 100.0 * SCALE_GAIN + SCALE_BIAS;
        assert!((block.col(0).length() - expected).abs() < 1e-12);
    }
}
