use glam::{DMat3, DMat4, DVec3};

use crate::camera::{CameraMode, OrbitCamera};

/// Render target dimensions, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Everything the renderer needs for one frame: extracted pose, field of
/// view in radians, and the image shape hint.
///
/// Derived fresh from camera state every frame, never cached.
#[derive(Debug, Clone)]
pub struct CameraDescriptor {
    pub rotation: DMat3,
    pub translation: DVec3,
    pub fov_x: f64,
    pub fov_y: f64,
    pub image_width: u32,
    pub image_height: u32,
}

/// `focal = pixels / (2 tan(fov/2))`, fov in radians
pub fn fov_to_focal(fov: f64, pixels: u32) -> f64 {
    pixels as f64 / (2.0 * (fov / 2.0).tan())
}

/// Inverse of [`fov_to_focal`]
pub fn focal_to_fov(focal: f64, pixels: u32) -> f64 {
    2.0 * (pixels as f64 / (2.0 * focal)).atan()
}

/// Convert camera state plus viewport into a renderer-facing descriptor.
///
/// The horizontal field of view is never independent: it is derived from the
/// vertical focal length and the viewport width, so pixels stay square for
/// any aspect ratio.
pub fn build(camera: &OrbitCamera, viewport: Viewport, mode: CameraMode) -> CameraDescriptor {
    let pose = camera.pose_for(mode);
    let rotation = DMat3::from_mat4(pose);
    let translation = pose_translation(&pose);

    let fov_y = camera.fovy_deg().to_radians();
    let fy = fov_to_focal(fov_y, viewport.height);
    let fov_x = focal_to_fov(fy, viewport.width);

    CameraDescriptor {
        rotation,
        translation,
        fov_x,
        fov_y,
        image_width: viewport.width,
        image_height: viewport.height,
    }
}

fn pose_translation(pose: &DMat4) -> DVec3 {
    DVec3::new(pose.w_axis.x, pose.w_axis.y, pose.w_axis.z)
}
