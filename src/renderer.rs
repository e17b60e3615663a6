use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::descriptor::{fov_to_focal, CameraDescriptor};
use crate::scene::SceneHandle;

/// Rasterization knobs, loadable from a preset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Half-width of the square splat drawn per point, in pixels
    pub splat_radius: u32,
    /// Camera-space depth of the near cutoff
    pub depth_near: f64,
    /// Depth mapped to 1.0 in the depth channel
    pub depth_far: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            splat_radius: 1,
            depth_near: 0.01,
            depth_far: 10.0,
        }
    }
}

/// One frame of renderer output in the renderer's native planar layout:
/// `color` is channel-first (3 × height × width), `depth` is height × width.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub color: Vec<f32>,
    pub depth: Vec<f32>,
}

/// The opaque rendering boundary: camera description in, pixels out.
///
/// Invocation is synchronous; a returned error is fatal to the frame loop.
pub trait SplatRenderer {
    fn render(
        &mut self,
        camera: &CameraDescriptor,
        scene: &SceneHandle,
        options: &RenderOptions,
        background: [f32; 3],
    ) -> Result<RenderOutput>;
}

/// CPU z-buffered point rasterizer.
///
/// Projects each point through the descriptor's rotation/translation and
/// pinhole focal, draws a fixed-radius square splat, nearest depth wins.
/// Serves as the default boundary implementation so the viewer works end
/// to end without a GPU rasterizer.
#[derive(Debug, Default)]
pub struct PointRenderer;

impl PointRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl SplatRenderer for PointRenderer {
    fn render(
        &mut self,
        camera: &CameraDescriptor,
        scene: &SceneHandle,
        options: &RenderOptions,
        background: [f32; 3],
    ) -> Result<RenderOutput> {
        let width = camera.image_width as usize;
        let height = camera.image_height as usize;
        let pixels = width * height;

        let mut color = vec![0.0f32; 3 * pixels];
        for (c, plane) in color.chunks_exact_mut(pixels).enumerate() {
            plane.fill(background[c]);
        }
        let mut depth = vec![1.0f32; pixels];
        let mut zbuf = vec![f64::INFINITY; pixels];

        let fx = fov_to_focal(camera.fov_x, camera.image_width);
        let fy = fov_to_focal(camera.fov_y, camera.image_height);
        let cx = camera.image_width as f64 / 2.0;
        let cy = camera.image_height as f64 / 2.0;
        let depth_span = options.depth_far - options.depth_near;
        let radius = options.splat_radius as i64;

        for (point, rgb) in scene.positions.iter().zip(&scene.colors) {
            let view = camera.rotation * point.as_dvec3() + camera.translation;
            // COLMAP convention: camera looks down +z, image y down
            let z = view.z;
            if z <= options.depth_near {
                continue;
            }

            let u = cx + fx * view.x / z;
            let v = cy + fy * view.y / z;
            if !u.is_finite() || !v.is_finite() {
                continue;
            }
            let (u, v) = (u.round() as i64, v.round() as i64);

            let d = (((z - options.depth_near) / depth_span).clamp(0.0, 1.0)) as f32;

            for py in (v - radius)..=(v + radius) {
                for px in (u - radius)..=(u + radius) {
                    if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                        continue;
                    }
                    let idx = py as usize * width + px as usize;
                    if z < zbuf[idx] {
                        zbuf[idx] = z;
                        depth[idx] = d;
                        color[idx] = rgb[0];
                        color[pixels + idx] = rgb[1];
                        color[2 * pixels + idx] = rgb[2];
                    }
                }
            }
        }

        Ok(RenderOutput { color, depth })
    }
}
