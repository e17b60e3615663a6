use anyhow::Result;

use crate::camera::{is_finite_mat4, CameraMode, OrbitCamera};
use crate::descriptor::{self, Viewport};
use crate::renderer::{RenderOptions, SplatRenderer};
use crate::scene::SceneHandle;

/// Which renderer channel lands in the display buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Image,
    Depth,
}

impl RenderMode {
    pub fn label(&self) -> &'static str {
        match self {
            RenderMode::Image => "image",
            RenderMode::Depth => "depth",
        }
    }
}

/// The displayed pixel grid: row-major width × height × 3, channel-last,
/// overwritten in place every frame. Single-threaded ownership means the
/// presentation step always reads the last completed frame; a threaded
/// renderer would need an explicit double buffer before sharing this.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            width: viewport.width,
            height: viewport.height,
            data: vec![0.0; viewport.pixel_count() * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Owns the display buffer and runs the per-frame sequence: build the
/// camera descriptor, invoke the renderer, post-process its output into
/// the buffer.
pub struct FrameController {
    buffer: FrameBuffer,
    background: [f32; 3],
    mode: RenderMode,
    model_loaded: bool,
    /// Declared but inert; kept as an extension point for resolution scaling
    pub dynamic_resolution: bool,
    /// Gates pose telemetry only
    pub debug: bool,
}

impl FrameController {
    pub fn new(viewport: Viewport, background: [f32; 3]) -> Self {
        Self {
            buffer: FrameBuffer::new(viewport),
            background,
            mode: RenderMode::default(),
            model_loaded: false,
            dynamic_resolution: false,
            debug: false,
        }
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn background(&self) -> [f32; 3] {
        self.background
    }

    pub fn set_background(&mut self, background: [f32; 3]) {
        self.background = background;
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    pub fn model_loaded(&self) -> bool {
        self.model_loaded
    }

    pub fn set_model_loaded(&mut self, loaded: bool) {
        self.model_loaded = loaded;
    }

    /// Run one frame. Returns whether the buffer was overwritten.
    ///
    /// Skips silently when no model is loaded (the renderer must not run
    /// without a scene) and skips with a warning when the derived pose is
    /// degenerate. Renderer errors propagate; the loop treats them as fatal.
    pub fn render_frame(
        &mut self,
        camera: &OrbitCamera,
        mode: CameraMode,
        renderer: &mut dyn SplatRenderer,
        scene: Option<&SceneHandle>,
        options: &RenderOptions,
    ) -> Result<bool> {
        let Some(scene) = scene.filter(|_| self.model_loaded) else {
            return Ok(false);
        };

        let pose = camera.pose_for(mode);
        if !is_finite_mat4(&pose) {
            log::warn!("skipping frame: non-finite camera pose");
            return Ok(false);
        }
        if self.debug {
            log::debug!("camera pose: {pose:?}");
        }

        let descriptor = descriptor::build(camera, camera.viewport(), mode);
        let output = renderer.render(&descriptor, scene, options, self.background)?;

        let pixels = self.buffer.width as usize * self.buffer.height as usize;
        match self.mode {
            // Renderer output is planar (3 x H x W); the buffer wants
            // interleaved channel-last samples.
            RenderMode::Image => {
                for i in 0..pixels {
                    self.buffer.data[3 * i] = output.color[i];
                    self.buffer.data[3 * i + 1] = output.color[pixels + i];
                    self.buffer.data[3 * i + 2] = output.color[2 * pixels + i];
                }
            }
            // Single depth channel broadcast to all three for display
            RenderMode::Depth => {
                for i in 0..pixels {
                    let d = output.depth[i];
                    self.buffer.data[3 * i] = d;
                    self.buffer.data[3 * i + 1] = d;
                    self.buffer.data[3 * i + 2] = d;
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::RenderOutput;
    use glam::Vec3;

    /// Renderer double that counts invocations and returns a fixed ramp.
    struct CountingRenderer {
        calls: usize,
    }

    impl SplatRenderer for CountingRenderer {
        fn render(
            &mut self,
            camera: &crate::descriptor::CameraDescriptor,
            _scene: &SceneHandle,
            _options: &RenderOptions,
            _background: [f32; 3],
        ) -> Result<RenderOutput> {
            self.calls += 1;
            let pixels = (camera.image_width * camera.image_height) as usize;
            Ok(RenderOutput {
                color: (0..3 * pixels).map(|i| i as f32).collect(),
                depth: (0..pixels).map(|i| 0.25 + i as f32).collect(),
            })
        }
    }

    fn setup() -> (FrameController, OrbitCamera, SceneHandle) {
        let viewport = Viewport::new(4, 2);
        let controller = FrameController::new(viewport, [0.0, 0.0, 0.0]);
        let camera = OrbitCamera::new(viewport, 2.0, 60.0);
        let scene = SceneHandle::from_points(vec![Vec3::ZERO], vec![[1.0, 1.0, 1.0]]);
        (controller, camera, scene)
    }

    #[test]
    fn test_no_model_skips_renderer() {
        let (mut controller, camera, scene) = setup();
        let mut renderer = CountingRenderer { calls: 0 };
        let before = controller.buffer().data().to_vec();

        let updated = controller
            .render_frame(
                &camera,
                CameraMode::Free,
                &mut renderer,
                Some(&scene),
                &RenderOptions::default(),
            )
            .unwrap();

        assert!(!updated);
        assert_eq!(renderer.calls, 0, "renderer must not run without a model");
        assert_eq!(controller.buffer().data(), before.as_slice());
    }

    #[test]
    fn test_image_mode_interleaves_planar_output() {
        let (mut controller, camera, scene) = setup();
        controller.set_model_loaded(true);
        let mut renderer = CountingRenderer { calls: 0 };

        let updated = controller
            .render_frame(
                &camera,
                CameraMode::Free,
                &mut renderer,
                Some(&scene),
                &RenderOptions::default(),
            )
            .unwrap();

        assert!(updated);
        assert_eq!(renderer.calls, 1);

        // Pixel i should read (i, pixels + i, 2*pixels + i) from the planes
        let data = controller.buffer().data();
        assert_eq!(&data[0..3], &[0.0, 8.0, 16.0]);
        assert_eq!(&data[3..6], &[1.0, 9.0, 17.0]);
        assert_eq!(&data[21..24], &[7.0, 15.0, 23.0]);
    }

    #[test]
    fn test_depth_mode_broadcasts_channel() {
        let (mut controller, camera, scene) = setup();
        controller.set_model_loaded(true);
        controller.set_mode(RenderMode::Depth);
        let mut renderer = CountingRenderer { calls: 0 };

        controller
            .render_frame(
                &camera,
                CameraMode::Free,
                &mut renderer,
                Some(&scene),
                &RenderOptions::default(),
            )
            .unwrap();

        let data = controller.buffer().data();
        assert_eq!(&data[0..3], &[0.25, 0.25, 0.25]);
        assert_eq!(&data[3..6], &[1.25, 1.25, 1.25]);
    }

    #[test]
    fn test_degenerate_pose_skips_frame() {
        let (mut controller, mut camera, scene) = setup();
        controller.set_model_loaded(true);
        camera.zoom_scale = f64::INFINITY;
        let mut renderer = CountingRenderer { calls: 0 };

        let updated = controller
            .render_frame(
                &camera,
                CameraMode::Free,
                &mut renderer,
                Some(&scene),
                &RenderOptions::default(),
            )
            .unwrap();

        assert!(!updated);
        assert_eq!(renderer.calls, 0, "degenerate pose must not reach the renderer");
    }

    #[test]
    fn test_missing_scene_handle_skips() {
        let (mut controller, camera, _) = setup();
        controller.set_model_loaded(true);
        let mut renderer = CountingRenderer { calls: 0 };

        let updated = controller
            .render_frame(
                &camera,
                CameraMode::Free,
                &mut renderer,
                None,
                &RenderOptions::default(),
            )
            .unwrap();

        assert!(!updated);
        assert_eq!(renderer.calls, 0);
    }
}
