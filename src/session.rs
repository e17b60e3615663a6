use std::path::Path;

use anyhow::Result;

use crate::camera::{CameraMode, OrbitCamera};
use crate::config::ViewerConfig;
use crate::controller::FrameController;
use crate::descriptor::Viewport;
use crate::input::{CameraEvent, InputAdapter};
use crate::renderer::{RenderOptions, SplatRenderer};
use crate::scene::SceneHandle;

/// One viewer instance: camera, frame controller, input queue, and the
/// loaded scene, owned together and passed explicitly.
///
/// Everything runs on the caller's thread. `advance` drains all queued
/// input before building the frame's camera descriptor, so a frame never
/// observes a half-applied drag.
pub struct ViewerSession {
    camera: OrbitCamera,
    controller: FrameController,
    input: InputAdapter,
    mode: CameraMode,
    options: RenderOptions,
    scene: Option<SceneHandle>,
}

impl ViewerSession {
    pub fn new(config: &ViewerConfig) -> Self {
        let viewport = Viewport::new(config.width, config.height);
        let mut controller = FrameController::new(viewport, config.background());
        controller.debug = config.debug;
        controller.dynamic_resolution = config.dynamic_resolution;

        Self {
            camera: OrbitCamera::new(viewport, config.radius, config.fovy),
            controller,
            input: InputAdapter::new(),
            mode: config.mode,
            options: config.render.clone(),
            scene: None,
        }
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn controller(&self) -> &FrameController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FrameController {
        &mut self.controller
    }

    pub fn input_mut(&mut self) -> &mut InputAdapter {
        &mut self.input
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: CameraMode) {
        self.mode = mode;
    }

    pub fn scene(&self) -> Option<&SceneHandle> {
        self.scene.as_ref()
    }

    /// Load a PLY point cloud and mark the model ready for rendering.
    pub fn load_scene<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let scene = SceneHandle::load_ply(path)?;
        self.controller.set_model_loaded(!scene.is_empty());
        self.scene = Some(scene);
        Ok(())
    }

    /// Install an already-loaded scene (tests, embedding).
    pub fn set_scene(&mut self, scene: SceneHandle) {
        self.controller.set_model_loaded(!scene.is_empty());
        self.scene = Some(scene);
    }

    /// Run one iteration of the frame loop: apply queued input, then
    /// dispatch the renderer. Returns whether the display buffer changed.
    pub fn advance(&mut self, renderer: &mut dyn SplatRenderer) -> Result<bool> {
        for event in self.input.drain() {
            match event {
                CameraEvent::Orbit { dx, dy } => self.camera.orbit(dx, dy),
                CameraEvent::Pan { dx, dy } => self.camera.pan(dx, dy, 0.0),
                CameraEvent::Scale { delta } => self.camera.scale(delta),
                CameraEvent::SetFov { deg } => self.camera.set_fovy(deg),
            }
        }

        self.controller.render_frame(
            &self.camera,
            self.mode,
            renderer,
            self.scene.as_ref(),
            &self.options,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{SCALE_BIAS, SCALE_GAIN};
    use crate::renderer::PointRenderer;
    use glam::Vec3;

    fn session() -> ViewerSession {
        let config = ViewerConfig {
            width: 32,
            height: 32,
            ..ViewerConfig::default()
        };
        ViewerSession::new(&config)
    }

    #[test]
    fn test_advance_without_scene_is_noop() {
        let mut session = session();
        let mut renderer = PointRenderer::new();
        assert!(!session.advance(&mut renderer).unwrap());
    }

    #[test]
    fn test_queued_input_applies_before_render() {
        let mut session = session();
        session.set_scene(SceneHandle::from_points(
            vec![Vec3::ZERO],
            vec![[1.0, 1.0, 1.0]],
        ));

        session.input_mut().push(CameraEvent::Scale { delta: 1.0 });
        session.input_mut().push(CameraEvent::Scale { delta: 1.0 });
        session.input_mut().push(CameraEvent::SetFov { deg: 90.0 });

        let mut renderer = PointRenderer::new();
        assert!(session.advance(&mut renderer).unwrap());

        let expected = 1.0 + 2.0 * (SCALE_GAIN + SCALE_BIAS);
        assert!((session.camera().zoom_scale - expected).abs() < 1e-12);
        assert_eq!(session.camera().fovy_deg(), 90.0);
        assert_eq!(session.input_mut().pending(), 0);
    }

    #[test]
    fn test_empty_scene_does_not_mark_model_loaded() {
        let mut session = session();
        session.set_scene(SceneHandle::from_points(vec![], vec![]));
        assert!(!session.controller().model_loaded());
    }
}
