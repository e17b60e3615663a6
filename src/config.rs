use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::camera::CameraMode;
use crate::renderer::RenderOptions;

pub const WHITE_BACKGROUND: [f32; 3] = [1.0, 1.0, 1.0];
pub const BLACK_BACKGROUND: [f32; 3] = [0.0, 0.0, 0.0];

/// Viewer configuration, read once at startup.
///
/// Loadable from a JSON preset file; CLI flags override file values.
/// Field of view and background stay live-mutable through the UI after
/// construction, everything else is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    pub radius: f64,
    pub fovy: f64,
    pub white_background: bool,
    pub debug: bool,
    pub dynamic_resolution: bool,
    pub mode: CameraMode,
    pub render: RenderOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            radius: 2.0,
            fovy: 60.0,
            white_background: false,
            debug: false,
            dynamic_resolution: false,
            mode: CameraMode::default(),
            render: RenderOptions::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())
            .with_context(|| format!("failed to read config {}", path.as_ref().display()))?;
        serde_json::from_str(&text).context("malformed config file")
    }

    pub fn background(&self) -> [f32; 3] {
        if self.white_background {
            WHITE_BACKGROUND
        } else {
            BLACK_BACKGROUND
        }
    }
}
