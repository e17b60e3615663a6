// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::camera::CameraMode;
use crate::config::ViewerConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "splat-viewer")]
#[command(about = "Interactive point-splat scene viewer", long_about = None)]
pub struct Cli {
    /// Point cloud to load at startup (.ply)
    #[arg(long = "ply")]
    pub ply: Option<PathBuf>,

    /// JSON preset file; flags below override its values
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Render width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Render height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Initial camera distance from the look-at center
    #[arg(long)]
    pub radius: Option<f64>,

    /// Initial vertical field of view in degrees
    #[arg(long)]
    pub fovy: Option<f64>,

    /// Render on a white background instead of black
    #[arg(long = "white-background", default_value = "false")]
    pub white_background: bool,

    /// Log camera pose telemetry every frame
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Pose derivation fed to the renderer
    #[arg(long, value_enum)]
    pub mode: Option<CameraMode>,

    /// Render this many frames without a window, then exit
    #[arg(long)]
    pub headless: Option<u64>,
}

impl Cli {
    /// Resolve the effective configuration: defaults, then the preset
    /// file, then explicit flags.
    pub fn resolve_config(&self) -> anyhow::Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(radius) = self.radius {
            config.radius = radius;
        }
        if let Some(fovy) = self.fovy {
            config.fovy = fovy;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.white_background {
            config.white_background = true;
        }
        if self.debug {
            config.debug = true;
        }

        Ok(config)
    }
}
