use std::path::Path;

use anyhow::Result;
use glam::Vec3;

use crate::loaders::ply;

/// Loaded point-based scene: positions with per-point linear RGB.
///
/// The viewer core treats the scene as opaque data for the renderer
/// boundary; nothing here is interpreted by the camera or frame loop.
#[derive(Debug, Clone)]
pub struct SceneHandle {
    pub positions: Vec<Vec3>,
    pub colors: Vec<[f32; 3]>,
}

impl SceneHandle {
    pub fn from_points(positions: Vec<Vec3>, colors: Vec<[f32; 3]>) -> Self {
        debug_assert_eq!(positions.len(), colors.len());
        Self { positions, colors }
    }

    /// Load a point cloud from a PLY file (ascii or binary little endian).
    pub fn load_ply<P: AsRef<Path>>(path: P) -> Result<Self> {
        let scene = ply::load_point_cloud(path.as_ref())?;
        log::info!(
            "loaded {} points from {}",
            scene.len(),
            path.as_ref().display()
        );
        Ok(scene)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Centroid of the cloud, for startup telemetry.
    pub fn centroid(&self) -> Vec3 {
        if self.positions.is_empty() {
            return Vec3::ZERO;
        }
        self.positions.iter().sum::<Vec3>() / self.positions.len() as f32
    }
}
