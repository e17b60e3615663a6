use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use glam::Vec3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::scene::SceneHandle;

/// Zeroth-order spherical harmonic basis constant; converts Gaussian-splat
/// `f_dc_*` coefficients to linear color
const SH_C0: f32 = 0.282_094_8;

/// Color assigned when the file carries no usable color properties
const FALLBACK_GRAY: [f32; 3] = [0.5, 0.5, 0.5];

/// Load point positions and colors from a PLY file.
///
/// Accepts ascii and binary_little_endian files. Colors come from
/// `red/green/blue` bytes when present, otherwise from splat `f_dc_0..2`
/// spherical-harmonic DC terms; unknown properties are skipped.
pub fn load_point_cloud(path: &Path) -> Result<SceneHandle> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    read_point_cloud(&mut reader)
}

/// Parse a PLY point cloud from any buffered reader.
pub fn read_point_cloud<R: BufRead>(reader: &mut R) -> Result<SceneHandle> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(reader).context("malformed PLY file")?;

    let Some(vertices) = ply.payload.get("vertex") else {
        bail!("PLY file has no vertex element");
    };

    let mut positions = Vec::with_capacity(vertices.len());
    let mut colors = Vec::with_capacity(vertices.len());

    for vertex in vertices {
        let x = scalar(vertex, "x").context("vertex missing x")?;
        let y = scalar(vertex, "y").context("vertex missing y")?;
        let z = scalar(vertex, "z").context("vertex missing z")?;
        positions.push(Vec3::new(x as f32, y as f32, z as f32));
        colors.push(vertex_color(vertex));
    }

    Ok(SceneHandle::from_points(positions, colors))
}

fn vertex_color(vertex: &DefaultElement) -> [f32; 3] {
    if let (Some(r), Some(g), Some(b)) = (
        scalar(vertex, "red"),
        scalar(vertex, "green"),
        scalar(vertex, "blue"),
    ) {
        return [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
    }

    if let (Some(r), Some(g), Some(b)) = (
        scalar(vertex, "f_dc_0"),
        scalar(vertex, "f_dc_1"),
        scalar(vertex, "f_dc_2"),
    ) {
        return [
            (0.5 + SH_C0 * r as f32).clamp(0.0, 1.0),
            (0.5 + SH_C0 * g as f32).clamp(0.0, 1.0),
            (0.5 + SH_C0 * b as f32).clamp(0.0, 1.0),
        ];
    }

    FALLBACK_GRAY
}

/// Read one scalar property as f64, whatever its declared width.
fn scalar(vertex: &DefaultElement, name: &str) -> Option<f64> {
    match vertex.get(name)? {
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        _ => None,
    }
}
