use std::io::Write;

use splat_viewer::SceneHandle;
use tempfile::NamedTempFile;

fn binary_le_ply(points: &[([f32; 3], [u8; 3])]) -> Vec<u8> {
    let mut bytes = Vec::new();
    write!(
        bytes,
        "ply\nformat binary_little_endian 1.0\nelement vertex {}\n\
         property float x\nproperty float y\nproperty float z\n\
         property uchar red\nproperty uchar green\nproperty uchar blue\n\
         end_header\n",
        points.len()
    )
    .unwrap();

    for (pos, rgb) in points {
        for v in pos {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.extend_from_slice(rgb);
    }
    bytes
}

#[test]
fn load_binary_little_endian_ply_from_disk() {
    let data = binary_le_ply(&[
        ([1.0, 2.0, 3.0], [255, 0, 0]),
        ([-1.0, 0.5, 0.0], [0, 0, 255]),
    ]);

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let scene = SceneHandle::load_ply(file.path()).unwrap();
    assert_eq!(scene.len(), 2);
    assert_eq!(scene.positions[0], glam::Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(scene.colors[0], [1.0, 0.0, 0.0]);
    assert_eq!(scene.colors[1], [0.0, 0.0, 1.0]);
}

#[test]
fn load_missing_file_reports_path() {
    let err = SceneHandle::load_ply("/nonexistent/point_cloud.ply").unwrap_err();
    assert!(err.to_string().contains("point_cloud.ply"));
}

#[test]
fn centroid_averages_positions() {
    let data = binary_le_ply(&[
        ([0.0, 0.0, 0.0], [255, 255, 255]),
        ([2.0, 4.0, 6.0], [255, 255, 255]),
    ]);

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let scene = SceneHandle::load_ply(file.path()).unwrap();
    assert_eq!(scene.centroid(), glam::Vec3::new(1.0, 2.0, 3.0));
}
