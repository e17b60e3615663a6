use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use splat_viewer::camera::{CameraMode, OrbitCamera};
use splat_viewer::descriptor::{self, Viewport};
use splat_viewer::{PointRenderer, RenderOptions, SceneHandle, SplatRenderer};

/// Deterministic pseudo-random point inside the unit-ish cube
fn scatter_point(seed: u32) -> Vec3 {
    let f = |k: f32| ((seed as f32 * k).sin() * 43_758.547).fract() * 2.0 - 1.0;
    Vec3::new(f(12.9898), f(78.233), f(37.719))
}

fn synthetic_cloud(count: usize) -> SceneHandle {
    let positions: Vec<Vec3> = (0..count as u32).map(scatter_point).collect();
    let colors = (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            [t, 1.0 - t, 0.5]
        })
        .collect();
    SceneHandle::from_points(positions, colors)
}

fn bench_render_scaling(c: &mut Criterion) {
    let viewport = Viewport::new(800, 600);
    let camera = OrbitCamera::new(viewport, 2.0, 60.0);
    let desc = descriptor::build(&camera, viewport, CameraMode::Free);
    let options = RenderOptions::default();

    let mut group = c.benchmark_group("point_renderer");
    for count in [1_000, 10_000, 100_000] {
        let scene = synthetic_cloud(count);
        group.bench_with_input(BenchmarkId::new("render", count), &scene, |b, scene| {
            let mut renderer = PointRenderer::new();
            b.iter(|| {
                let out = renderer
                    .render(black_box(&desc), scene, &options, [0.0, 0.0, 0.0])
                    .unwrap();
                black_box(out)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render_scaling);
criterion_main!(benches);
