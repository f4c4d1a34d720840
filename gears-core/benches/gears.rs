use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gears_core::{build_gear, RenderSink, Scene};
use gears_core::{GearMesh, GearUniforms};

/// Sink that only touches the uniforms, so the benchmark measures composition.
struct NullSink(f32);

impl RenderSink for NullSink {
    fn draw_gear(&mut self, mesh: &GearMesh, uniforms: &GearUniforms) {
        self.0 += uniforms.model_view_projection[0] + mesh.vertex_count() as f32;
    }
}

fn bench_build_gear(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_gear");
    for teeth in [10u32, 20, 100] {
        group.bench_function(format!("{}_teeth", teeth), |b| {
            b.iter(|| build_gear(black_box(1.0), 4.0, 1.0, black_box(teeth), 0.7))
        });
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut scene = Scene::new(400, 400).expect("scene");
    let mut sink = NullSink(0.0);

    c.bench_function("compose_frame", |b| {
        b.iter(|| {
            scene.update(black_box(1.0 / 60.0));
            scene.draw(&mut sink);
        })
    });
    black_box(sink.0);
}

criterion_group!(benches, bench_build_gear, bench_frame);
criterion_main!(benches);
