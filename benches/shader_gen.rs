//! Benchmarks for shader generation and the CPU simulation step.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec3, Vec4};

use glowfield::effects;
use glowfield::formation::Formation;
use glowfield::physics::{CpuSim, PhysicsParams};
use glowfield::shader;
use glowfield::visuals;

fn bench_shader_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("shader_generation");

    group.bench_function("sim", |b| b.iter(|| black_box(shader::sim_wgsl())));
    group.bench_function("render_sim", |b| {
        b.iter(|| black_box(shader::render_wgsl(true)))
    });
    group.bench_function("render_fallback", |b| {
        b.iter(|| black_box(shader::render_wgsl(false)))
    });
    group.bench_function("effect_dispatch", |b| {
        b.iter(|| black_box(effects::dispatch_wgsl()))
    });
    group.bench_function("color_dispatch", |b| {
        b.iter(|| black_box(visuals::color_dispatch_wgsl()))
    });

    group.finish();
}

fn bench_cpu_sim(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_sim_step");
    let params = PhysicsParams::default();
    let hands = [
        Vec3::new(5.0, 0.0, 0.0).extend(1.0),
        Vec4::ZERO,
    ];

    for &count in &[1_000usize, 10_000] {
        let formation = Formation::sphere(count, 30.0);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            let mut sim = CpuSim::new(count);
            let mut t = 0.0f32;
            b.iter(|| {
                t += 1.0 / 60.0;
                sim.step(&formation.positions, hands, 0.4, t, 1.0 / 60.0, &params);
                black_box(&sim.displacement);
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shader_generation, bench_cpu_sim);
criterion_main!(benches);
