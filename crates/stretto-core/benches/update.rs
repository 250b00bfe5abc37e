// Benchmark for the per-cycle update hot path.
// Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use stretto_core::generator::Generator;
use stretto_core::params::{InputParameter, OutputParameter};

fn bench_sampling(c: &mut Criterion) {
    // Targets far enough away that the trajectory outlives the benchmark.
    let input = InputParameter::<3> {
        target_position: [1.0e6, -2.0e6, 0.5e6],
        max_velocity: [1.0; 3],
        max_acceleration: [2.0; 3],
        max_jerk: [4.0; 3],
        ..InputParameter::default()
    };

    c.bench_function("update 3 axes, no replan", |b| {
        let mut generator = Generator::new(0.001);
        let mut output = OutputParameter::default();
        let mut next = input.clone();
        generator.update(&next, &mut output).unwrap();
        b.iter(|| {
            next.current_position = output.new_position;
            next.current_velocity = output.new_velocity;
            next.current_acceleration = output.new_acceleration;
            generator.update(&next, &mut output).unwrap();
        });
    });
}

fn bench_planning(c: &mut Criterion) {
    c.bench_function("full plan 3 axes", |b| {
        let mut generator = Generator::new(0.001);
        let mut output = OutputParameter::default();
        let mut input = InputParameter::<3> {
            target_position: [1.0, -2.0, 0.5],
            max_velocity: [1.0; 3],
            max_acceleration: [2.0; 3],
            max_jerk: [4.0; 3],
            ..InputParameter::default()
        };
        let mut flip = 1.0;
        b.iter(|| {
            // Alternate the target so every update replans.
            flip = -flip;
            input.target_position[0] = flip;
            generator.update(&input, &mut output).unwrap();
        });
    });
}

criterion_group!(benches, bench_sampling, bench_planning);
criterion_main!(benches);
