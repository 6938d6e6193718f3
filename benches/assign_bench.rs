//! Criterion benchmarks for model construction and solving.
//!
//! Instances are generated from a fixed seed so runs are comparable.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_assign::assign::{AssignmentModelBuilder, AssignmentRunner, ModelConfig, ProblemData, Task, Worker};
use u_assign::cp::{BranchAndBoundSolver, SolverConfig};

const SKILLS: [&str; 3] = ["backend", "frontend", "ops"];

fn random_problem(workers: usize, tasks: usize, seed: u64) -> ProblemData {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builder = ProblemData::builder();

    for w in 0..workers {
        let mut worker = Worker::new(format!("w{w}"), rng.random_range(4..=8));
        for skill in SKILLS {
            worker = worker.with_skill(skill, rng.random_range(0..=3));
        }
        if rng.random_bool(0.5) {
            worker = worker.with_overtime(10);
        }
        builder = builder.worker(worker);
    }
    for t in 0..tasks {
        let mut task = Task::new(format!("t{t}"), rng.random_range(150..=400))
            .with_effort(rng.random_range(0..=6));
        for skill in SKILLS {
            task = task.requires(skill, rng.random_range(0..=2));
        }
        builder = builder.task(task);
    }
    for w in 0..workers {
        for t in 0..tasks {
            builder = builder
                .cost(format!("w{w}"), format!("t{t}"), rng.random_range(50..=200))
                .preference(format!("w{w}"), format!("t{t}"), rng.random_range(0..=5));
        }
    }
    builder.build().expect("generated data is consistent")
}

const SIZES: [(usize, usize); 3] = [(4, 3), (6, 4), (8, 5)];

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for &(w, t) in &SIZES {
        let data = random_problem(w, t, 42);
        let config = ModelConfig::general();
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{w}x{t}")),
            &(data, config),
            |b, (d, c)| {
                b.iter(|| {
                    let built = AssignmentModelBuilder::new(black_box(d), black_box(c)).build();
                    black_box(built)
                })
            },
        );
    }
    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    group.sample_size(10);

    let solver = BranchAndBoundSolver::new();
    let limits = SolverConfig::default().with_node_limit(200_000);
    for &(w, t) in &SIZES {
        let data = random_problem(w, t, 42);
        for (name, config) in [("strict", ModelConfig::strict()), ("general", ModelConfig::general())] {
            group.bench_with_input(
                BenchmarkId::new(name, format!("{w}x{t}")),
                &(&data, config),
                |b, (d, c)| {
                    b.iter(|| {
                        let report = AssignmentRunner::run(black_box(*d), black_box(c), &solver, &limits);
                        black_box(report)
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_solve);
criterion_main!(benches);
