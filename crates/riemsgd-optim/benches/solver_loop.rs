//! Benchmarks for the stochastic gradient solver loop
//!
//! Run with: cargo bench -p riemsgd-optim

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use riemsgd_core::{
    optimizer::Solver,
    optlog::LogLevel,
    problem::Problem,
    stopping::StoppingCriterion,
    test_manifolds::{TestEuclideanManifold, TestSphereManifold},
    test_utils::QuadraticCost,
    types::DVector,
};
use riemsgd_optim::{
    AdaptiveLineSearch, BacktrackingLineSearch, LineSearchStep, StepSizeSchedule,
    StochasticGradient,
};

const ITERATIONS: usize = 200;

fn criterion_for_bench() -> StoppingCriterion<f64> {
    StoppingCriterion::unbounded().with_max_iterations(ITERATIONS)
}

fn benchmark_step_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_rules");

    for &dim in &[10, 100, 1000] {
        let manifold = TestEuclideanManifold::new(dim);
        let cost_fn = QuadraticCost::new(DVector::from_element(dim, 1.0));
        let problem = Problem::new(&manifold, &cost_fn);
        let x0 = DVector::<f64>::zeros(dim);

        group.bench_with_input(BenchmarkId::new("decaying", dim), &dim, |b, _| {
            b.iter(|| {
                let mut solver =
                    StochasticGradient::with_schedule(StepSizeSchedule::decaying(0.1, 0.6))
                        .with_stopping_policy(criterion_for_bench());
                solver.solve(black_box(&problem), Some(x0.clone()))
            });
        });

        group.bench_with_input(BenchmarkId::new("backtracking", dim), &dim, |b, _| {
            b.iter(|| {
                let mut solver =
                    StochasticGradient::new(LineSearchStep::new(BacktrackingLineSearch::new()))
                        .with_stopping_policy(criterion_for_bench());
                solver.solve(black_box(&problem), Some(x0.clone()))
            });
        });

        group.bench_with_input(BenchmarkId::new("adaptive", dim), &dim, |b, _| {
            b.iter(|| {
                let mut solver =
                    StochasticGradient::new(LineSearchStep::new(AdaptiveLineSearch::new()))
                        .with_stopping_policy(criterion_for_bench());
                solver.solve(black_box(&problem), Some(x0.clone()))
            });
        });
    }

    group.finish();
}

fn benchmark_log_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_levels");
    let dim = 100;
    let manifold = TestSphereManifold::new(dim);
    let cost_fn = QuadraticCost::new(DVector::from_element(dim, 0.5));
    let problem = Problem::new(&manifold, &cost_fn);
    let mut x0 = DVector::<f64>::zeros(dim);
    x0[0] = 1.0;

    for (label, level) in [
        ("none", LogLevel::None),
        ("final", LogLevel::Final),
        ("iterations", LogLevel::Iterations),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut solver =
                    StochasticGradient::with_schedule(StepSizeSchedule::constant(0.01))
                        .with_stopping_policy(criterion_for_bench())
                        .with_log_level(level);
                solver.solve(black_box(&problem), Some(x0.clone()))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_step_rules, benchmark_log_levels);
criterion_main!(benches);
