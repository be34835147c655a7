//! Leading principal component by mini-batch stochastic gradient on the sphere.
//!
//! Run with: cargo run -p riemsgd-optim --example minibatch_sphere

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use riemsgd_core::{
    cost_function::CostFunction,
    error::{ManifoldError, Result},
    observer::ConsoleObserver,
    optimizer::Solver,
    optlog::LogLevel,
    problem::Problem,
    stopping::StoppingCriterion,
    test_manifolds::TestSphereManifold,
    types::DVector,
    OptimizerResult,
};
use riemsgd_optim::{StepSizeSchedule, StochasticGradient};

/// f(x) = −1/(2n) Σᵢ (aᵢ·x)² with the gradient estimated on a random batch.
#[derive(Debug)]
struct SampleVariance {
    samples: Vec<DVector<f64>>,
    batch_size: usize,
    rng: Mutex<StdRng>,
}

impl SampleVariance {
    fn generate(scales: &[f64], n: usize, batch_size: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let samples = (0..n)
            .map(|_| {
                DVector::from_fn(scales.len(), |j, _| {
                    let z: f64 = StandardNormal.sample(&mut rng);
                    scales[j] * z
                })
            })
            .collect();
        Self {
            samples,
            batch_size,
            rng: Mutex::new(rng),
        }
    }

    fn dim(&self) -> usize {
        self.samples.first().map_or(0, |a| a.len())
    }
}

impl CostFunction<f64> for SampleVariance {
    type Point = DVector<f64>;
    type TangentVector = DVector<f64>;

    fn cost(&self, point: &DVector<f64>) -> Result<f64> {
        if point.len() != self.dim() {
            return Err(ManifoldError::dimension_mismatch(self.dim(), point.len()));
        }
        let total: f64 = self.samples.iter().map(|a| a.dot(point).powi(2)).sum();
        Ok(-0.5 * total / self.samples.len() as f64)
    }

    fn gradient(&self, point: &DVector<f64>) -> Result<DVector<f64>> {
        if point.len() != self.dim() {
            return Err(ManifoldError::dimension_mismatch(self.dim(), point.len()));
        }
        let batch = index::sample(&mut *self.rng.lock(), self.samples.len(), self.batch_size);

        let mut euclidean = DVector::zeros(point.len());
        for i in batch.iter() {
            let a = &self.samples[i];
            euclidean -= a * a.dot(point);
        }
        euclidean /= self.batch_size as f64;
        Ok(&euclidean - point * point.dot(&euclidean))
    }
}

fn main() -> OptimizerResult<()> {
    let scales = [3.0, 1.5, 1.0, 0.5, 0.5, 0.25];
    let manifold = TestSphereManifold::new(scales.len());
    let cost_fn = SampleVariance::generate(&scales, 2000, 32, 7);
    let problem = Problem::new(&manifold, &cost_fn).with_verbosity(2);

    let mut solver = StochasticGradient::with_schedule(StepSizeSchedule::decaying(0.05, 0.6))
        .with_stopping_policy(
            StoppingCriterion::new()
                .with_max_iterations(300)
                .with_min_gradient_norm(1e-8),
        )
        .with_log_level(LogLevel::Final)
        .with_observer(ConsoleObserver::stdout());

    let result = solver.solve(&problem, None)?;

    println!();
    println!("Leading direction: {:.4}", result.point().transpose());
    if let Some(log) = result.log() {
        let final_values = log.final_values();
        println!("Final cost:        {:.6}", final_values.cost);
        println!("Iterations:        {}", final_values.iterations);
        println!("Cost evaluations:  {}", final_values.cost_evaluations);
        println!("Elapsed:           {:.3?}", final_values.elapsed);
    }
    Ok(())
}
