//! Shared fixtures for the solver integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use riemsgd_core::{
    cost_function::CostFunction,
    error::{ManifoldError, Result},
    observer::SolverObserver,
    stopping::Termination,
    types::DVector,
};
use std::sync::Arc;

/// Leading eigenvector of the sample covariance, posed on the unit sphere.
///
/// f(x) = −1/(2n) Σᵢ (aᵢ·x)². The gradient is estimated from a mini-batch
/// drawn without replacement on every call.
#[derive(Debug)]
pub struct MiniBatchPca {
    samples: Vec<DVector<f64>>,
    batch_size: usize,
    rng: Mutex<StdRng>,
}

impl MiniBatchPca {
    /// `n` samples in R^`scales.len()` with per-coordinate standard deviation
    /// `scales[j]`.
    pub fn new(scales: &[f64], n: usize, batch_size: usize, seed: u64) -> Self {
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
            batch_size: batch_size.min(n),
            rng: Mutex::new(rng),
        }
    }

    fn check(&self, point: &DVector<f64>) -> Result<()> {
        let dim = self.samples[0].len();
        if point.len() == dim {
            Ok(())
        } else {
            Err(ManifoldError::dimension_mismatch(dim, point.len()))
        }
    }
}

impl CostFunction<f64> for MiniBatchPca {
    type Point = DVector<f64>;
    type TangentVector = DVector<f64>;

    fn cost(&self, point: &DVector<f64>) -> Result<f64> {
        self.check(point)?;
        let total: f64 = self.samples.iter().map(|a| a.dot(point).powi(2)).sum();
        Ok(-0.5 * total / self.samples.len() as f64)
    }

    fn gradient(&self, point: &DVector<f64>) -> Result<DVector<f64>> {
        self.check(point)?;
        let batch = {
            let mut rng = self.rng.lock();
            index::sample(&mut *rng, self.samples.len(), self.batch_size)
        };

        let mut euclidean = DVector::zeros(point.len());
        for i in batch.iter() {
            let a = &self.samples[i];
            euclidean -= a * a.dot(point);
        }
        euclidean /= self.batch_size as f64;

        // Project onto the tangent space of the sphere at `point`.
        Ok(&euclidean - point * point.dot(&euclidean))
    }
}

/// Counts of observer events, shared with the test after the solver is done.
#[derive(Debug, Default)]
pub struct ObserverLog {
    pub started: usize,
    pub iterations: Vec<usize>,
    pub terminations: Vec<Termination>,
}

/// Observer that records every event into a shared [`ObserverLog`].
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub events: Arc<Mutex<ObserverLog>>,
}

impl SolverObserver<f64> for RecordingObserver {
    fn on_start(&mut self) {
        self.events.lock().started += 1;
    }

    fn on_iteration(&mut self, iteration: usize, _cost: f64, _gradient_norm: f64) {
        self.events.lock().iterations.push(iteration);
    }

    fn on_termination(&mut self, termination: &Termination) {
        self.events.lock().terminations.push(*termination);
    }
}
