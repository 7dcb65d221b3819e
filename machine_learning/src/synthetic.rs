//! Synthetic training data: random bodies labelled with their own measurements.

use std::sync::atomic::{AtomicUsize, Ordering};

use anthropometry::Heuristic;
use body_model::{Betas, BodyModel, NUM_BETAS};
use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::Uniform;
use rayon::prelude::*;
use specs::MeasurementSet;

use crate::{Corpus, MlErr, Result};

pub const DEFAULT_SAMPLES: usize = 10_000;

/// Betas are drawn per component from `[-BETA_RANGE, BETA_RANGE)`.
pub const BETA_RANGE: f32 = 3.0;

/// How a corpus is generated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    pub samples: usize,
    pub seed: u64,
    pub heuristic: Heuristic,
    /// Logs progress every this many evaluated samples, 0 disables progress logs.
    pub log_every: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            seed: 42,
            heuristic: Heuristic::default(),
            log_every: 1000,
        }
    }
}

/// Counters of a generation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub requested: usize,
    pub kept: usize,
    pub discarded: usize,
    /// Kept samples whose measurement took at least one fallback.
    pub degraded: usize,
}

struct Labelled {
    betas: [f32; NUM_BETAS],
    measurements: MeasurementSet,
    degraded: bool,
}

/// Samples random bodies from a model and labels them with the measurement heuristic.
pub struct SyntheticGenerator<'a> {
    model: &'a dyn BodyModel,
    config: GeneratorConfig,
}

impl<'a> SyntheticGenerator<'a> {
    /// Creates a new `SyntheticGenerator`.
    ///
    /// # Arguments
    /// * `model` - The body model to evaluate.
    /// * `config` - The sample count, seed and heuristic.
    pub fn new(model: &'a dyn BodyModel, config: GeneratorConfig) -> Self {
        Self { model, config }
    }

    /// Draws `count` beta vectors from `rng`.
    pub fn sample_betas<R: Rng>(rng: &mut R, count: usize) -> Result<Vec<[f32; NUM_BETAS]>> {
        let dist = Uniform::new(-BETA_RANGE, BETA_RANGE)
            .map_err(|e| MlErr::InvalidConfig(e.to_string()))?;

        let samples = (0..count)
            .map(|_| {
                let mut betas = [0.0; NUM_BETAS];
                for b in &mut betas {
                    *b = rng.sample(&dist);
                }
                betas
            })
            .collect();

        Ok(samples)
    }

    /// Generates the corpus.
    ///
    /// Betas are drawn sequentially from a seeded rng and evaluated in parallel, so the
    /// corpus only depends on the seed. Samples with any measurement outside its valid
    /// range are dropped, not redrawn.
    ///
    /// # Errors
    /// If the body model fails to evaluate or yields an unmeasurable mesh.
    pub fn generate(&self) -> Result<(Corpus, GenerationStats)> {
        let GeneratorConfig {
            samples,
            seed,
            heuristic,
            log_every,
        } = self.config;

        let mut rng = StdRng::seed_from_u64(seed);
        let drawn = Self::sample_betas(&mut rng, samples)?;

        info!(
            samples = samples,
            seed = seed,
            heuristic = heuristic.as_str(),
            variant = self.model.variant().as_str();
            "generating synthetic bodies"
        );

        let done = AtomicUsize::new(0);
        let labelled = drawn
            .into_par_iter()
            .map(|betas| -> Result<Labelled> {
                let mesh = self.model.evaluate(&Betas::new(betas))?;
                let report = heuristic.measure(&mesh.vertices, &betas)?;

                let count = done.fetch_add(1, Ordering::Relaxed) + 1;
                if log_every > 0 && count % log_every == 0 {
                    info!("evaluated {count}/{samples} synthetic bodies");
                }

                Ok(Labelled {
                    betas,
                    degraded: report.is_degraded(),
                    measurements: report.measurements,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let kept: Vec<&Labelled> = labelled
            .iter()
            .filter(|sample| sample.measurements.is_valid())
            .collect();

        let stats = GenerationStats {
            requested: samples,
            kept: kept.len(),
            discarded: samples - kept.len(),
            degraded: kept.iter().filter(|sample| sample.degraded).count(),
        };

        info!(
            requested = stats.requested,
            kept = stats.kept,
            discarded = stats.discarded,
            degraded = stats.degraded;
            "synthetic corpus ready"
        );

        let corpus = Corpus::from_samples(kept.iter().map(|s| (&s.measurements, &s.betas)));
        Ok((corpus, stats))
    }
}
