use serde::{Deserialize, Serialize};

pub const DEFAULT_TEST_FRACTION: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_ALPHA: f64 = 1.0;

/// How a regression is fitted from a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// The share of samples held out for evaluation.
    pub test_fraction: f64,
    /// Seeds the train/test shuffle.
    pub seed: u64,
    /// The ridge penalty.
    pub alpha: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: DEFAULT_SEED,
            alpha: DEFAULT_ALPHA,
        }
    }
}
