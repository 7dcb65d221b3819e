//! Training and inference of the measurements to shape coefficients regression.

mod artifact;
mod dataset;
pub mod error;
mod predictor;
pub mod regression;
pub mod synthetic;

pub use artifact::RegressionArtifact;
pub use dataset::{Corpus, corpus_path};
pub use error::{MlErr, Result};
pub use predictor::Predictor;
pub use synthetic::{GenerationStats, GeneratorConfig, SyntheticGenerator};
