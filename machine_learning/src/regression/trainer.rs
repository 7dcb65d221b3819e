use log::info;
use specs::BodyVariant;

use super::{
    Metrics, Ridge, StandardScaler, TrainingConfig, mean_squared_error, r2_score,
    train_test_split,
};
use crate::{Corpus, MlErr, RegressionArtifact, Result};

/// Fits the measurements to betas regression.
#[derive(Debug, Clone, Default)]
pub struct RegressionTrainer {
    config: TrainingConfig,
}

impl RegressionTrainer {
    /// Creates a new `RegressionTrainer`.
    ///
    /// # Arguments
    /// * `config` - The split, seed and penalty to train with.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Splits the corpus, standardizes its features with train statistics and fits a ridge
    /// regression on them.
    ///
    /// # Arguments
    /// * `corpus` - The labelled samples.
    /// * `variant` - The body variant the corpus was generated from, recorded in the artifact.
    ///
    /// # Returns
    /// The trained artifact along with its train and test scores. There is no acceptance
    /// threshold.
    ///
    /// # Errors
    /// If the corpus has fewer than two samples, the split leaves a partition empty or the
    /// normal equations can't be solved.
    pub fn train(&self, corpus: &Corpus, variant: BodyVariant) -> Result<RegressionArtifact> {
        let &TrainingConfig {
            test_fraction,
            seed,
            alpha,
        } = &self.config;

        if corpus.len() < 2 {
            return Err(MlErr::NotEnoughSamples {
                got: corpus.len(),
                needed: 2,
            });
        }

        let split = train_test_split(corpus.len(), test_fraction, seed)?;
        let (x_train, y_train) = corpus.select(&split.train);
        let (x_test, y_test) = corpus.select(&split.test);

        info!(
            train = split.train.len(),
            test = split.test.len(),
            alpha = alpha;
            "fitting ridge regression"
        );

        let scaler = StandardScaler::fit(x_train.view())?;
        let x_train = scaler.transform(x_train.view())?;
        let x_test = scaler.transform(x_test.view())?;

        let ridge = Ridge::fit(x_train.view(), y_train.view(), alpha)?;

        let train_pred = ridge.predict(x_train.view());
        let test_pred = ridge.predict(x_test.view());
        let metrics = Metrics {
            train_r2: r2_score(y_train.view(), train_pred.view()),
            test_r2: r2_score(y_test.view(), test_pred.view()),
            test_mse: mean_squared_error(y_test.view(), test_pred.view()),
            train_samples: split.train.len(),
            test_samples: split.test.len(),
        };

        info!(
            train_r2 = metrics.train_r2,
            test_r2 = metrics.test_r2,
            test_mse = metrics.test_mse;
            "trained regression"
        );

        Ok(RegressionArtifact::from_model(
            corpus.schema().clone(),
            scaler,
            &ridge,
            alpha,
            Some(metrics),
            variant,
        ))
    }
}
