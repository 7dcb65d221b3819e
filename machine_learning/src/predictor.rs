use std::path::Path;

use body_model::{Betas, NUM_BETAS};
use log::{info, warn};
use ndarray::Array1;
use specs::{FeatureSchema, MeasurementSet, Outcome};

use crate::{
    MlErr, RegressionArtifact, Result,
    regression::{Ridge, StandardScaler},
};

const NO_MODEL: &str = "no regression model loaded, using the average body";

struct Loaded {
    schema: FeatureSchema,
    scaler: StandardScaler,
    ridge: Ridge,
}

/// Predicts betas from measurements with a trained artifact.
///
/// Without an artifact every prediction is the all zero (average) body, tagged as
/// degraded.
pub struct Predictor {
    model: Option<Loaded>,
}

impl Predictor {
    /// A predictor with no artifact.
    pub fn unloaded() -> Self {
        Self { model: None }
    }

    /// Builds a predictor from an artifact.
    ///
    /// The artifact's feature ordering is used as recorded. An ordering other than the
    /// canonical one is only warned about.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if the artifact doesn't predict exactly `NUM_BETAS` values or
    /// its arrays are inconsistent.
    pub fn from_artifact(artifact: RegressionArtifact) -> Result<Self> {
        if artifact.num_betas != NUM_BETAS {
            return Err(MlErr::SizeMismatch {
                a: "artifact betas",
                b: "shape components",
                got: artifact.num_betas,
                expected: NUM_BETAS,
            });
        }

        let ridge = artifact.ridge()?;
        if !artifact.feature_schema.is_canonical() {
            warn!(
                "regression artifact feature ordering {:?} differs from the canonical {:?}",
                artifact.feature_schema.keys(),
                FeatureSchema::canonical().keys()
            );
        }

        Ok(Self {
            model: Some(Loaded {
                schema: artifact.feature_schema,
                scaler: artifact.scaler,
                ridge,
            }),
        })
    }

    /// Loads the artifact at `path`.
    ///
    /// A missing file is not an error, the predictor starts degraded.
    ///
    /// # Errors
    /// When the file exists but can't be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("regression model not found at {}, {NO_MODEL}", path.display());
            return Ok(Self::unloaded());
        }

        let predictor = Self::from_artifact(RegressionArtifact::load(path)?)?;
        info!("loaded regression model from {}", path.display());
        Ok(predictor)
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Predicts the betas for `set`.
    ///
    /// Values are laid out in the artifact's order, keys the set doesn't have read as 0.
    pub fn predict(&self, set: &MeasurementSet) -> Outcome<Betas> {
        let Some(model) = &self.model else {
            warn!("{NO_MODEL}");
            return Outcome::degraded(Betas::zeros(), NO_MODEL);
        };

        let features = model.scaler.transform_row(&model.schema.features(set));
        let out = model.ridge.predict_row(Array1::from(features).view());

        let mut betas = [0.0; NUM_BETAS];
        for (b, v) in betas.iter_mut().zip(out.iter()) {
            *b = *v as f32;
        }

        Outcome::Ok(Betas::new(betas))
    }
}
