use std::{fs, path::Path};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use specs::{BodyVariant, FeatureSchema};

use crate::{
    MlErr, Result,
    regression::{Metrics, Ridge, StandardScaler},
};

/// A trained regression as written to disk.
///
/// Holds everything the predictor needs to rebuild the model, including the feature
/// ordering the coefficients were fitted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionArtifact {
    pub feature_schema: FeatureSchema,
    pub num_betas: usize,
    pub alpha: f64,
    pub scaler: StandardScaler,
    /// `num_betas` rows of one coefficient per feature.
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub variant: BodyVariant,
}

impl RegressionArtifact {
    pub fn from_model(
        feature_schema: FeatureSchema,
        scaler: StandardScaler,
        ridge: &Ridge,
        alpha: f64,
        metrics: Option<Metrics>,
        variant: BodyVariant,
    ) -> Self {
        let coefficients = ridge.coef().rows().into_iter().map(|row| row.to_vec()).collect();

        Self {
            feature_schema,
            num_betas: ridge.n_targets(),
            alpha,
            scaler,
            coefficients,
            intercepts: ridge.intercept().to_vec(),
            metrics,
            variant,
        }
    }

    /// Checks that every array agrees with the schema and `num_betas`.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` describing the first disagreement.
    pub fn validate(&self) -> Result<()> {
        let features = self.feature_schema.len();

        if self.scaler.len() != features {
            return Err(MlErr::SizeMismatch {
                a: "scaler",
                b: "feature schema",
                got: self.scaler.len(),
                expected: features,
            });
        }

        if self.coefficients.len() != self.num_betas {
            return Err(MlErr::SizeMismatch {
                a: "coefficient rows",
                b: "num_betas",
                got: self.coefficients.len(),
                expected: self.num_betas,
            });
        }

        if self.intercepts.len() != self.num_betas {
            return Err(MlErr::SizeMismatch {
                a: "intercepts",
                b: "num_betas",
                got: self.intercepts.len(),
                expected: self.num_betas,
            });
        }

        if let Some(row) = self.coefficients.iter().find(|row| row.len() != features) {
            return Err(MlErr::SizeMismatch {
                a: "coefficient columns",
                b: "feature schema",
                got: row.len(),
                expected: features,
            });
        }

        Ok(())
    }

    /// Rebuilds the linear model.
    pub fn ridge(&self) -> Result<Ridge> {
        self.validate()?;

        let features = self.feature_schema.len();
        let flat: Vec<f64> = self.coefficients.iter().flatten().copied().collect();
        let coef = Array2::from_shape_vec((self.num_betas, features), flat).map_err(|_| {
            MlErr::SizeMismatch {
                a: "coefficients",
                b: "feature schema",
                got: self.coefficients.len(),
                expected: self.num_betas,
            }
        })?;

        Ridge::from_parts(coef, Array1::from(self.intercepts.clone()))
    }

    /// Writes the artifact as pretty printed JSON, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reads and validates an artifact written by `save`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let artifact: Self = serde_json::from_str(&json)?;
        artifact.validate()?;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    fn artifact() -> RegressionArtifact {
        let schema = FeatureSchema::new(vec!["height".into(), "waist".into()]);
        let scaler = StandardScaler::new(vec![170.0, 80.0], vec![10.0, 5.0]).unwrap();
        let ridge = Ridge::from_parts(array![[1.0, 0.0], [0.5, -0.5], [0.0, 2.0]], array![0.0, 1.0, -1.0])
            .unwrap();
        RegressionArtifact::from_model(schema, scaler, &ridge, 1.0, None, BodyVariant::Female)
    }

    #[test]
    fn saves_and_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("regression_model.json");

        let artifact = artifact();
        artifact.save(&path).unwrap();
        let loaded = RegressionArtifact::load(&path).unwrap();

        assert_eq!(loaded, artifact);
        assert_eq!(loaded.ridge().unwrap().coef()[[1, 1]], -0.5);
    }

    #[test]
    fn rejects_inconsistent_dimensions() {
        let mut broken = artifact();
        broken.coefficients[2].push(3.0);
        assert!(matches!(
            broken.validate(),
            Err(MlErr::SizeMismatch { a: "coefficient columns", got: 3, expected: 2, .. })
        ));

        let mut broken = artifact();
        broken.num_betas = 10;
        assert!(broken.ridge().is_err());
    }
}
