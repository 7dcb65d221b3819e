use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result};

/// Standardizes features to zero mean and unit variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Creates a scaler from stored statistics.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if `mean` and `scale` differ in length.
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self> {
        if mean.len() != scale.len() {
            return Err(MlErr::SizeMismatch {
                a: "scaler mean",
                b: "scaler scale",
                got: mean.len(),
                expected: scale.len(),
            });
        }

        Ok(Self { mean, scale })
    }

    /// Fits the per column mean and population standard deviation of `x`.
    ///
    /// Columns with no variance get a scale of 1 so they pass through centred.
    ///
    /// # Errors
    /// `MlErr::NotEnoughSamples` if `x` has no rows.
    pub fn fit(x: ArrayView2<f64>) -> Result<Self> {
        let Some(mean) = x.mean_axis(Axis(0)) else {
            return Err(MlErr::NotEnoughSamples { got: 0, needed: 1 });
        };

        let scale = x
            .std_axis(Axis(0), 0.0)
            .iter()
            .zip(&mean)
            .map(|(&std, &m)| {
                if std <= 10.0 * f64::EPSILON * m.abs().max(1.0) {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        Ok(Self {
            mean: mean.to_vec(),
            scale,
        })
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Standardizes every row of `x`.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if `x` doesn't have one column per fitted feature.
    pub fn transform(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.len() {
            return Err(MlErr::SizeMismatch {
                a: "feature columns",
                b: "scaler features",
                got: x.ncols(),
                expected: self.len(),
            });
        }

        let mean = Array1::from(self.mean.clone());
        let scale = Array1::from(self.scale.clone());
        Ok((&x - &mean) / &scale)
    }

    /// Standardizes a single feature vector. Extra values are dropped and missing ones
    /// read as the mean.
    pub fn transform_row(&self, row: &[f64]) -> Vec<f64> {
        self.mean
            .iter()
            .zip(&self.scale)
            .enumerate()
            .map(|(i, (m, s))| row.get(i).map_or(0.0, |v| (v - m) / s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn transformed_train_data_is_standardized() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 60.0], [6.0, 30.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();
        let z = scaler.transform(x.view()).unwrap();

        let mean = z.mean_axis(Axis(0)).unwrap();
        let std = z.std_axis(Axis(0), 0.0);
        for j in 0..2 {
            assert!(mean[j].abs() < 1e-12);
            assert!((std[j] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_columns_keep_unit_scale() {
        let x = array![[0.1, 1.0], [0.1, 2.0], [0.1, 3.0]];
        let scaler = StandardScaler::fit(x.view()).unwrap();
        assert_eq!(scaler.scale()[0], 1.0);
        assert!(scaler.transform_row(&[0.1, 2.0])[0].abs() < 1e-12);
    }

    #[test]
    fn rejects_wrong_width() {
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        assert!(scaler.transform(array![[1.0, 2.0]].view()).is_err());
        assert!(StandardScaler::fit(Array2::<f64>::zeros((0, 3)).view()).is_err());
    }
}
