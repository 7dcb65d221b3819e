use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::linalg::cholesky_solve;
use crate::{MlErr, Result};

/// A multi output linear model fitted with an L2 penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct Ridge {
    // (targets, features)
    coef: Array2<f64>,
    // (targets,)
    intercept: Array1<f64>,
}

impl Ridge {
    /// Creates a model from stored parameters.
    ///
    /// # Errors
    /// `MlErr::SizeMismatch` if there isn't one intercept per row of `coef`.
    pub fn from_parts(coef: Array2<f64>, intercept: Array1<f64>) -> Result<Self> {
        if coef.nrows() != intercept.len() {
            return Err(MlErr::SizeMismatch {
                a: "coefficient rows",
                b: "intercepts",
                got: coef.nrows(),
                expected: intercept.len(),
            });
        }

        Ok(Self { coef, intercept })
    }

    /// Fits `y ≈ x · coefᵀ + intercept` minimizing `‖y - ŷ‖² + alpha · ‖coef‖²`.
    ///
    /// The data is centred first so the intercept is not penalized.
    ///
    /// # Arguments
    /// * `x` - The `(n, features)` design matrix.
    /// * `y` - The `(n, targets)` targets.
    /// * `alpha` - The penalty strength.
    ///
    /// # Errors
    /// On mismatched row counts, an empty design matrix or a singular system.
    pub fn fit(x: ArrayView2<f64>, y: ArrayView2<f64>, alpha: f64) -> Result<Self> {
        if x.nrows() != y.nrows() {
            return Err(MlErr::SizeMismatch {
                a: "design rows",
                b: "target rows",
                got: x.nrows(),
                expected: y.nrows(),
            });
        }

        let (Some(x_mean), Some(y_mean)) = (x.mean_axis(Axis(0)), y.mean_axis(Axis(0))) else {
            return Err(MlErr::NotEnoughSamples { got: 0, needed: 1 });
        };

        let xc = &x - &x_mean;
        let yc = &y - &y_mean;

        let mut gram = xc.t().dot(&xc);
        gram.diag_mut().mapv_inplace(|d| d + alpha);
        let rhs = xc.t().dot(&yc);

        // (features, targets)
        let w = cholesky_solve(gram.view(), rhs.view())?;
        let intercept = &y_mean - &x_mean.dot(&w);

        Ok(Self {
            coef: w.reversed_axes(),
            intercept,
        })
    }

    pub fn coef(&self) -> ArrayView2<'_, f64> {
        self.coef.view()
    }

    pub fn intercept(&self) -> ArrayView1<'_, f64> {
        self.intercept.view()
    }

    pub fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    pub fn n_targets(&self) -> usize {
        self.coef.nrows()
    }

    /// Predicts one row of targets per row of `x`.
    pub fn predict(&self, x: ArrayView2<f64>) -> Array2<f64> {
        x.dot(&self.coef.t()) + &self.intercept
    }

    /// Predicts the targets of one feature vector of length `n_features`.
    pub fn predict_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        self.coef.dot(&row) + &self.intercept
    }
}
