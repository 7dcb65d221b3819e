use ndarray::{ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Fit quality of a trained regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub train_r2: f64,
    pub test_r2: f64,
    pub test_mse: f64,
    pub train_samples: usize,
    pub test_samples: usize,
}

/// Mean squared error over every element.
pub fn mean_squared_error(y_true: ArrayView2<f64>, y_pred: ArrayView2<f64>) -> f64 {
    (&y_pred - &y_true)
        .mapv(|x| x.powi(2))
        .mean()
        .unwrap_or_default()
}

/// The coefficient of determination, averaged uniformly across target columns.
///
/// A constant target column scores 1 when predicted exactly and 0 otherwise.
pub fn r2_score(y_true: ArrayView2<f64>, y_pred: ArrayView2<f64>) -> f64 {
    let Some(mean) = y_true.mean_axis(Axis(0)) else {
        return 0.0;
    };

    let scores: Vec<f64> = y_true
        .columns()
        .into_iter()
        .zip(y_pred.columns())
        .zip(&mean)
        .map(|((truth, pred), &m)| {
            let ss_res: f64 = truth.iter().zip(&pred).map(|(t, p)| (t - p).powi(2)).sum();
            let ss_tot: f64 = truth.iter().map(|t| (t - m).powi(2)).sum();

            if ss_tot == 0.0 {
                if ss_res == 0.0 { 1.0 } else { 0.0 }
            } else {
                1.0 - ss_res / ss_tot
            }
        })
        .collect();

    scores.iter().sum::<f64>() / scores.len().max(1) as f64
}
