//! Ridge regression from measurements to shape coefficients.

mod config;
mod linalg;
mod metrics;
mod ridge;
mod scaler;
mod split;
mod trainer;

pub use config::{DEFAULT_ALPHA, DEFAULT_SEED, DEFAULT_TEST_FRACTION, TrainingConfig};
pub use linalg::cholesky_solve;
pub use metrics::{Metrics, mean_squared_error, r2_score};
pub use ridge::Ridge;
pub use scaler::StandardScaler;
pub use split::{Split, train_test_split};
pub use trainer::RegressionTrainer;
