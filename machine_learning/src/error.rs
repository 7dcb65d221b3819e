use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use anthropometry::MeasureErr;
use body_model::ModelErr;
use safetensors::SafeTensorError;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
    NotEnoughSamples {
        got: usize,
        needed: usize,
    },
    SingularSystem {
        pivot: usize,
    },
    InvalidConfig(String),
    MissingTensor(&'static str),
    UnsupportedDtype {
        tensor: &'static str,
        dtype: String,
    },
    Io(io::Error),
    Json(serde_json::Error),
    Format(SafeTensorError),
    Model(ModelErr),
    Measure(MeasureErr),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
            MlErr::NotEnoughSamples { got, needed } => {
                write!(f, "Not enough samples, got {got} and needed at least {needed}")
            }
            MlErr::SingularSystem { pivot } => write!(
                f,
                "The normal equations are not positive definite, failed at pivot {pivot}"
            ),
            MlErr::InvalidConfig(msg) => write!(f, "Invalid training configuration: {msg}"),
            MlErr::MissingTensor(name) => write!(f, "The corpus file has no {name:?} tensor"),
            MlErr::UnsupportedDtype { tensor, dtype } => {
                write!(f, "The corpus tensor {tensor} has unsupported dtype {dtype}")
            }
            MlErr::Io(e) => write!(f, "io error: {e}"),
            MlErr::Json(e) => write!(f, "json error: {e}"),
            MlErr::Format(e) => write!(f, "safetensors error: {e}"),
            MlErr::Model(e) => write!(f, "body model error: {e}"),
            MlErr::Measure(e) => write!(f, "measurement error: {e}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io(e) => Some(e),
            MlErr::Json(e) => Some(e),
            MlErr::Format(e) => Some(e),
            MlErr::Model(e) => Some(e),
            MlErr::Measure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MlErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for MlErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<SafeTensorError> for MlErr {
    fn from(value: SafeTensorError) -> Self {
        Self::Format(value)
    }
}

impl From<ModelErr> for MlErr {
    fn from(value: ModelErr) -> Self {
        Self::Model(value)
    }
}

impl From<MeasureErr> for MlErr {
    fn from(value: MeasureErr) -> Self {
        Self::Measure(value)
    }
}
