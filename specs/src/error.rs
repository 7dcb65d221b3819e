use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::measurement::{MeasurementField, ValidRange};

/// The result type used across the specs crate.
pub type Result<T> = std::result::Result<T, SpecErr>;

/// Errors produced while building or checking measurement sets.
#[derive(Debug)]
pub enum SpecErr {
    OutOfRange {
        field: MeasurementField,
        value: f64,
        range: ValidRange,
    },
    MissingField(MeasurementField),
    UnknownField(String),
    InvalidVariant(String),
    Json(serde_json::Error),
}

impl Display for SpecErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecErr::OutOfRange { field, value, range } => write!(
                f,
                "Measurements out of valid range: {field} = {value} is outside [{}, {}]",
                range.min, range.max
            ),
            SpecErr::MissingField(field) => write!(f, "missing measurement {field}"),
            SpecErr::UnknownField(key) => write!(f, "unknown measurement {key:?}"),
            SpecErr::InvalidVariant(got) => {
                write!(f, "Invalid gender {got:?}, expected neutral, male or female")
            }
            SpecErr::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for SpecErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SpecErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SpecErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
