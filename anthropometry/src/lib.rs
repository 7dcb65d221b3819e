//! Anthropometric measurements derived from body vertices.

mod error;
mod geometric;
pub mod hull;
mod proportional;
mod report;
mod slice;

use std::{fmt, str::FromStr};

pub use error::{MeasureErr, Result};
pub use geometric::{CHEST, Girth, HIPS, NECK, SHOULDER, WAIST, measure_body};
pub use proportional::measure_proportional;
pub use report::{Fallback, MeasurementReport};
pub use slice::{BodyPoints, SliceSpec};

/// Which measurement heuristic labels a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Heuristic {
    /// Convex hull perimeters of horizontal slices.
    #[default]
    Geometric,
    /// Fixed proportions driven by height and the first shape coefficient.
    Proportional,
}

impl Heuristic {
    pub fn as_str(self) -> &'static str {
        match self {
            Heuristic::Geometric => "geometric",
            Heuristic::Proportional => "proportional",
        }
    }

    /// Measures a body evaluated from `betas`.
    ///
    /// # Errors
    /// When the vertex set is empty or holds non finite coordinates.
    pub fn measure(self, vertices: &[[f32; 3]], betas: &[f32]) -> Result<MeasurementReport> {
        match self {
            Heuristic::Geometric => measure_body(vertices),
            Heuristic::Proportional => measure_proportional(vertices, betas),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Heuristic {
    type Err = MeasureErr;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "geometric" => Ok(Heuristic::Geometric),
            "proportional" => Ok(Heuristic::Proportional),
            other => Err(MeasureErr::UnknownHeuristic(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_names_parse() {
        assert_eq!("proportional".parse::<Heuristic>(), Ok(Heuristic::Proportional));
        assert_eq!(Heuristic::default().to_string(), "geometric");
        assert!("average".parse::<Heuristic>().is_err());
    }
}
