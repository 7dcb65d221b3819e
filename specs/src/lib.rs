pub mod error;
mod hash;
pub mod measurement;
mod outcome;
pub mod request;
mod variant;

pub use error::{Result, SpecErr};
pub use hash::CacheKey;
pub use measurement::{FeatureSchema, MeasurementField, MeasurementSet, RangeTable, ValidRange};
pub use outcome::Outcome;
pub use request::MeasurementRequest;
pub use variant::BodyVariant;
