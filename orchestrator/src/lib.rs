//! The request lifecycle of the mesh generation service.

mod cache;
pub mod error;
mod pipeline;

pub use cache::DiskCache;
pub use error::{OrchestratorError, Result};
pub use pipeline::{GenerationPipeline, Generated, Source, Stage};
