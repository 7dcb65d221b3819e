mod betas;
pub mod error;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
mod mesh;
mod model;
mod registry;
mod smpl;

pub use betas::{Betas, NUM_BETAS};
pub use error::{ModelErr, Result};
pub use mesh::BodyMesh;
pub use model::BodyModel;
pub use registry::{ModelRegistry, model_path};
pub use smpl::SmplModel;
