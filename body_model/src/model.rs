use specs::BodyVariant;

use crate::{Betas, BodyMesh, Result};

/// A parametric body model evaluated in the neutral pose.
pub trait BodyModel: Send + Sync {
    /// The variant this model was built for.
    fn variant(&self) -> BodyVariant;

    /// The number of vertices every evaluated mesh has.
    fn vertex_count(&self) -> usize;

    /// Evaluates the model for the given shape.
    ///
    /// # Arguments
    /// * `betas` - The shape coefficients.
    ///
    /// # Returns
    /// The posed vertices and the model's fixed face topology.
    fn evaluate(&self, betas: &Betas) -> Result<BodyMesh>;
}
