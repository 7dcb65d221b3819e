/// Number of shape components the body model is driven with.
pub const NUM_BETAS: usize = 10;

/// The shape coefficients ("betas") of the parametric body model.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Betas([f32; NUM_BETAS]);

impl Betas {
    pub fn new(values: [f32; NUM_BETAS]) -> Self {
        Self(values)
    }

    /// The average body.
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Returns `None` unless `values` has exactly `NUM_BETAS` elements.
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        values.try_into().ok().map(Self)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0.0)
    }
}

impl From<[f32; NUM_BETAS]> for Betas {
    fn from(value: [f32; NUM_BETAS]) -> Self {
        Self(value)
    }
}
