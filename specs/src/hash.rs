use std::fmt;

use crate::{BodyVariant, MeasurementSet, Result};

/// Content address of a generated mesh.
///
/// A blake3 digest of the canonical JSON of the full measurement set followed by the
/// variant, so the same measurements always map to the same key no matter how the set
/// was assembled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(set: &MeasurementSet, variant: BodyVariant) -> Result<Self> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(set.canonical_json()?.as_bytes());
        hasher.update(b"\0");
        hasher.update(variant.as_str().as_bytes());

        Ok(Self(hasher.finalize().to_hex().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}.glb", self.0)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
