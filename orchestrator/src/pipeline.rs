use std::fmt;

use body_model::ModelRegistry;
use log::{debug, error, info};
use machine_learning::Predictor;
use mesh_export::GlbExporter;
use specs::{BodyVariant, CacheKey, MeasurementRequest, MeasurementSet};

use crate::{DiskCache, OrchestratorError, Result};

/// The states a generation request moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Defaulted,
    Validated,
    Rejected,
    CacheLookup,
    Hit,
    Miss,
    Generating,
    Failed,
    Responded,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Defaulted => "defaulted",
            Stage::Validated => "validated",
            Stage::Rejected => "rejected",
            Stage::CacheLookup => "cache-lookup",
            Stage::Hit => "hit",
            Stage::Miss => "miss",
            Stage::Generating => "generating",
            Stage::Failed => "failed",
            Stage::Responded => "responded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the returned bytes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cache,
    Fresh,
}

impl Source {
    /// The value of the `X-Cache` response header.
    pub fn as_header(self) -> &'static str {
        match self {
            Source::Cache => "hit",
            Source::Fresh => "miss",
        }
    }
}

/// A generated (or cached) GLB mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub bytes: Vec<u8>,
    pub source: Source,
    pub key: CacheKey,
}

fn transition(key: Option<&CacheKey>, stage: Stage) {
    match key {
        Some(key) => debug!(key = key.as_str(), stage = stage.as_str(); "request transition"),
        None => debug!(stage = stage.as_str(); "request transition"),
    }
}

/// Turns measurement requests into GLB meshes, caching every result on disk.
pub struct GenerationPipeline {
    registry: ModelRegistry,
    predictor: Predictor,
    cache: DiskCache,
    exporter: GlbExporter,
}

impl GenerationPipeline {
    /// Creates a new `GenerationPipeline`.
    ///
    /// # Arguments
    /// * `registry` - Provides the body model of each variant.
    /// * `predictor` - Maps measurements to betas, possibly degraded.
    /// * `cache` - Where generated meshes are stored.
    /// * `exporter` - Encodes evaluated meshes.
    pub fn new(
        registry: ModelRegistry,
        predictor: Predictor,
        cache: DiskCache,
        exporter: GlbExporter,
    ) -> Self {
        Self {
            registry,
            predictor,
            cache,
            exporter,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    pub fn cache(&self) -> &DiskCache {
        &self.cache
    }

    /// Serves one request: fills defaults, validates, then returns the cached mesh or
    /// generates and caches a new one.
    ///
    /// # Errors
    /// `OrchestratorError::Rejected` for invalid input, which is always detected before
    /// any body model is evaluated. Any other variant is a failure of the service.
    pub fn generate(&self, request: &MeasurementRequest) -> Result<Generated> {
        transition(None, Stage::Received);

        let variant = request.variant().map_err(|e| {
            transition(None, Stage::Rejected);
            OrchestratorError::Rejected(e)
        })?;

        let set = request.with_defaults();
        transition(None, Stage::Defaulted);

        self.generate_set(&set, variant)
    }

    /// Serves an already defaulted measurement set.
    pub fn generate_set(&self, set: &MeasurementSet, variant: BodyVariant) -> Result<Generated> {
        if let Err(e) = set.validate() {
            transition(None, Stage::Rejected);
            return Err(OrchestratorError::Rejected(e));
        }
        transition(None, Stage::Validated);

        let key = CacheKey::new(set, variant).map_err(|e| {
            transition(None, Stage::Failed);
            error!("failed to derive cache key: {e}");
            OrchestratorError::Key(e)
        })?;
        transition(Some(&key), Stage::CacheLookup);

        if let Some(bytes) = self.cache.get(&key)? {
            transition(Some(&key), Stage::Hit);
            info!(key = key.as_str(), bytes = bytes.len(); "cache hit");
            transition(Some(&key), Stage::Responded);
            return Ok(Generated {
                bytes,
                source: Source::Cache,
                key,
            });
        }
        transition(Some(&key), Stage::Miss);

        transition(Some(&key), Stage::Generating);
        let bytes = match self.build(set, variant, &key) {
            Ok(bytes) => bytes,
            Err(e) => {
                transition(Some(&key), Stage::Failed);
                error!(key = key.as_str(); "generation failed: {e}");
                return Err(e);
            }
        };

        info!(
            key = key.as_str(),
            variant = variant.as_str(),
            bytes = bytes.len();
            "generated mesh"
        );
        transition(Some(&key), Stage::Responded);

        Ok(Generated {
            bytes,
            source: Source::Fresh,
            key,
        })
    }

    fn build(&self, set: &MeasurementSet, variant: BodyVariant, key: &CacheKey) -> Result<Vec<u8>> {
        let betas = self.predictor.predict(set).into_value();
        let model = self.registry.get(variant)?;
        let mesh = model.evaluate(&betas)?;
        let bytes = self.exporter.export(&mesh.vertices, &mesh.faces)?;
        self.cache.put(key, &bytes)?;
        Ok(bytes)
    }
}
