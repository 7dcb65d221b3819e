//! HTTP front end of the mesh generation service.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use body_model::ModelRegistry;
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use log::info;
use machine_learning::Predictor;
use mesh_export::GlbExporter;
use orchestrator::{DiskCache, GenerationPipeline};
use tower_http::cors::CorsLayer;

pub use config::NodeConfig;
pub use error::ApiError;

/// Front ends allowed to call the service from a browser.
pub const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:3001"];

/// The state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GenerationPipeline>,
}

impl AppState {
    pub fn new(pipeline: GenerationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Builds the service from its start-up configuration.
    ///
    /// A missing regression artifact is tolerated, body models are loaded on first use.
    ///
    /// # Errors
    /// If the cache directory can't be created or the artifact is malformed.
    pub fn from_config(config: &NodeConfig) -> anyhow::Result<Self> {
        let cache = DiskCache::open(&config.cache_dir)
            .with_context(|| format!("opening cache {}", config.cache_dir.display()))?;
        let predictor = Predictor::load(&config.regression_model).with_context(|| {
            format!(
                "loading regression artifact {}",
                config.regression_model.display()
            )
        })?;
        let registry = ModelRegistry::from_dir(&config.models_dir);

        info!(
            regression_model_loaded = predictor.is_loaded();
            "serving meshes cached in {}",
            config.cache_dir.display()
        );

        let pipeline = GenerationPipeline::new(registry, predictor, cache, GlbExporter::new());
        Ok(Self::new(pipeline))
    }
}

fn cors() -> CorsLayer {
    let origins = ALLOWED_ORIGINS.map(HeaderValue::from_static);

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([routes::X_CACHE])
}

/// The service's routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/measurement-ranges", get(routes::measurement_ranges))
        .route("/generate", post(routes::generate))
        .layer(cors())
        .with_state(state)
}
