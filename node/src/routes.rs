use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use http::{HeaderName, StatusCode, header::CONTENT_TYPE};
use log::{error, info};
use serde::Serialize;
use serde_json::{Value, json};
use specs::{BodyVariant, MeasurementRequest, RangeTable};

use crate::{AppState, error::ApiError};

pub const GLB_CONTENT_TYPE: &str = "model/gltf-binary";
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

pub const SERVICE_NAME: &str = "Body Mesh Generation";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub message: &'static str,
    pub regression_model_loaded: bool,
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "ranges": "/measurement-ranges",
            "generate": "/generate (POST)",
        },
    }))
}

/// Reports healthy once the neutral body model can be served.
pub async fn health(State(state): State<AppState>) -> Result<Json<Health>, ApiError> {
    let pipeline = Arc::clone(&state.pipeline);
    let neutral = tokio::task::spawn_blocking(move || {
        pipeline.registry().get(BodyVariant::Neutral).map(|_| ())
    })
    .await
    .map_err(|e| ApiError::new(StatusCode::SERVICE_UNAVAILABLE, format!("Service unhealthy: {e}")))?;

    if let Err(e) = neutral {
        error!("health check failed: {e}");
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            format!("Service unhealthy: {e}"),
        ));
    }

    Ok(Json(Health {
        status: "healthy",
        message: "Service is operational",
        regression_model_loaded: state.pipeline.predictor().is_loaded(),
    }))
}

pub async fn measurement_ranges() -> Json<RangeTable> {
    Json(RangeTable)
}

/// Answers with the GLB mesh for the posted measurements.
pub async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<MeasurementRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;

    let pipeline = Arc::clone(&state.pipeline);
    let generated = tokio::task::spawn_blocking(move || pipeline.generate(&request))
        .await
        .map_err(ApiError::generation_failed)??;

    info!(
        key = generated.key.as_str(),
        cache = generated.source.as_header(),
        bytes = generated.bytes.len();
        "responding with mesh"
    );

    Ok((
        [
            (CONTENT_TYPE, GLB_CONTENT_TYPE),
            (X_CACHE, generated.source.as_header()),
        ],
        generated.bytes,
    )
        .into_response())
}
