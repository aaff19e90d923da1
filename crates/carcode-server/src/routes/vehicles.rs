//! Stored vehicle lookup and artifact regeneration

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use carcode::{CodeType, VehicleRecord};
use carcode_registry::RegistryError;
use tracing::debug;

use crate::{
    AppState,
    error::{ApiError, Result},
    models::{ApiResponse, ArtifactResponse},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{reg_no}", get(get_vehicle))
        .route("/{reg_no}/codes/{code_type}", post(regenerate_code))
}

/// Get a stored vehicle by registration number
async fn get_vehicle(
    State(state): State<AppState>,
    Path(reg_no): Path<String>,
) -> Result<Json<ApiResponse<VehicleRecord>>> {
    debug!("Looking up vehicle {}", reg_no);

    let record = state
        .registry
        .find(&reg_no)
        .await?
        .ok_or(RegistryError::RecordNotFound(reg_no))?;

    Ok(Json(ApiResponse::new(record)))
}

/// Generate a stored vehicle's artifact again
async fn regenerate_code(
    State(state): State<AppState>,
    Path((reg_no, code_type)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ArtifactResponse>>> {
    let code_type: CodeType = code_type
        .parse()
        .map_err(|e: carcode::CodeError| ApiError::validation(&e.to_string()))?;

    let artifact = state.registry.regenerate(&reg_no, code_type).await?;

    Ok(Json(ApiResponse::with_message(
        ArtifactResponse::from(artifact),
        format!("Regenerated {} for {}", code_type, reg_no),
    )))
}
