//! Vehicle registration form handling

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
};
use carcode_registry::UploadedImage;
use tracing::{debug, info};

use crate::{
    AppState,
    error::{ApiError, Result},
    models::{ApiResponse, IMAGE_FIELD, RegistrationForm, RegistrationResponse},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/generate", post(generate))
}

/// Register a vehicle from a multipart form and generate its code
async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<RegistrationResponse>>)> {
    let request = read_form(multipart).await?.into_request()?;
    info!(
        "Registering {} with {}",
        request.candidate.reg_no, request.code_type
    );

    let registration = state
        .registry
        .register(request.candidate, request.image, request.code_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(RegistrationResponse::from(registration))),
    ))
}

async fn read_form(mut multipart: Multipart) -> Result<RegistrationForm> {
    let mut form = RegistrationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(&format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(&format!("Failed to read upload: {}", e)))?;
            debug!("Received image upload '{}' ({} bytes)", file_name, bytes.len());
            form.set_image(UploadedImage::new(file_name, bytes.to_vec()));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(&format!("Invalid field {}: {}", name, e)))?;
            form.insert_field(name, value);
        }
    }

    Ok(form)
}
