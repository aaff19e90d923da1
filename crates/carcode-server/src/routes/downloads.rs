use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::Response,
    routing::get,
};

use crate::{
    AppState,
    error::{ApiError, Result as ApiResult},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/download/{filename}", get(download_artifact))
}

/// Send a generated artifact as an attachment
pub async fn download_artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Response<Body>> {
    let bytes = state.registry.artifact(&filename).await?;

    Response::builder()
        .header(CONTENT_TYPE, "image/png")
        .header(CONTENT_DISPOSITION, content_disposition(&filename))
        .body(Body::from(bytes))
        .map_err(|e| ApiError::internal(&e.to_string()))
}

/// Attachment header with an ASCII fallback name and the exact UTF-8 name
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("ABC-001_qr.png"),
            "attachment; filename=\"ABC-001_qr.png\"; filename*=UTF-8''ABC-001_qr.png"
        );
        assert_eq!(
            content_disposition("ÄB\"1.png"),
            "attachment; filename=\"_B_1.png\"; filename*=UTF-8''%C3%84B%221.png"
        );
    }
}
