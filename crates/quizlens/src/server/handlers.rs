//! Route handlers.

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// `GET /` - liveness and model info.
pub async fn home(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "Backend is running",
        "ai_model": state.analyzer.model_label(),
        "platform": state.info.platform,
        "port_assigned": state.info.port,
    }))
}

/// `POST /upload` - analyze one uploaded image.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let bytes = read_file_field(&mut multipart).await?;
    tracing::info!(bytes = bytes.len(), "Received upload");

    let result = state.analyzer.analyze(bytes).await?;
    Ok(Json(result))
}

/// Take the `file` field, or failing that the first field with a filename.
async fn read_file_field(multipart: &mut Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) || field.file_name().is_some() {
            return Ok(field.bytes().await?.to_vec());
        }
    }
    Err(ApiError::BadRequest(format!(
        "missing multipart field '{FILE_FIELD}'"
    )))
}
