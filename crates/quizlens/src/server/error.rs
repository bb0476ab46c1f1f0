//! Mapping of request failures to `{"detail": ...}` responses.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quizlens_core::AnalyzeError;
use serde_json::json;

/// Everything `/upload` can fail with.
#[derive(Debug)]
pub enum ApiError {
    /// Analysis failed after the upload was read
    Analyze(AnalyzeError),
    /// The multipart body could not be read (includes oversize bodies)
    Multipart(MultipartError),
    /// The request was well-formed multipart but carried no file
    BadRequest(String),
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        ApiError::Analyze(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            // Every analysis failure is a server-side 500, decode errors included
            ApiError::Analyze(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Multipart(err) => err.status(),
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn detail(&self) -> String {
        match self {
            ApiError::Analyze(err) => err.to_string(),
            ApiError::Multipart(err) => err.body_text(),
            ApiError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.detail();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "Upload failed: {detail}");
        } else {
            tracing::warn!(status = status.as_u16(), "Upload rejected: {detail}");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
