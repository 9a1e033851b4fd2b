use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use backend_application::AppError;

#[derive(Debug)]
pub enum HttpError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    AlreadyResolved,
    Internal(String),
}

impl From<AppError> for HttpError {
    fn from(value: AppError) -> Self {
        match value {
            AppError::Unauthorized => HttpError::Unauthorized,
            AppError::BadRequest(msg) => HttpError::BadRequest(msg),
            AppError::NotFound(what) => HttpError::NotFound(what),
            AppError::AlreadyResolved => HttpError::AlreadyResolved,
            AppError::Internal(err) => {
                error!("request failed: {:#}", err);
                HttpError::Internal("internal error".to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl HttpError {
    fn parts(self) -> (StatusCode, String, Option<&'static str>) {
        match self {
            HttpError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string(), None),
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, format!("bad request: {}", msg), None),
            HttpError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what), Some("NOT_FOUND")),
            HttpError::AlreadyResolved => (
                StatusCode::CONFLICT,
                "anomaly already resolved".to_string(),
                Some("ALREADY_RESOLVED"),
            ),
            HttpError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message, code) = self.parts();
        (status, Json(ErrorBody { error: message, code })).into_response()
    }
}
