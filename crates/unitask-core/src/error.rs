use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors shared by every service surface, independent of any one domain.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}

/// Router fallback: unknown paths get the same JSON error shape as everything else.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
