use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Accounts service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AccountsServiceError {
    /// Missing or malformed input. Raised before any store interaction.
    #[error("invalid {field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
    #[error("email already registered")]
    DuplicateEmail,
    #[error("role identifier already registered")]
    DuplicateIdentifier,
    #[error("account not found")]
    AccountNotFound,
    #[error("account not activated, contact administrator")]
    AccountNotActivated,
    /// Store or runtime fault. The message stays opaque; the chain is logged.
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AccountsServiceError {
    pub fn validation(field: &'static str, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::DuplicateIdentifier => "DUPLICATE_IDENTIFIER",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::AccountNotActivated => "ACCOUNT_NOT_ACTIVATED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Only store faults are worth retrying; every other kind is caused by the
    /// request itself and will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl IntoResponse for AccountsServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail | Self::DuplicateIdentifier => StatusCode::CONFLICT,
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::AccountNotActivated => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer records every request; only the anyhow chain of a 500 is logged here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
            "retryable": self.is_retryable(),
        });
        if let Self::Validation { field, .. } = &self {
            body["field"] = serde_json::Value::from(*field);
        }
        (status, axum::Json(body)).into_response()
    }
}
