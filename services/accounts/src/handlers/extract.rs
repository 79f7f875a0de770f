use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::AccountsServiceError;

/// `Json<T>` whose rejections render as a `VALIDATION_ERROR` on field `body`
/// instead of axum's plain-text 415/422.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AccountsServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "rejected request body");
                Err(AccountsServiceError::validation("body", rejection_reason(&rejection)))
            }
        }
    }
}

fn rejection_reason(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => "must be sent as application/json",
        JsonRejection::JsonSyntaxError(_) => "is not valid JSON",
        JsonRejection::JsonDataError(_) => "has a field of the wrong type",
        _ => "could not be read",
    }
}
