//! Bearer-token extractor guarding admin-only routes.

use axum::extract::FromRequestParts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use http::request::Parts;

use unitask_core::error::AppError;
use unitask_domain::id::IdentityId;
use unitask_domain::role::Role;

use crate::token::validate_access_token;

/// Gives extractors access to the HMAC secret tokens are signed with.
pub trait JwtSecretProvider {
    fn jwt_secret(&self) -> &str;
}

/// An authenticated admin, taken from `Authorization: Bearer <jwt>`.
///
/// Rejects with 401 when the header is absent or the token does not validate,
/// and with 403 when the token is valid but belongs to a non-admin role.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub identity_id: IdentityId,
}

impl<S> FromRequestParts<S> for AdminIdentity
where
    S: JwtSecretProvider + Send + Sync,
{
    type Rejection = AppError;

    // Resolve synchronously and hand back a 'static future; `async fn` here
    // would capture `parts` and `state` and trip E0195 on axum-core 0.5.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let result = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(AppError::Unauthorized)
            .and_then(|Authorization(bearer)| {
                validate_access_token(bearer.token(), state.jwt_secret()).map_err(|e| {
                    tracing::debug!(error = %e, "rejected bearer token");
                    AppError::Unauthorized
                })
            })
            .and_then(|info| match info.role {
                Role::Admin => Ok(Self {
                    identity_id: info.identity_id,
                }),
                Role::Lecturer | Role::Student => Err(AppError::Forbidden),
            });

        async move { result }
    }
}
