use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::AccountsServiceError;
use crate::handlers::extract::JsonBody;
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_at: u64,
}

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AccountsServiceError> {
    let usecase = LoginUseCase {
        repo: state.account_repo(),
        hasher: state.hasher.clone(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let token = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(LoginResponse {
        access_token: token.access_token,
        expires_at: token.expires_at,
    }))
}
