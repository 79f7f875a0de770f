use sea_orm::DatabaseConnection;
use tracing::warn;

use unitask_auth_types::admin::JwtSecretProvider;
use unitask_core::health::Readiness;

use crate::infra::db::DbAccountRepository;
use crate::infra::hasher::Argon2Hasher;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt_secret: String,
    pub hasher: Argon2Hasher,
    /// Origins allowed to call the API from a browser; `*` allows any.
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }
}

impl JwtSecretProvider for AppState {
    fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}

impl Readiness for AppState {
    async fn ready(&self) -> bool {
        match self.db.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "database ping failed");
                false
            }
        }
    }
}
