//! Bearer-token helpers for integration tests.
//!
//! Routes behind the admin guard expect `Authorization: Bearer <jwt>` signed with
//! the service secret. `MockAuth` signs real tokens for any role so tests exercise
//! the same validation path production traffic does.

use axum::http::HeaderValue;

use unitask_auth_types::token::issue_access_token;
use unitask_domain::id::IdentityId;
use unitask_domain::role::Role;

/// Secret shared between test app state and the tokens minted here.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-for-unit-tests-only";

/// Configurable identity injected into test requests.
pub struct MockAuth {
    pub identity_id: IdentityId,
    pub role: Role,
}

impl MockAuth {
    pub fn new(identity_id: IdentityId, role: Role) -> Self {
        Self { identity_id, role }
    }

    pub fn admin() -> Self {
        Self::new(IdentityId::generate(), Role::Admin)
    }

    /// Signed token for this identity, using [`TEST_JWT_SECRET`].
    pub fn token(&self) -> String {
        issue_access_token(self.identity_id, self.role, TEST_JWT_SECRET)
            .expect("sign test token")
            .0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.token())).expect("valid header value")
    }
}
