use anyhow::Context as _;
use tracing::{info, warn};

use unitask_auth_types::token::issue_access_token;
use unitask_domain::role::Role;

use crate::domain::repository::{AccountRepository, CredentialHasher};
use crate::domain::types::is_valid_email;
use crate::error::AccountsServiceError;

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct AccessToken {
    pub access_token: String,
    /// Seconds since the epoch.
    pub expires_at: u64,
}

/// Only admins can sign in. Lecturer and student accounts are always told to
/// contact the administrator, and unknown emails or wrong admin passwords get
/// the same answer so the endpoint does not reveal which emails exist.
pub struct LoginUseCase<R: AccountRepository, H: CredentialHasher> {
    pub repo: R,
    pub hasher: H,
    pub jwt_secret: String,
}

impl<R: AccountRepository, H: CredentialHasher> LoginUseCase<R, H> {
    pub async fn execute(&self, input: LoginInput) -> Result<AccessToken, AccountsServiceError> {
        // Every refusal path runs one verify so timing does not tell unknown,
        // provisioned and admin emails apart.
        let Some(identity) = self
            .repo
            .find_identity_by_email(input.email.trim())
            .await?
        else {
            self.hasher.verify_decoy(&input.password).await?;
            return Err(AccountsServiceError::AccountNotActivated);
        };

        if let Some(kind) = identity.role.profile_kind() {
            self.hasher
                .verify(&input.password, &identity.credential_hash)
                .await?;
            info!(identity_id = %identity.id, %kind, "login refused for provisioned account");
            return Err(AccountsServiceError::AccountNotActivated);
        }

        if !self
            .hasher
            .verify(&input.password, &identity.credential_hash)
            .await?
        {
            warn!(identity_id = %identity.id, "admin login with wrong password");
            return Err(AccountsServiceError::AccountNotActivated);
        }

        let (access_token, expires_at) =
            issue_access_token(identity.id, Role::Admin, &self.jwt_secret)
                .context("sign access token")?;
        info!(identity_id = %identity.id, "admin signed in");
        Ok(AccessToken {
            access_token,
            expires_at,
        })
    }
}

// ── EnsureAdmin ──────────────────────────────────────────────────────────────

/// Seed the admin identity at startup. Leaves an existing identity untouched.
pub struct EnsureAdminUseCase<R: AccountRepository, H: CredentialHasher> {
    pub repo: R,
    pub hasher: H,
}

impl<R: AccountRepository, H: CredentialHasher> EnsureAdminUseCase<R, H> {
    pub async fn execute(&self, email: &str, password: &str) -> Result<bool, AccountsServiceError> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AccountsServiceError::validation(
                "email",
                "must be a valid email address",
            ));
        }
        if password.is_empty() {
            return Err(AccountsServiceError::validation("password", "is required"));
        }
        if self.repo.find_identity_by_email(email).await?.is_some() {
            return Ok(false);
        }
        let hash = self.hasher.hash(password).await?;
        let created = self.repo.ensure_admin(email, &hash).await?;
        if created {
            info!(email, "admin identity seeded");
        }
        Ok(created)
    }
}
