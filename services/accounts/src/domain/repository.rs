#![allow(async_fn_in_trait)]

use unitask_domain::id::ProfileId;
use unitask_domain::role::ProfileKind;

use crate::domain::types::{AccountChanges, AccountRecord, Identity, NewAccount};
use crate::error::AccountsServiceError;

/// Store port for identity+profile pairs.
///
/// Every mutating method is one atomic unit: on `Err` nothing it touched is
/// committed. Implementations run the email and identifier pre-checks inside
/// that unit and map store uniqueness violations to the same duplicate kinds.
pub trait AccountRepository: Send + Sync {
    /// Insert the identity, then its profile with `active = true`.
    async fn create(
        &self,
        account: &NewAccount,
        credential_hash: &str,
    ) -> Result<AccountRecord, AccountsServiceError>;

    /// Lecturers by full name; students by enrollment year descending, then full name.
    async fn list(&self, kind: ProfileKind) -> Result<Vec<AccountRecord>, AccountsServiceError>;

    async fn get(
        &self,
        kind: ProfileKind,
        id: ProfileId,
    ) -> Result<Option<AccountRecord>, AccountsServiceError>;

    /// Replace the identity email and every mutable profile field.
    /// Fails with `AccountNotFound` when no profile of `kind` has `id`.
    async fn update(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        changes: &AccountChanges,
    ) -> Result<AccountRecord, AccountsServiceError>;

    /// Delete the profile, then its identity.
    /// Fails with `AccountNotFound` when no profile of `kind` has `id`.
    async fn delete(&self, kind: ProfileKind, id: ProfileId) -> Result<(), AccountsServiceError>;

    async fn find_identity_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Identity>, AccountsServiceError>;

    /// Insert an admin identity unless one with `email` already exists.
    /// Returns `true` when a row was created.
    async fn ensure_admin(
        &self,
        email: &str,
        credential_hash: &str,
    ) -> Result<bool, AccountsServiceError>;
}

/// One-way salted hashing of credentials.
pub trait CredentialHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<String, AccountsServiceError>;

    /// `Ok(false)` on mismatch; `Err` only when the stored hash cannot be parsed
    /// or the hashing task fails.
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AccountsServiceError>;

    /// Spend the work of one `verify` when there is no stored hash to check
    /// against, so a missing account answers as slowly as a present one.
    async fn verify_decoy(&self, _plaintext: &str) -> Result<(), AccountsServiceError> {
        Ok(())
    }
}
