use tracing::info;

use unitask_domain::id::ProfileId;
use unitask_domain::role::ProfileKind;

use crate::domain::repository::{AccountRepository, CredentialHasher};
use crate::domain::types::{AccountChanges, AccountFields, AccountRecord, validate_account};
use crate::error::AccountsServiceError;
use crate::usecase::credential::derive_initial_credential;

// ── CreateAccount ────────────────────────────────────────────────────────────

/// A freshly provisioned account and its one-time initial secret.
#[derive(Debug)]
pub struct CreatedAccount {
    pub record: AccountRecord,
    /// Equal to the role identifier. Returned once, never stored.
    pub default_password: String,
}

pub struct CreateAccountUseCase<R: AccountRepository, H: CredentialHasher> {
    pub repo: R,
    pub hasher: H,
}

impl<R: AccountRepository, H: CredentialHasher> CreateAccountUseCase<R, H> {
    pub async fn execute(
        &self,
        kind: ProfileKind,
        fields: AccountFields,
    ) -> Result<CreatedAccount, AccountsServiceError> {
        let account = validate_account(kind, fields)?;
        // Hash outside the store transaction so the connection is held only for the writes.
        let credential = derive_initial_credential(account.details.identifier(), &self.hasher).await?;
        let record = self.repo.create(&account, &credential.hash).await?;
        info!(profile_id = %record.profile_id, %kind, "account created");
        Ok(CreatedAccount {
            record,
            default_password: credential.plaintext,
        })
    }
}

// ── ListAccounts ─────────────────────────────────────────────────────────────

pub struct ListAccountsUseCase<R: AccountRepository> {
    pub repo: R,
}

impl<R: AccountRepository> ListAccountsUseCase<R> {
    pub async fn execute(
        &self,
        kind: ProfileKind,
    ) -> Result<Vec<AccountRecord>, AccountsServiceError> {
        self.repo.list(kind).await
    }
}

// ── GetAccount ───────────────────────────────────────────────────────────────

pub struct GetAccountUseCase<R: AccountRepository> {
    pub repo: R,
}

impl<R: AccountRepository> GetAccountUseCase<R> {
    pub async fn execute(
        &self,
        kind: ProfileKind,
        id: ProfileId,
    ) -> Result<AccountRecord, AccountsServiceError> {
        self.repo
            .get(kind, id)
            .await?
            .ok_or(AccountsServiceError::AccountNotFound)
    }
}

// ── UpdateAccount ────────────────────────────────────────────────────────────

pub struct UpdateAccountInput {
    pub fields: AccountFields,
    /// `None` re-activates the account.
    pub active: Option<bool>,
}

pub struct UpdateAccountUseCase<R: AccountRepository> {
    pub repo: R,
}

impl<R: AccountRepository> UpdateAccountUseCase<R> {
    pub async fn execute(
        &self,
        kind: ProfileKind,
        id: ProfileId,
        input: UpdateAccountInput,
    ) -> Result<AccountRecord, AccountsServiceError> {
        let changes = AccountChanges {
            account: validate_account(kind, input.fields)?,
            active: input.active.unwrap_or(true),
        };
        let record = self.repo.update(kind, id, &changes).await?;
        info!(profile_id = %id, %kind, active = changes.active, "account updated");
        Ok(record)
    }
}

// ── DeleteAccount ────────────────────────────────────────────────────────────

pub struct DeleteAccountUseCase<R: AccountRepository> {
    pub repo: R,
}

impl<R: AccountRepository> DeleteAccountUseCase<R> {
    pub async fn execute(
        &self,
        kind: ProfileKind,
        id: ProfileId,
    ) -> Result<(), AccountsServiceError> {
        self.repo.delete(kind, id).await?;
        info!(profile_id = %id, %kind, "account deleted");
        Ok(())
    }
}
