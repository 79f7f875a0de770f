use crate::domain::repository::CredentialHasher;
use crate::error::AccountsServiceError;

/// The first secret of a new account and its stored hash.
///
/// The plaintext is the role identifier itself. It is handed to the caller
/// once, in the create response, and the new user must rotate it on first
/// login. Nothing can recover it later.
pub struct InitialCredential {
    pub plaintext: String,
    pub hash: String,
}

pub async fn derive_initial_credential<H: CredentialHasher>(
    role_identifier: &str,
    hasher: &H,
) -> Result<InitialCredential, AccountsServiceError> {
    let hash = hasher.hash(role_identifier).await?;
    Ok(InitialCredential {
        plaintext: role_identifier.to_owned(),
        hash,
    })
}
