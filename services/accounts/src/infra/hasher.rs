use anyhow::{Context as _, anyhow};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::domain::repository::CredentialHasher;
use crate::error::AccountsServiceError;

/// Salt and output of the decoy PHC string. Any well-formed values work: the
/// decoy only has to cost a full verify and never match.
const DECOY_SALT: &str = "ZGVjb3lzYWx0ZGVjb3lzYWx0";
const DECOY_OUTPUT: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Argon2id hasher producing PHC strings.
///
/// The default uses the argon2 crate's recommended cost (19 MiB, 2 passes,
/// 1 lane). Work runs on the blocking pool.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Custom cost. Tests use this with a tiny memory cost.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, argon2::Error> {
        Ok(Self {
            params: Params::new(m_cost, t_cost, p_cost, None)?,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// PHC string carrying this hasher's cost, matching no password.
    fn decoy_hash(&self) -> String {
        format!(
            "$argon2id$v=19$m={},t={},p={}${DECOY_SALT}${DECOY_OUTPUT}",
            self.params.m_cost(),
            self.params.t_cost(),
            self.params.p_cost(),
        )
    }
}

impl CredentialHasher for Argon2Hasher {
    async fn hash(&self, plaintext: &str) -> Result<String, AccountsServiceError> {
        let argon2 = self.argon2();
        let plaintext = plaintext.to_owned();
        let hash = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .context("join credential hashing task")?
        .map_err(|e| anyhow!("hash credential: {e}"))?;
        Ok(hash)
    }

    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, AccountsServiceError> {
        let argon2 = self.argon2();
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        let matched = tokio::task::spawn_blocking(move || {
            // Cost and salt come from the PHC string, not from `argon2`.
            let parsed = PasswordHash::new(&hash)?;
            Ok::<_, argon2::password_hash::Error>(
                argon2
                    .verify_password(plaintext.as_bytes(), &parsed)
                    .is_ok(),
            )
        })
        .await
        .context("join credential verify task")?
        .map_err(|e| anyhow!("parse stored credential hash: {e}"))?;
        Ok(matched)
    }

    async fn verify_decoy(&self, plaintext: &str) -> Result<(), AccountsServiceError> {
        self.verify(plaintext, &self.decoy_hash()).await.map(|_| ())
    }
}
