//! JWT access-token issue and validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "TOKEN_ISSUER", test))]
use serde::Serialize;

use unitask_domain::id::IdentityId;
use unitask_domain::role::Role;

/// Identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub identity_id: IdentityId,
    pub role: Role,
    pub access_token_exp: u64,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload.
///
/// | Field | JWT claim | Rust type | Meaning |
/// |-------|-----------|-----------|---------|
/// | `sub` | `sub` | UUID string | identity id |
/// | `role` | custom | [`Role`] string | identity role |
/// | `exp` | `exp` | seconds since epoch | token expiration |
///
/// [`Serialize`] requires the **`TOKEN_ISSUER`** cargo feature; only the
/// service that authenticates logins enables it.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "TOKEN_ISSUER", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub role: Role,
    pub exp: u64,
}

/// Access token lifetime in seconds.
pub const ACCESS_TOKEN_TTL_SECS: u64 = 60 * 60;

fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate a bearer token, returning the parsed identity.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let identity_id = claims
        .sub
        .parse::<IdentityId>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        identity_id,
        role: claims.role,
        access_token_exp: claims.exp,
    })
}

#[cfg(any(feature = "TOKEN_ISSUER", test))]
fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Sign an access token for `identity_id`. Returns the token and its expiry.
#[cfg(any(feature = "TOKEN_ISSUER", test))]
pub fn issue_access_token(
    identity_id: IdentityId,
    role: Role,
    secret: &str,
) -> Result<(String, u64), jsonwebtoken::errors::Error> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let exp = now_secs() + ACCESS_TOKEN_TTL_SECS;
    let claims = JwtClaims {
        sub: identity_id.to_string(),
        role,
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, exp))
}
