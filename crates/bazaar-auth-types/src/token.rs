//! JWT access tokens.

use bazaar_domain::user::UserRole;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "TOKEN_ISSUER", test))]
use serde::Serialize;
use uuid::Uuid;

/// Caller identity carried by a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Claims payload.
///
/// | Field | Meaning |
/// |-------|---------|
/// | `sub` | user id (UUID string) |
/// | `email` | account email at issue time |
/// | `role` | `"user"` or `"admin"` |
/// | `iat` / `exp` | seconds since UNIX epoch |
///
/// [`Serialize`] is only available with the **`TOKEN_ISSUER`** feature; every
/// other consumer only ever validates.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "TOKEN_ISSUER", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

// ── Decode ───────────────────────────────────────────────────────────────

/// HS256 with `exp` checked; `exp` and `sub` are required.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
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

/// Validate a bearer token and return the caller it identifies.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    Ok(TokenInfo {
        user_id,
        email: claims.email,
        role: claims.role,
        exp: claims.exp,
    })
}

// ── Issue (TOKEN_ISSUER only) ────────────────────────────────────────────

/// Sign an access token valid for `ttl_secs` from now.
#[cfg(any(feature = "TOKEN_ISSUER", test))]
pub fn issue_access_token(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AuthError> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let iat = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id.to_string(),
        email: email.to_owned(),
        role,
        iat,
        exp: iat + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Encoding(e.to_string()))
}
