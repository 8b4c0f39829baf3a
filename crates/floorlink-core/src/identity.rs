//! Identity tokens.
//!
//! The auth service signs HS256 tokens carrying `userId`, `username` and
//! `role`. When the realtime server shares its secret, a connection's identity
//! comes from the token instead of from what the client announces.

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{FloorError, FloorResult};
use crate::presence::{Identity, Role};

/// Token claims, named as the auth service writes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a token for `identity`, valid for `ttl_secs` seconds.
pub fn issue_token(secret: &[u8], identity: &Identity, ttl_secs: i64) -> FloorResult<String> {
    let now = Utc::now().timestamp();
    let exp = now
        .checked_add(ttl_secs)
        .ok_or_else(|| FloorError::TokenInvalid(format!("lifetime of {}s is out of range", ttl_secs)))?;
    let claims = Claims {
        user_id: identity.user_id.clone(),
        username: identity.username.clone(),
        role: identity.role,
        iat: now,
        exp,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| FloorError::TokenInvalid(e.to_string()))
}

/// Verify a token and return the identity it proves.
pub fn verify_token(secret: &[u8], token: &str) -> FloorResult<Identity> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => FloorError::TokenExpired,
            _ => FloorError::TokenInvalid(e.to_string()),
        })?;

    let claims = data.claims;
    Ok(Identity::new(claims.user_id, claims.username, claims.role))
}
