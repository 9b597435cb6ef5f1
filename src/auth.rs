//! Email/password auth with a JWT carried in the `auth_token` cookie.
//!
//! Tokens are HS256 with a 7-day expiry. Verification failures are reported
//! as `None` rather than errors: an expired or tampered cookie is treated the
//! same as no cookie at all.

use anyhow::{Context, Result};
use axum::http::{HeaderMap, header};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::errors::AuthError;
use crate::models::{Role, User};

pub const AUTH_COOKIE: &str = "auth_token";

/// Cookie / token lifetime in seconds (7 days).
pub const TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).context("Failed to hash password")
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn generate_token(user: &User, secret: &str) -> Result<String> {
    let claims = Claims {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role.as_str().to_string(),
        exp: (Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to sign token")
}

/// Decode and validate a token. Returns None for anything invalid: bad
/// signature, malformed payload, or past expiry.
pub fn verify_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// The `Set-Cookie` value for a fresh session. `Secure` is dropped in dev
/// mode so the cookie survives plain-http local testing.
pub fn session_cookie(token: &str, dev_mode: bool) -> String {
    let secure = if dev_mode { "" } else { "; Secure" };
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        AUTH_COOKIE, token, TOKEN_TTL_SECS, secure
    )
}

/// Pull the auth token out of a request's `Cookie` header, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(AUTH_COOKIE)?
            .strip_prefix('=')
            .map(|value| value.to_string())
    })
}

/// Resolve the caller's claims from the request headers.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Claims, AuthError> {
    let token = token_from_headers(headers).ok_or(AuthError::MissingToken)?;
    verify_token(&token, secret).ok_or(AuthError::InvalidToken)
}

/// Resolve the caller and require the admin role.
pub fn require_admin(headers: &HeaderMap, secret: &str) -> Result<Claims, AuthError> {
    let claims = authenticate(headers, secret)?;
    if claims.role != Role::Admin.as_str() {
        return Err(AuthError::AdminRequired);
    }
    Ok(claims)
}
