//! Typed errors for the storefront backend.
//!
//! Database-layer failures travel as `anyhow::Error` with context, matching
//! how the persistence code reports them. `AuthError` is the one place a
//! failure's *kind* drives behavior: the API maps each variant to its HTTP
//! status (401 for a missing or bad token, 403 for a non-admin caller).

use thiserror::Error;

/// Failures while resolving the caller from the `auth_token` cookie.
#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Unauthorized")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Forbidden - Admin access required")]
    AdminRequired,
}
