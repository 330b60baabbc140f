//! Session validation port for access token validation.
//!
//! This port defines the contract for validating bearer tokens and extracting
//! the caller's identity and role. Implementations exist for signed JWTs and
//! for tests.
//!
//! All implementations MUST check:
//! - **Signature**: Token was issued by a trusted party
//! - **Expiry (exp)** and **not-before (nbf)**
//! - **Issuer (iss)** when one is configured

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Validates access tokens and extracts user identity.
///
/// HTTP middleware uses this to validate Bearer tokens and attach the
/// authenticated user to the request.
///
/// # Contract
///
/// - `AuthError::InvalidToken` for malformed tokens, bad signatures or claims
/// - `AuthError::TokenExpired` for expired tokens
/// - `AuthError::TokenNotActive` for tokens used before `nbf`
/// - `AuthError::ServiceUnavailable` for transient errors
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// Validate a raw token (without the "Bearer " prefix).
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError>;
}
