//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is the caller identity every command handler receives.
//! The transport layer resolves it (see the `SessionValidator` port); the
//! handlers trust the identity but still check resource ownership themselves.

use super::{Role, UserId};
use thiserror::Error;

/// Caller identity extracted from a validated access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier (`sub` claim).
    pub id: UserId,

    /// Role claim, already mapped to the canonical enum.
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Shorthand for a regular attendee/proposer account.
    pub fn user(id: UserId) -> Self {
        Self::new(id, Role::User)
    }

    /// Shorthand for an event coordinator account.
    pub fn coordinator(id: UserId) -> Self {
        Self::new(id, Role::EventCoordinator)
    }

    pub fn is_elevated(&self) -> bool {
        self.role.is_elevated()
    }

    /// True when the caller is `owner` or holds an elevated role.
    pub fn owns_or_moderates(&self, owner: &UserId) -> bool {
        &self.id == owner || self.is_elevated()
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The token carries a `nbf` claim in the future.
    #[error("Token not active yet")]
    TokenNotActive,

    /// The auth backend could not be reached.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this error indicates the user should re-authenticate.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::TokenExpired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_recognized() {
        let id = UserId::random();
        let user = AuthenticatedUser::user(id);
        assert!(user.owns_or_moderates(&id));
        assert!(!user.owns_or_moderates(&UserId::random()));
    }

    #[test]
    fn coordinators_moderate_everything() {
        let coordinator = AuthenticatedUser::coordinator(UserId::random());
        assert!(coordinator.owns_or_moderates(&UserId::random()));
    }

    #[test]
    fn token_errors_require_reauthentication() {
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::TokenNotActive.requires_reauthentication());
        assert!(!AuthError::service_unavailable("down").requires_reauthentication());
    }

    #[test]
    fn service_unavailable_displays_message() {
        let err = AuthError::service_unavailable("Connection refused");
        assert_eq!(format!("{}", err), "Auth service unavailable: Connection refused");
    }
}
