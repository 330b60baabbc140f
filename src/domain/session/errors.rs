//! Session-specific error types.

use thiserror::Error;

use super::validation::FieldViolation;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Broad category of a [`SessionError`], mapped onto a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidState,
    Forbidden,
    ValidationFailed,
    Internal,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InvalidState => 400,
            ErrorKind::Forbidden => 403,
            ErrorKind::ValidationFailed => 422,
            ErrorKind::Internal => 500,
        }
    }
}

/// Errors returned by the session lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("You already have a pending session proposal")]
    ProposalLimit,

    #[error("Session can only be updated while pending")]
    CannotBeUpdated,

    #[error("Session can only be deleted while pending")]
    CannotBeDeleted,

    #[error("Session can only be accepted while pending")]
    CannotBeAccepted,

    #[error("Session can only be rejected while pending")]
    CannotBeRejected,

    #[error("Session is not accepted")]
    NotAccepted,

    #[error("Session has already started")]
    AlreadyStarted,

    #[error("Session has already ended")]
    AlreadyEnded,

    #[error("Session has not started yet")]
    NotStarted,

    #[error("Session has not ended yet")]
    NotEnded,

    #[error("Already registered for this session")]
    AlreadyRegistered,

    #[error("Not registered for this session")]
    NotRegistered,

    #[error("Registration for this session was cancelled")]
    Cancelled,

    #[error("Session is full")]
    Full,

    #[error("Session overlaps another registered session")]
    TimeConflict,

    #[error("Review was removed by a moderator")]
    ReviewDeleted,

    #[error("Session already reviewed")]
    AlreadyReviewed,

    #[error("Session has not been reviewed")]
    NotReviewed,

    #[error("Permission denied")]
    Forbidden,

    #[error("Validation failed: {}", summarize(.0))]
    ValidationFailed(Vec<FieldViolation>),

    #[error("Internal error: {0}")]
    Infrastructure(String),
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl SessionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed(vec![FieldViolation::new(field, message)])
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        use SessionError::*;
        match self {
            NotFound | NotRegistered => ErrorKind::NotFound,
            ProposalLimit | AlreadyRegistered => ErrorKind::Conflict,
            CannotBeUpdated | CannotBeDeleted | CannotBeAccepted | CannotBeRejected
            | NotAccepted | AlreadyStarted | AlreadyEnded | NotStarted | NotEnded | Cancelled
            | Full | TimeConflict | ReviewDeleted | AlreadyReviewed | NotReviewed => {
                ErrorKind::InvalidState
            }
            Forbidden => ErrorKind::Forbidden,
            ValidationFailed(_) => ErrorKind::ValidationFailed,
            Infrastructure(_) => ErrorKind::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Stable identifier for API clients.
    pub fn code(&self) -> &'static str {
        use SessionError::*;
        match self {
            NotFound => "SESSION_NOT_FOUND",
            ProposalLimit => "SESSION_PROPOSAL_LIMIT",
            CannotBeUpdated => "SESSION_CANNOT_BE_UPDATED",
            CannotBeDeleted => "SESSION_CANNOT_BE_DELETED",
            CannotBeAccepted => "SESSION_CANNOT_BE_ACCEPTED",
            CannotBeRejected => "SESSION_CANNOT_BE_REJECTED",
            NotAccepted => "SESSION_NOT_ACCEPTED",
            AlreadyStarted => "SESSION_ALREADY_STARTED",
            AlreadyEnded => "SESSION_ALREADY_ENDED",
            NotStarted => "SESSION_NOT_STARTED",
            NotEnded => "SESSION_NOT_ENDED",
            AlreadyRegistered => "SESSION_ALREADY_REGISTERED",
            NotRegistered => "SESSION_NOT_REGISTERED",
            Cancelled => "SESSION_CANCELLED",
            Full => "SESSION_FULL",
            TimeConflict => "SESSION_TIME_CONFLICT",
            ReviewDeleted => "REVIEW_DELETED",
            AlreadyReviewed => "SESSION_ALREADY_REVIEWED",
            NotReviewed => "SESSION_NOT_REVIEWED",
            Forbidden => "FORBIDDEN",
            ValidationFailed(_) => "VALIDATION_FAILED",
            Infrastructure(_) => "INTERNAL_ERROR",
        }
    }

    /// Per-field details, empty unless this is a validation failure.
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            SessionError::ValidationFailed(violations) => violations,
            _ => &[],
        }
    }
}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SessionNotFound => SessionError::NotFound,
            ErrorCode::AttendeeNotFound => SessionError::NotRegistered,
            ErrorCode::Forbidden | ErrorCode::Unauthorized => SessionError::Forbidden,
            ErrorCode::ValidationFailed => SessionError::validation(
                err.details.get("field").map(String::as_str).unwrap_or("request"),
                err.message,
            ),
            _ => SessionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        SessionError::validation(err.field().to_string(), err.to_string())
    }
}
