//! A user's registration against one session.
//!
//! Records are never removed. Leaving, reviewing and moderation are all
//! annotations on the same row:
//!
//! ```text
//! Registered ──unregister──► Cancelled
//!     │
//!     └──review──► Reviewed ──remove_review──► ReviewRemoved
//! ```

use serde::Serialize;

use super::errors::SessionError;
use crate::domain::foundation::{SessionId, Timestamp, UserId};

/// Derived state of an attendee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendeeState {
    Registered,
    Cancelled,
    Reviewed,
    ReviewRemoved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAttendee {
    pub session_id: SessionId,
    pub user_id: UserId,
    /// Unregister reason. A set reason means the seat was given back.
    pub reason: Option<String>,
    pub review: Option<String>,
    /// Why a moderator removed the review.
    pub deleted_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SessionAttendee {
    pub fn register(session_id: SessionId, user_id: UserId, now: Timestamp) -> Self {
        Self {
            session_id,
            user_id,
            reason: None,
            review: None,
            deleted_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn state(&self) -> AttendeeState {
        if self.deleted_reason.is_some() {
            AttendeeState::ReviewRemoved
        } else if self.review.is_some() {
            AttendeeState::Reviewed
        } else if self.reason.is_some() {
            AttendeeState::Cancelled
        } else {
            AttendeeState::Registered
        }
    }

    /// Counts toward capacity and schedule conflicts.
    pub fn is_active(&self) -> bool {
        self.reason.is_none()
    }

    /// Error for a second registration on the same pair.
    pub fn reregistration_error(&self) -> SessionError {
        if self.is_active() {
            SessionError::AlreadyRegistered
        } else {
            SessionError::Cancelled
        }
    }

    pub fn unregister(&mut self, reason: String, now: Timestamp) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.reason = Some(reason);
        self.updated_at = now;
        Ok(())
    }

    pub fn review(&mut self, review: String, now: Timestamp) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.ensure_review_not_removed()?;
        if self.review.is_some() {
            return Err(SessionError::AlreadyReviewed);
        }
        self.review = Some(review);
        self.updated_at = now;
        Ok(())
    }

    pub fn remove_review(&mut self, reason: String, now: Timestamp) -> Result<(), SessionError> {
        self.ensure_active()?;
        self.ensure_review_not_removed()?;
        if self.review.is_none() {
            return Err(SessionError::NotReviewed);
        }
        self.deleted_reason = Some(reason);
        self.updated_at = now;
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(SessionError::Cancelled)
        }
    }

    fn ensure_review_not_removed(&self) -> Result<(), SessionError> {
        if self.deleted_reason.is_some() {
            Err(SessionError::ReviewDeleted)
        } else {
            Ok(())
        }
    }
}
