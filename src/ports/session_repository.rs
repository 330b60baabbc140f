//! Session repository port.
//!
//! Defines the contract for persisting sessions and their attendee records.
//!
//! # Design
//!
//! - Missing rows come back as `Ok(None)`; only `update` and `delete` report
//!   `SessionNotFound`
//! - Soft-deleted (cancelled) sessions are invisible to every read
//! - `register_attendee` is the one compound write; it closes the race
//!   between the capacity count and the insert

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, Timestamp, UserId};
use crate::domain::session::{PageRequest, Session, SessionAttendee, SessionFilter, SessionSort};

/// Selects attendee records by session, by user, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeQuery {
    pub session_id: Option<SessionId>,
    pub user_id: Option<UserId>,
    pub page: PageRequest,
}

impl AttendeeQuery {
    pub fn for_session(session_id: SessionId, page: PageRequest) -> Self {
        Self {
            session_id: Some(session_id),
            user_id: None,
            page,
        }
    }

    pub fn for_user(user_id: UserId, page: PageRequest) -> Self {
        Self {
            session_id: None,
            user_id: Some(user_id),
            page,
        }
    }
}

/// Counting criteria for attendee records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeCount {
    pub session_id: Option<SessionId>,
    pub user_id: Option<UserId>,
    /// Only count records whose session window overlaps `[start, end)`.
    pub overlapping: Option<(Timestamp, Timestamp)>,
    /// Skip records carrying an unregister reason.
    pub active_only: bool,
}

impl AttendeeCount {
    /// Seats taken in a session.
    pub fn seats_taken(session_id: SessionId) -> Self {
        Self {
            session_id: Some(session_id),
            active_only: true,
            ..Self::default()
        }
    }

    /// Active registrations of `user_id` that clash with a window.
    pub fn schedule_conflicts(user_id: UserId, start_at: Timestamp, end_at: Timestamp) -> Self {
        Self {
            user_id: Some(user_id),
            overlapping: Some((start_at, end_at)),
            active_only: true,
            ..Self::default()
        }
    }
}

/// Result of an atomic register attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    CapacityReached,
    AlreadyExists,
}

/// Repository port for sessions and attendees.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Find a non-deleted session by ID.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Persist a new session.
    async fn create(&self, session: &Session) -> Result<(), DomainError>;

    /// Overwrite an existing session, including status and soft-delete.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session doesn't exist
    async fn update(&self, session: &Session) -> Result<(), DomainError>;

    /// Hard-delete a session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session doesn't exist
    async fn delete(&self, id: &SessionId) -> Result<(), DomainError>;

    /// One page of sessions matching `filter`.
    async fn find_all(
        &self,
        filter: &SessionFilter,
        sort: &SessionSort,
        page: &PageRequest,
    ) -> Result<Vec<Session>, DomainError>;

    /// Number of sessions matching `filter`.
    async fn count(&self, filter: &SessionFilter) -> Result<u64, DomainError>;

    async fn find_attendee(
        &self,
        session_id: &SessionId,
        user_id: &UserId,
    ) -> Result<Option<SessionAttendee>, DomainError>;

    /// One page of attendee records, oldest first.
    async fn find_attendees(&self, query: &AttendeeQuery) -> Result<Vec<SessionAttendee>, DomainError>;

    /// Insert an attendee record without a capacity check.
    async fn create_attendee(&self, attendee: &SessionAttendee) -> Result<(), DomainError>;

    /// Insert an attendee only while fewer than `capacity` active records
    /// exist for the session. Count and insert are atomic.
    async fn register_attendee(
        &self,
        attendee: &SessionAttendee,
        capacity: u32,
    ) -> Result<RegistrationOutcome, DomainError>;

    /// # Errors
    ///
    /// - `AttendeeNotFound` if the record doesn't exist
    async fn update_attendee(&self, attendee: &SessionAttendee) -> Result<(), DomainError>;

    async fn count_attendees(&self, criteria: &AttendeeCount) -> Result<u64, DomainError>;
}
