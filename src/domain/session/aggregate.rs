//! Session aggregate entity.
//!
//! A session is a proposed talk with a fixed time window and a seat limit.
//! The aggregate owns the status rules and the time guards; ownership and
//! role checks that need the caller live in the command handlers.

use serde::{Deserialize, Serialize};

use super::errors::SessionError;
use super::patch::SessionPatch;
use super::tags::TagSet;
use crate::domain::foundation::{
    AuthenticatedUser, SessionId, SessionStatus, StateMachine, Timestamp, UserId,
};

/// Kind of session. Only talks exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    #[default]
    Talk,
}

impl SessionType {
    pub fn code(&self) -> i16 {
        match self {
            SessionType::Talk => 1,
        }
    }

    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            1 => Some(SessionType::Talk),
            _ => None,
        }
    }
}

/// Input for a new proposal, checked by `validation::validate_draft`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub session_type: i16,
    #[serde(default)]
    pub tags: TagSet,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub meeting_url: Option<String>,
    pub capacity: i32,
    #[serde(default)]
    pub image_uri: Option<String>,
}

/// Persisted shape of a session, used to rebuild the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub proposer_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub session_type: SessionType,
    pub tags: TagSet,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub room: Option<String>,
    pub meeting_url: Option<String>,
    pub capacity: u32,
    pub image_uri: Option<String>,
    pub status: SessionStatus,
    pub status_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

/// Session aggregate.
///
/// # Invariants
///
/// - `end_at` is never before `start_at`
/// - `capacity` is within 1..=100
/// - status only moves along the `SessionStatus` transition table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    record: SessionRecord,
}

impl Session {
    /// Creates a pending proposal from an already validated draft.
    pub fn propose(
        id: SessionId,
        proposer_id: UserId,
        draft: SessionDraft,
        now: Timestamp,
    ) -> Result<Self, SessionError> {
        let session_type = SessionType::from_code(draft.session_type)
            .ok_or_else(|| SessionError::validation("type", "must be one of: 1 (talk)"))?;
        if draft.end_at.is_before(&draft.start_at) {
            return Err(SessionError::validation("end_at", "must not be before start_at"));
        }

        Ok(Self {
            record: SessionRecord {
                id,
                proposer_id,
                title: draft.title.trim().to_string(),
                description: draft.description,
                session_type,
                tags: draft.tags,
                start_at: draft.start_at,
                end_at: draft.end_at,
                room: draft.room,
                meeting_url: draft.meeting_url,
                capacity: draft.capacity.max(0) as u32,
                image_uri: draft.image_uri,
                status: SessionStatus::Pending,
                status_reason: None,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        })
    }

    /// Rebuilds a session from storage without re-validating.
    pub fn reconstitute(record: SessionRecord) -> Self {
        Self { record }
    }

    pub fn into_record(self) -> SessionRecord {
        self.record
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.record.id
    }

    pub fn proposer_id(&self) -> &UserId {
        &self.record.proposer_id
    }

    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn description(&self) -> Option<&str> {
        self.record.description.as_deref()
    }

    pub fn session_type(&self) -> SessionType {
        self.record.session_type
    }

    pub fn tags(&self) -> TagSet {
        self.record.tags
    }

    pub fn start_at(&self) -> &Timestamp {
        &self.record.start_at
    }

    pub fn end_at(&self) -> &Timestamp {
        &self.record.end_at
    }

    pub fn room(&self) -> Option<&str> {
        self.record.room.as_deref()
    }

    pub fn meeting_url(&self) -> Option<&str> {
        self.record.meeting_url.as_deref()
    }

    pub fn capacity(&self) -> u32 {
        self.record.capacity
    }

    pub fn image_uri(&self) -> Option<&str> {
        self.record.image_uri.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        self.record.status
    }

    /// Rejection or cancellation reason.
    pub fn status_reason(&self) -> Option<&str> {
        self.record.status_reason.as_deref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.record.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.record.updated_at
    }

    pub fn deleted_at(&self) -> Option<&Timestamp> {
        self.record.deleted_at.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_proposed_by(&self, user_id: &UserId) -> bool {
        &self.record.proposer_id == user_id
    }

    /// Proposer or elevated role.
    pub fn authorize(&self, actor: &AuthenticatedUser) -> Result<(), SessionError> {
        if actor.owns_or_moderates(&self.record.proposer_id) {
            Ok(())
        } else {
            Err(SessionError::Forbidden)
        }
    }

    /// Accepted sessions are public; anything else only to proposer or staff.
    pub fn is_visible_to(&self, actor: &AuthenticatedUser) -> bool {
        self.record.status.is_public() || actor.owns_or_moderates(&self.record.proposer_id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Applies a sparse patch to a pending proposal.
    pub fn update(&mut self, patch: SessionPatch, now: Timestamp) -> Result<(), SessionError> {
        if !self.record.status.is_editable() {
            return Err(SessionError::CannotBeUpdated);
        }
        self.merge(patch, now)
    }

    pub fn ensure_deletable(&self) -> Result<(), SessionError> {
        if self.record.status.is_editable() {
            Ok(())
        } else {
            Err(SessionError::CannotBeDeleted)
        }
    }

    /// Applies the reviewer's final edits and accepts the proposal.
    pub fn accept(&mut self, patch: SessionPatch, now: Timestamp) -> Result<(), SessionError> {
        if !self.record.status.can_transition_to(&SessionStatus::Accepted) {
            return Err(SessionError::CannotBeAccepted);
        }
        self.merge(patch, now)?;
        self.record.status = SessionStatus::Accepted;
        Ok(())
    }

    pub fn reject(&mut self, reason: String, now: Timestamp) -> Result<(), SessionError> {
        if !self.record.status.can_transition_to(&SessionStatus::Rejected) {
            return Err(SessionError::CannotBeRejected);
        }
        self.record.status = SessionStatus::Rejected;
        self.record.status_reason = Some(reason);
        self.record.updated_at = now;
        Ok(())
    }

    /// Cancels an accepted session before it starts and soft-deletes it.
    pub fn cancel(&mut self, reason: Option<String>, now: Timestamp) -> Result<(), SessionError> {
        self.ensure_accepted()?;
        self.ensure_not_begun(&now)?;
        self.record.status = self.record.status.transition_to(SessionStatus::Cancelled)?;
        self.record.status_reason = reason;
        self.record.deleted_at = Some(now);
        self.record.updated_at = now;
        Ok(())
    }

    pub fn ensure_accepted(&self) -> Result<(), SessionError> {
        if self.record.status == SessionStatus::Accepted {
            Ok(())
        } else {
            Err(SessionError::NotAccepted)
        }
    }

    /// Register and Unregister are only allowed on accepted sessions that
    /// have not started.
    pub fn ensure_registration_open(&self, now: &Timestamp) -> Result<(), SessionError> {
        self.ensure_accepted()?;
        self.ensure_not_begun(now)
    }

    /// Reviews are only allowed once an accepted session has ended.
    pub fn ensure_concluded(&self, now: &Timestamp) -> Result<(), SessionError> {
        self.ensure_accepted()?;
        if now.is_before(&self.record.start_at) {
            return Err(SessionError::NotStarted);
        }
        if now.is_before(&self.record.end_at) {
            return Err(SessionError::NotEnded);
        }
        Ok(())
    }

    /// Half-open window overlap; back-to-back sessions do not overlap.
    pub fn overlaps(&self, start_at: &Timestamp, end_at: &Timestamp) -> bool {
        self.record.start_at.is_before(end_at) && start_at.is_before(&self.record.end_at)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    // Ended is reported before started.
    fn ensure_not_begun(&self, now: &Timestamp) -> Result<(), SessionError> {
        if !now.is_before(&self.record.end_at) {
            return Err(SessionError::AlreadyEnded);
        }
        if !now.is_before(&self.record.start_at) {
            return Err(SessionError::AlreadyStarted);
        }
        Ok(())
    }

    fn merge(&mut self, patch: SessionPatch, now: Timestamp) -> Result<(), SessionError> {
        let start_at = patch.start_at.unwrap_or(self.record.start_at);
        let end_at = patch.end_at.unwrap_or(self.record.end_at);
        if end_at.is_before(&start_at) {
            return Err(SessionError::validation("end_at", "must not be before start_at"));
        }
        let session_type = match patch.session_type {
            Some(code) => SessionType::from_code(code)
                .ok_or_else(|| SessionError::validation("type", "must be one of: 1 (talk)"))?,
            None => self.record.session_type,
        };

        let record = &mut self.record;
        if let Some(title) = patch.title {
            record.title = title.trim().to_string();
        }
        patch.description.apply_to(&mut record.description);
        record.session_type = session_type;
        if let Some(tags) = patch.tags {
            record.tags = tags;
        }
        record.start_at = start_at;
        record.end_at = end_at;
        patch.room.apply_to(&mut record.room);
        patch.meeting_url.apply_to(&mut record.meeting_url);
        if let Some(capacity) = patch.capacity {
            record.capacity = capacity.max(0) as u32;
        }
        patch.image_uri.apply_to(&mut record.image_uri);
        record.updated_at = now;
        Ok(())
    }
}
