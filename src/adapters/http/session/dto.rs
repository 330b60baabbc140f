//! HTTP DTOs for session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.
//! Proposal and patch bodies deserialize straight into `SessionDraft` and
//! `SessionPatch`, which already carry the wire format.

use serde::{Deserialize, Serialize};

use crate::application::SessionView;
use crate::domain::foundation::{SessionStatus, Timestamp, UserId};
use crate::domain::session::{
    AttendeeState, FieldViolation, Page, PageMeta, PageRequest, Session, SessionAttendee,
    SessionError, SessionFilter, SessionSort, SessionType, TagSet,
};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body carrying a mandatory reason (reject, unregister, remove review).
#[derive(Debug, Clone, Deserialize)]
pub struct ReasonRequest {
    pub reason: String,
}

/// Optional body for cancelling a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CancelSessionRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub review: String,
}

/// Query parameters for listing sessions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSessionsParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, rename = "type")]
    pub session_type: Option<i16>,
    /// Comma-separated tag codes or labels. Unknown entries are ignored.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub before_at: Option<Timestamp>,
    #[serde(default)]
    pub after_at: Option<Timestamp>,
    #[serde(default)]
    pub proposer_id: Option<UserId>,
    /// Status code, 1 through 4.
    #[serde(default)]
    pub status: Option<i16>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub order: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListSessionsParams {
    /// Splits the raw parameters into the listing inputs.
    pub fn into_parts(self) -> Result<(SessionFilter, SessionSort, PageRequest), SessionError> {
        let session_type = self
            .session_type
            .map(|code| {
                SessionType::from_code(code)
                    .ok_or_else(|| SessionError::validation("type", "must be one of: 1 (talk)"))
            })
            .transpose()?;
        let status = self
            .status
            .map(|code| {
                SessionStatus::from_code(code)
                    .map_err(|_| SessionError::validation("status", "must be between 1 and 4"))
            })
            .transpose()?;

        let filter = SessionFilter {
            search: self.search.filter(|s| !s.trim().is_empty()),
            session_type,
            tags: self
                .tags
                .map(|raw| TagSet::from_names(raw.split(',').map(str::trim))),
            before_at: self.before_at,
            after_at: self.after_at,
            proposer_id: self.proposer_id,
            status,
        };
        let sort = SessionSort::parse(self.sort.as_deref(), self.order.as_deref())?;
        let page = PageRequest::new(self.page, self.limit)?;

        Ok((filter, sort, page))
    }
}

/// Query parameters for attendee listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn into_request(self) -> Result<PageRequest, SessionError> {
        PageRequest::new(self.page, self.limit)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Session representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub proposer_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub session_type: i16,
    pub tags: Vec<&'static str>,
    pub start_at: String,
    pub end_at: String,
    pub room: Option<String>,
    pub meeting_url: Option<String>,
    pub capacity: u32,
    pub image_uri: Option<String>,
    pub status: SessionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee_count: Option<u64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        let record = session.into_record();
        Self {
            id: record.id.to_string(),
            proposer_id: record.proposer_id.to_string(),
            title: record.title,
            description: record.description,
            session_type: record.session_type.code(),
            tags: record.tags.codes(),
            start_at: record.start_at.to_rfc3339(),
            end_at: record.end_at.to_rfc3339(),
            room: record.room,
            meeting_url: record.meeting_url,
            capacity: record.capacity,
            image_uri: record.image_uri,
            status: record.status,
            status_reason: record.status_reason,
            attendee_count: None,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            attendee_count: Some(view.attendee_count),
            ..view.session.into()
        }
    }
}

/// Attendee record for API responses. Removed reviews are not echoed.
#[derive(Debug, Clone, Serialize)]
pub struct AttendeeResponse {
    pub session_id: String,
    pub user_id: String,
    pub state: AttendeeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SessionAttendee> for AttendeeResponse {
    fn from(attendee: SessionAttendee) -> Self {
        let state = attendee.state();
        Self {
            session_id: attendee.session_id.to_string(),
            user_id: attendee.user_id.to_string(),
            state,
            reason: attendee.reason,
            review: attendee
                .review
                .filter(|_| state != AttendeeState::ReviewRemoved),
            deleted_reason: attendee.deleted_reason,
            created_at: attendee.created_at.to_rfc3339(),
            updated_at: attendee.updated_at.to_rfc3339(),
        }
    }
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T, D: Into<T>> From<Page<D>> for ListResponse<T> {
    fn from(page: Page<D>) -> Self {
        Self {
            data: page.items.into_iter().map(Into::into).collect(),
            meta: page.meta,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            violations: Vec::new(),
        }
    }

    pub fn internal() -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: "Internal server error".to_string(),
            violations: Vec::new(),
        }
    }
}

impl From<&SessionError> for ErrorResponse {
    fn from(error: &SessionError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
            violations: error.violations().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::domain::session::SessionDraft;

    fn session() -> Session {
        let start = Timestamp::now().plus_hours(1);
        let draft = SessionDraft {
            title: "Async Rust".to_string(),
            description: None,
            session_type: 1,
            tags: TagSet::from_names(["BE", "DS"]),
            start_at: start,
            end_at: start.plus_hours(1),
            room: None,
            meeting_url: None,
            capacity: 40,
            image_uri: None,
        };
        Session::propose(SessionId::new(), UserId::random(), draft, Timestamp::now()).unwrap()
    }

    #[test]
    fn list_params_parse_tags_leniently() {
        let params: ListSessionsParams =
            serde_json::from_value(serde_json::json!({"tags": "BE, nope,pm"})).unwrap();

        let (filter, _, page) = params.into_parts().unwrap();

        assert_eq!(filter.tags, Some(TagSet::from_names(["BE", "PM"])));
        assert_eq!(page, PageRequest::default());
    }

    #[test]
    fn list_params_reject_unknown_sort_and_status() {
        let bad_sort = ListSessionsParams {
            sort: Some("password".to_string()),
            ..ListSessionsParams::default()
        };
        assert!(matches!(bad_sort.into_parts(), Err(SessionError::ValidationFailed(_))));

        let bad_status = ListSessionsParams {
            status: Some(9),
            ..ListSessionsParams::default()
        };
        assert!(matches!(bad_status.into_parts(), Err(SessionError::ValidationFailed(_))));
    }

    #[test]
    fn list_params_map_status_code() {
        let params = ListSessionsParams {
            status: Some(2),
            ..ListSessionsParams::default()
        };
        let (filter, _, _) = params.into_parts().unwrap();
        assert_eq!(filter.status, Some(SessionStatus::Accepted));
    }

    #[test]
    fn session_response_uses_tag_codes_and_type_code() {
        let response = SessionResponse::from(session());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["type"], 1);
        assert_eq!(json["tags"], serde_json::json!(["BE", "DS"]));
        assert_eq!(json["status"], "pending");
        assert!(json.get("attendee_count").is_none());
    }

    #[test]
    fn removed_review_is_not_echoed() {
        let mut attendee = SessionAttendee::register(SessionId::new(), UserId::random(), Timestamp::now());
        attendee.review("Meh".to_string(), Timestamp::now()).unwrap();
        attendee.remove_review("Spam".to_string(), Timestamp::now()).unwrap();

        let response = AttendeeResponse::from(attendee);

        assert_eq!(response.state, AttendeeState::ReviewRemoved);
        assert!(response.review.is_none());
        assert_eq!(response.deleted_reason.as_deref(), Some("Spam"));
    }

    #[test]
    fn error_response_carries_code_and_violations() {
        let error = SessionError::validation("title", "too short");

        let body = ErrorResponse::from(&error);

        assert_eq!(body.code, "VALIDATION_FAILED");
        assert_eq!(body.violations.len(), 1);
        assert_eq!(body.violations[0].field, "title");
    }
}
