//! Field constraints checked before any business rule runs.
//!
//! Every violated field is collected and reported together.

use serde::Serialize;

use super::aggregate::{SessionDraft, SessionType};
use super::errors::SessionError;
use super::patch::{FieldPatch, SessionPatch};
use crate::domain::foundation::Timestamp;

pub const TITLE_MIN_LENGTH: usize = 3;
pub const TEXT_MAX_LENGTH: usize = 255;
pub const REASON_MIN_LENGTH: usize = 3;
pub const CAPACITY_MIN: i32 = 1;
pub const CAPACITY_MAX: i32 = 100;

/// One failed constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Accumulates violations across a whole command.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    /// Minimum is measured on the trimmed text, maximum on the text as stored.
    pub fn text(&mut self, field: &str, value: &str, min: usize, max: usize) {
        if value.trim().chars().count() < min {
            self.push(field, format!("must be at least {} characters", min));
        } else if value.chars().count() > max {
            self.push(field, format!("must be at most {} characters", max));
        }
    }

    pub fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(value) = value {
            if value.chars().count() > max {
                self.push(field, format!("must be at most {} characters", max));
            }
        }
    }

    pub fn url(&mut self, field: &str, value: Option<&str>) {
        let Some(value) = value else { return };
        let rest = value
            .strip_prefix("https://")
            .or_else(|| value.strip_prefix("http://"));
        match rest {
            Some(rest) if !rest.is_empty() && !rest.starts_with('/') => {
                self.optional_text(field, Some(value), TEXT_MAX_LENGTH)
            }
            _ => self.push(field, "must be an http or https URL"),
        }
    }

    pub fn session_type(&mut self, code: i16) {
        if SessionType::from_code(code).is_none() {
            self.push("type", "must be one of: 1 (talk)");
        }
    }

    pub fn capacity(&mut self, capacity: i32) {
        if !(CAPACITY_MIN..=CAPACITY_MAX).contains(&capacity) {
            self.push(
                "capacity",
                format!("must be between {} and {}", CAPACITY_MIN, CAPACITY_MAX),
            );
        }
    }

    pub fn window(&mut self, start_at: &Timestamp, end_at: &Timestamp) {
        if end_at.is_before(start_at) {
            self.push("end_at", "must not be before start_at");
        }
    }

    pub fn finish(self) -> Result<(), SessionError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(SessionError::ValidationFailed(self.0))
        }
    }
}

/// Checks a new proposal.
pub fn validate_draft(draft: &SessionDraft) -> Result<(), SessionError> {
    let mut v = Violations::new();
    v.text("title", &draft.title, TITLE_MIN_LENGTH, TEXT_MAX_LENGTH);
    v.optional_text("description", draft.description.as_deref(), TEXT_MAX_LENGTH);
    v.session_type(draft.session_type);
    v.window(&draft.start_at, &draft.end_at);
    v.optional_text("room", draft.room.as_deref(), TEXT_MAX_LENGTH);
    v.url("meeting_url", draft.meeting_url.as_deref());
    v.capacity(draft.capacity);
    v.optional_text("image_uri", draft.image_uri.as_deref(), TEXT_MAX_LENGTH);
    v.finish()
}

/// Checks the fields a patch supplies. The merged window is re-checked by
/// the aggregate.
pub fn validate_patch(patch: &SessionPatch) -> Result<(), SessionError> {
    let mut v = Violations::new();
    if let Some(title) = &patch.title {
        v.text("title", title, TITLE_MIN_LENGTH, TEXT_MAX_LENGTH);
    }
    v.optional_text(
        "description",
        patch.description.as_set().map(String::as_str),
        TEXT_MAX_LENGTH,
    );
    if let Some(code) = patch.session_type {
        v.session_type(code);
    }
    if let (Some(start), Some(end)) = (&patch.start_at, &patch.end_at) {
        v.window(start, end);
    }
    v.optional_text("room", patch.room.as_set().map(String::as_str), TEXT_MAX_LENGTH);
    if let FieldPatch::Set(url) = &patch.meeting_url {
        v.url("meeting_url", Some(url));
    }
    if let Some(capacity) = patch.capacity {
        v.capacity(capacity);
    }
    v.optional_text(
        "image_uri",
        patch.image_uri.as_set().map(String::as_str),
        TEXT_MAX_LENGTH,
    );
    v.finish()
}

/// Checks a free-text reason or review body.
pub fn validate_reason(field: &str, value: &str) -> Result<(), SessionError> {
    let mut v = Violations::new();
    v.text(field, value, REASON_MIN_LENGTH, TEXT_MAX_LENGTH);
    v.finish()
}
