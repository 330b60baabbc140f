//! Session domain module.
//!
//! Conference sessions move through a review lifecycle:
//!
//! - **Propose** creates a `Pending` session (one pending proposal per user)
//! - **Accept** / **Reject** settle a pending proposal
//! - **Cancel** withdraws an accepted session before it starts
//!
//! Attendees register against accepted sessions and review them once they
//! have ended.

mod aggregate;
mod attendee;
mod errors;
mod patch;
mod query;
pub mod tags;
mod validation;

pub use aggregate::{Session, SessionDraft, SessionRecord, SessionType};
pub use attendee::{AttendeeState, SessionAttendee};
pub use errors::{ErrorKind, SessionError};
pub use patch::{FieldPatch, SessionPatch};
pub use query::{
    Page, PageMeta, PageRequest, SessionFilter, SessionSort, SortField, SortOrder, DEFAULT_LIMIT,
    DEFAULT_PAGE, MAX_LIMIT,
};
pub use tags::{Tag, TagSet};
pub use validation::{
    validate_draft, validate_patch, validate_reason, FieldViolation, Violations,
    REASON_MIN_LENGTH, TEXT_MAX_LENGTH, TITLE_MIN_LENGTH,
};
