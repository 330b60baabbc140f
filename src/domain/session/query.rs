//! Listing filters, sorting and pagination.

use serde::Serialize;
use std::str::FromStr;

use super::aggregate::{Session, SessionType};
use super::errors::SessionError;
use super::tags::TagSet;
use crate::domain::foundation::{AuthenticatedUser, SessionStatus, Timestamp, UserId};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Conditions a listed session must satisfy. Every field is optional and
/// unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilter {
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub session_type: Option<SessionType>,
    /// Any-of match.
    pub tags: Option<TagSet>,
    /// Sessions starting strictly before this instant.
    pub before_at: Option<Timestamp>,
    /// Sessions ending strictly after this instant.
    pub after_at: Option<Timestamp>,
    pub proposer_id: Option<UserId>,
    pub status: Option<SessionStatus>,
}

impl SessionFilter {
    /// In-process evaluation, equivalent to the SQL the postgres adapter builds.
    pub fn matches(&self, session: &Session) -> bool {
        if session.deleted_at().is_some() {
            return false;
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            if !session.title().to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        if let Some(kind) = self.session_type {
            if session.session_type() != kind {
                return false;
            }
        }
        if let Some(tags) = self.tags.filter(|t| !t.is_empty()) {
            if !session.tags().intersects(&tags) {
                return false;
            }
        }
        if let Some(before) = &self.before_at {
            if !session.start_at().is_before(before) {
                return false;
            }
        }
        if let Some(after) = &self.after_at {
            if !session.end_at().is_after(after) {
                return false;
            }
        }
        if let Some(proposer) = &self.proposer_id {
            if session.proposer_id() != proposer {
                return false;
            }
        }
        if let Some(status) = self.status {
            if session.status() != status {
                return false;
            }
        }
        true
    }

    /// Restricts a listing to what `actor` may see.
    ///
    /// Regular users may list accepted sessions freely. Anything else is
    /// limited to their own proposals, and asking for someone else's
    /// proposals is refused outright.
    pub fn narrow_for(mut self, actor: &AuthenticatedUser) -> Result<Self, SessionError> {
        if actor.is_elevated() {
            return Ok(self);
        }
        if let Some(proposer) = &self.proposer_id {
            if proposer != &actor.id {
                return Err(SessionError::Forbidden);
            }
        }
        if self.status != Some(SessionStatus::Accepted) && self.proposer_id.is_none() {
            self.proposer_id = Some(actor.id);
        }
        Ok(self)
    }
}

/// Sortable columns. The allow-list is the only way a column name reaches
/// a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    Title,
    #[default]
    StartAt,
    EndAt,
    Room,
    Capacity,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::StartAt => "start_at",
            SortField::EndAt => "end_at",
            SortField::Room => "room",
            SortField::Capacity => "capacity",
        }
    }
}

impl FromStr for SortField {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "start_at" => Ok(SortField::StartAt),
            "end_at" => Ok(SortField::EndAt),
            "room" => Ok(SortField::Room),
            "capacity" => Ok(SortField::Capacity),
            _ => Err(SessionError::validation(
                "sort",
                "must be one of: id, title, start_at, end_at, room, capacity",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(SessionError::validation("order", "must be one of: asc, desc")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl SessionSort {
    /// Parses optional query values; omitted values take defaults.
    pub fn parse(field: Option<&str>, order: Option<&str>) -> Result<Self, SessionError> {
        Ok(Self {
            field: field.map(str::parse).transpose()?.unwrap_or_default(),
            order: order.map(str::parse).transpose()?.unwrap_or_default(),
        })
    }
}

/// Validated page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self, SessionError> {
        let page = page.unwrap_or(DEFAULT_PAGE as i64);
        let limit = limit.unwrap_or(DEFAULT_LIMIT as i64);

        let mut violations = Vec::new();
        if page < 1 || page > u32::MAX as i64 {
            violations.push(super::FieldViolation::new("page", "must be at least 1"));
        }
        if !(1..=MAX_LIMIT as i64).contains(&limit) {
            violations.push(super::FieldViolation::new(
                "limit",
                format!("must be between 1 and {}", MAX_LIMIT),
            ));
        }
        if !violations.is_empty() {
            return Err(SessionError::ValidationFailed(violations));
        }

        Ok(Self {
            page: page as u32,
            limit: limit as u32,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }

    /// Slices an in-memory result set.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// Pagination metadata returned next to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total_data: u64,
    pub total_page: u64,
    pub page: u32,
    pub limit: u32,
}

impl PageMeta {
    pub fn new(request: &PageRequest, total_data: u64) -> Self {
        Self {
            total_data,
            total_page: total_data.div_ceil(request.limit as u64),
            page: request.page,
            limit: request.limit,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}
