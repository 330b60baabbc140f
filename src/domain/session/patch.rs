//! Sparse updates for session fields.
//!
//! Required fields use `Option<T>`: `None` leaves the value alone. Nullable
//! fields use [`FieldPatch`] so that "leave alone" and "clear" stay distinct.
//! In JSON an absent key is `Keep`, an explicit `null` is `Clear`.

use serde::{Deserialize, Deserializer};

use super::tags::TagSet;
use crate::domain::foundation::Timestamp;

/// Three-way update for a nullable field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldPatch<T> {
    #[default]
    Keep,
    Set(T),
    Clear,
}

impl<T> FieldPatch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, FieldPatch::Keep)
    }

    /// The value being set, if any.
    pub fn as_set(&self) -> Option<&T> {
        match self {
            FieldPatch::Set(value) => Some(value),
            _ => None,
        }
    }

    /// Applies the patch to `target`.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            FieldPatch::Keep => {}
            FieldPatch::Set(value) => *target = Some(value),
            FieldPatch::Clear => *target = None,
        }
    }
}

impl<T> From<Option<T>> for FieldPatch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FieldPatch::Set(value),
            None => FieldPatch::Clear,
        }
    }
}

// Only reached when the key is present; `#[serde(default)]` covers absence.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for FieldPatch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(FieldPatch::from)
    }
}

/// Sparse update applied by Update and Accept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionPatch {
    pub title: Option<String>,
    pub description: FieldPatch<String>,
    #[serde(rename = "type")]
    pub session_type: Option<i16>,
    pub tags: Option<TagSet>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub room: FieldPatch<String>,
    pub meeting_url: FieldPatch<String>,
    pub capacity: Option<i32>,
    pub image_uri: FieldPatch<String>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        *self == SessionPatch::default()
    }
}
