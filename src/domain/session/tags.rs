//! Session tag vocabulary and its bitmask codec.
//!
//! Tags are a fixed six-term vocabulary. Storage keeps them as a small
//! integer mask, most significant bit first in vocabulary order:
//!
//! ```text
//! bit   5    4    3    2    1    0
//! tag   PM   PD   FE   BE   DS   CP
//! ```
//!
//! Callers work with [`TagSet`]; only storage adapters touch the mask.
//! Parsing is lenient: names outside the vocabulary are dropped, never
//! reported.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A single session tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    ProductManagement,
    ProductDesign,
    Frontend,
    Backend,
    DataScience,
    CompetitiveProgramming,
}

impl Tag {
    /// The vocabulary in canonical order.
    pub const ALL: [Tag; 6] = [
        Tag::ProductManagement,
        Tag::ProductDesign,
        Tag::Frontend,
        Tag::Backend,
        Tag::DataScience,
        Tag::CompetitiveProgramming,
    ];

    /// Two-letter code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Tag::ProductManagement => "PM",
            Tag::ProductDesign => "PD",
            Tag::Frontend => "FE",
            Tag::Backend => "BE",
            Tag::DataScience => "DS",
            Tag::CompetitiveProgramming => "CP",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Tag::ProductManagement => "Product Management",
            Tag::ProductDesign => "Product Design",
            Tag::Frontend => "Frontend",
            Tag::Backend => "Backend",
            Tag::DataScience => "Data Science",
            Tag::CompetitiveProgramming => "Competitive Programming",
        }
    }

    /// Matches a short code or a full label, ignoring case and surrounding
    /// whitespace.
    pub fn parse(name: &str) -> Option<Tag> {
        let name = name.trim();
        Tag::ALL
            .into_iter()
            .find(|tag| tag.code().eq_ignore_ascii_case(name) || tag.label().eq_ignore_ascii_case(name))
    }

    fn bit(&self) -> u8 {
        let position = Tag::ALL.len() - 1 - (*self as usize);
        1 << position
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

const VOCABULARY_MASK: u8 = 0b0011_1111;

/// A set of tags, stored internally as the persisted bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TagSet(u8);

impl TagSet {
    pub fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from tag names, silently skipping unknown names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| Tag::parse(name.as_ref()))
            .collect()
    }

    /// Decodes a stored mask. Bits outside the vocabulary are ignored.
    pub fn from_mask(mask: i16) -> Self {
        Self((mask & VOCABULARY_MASK as i16) as u8)
    }

    /// Mask persisted in the `tags` column.
    pub fn to_mask(&self) -> i16 {
        self.0 as i16
    }

    pub fn insert(&mut self, tag: Tag) {
        self.0 |= tag.bit();
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0 & tag.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Any-of match used by listing filters.
    pub fn intersects(&self, other: &TagSet) -> bool {
        self.0 & other.0 != 0
    }

    /// Tags in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = Tag> + '_ {
        Tag::ALL.into_iter().filter(move |tag| self.contains(*tag))
    }

    /// Short codes in vocabulary order.
    pub fn codes(&self) -> Vec<&'static str> {
        self.iter().map(|tag| tag.code()).collect()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<T: IntoIterator<Item = Tag>>(iter: T) -> Self {
        let mut set = TagSet::empty();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl Serialize for TagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.codes())
    }
}

impl<'de> Deserialize<'de> for TagSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(TagSet::from_names(names))
    }
}

/// Encodes tag names into the storage mask. Unknown names contribute nothing.
pub fn encode<I, S>(names: I) -> i16
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    TagSet::from_names(names).to_mask()
}

/// Decodes a storage mask into short codes in vocabulary order.
pub fn decode(mask: i16) -> Vec<&'static str> {
    TagSet::from_mask(mask).codes()
}
