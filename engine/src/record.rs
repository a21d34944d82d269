//! Record types for catalog entries.

use crate::{error::Result, Error, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest rating a record can be given.
pub const RATING_MIN: i64 = 1;
/// Highest rating a record can be given.
pub const RATING_MAX: i64 = 5;

/// A record's rating: 1 through 5, or unrated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    /// The rating of a record nobody has rated yet.
    pub const UNRATED: Rating = Rating(0);

    /// Validate a user-supplied rating.
    pub fn new(value: i64) -> Result<Self> {
        if !(RATING_MIN..=RATING_MAX).contains(&value) {
            return Err(Error::InvalidRating(value));
        }
        Ok(Rating(value as u8))
    }

    /// Validate a rating read back from saved data, where 0 means unrated.
    pub fn from_saved(value: i64) -> Result<Self> {
        if value == 0 {
            return Ok(Self::UNRATED);
        }
        Self::new(value)
    }

    /// Numeric value, 0 when unrated.
    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_rated(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rated() {
            write!(f, "{}", self.0)
        } else {
            f.write_str("u")
        }
    }
}

/// A catalog entry.
///
/// Records are created and destroyed only by the
/// [`RecordStore`](crate::RecordStore). The ID never changes after creation;
/// the title changes only through [`RecordStore::rename`](crate::RecordStore::rename)
/// so that the title index stays in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Unique, process-monotonic identifier
    id: RecordId,
    /// Free-text medium, a single token such as "book" or "dvd"
    medium: String,
    /// Rating, unrated on creation
    rating: Rating,
    /// Unique, whitespace-normalized title
    title: String,
}

impl Record {
    /// Create a new, unrated record.
    pub(crate) fn new(id: RecordId, medium: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            medium: medium.into(),
            rating: Rating::UNRATED,
            title: title.into(),
        }
    }

    /// Reconstruct a record from saved data.
    pub(crate) fn restored(
        id: RecordId,
        medium: impl Into<String>,
        rating: Rating,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id,
            medium: medium.into(),
            rating,
            title: title.into(),
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn medium(&self) -> &str {
        &self.medium
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn set_rating(&mut self, rating: Rating) {
        self.rating = rating;
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
    }
}

/// Printed as `<id>: <medium> <rating> <title>`, with `u` for unrated.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} {}",
            self.id, self.medium, self.rating, self.title
        )
    }
}

/// A non-empty run of non-whitespace characters, as media and collection
/// names must be.
pub(crate) fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.contains(char::is_whitespace)
}

/// Titles are non-empty, carry no leading or trailing whitespace and fit on
/// one line.
pub(crate) fn check_title(title: &str) -> Result<()> {
    let multiline = title.contains(|c: char| c == '\n' || c == '\r');
    if title.is_empty() || title.trim() != title || multiline {
        return Err(Error::InvalidTitle(title.to_string()));
    }
    Ok(())
}

pub(crate) fn check_medium(medium: &str) -> Result<()> {
    if !is_token(medium) {
        return Err(Error::InvalidMedium(medium.to_string()));
    }
    Ok(())
}

/// How a caller names a record: by ID or by exact title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKey {
    Id(RecordId),
    Title(String),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "id {}", id),
            RecordKey::Title(title) => write!(f, "title '{}'", title),
        }
    }
}

impl From<RecordId> for RecordKey {
    fn from(id: RecordId) -> Self {
        RecordKey::Id(id)
    }
}

impl From<&str> for RecordKey {
    fn from(title: &str) -> Self {
        RecordKey::Title(title.to_string())
    }
}

impl From<String> for RecordKey {
    fn from(title: String) -> Self {
        RecordKey::Title(title)
    }
}
