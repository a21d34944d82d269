//! Error types for the Shelf engine.

use crate::{CollectionName, RecordId, RecordKey};
use thiserror::Error;

/// All possible errors from the Shelf engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Record store errors
    #[error("library already has a record titled '{0}'")]
    DuplicateTitle(String),

    #[error("library already has a record with id {0}")]
    DuplicateId(RecordId),

    #[error("no record with {0}")]
    NoSuchRecord(RecordKey),

    #[error("record {0} is a member of a collection")]
    RecordInUse(RecordId),

    #[error("record handle no longer refers to a live record")]
    StaleHandle,

    #[error("rating {0} is out of range")]
    InvalidRating(i64),

    #[error("invalid title '{0}'")]
    InvalidTitle(String),

    #[error("invalid medium '{0}'")]
    InvalidMedium(String),

    #[error("record ids are exhausted")]
    IdsExhausted,

    // Catalog errors
    #[error("catalog already has a collection named '{0}'")]
    DuplicateName(CollectionName),

    #[error("no collection named '{0}'")]
    NoSuchCollection(CollectionName),

    #[error("invalid collection name '{0}'")]
    InvalidName(CollectionName),

    #[error("record is already a member of collection '{0}'")]
    AlreadyMember(CollectionName),

    #[error("record is not a member of collection '{0}'")]
    NotMember(CollectionName),

    #[error("cannot clear all records unless all collections are empty")]
    CatalogNotEmpty,

    // Save/restore errors
    #[error("invalid data: {0}")]
    MalformedData(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::NoSuchCollection("faves".into());
        assert_eq!(err.to_string(), "no collection named 'faves'");

        let err = Error::NoSuchRecord(RecordKey::Id(7));
        assert_eq!(err.to_string(), "no record with id 7");

        let err = Error::NoSuchRecord(RecordKey::Title("Dune".into()));
        assert_eq!(err.to_string(), "no record with title 'Dune'");

        let err = Error::InvalidRating(9);
        assert_eq!(err.to_string(), "rating 9 is out of range");
    }

    #[test]
    fn io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io.into();
        assert_eq!(err, Error::Io("pipe closed".into()));
    }
}
