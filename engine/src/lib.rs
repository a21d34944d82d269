//! # Shelf Engine
//!
//! An in-memory catalog store: uniquely identified records indexed by title
//! and by ID, plus named collections that reference those records without
//! owning them.
//!
//! ## Design Principles
//!
//! - **No interactive IO**: the engine consumes already-parsed values and
//!   returns values; only save/restore touch a `Read`/`Write`
//! - **All or nothing**: every operation either succeeds or leaves the
//!   store and catalog exactly as they were
//! - **No dangling references**: collections hold [`RecordHandle`]s that are
//!   resolved through the [`RecordStore`] at access time
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] has an ID assigned from a monotonic [`IdCounter`], a unique
//! title, a medium and a [`Rating`]. The [`RecordStore`] owns every record and
//! keeps a title index and an ID index over the same set.
//!
//! ### Collections
//!
//! A [`Collection`] is a named set of record handles. The [`Catalog`] keeps
//! collections unique by name. A record cannot be deleted while any
//! collection still holds it.
//!
//! ### Save and restore
//!
//! A [`Snapshot`] describes the whole library in a line-oriented text format
//! (or JSON). [`Library::restore`] builds a complete replacement from a
//! snapshot and swaps it in only if every record and collection validates.
//!
//! ## Quick Start
//!
//! ```rust
//! use shelf_engine::{Error, Library};
//!
//! let mut library = Library::new();
//! let alice = library.add_record("book", "Alice").unwrap().id();
//! library.add_record("dvd", "Bob").unwrap();
//!
//! library.add_collection("faves").unwrap();
//! library.add_member("faves", alice).unwrap();
//!
//! // Referenced records cannot be deleted
//! assert_eq!(library.remove_record(alice), Err(Error::RecordInUse(alice)));
//!
//! // Save and restore through the text format
//! let mut saved = Vec::new();
//! library.save_text(&mut saved).unwrap();
//!
//! let mut restored = Library::new();
//! restored.restore_text(saved.as_slice()).unwrap();
//! assert_eq!(restored.snapshot(), library.snapshot());
//! ```

pub mod catalog;
pub mod counter;
pub mod error;
pub mod library;
pub mod record;
pub mod snapshot;
pub mod store;

// Re-export main types at crate root
pub use catalog::{Catalog, Census, Collection, CollectionView};
pub use counter::IdCounter;
pub use error::Error;
pub use library::{Allocation, Library, RestoreState};
pub use record::{Rating, Record, RecordKey, RATING_MAX, RATING_MIN};
pub use snapshot::{
    SavedCollection, SavedRecord, Snapshot, SnapshotMetadata, SNAPSHOT_FORMAT_VERSION,
};
pub use store::{RecordHandle, RecordStore};

/// Type aliases for clarity
pub type RecordId = u64;
pub type CollectionName = String;
