//! Library - the live record store and catalog, and their save/restore.
//!
//! Callers name records by [`RecordKey`] and collections by name; the library
//! resolves them to handles, enforces that a record is never removed while a
//! collection references it, and swaps in restored state only once it has
//! been fully built and validated.

use crate::{
    error::Result, Catalog, Census, Collection, Error, Rating, Record, RecordHandle, RecordKey,
    RecordStore, SavedCollection, SavedRecord, Snapshot,
};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Where the most recent restore ended up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreState {
    /// No restore has run
    #[default]
    Idle,
    /// A replacement library is being built
    Loading,
    /// The replacement library was swapped in
    Committed,
    /// The replacement was discarded; live state untouched
    RolledBack,
}

/// Counts of live allocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub records: usize,
    pub collections: usize,
}

/// The live (record store, catalog) pair.
#[derive(Debug, Clone, Default)]
pub struct Library {
    store: RecordStore,
    catalog: Catalog,
    restore_state: RestoreState,
}

impl Library {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn restore_state(&self) -> RestoreState {
        self.restore_state
    }

    pub fn find_by_title(&self, title: &str) -> Option<&Record> {
        self.store.find_by_title(title)
    }

    pub fn find_by_id(&self, id: crate::RecordId) -> Option<&Record> {
        self.store.find_by_id(id)
    }

    /// Look up a record, failing with `NoSuchRecord`.
    pub fn record(&self, key: impl Into<RecordKey>) -> Result<&Record> {
        let handle = self.store.resolve(&key.into())?;
        self.store.get(handle).ok_or(Error::StaleHandle)
    }

    /// Look up a collection, failing with `NoSuchCollection`.
    pub fn collection(&self, name: &str) -> Result<&Collection> {
        self.catalog.get(name)
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Add a new record under the next ID.
    pub fn add_record(&mut self, medium: &str, title: &str) -> Result<&Record> {
        let handle = self.store.insert(medium, title)?;
        let record = self.store.get(handle).ok_or(Error::StaleHandle)?;
        tracing::debug!("record {} added: {}", record.id(), record.title());
        Ok(record)
    }

    /// Delete a record that no collection references.
    pub fn remove_record(&mut self, key: impl Into<RecordKey>) -> Result<Record> {
        let handle = self.store.resolve(&key.into())?;
        let id = self.store.get(handle).ok_or(Error::StaleHandle)?.id();
        if self.catalog.references(handle) {
            return Err(Error::RecordInUse(id));
        }

        let record = self.store.remove(handle)?;
        tracing::debug!("record {} deleted: {}", record.id(), record.title());
        Ok(record)
    }

    /// Give a record a new title.
    ///
    /// Collections key members by handle, so their membership is unaffected.
    pub fn rename_record(&mut self, key: impl Into<RecordKey>, new_title: &str) -> Result<&Record> {
        let handle = self.store.resolve(&key.into())?;
        let old_title = self.store.rename(handle, new_title)?;
        let record = self.store.get(handle).ok_or(Error::StaleHandle)?;
        tracing::debug!(
            "record {} renamed: {} -> {}",
            record.id(),
            old_title,
            record.title()
        );
        Ok(record)
    }

    /// Set a record's rating, which must be between 1 and 5.
    pub fn rate(&mut self, key: impl Into<RecordKey>, rating: i64) -> Result<&Record> {
        let handle = self.store.resolve(&key.into())?;
        let rating = Rating::new(rating)?;
        self.store.set_rating(handle, rating)?;
        let record = self.store.get(handle).ok_or(Error::StaleHandle)?;
        tracing::debug!("record {} rated {}", record.id(), rating);
        Ok(record)
    }

    /// Records whose title contains `fragment`, ignoring case, in title order.
    pub fn search_titles(&self, fragment: &str) -> Vec<&Record> {
        let needle = fragment.to_lowercase();
        self.store
            .iter_by_title()
            .filter(|r| r.title().to_lowercase().contains(&needle))
            .collect()
    }

    /// Records from highest to lowest rating, ties in title order.
    pub fn records_by_rating(&self) -> Vec<&Record> {
        let mut records: Vec<_> = self.store.iter_by_title().collect();
        records.sort_by(|a, b| b.rating().cmp(&a.rating()));
        records
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    pub fn add_collection(&mut self, name: &str) -> Result<&Collection> {
        let collection = self.catalog.add(name)?;
        tracing::debug!("collection {} added", name);
        Ok(&*collection)
    }

    pub fn remove_collection(&mut self, name: &str) -> Result<Collection> {
        let collection = self.catalog.remove(name)?;
        tracing::debug!("collection {} deleted", name);
        Ok(collection)
    }

    pub fn add_member(&mut self, name: &str, key: impl Into<RecordKey>) -> Result<&Record> {
        self.catalog.get(name)?;
        let handle = self.store.resolve(&key.into())?;
        self.catalog.get_mut(name)?.add_member(handle)?;

        let record = self.store.get(handle).ok_or(Error::StaleHandle)?;
        tracing::debug!("member {} {} added to {}", record.id(), record.title(), name);
        Ok(record)
    }

    pub fn remove_member(&mut self, name: &str, key: impl Into<RecordKey>) -> Result<&Record> {
        self.catalog.get(name)?;
        let handle = self.store.resolve(&key.into())?;
        self.catalog.get_mut(name)?.remove_member(handle)?;

        let record = self.store.get(handle).ok_or(Error::StaleHandle)?;
        tracing::debug!(
            "member {} {} removed from {}",
            record.id(),
            record.title(),
            name
        );
        Ok(record)
    }

    pub fn is_member(&self, name: &str, key: impl Into<RecordKey>) -> Result<bool> {
        let collection = self.catalog.get(name)?;
        let handle = self.store.resolve(&key.into())?;
        Ok(collection.is_member(handle))
    }

    /// Create `new_name` as the union of two collections.
    pub fn combine_collections(
        &mut self,
        first: &str,
        second: &str,
        new_name: &str,
    ) -> Result<&Collection> {
        let combined = self.catalog.combine(first, second, new_name)?;
        tracing::debug!(
            "collections {} and {} combined into {}",
            first,
            second,
            new_name
        );
        Ok(combined)
    }

    pub fn membership_census(&self) -> Census {
        self.catalog.membership_census()
    }

    pub fn allocation(&self) -> Allocation {
        Allocation {
            records: self.store.len(),
            collections: self.catalog.len(),
        }
    }

    // ------------------------------------------------------------------
    // Clearing
    // ------------------------------------------------------------------

    /// Delete every record. Refused while any collection has members.
    pub fn clear_library(&mut self) -> Result<()> {
        if self.catalog.iter().any(|c| !c.is_empty()) {
            return Err(Error::CatalogNotEmpty);
        }
        self.store.clear();
        tracing::debug!("all records deleted");
        Ok(())
    }

    /// Delete every collection.
    pub fn clear_catalog(&mut self) {
        self.catalog.clear();
        tracing::debug!("all collections deleted");
    }

    /// Delete everything and restart ID numbering.
    pub fn clear_all(&mut self) {
        self.catalog.clear();
        self.store.clear();
        tracing::debug!("all data deleted");
    }

    // ------------------------------------------------------------------
    // Save / restore
    // ------------------------------------------------------------------

    /// Describe the current state: records in ID order, collections in name
    /// order, members in title order.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();

        snapshot.records = self
            .store
            .iter_by_id()
            .map(|r| SavedRecord {
                id: r.id(),
                medium: r.medium().to_string(),
                rating: i64::from(r.rating().value()),
                title: r.title().to_string(),
            })
            .collect();

        snapshot.collections = self
            .catalog
            .iter()
            .map(|c| SavedCollection {
                name: c.name().to_string(),
                members: c
                    .view(&self.store)
                    .records()
                    .map(|r| r.title().to_string())
                    .collect(),
            })
            .collect();

        snapshot
    }

    /// Write the text encoding of the current state.
    pub fn save_text<W: Write>(&self, out: W) -> Result<()> {
        self.snapshot().write_text(out)
    }

    /// JSON encoding of the current state.
    pub fn save_json(&self) -> Result<String> {
        self.snapshot().to_json_pretty()
    }

    /// Build a new, isolated library from a snapshot.
    ///
    /// Every collection member resolves against the library being built. Any
    /// failure is reported as `MalformedData`.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let mut library = Library::new();

        for saved in &snapshot.records {
            if saved.id == 0 {
                return Err(Error::MalformedData("record id must be positive".into()));
            }
            let rating = Rating::from_saved(saved.rating).map_err(|e| {
                Error::MalformedData(format!("record {}: {}", saved.id, e))
            })?;
            library
                .store
                .insert_from_serialized(saved.id, saved.medium.as_str(), rating, saved.title.as_str())
                .map_err(|e| Error::MalformedData(format!("record {}: {}", saved.id, e)))?;
        }

        for saved in &snapshot.collections {
            let mut collection = Collection::new(saved.name.as_str());
            for title in &saved.members {
                let handle = library.store.handle_by_title(title).ok_or_else(|| {
                    Error::MalformedData(format!(
                        "collection {}: no record titled '{}'",
                        saved.name, title
                    ))
                })?;
                collection.add_member(handle).map_err(|_| {
                    Error::MalformedData(format!(
                        "collection {}: '{}' listed twice",
                        saved.name, title
                    ))
                })?;
            }
            library
                .catalog
                .insert(collection)
                .map_err(|e| Error::MalformedData(e.to_string()))?;
        }

        Ok(library)
    }

    /// Replace the live state with the one described by `snapshot`.
    ///
    /// On failure the live store, catalog and ID counter are left exactly as
    /// they were.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.restore_state = RestoreState::Loading;
        match Self::from_snapshot(snapshot) {
            Ok(built) => {
                self.commit(built);
                Ok(())
            }
            Err(e) => Err(self.roll_back(e)),
        }
    }

    /// Parse the text encoding and restore from it.
    pub fn restore_text<R: Read>(&mut self, input: R) -> Result<()> {
        self.restore_state = RestoreState::Loading;
        match Snapshot::read_text(input) {
            Ok(snapshot) => self.restore(&snapshot),
            Err(e) => Err(self.roll_back(e)),
        }
    }

    /// Parse the JSON encoding and restore from it.
    pub fn restore_json(&mut self, json: &str) -> Result<()> {
        self.restore_state = RestoreState::Loading;
        match Snapshot::from_json(json) {
            Ok(snapshot) => self.restore(&snapshot),
            Err(e) => Err(self.roll_back(e)),
        }
    }

    fn commit(&mut self, built: Library) {
        tracing::info!(
            "data loaded: {} records, {} collections",
            built.store.len(),
            built.catalog.len()
        );
        // The old catalog goes together with the store its handles point into.
        self.store = built.store;
        self.catalog = built.catalog;
        self.restore_state = RestoreState::Committed;
    }

    fn roll_back(&mut self, err: Error) -> Error {
        tracing::warn!("restore rolled back: {}", err);
        self.restore_state = RestoreState::RolledBack;
        match err {
            Error::MalformedData(_) => err,
            other => Error::MalformedData(other.to_string()),
        }
    }

    /// Handle for a key, for callers holding on to membership across renames.
    pub fn handle(&self, key: impl Into<RecordKey>) -> Result<RecordHandle> {
        self.store.resolve(&key.into())
    }
}
