//! RecordStore - the owning, dual-indexed container of all records.
//!
//! Records live in a slot arena addressed by [`RecordHandle`]. Two ordered
//! indexes map titles and IDs to handles. Every mutation touches both indexes
//! or neither, so the set of handles reachable by title is always the set
//! reachable by ID.

use crate::record::{check_medium, check_title};
use crate::{error::Result, Error, IdCounter, Rating, Record, RecordId, RecordKey};
use std::collections::BTreeMap;

/// Stable, non-owning reference to a record in a [`RecordStore`].
///
/// A handle outlives reordering of either index. Once its record is removed
/// the slot's generation moves on and the handle stops resolving, even if the
/// slot is later reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordHandle {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    record: Option<Record>,
}

/// The single owner of every record.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    /// Arena of record slots
    slots: Vec<Slot>,
    /// Indices of empty slots available for reuse
    free: Vec<usize>,
    /// Title-ordered index
    by_title: BTreeMap<String, RecordHandle>,
    /// ID-ordered index
    by_id: BTreeMap<RecordId, RecordHandle>,
    /// Source of IDs for newly added records
    ids: IdCounter,
}

impl RecordStore {
    /// Create an empty store whose first record gets ID 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Current state of the ID counter.
    pub fn counter(&self) -> IdCounter {
        self.ids
    }

    /// Resolve a handle to its record, if it is still live.
    pub fn get(&self, handle: RecordHandle) -> Option<&Record> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.as_ref())
    }

    fn get_mut(&mut self, handle: RecordHandle) -> Option<&mut Record> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.record.as_mut())
    }

    /// Check that a handle still refers to a live record.
    pub fn contains(&self, handle: RecordHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn handle_by_title(&self, title: &str) -> Option<RecordHandle> {
        self.by_title.get(title).copied()
    }

    pub fn handle_by_id(&self, id: RecordId) -> Option<RecordHandle> {
        self.by_id.get(&id).copied()
    }

    /// Look up a record by exact title.
    pub fn find_by_title(&self, title: &str) -> Option<&Record> {
        self.handle_by_title(title).and_then(|h| self.get(h))
    }

    /// Look up a record by ID.
    pub fn find_by_id(&self, id: RecordId) -> Option<&Record> {
        self.handle_by_id(id).and_then(|h| self.get(h))
    }

    /// Resolve a caller-facing key, failing with `NoSuchRecord`.
    pub fn resolve(&self, key: &RecordKey) -> Result<RecordHandle> {
        let handle = match key {
            RecordKey::Id(id) => self.handle_by_id(*id),
            RecordKey::Title(title) => self.handle_by_title(title),
        };
        handle.ok_or_else(|| Error::NoSuchRecord(key.clone()))
    }

    /// Add a new, unrated record under the next ID.
    ///
    /// Fails with `InvalidMedium`, `InvalidTitle` or `DuplicateTitle` without
    /// consuming an ID, and with `IdsExhausted` once the counter is at its
    /// maximum.
    pub fn insert(
        &mut self,
        medium: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<RecordHandle> {
        let medium = medium.into();
        let title = title.into();
        check_medium(&medium)?;
        check_title(&title)?;
        if self.by_title.contains_key(&title) {
            return Err(Error::DuplicateTitle(title));
        }

        let before = self.ids;
        let id = self.ids.next().ok_or(Error::IdsExhausted)?;
        let result = self.link(Record::new(id, medium, title));
        if result.is_err() {
            self.ids = before;
        }
        result
    }

    /// Add a record read back from saved data, keeping its ID.
    ///
    /// The counter is raised to stay above every ID seen so far.
    pub fn insert_from_serialized(
        &mut self,
        id: RecordId,
        medium: impl Into<String>,
        rating: Rating,
        title: impl Into<String>,
    ) -> Result<RecordHandle> {
        let medium = medium.into();
        let title = title.into();
        check_medium(&medium)?;
        check_title(&title)?;
        let handle = self.link(Record::restored(id, medium, rating, title))?;
        self.ids.observe(id);
        Ok(handle)
    }

    /// Place a record in the arena and in both indexes, or in none of them.
    fn link(&mut self, record: Record) -> Result<RecordHandle> {
        let id = record.id();
        let title = record.title().to_string();
        if self.by_title.contains_key(&title) {
            return Err(Error::DuplicateTitle(title));
        }

        let handle = self.allocate(record);
        self.by_title.insert(title.clone(), handle);
        if self.by_id.contains_key(&id) {
            self.by_title.remove(&title);
            self.release(handle);
            return Err(Error::DuplicateId(id));
        }
        self.by_id.insert(id, handle);

        debug_assert!(self.indexes_consistent());
        Ok(handle)
    }

    fn allocate(&mut self, record: Record) -> RecordHandle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.record = Some(record);
                RecordHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    record: Some(record),
                });
                RecordHandle {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, handle: RecordHandle) -> Option<Record> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(record)
    }

    /// Remove a record from both indexes and hand back ownership.
    ///
    /// The caller is responsible for checking that no collection still
    /// references the record.
    pub fn remove(&mut self, handle: RecordHandle) -> Result<Record> {
        let record = self.get(handle).ok_or(Error::StaleHandle)?;
        let id = record.id();
        let title = record.title().to_string();

        self.by_title.remove(&title);
        self.by_id.remove(&id);
        let record = self.release(handle).ok_or(Error::StaleHandle)?;

        debug_assert!(self.indexes_consistent());
        Ok(record)
    }

    /// Give a record a new title, re-seating it in the title index.
    ///
    /// The ID index is untouched. Renaming a record to its current title is a
    /// no-op. Returns the previous title.
    pub fn rename(&mut self, handle: RecordHandle, new_title: impl Into<String>) -> Result<String> {
        let new_title = new_title.into();
        check_title(&new_title)?;
        let old_title = self
            .get(handle)
            .ok_or(Error::StaleHandle)?
            .title()
            .to_string();
        if old_title == new_title {
            return Ok(old_title);
        }
        if self.by_title.contains_key(&new_title) {
            return Err(Error::DuplicateTitle(new_title));
        }

        self.by_title.remove(&old_title);
        if let Some(record) = self.get_mut(handle) {
            record.set_title(new_title.clone());
        }
        self.by_title.insert(new_title, handle);

        debug_assert!(self.indexes_consistent());
        Ok(old_title)
    }

    /// Change a record's rating. Neither index depends on it.
    pub fn set_rating(&mut self, handle: RecordHandle, rating: Rating) -> Result<()> {
        let record = self.get_mut(handle).ok_or(Error::StaleHandle)?;
        record.set_rating(rating);
        Ok(())
    }

    /// Records in title order.
    pub fn iter_by_title(&self) -> impl Iterator<Item = &Record> {
        self.by_title.values().filter_map(move |h| self.get(*h))
    }

    /// Records in ID order.
    pub fn iter_by_id(&self) -> impl Iterator<Item = &Record> {
        self.by_id.values().filter_map(move |h| self.get(*h))
    }

    /// Drop every record and restart ID numbering at 1.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.by_title.clear();
        self.by_id.clear();
        self.ids.reset();
    }

    /// Check that both indexes reach exactly the same live records, each
    /// under its own current title and ID.
    pub fn indexes_consistent(&self) -> bool {
        if self.by_title.len() != self.by_id.len() {
            return false;
        }
        let live = self.slots.iter().filter(|s| s.record.is_some()).count();
        if live != self.by_id.len() {
            return false;
        }
        let titles_ok = self
            .by_title
            .iter()
            .all(|(title, h)| self.get(*h).is_some_and(|r| r.title() == title));
        let ids_ok = self.by_id.iter().all(|(id, h)| {
            self.get(*h)
                .is_some_and(|r| r.id() == *id && self.by_title.get(r.title()) == Some(h))
        });
        titles_ok && ids_ok
    }
}
