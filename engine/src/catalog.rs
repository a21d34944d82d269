//! Collections and the catalog that names them.
//!
//! A [`Collection`] holds [`RecordHandle`]s, never records. Membership is by
//! handle identity, so renaming a record does not disturb any collection. The
//! [`Catalog`] keeps collections ordered and unique by name.

use crate::record::is_token;
use crate::{error::Result, CollectionName, Error, Record, RecordHandle, RecordStore};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// A named set of non-owning record references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    name: CollectionName,
    members: BTreeSet<RecordHandle>,
}

impl Collection {
    /// Create an empty collection.
    pub fn new(name: impl Into<CollectionName>) -> Self {
        Self {
            name: name.into(),
            members: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Add a member, failing with `AlreadyMember` if it is present.
    pub fn add_member(&mut self, record: RecordHandle) -> Result<()> {
        if !self.members.insert(record) {
            return Err(Error::AlreadyMember(self.name.clone()));
        }
        Ok(())
    }

    /// Remove a member, failing with `NotMember` if it is absent.
    pub fn remove_member(&mut self, record: RecordHandle) -> Result<()> {
        if !self.members.remove(&record) {
            return Err(Error::NotMember(self.name.clone()));
        }
        Ok(())
    }

    pub fn is_member(&self, record: RecordHandle) -> bool {
        self.members.contains(&record)
    }

    /// Add every member of `other` not already present.
    pub fn union_with(&mut self, other: &Collection) {
        self.members.extend(other.members.iter().copied());
    }

    /// Member handles in handle order.
    pub fn members(&self) -> impl Iterator<Item = RecordHandle> + '_ {
        self.members.iter().copied()
    }

    /// Discard all members.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Pair the collection with the store that owns its members, for display.
    pub fn view<'a>(&'a self, store: &'a RecordStore) -> CollectionView<'a> {
        CollectionView {
            collection: self,
            store,
        }
    }
}

/// A collection resolved against its record store.
#[derive(Debug, Clone, Copy)]
pub struct CollectionView<'a> {
    collection: &'a Collection,
    store: &'a RecordStore,
}

impl<'a> CollectionView<'a> {
    /// Member records in title order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + 'a {
        let store = self.store;
        let mut records: Vec<&'a Record> = self
            .collection
            .members
            .iter()
            .filter_map(|h| store.get(*h))
            .collect();
        records.sort_unstable_by(|a, b| a.title().cmp(b.title()));
        records.into_iter()
    }
}

impl fmt::Display for CollectionView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collection {} contains:", self.collection.name)?;
        if self.collection.is_empty() {
            return writeln!(f, " None");
        }
        writeln!(f)?;
        for record in self.records() {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

/// Membership tallies across the whole catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Census {
    /// Distinct records that appear in at least one collection
    pub at_least_one: usize,
    /// Distinct records that appear in more than one collection
    pub multiple: usize,
    /// Sum of all collection sizes
    pub total_slots: usize,
}

impl Census {
    /// Render the tallies relative to the number of records in the library.
    pub fn summary(&self, library_size: usize) -> String {
        format!(
            "{} out of {} Records appear in at least one Collection\n\
             {} out of {} Records appear in more than one Collection\n\
             Collections contain a total of {} Records\n",
            self.at_least_one, library_size, self.multiple, library_size, self.total_slots
        )
    }
}

/// Every collection, keyed and ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    collections: BTreeMap<CollectionName, Collection>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Create an empty collection.
    pub fn add(&mut self, name: impl Into<CollectionName>) -> Result<&mut Collection> {
        self.insert(Collection::new(name))
    }

    /// Insert an already-populated collection.
    ///
    /// Names are single tokens; anything else fails with `InvalidName`. A
    /// taken name fails with `DuplicateName`.
    pub fn insert(&mut self, collection: Collection) -> Result<&mut Collection> {
        use std::collections::btree_map::Entry;

        if !is_token(&collection.name) {
            return Err(Error::InvalidName(collection.name));
        }

        match self.collections.entry(collection.name.clone()) {
            Entry::Occupied(entry) => Err(Error::DuplicateName(entry.key().clone())),
            Entry::Vacant(entry) => Ok(entry.insert(collection)),
        }
    }

    /// Remove and return a collection.
    pub fn remove(&mut self, name: &str) -> Result<Collection> {
        self.collections
            .remove(name)
            .ok_or_else(|| Error::NoSuchCollection(name.to_string()))
    }

    pub fn find(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.collections.get_mut(name)
    }

    /// Look up a collection, failing with `NoSuchCollection`.
    pub fn get(&self, name: &str) -> Result<&Collection> {
        self.find(name)
            .ok_or_else(|| Error::NoSuchCollection(name.to_string()))
    }

    /// Look up a collection for mutation, failing with `NoSuchCollection`.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Collection> {
        self.find_mut(name)
            .ok_or_else(|| Error::NoSuchCollection(name.to_string()))
    }

    /// Create `new_name` as the union of two existing collections.
    ///
    /// The sources are left unmodified.
    pub fn combine(&mut self, first: &str, second: &str, new_name: &str) -> Result<&Collection> {
        let mut combined = self.get(first)?.clone();
        combined.union_with(self.get(second)?);
        combined.name = new_name.to_string();
        self.insert(combined).map(|c| &*c)
    }

    /// Whether any collection holds this record.
    pub fn references(&self, record: RecordHandle) -> bool {
        self.collections.values().any(|c| c.is_member(record))
    }

    /// Collections in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    /// Drop every collection.
    pub fn clear(&mut self) {
        self.collections.clear();
    }

    /// Tally how often each record appears across all collections.
    pub fn membership_census(&self) -> Census {
        let mut counts: HashMap<RecordHandle, usize> = HashMap::new();
        let mut census = Census::default();

        for handle in self.collections.values().flat_map(|c| c.members()) {
            let count = counts.entry(handle).or_insert(0);
            match *count {
                0 => census.at_least_one += 1,
                1 => census.multiple += 1,
                _ => {}
            }
            *count += 1;
            census.total_slots += 1;
        }

        census
    }
}
