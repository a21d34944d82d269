//! Monotonic counter for assigning record IDs.
//!
//! Each [`RecordStore`](crate::RecordStore) owns its own counter, so building a
//! replacement store during a restore never disturbs the live one.

use crate::RecordId;
use serde::{Deserialize, Serialize};

/// A monotonically increasing ID source.
///
/// The counter holds the last ID handed out; the first ID assigned by a fresh
/// counter is 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdCounter {
    /// Last ID handed out (or observed from saved data)
    pub last: RecordId,
}

impl IdCounter {
    /// Create a counter starting at zero.
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Create a counter with a specific last-assigned value.
    pub fn with_last(last: RecordId) -> Self {
        Self { last }
    }

    /// Increment the counter and return the new ID, or `None` once every
    /// ID has been used. An exhausted counter is left unchanged.
    pub fn next(&mut self) -> Option<RecordId> {
        self.last = self.last.checked_add(1)?;
        Some(self.last)
    }

    /// Raise the counter so that future IDs stay above `id`.
    pub fn observe(&mut self, id: RecordId) {
        self.last = self.last.max(id);
    }

    /// Start numbering from 1 again.
    pub fn reset(&mut self) {
        self.last = 0;
    }
}
