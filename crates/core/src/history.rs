//! Append-only log of moves completed in the current session.

use crate::types::MoveRecord;

/// Insertion-ordered move history. Records are never edited or removed.
#[derive(Debug, Clone, Default)]
pub struct MoveHistory {
    records: Vec<MoveRecord>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: MoveRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    /// Records in the order they were appended.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &MoveRecord> {
        self.records.iter()
    }

    /// Records most recent first, the order used for display.
    pub fn newest_first(&self) -> impl Iterator<Item = &MoveRecord> {
        self.records.iter().rev()
    }
}
