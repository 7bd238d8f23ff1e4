use std::collections::VecDeque;

use serde::{Serialize, Serializer};

use crate::content_model::ContentHistory;

/// Bounded, newest-first log of [`ContentHistory`] records.
///
/// Pushing onto a full log evicts the oldest record. Records are never
/// edited or removed one by one.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryLog {
    records: VecDeque<ContentHistory>,
    capacity: usize,
}

impl HistoryLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a log from records already ordered newest-first, keeping the
    /// `capacity` newest.
    pub fn from_records(records: Vec<ContentHistory>, capacity: usize) -> Self {
        let mut records = VecDeque::from(records);
        records.truncate(capacity);
        Self { records, capacity }
    }

    pub fn push(&mut self, record: ContentHistory) {
        if self.capacity == 0 {
            return;
        }
        self.records.push_front(record);
        self.records.truncate(self.capacity);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentHistory> {
        self.records.iter()
    }

    pub fn find(&self, record_id: &str) -> Option<&ContentHistory> {
        self.records.iter().find(|record| record.id == record_id)
    }

    /// Records for one content id, still newest-first.
    pub fn for_content<'a, 'b>(&'a self, content_id: &'b str) -> impl Iterator<Item = &'a ContentHistory> + 'b
    where
        'a: 'b,
    {
        self.records
            .iter()
            .filter(move |record| record.content_id == content_id)
    }
}

// Stored as a plain JSON array.
impl Serialize for HistoryLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.records.iter())
    }
}
