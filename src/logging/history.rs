//! This module provides the bounded history of emitted records.
//!
//! Every record is kept here exactly once, whether or not it is currently
//! visible, until it is evicted by newer records.
use super::record::LogRecord;
use std::collections::VecDeque;

/// A fixed-capacity, oldest-first buffer of log records.
#[derive(Debug)]
pub struct HistoryBuffer {
    /// The circular buffer of records.
    entries: VecDeque<LogRecord>,
    /// The maximum number of records to keep.
    capacity: usize,
}

impl HistoryBuffer {
    /// Creates a new `HistoryBuffer`.
    ///
    /// # Arguments
    ///
    /// * `capacity` - The maximum number of records to keep. A capacity of
    ///   zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record, returning the evicted oldest record if the buffer
    /// was full.
    pub fn push(&mut self, record: LogRecord) -> Option<LogRecord> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(record);
        evicted
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogRecord> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
