//! Bounded console log buffer.

use std::collections::{VecDeque, vec_deque};

use crate::models::LogLine;

/// Ordered, capped sequence of console lines.
///
/// Appending past capacity drops the oldest lines; survivors keep their
/// order and ids.
#[derive(Clone, Debug)]
pub struct LogBuffer {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl LogBuffer {
    /// Creates an empty buffer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LogBuffer capacity must be greater than 0");
        Self {
            lines: VecDeque::new(),
            capacity,
        }
    }

    /// Builds a buffer from historical output, oldest first.
    ///
    /// Equivalent to appending every line in order to an empty buffer.
    pub fn initialize<I, S>(history: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut buffer = Self::new(capacity);
        buffer.extend(history);
        buffer
    }

    /// Appends one line and trims the head to capacity.
    pub fn append(&mut self, text: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(LogLine::new(text));
    }

    pub fn extend<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for text in texts {
            self.append(text);
        }
    }

    /// Replaces the content with `history`, keeping the capacity.
    pub fn reset<I, S>(&mut self, history: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.clear();
        self.extend(history);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines from oldest to newest.
    pub fn iter(&self) -> vec_deque::Iter<'_, LogLine> {
        self.lines.iter()
    }

    /// Copy of the whole current sequence.
    pub fn snapshot(&self) -> Vec<LogLine> {
        self.lines.iter().cloned().collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.text.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "capacity must be greater than 0")]
    fn test_zero_capacity_panics() {
        let _ = LogBuffer::new(0);
    }

    #[test]
    fn test_append_within_capacity() {
        let mut buffer = LogBuffer::new(3);
        buffer.append("a");
        buffer.append("b");
        assert_eq!(buffer.texts(), vec!["a", "b"]);
        assert_eq!(buffer.capacity(), 3);
    }

    #[test]
    fn test_huge_capacity_allocates_lazily() {
        let mut buffer = LogBuffer::new(usize::MAX);
        buffer.extend(["a", "b"]);
        assert_eq!(buffer.texts(), vec!["a", "b"]);
        assert_eq!(buffer.capacity(), usize::MAX);
    }

    #[test]
    fn test_length_is_min_of_appended_and_capacity() {
        for capacity in 1..6 {
            for appended in 0..12 {
                let mut buffer = LogBuffer::new(capacity);
                let texts: Vec<String> = (0..appended).map(|i| format!("line {}", i)).collect();
                buffer.extend(texts.iter().cloned());

                assert_eq!(buffer.len(), appended.min(capacity));
                let expected = &texts[appended.saturating_sub(capacity)..];
                assert_eq!(buffer.texts(), expected);
            }
        }
    }

    #[test]
    fn test_ids_survive_trimming() {
        let mut buffer = LogBuffer::new(2);
        buffer.extend(["A", "B", "C"]);
        let ids: Vec<u64> = buffer.iter().map(|line| line.id).collect();
        assert_eq!(buffer.texts(), vec!["B", "C"]);
        assert!(ids[0] < ids[1]);

        buffer.append("D");
        let newest = buffer.iter().next_back().unwrap().id;
        assert!(newest > ids[1]);
    }

    #[test]
    fn test_initialize_trims_like_appends() {
        let buffer = LogBuffer::initialize(["one", "two", "three", "four"], 3);
        assert_eq!(buffer.texts(), vec!["two", "three", "four"]);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut buffer = LogBuffer::initialize(["x", "y"], 2);
        buffer.reset(["a", "b", "c"]);
        assert_eq!(buffer.texts(), vec!["b", "c"]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut buffer = LogBuffer::initialize(["a"], 2);
        let snapshot = buffer.snapshot();
        buffer.append("b");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(buffer.len(), 2);
    }
}
