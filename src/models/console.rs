//! Console output line type.

use std::sync::atomic::{AtomicU64, Ordering};

/// One line of process console output.
#[derive(Clone, Debug)]
pub struct LogLine {
    /// Key for keyed rendering; unique for the lifetime of the page.
    pub id: u64,
    pub text: String,
}

// Shared by every console view so ids never repeat, even across views.
static LOG_LINE_COUNTER: AtomicU64 = AtomicU64::new(0);

impl LogLine {
    /// Create a line with the next id.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: LOG_LINE_COUNTER.fetch_add(1, Ordering::Relaxed),
            text: text.into(),
        }
    }
}

impl PartialEq for LogLine {
    fn eq(&self, other: &Self) -> bool {
        // Only compare text, not ID
        self.text == other.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let first = LogLine::new("first");
        let second = LogLine::new("second");
        let again = LogLine::new("first");

        assert!(second.id > first.id);
        assert!(again.id > second.id);
        assert_eq!(first, again);
    }
}
