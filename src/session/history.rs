use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::keyboard::combo::NormalizedCombo;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub combo: NormalizedCombo,
    pub description: String,
}

/// Bounded list of recently matched combos, newest first.
#[derive(Clone, Debug)]
pub struct ComboHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl ComboHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a match. Returns `false` when it repeats the newest entry.
    pub fn push(&mut self, combo: NormalizedCombo, description: &str) -> bool {
        if self
            .entries
            .front()
            .is_some_and(|e| e.combo == combo && e.description == description)
        {
            return false;
        }
        self.entries.push_front(HistoryEntry {
            combo,
            description: description.to_string(),
        });
        self.entries.truncate(self.capacity);
        true
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
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

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for ComboHistory {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::combo::normalize;

    #[test]
    fn test_newest_first() {
        let mut history = ComboHistory::new(5);
        history.push(normalize("Ctrl+C"), "Copy");
        history.push(normalize("Ctrl+V"), "Paste");
        let names: Vec<&str> = history.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(names, vec!["Paste", "Copy"]);
    }

    #[test]
    fn test_repeat_of_newest_is_skipped() {
        let mut history = ComboHistory::new(5);
        assert!(history.push(normalize("Ctrl+C"), "Copy"));
        assert!(!history.push(normalize("ctrl+c"), "Copy"));
        assert_eq!(history.len(), 1);

        // Not the newest anymore, so it is recorded again.
        history.push(normalize("Ctrl+V"), "Paste");
        assert!(history.push(normalize("Ctrl+C"), "Copy"));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = ComboHistory::new(2);
        history.push(normalize("Ctrl+A"), "a");
        history.push(normalize("Ctrl+B"), "b");
        history.push(normalize("Ctrl+C"), "c");
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().description, "c");
        assert!(history.iter().all(|e| e.description != "a"));
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let history = ComboHistory::new(0);
        assert_eq!(history.capacity(), 1);
    }
}
