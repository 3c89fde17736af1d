//! Linear undo/redo history of full element snapshots.

use crate::elements::Element;

/// Default number of entries kept before the oldest are dropped.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Ordered list of snapshots plus a cursor pointing at the current one.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Vec<Element>>,
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// History seeded with an empty document.
    pub fn new(limit: usize) -> Self {
        let mut history = Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        };
        history.reset(&[]);
        history
    }

    /// Drop everything and start over from `elements`.
    pub fn reset(&mut self, elements: &[Element]) {
        self.entries = vec![elements.to_vec()];
        self.cursor = 0;
    }

    /// Record `elements` as the newest entry, discarding any redo tail.
    pub fn commit(&mut self, elements: &[Element]) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(elements.to_vec());
        self.cursor = self.entries.len() - 1;

        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
            self.cursor -= excess;
        }
    }

    /// Step back one entry and return it.
    pub fn undo(&mut self) -> Option<&[Element]> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry and return it.
    pub fn redo(&mut self) -> Option<&[Element]> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
