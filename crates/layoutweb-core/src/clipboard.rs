//! In-process clipboard for copied elements.

use crate::elements::{Element, ElementSnapshot};

/// Detached element snapshots waiting to be pasted.
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    items: Vec<ElementSnapshot>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with copies of `elements`. Empty input leaves
    /// the previous contents in place.
    pub fn store<'a>(&mut self, elements: impl IntoIterator<Item = &'a Element>) -> usize {
        let items: Vec<ElementSnapshot> = elements.into_iter().map(ElementSnapshot::of).collect();
        if !items.is_empty() {
            self.items = items;
        }
        self.items.len()
    }

    pub fn items(&self) -> &[ElementSnapshot] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
