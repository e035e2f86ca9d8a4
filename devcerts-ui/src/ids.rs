use std::cell::Cell;

use crate::dom::Dom;

/// Monotonic counter backing generated element ids. Starts at 1.
#[derive(Debug, Default)]
pub struct IdCounter {
    last: Cell<u64>,
}

impl IdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        let next = self.last.get() + 1;
        self.last.set(next);
        next
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.last.get()
    }
}

/// Gives elements a stable id, generating `{prefix}-{n}` when they have none
#[derive(Debug)]
pub struct IdentifierAssigner {
    counter: IdCounter,
    prefix: String,
}

impl Default for IdentifierAssigner {
    fn default() -> Self {
        Self::new("unique-id")
    }
}

impl IdentifierAssigner {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            counter: IdCounter::new(),
            prefix: prefix.into(),
        }
    }

    /// Return the element's id, assigning a fresh one if it has none.
    /// An element that already carries an id is never touched.
    pub fn ensure_id<D: Dom>(&self, dom: &D, node: &D::Node) -> String {
        let existing = dom.id(node);
        if !existing.is_empty() {
            return existing;
        }

        let id = format!("{}-{}", self.prefix, self.counter.next());
        dom.set_id(node, &id);
        id
    }

    pub fn issued(&self) -> u64 {
        self.counter.issued()
    }
}
