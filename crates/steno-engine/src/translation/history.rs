// Bounded history of committed translations

use std::collections::VecDeque;
use std::rc::Rc;

use crate::formatting::{FormattedText, Formatting};
use crate::processor::ParsedAction;

use super::Translation;

/// Number of committed translations kept for undo and match extension.
pub const HISTORY_CAPACITY: usize = 100;

/// A committed translation and the edit it made.
#[derive(Debug, Clone)]
pub struct HistoryTranslation {
    pub translation: Translation,
    pub actions: Vec<ParsedAction>,
    /// The edit relative to the context before it. `text.formatting` is
    /// the formatting left behind.
    pub text: FormattedText,
    /// Characters the edit erased, as far as they were known.
    pub deleted: String,
    /// Formatting in effect before the edit.
    pub before: Formatting,
}

impl HistoryTranslation {
    /// Whether undoing this entry changes any text. Entries that only
    /// changed formatting are popped for free by undo.
    pub fn is_undoable(&self) -> bool {
        !(self.text.text.is_empty() && self.text.backspaces == 0)
    }
}

/// Ring buffer of committed translations, oldest first.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Rc<HistoryTranslation>>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(HISTORY_CAPACITY)),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, returning the oldest one if it fell off.
    pub fn push(&mut self, entry: Rc<HistoryTranslation>) -> Option<Rc<HistoryTranslation>> {
        self.entries.push_back(entry);
        if self.entries.len() > self.capacity {
            self.entries.pop_front()
        } else {
            None
        }
    }

    pub fn pop(&mut self) -> Option<Rc<HistoryTranslation>> {
        self.entries.pop_back()
    }

    pub fn last(&self) -> Option<&Rc<HistoryTranslation>> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from the most recent backwards.
    pub fn iter_recent(&self) -> impl Iterator<Item = &Rc<HistoryTranslation>> {
        self.entries.iter().rev()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}
