// Priority-ordered dictionary stack

use std::fmt;
use std::sync::Arc;

use steno_core::Stroke;

use super::Dictionary;

/// Ordered list of dictionaries; the first one with an entry wins.
#[derive(Clone, Default)]
pub struct MultiDictionary {
    members: Vec<Arc<dyn Dictionary>>,
}

impl MultiDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from members in priority order (highest first).
    pub fn from_members(members: Vec<Arc<dyn Dictionary>>) -> Self {
        Self { members }
    }

    /// Append a member with the lowest priority so far.
    pub fn push(&mut self, dictionary: Arc<dyn Dictionary>) {
        self.members.push(dictionary);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Arc<dyn Dictionary>] {
        &self.members
    }
}

impl Dictionary for MultiDictionary {
    fn get(&self, strokes: &[Stroke]) -> Option<String> {
        self.members.iter().find_map(|d| d.get(strokes))
    }

    fn longest_key(&self) -> usize {
        self.members.iter().map(|d| d.longest_key()).max().unwrap_or(0)
    }
}

impl fmt::Debug for MultiDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiDictionary")
            .field("members", &self.members.len())
            .field("longest_key", &self.longest_key())
            .finish()
    }
}
