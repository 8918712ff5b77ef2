// Dictionary traits and layering
//
// A dictionary maps a stroke sequence to a raw translation string. The
// translator only needs `get` and `longest_key`; editing tools additionally
// use `MutableDictionary` and `ReverseLookup`.

pub mod multi;
pub mod numbers;
pub mod standard;

use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock};

use steno_core::Stroke;

pub use multi::MultiDictionary;
pub use numbers::NumbersDictionary;
pub use standard::StandardDictionary;

/// Error type for dictionary loading and saving.
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dictionary JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A stroke sequence did not parse against the dictionary's layout.
    #[error("invalid stroke sequence: {0:?}")]
    InvalidStrokes(String),
}

/// Read access to a stroke dictionary.
pub trait Dictionary: Send + Sync {
    /// Raw translation for exactly this stroke sequence.
    fn get(&self, strokes: &[Stroke]) -> Option<String>;

    /// Maximum stroke count of any key. Never under-reports.
    fn longest_key(&self) -> usize;
}

/// A dictionary that can be edited and written back.
pub trait MutableDictionary: Dictionary {
    /// Store a translation, returning the one it replaced.
    fn set(&mut self, strokes: &[Stroke], translation: String) -> Option<String>;

    /// Remove a translation, returning it.
    fn remove(&mut self, strokes: &[Stroke]) -> Option<String>;

    /// Serialize the dictionary as JSON.
    fn save(&self, out: &mut dyn Write) -> Result<(), DictionaryError>;
}

/// Translation-to-strokes lookup.
pub trait ReverseLookup {
    /// Every stroke sequence whose translation is exactly `translation`,
    /// in ascending rtfcre order.
    fn reverse_get(&self, translation: &str) -> Vec<Vec<Stroke>>;
}

impl<D: Dictionary + ?Sized> Dictionary for Arc<D> {
    fn get(&self, strokes: &[Stroke]) -> Option<String> {
        (**self).get(strokes)
    }

    fn longest_key(&self) -> usize {
        (**self).longest_key()
    }
}

impl<D: Dictionary> Dictionary for RwLock<D> {
    fn get(&self, strokes: &[Stroke]) -> Option<String> {
        self.read().unwrap_or_else(PoisonError::into_inner).get(strokes)
    }

    fn longest_key(&self) -> usize {
        self.read().unwrap_or_else(PoisonError::into_inner).longest_key()
    }
}

impl<D: ReverseLookup> ReverseLookup for RwLock<D> {
    fn reverse_get(&self, translation: &str) -> Vec<Vec<Stroke>> {
        self.read()
            .unwrap_or_else(PoisonError::into_inner)
            .reverse_get(translation)
    }
}

impl<D: ReverseLookup + ?Sized> ReverseLookup for Arc<D> {
    fn reverse_get(&self, translation: &str) -> Vec<Vec<Stroke>> {
        (**self).reverse_get(translation)
    }
}
