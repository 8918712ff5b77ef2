// Orthographic adjustment when a suffix attaches to a word
//
// Rules are ordered; the first rule matching the boundary between the last
// word and the attaching fragment wins. Without a match the caller simply
// concatenates.

mod pattern;
mod simple;

use std::io::{BufReader, Read};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use pattern::RegexOrthography;
pub use simple::SimpleOrthography;

/// Error type for orthography rule files.
#[derive(Debug, thiserror::Error)]
pub enum OrthographyError {
    #[error("invalid orthography JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern in rule {index}: {source}")]
    Pattern {
        index: usize,
        #[source]
        source: regex::Error,
    },

    #[error("unknown orthography type: {0:?}")]
    UnknownKind(String),
}

/// Spelling adjustment at a word boundary.
pub trait Orthography: Send + Sync {
    /// Join `right` to the word `left`. Returns how many characters of
    /// `left` to erase and the text to type instead of `right`, or `None`
    /// when no rule applies.
    fn apply(&self, left: &str, right: &str) -> Option<(usize, String)>;
}

/// One `{"l": ..., "r": ..., "s": ...}` rule as stored in rule files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrthographyRule {
    #[serde(rename = "l")]
    pub left: String,
    #[serde(rename = "r")]
    pub right: String,
    #[serde(rename = "s")]
    pub replacement: String,
}

impl OrthographyRule {
    pub fn new(left: &str, right: &str, replacement: &str) -> Self {
        Self {
            left: left.to_string(),
            right: right.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// Rule file flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrthographyKind {
    #[default]
    Simple,
    Regex,
}

impl OrthographyKind {
    pub fn from_name(name: &str) -> Result<Self, OrthographyError> {
        match name.to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "regex" => Ok(Self::Regex),
            _ => Err(OrthographyError::UnknownKind(name.to_string())),
        }
    }
}

/// Read a JSON array of rules.
pub fn read_rules<R: Read>(reader: R) -> Result<Vec<OrthographyRule>, OrthographyError> {
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

/// Read a rule file and build the orthography of the given kind.
pub fn load<R: Read>(kind: OrthographyKind, reader: R) -> Result<Arc<dyn Orthography>, OrthographyError> {
    let rules = read_rules(reader)?;
    Ok(match kind {
        OrthographyKind::Simple => Arc::new(SimpleOrthography::new(rules)),
        OrthographyKind::Regex => Arc::new(RegexOrthography::new(&rules)?),
    })
}
