//! Shared value types for steno translation.
//!
//! This crate holds the small, dependency-light pieces every other crate in
//! the workspace builds on: the key layout of a steno machine, the strokes
//! pressed on it, case transforms applied to translated words, and the key
//! combination names emitted for non-text output.
//!
//! # Architecture
//!
//! - [`layout`] -- Ordered key set with left / break / right groups and aliases
//! - [`stroke`] -- Immutable key chords and `/`-separated stroke sequences
//! - [`case`] -- Named text case transforms (capitalize, upper, title, ...)
//! - [`keys`] -- Key combination names and modifier sets

pub mod case;
pub mod keys;
pub mod layout;
pub mod stroke;

pub use layout::KeyLayout;
pub use stroke::Stroke;

/// Error type for key layout construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout has no keys")]
    Empty,
    #[error("layout has {0} keys, at most 64 are supported")]
    TooManyKeys(usize),
    #[error("invalid break group {start}..{end} for a layout of {len} keys")]
    InvalidBreak { start: usize, end: usize, len: usize },
    #[error("reserved character {0:?} used as a key")]
    ReservedKey(char),
    #[error("invalid alias token: {0}")]
    InvalidAlias(String),
    #[error("alias refers to unknown key: {0}")]
    UnknownKey(String),
}
