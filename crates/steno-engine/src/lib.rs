//! Steno translation engine.
//!
//! Turns a stream of [`Stroke`](steno_core::Stroke)s into text edits, key
//! combinations and host commands. Dictionaries map stroke sequences to raw
//! translation strings; the processor parses those strings into actions; the
//! translator applies them against the current output context and keeps an
//! undo history.
//!
//! # Architecture
//!
//! - [`dictionary`] -- Dictionary traits, JSON-backed and computed dictionaries, layering
//! - [`formatting`] -- Spacing/case state, text fragments and their composition
//! - [`orthography`] -- Spelling adjustment when suffixes attach to words
//! - [`processor`] -- Parser for the `{...}` mini-language in translations
//! - [`translation`] -- Longest-match lookup with affix folding, history entries
//! - [`commands`] -- Builtin command table and the command execution context
//! - [`translator`] -- Top-level façade producing [`Action`]s per stroke
//! - [`system`] / [`config`] -- System definition and its JSON configuration
//! - [`resource`] -- Scheme-prefixed stream resolvers supplied by the host
//! - [`loader`] -- File loading with caches, logging failures as unavailable
//! - [`cache`] -- LRU-bounded resource cache

pub mod cache;
pub mod commands;
pub mod config;
pub mod dictionary;
pub mod formatting;
pub mod loader;
pub mod orthography;
pub mod processor;
pub mod resource;
pub mod system;
pub mod translation;
pub mod translator;

pub use commands::CommandError;
pub use dictionary::{Dictionary, DictionaryError, MultiDictionary, StandardDictionary};
pub use formatting::{FormattedText, Formatting, Space, UnformattedText};
pub use loader::{LoadError, Loader};
pub use orthography::{Orthography, OrthographyError};
pub use processor::{KeyComboError, ParseError, ParsedAction, TranslationProcessor};
pub use system::System;
pub use translation::{HistoryTranslation, Translation};
pub use translator::{Action, Translator};
