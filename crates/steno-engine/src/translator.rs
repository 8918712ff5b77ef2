// Top-level translator
//
// Owns the history and the output context. Each stroke is looked up,
// parsed into actions and run; the resulting text edits are merged into the
// fewest possible `Action::Text` edits for the host. Every committed
// translation records the exact edit it made so that undo can restore the
// previous text and re-apply any translations it had replaced.

use std::rc::Rc;
use std::sync::Arc;

use steno_core::Stroke;
use steno_core::case::Transform;
use steno_core::keys::KeyCombo;

use crate::commands::Command;
use crate::dictionary::Dictionary;
use crate::formatting::text::{char_offset, common_prefix_chars, last_word, pop_chars};
use crate::formatting::{FormattedText, Formatting, UnformattedText};
use crate::processor::{ParsedAction, TranslationProcessor};
use crate::system::System;
use crate::translation::{self, History, HistoryTranslation, Translation};

/// Characters of recent output kept for orthography, retro transforms and
/// undo.
pub const CONTEXT_LIMIT: usize = 1024;

/// What the host should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Erase `backspaces` characters, then type `text`.
    Text { backspaces: usize, text: String },
    /// Press a key combination.
    KeyCombo(KeyCombo),
    /// Run a host command.
    Host { name: String, arg: Option<String> },
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct State {
    history: History,
    redo: Vec<Rc<HistoryTranslation>>,
    /// Tail of the output so far; `backspaces` is always zero.
    context: FormattedText,
}

impl State {
    fn new(system: &System) -> Self {
        Self {
            history: History::default(),
            redo: Vec::new(),
            context: FormattedText::new(0, String::new(), system.start_formatting()),
        }
    }

    /// Apply an edit to the context, returning the characters it erased.
    fn edit(&mut self, backspaces: usize, text: &str, formatting: Formatting) -> String {
        let erased = pop_chars(&mut self.context.text, backspaces);
        self.context.text.push_str(text);
        let excess = self.context.text.chars().count().saturating_sub(CONTEXT_LIMIT);
        if excess > 0 {
            let cut = char_offset(&self.context.text, excess);
            self.context.text.drain(..cut);
        }
        self.context.formatting = formatting;
        erased
    }

    fn reset(&mut self, system: &System) {
        self.history.clear();
        self.redo.clear();
        self.context = FormattedText::new(0, String::new(), system.start_formatting());
    }
}

/// Accumulates consecutive edits into one.
#[derive(Debug, Clone, Default)]
struct EditBuffer {
    backspaces: usize,
    /// The erased characters, as far as they were known, oldest first.
    erased: String,
    text: String,
}

impl EditBuffer {
    fn is_empty(&self) -> bool {
        self.backspaces == 0 && self.text.is_empty()
    }

    /// Follow this edit with another one that erased `erased` (the last
    /// `backspaces` characters of the context, or fewer) and typed `text`.
    fn push(&mut self, backspaces: usize, erased: &str, text: &str) {
        let own = self.text.chars().count();
        if backspaces <= own {
            pop_chars(&mut self.text, backspaces);
        } else {
            let reached = erased.chars().count().saturating_sub(own);
            let before_own = &erased[..char_offset(erased, reached)];
            self.erased.insert_str(0, before_own);
            self.backspaces += backspaces - own;
            self.text.clear();
        }
        self.text.push_str(text);
    }

    /// Drop the part of the retyped text that equals what was erased.
    fn minimized(mut self) -> Self {
        if self.erased.chars().count() == self.backspaces {
            let common = common_prefix_chars(&self.erased, &self.text);
            if common > 0 {
                self.backspaces -= common;
                self.erased.drain(..char_offset(&self.erased, common));
                self.text.drain(..char_offset(&self.text, common));
            }
        }
        self
    }
}

/// Action list under construction for one call into the translator.
#[derive(Debug, Default)]
struct Output {
    actions: Vec<Action>,
    pending: EditBuffer,
}

impl Output {
    fn edit(&mut self, backspaces: usize, erased: &str, text: &str) {
        self.pending.push(backspaces, erased, text);
    }

    fn push(&mut self, action: Action) {
        self.flush();
        self.actions.push(action);
    }

    fn flush(&mut self) {
        let edit = std::mem::take(&mut self.pending).minimized();
        if !edit.is_empty() {
            self.actions.push(Action::Text {
                backspaces: edit.backspaces,
                text: edit.text,
            });
        }
    }

    fn finish(mut self) -> Vec<Action> {
        self.flush();
        self.actions
    }
}

/// History entry under construction.
#[derive(Debug)]
struct EntryBuilder {
    translation: Translation,
    actions: Vec<ParsedAction>,
    before: Formatting,
    edit: EditBuffer,
    history_only: bool,
}

impl EntryBuilder {
    fn new(translation: Translation, actions: Vec<ParsedAction>, before: Formatting) -> Self {
        Self {
            translation,
            actions,
            before,
            edit: EditBuffer::default(),
            history_only: false,
        }
    }

    fn take(&mut self, after: Formatting) -> HistoryTranslation {
        let edit = std::mem::take(&mut self.edit);
        HistoryTranslation {
            translation: self.translation.clone(),
            actions: self.actions.clone(),
            text: FormattedText::new(edit.backspaces, edit.text, after.clone()),
            deleted: edit.erased,
            before: std::mem::replace(&mut self.before, after),
        }
    }
}

// ---------------------------------------------------------------------------
// Command context
// ---------------------------------------------------------------------------

/// Everything a command may touch while a translation is being applied.
pub struct CommandContext<'a> {
    system: &'a System,
    state: &'a mut State,
    out: &'a mut Output,
    entry: &'a mut EntryBuilder,
}

impl CommandContext<'_> {
    pub fn system(&self) -> &System {
        self.system
    }

    /// Formatting left by the output so far.
    pub fn formatting(&self) -> &Formatting {
        &self.state.context.formatting
    }

    /// Recent output text.
    pub fn context_text(&self) -> &str {
        &self.state.context.text
    }

    /// Make an edit that belongs to the current translation.
    pub fn type_text(&mut self, backspaces: usize, text: &str, formatting: Formatting) {
        let erased = self.rewrite(backspaces, text, formatting);
        self.entry.edit.push(backspaces, &erased, text);
    }

    /// Replace the formatting state without changing text.
    pub fn set_formatting(&mut self, formatting: Formatting) {
        self.type_text(0, "", formatting);
    }

    /// Join a text fragment to the context.
    pub fn apply_fragment(&mut self, fragment: &UnformattedText) {
        let formatted = fragment.format(&self.state.context, self.system.orthography());
        self.type_text(formatted.backspaces, &formatted.text, formatted.formatting);
    }

    /// Apply `transform` to the last word already typed.
    pub fn retro_transform(&mut self, transform: Transform) {
        let word = last_word(&self.state.context.text).to_string();
        if word.is_empty() {
            return;
        }
        let replaced = transform.apply(&word);
        if replaced != word {
            let formatting = self.state.context.formatting.clone();
            self.type_text(word.chars().count(), &replaced, formatting);
        }
    }

    /// Run one parsed action.
    pub fn run(&mut self, action: &ParsedAction) {
        match action {
            ParsedAction::Text(fragment) => self.apply_fragment(fragment),
            ParsedAction::KeyCombos(combos) => {
                for combo in combos {
                    self.out.push(Action::KeyCombo(combo.clone()));
                }
            }
            ParsedAction::Command { name, arg } => self.run_command(name, arg.as_deref()),
        }
    }

    /// Look up and run a command; failures are logged.
    pub fn run_command(&mut self, name: &str, arg: Option<&str>) {
        match self.system.command(name) {
            Some(Command::Host) => self.out.push(Action::Host {
                name: name.to_string(),
                arg: arg.map(str::to_string),
            }),
            Some(Command::Builtin { run, history_only }) => {
                if history_only {
                    self.seal();
                }
                if let Err(err) = run(self, arg) {
                    tracing::warn!(command = %name, error = %err, "command failed");
                }
            }
            None => tracing::warn!(command = %name, "unknown command"),
        }
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Undo `count` translations that changed text. Entries that only
    /// changed formatting are undone along the way for free. When the
    /// history runs out, each missing undo becomes a backspace key press.
    pub fn undo(&mut self, count: usize) {
        let mut remaining = count;
        while remaining > 0 {
            let Some(entry) = self.state.history.pop() else {
                break;
            };
            self.undo_entry(&entry);
            if entry.is_undoable() {
                remaining -= 1;
            }
            self.state.redo.push(entry);
        }
        if remaining > 0 {
            tracing::debug!(remaining, "undo past the start of history, sending backspaces");
            for _ in 0..remaining {
                pop_chars(&mut self.state.context.text, 1);
                self.out.push(Action::KeyCombo(KeyCombo::backspace()));
            }
        }
    }

    /// Re-apply the most recently undone translation. Returns false when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.state.redo.pop() else {
            return false;
        };
        self.redo_entry(&entry);
        while self.state.redo.last().is_some_and(|next| !next.is_undoable()) {
            if let Some(next) = self.state.redo.pop() {
                self.redo_entry(&next);
            }
        }
        true
    }

    /// Forget history and start a fresh context.
    pub fn reset(&mut self) {
        self.state.reset(self.system);
        self.entry.before = self.state.context.formatting.clone();
    }

    /// Revert the most recent `count` history entries without re-applying
    /// what they replaced.
    pub(crate) fn drop_replaced(&mut self, count: usize) {
        for _ in 0..count {
            match self.state.history.pop() {
                Some(entry) => self.revert_text(&entry),
                None => break,
            }
        }
    }

    fn undo_entry(&mut self, entry: &HistoryTranslation) {
        self.revert_text(entry);
        for replaced in &entry.translation.replaces {
            self.reapply(replaced);
        }
    }

    fn redo_entry(&mut self, entry: &Rc<HistoryTranslation>) {
        self.drop_replaced(entry.translation.replaces.len());
        self.reapply(entry);
    }

    fn revert_text(&mut self, entry: &HistoryTranslation) {
        let typed = entry.text.text.chars().count();
        self.rewrite(typed, &entry.deleted, entry.before.clone());
    }

    fn reapply(&mut self, entry: &Rc<HistoryTranslation>) {
        self.rewrite(entry.text.backspaces, &entry.text.text, entry.text.formatting.clone());
        self.state.history.push(Rc::clone(entry));
    }

    /// Edit the context and the output without recording it in the entry.
    fn rewrite(&mut self, backspaces: usize, text: &str, formatting: Formatting) -> String {
        let erased = self.state.edit(backspaces, text, formatting);
        self.out.edit(backspaces, &erased, text);
        erased
    }

    // -----------------------------------------------------------------------
    // Entries
    // -----------------------------------------------------------------------

    /// Commit what the translation has typed so far and stop it from
    /// becoming a history entry unless it types more.
    fn seal(&mut self) {
        if !self.entry.edit.is_empty() {
            self.push_entry();
        }
        self.entry.history_only = true;
        self.entry.before = self.state.context.formatting.clone();
    }

    fn finish_entry(&mut self) {
        if self.entry.history_only && self.entry.edit.is_empty() {
            return;
        }
        self.push_entry();
    }

    fn push_entry(&mut self) {
        let entry = self.entry.take(self.state.context.formatting.clone());
        if let Some(evicted) = self.state.history.push(Rc::new(entry)) {
            tracing::trace!(raw = %evicted.translation.raw, "history entry evicted");
        }
        self.state.redo.clear();
    }
}

// ---------------------------------------------------------------------------
// Translator
// ---------------------------------------------------------------------------

/// Turns strokes into host actions.
pub struct Translator {
    system: Arc<System>,
    dictionary: Arc<dyn Dictionary>,
    processor: TranslationProcessor,
    state: State,
}

impl Translator {
    pub fn new(system: Arc<System>, dictionary: Arc<dyn Dictionary>) -> Self {
        Self {
            processor: TranslationProcessor::new(Arc::clone(&system)),
            state: State::new(&system),
            system,
            dictionary,
        }
    }

    pub fn system(&self) -> &Arc<System> {
        &self.system
    }

    /// Switch to another system. The context is flushed.
    pub fn set_system(&mut self, system: Arc<System>) {
        self.processor = TranslationProcessor::new(Arc::clone(&system));
        self.system = system;
        self.flush();
    }

    pub fn dictionary(&self) -> &Arc<dyn Dictionary> {
        &self.dictionary
    }

    /// Switch dictionaries. History stays, so later strokes may still
    /// extend earlier ones.
    pub fn set_dictionary(&mut self, dictionary: Arc<dyn Dictionary>) {
        self.dictionary = dictionary;
    }

    pub fn history(&self) -> &History {
        &self.state.history
    }

    /// Recent output and the formatting it left behind.
    pub fn context(&self) -> &FormattedText {
        &self.state.context
    }

    /// The translation `stroke` would produce, without committing it.
    pub fn lookup(&self, stroke: &Stroke) -> Translation {
        translation::lookup(stroke, &self.state.history, &*self.dictionary, &self.processor)
    }

    /// Translate one stroke.
    pub fn apply(&mut self, stroke: &Stroke) -> Vec<Action> {
        let translation = self.lookup(stroke);
        tracing::trace!(stroke = %stroke, raw = %translation.raw, full = translation.full_match, "translated");
        self.commit(translation)
    }

    /// Commit a translation: revert what it replaces, then run its actions.
    /// A translation that does not parse is logged and ignored.
    pub fn commit(&mut self, translation: Translation) -> Vec<Action> {
        let part = match self.processor.process(&translation) {
            Ok(part) => part,
            Err(err) => {
                tracing::warn!(raw = %translation.raw, error = %err, "invalid translation, ignoring it");
                return Vec::new();
            }
        };
        let replaced = part.replaces.len();
        let before = self.state.context.formatting.clone();
        let entry = EntryBuilder::new(translation, part.actions, before);
        self.session(entry, |ctx| {
            ctx.drop_replaced(replaced);
            ctx.entry.before = ctx.state.context.formatting.clone();
            let actions = ctx.entry.actions.clone();
            for action in &actions {
                ctx.run(action);
            }
        })
    }

    /// Undo `count` translations.
    pub fn undo(&mut self, count: usize) -> Vec<Action> {
        self.history_session(|ctx| ctx.undo(count))
    }

    /// Redo the most recently undone translation.
    pub fn redo(&mut self) -> Vec<Action> {
        self.history_session(|ctx| {
            ctx.redo();
        })
    }

    /// End the current context: history, redo and formatting start over.
    pub fn flush(&mut self) {
        self.state.reset(&self.system);
    }

    fn history_session(&mut self, f: impl FnOnce(&mut CommandContext<'_>)) -> Vec<Action> {
        let before = self.state.context.formatting.clone();
        let mut entry = EntryBuilder::new(Translation::default(), Vec::new(), before);
        entry.history_only = true;
        self.session(entry, f)
    }

    fn session(&mut self, mut entry: EntryBuilder, f: impl FnOnce(&mut CommandContext<'_>)) -> Vec<Action> {
        let mut out = Output::default();
        let mut ctx = CommandContext {
            system: &self.system,
            state: &mut self.state,
            out: &mut out,
            entry: &mut entry,
        };
        f(&mut ctx);
        ctx.finish_entry();
        out.finish()
    }
}
