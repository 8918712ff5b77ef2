//! End-to-end translator scenarios.
//!
//! Each scenario feeds strokes to a `Translator` and replays the resulting
//! actions against an in-memory text buffer, checking both the visible text
//! and the individual edits.
//!
//! Run: cargo test -p steno-engine --test scenarios

use std::sync::Arc;

use steno_core::keys::{KeyCombo, Modifiers};
use steno_core::{KeyLayout, Stroke};
use steno_engine::dictionary::NumbersDictionary;
use steno_engine::orthography::{OrthographyRule, SimpleOrthography};
use steno_engine::translation::HISTORY_CAPACITY;
use steno_engine::{Action, Dictionary, MultiDictionary, StandardDictionary, System, Translator};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Text buffer the actions are replayed into.
#[derive(Default)]
struct Editor {
    text: String,
    keys: Vec<KeyCombo>,
    host: Vec<(String, Option<String>)>,
}

impl Editor {
    fn replay(&mut self, actions: &[Action]) {
        for action in actions {
            match action {
                Action::Text { backspaces, text } => {
                    for _ in 0..*backspaces {
                        assert!(self.text.pop().is_some(), "backspace past the start of the buffer");
                    }
                    self.text.push_str(text);
                }
                Action::KeyCombo(combo) => {
                    if *combo == KeyCombo::backspace() {
                        self.text.pop();
                    }
                    self.keys.push(combo.clone());
                }
                Action::Host { name, arg } => self.host.push((name.clone(), arg.clone())),
            }
        }
    }
}

struct Session {
    layout: Arc<KeyLayout>,
    translator: Translator,
    editor: Editor,
}

impl Session {
    fn new(json: &str, configure: impl FnOnce(System) -> System) -> Self {
        let layout = Arc::new(KeyLayout::english());
        let dictionary = StandardDictionary::load(Arc::clone(&layout), json.as_bytes()).unwrap();
        Self::with_dictionary(layout.clone(), Arc::new(dictionary), configure)
    }

    fn with_dictionary(
        layout: Arc<KeyLayout>,
        dictionary: Arc<dyn Dictionary>,
        configure: impl FnOnce(System) -> System,
    ) -> Self {
        let system = configure(System::new(Arc::clone(&layout)));
        Self {
            layout,
            translator: Translator::new(Arc::new(system), dictionary),
            editor: Editor::default(),
        }
    }

    fn stroke(&mut self, stroke: &str) -> Vec<Action> {
        let stroke = Stroke::parse(&self.layout, stroke).unwrap();
        let actions = self.translator.apply(&stroke);
        self.editor.replay(&actions);
        actions
    }

    fn strokes(&mut self, strokes: &str) {
        for stroke in strokes.split_whitespace() {
            self.stroke(stroke);
        }
    }

    fn undo(&mut self, count: usize) -> Vec<Action> {
        let actions = self.translator.undo(count);
        self.editor.replay(&actions);
        actions
    }

    fn redo(&mut self) -> Vec<Action> {
        let actions = self.translator.redo();
        self.editor.replay(&actions);
        actions
    }

    fn text(&self) -> &str {
        &self.editor.text
    }
}

fn text(backspaces: usize, text: &str) -> Action {
    Action::Text {
        backspaces,
        text: text.to_string(),
    }
}

fn plain(system: System) -> System {
    system
}

fn english(system: System) -> System {
    system.with_orthography(Arc::new(SimpleOrthography::english()))
}

// ---------------------------------------------------------------------------
// Incremental output
// ---------------------------------------------------------------------------

#[test]
fn hello_with_suffix() {
    // Not an English rule: a made-up "o" + "ed" rule to exercise the splice.
    let mut session = Session::new(r#"{"HEL": "hell", "HEL/HROE": "hello", "-D": "{^ed}"}"#, |system| {
        system.with_orthography(Arc::new(SimpleOrthography::new(vec![OrthographyRule::new(
            "o", "ed", "od",
        )])))
    });
    assert_eq!(session.stroke("HEL"), [text(0, "hell")]);
    assert_eq!(session.stroke("HROE"), [text(0, "o")]);
    // The rule erases "o" and types "od"; the shared "o" cancels out.
    assert_eq!(session.stroke("-D"), [text(0, "d")]);
    assert_eq!(session.text(), "hellod");
}

#[test]
fn broken_entries_never_win_the_longest_match() {
    let mut session = Session::new(r#"{"KAT": "cat", "TKOG": "dog", "KAT/TKOG": "oops {"}"#, plain);
    session.strokes("KAT TKOG");
    assert_eq!(session.text(), "cat dog");
    assert_eq!(session.translator.history().len(), 2);
}

#[test]
fn actions_are_minimal_edits() {
    let mut session = Session::new(
        r#"{"PWAOBG": "book", "PWAOBG/KAEUS": "bookcase", "KAEUS": "case"}"#,
        plain,
    );
    session.stroke("PWAOBG");
    assert_eq!(session.stroke("KAEUS"), [text(0, "case")]);
    assert_eq!(session.text(), "bookcase");
    assert_eq!(session.translator.history().len(), 1);
}

#[test]
fn untranslated_strokes_are_typed_as_steno() {
    let mut session = Session::new(r#"{"KAT": "cat"}"#, plain);
    session.strokes("KAT TKPW-Z");
    assert_eq!(session.text(), "cat TKPW-Z");
}

#[test]
fn punctuation_and_capitalization() {
    let mut session = Session::new(
        r#"{"KAT": "cat", "TKOG": "dog", "TP-PL": "{.}", "KW-BG": "{,}", "KPA": "{-|}", "HRAOUR": "{<}"}"#,
        english,
    );
    session.strokes("KAT KW-BG TKOG TP-PL KAT KPA TKOG HRAOUR KAT");
    assert_eq!(session.text(), "cat, dog. Cat Dog CAT");
}

#[test]
fn carried_transform_passes_through_quotes() {
    let mut session = Session::new(r#"{"KAT": "cat", "KPA": "{-|}", "KW-T": "{~|\"^}"}"#, plain);
    session.strokes("KPA KW-T KAT");
    assert_eq!(session.text(), "\"Cat");
}

#[test]
fn glue_joins_only_glued_fragments() {
    let mut session = Session::new(
        r#"{"A*": "{&a}", "PW*": "{&b}", "KAT": "cat"}"#,
        plain,
    );
    session.strokes("KAT A* PW* KAT");
    assert_eq!(session.text(), "cat ab cat");
}

#[test]
fn custom_separator() {
    let mut session = Session::new(
        r#"{"KAT": "cat", "TKOG": "hot dog", "S-P": "{mode:set_space:_}", "R-S": "{mode:reset_space}"}"#,
        plain,
    );
    session.strokes("S-P KAT TKOG R-S KAT");
    assert_eq!(session.text(), "cat_hot_dog cat");
}

#[test]
fn retro_transform_changes_last_word() {
    let mut session = Session::new(r#"{"KAT": "cat", "KA*PD": "{*-|}", "*UP": "{retro:transform:upper}"}"#, plain);
    session.strokes("KAT KAT KA*PD");
    assert_eq!(session.text(), "cat Cat");
    session.stroke("*UP");
    assert_eq!(session.text(), "cat CAT");
    session.undo(1);
    assert_eq!(session.text(), "cat Cat");
}

#[test]
fn orthography_needs_an_attach_token() {
    let mut session = Session::new(
        r#"{"TKEUPB": "deny", "-Z": "{^s}", "SKWR": "{^^}"}"#,
        english,
    );
    session.strokes("TKEUPB -Z");
    assert_eq!(session.text(), "denies");
    // {^^} attaches but keeps the next suffix from respelling the word.
    session.strokes("TKEUPB SKWR -Z");
    assert_eq!(session.text(), "denies denys");
}

// ---------------------------------------------------------------------------
// Affix folding and numbers
// ---------------------------------------------------------------------------

#[test]
fn folded_suffix_uses_orthography() {
    let layout = Arc::new(KeyLayout::english());
    let json = r#"{"TKEUPB": "deny", "-Z": "{^s}", "KAT": "cat"}"#;
    let dictionary = StandardDictionary::load(Arc::clone(&layout), json.as_bytes()).unwrap();
    let z = Stroke::parse(&layout, "-Z").unwrap();
    let mut session = Session::with_dictionary(layout, Arc::new(dictionary), |system| {
        english(system).with_suffix_strokes(vec![z])
    });
    session.strokes("KAT TKEUPBZ");
    assert_eq!(session.text(), "cat denies");
}

#[test]
fn numbers_dictionary_in_a_stack() {
    let layout = Arc::new(KeyLayout::english());
    let json = r##"{"KAT": "cat", "#S": "hash-s"}"##;
    let standard: Arc<dyn Dictionary> = Arc::new(StandardDictionary::load(Arc::clone(&layout), json.as_bytes()).unwrap());
    let numbers: Arc<dyn Dictionary> = Arc::new(NumbersDictionary::new(&layout));

    let dictionary = MultiDictionary::from_members(vec![standard, numbers]);
    let mut session = Session::with_dictionary(layout, Arc::new(dictionary), plain);
    session.strokes("KAT #S #TH #-T #S");
    assert_eq!(session.text(), "cat hash-s 249 hash-s");
}

// ---------------------------------------------------------------------------
// Undo and redo
// ---------------------------------------------------------------------------

#[test]
fn undo_is_the_inverse_of_apply() {
    let json = r#"{"HEL": "hell", "HEL/HROE": "hello", "-D": "{^ed}", "KAT": "cat", "TP-PL": "{.}"}"#;
    let strokes = ["HEL", "HROE", "-D", "TP-PL", "KAT", "HEL"];
    let mut session = Session::new(json, english);
    let mut snapshots = vec![session.text().to_string()];
    for stroke in strokes {
        session.stroke(stroke);
        snapshots.push(session.text().to_string());
    }
    snapshots.pop();
    while let Some(expected) = snapshots.pop() {
        session.undo(1);
        assert_eq!(session.text(), expected);
        if session.translator.history().is_empty() {
            break;
        }
    }
    assert_eq!(session.text(), "");
}

#[test]
fn undo_restores_replaced_translations() {
    let mut session = Session::new(r#"{"HEL": "hell", "HEL/HROE": "hello"}"#, plain);
    session.strokes("HEL HROE");
    assert_eq!(session.text(), "hello");
    assert_eq!(session.undo(1), [text(1, "")]);
    assert_eq!(session.text(), "hell");
    assert_eq!(session.translator.history().len(), 1);
    assert_eq!(session.undo(1), [text(4, "")]);
    assert_eq!(session.text(), "");
}

#[test]
fn redo_after_undo() {
    let mut session = Session::new(r#"{"HEL": "hell", "HEL/HROE": "hello", "KAT": "cat"}"#, plain);
    session.strokes("KAT HEL HROE");
    session.undo(2);
    assert_eq!(session.text(), "cat");
    session.redo();
    assert_eq!(session.text(), "cat hell");
    session.redo();
    assert_eq!(session.text(), "cat hello");
    assert!(session.redo().is_empty());
    session.undo(1);
    assert_eq!(session.text(), "cat hell");
}

#[test]
fn undo_past_history_sends_backspaces() {
    let mut session = Session::new(r#"{"KAT": "cat"}"#, plain);
    for _ in 0..=HISTORY_CAPACITY {
        session.stroke("KAT");
    }
    assert_eq!(session.translator.history().len(), HISTORY_CAPACITY);
    let actions = session.undo(HISTORY_CAPACITY + 2);
    assert_eq!(
        actions,
        [
            text(4 * HISTORY_CAPACITY, ""),
            Action::KeyCombo(KeyCombo::backspace()),
            Action::KeyCombo(KeyCombo::backspace()),
        ]
    );
    assert!(session.translator.history().is_empty());
    assert_eq!(session.text(), "c");
}

#[test]
fn undo_stroke_with_count() {
    let mut session = Session::new(r#"{"KAT": "cat", "TKOG": "dog", "*": "{retro:undo}", "TWAO": "{retro:undo:2}"}"#, plain);
    session.strokes("KAT TKOG KAT TKOG");
    session.stroke("*");
    assert_eq!(session.text(), "cat dog cat");
    session.stroke("TWAO");
    assert_eq!(session.text(), "cat");
    session.stroke("KAT");
    assert_eq!(session.text(), "cat cat");
}

// ---------------------------------------------------------------------------
// Commands and key combos
// ---------------------------------------------------------------------------

#[test]
fn key_combos_and_host_commands() {
    let mut session = Session::new(
        r#"{"KAT": "cat", "KPEU": "{#control(c)}", "TKPWHRAOEUT": "{toggle_keyboard:on}"}"#,
        |system| system.with_host_command("toggle_keyboard"),
    );
    let actions = session.stroke("KPEU");
    assert_eq!(actions, [Action::KeyCombo(KeyCombo::new("c", Modifiers::CONTROL))]);
    session.stroke("KAT");
    let actions = session.stroke("TKPWHRAOEUT");
    assert_eq!(
        actions,
        [Action::Host {
            name: "toggle_keyboard".to_string(),
            arg: Some("on".to_string())
        }]
    );
    assert_eq!(session.editor.keys.len(), 1);
    assert_eq!(session.editor.host.len(), 1);
    assert_eq!(session.text(), "cat");
}

#[test]
fn reset_command_forgets_history() {
    let mut session = Session::new(r#"{"KAT": "cat", "KAT/KAT": "kitten", "R*ES": "{reset}"}"#, plain);
    session.strokes("KAT R*ES KAT");
    assert_eq!(session.text(), "catcat");
    assert_eq!(session.translator.history().len(), 1);
}

#[test]
fn broken_translation_is_typed_literally() {
    let mut session = Session::new(r#"{"PWROEBG": "broken {"}"#, plain);
    session.stroke("PWROEBG");
    assert_eq!(session.text(), "broken {");
}

#[test]
fn switching_systems_flushes() {
    let mut session = Session::new(r#"{"KAT": "cat", "KAT/KAT": "kitten"}"#, plain);
    session.stroke("KAT");
    let system = System::new(Arc::clone(&session.layout)).with_name("other");
    session.translator.set_system(Arc::new(system));
    session.stroke("KAT");
    assert_eq!(session.text(), "catcat");
    assert_eq!(session.translator.system().name(), "other");
}
