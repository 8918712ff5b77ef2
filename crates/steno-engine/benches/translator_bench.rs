// Criterion benchmarks for steno-engine.
//
// Builds a synthetic dictionary in memory, so no data files are needed.
//
// Run:
//   cargo bench -p steno-engine

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use steno_core::{KeyLayout, Stroke};
use steno_engine::dictionary::MutableDictionary;
use steno_engine::orthography::{Orthography, SimpleOrthography};
use steno_engine::{StandardDictionary, System, TranslationProcessor, Translator};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const LEFT: &[&str] = &["S", "T", "K", "P", "W", "H", "R", "TK", "PW", "HR", "KW", "TP"];
const VOWELS: &[&str] = &["A", "O", "E", "U", "AO", "EU", "AE", "OE"];
const RIGHT: &[&str] = &["", "F", "R", "P", "B", "L", "G", "T", "S", "D", "Z", "PB", "LG"];

/// Every left/vowel/right combination as a one-stroke word, plus two-stroke
/// entries pairing neighbours.
fn strokes(layout: &Arc<KeyLayout>) -> Vec<Stroke> {
    let mut out = Vec::new();
    for left in LEFT {
        for vowel in VOWELS {
            for right in RIGHT {
                if let Some(stroke) = Stroke::parse(layout, &format!("{left}{vowel}{right}")) {
                    out.push(stroke);
                }
            }
        }
    }
    out
}

fn dictionary(layout: &Arc<KeyLayout>, strokes: &[Stroke]) -> StandardDictionary {
    let mut dictionary = StandardDictionary::new(Arc::clone(layout));
    for (i, stroke) in strokes.iter().enumerate() {
        dictionary.set(std::slice::from_ref(stroke), format!("word{i}"));
    }
    for (i, pair) in strokes.windows(2).enumerate().step_by(7) {
        dictionary.set(pair, format!("pair{i}"));
    }
    dictionary
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Translate a long run of strokes, including multi-stroke matches.
fn bench_translate(c: &mut Criterion) {
    let layout = Arc::new(KeyLayout::english());
    let strokes = strokes(&layout);
    let dictionary = Arc::new(dictionary(&layout, &strokes));
    let system = Arc::new(System::new(Arc::clone(&layout)).with_orthography(Arc::new(SimpleOrthography::english())));

    c.bench_function("translate_strokes", |b| {
        b.iter(|| {
            let mut translator = Translator::new(Arc::clone(&system), dictionary.clone());
            for stroke in &strokes {
                black_box(translator.apply(stroke));
            }
        });
    });
}

/// Undo and redo a full history.
fn bench_undo_redo(c: &mut Criterion) {
    let layout = Arc::new(KeyLayout::english());
    let strokes = strokes(&layout);
    let dictionary = Arc::new(dictionary(&layout, &strokes));
    let system = Arc::new(System::new(Arc::clone(&layout)));
    let mut translator = Translator::new(system, dictionary);
    for stroke in strokes.iter().take(100) {
        translator.apply(stroke);
    }

    c.bench_function("undo_redo_100", |b| {
        b.iter(|| {
            black_box(translator.undo(100));
            for _ in 0..100 {
                black_box(translator.redo());
            }
        });
    });
}

/// Parse translation strings of mixed complexity.
fn bench_parse(c: &mut Criterion) {
    let system = Arc::new(System::new(Arc::new(KeyLayout::english())).with_alias("cap", "{-|}"));
    let processor = TranslationProcessor::new(system);
    let inputs = [
        "plain words only",
        "{^ing}",
        "{.}",
        "{cap}hello {^} world {#control(alt(Delete)) Return}",
        "{retro:transform:upper}{mode:set_space:_}",
    ];

    c.bench_function("parse_translations", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(processor.parse(input).ok());
            }
        });
    });
}

/// Orthography lookups against the built-in English rules.
fn bench_orthography(c: &mut Criterion) {
    let orthography = SimpleOrthography::english();
    let cases = [
        ("deny", "s"),
        ("brush", "s"),
        ("narrate", "ing"),
        ("walk", "ed"),
        ("happy", "ness"),
        ("simple", "ly"),
    ];

    c.bench_function("orthography_indexed", |b| {
        b.iter(|| {
            for (left, right) in &cases {
                black_box(orthography.apply(left, right));
            }
        });
    });
    c.bench_function("orthography_linear", |b| {
        b.iter(|| {
            for (left, right) in &cases {
                black_box(orthography.apply_linear(left, right));
            }
        });
    });
}

criterion_group!(benches, bench_translate, bench_undo_redo, bench_parse, bench_orthography);
criterion_main!(benches);
