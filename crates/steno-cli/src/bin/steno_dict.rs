// steno-dict: Inspect and edit JSON steno dictionaries.
//
// Commands:
//   normalize IN [OUT]              Rewrite with normalized, sorted keys
//   stats IN                        Print entry count and longest key
//   set IN STROKES TRANSLATION      Add or replace an entry, save in place
//   remove IN STROKES               Remove an entry, save in place
//
// Without OUT, normalize writes to stdout.
//
// Usage:
//   steno-dict [-s SYSTEM] COMMAND ARGS...
//
// Options:
//   -s, --system PATH   System file providing the layout
//   -h, --help          Print help

use std::io::{self, Write};
use std::sync::PoisonError;

use steno_core::stroke::parse_sequence;
use steno_engine::Dictionary;
use steno_engine::dictionary::MutableDictionary;

fn print_help() {
    println!("steno-dict: Inspect and edit JSON steno dictionaries.");
    println!();
    println!("Usage: steno-dict [-s SYSTEM] COMMAND ARGS...");
    println!();
    println!("Commands:");
    println!("  normalize IN [OUT]           Rewrite with normalized, sorted keys");
    println!("  stats IN                     Print entry count and longest key");
    println!("  set IN STROKES TRANSLATION   Add or replace an entry, save in place");
    println!("  remove IN STROKES            Remove an entry, save in place");
    println!();
    println!("Options:");
    println!("  -s, --system PATH   System file providing the layout");
    println!("  -h, --help          Print this help");
}

fn main() {
    steno_cli::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (system_path, args) = steno_cli::parse_single(&args, "--system", "-s");

    if steno_cli::wants_help(&args) || args.is_empty() {
        print_help();
        return;
    }

    let mut loader = steno_cli::loader();
    let system = steno_cli::load_system(&mut loader, system_path.as_deref()).unwrap_or_else(|e| steno_cli::fatal(&e));
    let command = args[0].as_str();
    let Some(path) = args.get(1) else {
        steno_cli::fatal(&format!("{command}: missing dictionary path"));
    };
    let shared = loader
        .try_load_dictionary(path, system.layout())
        .unwrap_or_else(|e| steno_cli::fatal(&e.to_string()));
    let mut dictionary = shared.write().unwrap_or_else(PoisonError::into_inner);

    let strokes = |index: usize| {
        let Some(text) = args.get(index) else {
            steno_cli::fatal(&format!("{command}: missing strokes"));
        };
        parse_sequence(system.layout(), text).unwrap_or_else(|| steno_cli::fatal(&format!("invalid strokes {text:?}")))
    };

    match command {
        "normalize" => match args.get(2) {
            Some(out_path) => loader
                .save_dictionary(out_path, &*dictionary)
                .unwrap_or_else(|e| steno_cli::fatal(&e.to_string())),
            None => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                dictionary
                    .save(&mut out)
                    .unwrap_or_else(|e| steno_cli::fatal(&e.to_string()));
            }
        },
        "stats" => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let _ = writeln!(out, "entries: {}", dictionary.len());
            let _ = writeln!(out, "longest key: {}", dictionary.longest_key());
        }
        "set" => {
            let strokes = strokes(2);
            let Some(translation) = args.get(3) else {
                steno_cli::fatal("set: missing translation");
            };
            if let Some(old) = dictionary.set(&strokes, translation.clone()) {
                eprintln!("replaced {old:?}");
            }
            loader
                .save_dictionary(path, &*dictionary)
                .unwrap_or_else(|e| steno_cli::fatal(&e.to_string()));
        }
        "remove" => {
            let strokes = strokes(2);
            if dictionary.remove(&strokes).is_none() {
                steno_cli::fatal("remove: no such entry");
            }
            loader
                .save_dictionary(path, &*dictionary)
                .unwrap_or_else(|e| steno_cli::fatal(&e.to_string()));
        }
        other => steno_cli::fatal(&format!("unknown command {other:?}")),
    }
}
