// steno-translate: Translate strokes from stdin into text.
//
// Reads strokes from stdin, separated by whitespace or `/`, and runs them
// through a translator. By default the final text is printed once input
// ends; with --actions every host action is printed as it is produced:
//   T: <backspaces> <text>    (erase, then type)
//   K: <key combo>
//   H: <command> [<arg>]
//
// Usage:
//   steno-translate [-s SYSTEM] [-d DICTIONARY]... [OPTIONS]
//
// Options:
//   -s, --system PATH       System file (default: English layout)
//   -d, --dictionary PATH   Extra dictionary, above the system's ones
//   -a, --actions           Print actions instead of the final text
//   -h, --help              Print help

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use steno_core::Stroke;
use steno_core::keys::KeyCombo;
use steno_engine::{Action, Dictionary, MultiDictionary, Translator};

fn main() {
    steno_cli::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (system_path, args) = steno_cli::parse_single(&args, "--system", "-s");
    let (extra, args) = steno_cli::parse_option(&args, "--dictionary", "-d");

    if steno_cli::wants_help(&args) {
        println!("steno-translate: Translate strokes from stdin into text.");
        println!();
        println!("Usage: steno-translate [-s SYSTEM] [-d DICTIONARY]... [OPTIONS]");
        println!();
        println!("Reads strokes separated by whitespace or '/'. Prints the final text,");
        println!("or with --actions one line per action:");
        println!("  T: <backspaces> <text>");
        println!("  K: <key combo>");
        println!("  H: <command> [<arg>]");
        println!();
        println!("Options:");
        println!("  -s, --system PATH       System file (default: English layout)");
        println!("  -d, --dictionary PATH   Extra dictionary, above the system's ones");
        println!("  -a, --actions           Print actions instead of the final text");
        println!("  -h, --help              Print this help");
        return;
    }
    let print_actions = steno_cli::has_flag(&args, "--actions", "-a");

    let mut loader = steno_cli::loader();
    let system = steno_cli::load_system(&mut loader, system_path.as_deref()).unwrap_or_else(|e| steno_cli::fatal(&e));

    let mut members: Vec<Arc<dyn Dictionary>> = Vec::new();
    for path in &extra {
        let dictionary = loader
            .try_load_dictionary(path, system.layout())
            .unwrap_or_else(|e| steno_cli::fatal(&e.to_string()));
        members.push(dictionary);
    }
    members.extend(loader.build_dictionary(&system).members().iter().cloned());
    let dictionary = Arc::new(MultiDictionary::from_members(members));

    let layout = Arc::clone(system.layout());
    let mut translator = Translator::new(system, dictionary);
    let mut text = String::new();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error reading stdin: {e}");
                break;
            }
        };
        for token in line.split(|c: char| c.is_whitespace() || c == '/') {
            if token.is_empty() {
                continue;
            }
            let Some(stroke) = Stroke::parse(&layout, token) else {
                eprintln!("warning: invalid stroke {token:?}");
                continue;
            };
            for action in translator.apply(&stroke) {
                if print_actions {
                    let _ = writeln!(out, "{}", describe(&action));
                }
                replay(&mut text, &action);
            }
        }
    }

    if !print_actions {
        let _ = writeln!(out, "{text}");
    }
}

fn describe(action: &Action) -> String {
    match action {
        Action::Text { backspaces, text } => format!("T: {backspaces} {text}"),
        Action::KeyCombo(combo) => format!("K: {combo}"),
        Action::Host { name, arg: Some(arg) } => format!("H: {name} {arg}"),
        Action::Host { name, arg: None } => format!("H: {name}"),
    }
}

/// Apply an action to `text`. Backspaces past the start are ignored.
fn replay(text: &mut String, action: &Action) {
    match action {
        Action::Text { backspaces, text: typed } => {
            for _ in 0..*backspaces {
                text.pop();
            }
            text.push_str(typed);
        }
        Action::KeyCombo(combo) if *combo == KeyCombo::backspace() => {
            text.pop();
        }
        Action::KeyCombo(_) | Action::Host { .. } => {}
    }
}
