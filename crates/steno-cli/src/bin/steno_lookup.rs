// steno-lookup: Look up strokes or translations in a dictionary.
//
// Reads queries from stdin (one per line). By default each query is a
// stroke sequence and the translation is printed; with --reverse each
// query is a translation and every stroke sequence producing it is
// printed.
//   <strokes>: <translation>
//   <strokes>: (none)
//
// Usage:
//   steno-lookup -d DICTIONARY [-s SYSTEM] [OPTIONS]
//
// Options:
//   -d, --dictionary PATH   Dictionary to search (required)
//   -s, --system PATH       System file providing the layout
//   -r, --reverse           Look up translations instead of strokes
//   -h, --help              Print help

use std::io::{self, BufRead, Write};

use steno_core::stroke::{parse_sequence, rtfcre_sequence};
use steno_engine::Dictionary;
use steno_engine::dictionary::ReverseLookup;

fn main() {
    steno_cli::init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (system_path, args) = steno_cli::parse_single(&args, "--system", "-s");
    let (dictionary_path, args) = steno_cli::parse_single(&args, "--dictionary", "-d");

    if steno_cli::wants_help(&args) {
        println!("steno-lookup: Look up strokes or translations in a dictionary.");
        println!();
        println!("Usage: steno-lookup -d DICTIONARY [-s SYSTEM] [OPTIONS]");
        println!();
        println!("Reads queries from stdin (one per line). Prints:");
        println!("  <strokes>: <translation>");
        println!();
        println!("Options:");
        println!("  -d, --dictionary PATH   Dictionary to search (required)");
        println!("  -s, --system PATH       System file providing the layout");
        println!("  -r, --reverse           Look up translations instead of strokes");
        println!("  -h, --help              Print this help");
        return;
    }
    let reverse = steno_cli::has_flag(&args, "--reverse", "-r");
    let Some(dictionary_path) = dictionary_path else {
        steno_cli::fatal("--dictionary is required");
    };

    let mut loader = steno_cli::loader();
    let system = steno_cli::load_system(&mut loader, system_path.as_deref()).unwrap_or_else(|e| steno_cli::fatal(&e));
    let dictionary = loader
        .try_load_dictionary(&dictionary_path, system.layout())
        .unwrap_or_else(|e| steno_cli::fatal(&e.to_string()));

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
        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        if reverse {
            let found = dictionary.reverse_get(query);
            if found.is_empty() {
                let _ = writeln!(out, "(none): {query}");
            }
            for strokes in found {
                let _ = writeln!(out, "{}: {query}", rtfcre_sequence(&strokes));
            }
        } else {
            match parse_sequence(system.layout(), query) {
                Some(strokes) => match dictionary.get(&strokes) {
                    Some(translation) => {
                        let _ = writeln!(out, "{}: {translation}", rtfcre_sequence(&strokes));
                    }
                    None => {
                        let _ = writeln!(out, "{}: (none)", rtfcre_sequence(&strokes));
                    }
                },
                None => eprintln!("warning: invalid strokes {query:?}"),
            }
        }
    }
}
