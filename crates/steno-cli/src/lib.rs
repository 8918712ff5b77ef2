// steno-cli: shared utilities for CLI tools.

use std::process;
use std::sync::Arc;

use steno_core::KeyLayout;
use steno_engine::Loader;
use steno_engine::System;
use steno_engine::resource::Resources;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `STENO_LOG=debug`.
const LOG_ENV: &str = "STENO_LOG";

/// Install the stderr log subscriber. Warnings and errors are shown unless
/// `STENO_LOG` says otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A loader reading plain files.
pub fn loader() -> Loader {
    Loader::new(Resources::default())
}

/// Load the system at `path`, or the built-in English system with no
/// dictionaries when no path is given.
pub fn load_system(loader: &mut Loader, path: Option<&str>) -> Result<Arc<System>, String> {
    match path {
        Some(path) => loader
            .try_load_system(path)
            .map_err(|e| format!("failed to load system: {e}")),
        None => Ok(Arc::new(System::new(Arc::new(KeyLayout::english())).with_name("English"))),
    }
}

/// Parse `--NAME=VALUE`, `--NAME VALUE` or `-S VALUE` options, collecting
/// every occurrence.
///
/// Returns `(values, remaining_args)`.
pub fn parse_option(args: &[String], long: &str, short: &str) -> (Vec<String>, Vec<String>) {
    let mut values = Vec::new();
    let mut remaining = Vec::new();
    let prefix = format!("{long}=");
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if let Some(val) = arg.strip_prefix(&prefix) {
            values.push(val.to_string());
        } else if arg == long || arg == short {
            match iter.next() {
                Some(val) => values.push(val.clone()),
                None => fatal(&format!("{arg} requires a value")),
            }
        } else {
            remaining.push(arg.clone());
        }
    }

    (values, remaining)
}

/// Like [`parse_option`], keeping only the last occurrence.
pub fn parse_single(args: &[String], long: &str, short: &str) -> (Option<String>, Vec<String>) {
    let (mut values, remaining) = parse_option(args, long, short);
    (values.pop(), remaining)
}

/// Print an error message and exit with code 1.
pub fn fatal(msg: &str) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

/// Check if `--help` or `-h` is in the args.
pub fn wants_help(args: &[String]) -> bool {
    args.iter().any(|a| a == "--help" || a == "-h")
}

/// Check if `flag` is in the args.
pub fn has_flag(args: &[String], long: &str, short: &str) -> bool {
    args.iter().any(|a| a == long || (!short.is_empty() && a == short))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn options_in_every_form() {
        let (values, rest) = parse_option(
            &args(&["-d", "a.json", "x", "--dictionary=b.json", "--dictionary", "c.json"]),
            "--dictionary",
            "-d",
        );
        assert_eq!(values, ["a.json", "b.json", "c.json"]);
        assert_eq!(rest, ["x"]);
    }

    #[test]
    fn single_option_keeps_last() {
        let (value, rest) = parse_single(&args(&["-s", "a", "-s", "b", "-v"]), "--system", "-s");
        assert_eq!(value.as_deref(), Some("b"));
        assert_eq!(rest, ["-v"]);
    }

    #[test]
    fn flags() {
        let list = args(&["--actions", "-h"]);
        assert!(wants_help(&list));
        assert!(has_flag(&list, "--actions", "-a"));
        assert!(!has_flag(&list, "--raw", ""));
    }

    #[test]
    fn default_system_is_english() {
        let mut loader = loader();
        let system = load_system(&mut loader, None).unwrap();
        assert_eq!(system.name(), "English");
        assert_eq!(system.layout().len(), 23);
    }
}
