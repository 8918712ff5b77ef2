// System configuration files
//
// A system file is a JSON object whose fields are all optional. A `base`
// file is loaded first; every field present in the child replaces the base
// field as a whole. Relative paths are resolved against the directory of
// the file that mentions them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::formatting::Space;

/// One system file as written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SystemConfig {
    pub base: Option<String>,
    pub name: Option<String>,
    pub keys: Option<String>,
    /// `[start, end)` of the middle key group.
    pub break_keys: Option<(usize, usize)>,
    pub key_aliases: Option<BTreeMap<String, Vec<String>>>,
    pub orthography: Option<OrthographyConfig>,
    pub dictionaries: Option<Vec<DictionaryConfig>>,
    pub prefix_strokes: Option<Vec<String>>,
    pub suffix_strokes: Option<Vec<String>>,
    pub aliases: Option<BTreeMap<String, String>>,
    /// Names of commands passed through to the host.
    pub commands: Option<Vec<String>>,
    pub default_formatting: Option<FormattingConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrthographyConfig {
    #[serde(rename = "type", default = "default_orthography_kind")]
    pub kind: String,
    pub path: String,
}

fn default_orthography_kind() -> String {
    "simple".to_string()
}

/// A dictionary reference: a bare path or `{"path": ..., "enabled": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DictionaryConfig {
    Path(String),
    Entry {
        path: String,
        #[serde(default = "enabled_by_default")]
        enabled: bool,
    },
}

fn enabled_by_default() -> bool {
    true
}

impl DictionaryConfig {
    pub fn path(&self) -> &str {
        match self {
            DictionaryConfig::Path(path) | DictionaryConfig::Entry { path, .. } => path,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            DictionaryConfig::Path(_) => true,
            DictionaryConfig::Entry { enabled, .. } => *enabled,
        }
    }

    fn path_mut(&mut self) -> &mut String {
        match self {
            DictionaryConfig::Path(path) | DictionaryConfig::Entry { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingConfig {
    pub space: Option<String>,
    pub transform: Option<String>,
    pub space_start: Option<Space>,
    pub space_end: Option<Space>,
}

impl SystemConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Overlay `child` on this (base) configuration.
    pub fn merge(self, child: SystemConfig) -> SystemConfig {
        SystemConfig {
            base: child.base.or(self.base),
            name: child.name.or(self.name),
            keys: child.keys.or(self.keys),
            break_keys: child.break_keys.or(self.break_keys),
            key_aliases: child.key_aliases.or(self.key_aliases),
            orthography: child.orthography.or(self.orthography),
            dictionaries: child.dictionaries.or(self.dictionaries),
            prefix_strokes: child.prefix_strokes.or(self.prefix_strokes),
            suffix_strokes: child.suffix_strokes.or(self.suffix_strokes),
            aliases: child.aliases.or(self.aliases),
            commands: child.commands.or(self.commands),
            default_formatting: child.default_formatting.or(self.default_formatting),
        }
    }

    /// Resolve every path field against the file at `origin`.
    pub fn resolve_paths(mut self, origin: &str) -> SystemConfig {
        if let Some(base) = &mut self.base {
            *base = resolve_relative(origin, base);
        }
        if let Some(orthography) = &mut self.orthography {
            orthography.path = resolve_relative(origin, &orthography.path);
        }
        for dictionary in self.dictionaries.iter_mut().flatten() {
            let path = dictionary.path_mut();
            *path = resolve_relative(origin, path);
        }
        self
    }
}

/// Resolve `path` relative to the directory of `origin`. Paths with a
/// scheme prefix (`asset:`, `code_dictionary:`, ...) and absolute paths are
/// returned unchanged.
pub fn resolve_relative(origin: &str, path: &str) -> String {
    if path.starts_with('/') || has_scheme(path) {
        return path.to_string();
    }
    match origin.rfind('/') {
        Some(slash) => format!("{}{path}", &origin[..=slash]),
        None => match scheme_len(origin) {
            Some(len) => format!("{}{path}", &origin[..len]),
            None => path.to_string(),
        },
    }
}

fn has_scheme(path: &str) -> bool {
    scheme_len(path).is_some()
}

/// Length of a `scheme:` prefix, including the colon. Single letters are
/// not schemes so that `C:` style drive paths stay paths.
fn scheme_len(path: &str) -> Option<usize> {
    let colon = path.find(':')?;
    let scheme = &path[..colon];
    let valid = scheme.len() > 1
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.'));
    valid.then_some(colon + 1)
}
