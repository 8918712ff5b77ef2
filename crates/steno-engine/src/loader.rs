// Loading systems, dictionaries and orthographies through resolvers
//
// Each resource kind has a cache keyed by path. `try_load_*` returns the
// typed error; `load_*` logs it and reports the resource as unavailable,
// which is what the host usually wants at configuration time.

use std::io::{Read, Write};
use std::sync::{Arc, PoisonError, RwLock};

use steno_core::{KeyLayout, LayoutError, Stroke};

use crate::cache::ResourceCache;
use crate::config::{FormattingConfig, SystemConfig};
use crate::dictionary::numbers::NumbersDictionary;
use crate::dictionary::{Dictionary, DictionaryError, MultiDictionary, MutableDictionary, StandardDictionary};
use crate::formatting::Formatting;
use crate::orthography::{self, Orthography, OrthographyError, OrthographyKind};
use crate::resource::Resources;
use crate::system::{DictionarySource, System};

/// Path prefix naming a dictionary computed in code.
pub const CODE_DICTIONARY_SCHEME: &str = "code_dictionary:";

/// Maximum number of `base` files above a system file.
pub const BASE_DEPTH_LIMIT: usize = 8;

/// Shared, editable dictionary as handed out by the loader.
pub type SharedDictionary = Arc<RwLock<StandardDictionary>>;

/// Error type for resource loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid system file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid dictionary {path}: {source}")]
    Dictionary {
        path: String,
        #[source]
        source: DictionaryError,
    },

    #[error("invalid orthography {path}: {source}")]
    Orthography {
        path: String,
        #[source]
        source: OrthographyError,
    },

    #[error("invalid key layout in {path}: {source}")]
    Layout {
        path: String,
        #[source]
        source: LayoutError,
    },

    #[error("system {path} defines no keys")]
    MissingLayout { path: String },

    #[error("system {path} inherits from itself")]
    BaseCycle { path: String },

    #[error("system {path} has more than {limit} base files")]
    BaseDepth { path: String, limit: usize },

    #[error("invalid stroke {stroke:?} in {path}")]
    InvalidStroke { path: String, stroke: String },

    #[error("unknown code dictionary: {0:?}")]
    UnknownCodeDictionary(String),
}

/// Loads and caches resources.
pub struct Loader {
    resources: Resources,
    dictionaries: ResourceCache<RwLock<StandardDictionary>>,
    orthographies: ResourceCache<dyn Orthography>,
    systems: ResourceCache<System>,
}

impl Loader {
    pub fn new(resources: Resources) -> Self {
        Self {
            resources,
            dictionaries: ResourceCache::default(),
            orthographies: ResourceCache::default(),
            systems: ResourceCache::default(),
        }
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut Resources {
        &mut self.resources
    }

    // -----------------------------------------------------------------------
    // Dictionaries
    // -----------------------------------------------------------------------

    /// Load a JSON dictionary, sharing the cached copy when it was loaded
    /// for the same layout.
    pub fn try_load_dictionary(&mut self, path: &str, layout: &Arc<KeyLayout>) -> Result<SharedDictionary, LoadError> {
        if let Some(cached) = self.dictionaries.get(path) {
            let same_layout = {
                let dictionary = cached.read().unwrap_or_else(PoisonError::into_inner);
                **dictionary.layout() == **layout
            };
            if same_layout {
                return Ok(cached);
            }
        }
        let reader = self.open(path)?;
        let dictionary = StandardDictionary::load(Arc::clone(layout), reader).map_err(|source| LoadError::Dictionary {
            path: path.to_string(),
            source,
        })?;
        let shared = Arc::new(RwLock::new(dictionary));
        self.dictionaries.insert(path, Arc::clone(&shared));
        Ok(shared)
    }

    pub fn load_dictionary(&mut self, path: &str, layout: &Arc<KeyLayout>) -> Option<SharedDictionary> {
        self.try_load_dictionary(path, layout).map_err(log_unavailable).ok()
    }

    /// A dictionary computed in code, by its name after
    /// [`CODE_DICTIONARY_SCHEME`].
    pub fn code_dictionary(&self, name: &str, layout: &Arc<KeyLayout>) -> Result<Arc<dyn Dictionary>, LoadError> {
        match name {
            "numbers" => Ok(Arc::new(NumbersDictionary::new(layout))),
            _ => Err(LoadError::UnknownCodeDictionary(name.to_string())),
        }
    }

    /// Write `dictionary` to `path`.
    pub fn save_dictionary(&self, path: &str, dictionary: &dyn MutableDictionary) -> Result<(), LoadError> {
        let io_error = |source| LoadError::Io {
            path: path.to_string(),
            source,
        };
        let mut out = self.resources.open_write(path).map_err(io_error)?;
        dictionary.save(&mut out).map_err(|source| LoadError::Dictionary {
            path: path.to_string(),
            source,
        })?;
        out.flush().map_err(io_error)
    }

    /// Assemble the enabled dictionaries of `system` in priority order.
    /// Dictionaries that fail to load are logged and left out.
    pub fn build_dictionary(&mut self, system: &System) -> MultiDictionary {
        let mut multi = MultiDictionary::new();
        for source in system.dictionaries().iter().filter(|source| source.enabled) {
            let dictionary: Option<Arc<dyn Dictionary>> = match source.path.strip_prefix(CODE_DICTIONARY_SCHEME) {
                Some(name) => self
                    .code_dictionary(name, system.layout())
                    .map_err(log_unavailable)
                    .ok(),
                None => self
                    .load_dictionary(&source.path, system.layout())
                    .map(|shared| shared as Arc<dyn Dictionary>),
            };
            if let Some(dictionary) = dictionary {
                multi.push(dictionary);
            }
        }
        multi
    }

    // -----------------------------------------------------------------------
    // Orthographies
    // -----------------------------------------------------------------------

    pub fn try_load_orthography(
        &mut self,
        kind: OrthographyKind,
        path: &str,
    ) -> Result<Arc<dyn Orthography>, LoadError> {
        let key = format!("{kind:?}:{path}");
        if let Some(cached) = self.orthographies.get(&key) {
            return Ok(cached);
        }
        let reader = self.open(path)?;
        let loaded = orthography::load(kind, reader).map_err(|source| LoadError::Orthography {
            path: path.to_string(),
            source,
        })?;
        self.orthographies.insert(&key, Arc::clone(&loaded));
        Ok(loaded)
    }

    pub fn load_orthography(&mut self, kind: OrthographyKind, path: &str) -> Option<Arc<dyn Orthography>> {
        self.try_load_orthography(kind, path).map_err(log_unavailable).ok()
    }

    // -----------------------------------------------------------------------
    // Systems
    // -----------------------------------------------------------------------

    /// Load a system file and its base chain.
    pub fn try_load_system(&mut self, path: &str) -> Result<Arc<System>, LoadError> {
        if let Some(cached) = self.systems.get(path) {
            return Ok(cached);
        }
        let config = self.read_config_chain(path)?;
        let system = Arc::new(self.build_system(path, config)?);
        self.systems.insert(path, Arc::clone(&system));
        tracing::debug!(path = %path, name = %system.name(), "loaded system");
        Ok(system)
    }

    pub fn load_system(&mut self, path: &str) -> Option<Arc<System>> {
        self.try_load_system(path).map_err(log_unavailable).ok()
    }

    /// Drop `path` from every cache. Returns whether anything was cached.
    pub fn invalidate(&mut self, path: &str) -> bool {
        let dictionary = self.dictionaries.invalidate(path);
        let system = self.systems.invalidate(path);
        let orthography = [OrthographyKind::Simple, OrthographyKind::Regex]
            .into_iter()
            .fold(false, |any, kind| self.orthographies.invalidate(&format!("{kind:?}:{path}")) || any);
        dictionary || system || orthography
    }

    /// Read `path` and every base above it, merged with the child winning.
    fn read_config_chain(&self, path: &str) -> Result<SystemConfig, LoadError> {
        let mut chain: Vec<String> = Vec::new();
        let mut configs: Vec<SystemConfig> = Vec::new();
        let mut next = Some(path.to_string());
        while let Some(current) = next {
            if chain.contains(&current) {
                return Err(LoadError::BaseCycle { path: current });
            }
            if chain.len() > BASE_DEPTH_LIMIT {
                return Err(LoadError::BaseDepth {
                    path: path.to_string(),
                    limit: BASE_DEPTH_LIMIT,
                });
            }
            let config = self.read_config(&current)?;
            next = config.base.clone();
            chain.push(current);
            configs.push(config);
        }
        Ok(configs
            .into_iter()
            .rev()
            .reduce(SystemConfig::merge)
            .unwrap_or_default())
    }

    fn read_config(&self, path: &str) -> Result<SystemConfig, LoadError> {
        let mut text = String::new();
        self.open(path)?
            .read_to_string(&mut text)
            .map_err(|source| LoadError::Io {
                path: path.to_string(),
                source,
            })?;
        let config = SystemConfig::from_json(&text).map_err(|source| LoadError::Json {
            path: path.to_string(),
            source,
        })?;
        Ok(config.resolve_paths(path))
    }

    fn build_system(&mut self, path: &str, config: SystemConfig) -> Result<System, LoadError> {
        let layout_error = |source| LoadError::Layout {
            path: path.to_string(),
            source,
        };
        let keys = config.keys.as_deref().ok_or_else(|| LoadError::MissingLayout {
            path: path.to_string(),
        })?;
        let (start, end) = config.break_keys.unwrap_or((0, 0));
        let mut layout = KeyLayout::new(keys, start, end).map_err(layout_error)?;
        if let Some(aliases) = config.key_aliases {
            layout = layout.with_aliases(aliases).map_err(layout_error)?;
        }
        let layout = Arc::new(layout);

        let mut system = System::new(Arc::clone(&layout))
            .with_name(config.name.unwrap_or_else(|| path.to_string()))
            .with_prefix_strokes(parse_strokes(path, &layout, config.prefix_strokes)?)
            .with_suffix_strokes(parse_strokes(path, &layout, config.suffix_strokes)?);

        if let Some(orthography) = &config.orthography {
            let loaded = OrthographyKind::from_name(&orthography.kind)
                .map_err(|source| LoadError::Orthography {
                    path: orthography.path.clone(),
                    source,
                })
                .and_then(|kind| self.try_load_orthography(kind, &orthography.path));
            match loaded {
                Ok(loaded) => system = system.with_orthography(loaded),
                Err(err) => tracing::warn!(system = %path, error = %err, "orthography unavailable"),
            }
        }
        for (name, translation) in config.aliases.unwrap_or_default() {
            system = system.with_alias(&name, &translation);
        }
        for name in config.commands.unwrap_or_default() {
            system = system.with_host_command(&name);
        }
        let dictionaries = config
            .dictionaries
            .unwrap_or_default()
            .iter()
            .map(|entry| DictionarySource {
                path: entry.path().to_string(),
                enabled: entry.enabled(),
            })
            .collect();
        let formatting = default_formatting(&system, config.default_formatting.unwrap_or_default());
        Ok(system.with_dictionaries(dictionaries).with_default_formatting(formatting))
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, LoadError> {
        self.resources.open_read(path).map_err(|source| LoadError::Io {
            path: path.to_string(),
            source,
        })
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(Resources::default())
    }
}

fn log_unavailable(err: LoadError) -> LoadError {
    tracing::warn!(error = %err, "resource unavailable");
    err
}

fn parse_strokes(path: &str, layout: &Arc<KeyLayout>, strokes: Option<Vec<String>>) -> Result<Vec<Stroke>, LoadError> {
    strokes
        .unwrap_or_default()
        .into_iter()
        .map(|text| {
            Stroke::parse(layout, &text).ok_or_else(|| LoadError::InvalidStroke {
                path: path.to_string(),
                stroke: text,
            })
        })
        .collect()
}

fn default_formatting(system: &System, config: FormattingConfig) -> Formatting {
    let transform = config.transform.and_then(|name| {
        let transform = system.transform(&name);
        if transform.is_none() {
            tracing::warn!(transform = %name, "unknown default transform");
        }
        transform
    });
    Formatting {
        space_start: config.space_start,
        space_end: config.space_end,
        space: config.space,
        transform,
        ..Formatting::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatting::Space;
    use crate::resource::MemoryResolver;
    use steno_core::case::Transform;

    const ENGLISH: &str = r##"{
        "name": "English",
        "keys": "#STKPWHRAO*EUFRPBLGTSDZ",
        "breakKeys": [8, 13],
        "keyAliases": {"1-": ["#", "S-"], "2-": ["#", "T-"]},
        "orthography": {"type": "simple", "path": "orthography.json"},
        "dictionaries": ["code_dictionary:numbers", "main.json", {"path": "off.json", "enabled": false}],
        "suffixStrokes": ["-Z"],
        "aliases": {"cap": "{-|}"},
        "defaultFormatting": {"transform": "capitalize"}
    }"##;

    fn loader() -> (Loader, MemoryResolver) {
        let memory = MemoryResolver::new();
        memory.insert("sys/english.json", ENGLISH);
        memory.insert("sys/orthography.json", r#"[{"l": "y", "r": "s", "s": "ies"}]"#);
        memory.insert("sys/main.json", r#"{"KAT": "cat", "-Z": "{^s}"}"#);
        (Loader::new(Resources::new(Arc::new(memory.clone()))), memory)
    }

    #[test]
    fn loads_system_with_references() {
        let (mut loader, _) = loader();
        let system = loader.try_load_system("sys/english.json").unwrap();
        assert_eq!(system.name(), "English");
        assert!(system.orthography().is_some());
        assert_eq!(system.suffix_strokes().len(), 1);
        assert_eq!(system.default_formatting().transform, Some(Transform::Capitalize));
        assert_eq!(system.dictionaries()[1].path, "sys/main.json");
        assert_eq!(system.layout().aliases().count(), 2);

        let dictionary = loader.build_dictionary(&system);
        assert_eq!(dictionary.len(), 2);
        let layout = system.layout();
        assert_eq!(
            dictionary.get(&[Stroke::parse(layout, "KAT").unwrap()]).as_deref(),
            Some("cat")
        );
        assert_eq!(
            dictionary.get(&[Stroke::parse(layout, "#T").unwrap()]).as_deref(),
            Some("{&2}")
        );
    }

    #[test]
    fn base_fields_are_inherited() {
        let (mut loader, memory) = loader();
        memory.insert(
            "sys/mine.json",
            r#"{"base": "english.json", "name": "Mine", "defaultFormatting": {"spaceEnd": "normal"}}"#,
        );
        let system = loader.try_load_system("sys/mine.json").unwrap();
        assert_eq!(system.name(), "Mine");
        assert_eq!(system.suffix_strokes().len(), 1);
        assert_eq!(system.default_formatting().space_end, Some(Space::Normal));
        assert!(system.default_formatting().transform.is_none());
    }

    #[test]
    fn base_cycles_and_depth_are_errors() {
        let (mut loader, memory) = loader();
        memory.insert("a.json", r#"{"base": "b.json"}"#);
        memory.insert("b.json", r#"{"base": "a.json"}"#);
        assert!(matches!(
            loader.try_load_system("a.json"),
            Err(LoadError::BaseCycle { path }) if path == "a.json"
        ));

        for i in 0..=BASE_DEPTH_LIMIT + 1 {
            memory.insert(&format!("d{i}.json"), format!(r#"{{"base": "d{}.json"}}"#, i + 1));
        }
        assert!(matches!(
            loader.try_load_system("d0.json"),
            Err(LoadError::BaseDepth { .. })
        ));
    }

    #[test]
    fn missing_resources_are_unavailable() {
        let (mut loader, memory) = loader();
        assert!(loader.load_system("nope.json").is_none());
        memory.insert("bad.json", "{not json");
        assert!(matches!(loader.try_load_system("bad.json"), Err(LoadError::Json { .. })));
        memory.insert("nokeys.json", "{}");
        assert!(matches!(
            loader.try_load_system("nokeys.json"),
            Err(LoadError::MissingLayout { .. })
        ));
        memory.insert("badstroke.json", r#"{"keys": "STK", "suffixStrokes": ["X"]}"#);
        assert!(matches!(
            loader.try_load_system("badstroke.json"),
            Err(LoadError::InvalidStroke { .. })
        ));
    }

    #[test]
    fn broken_orthography_is_skipped() {
        let (mut loader, memory) = loader();
        memory.insert("sys/orthography.json", "[");
        let system = loader.try_load_system("sys/english.json").unwrap();
        assert!(system.orthography().is_none());
    }

    #[test]
    fn dictionaries_are_cached_until_invalidated() {
        let (mut loader, memory) = loader();
        let layout = Arc::new(KeyLayout::english());
        let first = loader.try_load_dictionary("sys/main.json", &layout).unwrap();
        let again = loader.try_load_dictionary("sys/main.json", &layout).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        memory.insert("sys/main.json", r#"{"TKOG": "dog"}"#);
        assert!(loader.invalidate("sys/main.json"));
        let reloaded = loader.try_load_dictionary("sys/main.json", &layout).unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(reloaded.read().unwrap().len(), 1);
    }

    #[test]
    fn save_round_trip() {
        let (mut loader, memory) = loader();
        let layout = Arc::new(KeyLayout::english());
        let shared = loader.try_load_dictionary("sys/main.json", &layout).unwrap();
        {
            let mut dictionary = shared.write().unwrap();
            dictionary.set_rtfcre("TKOG", "dog".to_string()).unwrap();
            loader.save_dictionary("out.json", &*dictionary).unwrap();
        }
        let saved = String::from_utf8(memory.get("out.json").unwrap()).unwrap();
        assert_eq!(saved, "{\n\"-Z\": \"{^s}\",\n\"KAT\": \"cat\",\n\"TKOG\": \"dog\"\n}\n");
    }

    #[test]
    fn unknown_code_dictionary() {
        let (loader, _) = loader();
        let layout = Arc::new(KeyLayout::english());
        assert!(matches!(
            loader.code_dictionary("emoji", &layout),
            Err(LoadError::UnknownCodeDictionary(_))
        ));
    }
}
