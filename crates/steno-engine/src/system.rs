// System definition: layout, orthography, tables and defaults
//
// A `System` is assembled once (usually by the loader from a JSON file) and
// shared behind an `Arc`. Reconfiguring means building a new one.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use steno_core::case::{Caseless, Transform};
use steno_core::{KeyLayout, Stroke};

use crate::commands::{Command, builtin_commands};
use crate::formatting::{Formatting, Space};
use crate::orthography::Orthography;

/// A dictionary the system wants loaded, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionarySource {
    pub path: String,
    pub enabled: bool,
}

impl DictionarySource {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            enabled: true,
        }
    }
}

/// Everything the translator needs to know about a steno system.
#[derive(Clone)]
pub struct System {
    name: String,
    layout: Arc<KeyLayout>,
    orthography: Option<Arc<dyn Orthography>>,
    transforms: HashMap<Caseless, Transform>,
    commands: HashMap<Caseless, Command>,
    aliases: HashMap<Caseless, String>,
    prefix_strokes: Vec<Stroke>,
    suffix_strokes: Vec<Stroke>,
    dictionaries: Vec<DictionarySource>,
    default_formatting: Formatting,
}

impl System {
    /// A system with builtin transforms and commands and nothing else.
    pub fn new(layout: Arc<KeyLayout>) -> Self {
        Self {
            name: String::new(),
            layout,
            orthography: None,
            transforms: Transform::ALL
                .into_iter()
                .map(|t| (Caseless::new(t.name()), t))
                .collect(),
            commands: builtin_commands()
                .map(|(name, command)| (Caseless::new(name), command))
                .collect(),
            aliases: HashMap::new(),
            prefix_strokes: Vec::new(),
            suffix_strokes: Vec::new(),
            dictionaries: Vec::new(),
            default_formatting: Formatting::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_orthography(mut self, orthography: Arc<dyn Orthography>) -> Self {
        self.orthography = Some(orthography);
        self
    }

    /// Register a transform under an additional name.
    pub fn with_transform(mut self, name: &str, transform: Transform) -> Self {
        self.transforms.insert(Caseless::new(name), transform);
        self
    }

    pub fn with_command(mut self, name: &str, command: Command) -> Self {
        self.commands.insert(Caseless::new(name), command);
        self
    }

    /// Register a command that is passed through to the host.
    pub fn with_host_command(self, name: &str) -> Self {
        self.with_command(name, Command::Host)
    }

    pub fn with_alias(mut self, name: &str, translation: &str) -> Self {
        self.aliases.insert(Caseless::new(name), translation.to_string());
        self
    }

    pub fn with_prefix_strokes(mut self, strokes: Vec<Stroke>) -> Self {
        self.prefix_strokes = strokes;
        self
    }

    pub fn with_suffix_strokes(mut self, strokes: Vec<Stroke>) -> Self {
        self.suffix_strokes = strokes;
        self
    }

    pub fn with_dictionaries(mut self, dictionaries: Vec<DictionarySource>) -> Self {
        self.dictionaries = dictionaries;
        self
    }

    pub fn with_default_formatting(mut self, formatting: Formatting) -> Self {
        self.default_formatting = formatting;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> &Arc<KeyLayout> {
        &self.layout
    }

    pub fn orthography(&self) -> Option<&dyn Orthography> {
        self.orthography.as_deref()
    }

    pub fn transform(&self, name: &str) -> Option<Transform> {
        self.transforms.get(&Caseless::new(name)).copied()
    }

    pub fn command(&self, name: &str) -> Option<Command> {
        self.commands.get(&Caseless::new(name)).copied()
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&Caseless, &String)> {
        self.aliases.iter()
    }

    pub fn prefix_strokes(&self) -> &[Stroke] {
        &self.prefix_strokes
    }

    pub fn suffix_strokes(&self) -> &[Stroke] {
        &self.suffix_strokes
    }

    pub fn dictionaries(&self) -> &[DictionarySource] {
        &self.dictionaries
    }

    pub fn default_formatting(&self) -> &Formatting {
        &self.default_formatting
    }

    /// Formatting at the start of a context: the defaults, with no space
    /// before the first word unless the defaults say otherwise.
    pub fn start_formatting(&self) -> Formatting {
        Formatting {
            space_end: self.default_formatting.space_end.or(Some(Space::NoSpace)),
            ..self.default_formatting.clone()
        }
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("name", &self.name)
            .field("keys", &self.layout.keys().iter().collect::<String>())
            .field("orthography", &self.orthography.is_some())
            .field("commands", &self.commands.len())
            .field("aliases", &self.aliases.len())
            .field("dictionaries", &self.dictionaries)
            .finish_non_exhaustive()
    }
}
