// Stream resolvers for resource paths
//
// The engine never opens files itself. Paths are routed by their scheme
// prefix (`asset:`, `content:`, ...) to a resolver the host registered;
// anything without a registered prefix goes to the default resolver.

use std::fs::File;
use std::io::{self, Cursor, Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;

/// Opens streams for resource paths.
pub trait ResourceResolver: Send + Sync {
    fn open_read(&self, path: &str) -> io::Result<Box<dyn Read + Send>>;
    fn open_write(&self, path: &str) -> io::Result<Box<dyn Write + Send>>;
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Plain files, optionally below a root directory.
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    root: Option<PathBuf>,
}

impl FileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths below `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path.trim_start_matches('/')),
            None => PathBuf::from(path),
        }
    }
}

impl ResourceResolver for FileResolver {
    fn open_read(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(self.full_path(path))?))
    }

    fn open_write(&self, path: &str) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(File::create(self.full_path(path))?))
    }
}

// ---------------------------------------------------------------------------
// In memory
// ---------------------------------------------------------------------------

/// Files held in memory. Clones share the same files. Written data becomes
/// visible when the writer is flushed or dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: &str, contents: impl Into<Vec<u8>>) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), contents.into());
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}

impl ResourceResolver for MemoryResolver {
    fn open_read(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        let contents = self
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no such resource: {path}")))?;
        Ok(Box::new(Cursor::new(contents)))
    }

    fn open_write(&self, path: &str) -> io::Result<Box<dyn Write + Send>> {
        Ok(Box::new(MemoryWriter {
            resolver: self.clone(),
            path: path.to_string(),
            buffer: Vec::new(),
        }))
    }
}

struct MemoryWriter {
    resolver: MemoryResolver,
    path: String,
    buffer: Vec<u8>,
}

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.resolver.insert(&self.path, self.buffer.clone());
        Ok(())
    }
}

impl Drop for MemoryWriter {
    fn drop(&mut self) {
        self.resolver.insert(&self.path, std::mem::take(&mut self.buffer));
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Routes paths to resolvers by scheme prefix.
#[derive(Clone)]
pub struct Resources {
    schemes: Vec<(String, Arc<dyn ResourceResolver>)>,
    default: Arc<dyn ResourceResolver>,
}

impl Resources {
    pub fn new(default: Arc<dyn ResourceResolver>) -> Self {
        Self {
            schemes: Vec::new(),
            default,
        }
    }

    /// Route paths starting with `prefix` (e.g. `"asset:"`) to `resolver`,
    /// which receives the path with the prefix removed.
    pub fn register(&mut self, prefix: &str, resolver: Arc<dyn ResourceResolver>) {
        self.schemes.retain(|(existing, _)| existing != prefix);
        self.schemes.push((prefix.to_string(), resolver));
    }

    /// The resolver for `path` and the path it should see. The longest
    /// matching prefix wins.
    pub fn resolve<'p>(&self, path: &'p str) -> (&dyn ResourceResolver, &'p str) {
        self.schemes
            .iter()
            .filter(|(prefix, _)| path.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map_or((&*self.default, path), |(prefix, resolver)| {
                (&**resolver, &path[prefix.len()..])
            })
    }

    pub fn open_read(&self, path: &str) -> io::Result<Box<dyn Read + Send>> {
        let (resolver, inner) = self.resolve(path);
        resolver.open_read(inner)
    }

    pub fn open_write(&self, path: &str) -> io::Result<Box<dyn Write + Send>> {
        let (resolver, inner) = self.resolve(path);
        resolver.open_write(inner)
    }
}

impl Default for Resources {
    fn default() -> Self {
        Self::new(Arc::new(FileResolver::new()))
    }
}
