/// Script loading trait and implementations
///
/// Scripts are looked up by name. Loaders exist for a directory of `.typer`
/// files, an in-memory store, the scripts compiled into the crate, and a chain
/// that falls back from one loader to the next.
use async_trait::async_trait;
use std::collections::HashMap;
#[cfg(feature = "tokio-runtime")]
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "builtin-scripts")]
use crate::builtin_scripts;

/// File extension of script files
pub const SCRIPT_EXTENSION: &str = "typer";

#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    NotFound(String),
    IoError(String),
    InvalidPath(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::NotFound(name) => write!(f, "Script not found: {}", name),
            LoadError::IoError(msg) => write!(f, "IO error: {}", msg),
            LoadError::InvalidPath(path) => write!(f, "Invalid path: {}", path),
        }
    }
}

impl std::error::Error for LoadError {}

/// Source of script text, looked up by name
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    /// Load the source text of the script called `name`
    async fn load(&self, name: &str) -> Result<String, LoadError>;

    /// Names this loader can serve, when it can tell
    fn list_available(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Loads `<name>.typer` (or `<name>`) from a directory.
///
/// Only available with the `tokio-runtime` feature.
#[cfg(feature = "tokio-runtime")]
pub struct FolderLoader {
    base_path: PathBuf,
}

#[cfg(feature = "tokio-runtime")]
impl FolderLoader {
    pub fn new(base_path: PathBuf) -> Self {
        FolderLoader { base_path }
    }
}

#[cfg(feature = "tokio-runtime")]
#[async_trait]
impl ScriptLoader for FolderLoader {
    async fn load(&self, name: &str) -> Result<String, LoadError> {
        // Names must stay inside the base directory
        let sanitized = name.replace("..", "").replace(['/', '\\'], "");
        if sanitized.is_empty() {
            return Err(LoadError::InvalidPath(name.to_string()));
        }

        let candidates = [
            self.base_path
                .join(format!("{}.{}", sanitized, SCRIPT_EXTENSION)),
            self.base_path.join(&sanitized),
        ];
        for path in candidates {
            match tokio::fs::read_to_string(&path).await {
                Ok(source) => {
                    tracing::debug!(path = %path.display(), "script loaded");
                    return Ok(source);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(LoadError::IoError(e.to_string())),
            }
        }

        Err(LoadError::NotFound(name.to_string()))
    }

    fn list_available(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.base_path) else {
            return Vec::new();
        };
        entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect()
    }
}

/// Scripts kept in memory, handy for tests and embedding
#[derive(Clone, Default)]
pub struct InMemoryLoader {
    scripts: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a script
    ///
    /// # Example
    /// ```
    /// use terminal_typer::loader::InMemoryLoader;
    ///
    /// let loader = InMemoryLoader::new();
    /// loader.add("short", "[intro]\nhi\n[unlock]\nok\n[accepted]\nyay\n[decline]\nno?\n");
    /// assert!(loader.contains("short"));
    /// ```
    pub fn add(&self, name: impl Into<String>, source: impl Into<String>) {
        let mut scripts = self.scripts.write().unwrap_or_else(PoisonError::into_inner);
        scripts.insert(name.into(), source.into());
    }

    /// Returns `true` if the script existed
    pub fn remove(&self, name: &str) -> bool {
        let mut scripts = self.scripts.write().unwrap_or_else(PoisonError::into_inner);
        scripts.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        let scripts = self.scripts.read().unwrap_or_else(PoisonError::into_inner);
        scripts.contains_key(name)
    }
}

#[async_trait]
impl ScriptLoader for InMemoryLoader {
    async fn load(&self, name: &str) -> Result<String, LoadError> {
        let scripts = self.scripts.read().unwrap_or_else(PoisonError::into_inner);
        scripts
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }

    fn list_available(&self) -> Vec<String> {
        let scripts = self.scripts.read().unwrap_or_else(PoisonError::into_inner);
        scripts.keys().cloned().collect()
    }
}

/// Serves the scripts compiled into the crate.
/// Only available with the `builtin-scripts` feature.
#[cfg(feature = "builtin-scripts")]
#[derive(Clone, Default)]
pub struct BuiltinScriptsLoader;

#[cfg(feature = "builtin-scripts")]
impl BuiltinScriptsLoader {
    pub fn new() -> Self {
        BuiltinScriptsLoader
    }
}

#[cfg(feature = "builtin-scripts")]
#[async_trait]
impl ScriptLoader for BuiltinScriptsLoader {
    async fn load(&self, name: &str) -> Result<String, LoadError> {
        builtin_scripts::source(name)
            .map(str::to_string)
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }

    fn list_available(&self) -> Vec<String> {
        builtin_scripts::SCRIPTS
            .iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

/// Tries loaders in order; the first one that has the script wins.
/// Errors other than `NotFound` stop the search.
#[derive(Clone, Default)]
pub struct ChainLoader {
    loaders: Vec<Arc<dyn ScriptLoader>>,
}

impl ChainLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(mut self, loader: Arc<dyn ScriptLoader>) -> Self {
        self.loaders.push(loader);
        self
    }
}

#[async_trait]
impl ScriptLoader for ChainLoader {
    async fn load(&self, name: &str) -> Result<String, LoadError> {
        for loader in &self.loaders {
            match loader.load(name).await {
                Ok(source) => return Ok(source),
                Err(LoadError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(LoadError::NotFound(name.to_string()))
    }

    fn list_available(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .loaders
            .iter()
            .flat_map(|loader| loader.list_available())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
