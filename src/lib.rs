/// Terminal Typer - a scripted typewriter terminal
///
/// This library types scripted lines out character by character, with inline
/// image placeholders resolved once per line, an instant skip mode, and a small
/// scenario that unlocks "yes" after enough "no"s.
///
/// # Example
///
/// ```
/// use terminal_typer::{resolve_with_seed, TypingQueue};
///
/// let lines = resolve_with_seed(&["hi", "{{heart}}!"], 42);
/// let mut queue = TypingQueue::default();
/// queue.enqueue(lines);
/// queue.run_to_idle();
/// assert_eq!(queue.snapshot().printed.len(), 2);
/// ```
pub mod catalog;
pub mod config;
pub mod diagnostic;
pub mod line;
pub mod loader;
pub mod placeholder;
pub mod preprocessor;
pub mod queue;
pub mod render;
pub mod scenario;
pub mod script;
pub mod snapshot;
pub mod span;

#[cfg(feature = "tokio-runtime")]
pub mod typewriter;

#[cfg(feature = "builtin-scripts")]
pub mod builtin_scripts;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Re-export main types for convenience
pub use catalog::{AssetCatalog, CatalogError, ResourceHandle};
pub use config::{ScenarioConfig, TyperConfig};
pub use line::{ActiveLine, LineError, ProcessedLine, ResolvedImageRef};
pub use loader::{LoadError, ScriptLoader};
pub use preprocessor::Preprocessor;
pub use queue::{Tick, TypingQueue};
pub use scenario::{AffirmOutcome, DeclineOutcome, LineSink, Scenario, Step};
pub use script::{Script, ScriptError, ScriptWarning};
pub use snapshot::Snapshot;
#[cfg(feature = "tokio-runtime")]
pub use typewriter::Typewriter;

/// Combined error type for the crate
#[derive(Debug)]
pub enum TyperError {
    Catalog(CatalogError),
    Line(LineError),
    Script(ScriptError),
    Load(LoadError),
}

impl std::fmt::Display for TyperError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TyperError::Catalog(e) => write!(f, "Catalog error: {}", e),
            TyperError::Line(e) => write!(f, "Line error: {}", e),
            TyperError::Script(e) => write!(f, "Script error: {}", e),
            TyperError::Load(e) => write!(f, "Load error: {}", e),
        }
    }
}

impl std::error::Error for TyperError {}

impl From<CatalogError> for TyperError {
    fn from(e: CatalogError) -> Self {
        TyperError::Catalog(e)
    }
}

impl From<LineError> for TyperError {
    fn from(e: LineError) -> Self {
        TyperError::Line(e)
    }
}

impl From<ScriptError> for TyperError {
    fn from(e: ScriptError) -> Self {
        TyperError::Script(e)
    }
}

impl From<LoadError> for TyperError {
    fn from(e: LoadError) -> Self {
        TyperError::Load(e)
    }
}

/// Resolve raw lines against the builtin catalog with a seeded RNG
///
/// # Example
/// ```
/// use terminal_typer::resolve_with_seed;
///
/// let lines = resolve_with_seed(&["hi", "{{heart}}!"], 7);
/// assert_eq!(lines[1].text(), "{{IMG_0}}!");
/// assert_eq!(lines[1].images()[0].resource.as_str(), "heart/heart.jfif");
/// ```
pub fn resolve_with_seed<S: AsRef<str>>(lines: &[S], seed: u64) -> Vec<ProcessedLine> {
    let mut preprocessor = Preprocessor::new(
        Arc::new(AssetCatalog::builtin()),
        StdRng::seed_from_u64(seed),
    );
    preprocessor.resolve(lines)
}

/// Load a script by name and parse it, returning the source alongside for
/// diagnostics
///
/// # Example
/// ```
/// # tokio_test::block_on(async {
/// use terminal_typer::load_script;
/// use terminal_typer::loader::InMemoryLoader;
///
/// let loader = InMemoryLoader::new();
/// loader.add("mine", "[intro]\nhi\n[unlock]\nok\n[accepted]\nyay\n[decline]\nno?\n");
/// let (_, script) = load_script(&loader, "mine").await.unwrap();
/// assert_eq!(script.intro, vec!["hi"]);
/// # });
/// ```
pub async fn load_script(
    loader: &dyn ScriptLoader,
    name: &str,
) -> Result<(String, Script), TyperError> {
    let source = loader.load(name).await?;
    let script = Script::parse(&source)?;
    Ok((source, script))
}

/// Parse one of the builtin scripts
#[cfg(feature = "builtin-scripts")]
pub fn builtin_script(name: &str) -> Result<Script, TyperError> {
    let source =
        builtin_scripts::source(name).ok_or_else(|| LoadError::NotFound(name.to_string()))?;
    Ok(Script::parse(source)?)
}

/// Names of the builtin scripts, empty without the `builtin-scripts` feature
pub fn list_builtin_scripts() -> Vec<String> {
    #[cfg(feature = "builtin-scripts")]
    {
        builtin_scripts::SCRIPTS
            .iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }
    #[cfg(not(feature = "builtin-scripts"))]
    {
        Vec::new()
    }
}
