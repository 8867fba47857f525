#![cfg(all(feature = "tokio-runtime", feature = "builtin-scripts"))]
/// Script loading, parsing and linting through the public API
use std::sync::Arc;
use terminal_typer::diagnostic::{report_script_error, report_typer_error};
use terminal_typer::loader::{BuiltinScriptsLoader, ChainLoader, FolderLoader, InMemoryLoader};
use terminal_typer::{
    list_builtin_scripts, load_script, AssetCatalog, LoadError, ScriptError, ScriptLoader,
    ScriptWarning, TyperError,
};

const CUSTOM: &str = "\
# comments are skipped
[intro]
line one

line three
.

[unlock]
unlocked

[accepted]
yay {{love}}

[decline]
no {{IMG: sad }}
[escalate]
that's enough
";

#[tokio::test]
async fn test_custom_script_sections() {
    let loader = InMemoryLoader::new();
    loader.add("custom", CUSTOM);
    let (_, script) = load_script(&loader, "custom").await.unwrap();

    assert_eq!(script.intro, vec!["line one", "", "line three", ""]);
    assert_eq!(script.unlock, vec!["unlocked"]);
    assert_eq!(script.accepted, vec!["yay {{love}}"]);
    assert_eq!(script.decline, vec!["no {{IMG: sad }}"]);
    assert_eq!(script.escalate, "that's enough");
    assert_eq!(script.denied.len(), 2);
}

#[tokio::test]
async fn test_folder_scripts_shadow_builtins() {
    let dir = std::env::temp_dir().join(format!("terminal-typer-it-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(dir.join("polita.typer"), CUSTOM).await.unwrap();

    let chain = ChainLoader::new()
        .with_loader(Arc::new(FolderLoader::new(dir.clone())))
        .with_loader(Arc::new(BuiltinScriptsLoader::new()));

    let (_, polita) = load_script(&chain, "polita").await.unwrap();
    assert_eq!(polita.intro[0], "line one");
    let (_, valentine) = load_script(&chain, "valentine").await.unwrap();
    assert_eq!(valentine.intro[0], "booting ValentineOS v2.0.0...");

    let missing = load_script(&chain, "nope").await;
    assert!(matches!(
        missing,
        Err(TyperError::Load(LoadError::NotFound(_)))
    ));
    assert_eq!(chain.list_available(), list_builtin_scripts());

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn test_parse_error_diagnostic() {
    let source = "[intro]\nhi\n[intro]\nagain\n";
    let loader = InMemoryLoader::new();
    loader.add("dup", source);

    let error = load_script(&loader, "dup").await.unwrap_err();
    let TyperError::Script(script_error) = &error else {
        panic!("expected a script error, got {}", error);
    };
    assert!(matches!(
        script_error,
        ScriptError::DuplicateSection { .. }
    ));
    assert_eq!(script_error.span().start, 11);

    let report = report_typer_error("dup.typer", source, &error);
    assert!(report.contains("Duplicate section"));
    assert_eq!(
        report,
        report_script_error("dup.typer", source, script_error)
    );
}

#[test]
fn test_lint_points_at_placeholder() {
    let source = "[intro]\nhey {{kitten}}\n[unlock]\nok\n[accepted]\n{{heart}}\n[decline]\n{{IMG:sad}}\n";
    let warnings = terminal_typer::Script::lint(source, &AssetCatalog::builtin());
    assert_eq!(warnings.len(), 1);
    let ScriptWarning::UnknownImage { name, span } = &warnings[0];
    assert_eq!(name, "kitten");
    assert_eq!(&source[span.range()], "{{kitten}}");
}
