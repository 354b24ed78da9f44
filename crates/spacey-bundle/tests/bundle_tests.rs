//! Bundle integration tests
//!
//! Exercises the full path from a module directory to a stored bundle using
//! the fixture modules under tests/fixtures.

use spacey_bundle::{
    App, BundleError, ChainProvider, Config, ContentStore, CustomProvider, DirProvider,
    JsonModule, MemoryStore, Minify, Module, Package, Provider, ScriptModule, StoreKind,
    WrapModule, modules_from_dir, resolve,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

const EXPECTED_BUNDLE: &str = "define(\"a/foo\",\"require('bar')\\nrequire('b/baz')\");
define(\"b/baz\",\"require('bar')\");
define(\"bar\",\"bar\");
";

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[test]
fn test_dir_bundle_url_and_content() {
    let store = Arc::new(MemoryStore::new());
    let app = App::new(store.clone())
        .with_mount_path("r")
        .with_provider(Arc::new(DirProvider::new(fixtures())));

    let url = app.modules_url(&["a/foo"]).unwrap();
    assert_eq!(url, "/r/a102771.js");

    let content = store.get("a102771").unwrap().unwrap();
    assert_eq!(std::str::from_utf8(&content).unwrap(), EXPECTED_BUNDLE);
}

#[test]
fn test_dir_bundle_with_two_roots() {
    let store = Arc::new(MemoryStore::new());
    let app = App::new(store.clone())
        .with_mount_path("/r/")
        .with_provider(Arc::new(DirProvider::new(fixtures())));

    // Same closure, so the same bundle, minted under its own cache entry.
    assert_eq!(app.modules_url(&["a/foo", "b/baz"]).unwrap(), "/r/a102771.js");
    assert_eq!(app.modules_url(&["a/foo"]).unwrap(), "/r/a102771.js");
    assert_eq!(app.modules_url(&["a/foo", "b/baz"]).unwrap(), "/r/a102771.js");
    assert_eq!(store.len(), 1);

    let content = store.get("a102771").unwrap().unwrap();
    assert_eq!(std::str::from_utf8(&content).unwrap(), EXPECTED_BUNDLE);
}

#[test]
fn test_modules_from_dir_as_owned_modules() {
    let mut app = App::new(Arc::new(MemoryStore::new()));
    for module in modules_from_dir(fixtures()).unwrap() {
        app = app.with_module(module);
    }
    assert_eq!(app.modules_url(&["a/foo"]).unwrap(), "/r/a102771.js");
}

#[test]
fn test_resolve_fixture_closure() {
    let provider = DirProvider::new(fixtures());
    let resolved = resolve(&["a/foo"], &provider).unwrap();
    let expected: HashSet<String> = ["a/foo", "b/baz", "bar"].iter().map(|s| s.to_string()).collect();
    assert_eq!(resolved, expected);
}

#[test]
fn test_app_overrides_directory_module() {
    let store = Arc::new(MemoryStore::new());
    let app = App::new(store.clone())
        .with_module(Arc::new(ScriptModule::new("bar", "override")))
        .with_provider(Arc::new(DirProvider::new(fixtures())));

    let url = app.modules_url(&["b/baz"]).unwrap();
    let key = url.trim_start_matches("/r/").trim_end_matches(".js");
    let content = store.get(key).unwrap().unwrap();
    assert!(std::str::from_utf8(&content).unwrap().contains("define(\"bar\",\"override\");"));
}

#[test]
fn test_json_module_in_bundle() {
    let mut custom = CustomProvider::new();
    custom
        .add(Arc::new(JsonModule::new("config", &serde_json::json!({"answer": 42}))))
        .unwrap();
    let provider = ChainProvider::new().with_provider(Arc::new(custom));

    let content = Package::new(&provider, vec!["config".to_string()]).content().unwrap();
    assert_eq!(
        String::from_utf8(content).unwrap(),
        "define(\"config\",\"exports.module={\\\"answer\\\":42}\");\n"
    );
}

#[test]
fn test_json_module_nan_fails_bundle() {
    let provider = ChainProvider::new().with_module(Arc::new(JsonModule::new("bad", &f64::NAN)));
    let err = Package::new(&provider, vec!["bad".to_string()]).content().unwrap_err();
    assert!(matches!(err, BundleError::Encode { .. }));
}

#[test]
fn test_wrapped_module_keeps_dependencies() {
    let dir = DirProvider::new(fixtures());
    let baz = dir.module("b/baz").unwrap();
    let wrapped = WrapModule::new(baz, "(function(){", "})()");
    assert_eq!(wrapped.require().unwrap(), vec!["bar"]);
    assert_eq!(&wrapped.content().unwrap()[..], b"(function(){require('bar')})()");
}

#[test]
fn test_config_driven_app() {
    let store_dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.module_dirs = vec![fixtures()];
    config.store = StoreKind::Dir;
    config.store_dir = Some(store_dir.path().to_path_buf());
    config.minify = Minify::None;

    let app = App::from_config(&config).unwrap();
    assert_eq!(app.modules_url(&["a/foo"]).unwrap(), "/r/a102771.js");

    let on_disk = std::fs::read_to_string(store_dir.path().join("a102771.js")).unwrap();
    assert_eq!(on_disk, EXPECTED_BUNDLE);
}

#[test]
fn test_minified_app() {
    let mut config = Config::default();
    config.module_dirs = vec![fixtures()];
    config.minify = Minify::JsMin;

    // The fixtures carry no removable whitespace once trimmed.
    let app = App::from_config(&config).unwrap();
    assert_eq!(app.modules_url(&["a/foo"]).unwrap(), "/r/a102771.js");

    let prelude = app.script_prelude().unwrap();
    assert!(prelude.len() < spacey_bundle::PRELUDE.len());
}
