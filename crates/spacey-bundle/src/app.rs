// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Bundle URL minting
//!
//! [`App`] ties the pieces together: it is the provider chain used to
//! resolve modules, owns the content store bundles are written to and the
//! transform applied to them, and remembers which URL each requested module
//! list was minted under.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::config::{Config, Minify, StoreKind};
use crate::error::{BundleError, Result};
use crate::module::ModuleRef;
use crate::package::Package;
use crate::prelude::PRELUDE;
use crate::provider::{ChainProvider, DirProvider, Provider};
use crate::store::{content_key, ContentStore, DirStore, MemoryStore, EXTENSION};
use crate::transform::{self, ClosureCompiler, JsMin, Transform};

/// Separates names in URL cache keys. Module names never contain it.
const KEY_SEPARATOR: &str = "\0";

/// Provider chain, bundle store and URL cache for one application
pub struct App {
    mount_path: String,
    provider: ChainProvider,
    store: Arc<dyn ContentStore>,
    transform: Option<Arc<dyn Transform>>,
    url_cache: DashMap<String, String>,
}

impl App {
    /// Create an app serving bundles from `store` under `/r/`
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            mount_path: "r".to_string(),
            provider: ChainProvider::new(),
            store,
            transform: None,
            url_cache: DashMap::new(),
        }
    }

    /// Build an app from configuration.
    ///
    /// Each configured module directory becomes a fallback [`DirProvider`],
    /// searched in order.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store: Arc<dyn ContentStore> = match config.store {
            StoreKind::Memory => Arc::new(MemoryStore::new()),
            StoreKind::Dir => {
                let dir = config.store_dir.as_ref().ok_or_else(|| {
                    BundleError::Config("store = \"dir\" requires store_dir".to_string())
                })?;
                Arc::new(DirStore::new(dir)?)
            }
        };

        let transform: Option<Arc<dyn Transform>> = match config.minify {
            Minify::None => None,
            Minify::JsMin => Some(Arc::new(JsMin)),
            Minify::Closure => {
                let mut compiler = ClosureCompiler::new(config.closure_level);
                if let Some(endpoint) = &config.closure_endpoint {
                    compiler = compiler.with_endpoint(endpoint.clone());
                }
                Some(Arc::new(compiler))
            }
        };

        let mut app = Self::new(store)
            .with_mount_path(&config.mount_path)
            .with_transform(transform);
        for dir in &config.module_dirs {
            app = app.with_provider(Arc::new(DirProvider::new(dir)));
        }

        info!(
            "Serving bundles under {} from {} module dirs",
            app.mount_prefix(),
            config.module_dirs.len()
        );
        Ok(app)
    }

    /// Set the URL path bundles are served under. Surrounding slashes are
    /// ignored, so `r`, `/r` and `/r/` are equivalent.
    pub fn with_mount_path(mut self, mount_path: &str) -> Self {
        self.mount_path = mount_path.trim_matches('/').to_string();
        self
    }

    /// Add a module checked before any fallback provider.
    ///
    /// A module with an empty name is dropped with a warning.
    pub fn with_module(mut self, module: ModuleRef) -> Self {
        self.provider = self.provider.with_module(module);
        self
    }

    /// Add a module, failing with `MissingName` on an empty name
    pub fn try_with_module(mut self, module: ModuleRef) -> Result<Self> {
        self.provider.push_module(module)?;
        Ok(self)
    }

    /// Append a fallback provider
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider.push_provider(provider);
        self
    }

    /// Set the transform applied to the prelude and to packaged modules
    pub fn with_transform(mut self, transform: Option<Arc<dyn Transform>>) -> Self {
        self.transform = transform;
        self
    }

    /// The bundle store
    pub fn store(&self) -> Arc<dyn ContentStore> {
        Arc::clone(&self.store)
    }

    /// URL path prefix of minted bundles, always ending in `/`
    pub fn mount_prefix(&self) -> String {
        if self.mount_path.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", self.mount_path)
        }
    }

    /// Mint the URL of the bundle holding `names` and their dependencies.
    ///
    /// A module list seen before returns its cached URL without resolving,
    /// packaging or touching the store again. The cache is keyed by the exact
    /// list, so a different order mints again (to the same URL).
    pub fn modules_url<S: AsRef<str>>(&self, names: &[S]) -> Result<String> {
        let cache_key = names
            .iter()
            .map(|n| n.as_ref())
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR);
        if let Some(url) = self.url_cache.get(&cache_key) {
            return Ok(url.value().clone());
        }

        let content = Package::new(self, names.iter().map(|n| n.as_ref().to_string()).collect())
            .with_transform(self.transform.clone())
            .content()?;
        let key = content_key(&content);
        self.store.store(&key, &content)?;

        let url = format!("{}{}{}", self.mount_prefix(), key, EXTENSION);
        debug!("Minted {} for {} modules", url, names.len());
        self.url_cache.insert(cache_key, url.clone());
        Ok(url)
    }

    /// The loader prelude with the transform applied
    pub fn script_prelude(&self) -> Result<Vec<u8>> {
        transform::apply(self.transform.as_ref(), PRELUDE.as_bytes())
    }
}

impl Provider for App {
    fn module(&self, name: &str) -> Result<ModuleRef> {
        self.provider.module(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::ScriptModule;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl ContentStore for CountingStore {
        fn store(&self, key: &str, content: &[u8]) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.store(key, content)
        }

        fn get(&self, key: &str) -> Result<Option<Bytes>> {
            self.inner.get(key)
        }
    }

    struct Upper;

    impl Transform for Upper {
        fn transform(&self, content: &[u8]) -> Result<Vec<u8>> {
            Ok(content.to_ascii_uppercase())
        }
    }

    fn mname() -> ModuleRef {
        Arc::new(ScriptModule::new("mname", "js"))
    }

    #[test]
    fn test_modules_url() {
        let store = Arc::new(MemoryStore::new());
        let app = App::new(store.clone()).with_module(mname());

        assert_eq!(app.modules_url(&["mname"]).unwrap(), "/r/56cc634.js");
        assert_eq!(
            &store.get("56cc634").unwrap().unwrap()[..],
            b"define(\"mname\",\"js\");\n"
        );
    }

    #[test]
    fn test_mount_path_normalization() {
        for (mount, prefix) in [("r", "/r/"), ("/r/", "/r/"), ("/a/b", "/a/b/"), ("", "/"), ("/", "/")] {
            let app = App::new(Arc::new(MemoryStore::new())).with_mount_path(mount);
            assert_eq!(app.mount_prefix(), prefix);
        }

        let app = App::new(Arc::new(MemoryStore::new()))
            .with_mount_path("")
            .with_module(mname());
        assert_eq!(app.modules_url(&["mname"]).unwrap(), "/56cc634.js");
    }

    #[test]
    fn test_url_cache_skips_store() {
        let store = Arc::new(CountingStore::default());
        let app = App::new(store.clone()).with_module(mname());

        let first = app.modules_url(&["mname"]).unwrap();
        let second = app.modules_url(&["mname"]).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_url_cache_key_is_unambiguous() {
        let app = App::new(Arc::new(MemoryStore::new()))
            .with_module(Arc::new(ScriptModule::new("ab", "1")))
            .with_module(Arc::new(ScriptModule::new("a", "2")))
            .with_module(Arc::new(ScriptModule::new("b", "3")));

        let joined = app.modules_url(&["ab"]).unwrap();
        let split = app.modules_url(&["a", "b"]).unwrap();
        assert_ne!(joined, split);
    }

    #[test]
    fn test_empty_module_name_is_rejected() {
        let app = App::new(Arc::new(MemoryStore::new()))
            .try_with_module(Arc::new(ScriptModule::new("", "js")));
        assert!(matches!(app, Err(BundleError::MissingName)));

        let app = App::new(Arc::new(MemoryStore::new()))
            .with_module(Arc::new(ScriptModule::new("", "js")));
        assert!(app.modules_url(&[""]).unwrap_err().is_not_found());
    }

    #[test]
    fn test_missing_module_is_not_cached() {
        let app = App::new(Arc::new(MemoryStore::new()));
        assert!(app.modules_url(&["late"]).unwrap_err().is_not_found());
        assert!(app.url_cache.is_empty());
    }

    #[test]
    fn test_transform_applies_to_modules_and_prelude() {
        let store = Arc::new(MemoryStore::new());
        let app = App::new(store.clone())
            .with_module(mname())
            .with_transform(Some(Arc::new(Upper)));

        let url = app.modules_url(&["mname"]).unwrap();
        let key = url.trim_start_matches("/r/").trim_end_matches(".js");
        let content = store.get(key).unwrap().unwrap();
        assert_eq!(&content[..], b"define(\"mname\",\"JS\");\n");

        let prelude = app.script_prelude().unwrap();
        assert!(prelude.starts_with(b"(FUNCTION(EXPORTS)"));
    }

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mname.js"), "js").unwrap();

        let mut config = Config::default();
        config.module_dirs = vec![dir.path().to_path_buf()];
        config.store = StoreKind::Dir;
        config.store_dir = Some(dir.path().join("bundles"));

        let app = App::from_config(&config).unwrap();
        assert_eq!(app.modules_url(&["mname"]).unwrap(), "/r/56cc634.js");
        assert!(dir.path().join("bundles/56cc634.js").is_file());
    }

    #[test]
    fn test_from_config_dir_store_needs_dir() {
        let mut config = Config::default();
        config.store = StoreKind::Dir;
        assert!(matches!(
            App::from_config(&config),
            Err(BundleError::Config(_))
        ));
    }
}
