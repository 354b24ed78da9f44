// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module providers
//!
//! A provider turns a module name into a [`Module`](crate::module::Module).
//! Providers chain: a [`ChainProvider`] checks the modules it owns first and
//! then asks its fallbacks in order, so a call-site can override any module
//! found on disk by registering one with the same name directly.

use crate::error::{BundleError, Result};
use crate::module::{FileModule, ModuleRef};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Resolves module names to modules
pub trait Provider: Send + Sync {
    /// Look up a module by exact name.
    ///
    /// Must return [`BundleError::NotFound`] when the name is unknown so that
    /// chains can fall through to the next provider.
    fn module(&self, name: &str) -> Result<ModuleRef>;
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn module(&self, name: &str) -> Result<ModuleRef> {
        (**self).module(name)
    }
}

/// A provider for dynamically generated modules
#[derive(Default)]
pub struct CustomProvider {
    modules: HashMap<String, ModuleRef>,
}

impl CustomProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module. The first registration of a name wins.
    pub fn add(&mut self, module: ModuleRef) -> Result<()> {
        let name = module.name();
        if name.is_empty() {
            return Err(BundleError::MissingName);
        }
        if self.modules.contains_key(name) {
            return Err(BundleError::AlreadyExists(name.to_string()));
        }
        self.modules.insert(name.to_string(), module);
        Ok(())
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no modules are registered
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Provider for CustomProvider {
    fn module(&self, name: &str) -> Result<ModuleRef> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| BundleError::not_found(name))
    }
}

/// Owned modules first, then fallback providers in registration order
#[derive(Default, Clone)]
pub struct ChainProvider {
    modules: Vec<ModuleRef>,
    providers: Vec<Arc<dyn Provider>>,
}

impl ChainProvider {
    /// Create an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directly owned module, checked before any fallback provider.
    ///
    /// A module with an empty name is dropped with a warning; use
    /// [`try_with_module`](Self::try_with_module) to get the error instead.
    pub fn with_module(mut self, module: ModuleRef) -> Self {
        if let Err(e) = self.push_module(module) {
            warn!("Ignoring module: {}", e);
        }
        self
    }

    /// Add a directly owned module, failing with `MissingName` on an empty name
    pub fn try_with_module(mut self, module: ModuleRef) -> Result<Self> {
        self.push_module(module)?;
        Ok(self)
    }

    /// Append a fallback provider
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Add a directly owned module, failing with `MissingName` on an empty name
    pub fn push_module(&mut self, module: ModuleRef) -> Result<()> {
        if module.name().is_empty() {
            return Err(BundleError::MissingName);
        }
        self.modules.push(module);
        Ok(())
    }

    /// Append a fallback provider
    pub fn push_provider(&mut self, provider: Arc<dyn Provider>) {
        self.providers.push(provider);
    }
}

impl Provider for ChainProvider {
    fn module(&self, name: &str) -> Result<ModuleRef> {
        if let Some(module) = self.modules.iter().find(|m| m.name() == name) {
            return Ok(Arc::clone(module));
        }
        for provider in &self.providers {
            match provider.module(name) {
                Err(err) if err.is_not_found() => continue,
                result => return result,
            }
        }
        Err(BundleError::not_found(name))
    }
}

/// Provides `<root>/<name>.js` as module `name`
#[derive(Debug, Clone)]
pub struct DirProvider {
    root: PathBuf,
}

impl DirProvider {
    /// Create a provider rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory modules are read from
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Provider for DirProvider {
    fn module(&self, name: &str) -> Result<ModuleRef> {
        let relative = Path::new(name);
        let contained = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(BundleError::not_found(name));
        }

        let path = self.root.join(format!("{name}.js"));
        if !path.is_file() {
            return Err(BundleError::not_found(name));
        }
        debug!("Resolved module {} to {}", name, path.display());
        Ok(Arc::new(FileModule::new(name, path)))
    }
}

/// Collect every `.js` file below `root` as a module.
///
/// Modules are named by their path relative to `root` without the extension,
/// using `/` separators, and returned sorted by name.
pub fn modules_from_dir(root: impl AsRef<Path>) -> Result<Vec<ModuleRef>> {
    let root = root.as_ref();
    let mut modules: Vec<ModuleRef> = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "js") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let name = relative
            .with_extension("")
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        modules.push(Arc::new(FileModule::new(name, path)));
    }

    modules.sort_by(|a, b| a.name().cmp(b.name()));
    Ok(modules)
}
