// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration management for spacey-pack.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{BundleError, Result};
use crate::transform::CompilationLevel;

/// Project config file looked up in the working directory
pub const CONFIG_FILE: &str = "spacey-pack.toml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "SPACEY_PACK_";

/// Keys accepted by [`Config::set`]
const KEYS: &[&str] = &[
    "mount-path",
    "module-dirs",
    "minify",
    "closure-level",
    "closure-endpoint",
    "store",
    "store-dir",
    "listen",
    "loglevel",
];

/// Minifier applied to the prelude and to packaged modules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Minify {
    /// Ship content unchanged
    #[default]
    None,
    /// Local jsmin token stripper
    JsMin,
    /// Remote Closure Compiler service
    Closure,
}

/// Where minted bundles are kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// In process memory, lost on restart
    #[default]
    Memory,
    /// One file per bundle under `store_dir`
    Dir,
}

/// Configuration for spacey-pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL path bundles are served under
    pub mount_path: String,

    /// Directories searched for `<name>.js` modules, in order
    pub module_dirs: Vec<PathBuf>,

    /// Minifier
    pub minify: Minify,

    /// Closure Compiler level when `minify = "closure"`
    pub closure_level: CompilationLevel,

    /// Closure Compiler service endpoint override
    pub closure_endpoint: Option<String>,

    /// Bundle store backend
    pub store: StoreKind,

    /// Directory for the `dir` store
    pub store_dir: Option<PathBuf>,

    /// Address the bundle server binds to
    pub listen: String,

    /// Default log filter
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mount_path: "/r/".to_string(),
            module_dirs: Vec::new(),
            minify: Minify::None,
            closure_level: CompilationLevel::Simple,
            closure_endpoint: None,
            store: StoreKind::Memory,
            store_dir: None,
            listen: "127.0.0.1:8080".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Reads `path` if given (it must exist), otherwise `spacey-pack.toml` in
    /// the working directory if present, then applies `SPACEY_PACK_*`
    /// environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE).is_file() => Self::from_file(Path::new(CONFIG_FILE))?,
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| BundleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loading config from {}", path.display());
        Self::from_toml(&content)
    }

    /// Parse TOML config text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BundleError::Config(e.to_string()))
    }

    /// Apply `SPACEY_PACK_*` variables from `vars`.
    ///
    /// `SPACEY_PACK_CONFIG` names the config file and is skipped here.
    /// Unknown keys are logged and ignored; bad values are errors.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(config_key) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let config_key = config_key.to_lowercase().replace('_', "-");
            if config_key == "config" {
                continue;
            }
            if !KEYS.contains(&config_key.as_str()) {
                warn!("Ignoring unknown config variable {}", key);
                continue;
            }
            self.set(&config_key, &value)?;
        }
        Ok(())
    }

    /// Set a configuration value.
    ///
    /// Keys use dashes (`mount-path`); underscores are accepted too.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key.replace('_', "-").as_str() {
            "mount-path" => self.mount_path = value.to_string(),
            "module-dirs" => {
                self.module_dirs = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
                    .collect();
            }
            "minify" => {
                self.minify = match value {
                    "none" => Minify::None,
                    "jsmin" => Minify::JsMin,
                    "closure" => Minify::Closure,
                    other => return Err(invalid(key, other)),
                };
            }
            "closure-level" => {
                self.closure_level = match value {
                    "WHITESPACE_ONLY" | "whitespace" => CompilationLevel::Whitespace,
                    "SIMPLE_OPTIMIZATIONS" | "simple" => CompilationLevel::Simple,
                    "ADVANCED_OPTIMIZATIONS" | "advanced" => CompilationLevel::Advanced,
                    other => return Err(invalid(key, other)),
                };
            }
            "closure-endpoint" => self.closure_endpoint = Some(value.to_string()),
            "store" => {
                self.store = match value {
                    "memory" => StoreKind::Memory,
                    "dir" => StoreKind::Dir,
                    other => return Err(invalid(key, other)),
                };
            }
            "store-dir" => self.store_dir = Some(PathBuf::from(value)),
            "listen" => self.listen = value.to_string(),
            "loglevel" => self.loglevel = value.to_string(),
            _ => return Err(BundleError::Config(format!("unknown config key {key}"))),
        }
        Ok(())
    }
}

fn invalid(key: &str, value: &str) -> BundleError {
    BundleError::Config(format!("invalid value {value:?} for {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mount_path, "/r/");
        assert_eq!(config.listen, "127.0.0.1:8080");
        assert_eq!(config.minify, Minify::None);
        assert_eq!(config.store, StoreKind::Memory);
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            mount_path = "/bundles/"
            module_dirs = ["js", "vendor"]
            minify = "jsmin"
            closure_level = "ADVANCED_OPTIMIZATIONS"
            store = "dir"
            store_dir = "/tmp/bundles"
            "#,
        )
        .unwrap();

        assert_eq!(config.mount_path, "/bundles/");
        assert_eq!(config.module_dirs, vec![PathBuf::from("js"), PathBuf::from("vendor")]);
        assert_eq!(config.minify, Minify::JsMin);
        assert_eq!(config.closure_level, CompilationLevel::Advanced);
        assert_eq!(config.store, StoreKind::Dir);
        assert_eq!(config.listen, "127.0.0.1:8080");
    }

    #[test]
    fn test_from_toml_rejects_unknown_minifier() {
        let err = Config::from_toml(r#"minify = "uglify""#).unwrap_err();
        assert!(matches!(err, BundleError::Config(_)));
    }

    #[test]
    fn test_apply_env() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("SPACEY_PACK_MOUNT_PATH", "/x/"),
                ("SPACEY_PACK_MODULE_DIRS", "a, b"),
                ("SPACEY_PACK_MINIFY", "closure"),
                ("UNRELATED", "ignored"),
            ]))
            .unwrap();

        assert_eq!(config.mount_path, "/x/");
        assert_eq!(config.module_dirs, vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(config.minify, Minify::Closure);
    }

    #[test]
    fn test_apply_env_skips_config_path_and_unknown_keys() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("SPACEY_PACK_CONFIG", "other.toml"),
                ("SPACEY_PACK_NO_SUCH_KEY", "1"),
                ("SPACEY_PACK_LISTEN", "0.0.0.0:9000"),
            ]))
            .unwrap();

        assert_eq!(config.listen, "0.0.0.0:9000");
        assert_eq!(config.mount_path, "/r/");
    }

    #[test]
    fn test_apply_env_rejects_bad_values() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("SPACEY_PACK_STORE", "s3")]))
            .unwrap_err();
        assert!(matches!(err, BundleError::Config(_)));
    }

    #[test]
    fn test_every_key_is_settable() {
        let mut config = Config::default();
        for key in KEYS {
            let value = match *key {
                "minify" => "jsmin",
                "closure-level" => "advanced",
                "store" => "dir",
                _ => "x",
            };
            config.set(key, value).unwrap();
        }
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("store", "s3").is_err());
        assert!(config.set("no-such-key", "1").is_err());
        assert!(config.set("closure_level", "simple").is_ok());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "listen = \"0.0.0.0:9000\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");

        let missing = Config::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, BundleError::Read { .. }));
    }
}
