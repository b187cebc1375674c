//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge defaults + `config.toml` + `config.<env>.toml` +
//! `APP_*` env vars into [`Settings`].
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub data_dir: String,
    pub key_prefix: String,
    pub chunk_size: usize,
    pub quota_bytes: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.partdb".to_string(),
            key_prefix: "component_db_".to_string(),
            chunk_size: 100,
            quota_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
    pub min_score: u32,
    pub candidate_cap: usize,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self { min_score: 70, candidate_cap: 100 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageSettings,
    pub matcher: MatcherSettings,
}

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    /// Merge built-in defaults, `config.toml`, `config.<env>.toml` found in
    /// `dir`, then `APP_*` environment variables (`__` separates sections).
    pub fn load_from(dir: &Path, env_name: &str) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(dir.join("config.toml")));
        let env_file = match env_name {
            "dev" | "development" => Some("config.dev.toml"),
            "prod" | "production" => Some("config.prod.toml"),
            "test" | "testing" => Some("config.test.toml"),
            _ => None,
        };
        if let Some(file) = env_file {
            figment = figment.merge(Toml::file(dir.join(file)));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        let settings = self.settings()?;
        if settings.storage.chunk_size == 0 {
            return Err(Error::InvalidConfig("storage.chunk_size must be at least 1".into()));
        }
        if settings.matcher.candidate_cap == 0 {
            return Err(Error::InvalidConfig("matcher.candidate_cap must be at least 1".into()));
        }
        if settings.storage.key_prefix.is_empty() {
            return Err(Error::InvalidConfig("storage.key_prefix must not be empty".into()));
        }
        if settings.matcher.min_score > 100 {
            return Err(Error::InvalidConfig(format!(
                "matcher.min_score must be within 0..=100, got {}",
                settings.matcher.min_score
            )));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
