//! `seosync.toml` loading.
//!
//! Every field is optional; an absent file means built-in defaults.

use crate::error::ConfigError;
use crate::page_key::{KeyDeriver, PageKey};
use crate::reconcile::AllowList;
use crate::synthesize::SynthesisConfig;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "seosync.toml";

/// What a run does with store entries whose key is also in the sitemap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMatchPolicy {
    /// Leave existing records untouched.
    #[default]
    Preserve,
    /// Replace records that differ from what would be synthesized today.
    Resync,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    pub origin: String,
    /// Relative paths resolve against the run root.
    pub sitemap: PathBuf,
    pub store: PathBuf,
    pub binding: String,
    pub allow_list: Vec<String>,
    pub on_key_match: KeyMatchPolicy,
    pub synthesis: SynthesisConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            origin: "https://dsecuretech.com".to_string(),
            sitemap: PathBuf::from("public/sitemap.xml"),
            store: PathBuf::from("src/utils/seo.ts"),
            binding: "seoConfig".to_string(),
            allow_list: [
                "home", "about", "contact", "services", "pricing", "products", "support", "blog",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            on_key_match: KeyMatchPolicy::Preserve,
            synthesis: SynthesisConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Read and validate `path`. A missing file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Like [`SyncConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<inline>"))
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check every derived value up front so a run fails before reading
    /// inputs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.key_deriver()?;
        self.allow_list()?;
        let ident = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier regex");
        if !ident.is_match(&self.binding) {
            return Err(ConfigError::InvalidBinding(self.binding.clone()));
        }
        Ok(())
    }

    pub fn key_deriver(&self) -> Result<KeyDeriver, ConfigError> {
        KeyDeriver::new(&self.origin)
    }

    pub fn allow_list(&self) -> Result<AllowList, ConfigError> {
        let keys = self
            .allow_list
            .iter()
            .map(|key| PageKey::new(key.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AllowList::new(keys))
    }
}
