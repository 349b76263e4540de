use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::kernel::runtime::RuntimeInfo;
use crate::storage::error::StorageSystemError;

type Result<T> = std::result::Result<T, StorageSystemError>;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Parse a document in this format into any deserializable type
    pub fn parse<T: DeserializeOwned>(&self, data: &str) -> Result<T> {
        let deserialization_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            StorageSystemError::DeserializationError {
                format: self.extension().to_string(),
                source,
            }
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| deserialization_error(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| deserialization_error(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| deserialization_error(Box::new(e))),
        }
    }

    /// Render any serializable value in this format
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let serialization_error = |source: Box<dyn std::error::Error + Send + Sync>| {
            StorageSystemError::SerializationError {
                format: self.extension().to_string(),
                source,
            }
        };
        match self {
            ConfigFormat::Json => serde_json::to_string_pretty(value).map_err(|e| serialization_error(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(value).map_err(|e| serialization_error(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| serialization_error(Box::new(e))),
        }
    }
}

/// Reads a file and parses it according to its extension.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
    })?;
    if !path.exists() {
        return Err(StorageSystemError::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)
        .map_err(|e| StorageSystemError::io(e, "read_to_string", path.to_path_buf()))?;
    format.parse(&content)
}

/// Configuration data stored alongside an installed module.
///
/// The engine persists it as the registry row's JSON `data` blob and never
/// interprets the values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    /// Raw configuration values
    #[serde(flatten)]
    values: BTreeMap<String, serde_json::Value>,
}

impl ConfigData {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Get a configuration value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.values.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| StorageSystemError::SerializationError {
            format: "json".to_string(),
            source: Box::new(e),
        })?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Remove a configuration value
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all keys
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge with another config, overriding existing values
    pub fn merge(&mut self, other: &ConfigData) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }
}

/// Engine configuration, loaded from JSON, YAML or TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Versions reported for the `PHP` and `ProcessWire` pseudo-modules
    pub runtime: RuntimeInfo,
    /// Registry file holding one row per installed module
    pub registry_path: PathBuf,
    /// Directories scanned for module definition files
    pub module_paths: Vec<PathBuf>,
    /// Record debug notices (removed hooks and similar)
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeInfo::default(),
            registry_path: PathBuf::from(constants::DEFAULT_REGISTRY_FILE),
            module_paths: vec![PathBuf::from(constants::DEFAULT_MODULES_DIR)],
            debug: false,
        }
    }
}

impl EngineConfig {
    /// Load the configuration file at `path`.
    ///
    /// Relative registry and module paths are resolved against the directory
    /// containing the configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: EngineConfig = load_file(path)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Prefix relative paths with `base`
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.registry_path.is_relative() {
            self.registry_path = base.join(&self.registry_path);
        }
        for module_path in &mut self.module_paths {
            if module_path.is_relative() {
                *module_path = base.join(&*module_path);
            }
        }
    }
}
