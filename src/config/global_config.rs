//! Global configuration management
//!
//! Stores the default hash digest and output preferences in
//! ~/.merkle-disclosure/config.toml

use crate::core::error::{DisclosureError, Result};
use crate::crypto::digest::{
    DigestOption, HashDigest, DEFAULT_PROVIDER, ENTROPY_OPTION, LEAF_PREFIX_OPTION,
    NODE_PREFIX_OPTION,
};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Environment variable that points at an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "MERKLE_DISCLOSURE_CONFIG";

/// Global configuration for merkle-disclosure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Digest used when a command is not given one explicitly
    #[serde(default)]
    pub digest: DigestConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
    /// Custom configuration values
    #[serde(flatten)]
    pub custom: HashMap<String, ConfigValue>,
}

/// Default digest settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Provider name, e.g. "Default" or "Nonce"
    pub provider: Option<String>,
    /// Base algorithm name, e.g. "SHA-256"
    pub algorithm: Option<String>,
    /// Nonce entropy (hex encoded, 32 bytes)
    pub entropy: Option<String>,
    /// Tweakable leaf prefix (hex encoded)
    pub leaf_prefix: Option<String>,
    /// Tweakable node prefix (hex encoded)
    pub node_prefix: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON documents
    pub pretty: Option<bool>,
}

/// Configuration value types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Number(i64),
    Boolean(bool),
}

/// Configuration key for setting values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigKey {
    DigestProvider,
    DigestAlgorithm,
    DigestEntropy,
    DigestLeafPrefix,
    DigestNodePrefix,
    OutputPretty,
    Custom(String),
}

impl ConfigKey {
    /// Every built-in key
    pub const KNOWN: [ConfigKey; 6] = [
        ConfigKey::DigestProvider,
        ConfigKey::DigestAlgorithm,
        ConfigKey::DigestEntropy,
        ConfigKey::DigestLeafPrefix,
        ConfigKey::DigestNodePrefix,
        ConfigKey::OutputPretty,
    ];

    pub fn parse(key: &str) -> Option<Self> {
        if key.is_empty() {
            return None;
        }
        Some(match key {
            "digest.provider" => ConfigKey::DigestProvider,
            "digest.algorithm" => ConfigKey::DigestAlgorithm,
            "digest.entropy" => ConfigKey::DigestEntropy,
            "digest.leaf_prefix" => ConfigKey::DigestLeafPrefix,
            "digest.node_prefix" => ConfigKey::DigestNodePrefix,
            "output.pretty" => ConfigKey::OutputPretty,
            _ => ConfigKey::Custom(key.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConfigKey::DigestProvider => "digest.provider",
            ConfigKey::DigestAlgorithm => "digest.algorithm",
            ConfigKey::DigestEntropy => "digest.entropy",
            ConfigKey::DigestLeafPrefix => "digest.leaf_prefix",
            ConfigKey::DigestNodePrefix => "digest.node_prefix",
            ConfigKey::OutputPretty => "output.pretty",
            ConfigKey::Custom(key) => key,
        }
    }
}

impl GlobalConfig {
    /// Load global configuration from disk
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            DisclosureError::configuration(format!("Failed to parse global config: {}", e))
        })
    }

    /// Save global configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            DisclosureError::configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(&config_path, content)?;
        Ok(())
    }

    /// Path of the configuration file; `MERKLE_DISCLOSURE_CONFIG` wins over the home directory
    pub fn get_config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|path| !path.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let user_dirs = UserDirs::new().ok_or(DisclosureError::HomeDirectoryNotFound)?;
        Ok(user_dirs
            .home_dir()
            .join(".merkle-disclosure")
            .join("config.toml"))
    }

    /// Get a configuration value
    pub fn get(&self, key: &ConfigKey) -> Option<ConfigValue> {
        let string = |value: &Option<String>| value.clone().map(ConfigValue::String);
        match key {
            ConfigKey::DigestProvider => string(&self.digest.provider),
            ConfigKey::DigestAlgorithm => string(&self.digest.algorithm),
            ConfigKey::DigestEntropy => string(&self.digest.entropy),
            ConfigKey::DigestLeafPrefix => string(&self.digest.leaf_prefix),
            ConfigKey::DigestNodePrefix => string(&self.digest.node_prefix),
            ConfigKey::OutputPretty => self.output.pretty.map(ConfigValue::Boolean),
            ConfigKey::Custom(key) => self.custom.get(key).cloned(),
        }
    }

    /// Set a configuration value
    pub fn set(&mut self, key: ConfigKey, value: ConfigValue) -> Result<()> {
        match key {
            ConfigKey::DigestProvider => {
                let provider = Self::expect_string(&key, value)?;
                // Validate against a throwaway digest that has every option it could need
                HashDigest::create(&provider, "SHA-256", &Self::probe_options())?;
                self.digest.provider = Some(provider);
            },
            ConfigKey::DigestAlgorithm => {
                let algorithm = Self::expect_string(&key, value)?;
                HashDigest::create(DEFAULT_PROVIDER, &algorithm, &BTreeMap::new())?;
                self.digest.algorithm = Some(algorithm);
            },
            ConfigKey::DigestEntropy => {
                let entropy = Self::expect_hex(&key, value)?;
                if entropy.len() != 64 {
                    return Err(DisclosureError::configuration(
                        "digest.entropy must be a 64-character hex string (32 bytes)",
                    ));
                }
                self.digest.entropy = Some(entropy);
            },
            ConfigKey::DigestLeafPrefix => {
                self.digest.leaf_prefix = Some(Self::expect_hex(&key, value)?);
            },
            ConfigKey::DigestNodePrefix => {
                self.digest.node_prefix = Some(Self::expect_hex(&key, value)?);
            },
            ConfigKey::OutputPretty => {
                if let ConfigValue::Boolean(pretty) = value {
                    self.output.pretty = Some(pretty);
                } else {
                    return Err(DisclosureError::configuration(
                        "output.pretty must be a boolean",
                    ));
                }
            },
            ConfigKey::Custom(key_name) => {
                self.custom.insert(key_name, value);
            },
        }
        Ok(())
    }

    fn expect_string(key: &ConfigKey, value: ConfigValue) -> Result<String> {
        match value {
            ConfigValue::String(text) => Ok(text),
            _ => Err(DisclosureError::configuration(format!(
                "{} must be a string",
                key.as_str()
            ))),
        }
    }

    fn expect_hex(key: &ConfigKey, value: ConfigValue) -> Result<String> {
        let text = Self::expect_string(key, value)?;
        match hex::decode(&text) {
            Ok(bytes) if !bytes.is_empty() => Ok(text.to_lowercase()),
            _ => Err(DisclosureError::configuration(format!(
                "{} must be a non-empty hex string",
                key.as_str()
            ))),
        }
    }

    fn probe_options() -> BTreeMap<String, DigestOption> {
        BTreeMap::from([
            (ENTROPY_OPTION.to_string(), DigestOption::Bytes(vec![0; 32])),
            (LEAF_PREFIX_OPTION.to_string(), DigestOption::Bytes(vec![0])),
            (NODE_PREFIX_OPTION.to_string(), DigestOption::Bytes(vec![1])),
        ])
    }

    /// Unset a configuration value
    pub fn unset(&mut self, key: &ConfigKey) {
        match key {
            ConfigKey::DigestProvider => self.digest.provider = None,
            ConfigKey::DigestAlgorithm => self.digest.algorithm = None,
            ConfigKey::DigestEntropy => self.digest.entropy = None,
            ConfigKey::DigestLeafPrefix => self.digest.leaf_prefix = None,
            ConfigKey::DigestNodePrefix => self.digest.node_prefix = None,
            ConfigKey::OutputPretty => self.output.pretty = None,
            ConfigKey::Custom(key_name) => {
                self.custom.remove(key_name);
            },
        }
    }

    /// List all configuration values, sorted by key
    pub fn list(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = ConfigKey::KNOWN
            .iter()
            .filter_map(|key| {
                self.get(key)
                    .map(|value| (key.as_str().to_string(), value.to_string()))
            })
            .collect();

        for (key, value) in &self.custom {
            entries.push((key.clone(), value.to_string()));
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Digest described by the `[digest]` section
    pub fn hash_digest(&self) -> Result<HashDigest> {
        let provider = self.digest.provider.as_deref().unwrap_or(DEFAULT_PROVIDER);
        let algorithm = self.digest.algorithm.as_deref().unwrap_or("SHA-256");

        let mut options = BTreeMap::new();
        let hex_options = [
            (ENTROPY_OPTION, &self.digest.entropy),
            (LEAF_PREFIX_OPTION, &self.digest.leaf_prefix),
            (NODE_PREFIX_OPTION, &self.digest.node_prefix),
        ];
        for (name, value) in hex_options {
            if let Some(text) = value {
                let bytes = hex::decode(text).map_err(|e| {
                    DisclosureError::configuration(format!("digest option {} is not hex: {}", name, e))
                })?;
                options.insert(name.to_string(), DigestOption::Bytes(bytes));
            }
        }

        HashDigest::create(provider, algorithm, &options)
            .map_err(|e| DisclosureError::configuration(format!("Invalid digest configuration: {}", e)))
    }

    /// Whether JSON output should be pretty-printed
    pub fn pretty_output(&self) -> bool {
        self.output.pretty.unwrap_or(true)
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            digest: DigestConfig::default(),
            output: OutputConfig::default(),
            custom: HashMap::new(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            provider: Some(DEFAULT_PROVIDER.to_string()),
            algorithm: Some("SHA-256".to_string()),
            entropy: None,
            leaf_prefix: None,
            node_prefix: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: Some(true) }
    }
}

impl ConfigValue {
    /// Interpret command-line text as a number, a boolean or a string
    pub fn parse(value_str: &str) -> Self {
        if let Ok(num) = value_str.parse::<i64>() {
            return ConfigValue::Number(num);
        }

        match value_str.to_lowercase().as_str() {
            "true" | "yes" | "on" => return ConfigValue::Boolean(true),
            "false" | "no" | "off" => return ConfigValue::Boolean(false),
            _ => {},
        }

        ConfigValue::String(value_str.to_string())
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Number(n) => write!(f, "{}", n),
            ConfigValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}
