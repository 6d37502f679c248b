use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub i18n: I18nConfig,
    #[serde(default)]
    pub compiler: CompilerConfig,
    /// Endpoint of the command-language parser/typechecker. When absent,
    /// legacy-syntax translation and the typecheck compatibility step are
    /// unavailable and requests needing them fail.
    pub language_service: Option<LanguageServiceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for uploaded dataset files, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Spool directory for in-flight upload files; entries are removed as soon
    /// as their pipeline settles
    #[serde(default = "default_upload_path")]
    pub upload_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Bounded capacity of the decoder-to-sink row channel
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Rows accumulated before a bulk insert is flushed
    #[serde(default = "default_insert_batch_size")]
    pub insert_batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct I18nConfig {
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Languages this deployment serves; uploads and reads outside this list
    /// are rejected
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Name of the dataset block emitted by corpus serialization
    #[serde(default = "default_dataset_name")]
    pub dataset_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageServiceConfig {
    pub url: String,
    #[serde(default = "default_language_service_timeout_secs")]
    pub timeout_secs: u64,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

fn default_upload_path() -> PathBuf {
    PathBuf::from(DEFAULT_UPLOAD_PATH)
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_insert_batch_size() -> usize {
    DEFAULT_INSERT_BATCH_SIZE
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_dataset_name() -> String {
    DEFAULT_DATASET_NAME.to_string()
}

fn default_language_service_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            web: WebConfig::default(),
            storage: StorageConfig::default(),
            ingestion: IngestionConfig::default(),
            i18n: I18nConfig::default(),
            compiler: CompilerConfig::default(),
            language_service: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: Some(DEFAULT_MAX_CONNECTIONS),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_path: default_upload_path(),
        }
    }
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            insert_batch_size: default_insert_batch_size(),
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            languages: default_languages(),
        }
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            dataset_name: default_dataset_name(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    /// Whether a language is enabled for this deployment
    pub fn language_enabled(&self, language: &str) -> bool {
        self.i18n.languages.iter().any(|l| l == language)
    }
}
