use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language the cached strings are written in (used in the oracle prompt)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Language the strings are translated into
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Oracle provider settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Persistent cache settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Bulk importer settings
    #[serde(default)]
    pub import: ImportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Oracle provider kind
///
/// Unknown kinds are kept verbatim so a typo in the config file degrades to
/// identity translation instead of refusing to start.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderKind {
    // @provider: Ollama generate endpoint
    #[default]
    Ollama,
    // @provider: OpenAI-compatible chat completions endpoint
    Api,
    // @provider: Anything else, answered locally with the identity mapping
    Unsupported(String),
}

impl ProviderKind {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Api => "OpenAI-compatible API",
            Self::Unsupported(_) => "Unsupported",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Api => "api".to_string(),
            Self::Unsupported(name) => name.clone(),
        }
    }
}

impl From<String> for ProviderKind {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "ollama" => Self::Ollama,
            "api" | "openai" => Self::Api,
            _ => Self::Unsupported(value),
        }
    }
}

impl From<ProviderKind> for String {
    fn from(kind: ProviderKind) -> Self {
        kind.to_lowercase_string()
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

/// Oracle configuration shared by every provider kind
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OracleConfig {
    /// Provider to use for cache misses
    #[serde(default)]
    pub provider: ProviderKind,

    /// Settings for the Ollama provider
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Settings for the OpenAI-compatible provider
    #[serde(default)]
    pub api: ApiConfig,

    /// Maximum number of strings sent in one oracle call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            ollama: OllamaConfig::default(),
            api: ApiConfig::default(),
            batch_size: default_batch_size(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
        }
    }
}

impl OracleConfig {
    /// Batch size with the default applied when unset or zero
    pub fn effective_batch_size(&self) -> usize {
        if self.batch_size == 0 {
            default_batch_size()
        } else {
            self.batch_size
        }
    }

    /// Model name of the active provider
    pub fn get_model(&self) -> String {
        match self.provider {
            ProviderKind::Ollama => self.ollama.model.clone(),
            ProviderKind::Api => self.api.model.clone(),
            ProviderKind::Unsupported(_) => String::new(),
        }
    }
}

/// Ollama service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    /// Full URL of the generate endpoint
    #[serde(default = "default_ollama_api_url")]
    pub api_url: String,

    /// Model name (e.g., "qwen2:7b")
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            api_url: default_ollama_api_url(),
            model: default_ollama_model(),
        }
    }
}

/// OpenAI-compatible service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    /// Full URL of the chat completions endpoint
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Model name
    #[serde(default = "default_api_model")]
    pub model: String,

    /// API key for the service
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Header that carries the key
    ///
    /// `Authorization` sends `Bearer <key>`; any other header name sends the bare key.
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            model: default_api_model(),
            api_key: String::new(),
            auth_header: default_auth_header(),
        }
    }
}

/// Persistent cache configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Path of the SQLite file; the user data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// HTTP server configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bulk importer configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImportConfig {
    /// Language file stem of the source side (e.g. `en_us`)
    #[serde(default = "default_source_locale")]
    pub source_locale: String,

    /// Language file stem of the target side (e.g. `zh_cn`)
    #[serde(default = "default_target_locale")]
    pub target_locale: String,

    /// Archive downloaded when `import` is run without a source
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            source_locale: default_source_locale(),
            target_locale: default_target_locale(),
            archive_url: default_archive_url(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Simplified Chinese".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_temperature() -> f32 {
    0.0
}

fn default_ollama_api_url() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_ollama_model() -> String {
    "qwen2:7b".to_string()
}

fn default_api_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_api_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_auth_header() -> String {
    "Authorization".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_source_locale() -> String {
    "en_us".to_string()
}

fn default_target_locale() -> String {
    "zh_cn".to_string()
}

fn default_archive_url() -> String {
    "https://github.com/CFPAOrg/Minecraft-Mod-Language-Package/releases/latest/download/Minecraft-Mod-Language-Package-1.20.zip".to_string()
}

impl Config {
    /// Load the configuration from `path`, writing a default file first if none exists
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() || self.target_language.trim().is_empty() {
            return Err(anyhow!("Source and target languages must be set"));
        }

        if self.oracle.batch_size == 0 {
            return Err(anyhow!("oracle.batch_size must be a positive integer"));
        }

        if self.oracle.timeout_secs == 0 {
            return Err(anyhow!("oracle.timeout_secs must be a positive integer"));
        }

        match &self.oracle.provider {
            ProviderKind::Ollama => {
                url::Url::parse(&self.oracle.ollama.api_url)
                    .with_context(|| format!("Invalid Ollama api_url: {}", self.oracle.ollama.api_url))?;
            }
            ProviderKind::Api => {
                url::Url::parse(&self.oracle.api.url)
                    .with_context(|| format!("Invalid API url: {}", self.oracle.api.url))?;
                if self.oracle.api.api_key.is_empty() {
                    warn!("No API key configured for the OpenAI-compatible provider");
                }
            }
            ProviderKind::Unsupported(name) => {
                warn!(
                    "Unknown oracle provider '{}': cache misses will be returned untranslated",
                    name
                );
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            oracle: OracleConfig::default(),
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            import: ImportConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
