use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the server's SQLite database
    pub database_path: ConfigValue<PathBuf>,
    /// Directory for the local record cache
    pub data_dir: ConfigValue<PathBuf>,
    /// Port the server listens on
    pub port: ConfigValue<u16>,
    /// Server the CLI talks to
    pub server_url: ConfigValue<String>,
    /// Owner session used by the CLI, if logged in
    #[serde(skip)]
    pub session: ConfigValue<Option<String>>,
    /// Quiet period before an edit is saved remotely
    pub autosave_delay_ms: ConfigValue<u64>,
    /// Origin that serves the public wedding pages
    pub public_base_url: ConfigValue<String>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    port: Option<u16>,
    server_url: Option<String>,
    session: Option<String>,
    autosave_delay_ms: Option<u64>,
    public_base_url: Option<String>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let default_data_dir = Self::default_data_dir();

        // Start with defaults
        let mut database_path = ConfigValue::new(
            default_data_dir.join("weddingcard.db"),
            ConfigSource::Default,
        );
        let mut data_dir = ConfigValue::new(default_data_dir, ConfigSource::Default);
        let mut port = ConfigValue::new(DEFAULT_PORT, ConfigSource::Default);
        let mut server_url = ConfigValue::new(DEFAULT_SERVER_URL.to_string(), ConfigSource::Default);
        let mut session = ConfigValue::new(None, ConfigSource::Default);
        let mut autosave_delay_ms =
            ConfigValue::new(DEFAULT_AUTOSAVE_DELAY_MS, ConfigSource::Default);
        let mut public_base_url =
            ConfigValue::new(DEFAULT_PUBLIC_BASE_URL.to_string(), ConfigSource::Default);
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            // Resolve relative paths against config file's directory
            let resolve = |p: PathBuf| {
                if p.is_relative() {
                    path.parent().map(|dir| dir.join(&p)).unwrap_or(p)
                } else {
                    p
                }
            };

            if let Some(db_path) = file_config.database_path {
                database_path = ConfigValue::new(resolve(db_path), ConfigSource::File);
            }
            if let Some(dir) = file_config.data_dir {
                data_dir = ConfigValue::new(resolve(dir), ConfigSource::File);
            }
            if let Some(p) = file_config.port {
                port = ConfigValue::new(p, ConfigSource::File);
            }
            if let Some(url) = file_config.server_url {
                server_url = ConfigValue::new(url, ConfigSource::File);
            }
            if let Some(s) = file_config.session {
                session = ConfigValue::new(Some(s), ConfigSource::File);
            }
            if let Some(ms) = file_config.autosave_delay_ms {
                autosave_delay_ms = ConfigValue::new(ms, ConfigSource::File);
            }
            if let Some(url) = file_config.public_base_url {
                public_base_url = ConfigValue::new(url, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("WEDDINGCARD_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(dir) = std::env::var("WEDDINGCARD_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Some(p) = std::env::var("WEDDINGCARD_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            port = ConfigValue::new(p, ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("WEDDINGCARD_SERVER_URL") {
            server_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(s) = std::env::var("WEDDINGCARD_SESSION") {
            session = ConfigValue::new(Some(s), ConfigSource::Environment);
        }

        Ok(Self {
            database_path,
            data_dir,
            port,
            server_url,
            session,
            autosave_delay_ms,
            public_base_url,
            config_file,
        })
    }

    /// Directory holding the local record cache
    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.value.join("cache")
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/weddingcard/
    /// - macOS: ~/Library/Application Support/weddingcard/
    /// - Windows: %APPDATA%/weddingcard/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("weddingcard")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/weddingcard/
    /// - macOS: ~/Library/Application Support/weddingcard/
    /// - Windows: %APPDATA%/weddingcard/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("weddingcard")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }

    /// Writes `session` into the config file, keeping other keys.
    ///
    /// Used after login so later commands run as the same owner.
    pub fn save_session(path: &Path, session: &str) -> Result<(), ConfigError> {
        let mut doc: serde_yaml::Mapping = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e))?;
            serde_yaml::from_str::<Option<serde_yaml::Mapping>>(&contents)
                .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?
                .unwrap_or_default()
        } else {
            serde_yaml::Mapping::new()
        };

        doc.insert("session".into(), session.into());

        let contents =
            serde_yaml::to_string(&doc).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(path.to_path_buf(), e))?;
        }
        std::fs::write(path, contents).map_err(|e| ConfigError::WriteError(path.to_path_buf(), e))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    WriteError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::WriteError(path, e) => {
                write!(f, "Failed to write config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
