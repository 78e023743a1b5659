//! Configuration system for persona-notes
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (PNOTES_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Upper bound for the simulated generation latency
const MAX_LATENCY_MS: u64 = 60_000;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where personas and the selection marker are stored
    pub storage: StorageSettings,

    /// Simulated generation backend
    pub generation: GenerationSettings,

    /// Note image downloads
    pub download: DownloadSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Storage path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Base data directory
    pub data_dir: String,

    /// File name of the persona collection inside `data_dir`
    pub personas_file: String,

    /// File name of the selected-persona marker inside `data_dir`
    pub selection_file: String,
}

/// Generation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Simulated latency of each generation call in milliseconds
    pub latency_ms: u64,
}

/// Image download settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Directory downloaded images are saved to
    pub output_dir: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Largest image body accepted, in bytes
    pub max_bytes: u64,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.persona-notes".to_string(),
            personas_file: "personas.json".to_string(),
            selection_file: "selected-persona.txt".to_string(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self { latency_ms: 2000 }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            timeout_secs: 30,
            max_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.message()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        let search_paths = [
            PathBuf::from("persona-notes.toml"),
            dirs::config_dir()
                .map(|p| p.join("persona-notes").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".persona-notes").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if path.is_file() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PNOTES_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("PNOTES_LATENCY_MS") {
            if let Some(n) = parse_env_override("PNOTES_LATENCY_MS", &val) {
                self.generation.latency_ms = n;
            }
        }
        if let Ok(val) = std::env::var("PNOTES_DOWNLOAD_DIR") {
            self.download.output_dir = val;
        }
        if let Ok(val) = std::env::var("PNOTES_DOWNLOAD_TIMEOUT_SECS") {
            if let Some(n) = parse_env_override("PNOTES_DOWNLOAD_TIMEOUT_SECS", &val) {
                self.download.timeout_secs = n;
            }
        }
        if let Ok(val) = std::env::var("PNOTES_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("PNOTES_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("PNOTES_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and environment variables in configured paths
    fn expand_paths(&mut self) {
        self.storage.data_dir = expand_path(&self.storage.data_dir);
        self.download.output_dir = expand_path(&self.download.output_dir);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.storage.data_dir.trim().is_empty() {
            return Err(Error::Config("storage.data_dir cannot be empty".to_string()));
        }
        for name in [&self.storage.personas_file, &self.storage.selection_file] {
            if name.trim().is_empty() || name.contains(['/', '\\']) {
                return Err(Error::Config(format!(
                    "Invalid storage file name '{}': must be a plain file name",
                    name
                )));
            }
        }

        if self.generation.latency_ms > MAX_LATENCY_MS {
            return Err(Error::Config(format!(
                "generation.latency_ms must be at most {}",
                MAX_LATENCY_MS
            )));
        }

        if self.download.timeout_secs == 0 {
            return Err(Error::Config(
                "download.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.download.max_bytes == 0 {
            return Err(Error::Config(
                "download.max_bytes must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Path of the persona collection file
    pub fn personas_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(&self.storage.personas_file)
    }

    /// Path of the selected-persona marker file
    pub fn selection_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(&self.storage.selection_file)
    }

    /// Directory downloaded images are written to
    pub fn download_dir(&self) -> PathBuf {
        PathBuf::from(&self.download.output_dir)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.generation.latency_ms)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download.timeout_secs)
    }
}

/// Parse a numeric environment override; an unparseable value keeps the
/// configured setting and is logged.
fn parse_env_override<T: std::str::FromStr>(name: &str, val: &str) -> Option<T> {
    match val.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!(var = name, value = %val, "Ignoring unparseable environment override");
            None
        }
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".persona-notes")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

const DEFAULT_CONFIG: &str = r#"# persona-notes configuration

[storage]
# Directory holding the persona collection and the selection marker
data_dir = "~/.persona-notes"
personas_file = "personas.json"
selection_file = "selected-persona.txt"

[generation]
# Simulated latency of each generation call (milliseconds)
latency_ms = 2000

[download]
# Where note images are saved
output_dir = "."

# Request timeout in seconds
timeout_secs = 30

# Largest image accepted, in bytes
max_bytes = 20971520

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.persona-notes/logs/persona-notes.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.generation.latency_ms, 2000);
        assert_eq!(config.storage.personas_file, "personas.json");
        assert_eq!(config.download.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_text_matches_defaults() {
        let parsed: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        let defaults = AppConfig::default();

        assert_eq!(parsed.storage.data_dir, defaults.storage.data_dir);
        assert_eq!(parsed.generation.latency_ms, defaults.generation.latency_ms);
        assert_eq!(parsed.download.timeout_secs, defaults.download.timeout_secs);
        assert_eq!(parsed.download.max_bytes, defaults.download.max_bytes);
        assert_eq!(parsed.logging.level, defaults.logging.level);
    }

    #[test]
    fn test_parse_env_override() {
        assert_eq!(parse_env_override::<u64>("PNOTES_LATENCY_MS", "250"), Some(250));
        assert_eq!(parse_env_override::<u64>("PNOTES_LATENCY_MS", " 7 "), Some(7));
        assert_eq!(parse_env_override::<u64>("PNOTES_DOWNLOAD_TIMEOUT_SECS", "abc"), None);
        assert_eq!(parse_env_override::<u64>("PNOTES_LATENCY_MS", "-1"), None);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.download.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.download.max_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.generation.latency_ms = MAX_LATENCY_MS + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.storage.personas_file = "../personas.json".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = AppConfig::default();
        config.storage.data_dir = "~/notes/data".to_string();
        config.expand_paths();

        assert!(!config.storage.data_dir.contains('~'));
    }

    #[test]
    fn test_storage_paths() {
        let mut config = AppConfig::default();
        config.storage.data_dir = "/var/lib/pn".to_string();

        assert_eq!(config.personas_path(), PathBuf::from("/var/lib/pn/personas.json"));
        assert_eq!(
            config.selection_path(),
            PathBuf::from("/var/lib/pn/selected-persona.txt")
        );
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let err = AppConfig::load(Some("/nonexistent/persona-notes.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[storage]
data_dir = "/tmp/pn-data"

[generation]
latency_ms = 0
"#,
        )
        .unwrap();

        let config = AppConfig::load(path.to_str()).unwrap();
        assert_eq!(config.generation.latency_ms, 0);
        assert_eq!(config.storage.personas_file, "personas.json");
    }

    #[test]
    fn test_load_malformed_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[generation\nlatency_ms = ").unwrap();

        let err = AppConfig::load(path.to_str()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let path_str = path.to_str().unwrap();

        let written = init_config(Some(path_str), false).unwrap();
        assert_eq!(written, path);
        assert!(init_config(Some(path_str), false).is_err());
        assert!(init_config(Some(path_str), true).is_ok());
    }
}
