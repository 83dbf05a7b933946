//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.chatrelay/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::inference::DEFAULT_OPENAI_BASE_URL;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub bind: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line. `None` means the flag was not passed.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub bind: Option<String>,
    pub log_level: Option<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Where a loaded configuration came from.
///
/// Loading runs before the logger exists, so it reports this instead of
/// logging; `main` logs it once logging is up.
#[derive(Debug)]
pub enum ConfigSource {
    /// Read from an existing file.
    File(PathBuf),
    /// No file existed; a commented-out default was written.
    Generated(PathBuf),
    /// No file existed and the default could not be written.
    NotWritten { path: PathBuf, error: std::io::Error },
    /// The home directory is unknown, so no file was consulted.
    NoHomeDir,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "loaded config from {}", path.display()),
            ConfigSource::Generated(path) => {
                write!(f, "no config file found, generated default at {}", path.display())
            }
            ConfigSource::NotWritten { path, error } => write!(
                f,
                "no config file found, failed to write default at {}: {error}",
                path.display()
            ),
            ConfigSource::NoHomeDir => {
                write!(f, "could not determine home directory, using default config")
            }
        }
    }
}

/// A parsed config file together with where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: RelayConfig,
    pub source: ConfigSource,
}

/// Returns the path to `~/.chatrelay/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chatrelay").join("config.toml"))
}

/// Load config from `~/.chatrelay/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RelayConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<LoadedConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(LoadedConfig {
            config: RelayConfig::default(),
            source: ConfigSource::NoHomeDir,
        }),
    }
}

pub fn load_config_from(path: &Path) -> Result<LoadedConfig, ConfigError> {
    if !path.exists() {
        let source = match generate_default_config(path) {
            Ok(()) => ConfigSource::Generated(path.to_path_buf()),
            Err(error) => ConfigSource::NotWritten {
                path: path.to_path_buf(),
                error,
            },
        };
        return Ok(LoadedConfig {
            config: RelayConfig::default(),
            source,
        });
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RelayConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    Ok(LoadedConfig {
        config,
        source: ConfigSource::File(path.to_path_buf()),
    })
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) -> std::io::Result<()> {
    let default_content = r#"# chatrelay configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# bind = "127.0.0.1:3000"            # Or set CHATRELAY_BIND

# [openai]
# api_key = "sk-..."                 # Or set OPENAI_API_KEY env var
# base_url = "https://api.openai.com/v1"

# [logging]
# level = "info"                     # "error", "warn", "info", "debug", "trace"
# file = "chatrelay.log"             # Also log to this file
"#;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, default_content)
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &RelayConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as `resolve`, reading environment variables through `env`.
pub fn resolve_with_env(
    config: &RelayConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Bind address: CLI → env → config → default
    let bind = cli
        .bind
        .clone()
        .or_else(|| env("CHATRELAY_BIND"))
        .or_else(|| config.server.bind.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    // OpenAI API key: env → config
    let openai_api_key = env("OPENAI_API_KEY")
        .or_else(|| config.openai.api_key.clone())
        .filter(|key| !key.trim().is_empty());

    // OpenAI base URL: env → config → default
    let openai_base_url = env("OPENAI_BASE_URL")
        .or_else(|| config.openai.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

    // Log level: CLI → env → config → default
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| env("CHATRELAY_LOG_LEVEL"))
        .or_else(|| config.logging.level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    ResolvedConfig {
        bind,
        openai_api_key,
        openai_base_url,
        log_level,
        log_file: config.logging.file.as_ref().map(PathBuf::from),
    }
}
