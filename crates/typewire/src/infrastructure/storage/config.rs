//! TOML-based configuration persistence.
//!
//! Reads and writes [`AppConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\Typewire\config.toml`
//! - Linux:    `$XDG_CONFIG_HOME/typewire/config.toml` or `~/.config/typewire/config.toml`
//! - macOS:    `~/Library/Application Support/Typewire/config.toml`
//!
//! Example file:
//!
//! ```toml
//! [general]
//! arm_delay_secs = 5
//! keystroke_delay_ms = 3
//! injection_mode = "auto"
//! diagnostics = false
//! log_level = "info"
//!
//! [source]
//! kind = "file"
//! last_file_path = 'C:\Users\me\notes.txt'
//! ```
//!
//! # Serde default values
//!
//! Every field has a `#[serde(default = "...")]` so a missing file, a missing
//! section or a missing key all fall back to the defaults.  Numeric values
//! outside their allowed range are clamped by [`AppConfig::clamped`] after
//! loading rather than rejected, so a typo never stops the tool from starting.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use typewire_core::domain::pacing::MAX_BASE_DELAY_MS;
use typewire_core::InjectionMode;

/// Longest countdown before typing starts, in seconds.
pub const MAX_ARM_DELAY_SECS: u32 = 60;

/// File name of the diagnostic log, placed next to `config.toml`.
pub const DIAGNOSTIC_LOG_FILE: &str = "typewire-diag.log";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level application configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Injection behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Countdown before typing starts, so the user can focus the target.
    #[serde(default = "default_arm_delay_secs")]
    pub arm_delay_secs: u32,
    /// Baseline added to every pacing pause.
    #[serde(default = "default_keystroke_delay_ms")]
    pub keystroke_delay_ms: u32,
    #[serde(default)]
    pub injection_mode: InjectionMode,
    /// Record and write a diagnostic report for every run.
    #[serde(default)]
    pub diagnostics: bool,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the text to type comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Clipboard,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,
    /// Most recently typed file, remembered across runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_file_path: Option<PathBuf>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_arm_delay_secs() -> u32 {
    5
}
fn default_keystroke_delay_ms() -> u32 {
    3
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            arm_delay_secs: default_arm_delay_secs(),
            keystroke_delay_ms: default_keystroke_delay_ms(),
            injection_mode: InjectionMode::default(),
            diagnostics: false,
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Returns a copy with every numeric field inside its allowed range.
    pub fn clamped(mut self) -> Self {
        self.general.arm_delay_secs = self.general.arm_delay_secs.min(MAX_ARM_DELAY_SECS);
        self.general.keystroke_delay_ms = self.general.keystroke_delay_ms.min(MAX_BASE_DELAY_MS);
        self
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Path of the append-only diagnostic log.
pub fn diagnostic_log_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(DIAGNOSTIC_LOG_FILE))
}

/// Loads `AppConfig` from the platform config file.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning the defaults if the file does
/// not exist yet.  Out-of-range values are clamped.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg.clamped())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path: path.to_path_buf(), source: e }),
    }
}

/// Persists `config` to the platform config file.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Persists `config` to `path`, creating the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory including the `Typewire`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("Typewire"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("typewire"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME")
            .map(|h| PathBuf::from(h).join("Library").join("Application Support").join("Typewire"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
