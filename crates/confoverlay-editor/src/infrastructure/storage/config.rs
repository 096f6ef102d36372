//! TOML settings of the editor itself.
//!
//! Reads and writes `EditorConfig` to the platform-appropriate file:
//! - Windows:  `%APPDATA%\confoverlay\editor.toml`
//! - Linux:    `~/.config/confoverlay/editor.toml`
//! - macOS:    `~/Library/Application Support/confoverlay/editor.toml`
//!
//! Setting `CONFOVERLAY_HOME` replaces the platform directory entirely.
//!
//! These are not index settings.  They tell the editor *where* the index
//! configuration lives and how to behave:
//!
//! ```toml
//! [paths]
//! config_dir = "/home/me/.recoll"
//! system_config = "/usr/share/recoll/examples/recoll.conf"
//! file_name = "recoll.conf"
//!
//! [editor]
//! log_level = "debug"
//! charset_timeout_ms = 1500
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, so a missing
//! or partial file still yields a complete configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the platform config directory.
pub const HOME_ENV: &str = "CONFOVERLAY_HOME";

/// Error type for editor configuration file operations.
#[derive(Debug, Error)]
pub enum EditorConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
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

/// Top-level editor configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EditorConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub editor: EditorSection,
}

/// Where the index configuration files are.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Directory holding the editable configuration file.  Unset means the
    /// platform directory itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<PathBuf>,
    /// Optional read-only system configuration layered below the editable one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_config: Option<PathBuf>,
    /// Name of the editable file inside `config_dir`.
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

/// Editor behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorSection {
    /// `tracing` log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Time allowed for the charset enumeration command.
    #[serde(default = "default_charset_timeout_ms")]
    pub charset_timeout_ms: u64,
    /// Command listing the system character sets, split on whitespace.
    #[serde(default = "default_charset_command")]
    pub charset_command: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_file_name() -> String {
    "index.conf".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_charset_timeout_ms() -> u64 {
    3000
}
fn default_charset_command() -> String {
    "iconv -l".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_dir: None,
            system_config: None,
            file_name: default_file_name(),
        }
    }
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            charset_timeout_ms: default_charset_timeout_ms(),
            charset_command: default_charset_command(),
        }
    }
}

impl EditorConfig {
    /// Path of the editable index configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EditorConfigError::NoPlatformConfigDir`] when no directory is
    /// configured and the platform directory cannot be determined.
    pub fn editable_file(&self) -> Result<PathBuf, EditorConfigError> {
        let dir = match &self.paths.config_dir {
            Some(dir) => dir.clone(),
            None => config_dir()?,
        };
        Ok(dir.join(&self.paths.file_name))
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the directory for the editor's files.
///
/// # Errors
///
/// Returns [`EditorConfigError::NoPlatformConfigDir`] when neither
/// `CONFOVERLAY_HOME` nor the platform base directory is available.
pub fn config_dir() -> Result<PathBuf, EditorConfigError> {
    std::env::var_os(HOME_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(platform_config_dir)
        .ok_or(EditorConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to `editor.toml`.
///
/// # Errors
///
/// As for [`config_dir`].
pub fn config_file_path() -> Result<PathBuf, EditorConfigError> {
    Ok(config_dir()?.join("editor.toml"))
}

/// Loads the editor configuration from its default location.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<EditorConfig, EditorConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `EditorConfig` from `path`, returning defaults if the file does not
/// exist.
///
/// # Errors
///
/// Returns [`EditorConfigError::Io`] for file-system errors other than "not
/// found", and [`EditorConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<EditorConfig, EditorConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(EditorConfig::default()),
        Err(e) => Err(EditorConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`, creating the directory if needed.
///
/// # Errors
///
/// Returns [`EditorConfigError::Io`] for file-system failures or
/// [`EditorConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &EditorConfig, path: &Path) -> Result<(), EditorConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| EditorConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| EditorConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config base directory plus the `confoverlay`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("confoverlay"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("confoverlay"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("confoverlay")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
