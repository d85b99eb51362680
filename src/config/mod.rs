//! Configuration for chainkb
//!
//! Supports:
//! - TOML configuration files
//! - Environment variable overrides
//! - Multiple config file locations
//!
//! # Configuration File Locations
//!
//! Configuration files are searched in order (first found wins):
//! 1. `./chainkb.toml` - Project-local configuration
//! 2. `~/.config/chainkb/config.toml` - User configuration (XDG)
//! 3. `~/.chainkb/config.toml` - User configuration (legacy)
//! 4. `/etc/chainkb/config.toml` - System-wide configuration
//!
//! # Environment Variables
//!
//! - `CHAINKB_LOG_LEVEL` - Logging verbosity (quiet, normal, verbose, debug)
//! - `CHAINKB_RECORD_SUPPORT_ON_ASSERTED` - Keep derivations of asserted items (true/false)
//! - `CHAINKB_MAX_CLOSURE_STEPS` - Worklist cap per assert (0 = unlimited)
//!
//! # Example Configuration
//!
//! ```toml
//! # chainkb.toml
//!
//! [general]
//! log_level = "verbose"
//!
//! [reasoning]
//! record_support_on_asserted = false
//! max_closure_steps = 0
//! ```

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

// ============================================================================
// Configuration Schema
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct KbConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Reasoning settings
    pub reasoning: ReasoningConfig,
}

/// General configuration options
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Logging level
    pub log_level: LogLevel,
}

/// Knowledge base behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReasoningConfig {
    /// When a derivation lands on an item that is already asserted, keep the
    /// justification pair. Off by default: such merges are a no-op, so
    /// retracting the asserted item removes it and everything that only it
    /// justifies, cycles included.
    pub record_support_on_asserted: bool,
    /// Maximum worklist items processed by one assert (0 = unlimited)
    pub max_closure_steps: usize,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            record_support_on_asserted: false,
            max_closure_steps: 0,
        }
    }
}

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "q" | "0" => Some(LogLevel::Quiet),
            "normal" | "n" | "1" => Some(LogLevel::Normal),
            "verbose" | "v" | "2" => Some(LogLevel::Verbose),
            "debug" | "d" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// The `tracing` filter an embedder's subscriber should use
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::ERROR,
            LogLevel::Normal => LevelFilter::WARN,
            LogLevel::Verbose => LevelFilter::DEBUG,
            LogLevel::Debug => LevelFilter::TRACE,
        }
    }
}

impl KbConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from default locations, then apply env overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(PathBuf::from("<string>"), e.to_string()))
    }

    /// Get the list of config file search paths
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./chainkb.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("chainkb").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".chainkb").join("config.toml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/chainkb/config.toml"));

        paths
    }

    /// Apply environment variable overrides
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("CHAINKB_LOG_LEVEL") {
            if let Some(level) = LogLevel::from_str(&val) {
                self.general.log_level = level;
            }
        }

        if let Ok(val) = env::var("CHAINKB_RECORD_SUPPORT_ON_ASSERTED") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.reasoning.record_support_on_asserted = true,
                "false" | "0" | "no" => self.reasoning.record_support_on_asserted = false,
                _ => {}
            }
        }

        if let Ok(val) = env::var("CHAINKB_MAX_CLOSURE_STEPS") {
            if let Ok(steps) = val.parse::<usize>() {
                self.reasoning.max_closure_steps = steps;
            }
        }
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        fs::write(path, content).map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error reading/writing config file
    IoError(PathBuf, String),
    /// Parse error in config file
    ParseError(PathBuf, String),
    /// Serialization error
    SerializeError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(path, msg) => {
                write!(f, "IO error reading {}: {}", path.display(), msg)
            }
            ConfigError::ParseError(path, msg) => {
                write!(f, "Parse error in {}: {}", path.display(), msg)
            }
            ConfigError::SerializeError(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
