//! Configuration file loading with precedence handling.

use crate::layout::{AnchorPolicy, LayoutSettings, SettingsError};
use crate::model::{EdgeInsets, Size};
use crate::session::DEFAULT_OVERSCAN;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "CHATLAYOUT_CONFIG";

/// Container width used until the caller reports a real one.
pub const DEFAULT_CONTAINER_WIDTH: f64 = 400.0;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// The `[layout]` table parsed but holds rejected values.
    #[error("Invalid layout settings: {0}")]
    InvalidSettings(#[from] SettingsError),
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/chatlayout/config.toml`.
///
/// ```toml
/// overscan = 300.0
/// anchor = "stick_to_bottom"
///
/// [layout]
/// inter_item_spacing = 6.0
/// estimated_item_size = { width = 320.0, height = 52.0 }
/// additional_insets = { top = 12.0, bottom = 12.0 }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Layout settings table.
    #[serde(default)]
    pub layout: Option<LayoutConfigSection>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Distance above and below the viewport that is measured eagerly.
    #[serde(default)]
    pub overscan: Option<f64>,

    /// Scroll anchoring policy.
    #[serde(default)]
    pub anchor: Option<AnchorPolicy>,

    /// Initial container width.
    #[serde(default)]
    pub container_width: Option<f64>,
}

/// `[layout]` table. Missing keys fall back to [`LayoutSettings::default`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfigSection {
    /// Placeholder size for items without a hint.
    #[serde(default)]
    pub estimated_item_size: Option<Size>,

    /// Gap between consecutive items of a section.
    #[serde(default)]
    pub inter_item_spacing: Option<f64>,

    /// Gap between consecutive sections.
    #[serde(default)]
    pub inter_section_spacing: Option<f64>,

    /// Padding around the whole layout.
    #[serde(default)]
    pub additional_insets: Option<EdgeInsets>,
}

impl LayoutConfigSection {
    /// Validated settings, filling gaps from the defaults.
    ///
    /// # Errors
    /// Any negative or non-finite value.
    pub fn resolve(&self) -> Result<LayoutSettings, SettingsError> {
        let defaults = LayoutSettings::default();
        LayoutSettings::new(
            self.estimated_item_size
                .unwrap_or(defaults.estimated_item_size()),
            self.inter_item_spacing
                .unwrap_or(defaults.inter_item_spacing()),
            self.inter_section_spacing
                .unwrap_or(defaults.inter_section_spacing()),
            self.additional_insets
                .unwrap_or(defaults.additional_insets()),
        )
    }
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Validated layout settings.
    pub settings: LayoutSettings,
    /// Overscan distance for eager measurement.
    pub overscan: f64,
    /// Scroll anchoring policy.
    pub anchor_policy: AnchorPolicy,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Initial container width.
    pub container_width: f64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            settings: LayoutSettings::default(),
            overscan: DEFAULT_OVERSCAN,
            anchor_policy: AnchorPolicy::default(),
            log_file_path: default_log_path(),
            container_width: DEFAULT_CONTAINER_WIDTH,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/chatlayout/chatlayout.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("chatlayout").join("chatlayout.log")
    } else {
        PathBuf::from("chatlayout.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/chatlayout/config.toml` on Unix, appropriate path on
/// other platforms. Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatlayout").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CHATLAYOUT_CONFIG` environment variable
/// 3. Default path `~/.config/chatlayout/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    match std::env::var(CONFIG_ENV_VAR) {
        Ok(env_path) if env_path.is_empty() => {
            return Err(ConfigError::InvalidPath(format!("{CONFIG_ENV_VAR} is empty")));
        }
        Ok(env_path) => return load_config_file(PathBuf::from(env_path)),
        Err(std::env::VarError::NotUnicode(raw)) => {
            return Err(ConfigError::InvalidPath(raw.to_string_lossy().into_owned()));
        }
        Err(std::env::VarError::NotPresent) => {}
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
///
/// # Errors
///
/// [`ConfigError::InvalidSettings`] if the `[layout]` table holds negative or
/// non-finite values.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let settings = match &config.layout {
        Some(layout) => layout.resolve()?,
        None => defaults.settings,
    };

    Ok(ResolvedConfig {
        settings,
        overscan: config.overscan.unwrap_or(defaults.overscan).max(0.0),
        anchor_policy: config.anchor.unwrap_or(defaults.anchor_policy),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        container_width: config.container_width.unwrap_or(defaults.container_width),
    })
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Var path → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    width_override: Option<f64>,
    anchor_override: Option<AnchorPolicy>,
) -> ResolvedConfig {
    if let Some(width) = width_override {
        config.container_width = width;
    }

    if let Some(anchor) = anchor_override {
        config.anchor_policy = anchor;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
