//! Configuration module.
//!
//! Layout settings, overscan and anchoring come from a TOML file resolved
//! by [`loader`]; CLI flags are applied on top.

pub mod loader;

pub use loader::{
    apply_cli_overrides, default_config_path, default_log_path, load_config_file,
    load_config_with_precedence, merge_config, ConfigError, ConfigFile, LayoutConfigSection,
    ResolvedConfig,
};
