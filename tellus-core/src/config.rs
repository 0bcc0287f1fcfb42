//! Configuration types for the Tellus runtime

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding extra tool search paths
pub const TOOL_PATH_ENV: &str = "TELLUS_TOOL_PATH";

/// Main configuration for the Tellus runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TellusConfig {
    /// Directories scanned for loadable tool libraries
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Descend into subdirectories while scanning
    #[serde(default)]
    pub recursive_scan: bool,

    /// Load every discovered library during initialization
    #[serde(default = "default_true")]
    pub autoload: bool,

    /// Emit per-candidate load messages through the sink
    #[serde(default)]
    pub verbose: bool,
}

fn default_true() -> bool {
    true
}

impl Default for TellusConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            recursive_scan: false,
            autoload: true,
            verbose: false,
        }
    }
}

impl TellusConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (tellus.toml or path from TELLUS_CONFIG_PATH)
    /// 3. Environment variable overrides (TELLUS_ prefix)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is invalid.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Toml},
        };

        let mut figment = Figment::new()
            .merge(Toml::file("tellus.toml"))
            .merge(Env::prefixed("TELLUS_").split("__"));

        if let Ok(path) = std::env::var("TELLUS_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let mut config: TellusConfig = figment.extract().map_err(|e| {
            crate::error::TellusError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.search_paths.extend(paths_from_env());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Toml},
        };

        let config: TellusConfig =
            Figment::new()
                .merge(Toml::file(path))
                .extract()
                .map_err(|e| {
                    crate::error::TellusError::Configuration(format!(
                        "Failed to load configuration file: {}",
                        e
                    ))
                })?;

        Ok(config)
    }

    /// Add a search path
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Set recursive scanning
    pub fn with_recursive_scan(mut self, recursive: bool) -> Self {
        self.recursive_scan = recursive;
        self
    }

    /// Set autoload behaviour
    pub fn with_autoload(mut self, autoload: bool) -> Self {
        self.autoload = autoload;
        self
    }

    /// Set verbose load reporting
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Search paths taken from the TELLUS_TOOL_PATH environment variable
pub fn paths_from_env() -> Vec<PathBuf> {
    match std::env::var_os(TOOL_PATH_ENV) {
        Some(value) => std::env::split_paths(&value).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_autoload_without_paths() {
        let config = TellusConfig::default();
        assert!(config.autoload);
        assert!(config.search_paths.is_empty());
        assert!(!config.recursive_scan);
    }

    #[test]
    fn builder_accumulates_paths() {
        let config = TellusConfig::default()
            .with_search_path("/opt/tellus/tools")
            .with_search_path("./tools")
            .with_recursive_scan(true);

        assert_eq!(config.search_paths.len(), 2);
        assert!(config.recursive_scan);
    }
}
