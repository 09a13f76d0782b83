//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/revlens/config.toml)
//! 3. Directory config (./revlens.toml)
//! 4. Environment variables (REVLENS_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{LensError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → directory → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Merge global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        // Merge directory config
        let local_path = Self::local_config_path();
        if local_path.exists() {
            debug!("Loading directory config from: {}", local_path.display());
            figment = figment.merge(Toml::file(&local_path));
        }

        // Merge environment variables (e.g., REVLENS_LLM_MODEL -> llm.model)
        figment = figment.merge(Env::prefixed("REVLENS_").split('_').lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| LensError::Config(format!("Configuration error: {}", e)))?;

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| LensError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/revlens/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("revlens"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to the per-directory config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("revlens.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        // Global config
        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:    {} {}", exists, global.display());
        } else {
            println!("  Global:    (not available)");
        }

        // Directory config
        let local = Self::local_config_path();
        let exists = if local.exists() { "✓" } else { "✗" };
        println!("  Directory: {} {}", exists, local.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            // Pretty print in TOML format
            println!(
                "{}",
                toml::to_string_pretty(&config).map_err(|e| LensError::Config(e.to_string()))?
            );
        }

        Ok(())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a commented default config, globally or into the current directory
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let config_path = if global {
            let global_dir = Self::global_dir().ok_or_else(|| {
                LensError::Config("Cannot determine global config directory".to_string())
            })?;
            fs::create_dir_all(&global_dir)?;
            global_dir.join("config.toml")
        } else {
            Self::local_config_path()
        };

        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_content())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Generate default config content (TOML)
    fn default_config_content() -> String {
        r#"# revlens configuration
# Values here override the built-in defaults; REVLENS_* environment
# variables override both. API keys are read only from the environment
# (GEMINI_API_KEY, OPENAI_API_KEY) and never belong in this file.

# Input column headers
[columns]
date = "InvoiceDate"
quantity = "Quantity"
unit_price = "UnitPrice"
country = "Country"
description = "Description"
customer_id = "CustomerID"

# Anomaly detector
[detector]
contamination = 0.01
seed = 42

# Revenue rankings
[ranking]
top_n = 10

# Insight generation
[llm]
provider = "gemini"
model = "gemini-2.0-flash"
timeout_secs = 60
max_retries = 2
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file_merges_over_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("revlens.toml");
        fs::write(
            &path,
            r#"
[detector]
contamination = 0.05

[llm]
model = "gemini-2.5-pro"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.detector.contamination, 0.05);
        assert_eq!(config.llm.model, "gemini-2.5-pro");
        // Untouched sections keep their defaults
        assert_eq!(config.detector.seed, 42);
        assert_eq!(config.columns.quantity, "Quantity");
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("revlens.toml");
        fs::write(&path, "[detector]\ncontamination = 0.9\n").unwrap();

        assert!(ConfigLoader::load_from_file(&path).is_err());
    }

    #[test]
    fn test_env_override() {
        // SAFETY: This test runs in isolation
        unsafe {
            std::env::set_var("REVLENS_LLM_MODEL", "test-model");
        }
        let config = ConfigLoader::load().unwrap();
        assert_eq!(config.llm.model, "test-model");
        unsafe {
            std::env::remove_var("REVLENS_LLM_MODEL");
        }
    }

    #[test]
    fn test_init_writes_config_file() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: This test runs in isolation
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }

        let path = ConfigLoader::init(true, false).unwrap();
        assert!(path.exists());

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert!(config.validate().is_ok());

        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
        }
    }
}
