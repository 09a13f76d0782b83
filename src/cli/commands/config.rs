//! Config Command
//!
//! Manage revlens configuration.
//!
//! Usage:
//!   revlens config show [-g] [-f json]
//!   revlens config path
//!   revlens config init [-g] [--force]

use crate::config::ConfigLoader;
use crate::types::Result;

/// Show configuration
pub fn show(global: bool, format: &str) -> Result<()> {
    let as_json = format == "json";

    if global {
        if let Some(global_path) = ConfigLoader::global_config_path() {
            if global_path.exists() {
                let content = std::fs::read_to_string(&global_path)?;
                println!("# Global config: {}\n", global_path.display());
                println!("{content}");
            } else {
                println!("No global config found.");
                println!("Run 'revlens config init --global' to create one.");
            }
        } else {
            println!("Cannot determine global config directory.");
        }
    } else {
        // Show merged effective config
        ConfigLoader::show_config(as_json)?;
    }
    Ok(())
}

/// Show configuration file paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a commented configuration template
pub fn init(global: bool, force: bool) -> Result<()> {
    let written = ConfigLoader::init(global, force)?;
    println!("✓ Wrote configuration template");
    println!("  Config: {}", written.display());
    Ok(())
}
