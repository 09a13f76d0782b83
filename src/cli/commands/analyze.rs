//! Analyze Command
//!
//! Loads a sales export, runs the weekly analysis, and renders the
//! dashboard panels. No network access; the insight panel belongs to
//! the `insights` command.

use std::path::Path;

use crate::analysis;
use crate::cli::render::{self, Output};
use crate::config::{Config, ConfigLoader};
use crate::loader;
use crate::types::Result;

/// Detector and ranking overrides shared by `analyze` and `insights`
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub sensitivity: Option<f64>,
    pub seed: Option<u64>,
    pub top: Option<usize>,
}

pub fn run(file: &Path, options: &AnalyzeOptions, format: &str) -> Result<()> {
    let config = load_config(options)?;
    let out = Output::new();

    let outcome = loader::load_file(file, &config)?;
    let summary = analysis::run_analysis(&outcome.records, &config)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    render::render_dashboard(&out, &summary, &outcome.dropped);
    Ok(())
}

/// Merged configuration with command-line overrides applied
pub(crate) fn load_config(options: &AnalyzeOptions) -> Result<Config> {
    let mut config = ConfigLoader::load()?;

    if let Some(sensitivity) = options.sensitivity {
        config.detector.contamination = sensitivity;
    }
    if let Some(seed) = options.seed {
        config.detector.seed = seed;
    }
    if let Some(top) = options.top {
        config.ranking.top_n = top;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LensError;

    #[test]
    fn test_overrides_reach_detector_settings() {
        let options = AnalyzeOptions {
            sensitivity: Some(0.05),
            seed: Some(99),
            top: Some(5),
        };

        let config = load_config(&options).unwrap();

        assert_eq!(config.detector.contamination, 0.05);
        assert_eq!(config.detector.seed, 99);
        assert_eq!(config.ranking.top_n, 5);
    }

    #[test]
    fn test_out_of_range_sensitivity_is_rejected() {
        let options = AnalyzeOptions {
            sensitivity: Some(0.9),
            ..AnalyzeOptions::default()
        };

        let err = load_config(&options).unwrap_err();
        assert!(matches!(err, LensError::Config(_)));
    }
}
