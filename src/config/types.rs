//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/revlens/) and per-directory (revlens.toml)
//! configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{detector, network, ranking};
use crate::types::{LensError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input column names
    pub columns: ColumnConfig,

    /// Input parsing settings
    pub input: InputConfig,

    /// Anomaly detector settings
    pub detector: DetectorSettings,

    /// Revenue ranking settings
    pub ranking: RankingConfig,

    /// Text-generation provider settings
    pub llm: LlmConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `LensError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(self.detector.contamination > 0.0
            && self.detector.contamination <= detector::MAX_CONTAMINATION)
        {
            return Err(LensError::Config(format!(
                "detector contamination must be in (0.0, {}], got {}",
                detector::MAX_CONTAMINATION,
                self.detector.contamination
            )));
        }

        if self.detector.trees == 0 {
            return Err(LensError::Config(
                "detector trees must be greater than 0".to_string(),
            ));
        }

        if self.detector.max_samples < 2 {
            return Err(LensError::Config(format!(
                "detector max_samples must be at least 2, got {}",
                self.detector.max_samples
            )));
        }

        if self.ranking.top_n == 0 {
            return Err(LensError::Config(
                "ranking top_n must be greater than 0".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 {
            return Err(LensError::Config(
                "llm timeout_secs must be greater than 0".to_string(),
            ));
        }

        if let Some(temp) = self.llm.temperature
            && !(0.0..=2.0).contains(&temp)
        {
            return Err(LensError::Config(format!(
                "llm temperature must be between 0.0 and 2.0, got {temp}"
            )));
        }

        if !matches!(self.llm.provider.as_str(), "gemini" | "openai") {
            return Err(LensError::Config(format!(
                "unknown llm provider '{}'. Valid values: gemini, openai",
                self.llm.provider
            )));
        }

        if self.input.date_formats.is_empty() {
            return Err(LensError::Config(
                "input date_formats must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Column Configuration
// =============================================================================

/// Header names the loader looks for in the input file.
///
/// Defaults match the UCI online-retail export. Date, quantity and unit
/// price are required at load time; the rest enrich the analysis when
/// present and are skipped when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub date: String,
    pub quantity: String,
    pub unit_price: String,
    pub country: String,
    pub description: String,
    pub customer_id: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            date: "InvoiceDate".to_string(),
            quantity: "Quantity".to_string(),
            unit_price: "UnitPrice".to_string(),
            country: "Country".to_string(),
            description: "Description".to_string(),
            customer_id: "CustomerID".to_string(),
        }
    }
}

// =============================================================================
// Input Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Date formats tried in order when parsing the date column.
    /// Formats without a time component parse to midnight.
    pub date_formats: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            date_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%Y-%m-%d %H:%M".to_string(),
                "%m/%d/%Y %H:%M".to_string(),
                "%m/%d/%y %H:%M".to_string(),
                "%d/%m/%Y %H:%M".to_string(),
                "%Y-%m-%d".to_string(),
            ],
        }
    }
}

// =============================================================================
// Detector Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorSettings {
    /// Expected fraction of anomalous weeks, in (0.0, 0.5]
    pub contamination: f64,

    /// RNG seed for reproducible scoring
    pub seed: u64,

    /// Number of isolation trees in the ensemble
    pub trees: usize,

    /// Subsample size per tree
    pub max_samples: usize,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            contamination: detector::DEFAULT_CONTAMINATION,
            seed: detector::DEFAULT_SEED,
            trees: detector::DEFAULT_TREES,
            max_samples: detector::DEFAULT_MAX_SAMPLES,
        }
    }
}

// =============================================================================
// Ranking Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Number of entries in each top-revenue ranking
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: ranking::DEFAULT_TOP_N,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

/// Text-generation provider settings.
///
/// API keys are never part of the configuration. Providers read them from
/// the environment (GEMINI_API_KEY, OPENAI_API_KEY) at construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "gemini" or "openai"
    pub provider: String,

    /// Model name
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum transparent retries for transient network failures
    pub max_retries: u32,

    /// Sampling temperature; the service default when unset
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            max_retries: network::DEFAULT_MAX_RETRIES,
            temperature: None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.columns.date, "InvoiceDate");
        assert_eq!(config.llm.provider, "gemini");
        assert_eq!(config.detector.contamination, 0.01);
        assert_eq!(config.ranking.top_n, 10);
    }

    #[test]
    fn test_contamination_bounds() {
        let mut config = Config::default();

        config.detector.contamination = 0.0;
        assert!(config.validate().is_err());

        config.detector.contamination = 0.51;
        assert!(config.validate().is_err());

        config.detector.contamination = 0.5;
        assert!(config.validate().is_ok());

        config.detector.contamination = 0.005;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut config = Config::default();
        config.llm.provider = "anthropic".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown llm provider"));
    }

    #[test]
    fn test_temperature_bounds() {
        let mut config = Config::default();

        config.llm.temperature = Some(2.5);
        assert!(config.validate().is_err());

        config.llm.temperature = Some(0.7);
        assert!(config.validate().is_ok());

        config.llm.temperature = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_trees_rejected() {
        let mut config = Config::default();
        config.detector.trees = 0;
        assert!(config.validate().is_err());
    }
}
