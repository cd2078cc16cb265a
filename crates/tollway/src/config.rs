//! Application configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! file (TOML, JSON or YAML by extension), then `TOLLWAY__*` environment
//! variables, e.g. `TOLLWAY__LEDGER__MIN_TRAVEL_PX=120`.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use lane_geometry::ClusterConfig;
use serde::{Deserialize, Serialize};
use toll_ledger::LedgerConfig;
use tracing::info;

use crate::PipelineError;

/// Detector output handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Detections must score strictly above this (after rounding up to
    /// two decimals)
    pub min_confidence: f32,

    /// Detector sees the frame from `roi_start_ratio * height` down
    pub roi_start_ratio: f32,

    /// Move the detection zone start to the region-of-interest start
    pub zone_starts_at_roi: bool,

    /// Class names indexed by detector class index
    pub class_names: Vec<String>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            roi_start_ratio: 1.0 / 3.0,
            zone_starts_at_roi: true,
            class_names: ["2-wheel", "4-wheel", "6-wheel", "6-more-wheel"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// History export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
            format: OutputFormat::Csv,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub clustering: ClusterConfig,
    pub ledger: LedgerConfig,
    pub detector: DetectorConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load defaults, an optional file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix("TOLLWAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.clustering.validate()?;
        self.ledger.validate()?;

        let ratio = self.detector.roi_start_ratio;
        if !(0.0..1.0).contains(&ratio) {
            return Err(PipelineError::Config(format!(
                "detector.roi_start_ratio must be in [0, 1), got {}",
                ratio
            )));
        }
        if !(0.0..1.0).contains(&self.detector.min_confidence) {
            return Err(PipelineError::Config(format!(
                "detector.min_confidence must be in [0, 1), got {}",
                self.detector.min_confidence
            )));
        }
        Ok(())
    }
}
