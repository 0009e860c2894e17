//! Dataset preparation configuration.
//!
//! A single [`DataConfig`] describes how raw recordings become training
//! tensors, serializable to TOML or JSON so experiments are reproducible.
//!
//! # Example
//!
//! ```ignore
//! use sysid_data::config::{DataConfig, WindowConfig};
//! use sysid_data::sequence::WindowFormat;
//!
//! let config = DataConfig::default().with_window(WindowConfig {
//!     na: 5,
//!     nb: 5,
//!     nf: 20,
//!     format: WindowFormat::Encoder,
//! });
//! config.save_toml("experiment.toml")?;
//!
//! let loaded = DataConfig::load_toml("experiment.toml")?;
//! let pipeline = DataPipeline::from_config(loaded)?;
//! ```

use crate::error::{DataError, Result};
use crate::sequence::WindowFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Unified preparation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Window transform and its lengths
    pub window: WindowConfig,

    /// Train/test split
    pub split: SplitConfig,

    /// Down-sampling and normalization
    pub preprocess: PreprocessConfig,

    /// Experiment metadata (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExperimentMetadata>,
}

/// Window lengths and output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Number of past outputs in a history window
    pub na: usize,

    /// Number of past inputs in a history window
    pub nb: usize,

    /// Future horizon (ignored by `io`)
    pub nf: usize,

    /// Which transform to run
    pub format: WindowFormat,
}

/// Train/test split configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Share of post-warm-up samples that go to the test side
    pub test_fraction: f64,
}

/// Preprocessing applied before windowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Fit a normalizer on the training half and apply it to both halves
    pub normalize: bool,

    /// Block-average down-sampling factor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_sample: Option<usize>,
}

/// Experiment metadata for tracking and reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    /// Experiment name
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    /// Version or git commit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Custom tags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            na: 10,
            nb: 10,
            nf: 5,
            format: WindowFormat::Io,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { test_fraction: 0.25 }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            down_sample: None,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            split: SplitConfig::default(),
            preprocess: PreprocessConfig::default(),
            metadata: None,
        }
    }
}

impl WindowConfig {
    /// Validate window lengths for the selected format.
    pub fn validate(&self) -> std::result::Result<(), String> {
        match self.format {
            WindowFormat::Io => {
                if self.na == 0 && self.nb == 0 {
                    return Err("io windows need na > 0 or nb > 0".to_string());
                }
            }
            WindowFormat::HistFuture | WindowFormat::Encoder => {
                if self.nf == 0 {
                    return Err(format!("{} windows need nf > 0", self.format));
                }
            }
            WindowFormat::StateSpace => {
                if self.nf == 0 {
                    return Err("state_space windows need nf > 0".to_string());
                }
            }
        }
        Ok(())
    }

    /// Samples consumed before the first window can be cut.
    pub fn min_samples(&self) -> usize {
        let hist = self.na.max(self.nb);
        match self.format {
            WindowFormat::Io => hist + 1,
            WindowFormat::HistFuture | WindowFormat::Encoder => hist + self.nf,
            WindowFormat::StateSpace => self.nf,
        }
    }
}

impl SplitConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.test_fraction.is_finite() || !(0.0..=1.0).contains(&self.test_fraction) {
            return Err(format!(
                "test_fraction must lie in [0, 1], got {}",
                self.test_fraction
            ));
        }
        Ok(())
    }
}

impl PreprocessConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.down_sample == Some(0) {
            return Err("down_sample must be > 0".to_string());
        }
        Ok(())
    }
}

impl DataConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set experiment metadata.
    pub fn with_metadata(mut self, metadata: ExperimentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set window configuration.
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Set split configuration.
    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    /// Set preprocessing configuration.
    pub fn with_preprocess(mut self, preprocess: PreprocessConfig) -> Self {
        self.preprocess = preprocess;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// [`DataError::InvalidConfig`] naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        self.window
            .validate()
            .and_then(|_| self.split.validate())
            .and_then(|_| self.preprocess.validate())
            .map_err(DataError::InvalidConfig)
    }

    /// Save configuration to TOML file.
    ///
    /// # Example
    ///
    /// ```ignore
    /// config.save_toml("configs/experiment1.toml")?;
    /// ```
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DataConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DataConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = DataConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.na, 10);
        assert_eq!(config.window.nf, 5);
        assert_eq!(config.split.test_fraction, 0.25);
    }

    #[test]
    fn test_save_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = DataConfig::default()
            .with_window(WindowConfig {
                na: 3,
                nb: 4,
                nf: 7,
                format: WindowFormat::Encoder,
            })
            .with_preprocess(PreprocessConfig {
                normalize: false,
                down_sample: Some(2),
            })
            .with_metadata(ExperimentMetadata {
                name: "test_experiment".to_string(),
                description: Some("Test configuration".to_string()),
                created_at: None,
                version: Some("0.1.0".to_string()),
                tags: Some(vec!["test".to_string()]),
            });

        config.save_toml(&path).unwrap();
        let loaded = DataConfig::load_toml(&path).unwrap();
        assert_eq!(loaded, config);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("format = \"encoder\""));
    }

    #[test]
    fn test_save_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = DataConfig::default();
        config.save_json(&path).unwrap();
        let loaded = DataConfig::load_json(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = DataConfig::default().with_split(SplitConfig { test_fraction: 1.5 });
        assert!(matches!(config.validate(), Err(DataError::InvalidConfig(_))));

        let config = DataConfig::default().with_preprocess(PreprocessConfig {
            normalize: true,
            down_sample: Some(0),
        });
        assert!(config.validate().is_err());

        let config = DataConfig::default().with_window(WindowConfig {
            nf: 0,
            format: WindowFormat::StateSpace,
            ..Default::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        let mut config = DataConfig::default();
        config.preprocess.down_sample = Some(0);
        config.save_toml(&path).unwrap();

        assert!(DataConfig::load_toml(&path).is_err());
    }

    #[test]
    fn test_min_samples() {
        let window = WindowConfig {
            na: 3,
            nb: 5,
            nf: 4,
            format: WindowFormat::HistFuture,
        };
        assert_eq!(window.min_samples(), 9);
        assert_eq!(
            WindowConfig {
                format: WindowFormat::Io,
                ..window
            }
            .min_samples(),
            6
        );
    }
}
