//! Config-driven dataset preparation.
//!
//! Connects the preprocessing steps in the order a training run needs them:
//!
//! ```text
//! raw data → down_sample_by_average → train_test_split → fit normalizer (train)
//!                                                              ↓
//!                          window(train), window(test) ← transform(train, test)
//! ```
//!
//! The normalizer only ever sees training samples, so test statistics never
//! leak into the model inputs.
//!
//! # Example
//!
//! ```ignore
//! use sysid_data::prelude::*;
//!
//! let pipeline = DataPipeline::from_config(DataConfig::load_toml("run.toml")?)?;
//! let output = pipeline.process(&data)?;
//! output.export("out/", "silverbox", pipeline.config())?;
//! ```
//!
//! # Output Structure
//!
//! | Field | Type | Description |
//! |-------|------|-------------|
//! | `normalizer` | `SystemDataNorm` | Statistics fitted on the training half |
//! | `train` / `test` | container | Preprocessed halves |
//! | `train_windows` / `test_windows` | `WindowedData` | Tensors ready for a model |
//! | `validation` | `ValidationResult` | Findings on the raw input |

use crate::config::DataConfig;
use crate::error::Result;
use crate::export::NumpyExporter;
use crate::preprocessing::{Normalizable, SystemDataNorm};
use crate::sequence::{WindowableSequence, WindowedData};
use crate::validation::{DataValidator, Validate, ValidationResult};
use log::{debug, info, warn};
use std::path::Path;

/// Everything produced by one [`DataPipeline::process`] call.
#[derive(Debug, Clone)]
pub struct PipelineOutput<D> {
    pub normalizer: SystemDataNorm,
    pub train: D,
    pub test: D,
    pub train_windows: WindowedData,
    pub test_windows: WindowedData,
    pub validation: ValidationResult,
}

impl<D: WindowableSequence> PipelineOutput<D> {
    /// Write window tensors, normalizer and both preprocessed halves.
    ///
    /// Creates under `output_dir`:
    /// - `{name}_train_*.npy`, `{name}_test_*.npy` with their metadata
    /// - `{name}_norm.json`
    /// - `{name}_train.npz`, `{name}_test.npz`
    pub fn export<P: AsRef<Path>>(&self, output_dir: P, name: &str, config: &DataConfig) -> Result<()> {
        let exporter = NumpyExporter::new(output_dir.as_ref());
        exporter.export(&format!("{name}_train"), &self.train_windows, &config.window)?;
        exporter.export(&format!("{name}_test"), &self.test_windows, &config.window)?;
        exporter.export_normalizer(name, &self.normalizer)?;

        self.train
            .save(output_dir.as_ref().join(format!("{name}_train.npz")))?;
        self.test
            .save(output_dir.as_ref().join(format!("{name}_test.npz")))?;

        info!(
            "Exported {} train / {} test windows to {}",
            self.train_windows.n_windows(),
            self.test_windows.n_windows(),
            output_dir.as_ref().display()
        );
        Ok(())
    }
}

/// Preparation pipeline driven by a [`DataConfig`].
#[derive(Debug, Clone)]
pub struct DataPipeline {
    config: DataConfig,
    validator: DataValidator,
}

impl DataPipeline {
    /// Validate `config` and build the pipeline.
    pub fn from_config(config: DataConfig) -> Result<Self> {
        config.validate()?;
        let validator = DataValidator::new().with_window(config.window);
        Ok(Self { config, validator })
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Run every configured stage on `data`.
    ///
    /// Validation findings are logged and returned, never fatal; the stages
    /// themselves fail on the first error.
    pub fn process<D>(&self, data: &D) -> Result<PipelineOutput<D>>
    where
        D: WindowableSequence + Normalizable<Output = D> + Validate + Clone,
    {
        let validation = data.validate_with(&self.validator);
        for error in validation.errors() {
            warn!("validation error: {error}");
        }
        for warning in validation.warnings() {
            warn!("validation warning: {warning}");
        }

        let data = match self.config.preprocess.down_sample {
            Some(factor) if factor > 1 => {
                let sampled = data.down_sample_by_average(factor)?;
                info!(
                    "Down-sampled by {factor}: {} -> {} samples",
                    data.n_samples(),
                    sampled.n_samples()
                );
                sampled
            }
            _ => data.clone(),
        };

        let (train, test) = data.train_test_split(self.config.split.test_fraction)?;
        info!(
            "Split {} samples into {} train / {} test",
            data.n_samples(),
            train.n_samples(),
            test.n_samples()
        );

        let (normalizer, train, test) = if !self.config.preprocess.normalize {
            (SystemDataNorm::new(), train, test)
        } else if data.is_normed() {
            warn!("input is already normalized, skipping normalization");
            (SystemDataNorm::new(), train, test)
        } else {
            let normalizer = SystemDataNorm::fitted(&train)?;
            info!("Fitted {normalizer}");
            let train = normalizer.transform(&train)?;
            let test = normalizer.transform(&test)?;
            (normalizer, train, test)
        };

        let train_windows = train.to_windows(&self.config.window)?;
        let test_windows = test.to_windows(&self.config.window)?;
        debug!(
            "{} windows: {} train, {} test",
            self.config.window.format,
            train_windows.n_windows(),
            test_windows.n_windows()
        );

        Ok(PipelineOutput {
            normalizer,
            train,
            test,
            train_windows,
            test_windows,
            validation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PreprocessConfig, WindowConfig};
    use crate::sequence::{SystemData, WindowFormat};
    use ndarray::Array1;

    fn sine_data(n: usize) -> SystemData {
        let u = Array1::from_iter((0..n).map(|i| (i as f64 * 0.1).sin()));
        let y = Array1::from_iter((0..n).map(|i| 2.0 + (i as f64 * 0.1).cos()));
        SystemData::from_io(u, y).unwrap()
    }

    #[test]
    fn test_default_pipeline() {
        let pipeline = DataPipeline::from_config(DataConfig::default()).unwrap();
        let output = pipeline.process(&sine_data(200)).unwrap();

        assert_eq!(output.train.len(), 150);
        assert_eq!(output.test.len(), 50);
        assert!(output.train.is_normed());
        assert!(output.test.is_normed());
        // io windows: k in 10..N
        assert_eq!(output.train_windows.n_windows(), 140);
        assert_eq!(output.test_windows.n_windows(), 40);
        assert!(output.validation.is_valid());
    }

    #[test]
    fn test_normalizer_fitted_on_train_only() {
        let data = sine_data(200);
        let pipeline = DataPipeline::from_config(DataConfig::default()).unwrap();
        let output = pipeline.process(&data).unwrap();

        let (train, _) = data.train_test_split(0.25).unwrap();
        assert_eq!(output.normalizer, SystemDataNorm::fitted(&train).unwrap());
    }

    #[test]
    fn test_down_sample_and_skip_normalize() {
        let config = DataConfig::default()
            .with_preprocess(PreprocessConfig {
                normalize: false,
                down_sample: Some(2),
            })
            .with_window(WindowConfig {
                na: 2,
                nb: 2,
                nf: 3,
                format: WindowFormat::StateSpace,
            });
        let pipeline = DataPipeline::from_config(config).unwrap();
        let output = pipeline.process(&sine_data(200)).unwrap();

        assert!(output.normalizer.is_identity());
        assert!(!output.train.is_normed());
        assert_eq!(output.train.len() + output.test.len(), 100);
        assert_eq!(output.train_windows.format(), WindowFormat::StateSpace);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DataConfig::default();
        config.split.test_fraction = -0.1;
        assert!(DataPipeline::from_config(config).is_err());
    }
}
