//! Data Validation Module
//!
//! Quality checks on recordings before they reach normalization and
//! windowing, so bad data is reported instead of silently turning into
//! NaN tensors.
//!
//! # Validation Categories
//!
//! 1. **Finite Values**: NaN/Inf detection in `u`, `y` and `x`
//! 2. **Constant Features**: zero standard deviation breaks normalization
//! 3. **Sequence Length**: too short to cut a single window
//!
//! # Usage
//!
//! ```ignore
//! use sysid_data::validation::DataValidator;
//!
//! let validator = DataValidator::default().with_window(config.window);
//! let result = validator.validate_data(&data);
//!
//! if !result.is_valid() {
//!     for warning in result.warnings() {
//!         println!("Warning: {}", warning);
//!     }
//! }
//! ```

use crate::config::WindowConfig;
use crate::sequence::{Signal, SystemData, SystemDataList};
use ndarray::Axis;
use std::fmt;

/// Validation result for a single check.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    /// Data is valid
    Valid,
    /// Data has minor issues (warnings)
    Warning(String),
    /// Data has serious issues (errors)
    Error(String),
}

impl ValidationLevel {
    /// Check if this result indicates valid data.
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationLevel::Valid)
    }

    /// Check if this result is a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationLevel::Warning(_))
    }

    /// Check if this result is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, ValidationLevel::Error(_))
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationLevel::Valid => write!(f, "Valid"),
            ValidationLevel::Warning(msg) => write!(f, "Warning: {msg}"),
            ValidationLevel::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// Aggregated validation result.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    results: Vec<(String, ValidationLevel)>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a validation result.
    pub fn add(&mut self, check_name: &str, level: ValidationLevel) {
        self.results.push((check_name.to_string(), level));
    }

    /// Fold another result in, prefixing its check names.
    pub fn merge(&mut self, prefix: &str, other: ValidationResult) {
        self.results.extend(
            other
                .results
                .into_iter()
                .map(|(name, level)| (format!("{prefix}{name}"), level)),
        );
    }

    /// Check if all validations passed (no errors or warnings).
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|(_, level)| level.is_valid())
    }

    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_warning())
    }

    /// All warnings as `check: message`.
    pub fn warnings(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Warning(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    /// All errors as `check: message`.
    pub fn errors(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Error(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    pub fn all_results(&self) -> &[(String, ValidationLevel)] {
        &self.results
    }

    pub fn check_count(&self) -> usize {
        self.results.len()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|(_, l)| l.is_valid()).count()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.passed_count();
        let total = self.check_count();
        writeln!(f, "Validation: {passed}/{total} checks passed")?;

        for (name, level) in &self.results {
            if !level.is_valid() {
                writeln!(f, "  - {name}: {level}")?;
            }
        }

        Ok(())
    }
}

/// Configuration for data validation.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Check for NaN/Inf values
    pub check_nan_inf: bool,

    /// Warn on features whose standard deviation is below `min_std`
    pub check_constant_features: bool,

    /// Standard deviation treated as zero
    pub min_std: f64,

    /// Window configuration the data must be long enough for
    pub window: Option<WindowConfig>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_nan_inf: true,
            check_constant_features: true,
            min_std: 1e-12,
            window: None,
        }
    }
}

/// Quality checks for containers and collections.
#[derive(Debug, Clone, Default)]
pub struct DataValidator {
    config: ValidationConfig,
}

impl DataValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Also check that every recording can produce at least one window.
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.config.window = Some(window);
        self
    }

    /// Validate a single recording.
    pub fn validate_data(&self, data: &SystemData) -> ValidationResult {
        let mut result = ValidationResult::new();

        if self.config.check_nan_inf {
            self.validate_finite("u", data.u(), &mut result);
            if let Some(y) = data.y() {
                self.validate_finite("y", y, &mut result);
            }
            if let Some(x) = data.x() {
                self.validate_finite("x", x, &mut result);
            }
        }

        if self.config.check_constant_features {
            self.validate_spread("u", data.u(), &mut result);
            if let Some(y) = data.y() {
                self.validate_spread("y", y, &mut result);
            }
        }

        if let Some(window) = &self.config.window {
            self.validate_length(data, window, &mut result);
        }

        result
    }

    /// Validate every member, check names prefixed with `member_<i>.`.
    pub fn validate_list(&self, list: &SystemDataList) -> ValidationResult {
        let mut result = ValidationResult::new();
        for (i, member) in list.iter().enumerate() {
            result.merge(&format!("member_{i}."), self.validate_data(member));
        }
        result
    }

    fn validate_finite(&self, field: &str, signal: &Signal, result: &mut ValidationResult) {
        let values = signal.values();
        let n_nan = values.iter().filter(|v| v.is_nan()).count();
        let n_inf = values.iter().filter(|v| v.is_infinite()).count();

        let check = format!("{field}_finite");
        if n_nan > 0 {
            result.add(
                &check,
                ValidationLevel::Error(format!("{n_nan} NaN values in {field}")),
            );
        } else if n_inf > 0 {
            result.add(
                &check,
                ValidationLevel::Error(format!("{n_inf} infinite values in {field}")),
            );
        } else {
            result.add(&check, ValidationLevel::Valid);
        }
    }

    fn validate_spread(&self, field: &str, signal: &Signal, result: &mut ValidationResult) {
        let values = signal.values();
        let check = format!("{field}_spread");
        if values.nrows() == 0 || values.ncols() == 0 {
            result.add(&check, ValidationLevel::Valid);
            return;
        }

        let constant: Vec<usize> = values
            .std_axis(Axis(0), 0.0)
            .iter()
            .enumerate()
            .filter(|(_, std)| **std < self.config.min_std)
            .map(|(col, _)| col)
            .collect();

        if constant.is_empty() {
            result.add(&check, ValidationLevel::Valid);
        } else {
            result.add(
                &check,
                ValidationLevel::Warning(format!(
                    "constant {field} features {constant:?} will normalize to non-finite values"
                )),
            );
        }
    }

    fn validate_length(&self, data: &SystemData, window: &WindowConfig, result: &mut ValidationResult) {
        let needed = window.min_samples();
        if data.len() < needed {
            result.add(
                "length",
                ValidationLevel::Warning(format!(
                    "{} samples yield no {} windows (need at least {needed})",
                    data.len(),
                    window.format
                )),
            );
        } else {
            result.add("length", ValidationLevel::Valid);
        }
    }
}

/// Containers the validator knows how to check.
pub trait Validate {
    fn validate_with(&self, validator: &DataValidator) -> ValidationResult;
}

impl Validate for SystemData {
    fn validate_with(&self, validator: &DataValidator) -> ValidationResult {
        validator.validate_data(self)
    }
}

impl Validate for SystemDataList {
    fn validate_with(&self, validator: &DataValidator) -> ValidationResult {
        validator.validate_list(self)
    }
}
