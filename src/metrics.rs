//! Fit-quality metrics between a predicted and a measured recording.
//!
//! All metrics skip the warm-up samples of the estimate (`estimate.cheat_n`)
//! when forming the error, but normalize by the standard deviation of the
//! *whole* measured output:
//!
//! ```text
//! RMS  = sqrt(mean((y[c:] - yhat[c:])^2))         over samples and features
//! NRMS = RMS / std(y, axis=0)                      per output feature
//! BFR  = 100 * (1 - NRMS)
//! VAF  = 100 * (1 - NRMS)
//! ```
//!
//! With `multi_average` the per-feature NRMS is averaged into a scalar.
//! BFR and VAF can go negative once NRMS exceeds 1.

use crate::error::{DataError, Result};
use crate::sequence::SystemData;
use ndarray::{Array1, Axis};
use serde::Serialize;
use std::fmt;

/// A metric value: one number, or one number per output feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    Scalar(f64),
    PerFeature(Array1<f64>),
}

impl Metric {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Metric::Scalar(v) => Some(*v),
            Metric::PerFeature(_) => None,
        }
    }

    pub fn as_per_feature(&self) -> Option<&Array1<f64>> {
        match self {
            Metric::Scalar(_) => None,
            Metric::PerFeature(v) => Some(v),
        }
    }

    /// Scalar value, or the mean over features.
    pub fn mean(&self) -> f64 {
        match self {
            Metric::Scalar(v) => *v,
            Metric::PerFeature(v) => v.mean().unwrap_or(f64::NAN),
        }
    }

    /// Apply `f` to every value.
    pub fn map<F: Fn(f64) -> f64>(self, f: F) -> Self {
        match self {
            Metric::Scalar(v) => Metric::Scalar(f(v)),
            Metric::PerFeature(v) => Metric::PerFeature(v.mapv(f)),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Scalar(v) => write!(f, "{v}"),
            Metric::PerFeature(v) => write!(f, "{v}"),
        }
    }
}

/// Root-mean-square error over every post-warm-up sample and feature.
///
/// # Errors
///
/// [`DataError::MissingOutput`] if either side has no `y`,
/// [`DataError::LengthMismatch`] if the outputs are not aligned.
pub fn rms(estimate: &SystemData, real: &SystemData) -> Result<f64> {
    let predicted = estimate.output()?.values();
    let measured = real.output()?.values();

    if predicted.nrows() != measured.nrows() {
        return Err(DataError::LengthMismatch {
            field: "y",
            expected: measured.nrows(),
            actual: predicted.nrows(),
        });
    }
    if predicted.ncols() != measured.ncols() {
        return Err(DataError::LengthMismatch {
            field: "ny",
            expected: measured.ncols(),
            actual: predicted.ncols(),
        });
    }

    let start = estimate.cheat_n().min(predicted.nrows());
    let predicted = predicted.slice(ndarray::s![start.., ..]);
    let measured = measured.slice(ndarray::s![start.., ..]);

    let count = predicted.len();
    let sum_sq: f64 = measured
        .iter()
        .zip(predicted.iter())
        .map(|(y, yhat)| (y - yhat).powi(2))
        .sum();
    Ok((sum_sq / count as f64).sqrt())
}

/// RMS normalized by the per-feature standard deviation of `real.y`.
///
/// The standard deviation uses all samples of `real`, warm-up included.
/// A scalar `y` gives a scalar result either way.
pub fn nrms(estimate: &SystemData, real: &SystemData, multi_average: bool) -> Result<Metric> {
    let rms = rms(estimate, real)?;
    let measured = real.output()?;
    let per_feature = measured
        .values()
        .std_axis(Axis(0), 0.0)
        .mapv(|std| rms / std);

    if multi_average {
        Ok(Metric::Scalar(per_feature.mean().unwrap_or(f64::NAN)))
    } else if measured.is_scalar() {
        Ok(Metric::Scalar(per_feature[0]))
    } else {
        Ok(Metric::PerFeature(per_feature))
    }
}

/// Best fit rate, in percent.
pub fn bfr(estimate: &SystemData, real: &SystemData, multi_average: bool) -> Result<Metric> {
    Ok(nrms(estimate, real, multi_average)?.map(|v| 100.0 * (1.0 - v)))
}

/// Variance accounted for, in percent.
///
/// Shares its formula with [`bfr`]. The averaging flag reaches NRMS
/// squared, which for a boolean is the flag itself, so it is forwarded
/// unchanged (see DESIGN.md, open-question decision 5).
pub fn vaf(estimate: &SystemData, real: &SystemData, multi_average: bool) -> Result<Metric> {
    Ok(nrms(estimate, real, multi_average)?.map(|v| 100.0 * (1.0 - v)))
}

/// Weighted average of scalar values.
pub fn weighted_mean_scalar(values: &[f64], weights: &[usize]) -> Result<f64> {
    let total = total_weight(values.len(), weights)?;
    Ok(values
        .iter()
        .zip(weights)
        .map(|(v, &w)| v * w as f64)
        .sum::<f64>()
        / total)
}

/// Weighted average of metric values, element-wise for per-feature metrics.
///
/// # Errors
///
/// [`DataError::MetricShapeMismatch`] when scalar and per-feature values are
/// mixed or per-feature widths differ; [`DataError::ZeroTotalWeight`] when
/// the weights sum to zero.
pub fn weighted_mean(values: &[Metric], weights: &[usize]) -> Result<Metric> {
    let total = total_weight(values.len(), weights)?;

    match values.first() {
        Some(Metric::Scalar(_)) => {
            let scalars = values
                .iter()
                .map(|v| v.as_scalar().ok_or(DataError::MetricShapeMismatch))
                .collect::<Result<Vec<_>>>()?;
            Ok(Metric::Scalar(weighted_mean_scalar(&scalars, weights)?))
        }
        Some(Metric::PerFeature(first)) => {
            let mut acc = Array1::<f64>::zeros(first.len());
            for (value, &w) in values.iter().zip(weights) {
                let v = value
                    .as_per_feature()
                    .filter(|v| v.len() == first.len())
                    .ok_or(DataError::MetricShapeMismatch)?;
                acc.scaled_add(w as f64, v);
            }
            Ok(Metric::PerFeature(acc / total))
        }
        None => Err(DataError::EmptyCollection),
    }
}

fn total_weight(n_values: usize, weights: &[usize]) -> Result<f64> {
    if n_values != weights.len() {
        return Err(DataError::LengthMismatch {
            field: "weights",
            expected: n_values,
            actual: weights.len(),
        });
    }
    let total: usize = weights.iter().sum();
    if total == 0 {
        return Err(DataError::ZeroTotalWeight);
    }
    Ok(total as f64)
}
