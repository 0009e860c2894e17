//! Input/output standardization.
//!
//! [`SystemDataNorm`] holds per-feature mean and standard deviation for the
//! input and the output:
//!
//! ```text
//! transform:          u <- (u - u0) / ustd      y <- (y - y0) / ystd
//! inverse_transform:  u <- u * ustd + u0        y <- y * ystd + y0
//! ```
//!
//! A fresh normalizer is the identity (`0, 1, 0, 1`). Fitting pools every
//! sample of every recording before computing statistics, and uses the
//! population standard deviation.
//!
//! Transforms never mutate their input. They check the `normed` flag first
//! so data cannot be normalized twice or denormalized when it is raw; the
//! state `x` passes through untouched.
//!
//! # Usage
//!
//! ```ignore
//! use sysid_data::preprocessing::SystemDataNorm;
//!
//! let mut norm = SystemDataNorm::new();
//! norm.fit(&train)?;
//! let train_n = norm.transform(&train)?;
//! let prediction = norm.inverse_transform(&model_output)?;
//! ```

use crate::error::{DataError, Result};
use crate::sequence::{Signal, SystemData, SystemDataList, WindowableSequence};
use log::debug;
use ndarray::{arr1, concatenate, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Per-feature standardization statistics for `u` and `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDataNorm {
    /// Input mean (length `nu`, or 1 to broadcast)
    pub u0: Array1<f64>,
    /// Input standard deviation
    pub ustd: Array1<f64>,
    /// Output mean (length `ny`, or 1 to broadcast)
    pub y0: Array1<f64>,
    /// Output standard deviation
    pub ystd: Array1<f64>,
}

impl SystemDataNorm {
    /// Identity normalizer: zero means, unit standard deviations.
    pub fn new() -> Self {
        Self {
            u0: arr1(&[0.0]),
            ustd: arr1(&[1.0]),
            y0: arr1(&[0.0]),
            ystd: arr1(&[1.0]),
        }
    }

    /// Normalizer with explicit statistics.
    pub fn with_stats(u0: Array1<f64>, ustd: Array1<f64>, y0: Array1<f64>, ystd: Array1<f64>) -> Self {
        Self { u0, ustd, y0, ystd }
    }

    /// Normalizer fitted on `data`.
    pub fn fitted<T: Normalizable + ?Sized>(data: &T) -> Result<Self> {
        let mut norm = Self::new();
        norm.fit(data)?;
        Ok(norm)
    }

    /// True while the statistics are still the identity defaults.
    pub fn is_identity(&self) -> bool {
        *self == Self::new()
    }

    /// Compute means and standard deviations from every pooled sample.
    ///
    /// # Errors
    ///
    /// [`DataError::MissingOutput`] if a recording has no `y`,
    /// [`DataError::EmptyFit`] if there are no samples.
    pub fn fit<T: Normalizable + ?Sized>(&mut self, data: &T) -> Result<()> {
        let (u, y) = data.training_data()?;
        if u.nrows() == 0 {
            return Err(DataError::EmptyFit);
        }

        self.u0 = u.mean_axis(Axis(0)).ok_or(DataError::EmptyFit)?;
        self.ustd = u.std_axis(Axis(0), 0.0);
        self.y0 = y.mean_axis(Axis(0)).ok_or(DataError::EmptyFit)?;
        self.ystd = y.std_axis(Axis(0), 0.0);

        debug!("fitted normalizer on {} samples: {}", u.nrows(), self);
        Ok(())
    }

    /// Standardized copy of `data`, flagged as normalized.
    pub fn transform<T: Normalizable + ?Sized>(&self, data: &T) -> Result<T::Output> {
        data.normalize_with(self)
    }

    /// Raw-scale copy of normalized `data`.
    pub fn inverse_transform<T: Normalizable + ?Sized>(&self, data: &T) -> Result<T::Output> {
        data.denormalize_with(self)
    }

    /// Write the statistics as JSON.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Read statistics written by [`SystemDataNorm::save_json`].
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn forward(&self, data: &SystemData) -> Result<SystemData> {
        if data.is_normed() {
            return Err(DataError::AlreadyNormalized);
        }
        let u = standardize("u", data.u(), &self.u0, &self.ustd)?;
        let y = data
            .y()
            .map(|y| standardize("y", y, &self.y0, &self.ystd))
            .transpose()?;
        SystemData::new(Some(u), y, data.x().cloned(), data.cheat_n(), true)
    }

    fn backward(&self, data: &SystemData) -> Result<SystemData> {
        if !data.is_normed() {
            return Err(DataError::NotNormalized);
        }
        let u = destandardize("u", data.u(), &self.u0, &self.ustd)?;
        let y = data
            .y()
            .map(|y| destandardize("y", y, &self.y0, &self.ystd))
            .transpose()?;
        SystemData::new(Some(u), y, data.x().cloned(), data.cheat_n(), false)
    }
}

impl Default for SystemDataNorm {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SystemDataNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "norm: u0={},ustd={},y0={},ystd={}",
            self.u0, self.ustd, self.y0, self.ystd
        )
    }
}

/// Broadcast `mean`/`std` over the columns of `signal`.
fn broadcast_stats<'a>(
    field: &'static str,
    signal: &Signal,
    stats: &'a Array1<f64>,
) -> Result<ndarray::ArrayView2<'a, f64>> {
    let values = signal.values();
    stats
        .broadcast(values.raw_dim())
        .ok_or(DataError::StatsMismatch {
            field,
            stats: stats.len(),
            data: values.ncols(),
        })
}

fn standardize(
    field: &'static str,
    signal: &Signal,
    mean: &Array1<f64>,
    std: &Array1<f64>,
) -> Result<Signal> {
    let mean = broadcast_stats(field, signal, mean)?;
    let std = broadcast_stats(field, signal, std)?;
    let values: Array2<f64> = (signal.values() - &mean) / &std;
    Ok(signal.with_values(values))
}

fn destandardize(
    field: &'static str,
    signal: &Signal,
    mean: &Array1<f64>,
    std: &Array1<f64>,
) -> Result<Signal> {
    let mean = broadcast_stats(field, signal, mean)?;
    let std = broadcast_stats(field, signal, std)?;
    let values: Array2<f64> = signal.values() * &std + &mean;
    Ok(signal.with_values(values))
}

/// Anything a [`SystemDataNorm`] can be fitted on and applied to.
///
/// Implemented for a single recording, a collection, and a plain `Vec` of
/// recordings; the output keeps the shape of the input.
pub trait Normalizable {
    type Output;

    /// Pooled `(u, y)` samples as `[N, nu]` and `[N, ny]`.
    fn training_data(&self) -> Result<(Array2<f64>, Array2<f64>)>;

    fn normalize_with(&self, norm: &SystemDataNorm) -> Result<Self::Output>;

    fn denormalize_with(&self, norm: &SystemDataNorm) -> Result<Self::Output>;
}

impl Normalizable for SystemData {
    type Output = SystemData;

    fn training_data(&self) -> Result<(Array2<f64>, Array2<f64>)> {
        Ok((self.u().values().clone(), self.output()?.values().clone()))
    }

    fn normalize_with(&self, norm: &SystemDataNorm) -> Result<SystemData> {
        norm.forward(self)
    }

    fn denormalize_with(&self, norm: &SystemDataNorm) -> Result<SystemData> {
        norm.backward(self)
    }
}

impl Normalizable for [SystemData] {
    type Output = Vec<SystemData>;

    fn training_data(&self) -> Result<(Array2<f64>, Array2<f64>)> {
        if self.is_empty() {
            return Err(DataError::EmptyFit);
        }
        let u_views = self.iter().map(|d| d.u().values().view()).collect::<Vec<_>>();
        let y_views = self
            .iter()
            .map(|d| d.output().map(|y| y.values().view()))
            .collect::<Result<Vec<_>>>()?;
        Ok((
            concatenate(Axis(0), &u_views)?,
            concatenate(Axis(0), &y_views)?,
        ))
    }

    fn normalize_with(&self, norm: &SystemDataNorm) -> Result<Vec<SystemData>> {
        self.iter().map(|d| norm.forward(d)).collect()
    }

    fn denormalize_with(&self, norm: &SystemDataNorm) -> Result<Vec<SystemData>> {
        self.iter().map(|d| norm.backward(d)).collect()
    }
}

impl Normalizable for Vec<SystemData> {
    type Output = Vec<SystemData>;

    fn training_data(&self) -> Result<(Array2<f64>, Array2<f64>)> {
        self.as_slice().training_data()
    }

    fn normalize_with(&self, norm: &SystemDataNorm) -> Result<Vec<SystemData>> {
        self.as_slice().normalize_with(norm)
    }

    fn denormalize_with(&self, norm: &SystemDataNorm) -> Result<Vec<SystemData>> {
        self.as_slice().denormalize_with(norm)
    }
}

impl Normalizable for SystemDataList {
    type Output = SystemDataList;

    fn training_data(&self) -> Result<(Array2<f64>, Array2<f64>)> {
        self.members().training_data()
    }

    fn normalize_with(&self, norm: &SystemDataNorm) -> Result<SystemDataList> {
        SystemDataList::new(self.members().normalize_with(norm)?)
    }

    fn denormalize_with(&self, norm: &SystemDataNorm) -> Result<SystemDataList> {
        SystemDataList::new(self.members().denormalize_with(norm)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> SystemData {
        let u = array![[1.0, 10.0], [3.0, 30.0], [5.0, 50.0]];
        let y = array![2.0, 4.0, 6.0];
        SystemData::from_io(u, y).unwrap()
    }

    #[test]
    fn test_identity_default() {
        let norm = SystemDataNorm::default();
        assert!(norm.is_identity());

        let data = sample();
        let transformed = norm.transform(&data).unwrap();
        assert!(transformed.is_normed());
        assert_eq!(transformed.u(), data.u());
        assert_eq!(transformed.y(), data.y());
    }

    #[test]
    fn test_fit_statistics() {
        let norm = SystemDataNorm::fitted(&sample()).unwrap();
        assert_eq!(norm.u0, array![3.0, 30.0]);
        assert_eq!(norm.y0, array![4.0]);
        // population std of [2, 4, 6]
        assert!((norm.ystd[0] - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_transform_standardizes() {
        let data = sample();
        let norm = SystemDataNorm::fitted(&data).unwrap();
        let transformed = norm.transform(&data).unwrap();

        let u = transformed.u().values();
        for col in u.columns() {
            assert!(col.mean().unwrap().abs() < 1e-12);
            assert!((col.std(0.0) - 1.0).abs() < 1e-12);
        }
        assert!(transformed.y().unwrap().is_scalar());
    }

    #[test]
    fn test_double_normalization_rejected() {
        let data = sample();
        let norm = SystemDataNorm::fitted(&data).unwrap();
        let transformed = norm.transform(&data).unwrap();

        assert!(matches!(
            norm.transform(&transformed),
            Err(DataError::AlreadyNormalized)
        ));
        assert!(matches!(
            norm.inverse_transform(&data),
            Err(DataError::NotNormalized)
        ));
    }

    #[test]
    fn test_stats_width_mismatch() {
        let norm = SystemDataNorm::with_stats(
            array![0.0, 0.0, 0.0],
            array![1.0, 1.0, 1.0],
            array![0.0],
            array![1.0],
        );
        assert!(matches!(
            norm.transform(&sample()),
            Err(DataError::StatsMismatch { field: "u", .. })
        ));
    }

    #[test]
    fn test_fit_requires_output() {
        let data = SystemData::from_input(array![1.0, 2.0]).unwrap();
        assert!(matches!(
            SystemDataNorm::fitted(&data),
            Err(DataError::MissingOutput)
        ));
    }

    #[test]
    fn test_display() {
        let norm = SystemDataNorm::new();
        assert_eq!(norm.to_string(), "norm: u0=[0],ustd=[1],y0=[0],ystd=[1]");
    }
}
