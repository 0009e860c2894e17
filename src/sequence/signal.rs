//! Sample arrays backing `u`, `y` and `x`.
//!
//! A [`Signal`] is either a plain scalar-per-step sequence (`[N]`) or a
//! fixed-width vector-per-step sequence (`[N, n]`). Both are stored as a
//! row-major `[N, n]` matrix so window extraction is a contiguous copy; the
//! `scalar` flag only affects the shape of arrays handed back to callers.

use crate::error::{DataError, Result};
use ndarray::{concatenate, s, Array1, Array2, ArrayD, Axis, Ix1, Ix2};

/// One recorded sequence: `[N]` scalars or `[N, n]` feature vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    values: Array2<f64>,
    scalar: bool,
}

impl Signal {
    /// Scalar-per-step sequence of shape `[N]`.
    pub fn scalar(values: Array1<f64>) -> Self {
        Self {
            values: values.insert_axis(Axis(1)),
            scalar: true,
        }
    }

    /// Vector-per-step sequence of shape `[N, n]`.
    pub fn vector(values: Array2<f64>) -> Self {
        Self {
            values,
            scalar: false,
        }
    }

    /// Zero-width `[N, 0]` sequence, used when a container has no input.
    pub fn empty(n_samples: usize) -> Self {
        Self::vector(Array2::zeros((n_samples, 0)))
    }

    /// Build from a dynamic-rank array; only 1-D and 2-D arrays are accepted.
    pub fn from_dyn(field: &'static str, array: ArrayD<f64>) -> Result<Self> {
        match array.ndim() {
            1 => Ok(Self::scalar(array.into_dimensionality::<Ix1>()?)),
            2 => Ok(Self::vector(array.into_dimensionality::<Ix2>()?)),
            ndim => Err(DataError::UnsupportedRank { field, ndim }),
        }
    }

    /// Number of time steps.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    /// Feature width, or `None` for a scalar-per-step sequence.
    #[inline]
    pub fn width(&self) -> Option<usize> {
        if self.scalar {
            None
        } else {
            Some(self.values.ncols())
        }
    }

    /// Number of stored columns (1 for a scalar sequence).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    #[inline]
    pub fn is_scalar(&self) -> bool {
        self.scalar
    }

    /// Stored values as `[N, n]` (a scalar sequence is `[N, 1]`).
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Values in the caller-facing shape: `[N]` for scalar, `[N, n]` otherwise.
    pub fn to_dyn(&self) -> ArrayD<f64> {
        if self.scalar {
            self.values.column(0).to_owned().into_dyn()
        } else {
            self.values.clone().into_dyn()
        }
    }

    /// Same shape convention as `self`, new values.
    pub(crate) fn with_values(&self, values: Array2<f64>) -> Self {
        Self {
            values,
            scalar: self.scalar,
        }
    }

    /// Rows `[start, stop)`, clamped to the available range.
    ///
    /// An inverted range yields an empty sequence rather than an error.
    pub fn rows(&self, start: usize, stop: usize) -> Self {
        let n = self.n_samples();
        let stop = stop.min(n);
        let start = start.min(stop);
        self.with_values(self.values.slice(s![start..stop, ..]).to_owned())
    }

    /// Rows at the given positions, in order.
    pub fn take(&self, positions: &[usize]) -> Self {
        self.with_values(self.values.select(Axis(0), positions))
    }

    /// Every `step`-th row starting at row 0.
    pub fn decimate(&self, step: usize) -> Self {
        let step = step.max(1) as isize;
        self.with_values(self.values.slice(s![..;step, ..]).to_owned())
    }

    /// Averages consecutive blocks of `factor` rows, column by column.
    ///
    /// Trailing rows that do not fill a whole block are dropped.
    pub fn block_mean(&self, factor: usize) -> Self {
        let blocks = self.n_samples() / factor;
        let values = Array2::from_shape_fn((blocks, self.n_features()), |(b, c)| {
            self.values
                .slice(s![b * factor..(b + 1) * factor, c])
                .sum()
                / factor as f64
        });
        self.with_values(values)
    }

    /// Appends rows `[start, stop)` to `out`, flattened row-major.
    pub(crate) fn extend_rows(&self, start: usize, stop: usize, out: &mut Vec<f64>) {
        for row in self.values.slice(s![start..stop, ..]).rows() {
            out.extend(row.iter().copied());
        }
    }

    /// Shape of `count` stacked windows of `len` rows each.
    pub(crate) fn window_shape(&self, count: usize, len: usize) -> Vec<usize> {
        if self.scalar {
            vec![count, len]
        } else {
            vec![count, len, self.n_features()]
        }
    }

    /// Shape of `count` stacked single rows.
    pub(crate) fn row_shape(&self, count: usize) -> Vec<usize> {
        if self.scalar {
            vec![count]
        } else {
            vec![count, self.n_features()]
        }
    }

    /// Concatenates sequences along the sample axis.
    pub fn concat(parts: &[&Signal]) -> Result<Self> {
        let first = parts.first().ok_or(DataError::EmptyCollection)?;
        let views: Vec<_> = parts.iter().map(|p| p.values.view()).collect();
        Ok(first.with_values(concatenate(Axis(0), &views)?))
    }
}

impl From<Array1<f64>> for Signal {
    fn from(values: Array1<f64>) -> Self {
        Self::scalar(values)
    }
}

impl From<Array2<f64>> for Signal {
    fn from(values: Array2<f64>) -> Self {
        Self::vector(values)
    }
}

impl From<Vec<f64>> for Signal {
    fn from(values: Vec<f64>) -> Self {
        Self::scalar(Array1::from(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scalar_shape() {
        let signal = Signal::from(vec![1.0, 2.0, 3.0]);
        assert!(signal.is_scalar());
        assert_eq!(signal.width(), None);
        assert_eq!(signal.n_features(), 1);
        assert_eq!(signal.to_dyn().shape(), &[3]);
    }

    #[test]
    fn test_from_dyn_rejects_rank_three() {
        let array = ArrayD::<f64>::zeros(vec![2, 2, 2]);
        assert!(matches!(
            Signal::from_dyn("u", array),
            Err(DataError::UnsupportedRank { ndim: 3, .. })
        ));
    }

    #[test]
    fn test_rows_clamps_inverted_range() {
        let signal = Signal::from(vec![1.0, 2.0, 3.0]);
        assert_eq!(signal.rows(2, 1).n_samples(), 0);
        assert_eq!(signal.rows(1, 10).n_samples(), 2);
    }

    #[test]
    fn test_block_mean_per_column() {
        let signal = Signal::vector(array![[0.0, 10.0], [2.0, 20.0], [4.0, 30.0], [6.0, 40.0], [9.0, 9.0]]);
        let averaged = signal.block_mean(2);
        assert_eq!(averaged.values(), &array![[1.0, 15.0], [5.0, 35.0]]);
    }

    #[test]
    fn test_decimate() {
        let signal = Signal::from(vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(signal.decimate(2).to_dyn(), array![0.0, 2.0, 4.0].into_dyn());
    }
}
