//! Sliding-window tensors for supervised training.
//!
//! Each transform walks a time index `k` across one recording and cuts
//! fixed-width history and/or future windows around it:
//!
//! ```text
//! to_io_data           k in [max(na,nb), N)         hist = u[k-nb:k] ++ y[k-na:k], target y[k]
//! to_hist_future_data  k in [max(na,nb)+nf, N]      uhist = u[k-nb-nf:k-nf], yhist = y[k-na-nf:k-nf]
//!                                                   ufuture = u[k-nf:k],     yfuture = y[k-nf:k]
//! to_ss_data           k in [nf, N]                 ufuture = u[k-nf:k],     yfuture = y[k-nf:k]
//! to_encoder_data      k in [max(na,nb)+nf, N]      hist = u[k-nf-nb:k-nf] ++ y[k-nf-na:k-nf]
//!                                                   ufuture = u[k-nf:k],     yfuture = y[k-nf:k]
//! ```
//!
//! Window tensors keep the scalar/vector convention of their source: a
//! scalar `y` gives `yfuture` of shape `[n, nf]`, a vector `y` gives
//! `[n, nf, ny]`. Flattened histories are always `[n, nb*nu + na*ny]`.

use super::signal::Signal;
use crate::error::{DataError, Result};
use ndarray::{concatenate, Array2, ArrayD, ArrayViewD, Axis, IxDyn};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Flattened history paired with the one-step-ahead target.
#[derive(Debug, Clone, PartialEq)]
pub struct IoData {
    /// `[n, nb*nu + na*ny]`
    pub hist: Array2<f64>,
    /// `[n]` or `[n, ny]`
    pub y: ArrayD<f64>,
}

/// History windows paired with the future windows that follow them.
#[derive(Debug, Clone, PartialEq)]
pub struct HistFutureData {
    pub uhist: ArrayD<f64>,
    pub yhist: ArrayD<f64>,
    pub ufuture: ArrayD<f64>,
    pub yfuture: ArrayD<f64>,
}

/// Future windows without history, for state-space batches.
#[derive(Debug, Clone, PartialEq)]
pub struct SsData {
    pub ufuture: ArrayD<f64>,
    pub yfuture: ArrayD<f64>,
}

/// Flattened history followed by `nf`-step future windows.
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderData {
    pub hist: Array2<f64>,
    pub ufuture: ArrayD<f64>,
    pub yfuture: ArrayD<f64>,
}

/// Which window transform to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowFormat {
    Io,
    HistFuture,
    StateSpace,
    Encoder,
}

impl std::fmt::Display for WindowFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WindowFormat::Io => "io",
            WindowFormat::HistFuture => "hist_future",
            WindowFormat::StateSpace => "state_space",
            WindowFormat::Encoder => "encoder",
        };
        f.write_str(name)
    }
}

/// Output of any window transform.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowedData {
    Io(IoData),
    HistFuture(HistFutureData),
    StateSpace(SsData),
    Encoder(EncoderData),
}

impl WindowedData {
    pub fn format(&self) -> WindowFormat {
        match self {
            WindowedData::Io(_) => WindowFormat::Io,
            WindowedData::HistFuture(_) => WindowFormat::HistFuture,
            WindowedData::StateSpace(_) => WindowFormat::StateSpace,
            WindowedData::Encoder(_) => WindowFormat::Encoder,
        }
    }

    /// Number of windows (leading dimension shared by every tensor).
    pub fn n_windows(&self) -> usize {
        match self {
            WindowedData::Io(d) => d.hist.nrows(),
            WindowedData::HistFuture(d) => d.uhist.shape()[0],
            WindowedData::StateSpace(d) => d.ufuture.shape()[0],
            WindowedData::Encoder(d) => d.hist.nrows(),
        }
    }

    /// Named views over every tensor, in output order.
    pub fn tensors(&self) -> Vec<(&'static str, ArrayViewD<'_, f64>)> {
        match self {
            WindowedData::Io(d) => vec![("hist", d.hist.view().into_dyn()), ("y", d.y.view())],
            WindowedData::HistFuture(d) => vec![
                ("uhist", d.uhist.view()),
                ("yhist", d.yhist.view()),
                ("ufuture", d.ufuture.view()),
                ("yfuture", d.yfuture.view()),
            ],
            WindowedData::StateSpace(d) => {
                vec![("ufuture", d.ufuture.view()), ("yfuture", d.yfuture.view())]
            }
            WindowedData::Encoder(d) => vec![
                ("hist", d.hist.view().into_dyn()),
                ("ufuture", d.ufuture.view()),
                ("yfuture", d.yfuture.view()),
            ],
        }
    }
}

// ============================================================================
// Single-recording transforms
// ============================================================================

pub(crate) fn io_windows(u: &Signal, y: &Signal, na: usize, nb: usize) -> Result<IoData> {
    let ks = na.max(nb)..u.n_samples();
    let hist = flat_history(u, y, ks.clone(), na, nb, 0)?;
    let y = stack_rows(y, ks)?;
    Ok(IoData { hist, y })
}

pub(crate) fn hist_future_windows(
    u: &Signal,
    y: &Signal,
    na: usize,
    nb: usize,
    nf: usize,
) -> Result<HistFutureData> {
    let ks = na.max(nb) + nf..u.n_samples() + 1;
    Ok(HistFutureData {
        uhist: stack_windows(u, ks.clone(), nb + nf, nf)?,
        yhist: stack_windows(y, ks.clone(), na + nf, nf)?,
        ufuture: stack_windows(u, ks.clone(), nf, 0)?,
        yfuture: stack_windows(y, ks, nf, 0)?,
    })
}

pub(crate) fn ss_windows(u: &Signal, y: &Signal, nf: usize) -> Result<SsData> {
    let ks = nf..u.n_samples() + 1;
    Ok(SsData {
        ufuture: stack_windows(u, ks.clone(), nf, 0)?,
        yfuture: stack_windows(y, ks, nf, 0)?,
    })
}

pub(crate) fn encoder_windows(
    u: &Signal,
    y: &Signal,
    na: usize,
    nb: usize,
    nf: usize,
) -> Result<EncoderData> {
    let ks = na.max(nb) + nf..u.n_samples() + 1;
    Ok(EncoderData {
        hist: flat_history(u, y, ks.clone(), na, nb, nf)?,
        ufuture: stack_windows(u, ks.clone(), nf, 0)?,
        yfuture: stack_windows(y, ks, nf, 0)?,
    })
}

/// `[u[k-lag-nb : k-lag] ++ y[k-lag-na : k-lag]]` for every `k`, flattened.
fn flat_history(
    u: &Signal,
    y: &Signal,
    ks: Range<usize>,
    na: usize,
    nb: usize,
    lag: usize,
) -> Result<Array2<f64>> {
    let width = nb * u.n_features() + na * y.n_features();
    let count = ks.len();
    let mut buf = Vec::with_capacity(count * width);
    for k in ks {
        let end = k - lag;
        u.extend_rows(end - nb, end, &mut buf);
        y.extend_rows(end - na, end, &mut buf);
    }
    Ok(Array2::from_shape_vec((count, width), buf)?)
}

/// Windows `signal[k-from_back : k-to_back]` for every `k`.
fn stack_windows(
    signal: &Signal,
    ks: Range<usize>,
    from_back: usize,
    to_back: usize,
) -> Result<ArrayD<f64>> {
    let rows = from_back - to_back;
    let count = ks.len();
    let mut buf = Vec::with_capacity(count * rows * signal.n_features());
    for k in ks {
        signal.extend_rows(k - from_back, k - to_back, &mut buf);
    }
    Ok(ArrayD::from_shape_vec(
        IxDyn(&signal.window_shape(count, rows)),
        buf,
    )?)
}

/// Single rows `signal[k]` for every `k`.
fn stack_rows(signal: &Signal, ks: Range<usize>) -> Result<ArrayD<f64>> {
    let count = ks.len();
    let mut buf = Vec::with_capacity(count * signal.n_features());
    for k in ks {
        signal.extend_rows(k, k + 1, &mut buf);
    }
    Ok(ArrayD::from_shape_vec(IxDyn(&signal.row_shape(count)), buf)?)
}

// ============================================================================
// Concatenation across recordings
// ============================================================================

fn concat_dyn<'a, I>(parts: I) -> Result<ArrayD<f64>>
where
    I: IntoIterator<Item = &'a ArrayD<f64>>,
{
    let views: Vec<_> = parts.into_iter().map(|a| a.view()).collect();
    if views.is_empty() {
        return Err(DataError::EmptyCollection);
    }
    Ok(concatenate(Axis(0), &views)?)
}

fn concat_2d<'a, I>(parts: I) -> Result<Array2<f64>>
where
    I: IntoIterator<Item = &'a Array2<f64>>,
{
    let views: Vec<_> = parts.into_iter().map(|a| a.view()).collect();
    if views.is_empty() {
        return Err(DataError::EmptyCollection);
    }
    Ok(concatenate(Axis(0), &views)?)
}

impl IoData {
    /// Concatenates per-recording outputs along the window axis.
    pub fn concat(parts: &[IoData]) -> Result<Self> {
        Ok(Self {
            hist: concat_2d(parts.iter().map(|p| &p.hist))?,
            y: concat_dyn(parts.iter().map(|p| &p.y))?,
        })
    }

    pub fn len(&self) -> usize {
        self.hist.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistFutureData {
    /// Concatenates per-recording outputs along the window axis.
    pub fn concat(parts: &[HistFutureData]) -> Result<Self> {
        Ok(Self {
            uhist: concat_dyn(parts.iter().map(|p| &p.uhist))?,
            yhist: concat_dyn(parts.iter().map(|p| &p.yhist))?,
            ufuture: concat_dyn(parts.iter().map(|p| &p.ufuture))?,
            yfuture: concat_dyn(parts.iter().map(|p| &p.yfuture))?,
        })
    }

    pub fn len(&self) -> usize {
        self.uhist.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SsData {
    /// Concatenates per-recording outputs along the window axis.
    pub fn concat(parts: &[SsData]) -> Result<Self> {
        Ok(Self {
            ufuture: concat_dyn(parts.iter().map(|p| &p.ufuture))?,
            yfuture: concat_dyn(parts.iter().map(|p| &p.yfuture))?,
        })
    }

    pub fn len(&self) -> usize {
        self.ufuture.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EncoderData {
    /// Concatenates per-recording outputs along the window axis.
    pub fn concat(parts: &[EncoderData]) -> Result<Self> {
        Ok(Self {
            hist: concat_2d(parts.iter().map(|p| &p.hist))?,
            ufuture: concat_dyn(parts.iter().map(|p| &p.ufuture))?,
            yfuture: concat_dyn(parts.iter().map(|p| &p.yfuture))?,
        })
    }

    pub fn len(&self) -> usize {
        self.hist.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    fn ramp(n: usize) -> Signal {
        Signal::from(Array1::from_iter((0..n).map(|v| v as f64)))
    }

    #[test]
    fn test_io_windows_scalar_shapes() {
        let u = ramp(10);
        let y = ramp(10);
        let data = io_windows(&u, &y, 3, 2).unwrap();
        assert_eq!(data.hist.shape(), &[7, 5]);
        assert_eq!(data.y.shape(), &[7]);
        // k = 3: u[1..3] ++ y[0..3]
        assert_eq!(data.hist.row(0).to_vec(), vec![1.0, 2.0, 0.0, 1.0, 2.0]);
        assert_eq!(data.y[[0]], 3.0);
    }

    #[test]
    fn test_io_windows_short_sequence_is_empty() {
        let data = io_windows(&ramp(3), &ramp(3), 5, 5).unwrap();
        assert_eq!(data.hist.shape(), &[0, 10]);
        assert!(data.is_empty());
    }

    #[test]
    fn test_hist_future_alignment() {
        let u = ramp(8);
        let y = Signal::vector(Array2::from_shape_fn((8, 2), |(i, j)| (10 * i + j) as f64));
        let data = hist_future_windows(&u, &y, 2, 1, 3).unwrap();

        // k runs from 5 to 8 inclusive
        assert_eq!(data.uhist.shape(), &[4, 1]);
        assert_eq!(data.yhist.shape(), &[4, 2, 2]);
        assert_eq!(data.ufuture.shape(), &[4, 3]);
        assert_eq!(data.yfuture.shape(), &[4, 3, 2]);

        // k = 5: uhist = u[1:2], yhist = y[0:2], future = [2:5]
        assert_eq!(data.uhist[[0, 0]], 1.0);
        assert_eq!(data.yhist[[0, 1, 0]], 10.0);
        assert_eq!(data.ufuture.index_axis(Axis(0), 0).to_owned(), array![2.0, 3.0, 4.0].into_dyn());
        assert_eq!(data.yfuture[[3, 2, 1]], 71.0);
    }

    #[test]
    fn test_ss_windows_inclusive_bound() {
        let data = ss_windows(&ramp(5), &ramp(5), 5).unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data.yfuture.shape(), &[1, 5]);
    }

    #[test]
    fn test_encoder_history_precedes_future() {
        let data = encoder_windows(&ramp(6), &ramp(6), 2, 2, 2).unwrap();
        assert_eq!(data.len(), 3);
        // k = 4: hist = u[0:2] ++ y[0:2], future = [2:4]
        assert_eq!(data.hist.row(0).to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
        assert_eq!(data.ufuture.index_axis(Axis(0), 0).to_owned(), array![2.0, 3.0].into_dyn());
    }

    #[test]
    fn test_concat_keeps_order() {
        let first = io_windows(&ramp(4), &ramp(4), 1, 1).unwrap();
        let second = io_windows(&ramp(3), &ramp(3), 1, 1).unwrap();
        let joined = IoData::concat(&[first, second]).unwrap();
        assert_eq!(joined.len(), 5);
        assert_eq!(joined.y.as_slice().unwrap(), &[1.0, 2.0, 3.0, 1.0, 2.0]);
    }
}
