//! Single input/output recording.

use super::operand::Operand;
use super::signal::Signal;
use super::slice::TimeSlice;
use super::windows::{
    encoder_windows, hist_future_windows, io_windows, ss_windows, EncoderData, HistFutureData,
    IoData, SsData,
};
use super::WindowableSequence;
use crate::error::{DataError, Result};
use crate::metrics::{self, Metric};
use crate::plot::{signal_lines, PlotData};
use log::debug;
use ndarray::ArrayD;
use std::fmt;
use std::path::Path;

/// One recorded input/output time series with an optional state trace.
///
/// `u` always exists; a container built from `y` alone gets a zero-width
/// `[N, 0]` input. Samples before `cheat_n` are warm-up and are excluded
/// from fit metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemData {
    u: Signal,
    y: Option<Signal>,
    x: Option<Signal>,
    cheat_n: usize,
    normed: bool,
}

impl SystemData {
    /// Create a container, checking that all sequences share one length.
    ///
    /// # Errors
    ///
    /// - [`DataError::MissingSignals`] if neither `u` nor `y` is given
    /// - [`DataError::LengthMismatch`] if `u`/`y` or `y`/`x` differ in length
    /// - [`DataError::CheatOutOfRange`] if `cheat_n` exceeds the length
    pub fn new(
        u: Option<Signal>,
        y: Option<Signal>,
        x: Option<Signal>,
        cheat_n: usize,
        normed: bool,
    ) -> Result<Self> {
        let n_samples = match (&u, &y) {
            (Some(u), _) => u.n_samples(),
            (None, Some(y)) => y.n_samples(),
            (None, None) => return Err(DataError::MissingSignals),
        };

        if let Some(y) = &y {
            if y.n_samples() != n_samples {
                return Err(DataError::LengthMismatch {
                    field: "y",
                    expected: n_samples,
                    actual: y.n_samples(),
                });
            }
            if let Some(x) = &x {
                if x.n_samples() != y.n_samples() {
                    return Err(DataError::LengthMismatch {
                        field: "x",
                        expected: y.n_samples(),
                        actual: x.n_samples(),
                    });
                }
            }
        }

        if cheat_n > n_samples {
            return Err(DataError::CheatOutOfRange { cheat_n, n_samples });
        }

        Ok(Self {
            u: u.unwrap_or_else(|| Signal::empty(n_samples)),
            y,
            x,
            cheat_n,
            normed,
        })
    }

    /// Input/output container with no state trace and no warm-up.
    pub fn from_io(u: impl Into<Signal>, y: impl Into<Signal>) -> Result<Self> {
        Self::new(Some(u.into()), Some(y.into()), None, 0, false)
    }

    /// Output-only container; `u` becomes zero-width.
    pub fn from_output(y: impl Into<Signal>) -> Result<Self> {
        Self::new(None, Some(y.into()), None, 0, false)
    }

    /// Input-only container.
    pub fn from_input(u: impl Into<Signal>) -> Result<Self> {
        Self::new(Some(u.into()), None, None, 0, false)
    }

    /// Attach a state trace.
    pub fn with_state(self, x: impl Into<Signal>) -> Result<Self> {
        Self::new(Some(self.u), self.y, Some(x.into()), self.cheat_n, self.normed)
    }

    /// Set the index where genuine simulation starts.
    pub fn with_cheat_n(self, cheat_n: usize) -> Result<Self> {
        Self::new(Some(self.u), self.y, self.x, cheat_n, self.normed)
    }

    pub fn with_normed(mut self, normed: bool) -> Self {
        self.normed = normed;
        self
    }

    pub fn u(&self) -> &Signal {
        &self.u
    }

    pub fn y(&self) -> Option<&Signal> {
        self.y.as_ref()
    }

    pub fn x(&self) -> Option<&Signal> {
        self.x.as_ref()
    }

    /// The output sequence, or [`DataError::MissingOutput`].
    pub fn output(&self) -> Result<&Signal> {
        self.y.as_ref().ok_or(DataError::MissingOutput)
    }

    pub fn cheat_n(&self) -> usize {
        self.cheat_n
    }

    /// Number of time steps (`u.shape[0]`).
    pub fn len(&self) -> usize {
        self.u.n_samples()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time-slice every sequence.
    ///
    /// `cheat_n` shifts with the slice start and never goes negative.
    pub fn slice(&self, index: impl Into<TimeSlice>) -> Result<Self> {
        let index = index.into();
        let n = self.len();
        let (start, _, _) = index.indices(n)?;
        let positions = index.positions(n)?;
        let cheat_n = (self.cheat_n as isize - start).max(0) as usize;

        Self::new(
            Some(self.u.take(&positions)),
            self.y.as_ref().map(|y| y.take(&positions)),
            self.x.as_ref().map(|x| x.take(&positions)),
            cheat_n.min(positions.len()),
            self.normed,
        )
    }

    /// New container whose `y` is `self.y - other`.
    ///
    /// `u`, `x` and `cheat_n` are carried over; the result is flagged as
    /// not normalized.
    pub fn subtract<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        let y = self.output()?;
        let target = y.to_dyn();
        let diff = match other.into() {
            Operand::Scalar(value) => target.mapv(|t| t - value),
            Operand::Array(array) => broadcast_sub(&target, &array)?,
            Operand::Data(other) => {
                let other_y = other.output()?;
                if other_y.n_samples() != y.n_samples() {
                    return Err(DataError::LengthMismatch {
                        field: "y",
                        expected: y.n_samples(),
                        actual: other_y.n_samples(),
                    });
                }
                broadcast_sub(&target, &other_y.to_dyn())?
            }
            Operand::List(_) => return Err(DataError::UnsupportedOperand("collection")),
        };

        Self::new(
            Some(self.u.clone()),
            Some(Signal::from_dyn("y", diff)?),
            self.x.clone(),
            self.cheat_n,
            false,
        )
    }

    /// Save as a flat named-array bundle.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::export::bundle::save_system_data(self, path)
    }
}

/// `target - operand`, broadcasting the operand to the target's shape.
pub(crate) fn broadcast_sub(target: &ArrayD<f64>, operand: &ArrayD<f64>) -> Result<ArrayD<f64>> {
    let view = operand
        .broadcast(target.raw_dim())
        .ok_or_else(|| DataError::OperandShape {
            operand: operand.shape().to_vec(),
            target: target.shape().to_vec(),
        })?;
    Ok(target - &view)
}

impl WindowableSequence for SystemData {
    fn n_samples(&self) -> usize {
        self.len()
    }

    fn nu(&self) -> Option<usize> {
        self.u.width()
    }

    fn ny(&self) -> Option<usize> {
        match &self.y {
            Some(y) => y.width(),
            None => Some(0),
        }
    }

    fn is_normed(&self) -> bool {
        self.normed
    }

    fn to_io_data(&self, na: usize, nb: usize) -> Result<IoData> {
        let data = io_windows(&self.u, self.output()?, na, nb)?;
        debug!("to_io_data(na={na}, nb={nb}): {} windows", data.len());
        Ok(data)
    }

    fn to_hist_future_data(&self, na: usize, nb: usize, nf: usize) -> Result<HistFutureData> {
        let data = hist_future_windows(&self.u, self.output()?, na, nb, nf)?;
        debug!(
            "to_hist_future_data(na={na}, nb={nb}, nf={nf}): {} windows",
            data.len()
        );
        Ok(data)
    }

    fn to_ss_data(&self, nf: usize) -> Result<SsData> {
        let data = ss_windows(&self.u, self.output()?, nf)?;
        debug!("to_ss_data(nf={nf}): {} windows", data.len());
        Ok(data)
    }

    fn to_encoder_data(&self, na: usize, nb: usize, nf: usize) -> Result<EncoderData> {
        let data = encoder_windows(&self.u, self.output()?, na, nb, nf)?;
        debug!(
            "to_encoder_data(na={na}, nb={nb}, nf={nf}): {} windows",
            data.len()
        );
        Ok(data)
    }

    /// Left half gets `[cheat_n, split_n)`, right half `[cheat_n + split_n, N)`
    /// with `split_n = floor((N - cheat_n) * (1 - split_fraction))`.
    ///
    /// `x` is cut at plain `split_n` on both sides. Both halves start with
    /// `cheat_n = 0`.
    fn train_test_split(&self, split_fraction: f64) -> Result<(Self, Self)> {
        if !split_fraction.is_finite() || !(0.0..=1.0).contains(&split_fraction) {
            return Err(DataError::InvalidFraction(split_fraction));
        }

        let n = self.len();
        let cheat_n = self.cheat_n;
        let n_effective = n - cheat_n;
        let split_n = (n_effective as f64 * (1.0 - split_fraction)).floor() as usize;

        let left = Self::new(
            Some(self.u.rows(cheat_n, split_n)),
            self.y.as_ref().map(|y| y.rows(cheat_n, split_n)),
            self.x.as_ref().map(|x| x.rows(0, split_n)),
            0,
            self.normed,
        )?;
        let right = Self::new(
            Some(self.u.rows(cheat_n + split_n, n)),
            self.y.as_ref().map(|y| y.rows(cheat_n + split_n, n)),
            self.x.as_ref().map(|x| x.rows(split_n, n)),
            0,
            self.normed,
        )?;

        debug!(
            "train_test_split({split_fraction}): {} -> {} + {}",
            n,
            left.len(),
            right.len()
        );
        Ok((left, right))
    }

    /// Block-averages `u` and `y`; `x` is stride-subsampled instead.
    fn down_sample_by_average(&self, factor: usize) -> Result<Self> {
        if factor == 0 {
            return Err(DataError::InvalidFactor(factor));
        }

        let u = self.u.block_mean(factor);
        let cheat_n = self.cheat_n.min(u.n_samples());
        Self::new(
            Some(u),
            self.y.as_ref().map(|y| y.block_mean(factor)),
            self.x.as_ref().map(|x| x.decimate(factor)),
            cheat_n,
            self.normed,
        )
    }

    fn rms(&self, real: &Self) -> Result<f64> {
        metrics::rms(self, real)
    }

    fn nrms(&self, real: &Self, multi_average: bool) -> Result<Metric> {
        metrics::nrms(self, real, multi_average)
    }

    fn bfr(&self, real: &Self, multi_average: bool) -> Result<Metric> {
        metrics::bfr(self, real, multi_average)
    }

    fn vaf(&self, real: &Self, multi_average: bool) -> Result<Metric> {
        metrics::vaf(self, real, multi_average)
    }

    fn plot_data(&self) -> PlotData {
        match &self.y {
            Some(y) => PlotData::new("y", signal_lines(y, "y")),
            None => PlotData::new("u", signal_lines(&self.u, "u")),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        SystemData::save(self, path)
    }
}

pub(crate) fn fmt_width(width: Option<usize>) -> String {
    width.map_or_else(|| "None".to_string(), |w| w.to_string())
}

impl fmt::Display for SystemData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SystemData of length: {} nu={} ny={} normed={}",
            self.len(),
            fmt_width(self.nu()),
            fmt_width(self.ny()),
            self.normed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    fn ramp(n: usize) -> Array1<f64> {
        Array1::from_iter((0..n).map(|v| v as f64))
    }

    #[test]
    fn test_requires_u_or_y() {
        assert!(matches!(
            SystemData::new(None, None, None, 0, false),
            Err(DataError::MissingSignals)
        ));
    }

    #[test]
    fn test_output_only_gets_zero_width_input() {
        let data = SystemData::from_output(ramp(4)).unwrap();
        assert_eq!(data.len(), 4);
        assert_eq!(data.nu(), Some(0));
        assert_eq!(data.ny(), None);
    }

    #[test]
    fn test_input_only_reports_zero_ny() {
        let data = SystemData::from_input(Array2::<f64>::zeros((5, 2))).unwrap();
        assert_eq!(data.nu(), Some(2));
        assert_eq!(data.ny(), Some(0));
        assert!(matches!(data.to_io_data(1, 1), Err(DataError::MissingOutput)));
    }

    #[test]
    fn test_length_mismatch() {
        let err = SystemData::from_io(ramp(4), ramp(5)).unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { field: "y", .. }));

        let err = SystemData::from_io(ramp(4), ramp(4))
            .unwrap()
            .with_state(ramp(3))
            .unwrap_err();
        assert!(matches!(err, DataError::LengthMismatch { field: "x", .. }));
    }

    #[test]
    fn test_cheat_out_of_range() {
        let err = SystemData::from_io(ramp(4), ramp(4))
            .unwrap()
            .with_cheat_n(5)
            .unwrap_err();
        assert!(matches!(err, DataError::CheatOutOfRange { .. }));
    }

    #[test]
    fn test_slice_shifts_cheat() {
        let data = SystemData::from_io(ramp(20), ramp(20))
            .unwrap()
            .with_cheat_n(5)
            .unwrap();
        let sliced = data.slice(TimeSlice::range(3, 10)).unwrap();
        assert_eq!(sliced.len(), 7);
        assert_eq!(sliced.cheat_n(), 2);

        let later = data.slice(TimeSlice::starting_at(8)).unwrap();
        assert_eq!(later.cheat_n(), 0);
    }

    #[test]
    fn test_split_after_warm_up_skips_samples() {
        let data = SystemData::from_io(ramp(100), ramp(100))
            .unwrap()
            .with_cheat_n(10)
            .unwrap();
        // split_n = floor(90 * 0.75) = 67
        let (left, right) = data.train_test_split(0.25).unwrap();
        assert_eq!(left.len(), 57);
        assert_eq!(right.len(), 23);
        assert_eq!(left.u().values()[[0, 0]], 10.0);
        assert_eq!(right.u().values()[[0, 0]], 77.0);
        assert_eq!(left.cheat_n(), 0);
        assert_eq!(right.cheat_n(), 0);
    }

    #[test]
    fn test_split_cuts_state_at_plain_index() {
        let data = SystemData::from_io(ramp(100), ramp(100))
            .unwrap()
            .with_state(ramp(100) * 2.0)
            .unwrap();
        let (left, right) = data.train_test_split(0.25).unwrap();
        assert_eq!(left.x().unwrap().n_samples(), 75);
        assert_eq!(right.x().unwrap().values()[[0, 0]], 150.0);

        // with a warm-up the state halves no longer line up with u/y
        let err = data.with_cheat_n(10).unwrap().train_test_split(0.25).unwrap_err();
        assert!(matches!(
            err,
            DataError::LengthMismatch {
                field: "x",
                expected: 57,
                actual: 67
            }
        ));
    }

    #[test]
    fn test_down_sample_decimates_state() {
        let data = SystemData::from_io(ramp(8), ramp(8))
            .unwrap()
            .with_state(ramp(8))
            .unwrap();
        let sampled = data.down_sample_by_average(2).unwrap();
        assert_eq!(sampled.u().to_dyn(), array![0.5, 2.5, 4.5, 6.5].into_dyn());
        assert_eq!(sampled.x().unwrap().to_dyn(), array![0.0, 2.0, 4.0, 6.0].into_dyn());
    }

    #[test]
    fn test_down_sample_state_length_mismatch() {
        let data = SystemData::from_io(ramp(9), ramp(9))
            .unwrap()
            .with_state(ramp(9))
            .unwrap();
        let err = data.down_sample_by_average(2).unwrap_err();
        assert!(matches!(
            err,
            DataError::LengthMismatch {
                field: "x",
                expected: 4,
                actual: 5
            }
        ));
        assert_eq!(data.down_sample_by_average(1).unwrap(), data);
    }

    #[test]
    fn test_subtract_scalar_and_container() {
        let data = SystemData::from_io(ramp(3), array![1.0, 2.0, 3.0]).unwrap();
        let shifted = data.subtract(1.0).unwrap();
        assert_eq!(shifted.output().unwrap().to_dyn(), array![0.0, 1.0, 2.0].into_dyn());

        let zero = data.subtract(&data).unwrap();
        assert!(zero.output().unwrap().values().iter().all(|&v| v == 0.0));
        assert_eq!(zero.u(), data.u());
    }

    #[test]
    fn test_subtract_per_feature_array() {
        let y = array![[1.0, 10.0], [2.0, 20.0]];
        let data = SystemData::from_io(ramp(2), y).unwrap();
        let diff = data.subtract(array![1.0, 10.0]).unwrap();
        assert_eq!(diff.output().unwrap().values(), &array![[0.0, 0.0], [1.0, 10.0]]);
    }

    #[test]
    fn test_subtract_rejects_bad_shape() {
        let data = SystemData::from_io(ramp(3), ramp(3)).unwrap();
        assert!(matches!(
            data.subtract(ramp(2)),
            Err(DataError::OperandShape { .. })
        ));
    }

    #[test]
    fn test_display() {
        let data = SystemData::from_io(ramp(3), Array2::<f64>::zeros((3, 2))).unwrap();
        assert_eq!(
            data.to_string(),
            "SystemData of length: 3 nu=None ny=2 normed=false"
        );
    }
}
