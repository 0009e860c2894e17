//! Input/output sequence containers and their window transforms.
//!
//! # Architecture
//!
//! - **Signal**: one `[N]` or `[N, n]` sample array (`u`, `y` or `x`)
//! - **SystemData**: a single recording with warm-up index and normalization flag
//! - **SystemDataList**: ordered recordings sharing `nu`, `ny` and `normed`
//! - **WindowableSequence**: the API both container types share
//!
//! # Example
//!
//! ```ignore
//! use sysid_data::sequence::{SystemData, WindowableSequence};
//!
//! let data = SystemData::from_io(u, y)?;
//! let (train, test) = data.train_test_split(0.25)?;
//! let io = train.to_io_data(10, 10)?;
//! model.fit(io.hist, io.y);
//! ```

mod data;
mod list;
pub mod operand;
pub mod signal;
pub mod slice;
pub mod windows;

pub use data::SystemData;
pub use list::{Selection, SystemDataList};
pub use operand::Operand;
pub use signal::Signal;
pub use slice::{MemberSelector, TimeSlice};
pub use windows::{
    EncoderData, HistFutureData, IoData, SsData, WindowFormat, WindowedData,
};

use crate::config::WindowConfig;
use crate::error::Result;
use crate::metrics::Metric;
use crate::plot::PlotData;
use std::path::Path;

/// Shared API of a single recording and a collection of recordings.
///
/// For a collection every method fans out over the members: window tensors
/// are concatenated in member order, splits and down-sampling apply per
/// member, and metrics become sample-count weighted averages.
pub trait WindowableSequence: Sized {
    /// Number of time steps (summed over members for a collection).
    fn n_samples(&self) -> usize;

    /// Input width, `None` for a scalar input.
    fn nu(&self) -> Option<usize>;

    /// Output width, `None` for a scalar output, `Some(0)` without output.
    fn ny(&self) -> Option<usize>;

    fn is_normed(&self) -> bool;

    /// `hist = u[k-nb:k] ++ y[k-na:k]` flattened, target `y[k]`,
    /// for `k` in `max(na, nb)..N`.
    fn to_io_data(&self, na: usize, nb: usize) -> Result<IoData>;

    /// History windows ending `nf` steps before `k` and the `nf`-step future
    /// windows up to `k`, for `k` in `max(na, nb) + nf..=N`.
    fn to_hist_future_data(&self, na: usize, nb: usize, nf: usize) -> Result<HistFutureData>;

    /// `nf`-step future windows for `k` in `nf..=N`.
    fn to_ss_data(&self, nf: usize) -> Result<SsData>;

    /// Flattened history ending where the `nf`-step future window starts,
    /// for `k` in `max(na, nb) + nf..=N`.
    fn to_encoder_data(&self, na: usize, nb: usize, nf: usize) -> Result<EncoderData>;

    /// Run the transform selected by `config.format`.
    fn to_windows(&self, config: &WindowConfig) -> Result<WindowedData> {
        let WindowConfig { na, nb, nf, format } = *config;
        Ok(match format {
            WindowFormat::Io => WindowedData::Io(self.to_io_data(na, nb)?),
            WindowFormat::HistFuture => {
                WindowedData::HistFuture(self.to_hist_future_data(na, nb, nf)?)
            }
            WindowFormat::StateSpace => WindowedData::StateSpace(self.to_ss_data(nf)?),
            WindowFormat::Encoder => WindowedData::Encoder(self.to_encoder_data(na, nb, nf)?),
        })
    }

    /// Split into `(train, test)` with `split_fraction` of the post-warm-up
    /// samples going to the test side.
    fn train_test_split(&self, split_fraction: f64) -> Result<(Self, Self)>;

    /// Average consecutive blocks of `factor` samples.
    fn down_sample_by_average(&self, factor: usize) -> Result<Self>;

    fn rms(&self, real: &Self) -> Result<f64>;

    fn nrms(&self, real: &Self, multi_average: bool) -> Result<Metric>;

    fn bfr(&self, real: &Self, multi_average: bool) -> Result<Metric>;

    fn vaf(&self, real: &Self, multi_average: bool) -> Result<Metric>;

    /// Lines of `y` (or `u` when there is no output) against `t`.
    fn plot_data(&self) -> PlotData;

    /// Save as a flat named-array bundle.
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}
