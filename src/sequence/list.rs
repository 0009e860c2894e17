//! Ordered collection of recordings sharing shape metadata.

use super::data::fmt_width;
use super::operand::Operand;
use super::signal::Signal;
use super::slice::{MemberSelector, TimeSlice};
use super::windows::{EncoderData, HistFutureData, IoData, SsData};
use super::{SystemData, WindowableSequence};
use crate::error::{DataError, Result};
use crate::metrics::{weighted_mean, weighted_mean_scalar, Metric};
use crate::plot::PlotData;
use std::fmt;
use std::path::Path;

/// Several recordings with identical `nu`, `ny` and normalization state.
///
/// Every transform runs per member and concatenates the results in member
/// order, so no window ever straddles two recordings. Metrics are
/// sample-count weighted averages of the per-member values.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemDataList {
    members: Vec<SystemData>,
    normed: bool,
}

/// Result of a member-selecting index: one recording or a sub-collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Single(SystemData),
    List(SystemDataList),
}

impl SystemDataList {
    /// Group recordings into a collection.
    ///
    /// # Errors
    ///
    /// - [`DataError::EmptyCollection`] for an empty list
    /// - [`DataError::InconsistentMember`] if any member's `nu`, `ny` or
    ///   `normed` differs from the first member's
    pub fn new(members: Vec<SystemData>) -> Result<Self> {
        let first = members.first().ok_or(DataError::EmptyCollection)?;
        let (nu, ny, normed) = (first.nu(), first.ny(), first.is_normed());

        for (index, member) in members.iter().enumerate() {
            if member.ny() != ny {
                return Err(DataError::InconsistentMember {
                    index,
                    field: "ny",
                    expected: fmt_width(ny),
                    actual: fmt_width(member.ny()),
                });
            }
            if member.nu() != nu {
                return Err(DataError::InconsistentMember {
                    index,
                    field: "nu",
                    expected: fmt_width(nu),
                    actual: fmt_width(member.nu()),
                });
            }
            if member.is_normed() != normed {
                return Err(DataError::InconsistentMember {
                    index,
                    field: "normed",
                    expected: normed.to_string(),
                    actual: member.is_normed().to_string(),
                });
            }
        }

        Ok(Self { members, normed })
    }

    pub fn members(&self) -> &[SystemData] {
        &self.members
    }

    pub fn into_members(self) -> Vec<SystemData> {
        self.members
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SystemData> {
        self.members.iter()
    }

    pub fn get(&self, index: usize) -> Option<&SystemData> {
        self.members.get(index)
    }

    pub fn n_members(&self) -> usize {
        self.members.len()
    }

    /// Sample count of each member, in order.
    pub fn lengths(&self) -> Vec<usize> {
        self.members.iter().map(SystemData::len).collect()
    }

    /// All inputs concatenated along the sample axis.
    ///
    /// For display and bulk statistics only; windowing must go through the
    /// per-member transforms.
    pub fn u(&self) -> Result<Signal> {
        let parts: Vec<&Signal> = self.members.iter().map(SystemData::u).collect();
        Signal::concat(&parts)
    }

    /// All outputs concatenated along the sample axis.
    pub fn y(&self) -> Result<Signal> {
        let parts = self
            .members
            .iter()
            .map(SystemData::output)
            .collect::<Result<Vec<_>>>()?;
        Signal::concat(&parts)
    }

    /// Time-slice every member.
    pub fn slice(&self, time: impl Into<TimeSlice>) -> Result<Self> {
        let time = time.into();
        Self::new(
            self.members
                .iter()
                .map(|m| m.slice(time))
                .collect::<Result<Vec<_>>>()?,
        )
    }

    /// Pick members, then time-slice them.
    ///
    /// A single member index returns that member alone; a member slice
    /// returns a collection.
    pub fn select(&self, time: impl Into<TimeSlice>, members: MemberSelector) -> Result<Selection> {
        let time = time.into();
        match members {
            MemberSelector::Index(index) => {
                let index = MemberSelector::resolve_index(index, self.members.len())?;
                Ok(Selection::Single(self.members[index].slice(time)?))
            }
            MemberSelector::Slice(range) => {
                let picked = range
                    .positions(self.members.len())?
                    .into_iter()
                    .map(|i| self.members[i].slice(time))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Selection::List(Self::new(picked)?))
            }
        }
    }

    /// New collection whose outputs are `y - other`.
    ///
    /// Scalars, arrays and single containers are subtracted from every
    /// member; another collection is subtracted member by member.
    pub fn subtract<'a>(&self, other: impl Into<Operand<'a>>) -> Result<Self> {
        let members = match other.into() {
            Operand::List(other) => {
                self.check_member_count(other)?;
                self.members
                    .iter()
                    .zip(other.members.iter())
                    .map(|(m, o)| m.subtract(o))
                    .collect::<Result<Vec<_>>>()?
            }
            Operand::Data(other) => {
                let other_y = other.output()?.to_dyn();
                self.members
                    .iter()
                    .map(|m| m.subtract(other_y.clone()))
                    .collect::<Result<Vec<_>>>()?
            }
            operand => self
                .members
                .iter()
                .map(|m| m.subtract(operand.clone()))
                .collect::<Result<Vec<_>>>()?,
        };
        Self::new(members)
    }

    /// Save every member under one bundle.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::export::bundle::save_system_data_list(self, path)
    }

    fn check_member_count(&self, other: &SystemDataList) -> Result<()> {
        if self.members.len() != other.members.len() {
            return Err(DataError::MemberCountMismatch {
                left: self.members.len(),
                right: other.members.len(),
            });
        }
        Ok(())
    }

    fn member_metrics<F>(&self, real: &SystemDataList, metric: F) -> Result<Metric>
    where
        F: Fn(&SystemData, &SystemData) -> Result<Metric>,
    {
        self.check_member_count(real)?;
        let values = self
            .members
            .iter()
            .zip(real.members.iter())
            .map(|(m, r)| metric(m, r))
            .collect::<Result<Vec<_>>>()?;
        weighted_mean(&values, &self.lengths())
    }
}

impl TryFrom<Vec<SystemData>> for SystemDataList {
    type Error = DataError;

    fn try_from(members: Vec<SystemData>) -> Result<Self> {
        Self::new(members)
    }
}

impl<'a> IntoIterator for &'a SystemDataList {
    type Item = &'a SystemData;
    type IntoIter = std::slice::Iter<'a, SystemData>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl WindowableSequence for SystemDataList {
    /// Total samples over all members.
    fn n_samples(&self) -> usize {
        self.members.iter().map(SystemData::len).sum()
    }

    fn nu(&self) -> Option<usize> {
        self.members[0].nu()
    }

    fn ny(&self) -> Option<usize> {
        self.members[0].ny()
    }

    fn is_normed(&self) -> bool {
        self.normed
    }

    fn to_io_data(&self, na: usize, nb: usize) -> Result<IoData> {
        let parts = self
            .members
            .iter()
            .map(|m| m.to_io_data(na, nb))
            .collect::<Result<Vec<_>>>()?;
        IoData::concat(&parts)
    }

    fn to_hist_future_data(&self, na: usize, nb: usize, nf: usize) -> Result<HistFutureData> {
        let parts = self
            .members
            .iter()
            .map(|m| m.to_hist_future_data(na, nb, nf))
            .collect::<Result<Vec<_>>>()?;
        HistFutureData::concat(&parts)
    }

    fn to_ss_data(&self, nf: usize) -> Result<SsData> {
        let parts = self
            .members
            .iter()
            .map(|m| m.to_ss_data(nf))
            .collect::<Result<Vec<_>>>()?;
        SsData::concat(&parts)
    }

    fn to_encoder_data(&self, na: usize, nb: usize, nf: usize) -> Result<EncoderData> {
        let parts = self
            .members
            .iter()
            .map(|m| m.to_encoder_data(na, nb, nf))
            .collect::<Result<Vec<_>>>()?;
        EncoderData::concat(&parts)
    }

    /// Splits each member at its own fraction and regroups the halves.
    fn train_test_split(&self, split_fraction: f64) -> Result<(Self, Self)> {
        let (left, right): (Vec<_>, Vec<_>) = self
            .members
            .iter()
            .map(|m| m.train_test_split(split_fraction))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .unzip();
        Ok((Self::new(left)?, Self::new(right)?))
    }

    fn down_sample_by_average(&self, factor: usize) -> Result<Self> {
        Self::new(
            self.members
                .iter()
                .map(|m| m.down_sample_by_average(factor))
                .collect::<Result<Vec<_>>>()?,
        )
    }

    fn rms(&self, real: &Self) -> Result<f64> {
        self.check_member_count(real)?;
        let values = self
            .members
            .iter()
            .zip(real.members.iter())
            .map(|(m, r)| m.rms(r))
            .collect::<Result<Vec<_>>>()?;
        weighted_mean_scalar(&values, &self.lengths())
    }

    fn nrms(&self, real: &Self, multi_average: bool) -> Result<Metric> {
        self.member_metrics(real, |m, r| m.nrms(r, multi_average))
    }

    fn bfr(&self, real: &Self, multi_average: bool) -> Result<Metric> {
        self.member_metrics(real, |m, r| m.bfr(r, multi_average))
    }

    fn vaf(&self, real: &Self, multi_average: bool) -> Result<Metric> {
        self.member_metrics(real, |m, r| m.vaf(r, multi_average))
    }

    /// One set of lines per member, overlaid on shared axes.
    fn plot_data(&self) -> PlotData {
        let mut combined = PlotData::default();
        for (index, member) in self.members.iter().enumerate() {
            combined.overlay(member.plot_data(), index);
        }
        combined
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        SystemDataList::save(self, path)
    }
}

impl fmt::Display for SystemDataList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SystemDataList with {} series and total length {}, nu={}, ny={}, normed={} lengths={:?}",
            self.members.len(),
            self.n_samples(),
            fmt_width(self.nu()),
            fmt_width(self.ny()),
            self.normed,
            self.lengths()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    fn member(n: usize, ny: usize) -> SystemData {
        let u = Array1::from_iter((0..n).map(|v| v as f64));
        let y = Array2::from_shape_fn((n, ny), |(i, j)| (i * (j + 1)) as f64);
        SystemData::from_io(u, y).unwrap()
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            SystemDataList::new(Vec::new()),
            Err(DataError::EmptyCollection)
        ));
    }

    #[test]
    fn test_inconsistent_ny_rejected() {
        let err = SystemDataList::new(vec![member(5, 2), member(5, 3)]).unwrap_err();
        assert!(matches!(
            err,
            DataError::InconsistentMember { index: 1, field: "ny", .. }
        ));
    }

    #[test]
    fn test_inconsistent_normed_rejected() {
        let normed = member(5, 2).with_normed(true);
        let err = SystemDataList::new(vec![member(5, 2), normed]).unwrap_err();
        assert!(matches!(
            err,
            DataError::InconsistentMember { field: "normed", .. }
        ));
    }

    #[test]
    fn test_totals_and_concatenation() {
        let list = SystemDataList::new(vec![member(4, 2), member(6, 2)]).unwrap();
        assert_eq!(list.n_samples(), 10);
        assert_eq!(list.lengths(), vec![4, 6]);
        assert_eq!(list.y().unwrap().values().shape(), &[10, 2]);
        assert_eq!(list.u().unwrap().to_dyn().shape(), &[10]);
    }

    #[test]
    fn test_windows_do_not_straddle_members() {
        let list = SystemDataList::new(vec![member(5, 1), member(7, 1)]).unwrap();
        let io = list.to_io_data(2, 2).unwrap();
        assert_eq!(io.len(), (5 - 2) + (7 - 2));
    }

    #[test]
    fn test_select_single_and_slice() {
        let list = SystemDataList::new(vec![member(10, 1), member(20, 1), member(30, 1)]).unwrap();

        match list.select(TimeSlice::until(-10), MemberSelector::Index(-1)).unwrap() {
            Selection::Single(data) => assert_eq!(data.len(), 20),
            Selection::List(_) => panic!("expected a single member"),
        }

        match list
            .select(TimeSlice::full(), MemberSelector::Slice(TimeSlice::range(0, 2)))
            .unwrap()
        {
            Selection::List(sub) => assert_eq!(sub.lengths(), vec![10, 20]),
            Selection::Single(_) => panic!("expected a collection"),
        }
    }

    #[test]
    fn test_subtract_member_count_mismatch() {
        let a = SystemDataList::new(vec![member(5, 1), member(5, 1)]).unwrap();
        let b = SystemDataList::new(vec![member(5, 1)]).unwrap();
        assert!(matches!(
            a.subtract(&b),
            Err(DataError::MemberCountMismatch { .. })
        ));
    }

    #[test]
    fn test_display() {
        let list = SystemDataList::new(vec![member(4, 2), member(6, 2)]).unwrap();
        assert_eq!(
            list.to_string(),
            "SystemDataList with 2 series and total length 10, nu=None, ny=2, normed=false lengths=[4, 6]"
        );
    }
}
