//! Contiguous index selectors for time and member axes.
//!
//! [`TimeSlice`] follows the usual `start:stop:step` convention: negative
//! bounds count from the end, out-of-range bounds are clamped, and a
//! negative step walks backwards.

use crate::error::{DataError, Result};
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

/// A `start:stop:step` selector over a sequence axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSlice {
    pub start: Option<isize>,
    pub stop: Option<isize>,
    pub step: Option<isize>,
}

impl TimeSlice {
    /// Selects everything (`[:]`).
    pub fn full() -> Self {
        Self::default()
    }

    /// `[start:stop]`
    pub fn range(start: isize, stop: isize) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    /// `[start:]`
    pub fn starting_at(start: isize) -> Self {
        Self {
            start: Some(start),
            ..Self::default()
        }
    }

    /// `[:stop]`
    pub fn until(stop: isize) -> Self {
        Self {
            stop: Some(stop),
            ..Self::default()
        }
    }

    /// Same bounds with an explicit step.
    pub fn with_step(mut self, step: isize) -> Self {
        self.step = Some(step);
        self
    }

    /// Resolves the slice against an axis of length `len`.
    ///
    /// Returns `(start, stop, step)` with bounds clamped the same way a
    /// sequence slice would clamp them.
    pub fn indices(&self, len: usize) -> Result<(isize, isize, isize)> {
        let len = len as isize;
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(DataError::ZeroStep);
        }

        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };

        let clamp = |bound: Option<isize>, default: isize| match bound {
            None => default,
            Some(b) if b < 0 => (b + len).max(lower),
            Some(b) => b.min(upper),
        };

        let start = clamp(self.start, if step < 0 { upper } else { lower });
        let stop = clamp(self.stop, if step < 0 { lower } else { upper });
        Ok((start, stop, step))
    }

    /// Positions selected on an axis of length `len`, in selection order.
    pub fn positions(&self, len: usize) -> Result<Vec<usize>> {
        let (start, stop, step) = self.indices(len)?;
        let mut out = Vec::new();
        let mut i = start;
        if step > 0 {
            while i < stop {
                out.push(i as usize);
                i += step;
            }
        } else {
            while i > stop {
                out.push(i as usize);
                i += step;
            }
        }
        Ok(out)
    }
}

impl From<Range<usize>> for TimeSlice {
    fn from(r: Range<usize>) -> Self {
        Self::range(r.start as isize, r.end as isize)
    }
}

impl From<RangeFrom<usize>> for TimeSlice {
    fn from(r: RangeFrom<usize>) -> Self {
        Self::starting_at(r.start as isize)
    }
}

impl From<RangeTo<usize>> for TimeSlice {
    fn from(r: RangeTo<usize>) -> Self {
        Self::until(r.end as isize)
    }
}

impl From<RangeFull> for TimeSlice {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

/// Which members of a collection take part in a selection.
///
/// A single index yields a bare container; a slice yields a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberSelector {
    Index(isize),
    Slice(TimeSlice),
}

impl MemberSelector {
    /// Resolves a single index (negative counts from the end).
    pub(crate) fn resolve_index(index: isize, len: usize) -> Result<usize> {
        let resolved = if index < 0 { index + len as isize } else { index };
        if resolved < 0 || resolved >= len as isize {
            return Err(DataError::MemberOutOfRange { index, len });
        }
        Ok(resolved as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_slice() {
        assert_eq!(TimeSlice::full().indices(5).unwrap(), (0, 5, 1));
        assert_eq!(TimeSlice::full().positions(3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_negative_bounds() {
        // [:-10] on 100 samples
        assert_eq!(TimeSlice::until(-10).indices(100).unwrap(), (0, 90, 1));
        // [-3:] on 5 samples
        assert_eq!(TimeSlice::starting_at(-3).positions(5).unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_clamped_bounds() {
        assert_eq!(TimeSlice::range(-50, 50).indices(10).unwrap(), (0, 10, 1));
    }

    #[test]
    fn test_stepped_and_reversed() {
        let stepped = TimeSlice::full().with_step(2);
        assert_eq!(stepped.positions(5).unwrap(), vec![0, 2, 4]);

        let reversed = TimeSlice::full().with_step(-1);
        assert_eq!(reversed.indices(4).unwrap(), (3, -1, -1));
        assert_eq!(reversed.positions(4).unwrap(), vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_zero_step_rejected() {
        let slice = TimeSlice::full().with_step(0);
        assert!(matches!(slice.indices(3), Err(DataError::ZeroStep)));
    }

    #[test]
    fn test_member_index_resolution() {
        assert_eq!(MemberSelector::resolve_index(-1, 3).unwrap(), 2);
        assert!(MemberSelector::resolve_index(3, 3).is_err());
    }
}
