//! Right-hand side of `y` subtraction.

use super::{SystemData, SystemDataList};
use ndarray::{Array1, Array2, ArrayD};

/// What to subtract from a container's output.
///
/// Resolved once at the call boundary; arrays broadcast against `y` in its
/// caller-facing shape (`[N]` or `[N, ny]`).
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Scalar(f64),
    Array(ArrayD<f64>),
    Data(&'a SystemData),
    List(&'a SystemDataList),
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl From<Array1<f64>> for Operand<'_> {
    fn from(value: Array1<f64>) -> Self {
        Operand::Array(value.into_dyn())
    }
}

impl From<Array2<f64>> for Operand<'_> {
    fn from(value: Array2<f64>) -> Self {
        Operand::Array(value.into_dyn())
    }
}

impl From<ArrayD<f64>> for Operand<'_> {
    fn from(value: ArrayD<f64>) -> Self {
        Operand::Array(value)
    }
}

impl<'a> From<&'a SystemData> for Operand<'a> {
    fn from(value: &'a SystemData) -> Self {
        Operand::Data(value)
    }
}

impl<'a> From<&'a SystemDataList> for Operand<'a> {
    fn from(value: &'a SystemDataList) -> Self {
        Operand::List(value)
    }
}
