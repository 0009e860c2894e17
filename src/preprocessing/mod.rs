//! Preprocessing applied to recordings before windowing.
//!
//! - **Normalization**: per-feature standardization of `u` and `y`, fitted on
//!   pooled training samples and reversible on model outputs
//!
//! Down-sampling and splitting live on the containers themselves
//! ([`crate::sequence::WindowableSequence`]).
//!
//! # Example
//!
//! ```ignore
//! use sysid_data::preprocessing::SystemDataNorm;
//!
//! let norm = SystemDataNorm::fitted(&train)?;
//! let train = norm.transform(&train)?;
//! let test = norm.transform(&test)?;
//! ```

pub mod normalization;

pub use normalization::{Normalizable, SystemDataNorm};
