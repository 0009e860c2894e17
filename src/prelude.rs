//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use sysid_data::prelude::*;
//!
//! let data = SystemData::from_io(u, y)?;
//! let output = DataPipeline::from_config(DataConfig::default())?.process(&data)?;
//! ```
//!
//! # What's Included
//!
//! ## Containers
//! - [`SystemData`], [`SystemDataList`] and the shared [`WindowableSequence`] trait
//! - [`TimeSlice`], [`MemberSelector`] for indexing
//!
//! ## Preparation
//! - [`SystemDataNorm`] - Standardization
//! - [`DataPipeline`], [`DataConfig`], [`WindowConfig`]
//!
//! ## Output
//! - [`WindowedData`], [`Metric`], [`NumpyExporter`]

pub use crate::config::{DataConfig, PreprocessConfig, SplitConfig, WindowConfig};
pub use crate::error::{DataError, Result};
pub use crate::export::{load_system_data, Loaded, NumpyExporter};
pub use crate::metrics::Metric;
pub use crate::pipeline::{DataPipeline, PipelineOutput};
pub use crate::preprocessing::{Normalizable, SystemDataNorm};
pub use crate::sequence::{
    MemberSelector, Selection, Signal, SystemData, SystemDataList, TimeSlice, WindowFormat,
    WindowableSequence, WindowedData,
};
pub use crate::validation::{DataValidator, ValidationResult};
