//! System Identification Data
//!
//! Input/output sequence containers and the data preparation steps that sit
//! between recorded experiments and a dynamic-system model.
//!
//! # Overview
//!
//! A recording holds an input `u`, an output `y` and optionally a state
//! trace `x`, plus a warm-up index (`cheat_n`) and a normalization flag.
//! Recordings can be grouped into a collection that behaves like one long
//! data set. Both support:
//!
//! - **Windowing**: io, history/future, state-space and encoder tensors
//! - **Splitting** and **down-sampling**
//! - **Metrics**: RMS, NRMS, BFR and VAF against measured data
//! - **Normalization**: per-feature standardization fitted on training data
//! - **Persistence**: `.npz` bundles and `.npy` tensor export
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     System Identification Data                  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  sequence/      - Containers, slicing, window transforms        │
//! │  preprocessing/ - Normalization                                  │
//! │  metrics        - Fit-quality metrics                            │
//! │  export/        - .npz bundles and NumPy tensor export           │
//! │  pipeline       - Config-driven preparation                      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sysid_data::prelude::*;
//!
//! let data = SystemData::from_io(u, y)?;
//! let (train, test) = data.train_test_split(0.25)?;
//!
//! let norm = SystemDataNorm::fitted(&train)?;
//! let train = norm.transform(&train)?;
//! let io = train.to_io_data(10, 10)?;
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod metrics;
pub mod pipeline;
pub mod plot;
pub mod prelude;
pub mod preprocessing;
pub mod sequence;
pub mod validation;

// Re-exports - Errors
pub use error::{DataError, Result};

// Re-exports - Config
pub use config::{DataConfig, ExperimentMetadata, PreprocessConfig, SplitConfig, WindowConfig};

// Re-exports - Sequences
pub use sequence::{
    EncoderData, HistFutureData, IoData, MemberSelector, Operand, Selection, Signal, SsData,
    SystemData, SystemDataList, TimeSlice, WindowFormat, WindowableSequence, WindowedData,
};

// Re-exports - Preprocessing
pub use preprocessing::{Normalizable, SystemDataNorm};

// Re-exports - Metrics
pub use metrics::Metric;

// Re-exports - Export
pub use export::{
    export_to_numpy, load_system_data, ExportMetadata, Loaded, NumpyExporter,
};

// Re-exports - Plotting
pub use plot::{PlotData, PlotLine};

// Re-exports - Validation
pub use validation::{
    DataValidator, Validate, ValidationConfig, ValidationLevel, ValidationResult,
};

// Re-exports - Pipeline
pub use pipeline::{DataPipeline, PipelineOutput};
