//! Error types for sequence containers, normalization and persistence.

use thiserror::Error;

/// Errors raised by container construction, transforms and I/O.
///
/// Every variant is a precondition violation reported straight back to the
/// caller; nothing in this crate retries or recovers internally.
#[derive(Debug, Error)]
pub enum DataError {
    /// Neither an input nor an output sequence was supplied.
    #[error("either y or u must be provided")]
    MissingSignals,

    /// Two sequences of one container disagree on their sample count.
    #[error("sample count mismatch for {field}: expected {expected}, got {actual}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An array with an unsupported number of dimensions was supplied.
    #[error("{field} must be 1-D or 2-D, got {ndim} dimensions")]
    UnsupportedRank { field: &'static str, ndim: usize },

    /// `cheat_n` lies past the end of the sequence.
    #[error("cheat_n ({cheat_n}) exceeds the number of samples ({n_samples})")]
    CheatOutOfRange { cheat_n: usize, n_samples: usize },

    /// The operation needs an output sequence but the container has none.
    #[error("operation requires an output sequence y")]
    MissingOutput,

    /// A collection was built from zero containers.
    #[error("at least one data set should be provided")]
    EmptyCollection,

    /// Collection members disagree on shape metadata or normalization state.
    #[error("member {index} has inconsistent {field}: expected {expected}, got {actual}")]
    InconsistentMember {
        index: usize,
        field: &'static str,
        expected: String,
        actual: String,
    },

    /// Two collections compared member-wise have different member counts.
    #[error("collections have different member counts ({left} vs {right})")]
    MemberCountMismatch { left: usize, right: usize },

    /// A single-member selector points outside the collection.
    #[error("member index {index} out of range for {len} members")]
    MemberOutOfRange { index: isize, len: usize },

    /// A slice with a zero step.
    #[error("slice step cannot be zero")]
    ZeroStep,

    /// Transform called on data that is already normalized.
    #[error("data is already normalized")]
    AlreadyNormalized,

    /// Inverse transform called on data that is not normalized.
    #[error("data is not normalized")]
    NotNormalized,

    /// Normalizer statistics do not broadcast against the data.
    #[error("{field} statistics of width {stats} do not match data width {data}")]
    StatsMismatch {
        field: &'static str,
        stats: usize,
        data: usize,
    },

    /// There are no samples to fit statistics on.
    #[error("cannot fit statistics on an empty data set")]
    EmptyFit,

    /// Down-sampling factor of zero.
    #[error("down-sampling factor must be a positive integer, got {0}")]
    InvalidFactor(usize),

    /// Split fraction outside `[0, 1]` or not finite.
    #[error("split fraction must lie in [0, 1], got {0}")]
    InvalidFraction(f64),

    /// A subtraction operand that does not broadcast against `y`.
    #[error("operand of shape {operand:?} does not broadcast to y of shape {target:?}")]
    OperandShape {
        operand: Vec<usize>,
        target: Vec<usize>,
    },

    /// The operand kind cannot be subtracted from this container type.
    #[error("cannot subtract a {0} from this data")]
    UnsupportedOperand(&'static str),

    /// Per-member metrics could not be combined.
    #[error("metric values have incompatible shapes")]
    MetricShapeMismatch,

    /// Weighted average with weights summing to zero.
    #[error("weights sum to zero")]
    ZeroTotalWeight,

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Bundle file is missing required keys or carries malformed values.
    #[error("invalid data bundle: {0}")]
    Bundle(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    ReadNpy(#[from] ndarray_npy::ReadNpyError),

    #[error(transparent)]
    WriteNpy(#[from] ndarray_npy::WriteNpyError),

    #[error(transparent)]
    ReadNpz(#[from] ndarray_npy::ReadNpzError),

    #[error(transparent)]
    WriteNpz(#[from] ndarray_npy::WriteNpzError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DataError>;
