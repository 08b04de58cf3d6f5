use crate::shape::{ParamShape, Shape};

/// All errors that can occur within Strata.
///
/// Every failure is local and synchronous: it is returned to the caller of
/// the operation that triggered it (`forward`, `resolve`, `value`,
/// `attach_initializer`) and nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Resolution was attempted before any initializer was attached.
    #[error("parameter '{name}' has no initializer attached; call initialize() before the first forward pass")]
    MissingInitializer { name: String },

    /// Re-initialization or re-attachment after the parameter was resolved.
    #[error("parameter '{name}' is already resolved and cannot be re-initialized")]
    AlreadyResolved { name: String },

    /// A parameter was asked to take a shape it cannot have.
    #[error("shape conflict for parameter '{name}': has {existing}, requested {requested}")]
    ShapeConflict {
        name: String,
        existing: ParamShape,
        requested: Shape,
    },

    /// Forward input width disagrees with a layer's fixed input width.
    #[error("shape mismatch in layer '{layer}': expected input width {expected}, got {got}")]
    ShapeMismatch {
        layer: String,
        expected: usize,
        got: usize,
    },

    /// Parameter storage was accessed before the shape was resolved.
    #[error("parameter '{name}' has not been resolved yet; run a forward pass first")]
    NotResolved { name: String },

    /// Operation requires a specific rank (number of dimensions).
    #[error("rank mismatch: expected rank {expected}, got {got}")]
    RankMismatch { expected: usize, got: usize },

    /// A layer or initializer was configured with an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error bubbled up from the array library.
    #[error("array error: {0}")]
    Array(#[from] ndarray::ShapeError),
}

impl Error {
    /// Create an [`Error::InvalidConfig`] from any string message.
    pub fn config(s: impl Into<String>) -> Self {
        Error::InvalidConfig(s.into())
    }
}

/// Convenience Result type used throughout Strata.
pub type Result<T> = std::result::Result<T, Error>;
