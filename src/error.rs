//! Error types shared across the crate.
//!
//! Every fallible operation returns [`crate::Result`], and the variants here
//! carry enough context (offending shapes, indices, parameter names) for a
//! caller to recover or report precisely instead of terminating.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure modes of the engine.
#[derive(Debug, Error)]
pub enum Error {
    /// Two shapes cannot be combined: broadcasting rules are violated, the
    /// inner matrix-multiply dimensions disagree, or a pooling window does
    /// not fit the input.
    #[error("{op} is not defined for shapes {left:?} and {right:?}")]
    IncompatibleShapes {
        op: &'static str,
        left: Vec<usize>,
        right: Vec<usize>,
    },

    /// A rank-specific operation received a tensor of the wrong rank.
    #[error("{op} requires a rank-{expected} tensor, found shape {found:?}")]
    RankMismatch {
        op: &'static str,
        expected: usize,
        found: Vec<usize>,
    },

    /// Invalid data or hyperparameters at construction time: non-positive
    /// dimensions, ragged input rows, a buffer whose length does not match
    /// the shape, or an out-of-range hyperparameter.
    #[error("invalid construction: {0}")]
    Construction(String),

    /// The operation exists in the API surface but is deliberately not
    /// implemented (e.g. the Softmax and Tanh backward derivatives).
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A bounds-checked tensor read fell outside the tensor's shape.
    #[error("index {index:?} is out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },

    /// A layer's backward pass was handed a cache produced by a different
    /// layer variant.
    #[error("backward pass received a cache from a different layer (expected {expected})")]
    CacheMismatch { expected: &'static str },

    /// A parameter-update map is missing a parameter the layer owns.
    #[error("no update supplied for parameter '{0}'")]
    MissingParameter(&'static str),

    /// Reading an architecture configuration file failed.
    #[error("failed to read architecture file: {0}")]
    Io(#[from] std::io::Error),

    /// An architecture configuration file contained invalid JSON.
    #[error("failed to parse architecture file: {0}")]
    Parse(#[from] serde_json::Error),

    /// An architecture configuration parsed but failed validation.
    #[error("invalid architecture: {0}")]
    InvalidArchitecture(String),
}
