use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Two operands (or an operand and an index) have incompatible shapes.
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    Shape {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Network input width does not match the first layer.
    #[error("expected {expected} input features, got {actual}")]
    Dimension { expected: usize, actual: usize },

    /// Features and labels disagree, or a dataset cannot be split/batched.
    #[error("invalid dataset: {0}")]
    Dataset(String),

    /// The training entry contract was violated.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A batch cost became NaN or infinite while the guard was enabled.
    #[error("non-finite cost at epoch {epoch}, batch {batch}")]
    NonFinite { epoch: usize, batch: usize },

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape(op: &'static str, left: (usize, usize), right: (usize, usize)) -> Error {
        Error::Shape { op, left, right }
    }
}
