use thiserror::Error;

/// Errors raised by the geometry routines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no curvature offsets left for edge {from} -> {to}")]
    OutOfRange { from: String, to: String },
    #[error("labels still conflicting after {rounds} rounds ({conflicts} pairs closer than {threshold})")]
    Convergence {
        rounds: usize,
        conflicts: usize,
        threshold: f64,
    },
    #[error("edge {from} -> {to} references node without a position: {missing}")]
    MissingNode {
        from: String,
        to: String,
        missing: String,
    },
}

pub type Result<T> = std::result::Result<T, GeometryError>;
