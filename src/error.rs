use thiserror::Error;

/// Errors returned by the clustering API.
///
/// Only malformed input is reported here. Numerical degeneracy (e.g. an empty
/// cluster producing a NaN center) is not an error and flows through the results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KMeansError {
    #[error("matrix buffer holds {actual} values, but {rows} x {cols} = {expected} were expected")]
    ShapeMismatch { rows: usize, cols: usize, expected: usize, actual: usize },

    #[error("matrix shape {rows} x {cols} exceeds the addressable size")]
    ShapeOverflow { rows: usize, cols: usize },

    #[error("matrix must have at least one column")]
    ZeroColumns,

    #[error("dimension mismatch: samples have {sample_dims} dimensions, centers have {center_dims}")]
    DimensionMismatch { sample_dims: usize, center_dims: usize },

    #[error("cannot compare a {rows} x {cols} matrix with a {other_rows} x {other_cols} matrix")]
    MatrixMismatch { rows: usize, cols: usize, other_rows: usize, other_cols: usize },

    #[error("center set is empty")]
    NoCenters,

    #[error("assignment vector has length {actual}, expected one label per sample ({expected})")]
    AssignmentLength { expected: usize, actual: usize },

    #[error("sample {sample} is assigned to cluster {label}, but only {k} clusters exist")]
    AssignmentOutOfRange { sample: usize, label: usize, k: usize },

    #[error("cannot seed {k} centers from {sample_cnt} samples (need 1 <= k <= samples)")]
    InvalidCenterCount { k: usize, sample_cnt: usize },
}

pub type Result<T> = std::result::Result<T, KMeansError>;
