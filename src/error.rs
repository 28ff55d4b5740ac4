use thiserror::Error;

use crate::kriging::Backend;
use crate::variography::model_variograms::iso_fitter::FitError;
use crate::variography::model_variograms::VariogramKind;

pub type Result<T> = std::result::Result<T, KrigingError>;

/// Errors surfaced by a kriging session.
#[derive(Debug, Error)]
pub enum KrigingError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("simple kriging needs a variogram with a finite sill, '{model}' is unbounded")]
    ModelInapplicable { model: VariogramKind },

    #[error("numerical error: {0}")]
    Numerical(#[from] NumericalError),

    #[error("variogram fit failed: {0}")]
    Fit(#[from] FitError),

    #[error("execution cancelled after {completed} query points")]
    Cancelled { completed: usize },

    #[error("column '{column}' not found in input data")]
    MissingColumn { column: String },

    #[error("invalid value '{value}' in column '{column}'")]
    InvalidValue { column: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Caller input that violates a contract. Never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("variogram model '{0}' is not supported")]
    UnknownVariogramModel(String),

    #[error("a custom variogram model requires a variogram function")]
    MissingCustomFunction,

    #[error("variogram parameters must be given explicitly for a custom variogram model")]
    MissingCustomParameters,

    #[error("{model} variogram model takes exactly {expected} parameters, got {found}")]
    ParameterCount {
        model: VariogramKind,
        expected: usize,
        found: usize,
    },

    #[error("variogram parameter list is empty, parameters[0] must hold the sill")]
    EmptyParameters,

    #[error("backend '{0}' is not supported")]
    UnknownBackend(String),

    #[error("backend '{backend}' does not support a moving window, use 'loop'")]
    UnsupportedMovingWindowBackend { backend: Backend },

    #[error("moving window needs between 1 and {available} neighbors, got {requested}")]
    InvalidNeighborhoodSize { requested: usize, available: usize },

    #[error("mask dimensions {found:?} do not match grid dimensions {expected:?}")]
    MaskShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("xpoints ({x}) and ypoints ({y}) must have the same length in points mode")]
    PointCountMismatch { x: usize, y: usize },

    #[error("data arrays differ in length: x = {x}, y = {y}, z = {z}")]
    DataLengthMismatch { x: usize, y: usize, z: usize },

    #[error("at least 2 data points are required, got {found}")]
    TooFewPoints { found: usize },

    #[error("anisotropy scaling must be positive and finite, got {0}")]
    InvalidAnisotropyScaling(f64),

    #[error("number of lags must be at least 1")]
    InvalidLagCount,

    #[error("direction window [{min_theta}, {max_theta}] needs finite bounds with min <= max")]
    InvalidDirectionWindow { min_theta: f64, max_theta: f64 },
}

/// Failure of the linear algebra behind a solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericalError {
    #[error("kriging matrix of size {size}x{size} is singular or ill-conditioned")]
    SingularMatrix { size: usize },

    #[error("reduced kriging system for query point {query_index} could not be solved")]
    SolveFailed { query_index: usize },
}
