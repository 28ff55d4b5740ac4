//! Two-dimensional simple kriging.
//!
//! A [`SimpleKriging`](kriging::simple_kriging::SimpleKriging) session owns the
//! conditioning data, the anisotropy correction and a fitted variogram, and
//! solves the kriging system at query points with one of three strategies:
//! a dense batched solve, a per-point loop, or a nearest-neighbor moving window.

pub mod error;
pub mod geometry;
pub mod kriging;
pub mod spatial_database;
pub mod systems;
pub mod variography;

pub use error::{ConfigurationError, KrigingError, NumericalError, Result};

/// Distances below this are treated as zero when evaluating the variogram.
pub const EPS: f64 = 1.0e-10;

pub mod prelude {

    pub mod re_exports {
        pub use nalgebra;
        pub use ndarray;
    }

    pub use crate::error::{ConfigurationError, KrigingError, NumericalError};
    pub use crate::geometry::anisotropy::AnisotropyParameters;
    pub use crate::kriging::{
        simple_kriging::{KrigingConfig, SimpleKriging},
        Backend, CancellationToken, ExecuteOptions, GridEstimates, KrigingOutput,
        PointEstimates, QueryStyle,
    };
    pub use crate::spatial_database::point_set::PointSet;
    pub use crate::variography::{
        model_variograms::{CustomVariogram, VariogramKind, VariogramModel, WeightScheme},
        statistics::CrossValidation,
    };
}
