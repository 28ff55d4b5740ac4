use nalgebra::Point2;
use tracing::info;

use crate::error::{ConfigurationError, KrigingError};

use self::experimental_variogram::{DirectionFilter, ExperimentalVariogram};
use self::model_variograms::{
    iso_fitter, CustomVariogram, VariogramFunction, VariogramKind, VariogramModel, WeightScheme,
};

pub mod experimental_variogram;
pub mod model_variograms;
pub mod statistics;

/// An experimental variogram and the model chosen to describe it.
#[derive(Debug, Clone)]
pub struct FittedVariogram {
    pub experimental: ExperimentalVariogram,
    pub model: VariogramModel,
}

/// Compute the experimental variogram of `values` and pick model parameters for it.
///
/// Explicit `parameters` are validated and used verbatim. Otherwise built-in models are
/// fitted by bounded least squares; custom models always need explicit parameters.
/// A `direction` restricts the experimental variogram to pairs within an azimuth window.
#[allow(clippy::too_many_arguments)]
pub fn fit(
    points: &[Point2<f64>],
    values: &[f64],
    kind: VariogramKind,
    parameters: Option<Vec<f64>>,
    custom: Option<CustomVariogram>,
    nlags: usize,
    weight: WeightScheme,
    direction: Option<DirectionFilter>,
) -> Result<FittedVariogram, KrigingError> {
    let function = VariogramFunction::resolve(kind, custom)?;
    let experimental = ExperimentalVariogram::directional(points, values, nlags, direction)?;

    let parameters = match parameters {
        Some(parameters) => parameters,
        None if kind == VariogramKind::Custom => {
            return Err(ConfigurationError::MissingCustomParameters.into())
        }
        None => iso_fitter::fit_parameters(&experimental, &function, weight)?,
    };
    let model = VariogramModel::new(function, parameters)?;

    info!(model = %kind, parameters = %model.describe(), "variogram model initialized");

    Ok(FittedVariogram {
        experimental,
        model,
    })
}
