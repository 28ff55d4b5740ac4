use itertools::izip;
use ordered_float::OrderedFloat;
use rmpfit::{MPConfig, MPFitter, MPPar, MPResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::variography::experimental_variogram::ExperimentalVariogram;

use super::{VariogramFunction, VariogramKind};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("experimental variogram has no populated lags")]
    NoLags,
    #[error("invalid sill: {0}")]
    InvalidSill(f64),
    #[error("invalid range: {0}")]
    InvalidRange(f64),
    #[error("custom variogram models cannot be fitted automatically")]
    CustomModel,
    #[error("{lags} populated lags cannot determine {parameters} parameters, give them explicitly")]
    TooFewLags { lags: usize, parameters: usize },
    #[error("least squares solver failed: {0}")]
    Solver(String),
}

/// Weighting of the experimental lags in the least-squares fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightScheme {
    /// Every lag counts the same.
    #[default]
    None,
    /// `1 / lag`, favouring short lags.
    InverseLag,
    /// `1 / semivariance_error` of each bin.
    InverseError,
    /// `n_bins - bin_index`.
    BinRank,
}

impl WeightScheme {
    pub fn weights(&self, variogram: &ExperimentalVariogram) -> Vec<f64> {
        let n = variogram.len();
        match self {
            WeightScheme::None => vec![1.0; n],
            WeightScheme::InverseLag => variogram
                .lags
                .iter()
                .map(|lag| if *lag > 0.0 { 1.0 / lag } else { 0.0 })
                .collect(),
            WeightScheme::InverseError => {
                let inverse = variogram
                    .semivariance_error
                    .iter()
                    .map(|e| if *e > 0.0 { Some(1.0 / e) } else { None })
                    .collect::<Vec<_>>();
                //exact bins take the largest finite weight
                let fallback = inverse
                    .iter()
                    .flatten()
                    .copied()
                    .max_by_key(|w| OrderedFloat(*w))
                    .unwrap_or(1.0);
                inverse.into_iter().map(|w| w.unwrap_or(fallback)).collect()
            }
            WeightScheme::BinRank => (0..n).map(|i| (n - i) as f64).collect(),
        }
    }
}

/// Bounded least-squares fit of one variogram function to an experimental variogram.
pub struct VariogramFitter<'a> {
    pub lags: &'a [f64],
    pub semivariance: &'a [f64],
    pub weights: Vec<f64>,
    pub function: &'a VariogramFunction,
    pub mppar_params: Vec<MPPar>,
}

impl<'a> VariogramFitter<'a> {
    pub fn new(
        variogram: &'a ExperimentalVariogram,
        function: &'a VariogramFunction,
        weight: WeightScheme,
        bounds: &[(f64, f64)],
    ) -> Self {
        let mppar_params = bounds
            .iter()
            .map(|(low, up)| MPPar {
                limited_low: true,
                limit_low: *low,
                limited_up: up.is_finite(),
                limit_up: if up.is_finite() { *up } else { 0.0 },
                ..Default::default()
            })
            .collect();

        Self {
            lags: variogram.lags.as_slice(),
            semivariance: variogram.semivariance.as_slice(),
            weights: weight.weights(variogram),
            function,
            mppar_params,
        }
    }

    pub fn fit(&self, initial: Vec<f64>) -> Result<Vec<f64>, FitError> {
        let mut params = initial;
        self.mpfit(
            params.as_mut_slice(),
            Some(self.mppar_params.as_slice()),
            &MPConfig::default(),
        )
        .map_err(|e| FitError::Solver(format!("{}", e)))?;
        Ok(params)
    }
}

impl MPFitter for VariogramFitter<'_> {
    fn eval(&self, params: &[f64], deviates: &mut [f64]) -> MPResult<()> {
        for (d, lag, semivar, w) in izip!(
            deviates.iter_mut(),
            self.lags.iter(),
            self.semivariance.iter(),
            self.weights.iter()
        ) {
            *d = (self.function.evaluate(params, *lag) - semivar) * w;
        }

        Ok(())
    }

    fn number_of_points(&self) -> usize {
        self.lags.len()
    }
}

/// Fit the parameters of `function` to `variogram`.
///
/// Starting guesses and bounds depend on the model kind: slope-type models start from
/// the overall slope of the experimental curve, sill-type models from its maximum.
pub fn fit_parameters(
    variogram: &ExperimentalVariogram,
    function: &VariogramFunction,
    weight: WeightScheme,
) -> Result<Vec<f64>, FitError> {
    if variogram.is_empty() {
        return Err(FitError::NoLags);
    }

    let max_of = |values: &[f64]| {
        values
            .iter()
            .copied()
            .max_by_key(|v| OrderedFloat(*v))
            .unwrap_or(f64::NAN)
    };
    let min_of = |values: &[f64]| {
        values
            .iter()
            .copied()
            .min_by_key(|v| OrderedFloat(*v))
            .unwrap_or(f64::NAN)
    };

    let (max_sv, min_sv) = (
        max_of(&variogram.semivariance),
        min_of(&variogram.semivariance),
    );
    let (max_lag, min_lag) = (max_of(&variogram.lags), min_of(&variogram.lags));
    if !max_sv.is_finite() {
        return Err(FitError::InvalidSill(max_sv));
    }
    if !max_lag.is_finite() {
        return Err(FitError::InvalidRange(max_lag));
    }

    let slope = if max_lag > min_lag {
        (max_sv - min_sv) / (max_lag - min_lag)
    } else {
        0.0
    };

    let (initial, bounds) = match function.kind() {
        VariogramKind::Linear => (
            vec![slope, min_sv],
            vec![(0.0, f64::INFINITY), (0.0, f64::INFINITY)],
        ),
        VariogramKind::Power => (
            vec![slope, 1.1, min_sv],
            vec![(0.0, f64::INFINITY), (0.0, 2.0), (0.0, f64::INFINITY)],
        ),
        VariogramKind::Gaussian | VariogramKind::Spherical | VariogramKind::Exponential => (
            vec![max_sv, 0.5 * max_lag, min_sv],
            vec![(0.0, 10.0 * max_sv), (0.0, max_lag), (0.0, max_sv)],
        ),
        VariogramKind::Custom => return Err(FitError::CustomModel),
    };

    if variogram.len() < bounds.len() {
        return Err(FitError::TooFewLags {
            lags: variogram.len(),
            parameters: bounds.len(),
        });
    }

    VariogramFitter::new(variogram, function, weight, &bounds).fit(initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variography::model_variograms::{iso_exponential::IsoExponential, IsoVariogramModel};
    use approx::assert_relative_eq;

    fn synthetic(lags: Vec<f64>, f: impl Fn(f64) -> f64) -> ExperimentalVariogram {
        let semivariance = lags.iter().map(|h| f(*h)).collect::<Vec<_>>();
        let n = lags.len();
        ExperimentalVariogram {
            lags,
            semivariance,
            semivariance_error: vec![0.1; n],
            counts: vec![10; n],
        }
    }

    #[test]
    fn recovers_linear_model() {
        let lags = (1..=8).map(|i| i as f64 * 0.5).collect();
        let variogram = synthetic(lags, |h| 0.8 * h + 0.3);
        let params =
            fit_parameters(&variogram, &VariogramFunction::Linear, WeightScheme::None).unwrap();
        assert_relative_eq!(params[0], 0.8, max_relative = 1e-6);
        assert_relative_eq!(params[1], 0.3, max_relative = 1e-6);
    }

    #[test]
    fn recovers_exponential_model() {
        let truth = IsoExponential::new(2.0, 1.0, 0.2);
        let lags = (1..=12).map(|i| i as f64 * 0.25).collect();
        let variogram = synthetic(lags, |h| truth.variogram(h));
        let params = fit_parameters(
            &variogram,
            &VariogramFunction::Exponential,
            WeightScheme::None,
        )
        .unwrap();
        assert_relative_eq!(params[0], 2.0, max_relative = 1e-3);
        assert_relative_eq!(params[1], 1.0, max_relative = 1e-3);
        assert_relative_eq!(params[2], 0.2, max_relative = 1e-3);
    }

    #[test]
    fn weight_schemes() {
        let variogram = ExperimentalVariogram {
            lags: vec![0.5, 1.0, 2.0],
            semivariance: vec![0.1, 0.2, 0.3],
            semivariance_error: vec![0.5, 0.0, 0.25],
            counts: vec![1, 1, 1],
        };
        assert_eq!(WeightScheme::None.weights(&variogram), vec![1.0; 3]);
        assert_eq!(WeightScheme::InverseLag.weights(&variogram), vec![2.0, 1.0, 0.5]);
        assert_eq!(WeightScheme::InverseError.weights(&variogram), vec![2.0, 4.0, 4.0]);
        assert_eq!(WeightScheme::BinRank.weights(&variogram), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn empty_variogram_is_rejected() {
        let err = fit_parameters(
            &ExperimentalVariogram::default(),
            &VariogramFunction::Spherical,
            WeightScheme::None,
        )
        .unwrap_err();
        assert_eq!(err, FitError::NoLags);
    }

    #[test]
    fn single_lag_cannot_fit_two_parameters() {
        let variogram = ExperimentalVariogram {
            lags: vec![1.0],
            semivariance: vec![0.5],
            semivariance_error: vec![0.0],
            counts: vec![1],
        };
        assert_eq!(
            fit_parameters(&variogram, &VariogramFunction::Linear, WeightScheme::None),
            Err(FitError::TooFewLags {
                lags: 1,
                parameters: 2
            })
        );
        assert_eq!(
            fit_parameters(&variogram, &VariogramFunction::Spherical, WeightScheme::None),
            Err(FitError::TooFewLags {
                lags: 1,
                parameters: 3
            })
        );
    }
}
