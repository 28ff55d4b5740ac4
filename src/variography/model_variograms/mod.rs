use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, KrigingError};

pub mod iso_exponential;
pub mod iso_fitter;
pub mod iso_gaussian;
pub mod iso_spherical;
pub mod linear;
pub mod power;

pub use iso_fitter::WeightScheme;

use iso_exponential::IsoExponential;
use iso_gaussian::IsoGaussian;
use iso_spherical::IsoSpherical;
use linear::Linear;
use power::Power;

/// A variogram curve parameterised by a flat parameter slice.
pub trait IsoVariogramModel: Sized {
    const PARAMETER_NAMES: &'static [&'static str];

    fn from_params(params: &[f64]) -> Self;

    fn variogram(&self, h: f64) -> f64;

    /// Sill of the curve, `None` when the semivariance grows without bound.
    fn c_0(&self) -> Option<f64>;

    fn covariogram(&self, h: f64) -> Option<f64> {
        self.c_0().map(|sill| sill - self.variogram(h))
    }
}

/// Names of the supported variogram models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariogramKind {
    #[default]
    Linear,
    Power,
    Gaussian,
    Spherical,
    Exponential,
    Custom,
}

impl VariogramKind {
    /// Number of parameters a built-in model takes. `None` for custom models.
    pub fn parameter_count(&self) -> Option<usize> {
        match self {
            VariogramKind::Linear => Some(Linear::PARAMETER_NAMES.len()),
            VariogramKind::Power => Some(Power::PARAMETER_NAMES.len()),
            VariogramKind::Gaussian => Some(IsoGaussian::PARAMETER_NAMES.len()),
            VariogramKind::Spherical => Some(IsoSpherical::PARAMETER_NAMES.len()),
            VariogramKind::Exponential => Some(IsoExponential::PARAMETER_NAMES.len()),
            VariogramKind::Custom => None,
        }
    }

    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            VariogramKind::Linear => Linear::PARAMETER_NAMES,
            VariogramKind::Power => Power::PARAMETER_NAMES,
            VariogramKind::Gaussian => IsoGaussian::PARAMETER_NAMES,
            VariogramKind::Spherical => IsoSpherical::PARAMETER_NAMES,
            VariogramKind::Exponential => IsoExponential::PARAMETER_NAMES,
            VariogramKind::Custom => &[],
        }
    }

    /// Linear and power models have no sill.
    pub fn is_bounded(&self) -> bool {
        !matches!(self, VariogramKind::Linear | VariogramKind::Power)
    }
}

impl fmt::Display for VariogramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariogramKind::Linear => "linear",
            VariogramKind::Power => "power",
            VariogramKind::Gaussian => "gaussian",
            VariogramKind::Spherical => "spherical",
            VariogramKind::Exponential => "exponential",
            VariogramKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

impl FromStr for VariogramKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(VariogramKind::Linear),
            "power" => Ok(VariogramKind::Power),
            "gaussian" => Ok(VariogramKind::Gaussian),
            "spherical" => Ok(VariogramKind::Spherical),
            "exponential" => Ok(VariogramKind::Exponential),
            "custom" => Ok(VariogramKind::Custom),
            _ => Err(ConfigurationError::UnknownVariogramModel(s.to_string())),
        }
    }
}

type VariogramFn = dyn Fn(&[f64], f64) -> f64 + Send + Sync;

/// User supplied variogram `(parameters, distance) -> semivariance`.
///
/// `parameters[0]` is read as the sill by the solver.
#[derive(Clone)]
pub struct CustomVariogram(Arc<VariogramFn>);

impl CustomVariogram {
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
    {
        Self(Arc::new(function))
    }

    pub fn evaluate(&self, params: &[f64], h: f64) -> f64 {
        (self.0)(params, h)
    }
}

impl fmt::Debug for CustomVariogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomVariogram(..)")
    }
}

/// The curve behind a variogram model: one fixed function per built-in kind,
/// or an injected function for custom models.
#[derive(Debug, Clone)]
pub enum VariogramFunction {
    Linear,
    Power,
    Gaussian,
    Spherical,
    Exponential,
    Custom(CustomVariogram),
}

impl VariogramFunction {
    /// Pick the function for `kind`. Custom models must come with a function.
    pub fn resolve(
        kind: VariogramKind,
        custom: Option<CustomVariogram>,
    ) -> Result<Self, ConfigurationError> {
        Ok(match kind {
            VariogramKind::Linear => VariogramFunction::Linear,
            VariogramKind::Power => VariogramFunction::Power,
            VariogramKind::Gaussian => VariogramFunction::Gaussian,
            VariogramKind::Spherical => VariogramFunction::Spherical,
            VariogramKind::Exponential => VariogramFunction::Exponential,
            VariogramKind::Custom => {
                VariogramFunction::Custom(custom.ok_or(ConfigurationError::MissingCustomFunction)?)
            }
        })
    }

    pub fn kind(&self) -> VariogramKind {
        match self {
            VariogramFunction::Linear => VariogramKind::Linear,
            VariogramFunction::Power => VariogramKind::Power,
            VariogramFunction::Gaussian => VariogramKind::Gaussian,
            VariogramFunction::Spherical => VariogramKind::Spherical,
            VariogramFunction::Exponential => VariogramKind::Exponential,
            VariogramFunction::Custom(_) => VariogramKind::Custom,
        }
    }

    /// Semivariance at lag `h`. `params` must hold the model's parameter count.
    pub(crate) fn evaluate(&self, params: &[f64], h: f64) -> f64 {
        match self {
            VariogramFunction::Linear => Linear::from_params(params).variogram(h),
            VariogramFunction::Power => Power::from_params(params).variogram(h),
            VariogramFunction::Gaussian => IsoGaussian::from_params(params).variogram(h),
            VariogramFunction::Spherical => IsoSpherical::from_params(params).variogram(h),
            VariogramFunction::Exponential => IsoExponential::from_params(params).variogram(h),
            VariogramFunction::Custom(custom) => custom.evaluate(params, h),
        }
    }

    pub(crate) fn validate_parameters(&self, params: &[f64]) -> Result<(), ConfigurationError> {
        let kind = self.kind();
        match kind.parameter_count() {
            Some(expected) if expected != params.len() => {
                Err(ConfigurationError::ParameterCount {
                    model: kind,
                    expected,
                    found: params.len(),
                })
            }
            None if params.is_empty() => Err(ConfigurationError::EmptyParameters),
            _ => Ok(()),
        }
    }
}

/// A variogram function together with its fitted parameters.
///
/// Never mutated in place; a session swaps in a new value on update.
#[derive(Debug, Clone)]
pub struct VariogramModel {
    function: VariogramFunction,
    parameters: Vec<f64>,
}

impl VariogramModel {
    pub fn new(
        function: VariogramFunction,
        parameters: Vec<f64>,
    ) -> Result<Self, ConfigurationError> {
        function.validate_parameters(&parameters)?;
        Ok(Self {
            function,
            parameters,
        })
    }

    /// Built-in model from explicit parameters.
    pub fn builtin(kind: VariogramKind, parameters: Vec<f64>) -> Result<Self, ConfigurationError> {
        Self::new(VariogramFunction::resolve(kind, None)?, parameters)
    }

    /// Custom model, `parameters[0]` is the sill.
    pub fn custom(
        function: CustomVariogram,
        parameters: Vec<f64>,
    ) -> Result<Self, ConfigurationError> {
        Self::new(VariogramFunction::Custom(function), parameters)
    }

    pub fn kind(&self) -> VariogramKind {
        self.function.kind()
    }

    pub fn function(&self) -> &VariogramFunction {
        &self.function
    }

    pub fn parameters(&self) -> &[f64] {
        self.parameters.as_slice()
    }

    pub fn semivariance(&self, h: f64) -> f64 {
        self.function.evaluate(&self.parameters, h)
    }

    /// `parameters[0]` for bounded models.
    pub fn sill(&self) -> Option<f64> {
        if self.kind().is_bounded() {
            self.parameters.first().copied()
        } else {
            None
        }
    }

    /// Sill, or the error that makes this model unusable for simple kriging.
    pub fn require_sill(&self) -> Result<f64, KrigingError> {
        self.sill()
            .ok_or(KrigingError::ModelInapplicable { model: self.kind() })
    }

    /// `name = value` pairs for logging.
    pub fn describe(&self) -> String {
        let names = self.kind().parameter_names();
        self.parameters
            .iter()
            .enumerate()
            .map(|(i, v)| match names.get(i) {
                Some(name) => format!("{name} = {v}"),
                None => format!("p{i} = {v}"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
