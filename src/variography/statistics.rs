use nalgebra::Point2;
use tracing::info;

use crate::error::KrigingError;
use crate::systems::kriging_matrix::KrigingMatrix;
use crate::systems::{point_loop, SolveContext};

use super::model_variograms::VariogramModel;

/// Sequential cross-validation of a variogram model.
///
/// Each data point `k >= 1` is estimated from the points before it. `delta` is the
/// estimation error, `sigma` the kriging standard deviation and `epsilon` their ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidation {
    pub delta: Vec<f64>,
    pub sigma: Vec<f64>,
    pub epsilon: Vec<f64>,
    /// Mean standardized error, near 0 for a good model.
    pub q1: f64,
    /// Mean squared standardized error, near 1 for a good model.
    pub q2: f64,
    pub cr: f64,
}

impl CrossValidation {
    /// # Arguments
    /// * `points` - working-frame data locations
    /// * `residuals` - data values minus the known mean
    /// * `variogram` - a model with a finite sill
    pub fn compute(
        points: &[Point2<f64>],
        residuals: &[f64],
        variogram: &VariogramModel,
    ) -> Result<Self, KrigingError> {
        variogram.require_sill()?;

        let n = points.len().min(residuals.len());
        let mut delta = Vec::with_capacity(n.saturating_sub(1));
        let mut sigma = Vec::with_capacity(n.saturating_sub(1));
        let mut variance = Vec::with_capacity(n.saturating_sub(1));

        for k in 1..n {
            let matrix = KrigingMatrix::build(&points[..k], variogram)?;
            let ctx = SolveContext {
                matrix: &matrix,
                data: &points[..k],
                residuals: &residuals[..k],
                variogram,
                cancel: None,
            };
            let output = point_loop::solve(&ctx, &points[k..=k], None)?;

            delta.push(residuals[k] - output.estimates[0]);
            sigma.push(output.variances[0].sqrt());
            variance.push(output.variances[0]);
        }

        let epsilon = delta
            .iter()
            .zip(sigma.iter())
            .map(|(d, s)| d / s)
            .collect::<Vec<_>>();

        let m = epsilon.len();
        let (q1, q2) = if m < 2 {
            (f64::NAN, f64::NAN)
        } else {
            let dof = (m - 1) as f64;
            (
                epsilon.iter().sum::<f64>() / dof,
                epsilon.iter().map(|e| e * e).sum::<f64>() / dof,
            )
        };
        let mean_log_variance = variance.iter().map(|v| v.ln()).sum::<f64>() / m as f64;
        let cr = q2 * mean_log_variance.exp();

        info!(q1, q2, cr, "cross-validation statistics");

        Ok(Self {
            delta,
            sigma,
            epsilon,
            q1,
            q2,
            cr,
        })
    }
}
