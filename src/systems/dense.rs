use nalgebra::{DVector, Point2};
use tracing::debug;

use crate::error::KrigingError;

use super::kriging_matrix::cross_covariance_matrix;
use super::{is_masked, SolveContext, SolveOutput};

/// Solve every query point in one batched product against the explicit inverse.
///
/// Masked points are computed along with the rest and blanked afterwards.
/// Cancellation is only observed before the batch starts.
pub fn solve(
    ctx: &SolveContext,
    query: &[Point2<f64>],
    mask: Option<&[bool]>,
) -> Result<SolveOutput, KrigingError> {
    ctx.check_cancelled(0)?;

    let sill = ctx.sill();
    let inverse = ctx.matrix.inverse()?;

    // npt x n
    let b = cross_covariance_matrix(query, ctx.data, ctx.variogram, sill);
    // n x npt
    let weights = &inverse * b.transpose();

    let residuals = DVector::from_column_slice(ctx.residuals);
    let estimates = weights.tr_mul(&residuals);
    let explained = b.component_mul(&weights.transpose()).column_sum();

    debug!(points = query.len(), data = ctx.data.len(), "dense solve");

    let mut output = SolveOutput::with_capacity(query.len());
    for k in 0..query.len() {
        if is_masked(mask, k) {
            output.push_masked();
        } else {
            output.push(estimates[k], sill - explained[k]);
        }
    }

    Ok(output)
}
