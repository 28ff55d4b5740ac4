use nalgebra::{DVector, Point2};
use tracing::{debug, warn};

use crate::error::{ConfigurationError, KrigingError, NumericalError};
use crate::spatial_database::neighbor_index::NeighborIndex;

use super::kriging_matrix::{covariance_at, factorize};
use super::{is_masked, SolveContext, SolveOutput};

/// Solve each unmasked query point from its `n_closest` nearest data points only.
///
/// The reduced `k x k` system is taken out of the full matrix and solved by LU,
/// never inverted.
pub fn solve(
    ctx: &SolveContext,
    query: &[Point2<f64>],
    mask: Option<&[bool]>,
    n_closest: usize,
) -> Result<SolveOutput, KrigingError> {
    let available = ctx.data.len();
    if n_closest == 0 || n_closest > available {
        return Err(ConfigurationError::InvalidNeighborhoodSize {
            requested: n_closest,
            available,
        }
        .into());
    }

    warn!(
        n_closest,
        "moving window kriging ignores data beyond the nearest neighbors; \
         results can differ from a full solve unless the variogram decays within the window"
    );

    let sill = ctx.sill();
    let index = NeighborIndex::new(ctx.data);

    debug!(points = query.len(), n_closest, "moving window solve");

    let mut output = SolveOutput::with_capacity(query.len());
    for (k, point) in query.iter().enumerate() {
        if is_masked(mask, k) {
            output.push_masked();
            continue;
        }
        ctx.check_cancelled(k)?;

        let neighbors = index.nearest(point, n_closest);
        let indices = neighbors.iter().map(|n| n.index).collect::<Vec<_>>();

        let b = DVector::from_iterator(
            neighbors.len(),
            neighbors
                .iter()
                .map(|n| covariance_at(ctx.variogram, sill, n.distance)),
        );
        let lu = factorize(ctx.matrix.submatrix(&indices))
            .map_err(|_| NumericalError::SolveFailed { query_index: k })?;
        let weights = lu
            .solve(&b)
            .ok_or(NumericalError::SolveFailed { query_index: k })?;

        let estimate = weights
            .iter()
            .zip(indices.iter())
            .map(|(w, i)| w * ctx.residuals[*i])
            .sum::<f64>();
        output.push(estimate, sill - weights.dot(&b));
    }

    Ok(output)
}
