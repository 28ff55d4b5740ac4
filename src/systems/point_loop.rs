use nalgebra::Point2;
use tracing::debug;

use crate::error::KrigingError;

use super::kriging_matrix::cross_covariance;
use super::{is_masked, SolveContext, SolveOutput};

/// Solve each unmasked query point against the shared explicit inverse.
pub fn solve(
    ctx: &SolveContext,
    query: &[Point2<f64>],
    mask: Option<&[bool]>,
) -> Result<SolveOutput, KrigingError> {
    let sill = ctx.sill();
    let inverse = ctx.matrix.inverse()?;

    debug!(points = query.len(), data = ctx.data.len(), "point loop solve");

    let mut output = SolveOutput::with_capacity(query.len());
    for (k, point) in query.iter().enumerate() {
        if is_masked(mask, k) {
            output.push_masked();
            continue;
        }
        ctx.check_cancelled(k)?;

        let b = cross_covariance(point, ctx.data, ctx.variogram, sill);
        let weights = &inverse * &b;

        let estimate = weights
            .iter()
            .zip(ctx.residuals.iter())
            .map(|(w, r)| w * r)
            .sum::<f64>();
        output.push(estimate, sill - weights.dot(&b));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::dense;
    use crate::systems::kriging_matrix::KrigingMatrix;
    use crate::variography::model_variograms::{VariogramKind, VariogramModel};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn matches_dense_solve() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = (0..40)
            .map(|_| Point2::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)))
            .collect::<Vec<_>>();
        let residuals = (0..40).map(|_| rng.gen_range(-1.0..1.0)).collect::<Vec<_>>();
        let query = (0..25)
            .map(|_| Point2::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)))
            .collect::<Vec<_>>();

        let variogram =
            VariogramModel::builtin(VariogramKind::Exponential, vec![1.0, 4.0, 0.1]).unwrap();
        let matrix = KrigingMatrix::build(&data, &variogram).unwrap();
        let ctx = SolveContext {
            matrix: &matrix,
            data: &data,
            residuals: &residuals,
            variogram: &variogram,
            cancel: None,
        };

        let looped = solve(&ctx, &query, None).unwrap();
        let batched = dense::solve(&ctx, &query, None).unwrap();
        for k in 0..query.len() {
            assert_relative_eq!(looped.estimates[k], batched.estimates[k], epsilon = 1e-8);
            assert_relative_eq!(looped.variances[k], batched.variances[k], epsilon = 1e-8);
        }
    }

    #[test]
    fn masked_points_are_skipped() {
        let data = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        let residuals = vec![1.0, -1.0];
        let variogram =
            VariogramModel::builtin(VariogramKind::Gaussian, vec![1.0, 2.0, 0.0]).unwrap();
        let matrix = KrigingMatrix::build(&data, &variogram).unwrap();
        let ctx = SolveContext {
            matrix: &matrix,
            data: &data,
            residuals: &residuals,
            variogram: &variogram,
            cancel: None,
        };

        let query = vec![Point2::new(0.5, 0.0), Point2::new(0.0, 0.0)];
        let output = solve(&ctx, &query, Some(&[true, false][..])).unwrap();
        assert!(output.estimates[0].is_nan());
        assert!(output.variances[0].is_nan());
        assert_relative_eq!(output.estimates[1], 1.0, epsilon = 1e-10);
        assert_relative_eq!(output.variances[1], 0.0, epsilon = 1e-10);
    }
}
