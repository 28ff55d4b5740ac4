use nalgebra::{distance, DMatrix, DVector, Dyn, Point2, LU};
use tracing::debug;

use crate::error::{KrigingError, NumericalError};
use crate::variography::model_variograms::VariogramModel;
use crate::EPS;

/// The `n x n` simple kriging system over the working-frame data locations.
///
/// Both forms are kept: `semivariance` holds `variogram(d_ij)` with an exact zero
/// diagonal, `covariance` holds `sill - semivariance` and is the matrix that is solved.
#[derive(Debug, Clone, PartialEq)]
pub struct KrigingMatrix {
    semivariance: DMatrix<f64>,
    covariance: DMatrix<f64>,
    sill: f64,
}

impl KrigingMatrix {
    /// Build the system for `points`. Fails for variograms without a sill.
    pub fn build(points: &[Point2<f64>], variogram: &VariogramModel) -> Result<Self, KrigingError> {
        let sill = variogram.require_sill()?;
        let n = points.len();

        let mut semivariance = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in 0..i {
                let gamma = semivariance_at(variogram, distance(&points[i], &points[j]));
                semivariance[(i, j)] = gamma;
                semivariance[(j, i)] = gamma;
            }
        }
        let covariance = semivariance.map(|gamma| sill - gamma);

        debug!(size = n, sill, "built kriging matrix");

        Ok(Self {
            semivariance,
            covariance,
            sill,
        })
    }

    pub fn semivariance(&self) -> &DMatrix<f64> {
        &self.semivariance
    }

    pub fn covariance(&self) -> &DMatrix<f64> {
        &self.covariance
    }

    pub fn sill(&self) -> f64 {
        self.sill
    }

    pub fn size(&self) -> usize {
        self.covariance.nrows()
    }

    /// Explicit inverse of the covariance matrix.
    pub fn inverse(&self) -> Result<DMatrix<f64>, NumericalError> {
        let size = self.size();
        factorize(self.covariance.clone())?
            .try_inverse()
            .ok_or(NumericalError::SingularMatrix { size })
    }

    /// Covariance between the data points at `indices`, in that order.
    pub fn submatrix(&self, indices: &[usize]) -> DMatrix<f64> {
        self.covariance
            .select_rows(indices.iter())
            .select_columns(indices.iter())
    }
}

/// Semivariance with coincident locations treated as exact measurements.
#[inline(always)]
pub(crate) fn semivariance_at(variogram: &VariogramModel, distance: f64) -> f64 {
    if distance < EPS {
        0.0
    } else {
        variogram.semivariance(distance)
    }
}

#[inline(always)]
pub(crate) fn covariance_at(variogram: &VariogramModel, sill: f64, distance: f64) -> f64 {
    sill - semivariance_at(variogram, distance)
}

/// Covariance between `point` and every data location.
pub fn cross_covariance(
    point: &Point2<f64>,
    data: &[Point2<f64>],
    variogram: &VariogramModel,
    sill: f64,
) -> DVector<f64> {
    DVector::from_iterator(
        data.len(),
        data.iter()
            .map(|p| covariance_at(variogram, sill, distance(point, p))),
    )
}

/// `npt x n` covariance between every query point and every data location.
pub fn cross_covariance_matrix(
    query: &[Point2<f64>],
    data: &[Point2<f64>],
    variogram: &VariogramModel,
    sill: f64,
) -> DMatrix<f64> {
    DMatrix::from_fn(query.len(), data.len(), |k, i| {
        covariance_at(variogram, sill, distance(&query[k], &data[i]))
    })
}

/// Smallest accepted ratio of the smallest to the largest singular value.
///
/// Below this the solve loses more than six of its sixteen significant digits.
pub const MIN_RECIPROCAL_CONDITION: f64 = 1.0e-10;

/// Reciprocal 2-norm condition number, `0` for singular or non-finite matrices.
pub fn reciprocal_condition(matrix: &DMatrix<f64>) -> f64 {
    if matrix.is_empty() || matrix.iter().any(|v| !v.is_finite()) {
        return 0.0;
    }
    let singular_values = matrix.singular_values();
    let (min_sv, max_sv) = singular_values
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), v| (lo.min(*v), hi.max(*v)));

    if max_sv > 0.0 {
        min_sv / max_sv
    } else {
        0.0
    }
}

/// LU factorization that rejects singular and ill-conditioned systems.
pub(crate) fn factorize(matrix: DMatrix<f64>) -> Result<LU<f64, Dyn, Dyn>, NumericalError> {
    let size = matrix.nrows();
    let rcond = reciprocal_condition(&matrix);
    if rcond < MIN_RECIPROCAL_CONDITION {
        return Err(NumericalError::SingularMatrix { size });
    }

    Ok(matrix.lu())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variography::model_variograms::VariogramKind;
    use approx::assert_relative_eq;

    fn spherical() -> VariogramModel {
        VariogramModel::builtin(VariogramKind::Spherical, vec![2.0, 1.5, 0.0]).unwrap()
    }

    fn unit_square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
        ]
    }

    #[test]
    fn symmetric_with_zero_semivariance_diagonal() {
        let matrix = KrigingMatrix::build(&unit_square(), &spherical()).unwrap();
        assert_eq!(matrix.size(), 4);

        for i in 0..4 {
            assert_eq!(matrix.semivariance()[(i, i)], 0.0);
            assert_eq!(matrix.covariance()[(i, i)], 2.0);
            for j in 0..4 {
                assert_eq!(matrix.covariance()[(i, j)], matrix.covariance()[(j, i)]);
            }
        }

        //spherical at h = 1, range 1.5
        let r = 1.0 / 1.5;
        let gamma = 2.0 * (1.5 * r - 0.5 * r * r * r);
        assert_relative_eq!(matrix.semivariance()[(0, 1)], gamma, epsilon = 1e-12);
        assert_relative_eq!(matrix.covariance()[(0, 1)], 2.0 - gamma, epsilon = 1e-12);
    }

    #[test]
    fn inverse_times_matrix_is_identity() {
        let matrix = KrigingMatrix::build(&unit_square(), &spherical()).unwrap();
        let inverse = matrix.inverse().unwrap();
        let product = matrix.covariance() * inverse;
        assert!((product - DMatrix::identity(4, 4)).abs().max() < 1e-10);
    }

    #[test]
    fn coincident_points_are_singular() {
        let mut points = unit_square();
        points.push(Point2::new(1.0, 1.0));
        let matrix = KrigingMatrix::build(&points, &spherical()).unwrap();
        assert_eq!(
            matrix.inverse(),
            Err(NumericalError::SingularMatrix { size: 5 })
        );
    }

    #[test]
    fn unbounded_model_is_rejected() {
        let linear = VariogramModel::builtin(VariogramKind::Linear, vec![1.0, 0.0]).unwrap();
        assert!(matches!(
            KrigingMatrix::build(&unit_square(), &linear),
            Err(KrigingError::ModelInapplicable { .. })
        ));
    }

    #[test]
    fn cross_covariance_at_data_point_is_sill() {
        let data = unit_square();
        let b = cross_covariance(&Point2::new(1.0, 0.0), &data, &spherical(), 2.0);
        assert_eq!(b[1], 2.0);

        let batch = cross_covariance_matrix(&data[1..2], &data, &spherical(), 2.0);
        assert_eq!(batch.nrows(), 1);
        for i in 0..4 {
            assert_eq!(batch[(0, i)], b[i]);
        }
    }

    #[test]
    fn submatrix_selects_rows_and_columns() {
        let matrix = KrigingMatrix::build(&unit_square(), &spherical()).unwrap();
        let sub = matrix.submatrix(&[3, 0]);
        assert_eq!(sub[(0, 0)], matrix.covariance()[(3, 3)]);
        assert_eq!(sub[(0, 1)], matrix.covariance()[(3, 0)]);
        assert_eq!(sub[(1, 0)], matrix.covariance()[(0, 3)]);
    }

    fn dense_gaussian_grid() -> Vec<Point2<f64>> {
        (0..8)
            .flat_map(|i| (0..8).map(move |j| Point2::new(2.0 * i as f64, 2.0 * j as f64)))
            .collect()
    }

    #[test]
    fn ill_conditioned_gaussian_is_rejected() {
        let gaussian =
            VariogramModel::builtin(VariogramKind::Gaussian, vec![1.0, 20.0, 0.0]).unwrap();
        let matrix = KrigingMatrix::build(&dense_gaussian_grid(), &gaussian).unwrap();

        assert!(reciprocal_condition(matrix.covariance()) < MIN_RECIPROCAL_CONDITION);
        assert_eq!(
            matrix.inverse(),
            Err(NumericalError::SingularMatrix { size: 64 })
        );
    }

    #[test]
    fn well_conditioned_matrix_passes() {
        let matrix = KrigingMatrix::build(&unit_square(), &spherical()).unwrap();
        let rcond = reciprocal_condition(matrix.covariance());
        assert!(rcond > MIN_RECIPROCAL_CONDITION && rcond <= 1.0);
        assert_eq!(reciprocal_condition(&DMatrix::zeros(2, 2)), 0.0);
    }
}
