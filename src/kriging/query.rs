use nalgebra::Point2;
use ndarray::{Array1, Array2};

use crate::error::ConfigurationError;
use crate::spatial_database::zero_mean::ZeroMeanTransform;
use crate::systems::SolveOutput;

use super::{GridEstimates, KrigingOutput, PointEstimates, QueryStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryShape {
    Points,
    Grid { ny: usize, nx: usize },
}

/// Query locations of one `execute` call, in raw coordinates.
///
/// Grids are flattened row-major: `y` outer, `x` inner.
#[derive(Debug, Clone)]
pub struct QuerySet {
    pub points: Vec<Point2<f64>>,
    /// `true` where a point is excluded.
    pub mask: Option<Vec<bool>>,
    shape: QueryShape,
}

impl QuerySet {
    pub fn build(
        style: &QueryStyle,
        xpoints: &[f64],
        ypoints: &[f64],
    ) -> Result<Self, ConfigurationError> {
        match style {
            QueryStyle::Points => {
                if xpoints.len() != ypoints.len() {
                    return Err(ConfigurationError::PointCountMismatch {
                        x: xpoints.len(),
                        y: ypoints.len(),
                    });
                }
                Ok(Self {
                    points: xpoints
                        .iter()
                        .zip(ypoints.iter())
                        .map(|(x, y)| Point2::new(*x, *y))
                        .collect(),
                    mask: None,
                    shape: QueryShape::Points,
                })
            }
            QueryStyle::Grid => Ok(Self::grid(xpoints, ypoints, None)),
            QueryStyle::Masked(mask) => {
                let (ny, nx) = (ypoints.len(), xpoints.len());
                let flat = if mask.dim() == (ny, nx) {
                    mask.iter().copied().collect()
                } else if mask.dim() == (nx, ny) {
                    mask.t().iter().copied().collect()
                } else {
                    return Err(ConfigurationError::MaskShapeMismatch {
                        expected: (ny, nx),
                        found: mask.dim(),
                    });
                };
                Ok(Self::grid(xpoints, ypoints, Some(flat)))
            }
        }
    }

    fn grid(xpoints: &[f64], ypoints: &[f64], mask: Option<Vec<bool>>) -> Self {
        let points = ypoints
            .iter()
            .flat_map(|y| xpoints.iter().map(move |x| Point2::new(*x, *y)))
            .collect();
        Self {
            points,
            mask,
            shape: QueryShape::Grid {
                ny: ypoints.len(),
                nx: xpoints.len(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add the known mean back and reshape the solver output.
    pub fn into_output(self, solved: SolveOutput, mean: &ZeroMeanTransform<f64>) -> KrigingOutput {
        let estimates = solved
            .estimates
            .into_iter()
            .map(|r| mean.back_transform(r))
            .collect::<Vec<_>>();
        let variances = solved.variances;

        match self.shape {
            QueryShape::Points => KrigingOutput::Points(PointEstimates {
                estimate: Array1::from(estimates),
                variance: Array1::from(variances),
            }),
            QueryShape::Grid { ny, nx } => {
                let at = |values: &[f64], (r, c): (usize, usize)| values[r * nx + c];
                KrigingOutput::Grid(GridEstimates {
                    estimate: Array2::from_shape_fn((ny, nx), |ix| at(estimates.as_slice(), ix)),
                    variance: Array2::from_shape_fn((ny, nx), |ix| at(variances.as_slice(), ix)),
                    valid: self
                        .mask
                        .map(|mask| Array2::from_shape_fn((ny, nx), |(r, c)| !mask[r * nx + c])),
                })
            }
        }
    }
}
