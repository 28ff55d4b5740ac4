use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView2};

use crate::error::ConfigurationError;

pub use crate::systems::CancellationToken;

pub mod query;
pub mod simple_kriging;

/// Solver used for a full (non-windowed) solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// One batched product over all query points.
    #[default]
    Dense,
    /// One matrix-vector product per query point.
    Loop,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Dense => f.write_str("vectorized"),
            Backend::Loop => f.write_str("loop"),
        }
    }
}

impl FromStr for Backend {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vectorized" | "dense" => Ok(Backend::Dense),
            "loop" => Ok(Backend::Loop),
            _ => Err(ConfigurationError::UnknownBackend(s.to_string())),
        }
    }
}

/// Per-call solve options.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub backend: Backend,
    /// Solve from this many nearest data points only. Requires [`Backend::Loop`].
    pub n_closest_points: Option<usize>,
    pub cancel: Option<CancellationToken>,
}

impl ExecuteOptions {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            ..Default::default()
        }
    }

    pub fn with_n_closest_points(mut self, n_closest_points: usize) -> Self {
        self.n_closest_points = Some(n_closest_points);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub(crate) fn strategy(&self, n_data: usize) -> Result<SolveStrategy, ConfigurationError> {
        match (self.backend, self.n_closest_points) {
            (Backend::Dense, None) => Ok(SolveStrategy::Dense),
            (Backend::Loop, None) => Ok(SolveStrategy::Loop),
            (Backend::Dense, Some(_)) => Err(ConfigurationError::UnsupportedMovingWindowBackend {
                backend: self.backend,
            }),
            (Backend::Loop, Some(k)) if k == 0 || k > n_data => {
                Err(ConfigurationError::InvalidNeighborhoodSize {
                    requested: k,
                    available: n_data,
                })
            }
            (Backend::Loop, Some(n_closest)) => Ok(SolveStrategy::MovingWindow { n_closest }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SolveStrategy {
    Dense,
    Loop,
    MovingWindow { n_closest: usize },
}

/// How the query coordinates are interpreted.
#[derive(Debug, Clone)]
pub enum QueryStyle<'a> {
    /// `xpoints[i], ypoints[i]` pairs.
    Points,
    /// Every `(x, y)` of the grid spanned by `xpoints` and `ypoints`.
    Grid,
    /// A grid with cells excluded where the mask is `true`.
    ///
    /// The mask is shaped `(ypoints.len(), xpoints.len())`; the transposed shape is accepted.
    Masked(ArrayView2<'a, bool>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointEstimates {
    pub estimate: Array1<f64>,
    pub variance: Array1<f64>,
}

/// Grids shaped `(ypoints.len(), xpoints.len())`.
#[derive(Debug, Clone, PartialEq)]
pub struct GridEstimates {
    pub estimate: Array2<f64>,
    pub variance: Array2<f64>,
    /// `false` on masked cells, which hold `NaN`. `None` for unmasked grids.
    pub valid: Option<Array2<bool>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KrigingOutput {
    Points(PointEstimates),
    Grid(GridEstimates),
}

impl KrigingOutput {
    pub fn into_points(self) -> Option<PointEstimates> {
        match self {
            KrigingOutput::Points(points) => Some(points),
            KrigingOutput::Grid(_) => None,
        }
    }

    pub fn into_grid(self) -> Option<GridEstimates> {
        match self {
            KrigingOutput::Grid(grid) => Some(grid),
            KrigingOutput::Points(_) => None,
        }
    }

    /// Estimate and variance at flat (row-major for grids) index `i`.
    pub fn estimate_at(&self, i: usize) -> Option<(f64, f64)> {
        match self {
            KrigingOutput::Points(p) => Some((*p.estimate.get(i)?, *p.variance.get(i)?)),
            KrigingOutput::Grid(g) => {
                let ncols = g.estimate.ncols();
                if ncols == 0 {
                    return None;
                }
                let ix = (i / ncols, i % ncols);
                Some((*g.estimate.get(ix)?, *g.variance.get(ix)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("vectorized".parse::<Backend>(), Ok(Backend::Dense));
        assert_eq!("Loop".parse::<Backend>(), Ok(Backend::Loop));
        assert_eq!(
            "C".parse::<Backend>(),
            Err(ConfigurationError::UnknownBackend("C".to_string()))
        );
        assert_eq!(Backend::Dense.to_string(), "vectorized");
    }

    #[test]
    fn resolves_strategy() {
        assert_eq!(
            ExecuteOptions::default().strategy(5),
            Ok(SolveStrategy::Dense)
        );
        assert_eq!(
            ExecuteOptions::new(Backend::Loop)
                .with_n_closest_points(5)
                .strategy(5),
            Ok(SolveStrategy::MovingWindow { n_closest: 5 })
        );
        assert_eq!(
            ExecuteOptions::new(Backend::Dense)
                .with_n_closest_points(3)
                .strategy(5),
            Err(ConfigurationError::UnsupportedMovingWindowBackend {
                backend: Backend::Dense
            })
        );
        assert_eq!(
            ExecuteOptions::new(Backend::Loop)
                .with_n_closest_points(6)
                .strategy(5),
            Err(ConfigurationError::InvalidNeighborhoodSize {
                requested: 6,
                available: 5
            })
        );
    }
}
