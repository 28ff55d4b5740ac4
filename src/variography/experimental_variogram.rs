use itertools::izip;
use nalgebra::{distance, Point2};
use rayon::prelude::*;

use crate::error::ConfigurationError;

/// Azimuth window for a directional variogram.
///
/// Pair directions are folded into `[0, 180)` degrees, measured counter-clockwise from
/// the x axis of the working frame. A pair counts when `min_theta <= angle <= max_theta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionFilter {
    pub min_theta: f64,
    pub max_theta: f64,
}

impl DirectionFilter {
    pub fn new(min_theta: f64, max_theta: f64) -> Result<Self, ConfigurationError> {
        if !(min_theta.is_finite() && max_theta.is_finite()) || min_theta > max_theta {
            return Err(ConfigurationError::InvalidDirectionWindow {
                min_theta,
                max_theta,
            });
        }
        Ok(Self {
            min_theta,
            max_theta,
        })
    }

    /// Missing bounds default to the full half circle. `None` when both are missing.
    pub fn from_bounds(
        min_theta: Option<f64>,
        max_theta: Option<f64>,
    ) -> Result<Option<Self>, ConfigurationError> {
        match (min_theta, max_theta) {
            (None, None) => Ok(None),
            (min, max) => Self::new(min.unwrap_or(0.0), max.unwrap_or(180.0)).map(Some),
        }
    }

    pub fn contains(&self, a: &Point2<f64>, b: &Point2<f64>) -> bool {
        let angle = azimuth(a, b);
        angle >= self.min_theta && angle <= self.max_theta
    }
}

/// Undirected angle of the segment `a -> b` in `[0, 180)` degrees.
pub fn azimuth(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let d = b - a;
    let angle = d.y.atan2(d.x).to_degrees();
    if angle < 0.0 {
        angle + 180.0
    } else if angle >= 180.0 {
        angle - 180.0
    } else {
        angle
    }
}

/// Binned semivariance of all data pairs.
///
/// Only populated bins are kept; `lags[i]` is the mean pair distance of bin `i`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExperimentalVariogram {
    pub lags: Vec<f64>,
    pub semivariance: Vec<f64>,
    pub semivariance_error: Vec<f64>,
    pub counts: Vec<usize>,
}

impl ExperimentalVariogram {
    /// Bin every pair `(i, j), i < j` into `nlags` equal-width distance bins.
    /// # Arguments
    /// * `points` - working-frame data locations
    /// * `values` - data values, one per point
    /// * `nlags` - number of bins between the smallest and largest pair distance
    pub fn from_points(
        points: &[Point2<f64>],
        values: &[f64],
        nlags: usize,
    ) -> Result<Self, ConfigurationError> {
        Self::directional(points, values, nlags, None)
    }

    /// Like [`Self::from_points`], keeping only pairs inside `direction`.
    pub fn directional(
        points: &[Point2<f64>],
        values: &[f64],
        nlags: usize,
        direction: Option<DirectionFilter>,
    ) -> Result<Self, ConfigurationError> {
        if nlags == 0 {
            return Err(ConfigurationError::InvalidLagCount);
        }
        if points.len() != values.len() {
            return Err(ConfigurationError::DataLengthMismatch {
                x: points.len(),
                y: points.len(),
                z: values.len(),
            });
        }

        let n = points.len();
        let pairs = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| {
                let (p_i, z_i) = (points[i], values[i]);
                (i + 1..n)
                    .filter(move |j| direction.map_or(true, |f| f.contains(&p_i, &points[*j])))
                    .map(move |j| {
                        let dz = z_i - values[j];
                        (distance(&p_i, &points[j]), 0.5 * dz * dz)
                    })
            })
            .collect::<Vec<(f64, f64)>>();

        if pairs.is_empty() {
            return Ok(Self::default());
        }

        let (d_min, d_max) = pairs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (d, _)| {
                (lo.min(*d), hi.max(*d))
            });

        //bin edges, the last one nudged past the largest distance
        let width = (d_max - d_min) / nlags as f64;
        let mut edges = (0..nlags)
            .map(|k| d_min + k as f64 * width)
            .collect::<Vec<_>>();
        edges.push(d_max + 0.001);

        let mut bin_dists = vec![Vec::new(); nlags];
        let mut bin_semivar = vec![Vec::new(); nlags];
        for (d, g) in pairs {
            let bin = edges[1..nlags].partition_point(|edge| *edge <= d);
            bin_dists[bin].push(d);
            bin_semivar[bin].push(g);
        }

        let mut variogram = Self::default();
        for (dists, semivar) in izip!(bin_dists.iter(), bin_semivar.iter()) {
            if dists.is_empty() {
                continue;
            }
            let count = dists.len() as f64;
            let mean_g = semivar.iter().sum::<f64>() / count;
            let var_g = semivar.iter().map(|g| (g - mean_g).powi(2)).sum::<f64>() / count;

            variogram.lags.push(dists.iter().sum::<f64>() / count);
            variogram.semivariance.push(mean_g);
            variogram.semivariance_error.push(var_g.sqrt());
            variogram.counts.push(dists.len());
        }

        Ok(variogram)
    }

    pub fn len(&self) -> usize {
        self.lags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line_points() -> (Vec<Point2<f64>>, Vec<f64>) {
        (
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(3.0, 0.0),
            ],
            vec![0.0, 1.0, 3.0],
        )
    }

    #[test]
    fn bins_pairs_by_distance() {
        let (points, values) = line_points();
        let v = ExperimentalVariogram::from_points(&points, &values, 2).unwrap();

        assert_eq!(v.len(), 2);
        assert_eq!(v.counts, vec![1, 2]);
        assert_relative_eq!(v.lags[0], 1.0);
        assert_relative_eq!(v.semivariance[0], 0.5);
        assert_relative_eq!(v.semivariance_error[0], 0.0);
        assert_relative_eq!(v.lags[1], 2.5);
        assert_relative_eq!(v.semivariance[1], 3.25);
        assert_relative_eq!(v.semivariance_error[1], 1.25);
    }

    #[test]
    fn drops_empty_bins() {
        let (points, values) = line_points();
        let v = ExperimentalVariogram::from_points(&points, &values, 4).unwrap();

        assert_eq!(v.len(), 3);
        assert_eq!(v.lags, vec![1.0, 2.0, 3.0]);
        assert_eq!(v.semivariance, vec![0.5, 2.0, 4.5]);
    }

    #[test]
    fn rejects_zero_lags() {
        let (points, values) = line_points();
        assert_eq!(
            ExperimentalVariogram::from_points(&points, &values, 0),
            Err(ConfigurationError::InvalidLagCount)
        );
    }

    #[test]
    fn azimuth_folds_into_half_circle() {
        let o = Point2::new(0.0, 0.0);
        assert_relative_eq!(azimuth(&o, &Point2::new(1.0, 0.0)), 0.0);
        assert_relative_eq!(azimuth(&o, &Point2::new(1.0, 1.0)), 45.0);
        assert_relative_eq!(azimuth(&o, &Point2::new(-1.0, -1.0)), 45.0);
        assert_relative_eq!(azimuth(&o, &Point2::new(0.0, -2.0)), 90.0);
        assert_relative_eq!(azimuth(&o, &Point2::new(-1.0, 1.0)), 135.0);
    }

    #[test]
    fn direction_filter_keeps_matching_pairs() {
        //two pairs along x, one pair along y
        let points = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 5.0),
            Point2::new(2.0, 5.0),
        ];
        let values = vec![0.0, 1.0, 0.0, 4.0];

        let along_x = DirectionFilter::new(0.0, 10.0).unwrap();
        let v = ExperimentalVariogram::directional(&points, &values, 1, Some(along_x)).unwrap();
        assert_eq!(v.counts, vec![2]);
        assert_relative_eq!(v.lags[0], 1.5);
        assert_relative_eq!(v.semivariance[0], (0.5 + 8.0) / 2.0);

        let along_y = DirectionFilter::from_bounds(Some(80.0), Some(100.0))
            .unwrap()
            .unwrap();
        let v = ExperimentalVariogram::directional(&points, &values, 1, Some(along_y)).unwrap();
        assert_eq!(v.counts, vec![1]);
        assert_relative_eq!(v.lags[0], 5.0);

        let everything = ExperimentalVariogram::from_points(&points, &values, 1).unwrap();
        assert_eq!(everything.counts, vec![6]);
    }

    #[test]
    fn direction_bounds_are_validated() {
        assert_eq!(DirectionFilter::from_bounds(None, None), Ok(None));
        assert_eq!(
            DirectionFilter::from_bounds(Some(30.0), None),
            Ok(Some(DirectionFilter {
                min_theta: 30.0,
                max_theta: 180.0
            }))
        );
        assert_eq!(
            DirectionFilter::new(90.0, 10.0),
            Err(ConfigurationError::InvalidDirectionWindow {
                min_theta: 90.0,
                max_theta: 10.0
            })
        );
    }
}
