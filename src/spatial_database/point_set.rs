use std::path::Path;

use nalgebra::Point2;

use crate::error::{ConfigurationError, KrigingError};
use crate::geometry::anisotropy::bounding_box_center;

/// Conditioning data: scattered 2D locations and their measured values.
///
/// Immutable once built. Always holds at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    points: Vec<Point2<f64>>,
    data: Vec<f64>,
}

impl PointSet {
    pub fn new(points: Vec<Point2<f64>>, data: Vec<f64>) -> Result<Self, ConfigurationError> {
        if points.len() != data.len() {
            return Err(ConfigurationError::DataLengthMismatch {
                x: points.len(),
                y: points.len(),
                z: data.len(),
            });
        }
        if points.len() < 2 {
            return Err(ConfigurationError::TooFewPoints {
                found: points.len(),
            });
        }

        Ok(Self { points, data })
    }

    /// Build from parallel coordinate and value slices.
    pub fn from_xyz(x: &[f64], y: &[f64], z: &[f64]) -> Result<Self, ConfigurationError> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(ConfigurationError::DataLengthMismatch {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }

        let points = x
            .iter()
            .zip(y.iter())
            .map(|(x, y)| Point2::new(*x, *y))
            .collect();
        Self::new(points, z.to_vec())
    }

    /// Read a point set from a csv file with a header row.
    /// # Arguments
    /// * `csv_path` - path to the file
    /// * `x_col`, `y_col` - coordinate columns
    /// * `value_col` - measured value column
    pub fn from_csv<P: AsRef<Path>>(
        csv_path: P,
        x_col: &str,
        y_col: &str,
        value_col: &str,
    ) -> Result<Self, KrigingError> {
        let mut rdr = csv::Reader::from_path(csv_path)?;
        let headers = rdr.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| KrigingError::MissingColumn {
                    column: name.to_string(),
                })
        };
        let (x_idx, y_idx, v_idx) = (column(x_col)?, column(y_col)?, column(value_col)?);

        let mut points = Vec::new();
        let mut data = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let parse = |idx: usize, name: &str| -> Result<f64, KrigingError> {
                let raw = record.get(idx).unwrap_or_default().trim();
                raw.parse::<f64>().map_err(|_| KrigingError::InvalidValue {
                    column: name.to_string(),
                    value: raw.to_string(),
                })
            };

            points.push(Point2::new(parse(x_idx, x_col)?, parse(y_idx, y_col)?));
            data.push(parse(v_idx, value_col)?);
        }

        Ok(Self::new(points, data)?)
    }

    pub fn points(&self) -> &[Point2<f64>] {
        self.points.as_slice()
    }

    pub fn data(&self) -> &[f64] {
        self.data.as_slice()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Midpoint of the bounding box of the raw coordinates.
    pub fn center(&self) -> Point2<f64> {
        bounding_box_center(&self.points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn rejects_mismatched_lengths() {
        let err = PointSet::from_xyz(&[0.0, 1.0], &[0.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DataLengthMismatch { x: 2, y: 1, z: 2 }
        );
    }

    #[test]
    fn rejects_single_point() {
        let err = PointSet::from_xyz(&[0.0], &[0.0], &[1.0]).unwrap_err();
        assert_eq!(err, ConfigurationError::TooFewPoints { found: 1 });
    }

    #[test]
    fn center_of_raw_coordinates() {
        let set =
            PointSet::from_xyz(&[0.0, 4.0, 1.0], &[-1.0, 3.0, 0.0], &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(set.center(), Point2::new(2.0, 1.0));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn reads_csv_columns() {
        let path = std::env::temp_dir().join(format!("skrige_points_{}.csv", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "id,X,Y,CU").unwrap();
            writeln!(file, "1,0.0,0.0,1.5").unwrap();
            writeln!(file, "2,10.0,5.0,2.5").unwrap();
            writeln!(file, "3,3.0,7.0,0.5").unwrap();
        }

        let set = PointSet::from_csv(&path, "X", "Y", "CU").unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.points()[1], Point2::new(10.0, 5.0));
        assert_eq!(set.data(), &[1.5, 2.5, 0.5]);

        let missing = PointSet::from_csv(&path, "X", "Y", "AU").unwrap_err();
        assert!(matches!(missing, KrigingError::MissingColumn { column } if column == "AU"));

        fs::remove_file(&path).unwrap();
    }
}
