use nalgebra::{Point2, Rotation2, Vector2};

use crate::error::ConfigurationError;

/// Rotation and axis stretch that map raw coordinates into an isotropic working frame.
///
/// The frame is rotated clockwise by `angle` degrees about `center`, then the rotated
/// y axis is stretched by `scaling`. The center is the midpoint of the data bounding
/// box and stays fixed for the lifetime of a session.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnisotropyParameters {
    pub scaling: f64,
    pub angle: f64,
    pub center: Point2<f64>,
    rotation: Rotation2<f64>,
    inverse_rotation: Rotation2<f64>,
}

impl AnisotropyParameters {
    /// Creates anisotropy parameters
    /// # Arguments
    /// * `center` - fixed pivot of the rotation
    /// * `scaling` - stretch applied to the rotated y axis, must be positive
    /// * `angle` - clockwise frame rotation in degrees
    pub fn new(
        center: Point2<f64>,
        scaling: f64,
        angle: f64,
    ) -> Result<Self, ConfigurationError> {
        if !(scaling.is_finite() && scaling > 0.0) {
            return Err(ConfigurationError::InvalidAnisotropyScaling(scaling));
        }

        let rotation = Rotation2::new(-angle.to_radians());
        Ok(Self {
            scaling,
            angle,
            center,
            rotation,
            inverse_rotation: rotation.inverse(),
        })
    }

    /// No rotation and no stretch about `center`.
    pub fn isotropic(center: Point2<f64>) -> Self {
        Self {
            scaling: 1.0,
            angle: 0.0,
            center,
            rotation: Rotation2::identity(),
            inverse_rotation: Rotation2::identity(),
        }
    }

    /// Same center, new scaling and angle.
    pub fn with_parameters(&self, scaling: f64, angle: f64) -> Result<Self, ConfigurationError> {
        Self::new(self.center, scaling, angle)
    }

    pub fn is_isotropic(&self) -> bool {
        self.scaling == 1.0 && self.angle == 0.0
    }

    /// Map a raw point into the working frame.
    pub fn transform(&self, point: &Point2<f64>) -> Point2<f64> {
        let rotated = self.rotation * (point - self.center);
        self.center + Vector2::new(rotated.x, rotated.y * self.scaling)
    }

    /// Map a working-frame point back into raw coordinates.
    pub fn inverse_transform(&self, point: &Point2<f64>) -> Point2<f64> {
        let local = point - self.center;
        let unstretched = Vector2::new(local.x, local.y / self.scaling);
        self.center + self.inverse_rotation * unstretched
    }

    /// Transform a full point cloud. The result replaces any previous working frame.
    pub fn transform_all(&self, points: &[Point2<f64>]) -> Vec<Point2<f64>> {
        points.iter().map(|p| self.transform(p)).collect()
    }
}

/// Midpoint of the axis-aligned bounding box of `points`.
pub fn bounding_box_center(points: &[Point2<f64>]) -> Point2<f64> {
    let (min, max) = points.iter().fold(
        (
            Point2::new(f64::INFINITY, f64::INFINITY),
            Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(min, max), p| {
            (
                Point2::new(min.x.min(p.x), min.y.min(p.y)),
                Point2::new(max.x.max(p.x), max.y.max(p.y)),
            )
        },
    );
    nalgebra::center(&min, &max)
}

/// Rotate `(x, y)` clockwise by `angle` degrees about `center`, then stretch y by `scaling`.
pub fn adjust_for_anisotropy(
    x: &[f64],
    y: &[f64],
    center: Point2<f64>,
    scaling: f64,
    angle: f64,
) -> Result<Vec<Point2<f64>>, ConfigurationError> {
    let params = AnisotropyParameters::new(center, scaling, angle)?;
    Ok(x
        .iter()
        .zip(y.iter())
        .map(|(x, y)| params.transform(&Point2::new(*x, *y)))
        .collect())
}
