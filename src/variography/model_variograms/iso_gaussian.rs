use super::IsoVariogramModel;

#[derive(Debug, Clone, Default, Copy)]
pub struct IsoGaussian {
    pub sill: f64,
    pub range: f64,
    pub nugget: f64,
}

impl IsoGaussian {
    pub fn new(sill: f64, range: f64, nugget: f64) -> Self {
        Self {
            sill,
            range,
            nugget,
        }
    }
}

impl IsoVariogramModel for IsoGaussian {
    const PARAMETER_NAMES: &'static [&'static str] = &["sill", "range", "nugget"];

    fn from_params(params: &[f64]) -> Self {
        Self::new(params[0], params[1], params[2])
    }

    // practical range: semivariance reaches ~95% of the sill at `range`
    fn variogram(&self, h: f64) -> f64 {
        let a = self.range * 4.0 / 7.0;
        (self.sill - self.nugget) * (1.0 - (-(h * h) / (a * a)).exp()) + self.nugget
    }

    fn c_0(&self) -> Option<f64> {
        Some(self.sill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gaussian_shape() {
        let v = IsoGaussian::new(3.0, 7.0, 0.5);
        assert_relative_eq!(v.variogram(0.0), 0.5);
        assert_relative_eq!(v.variogram(4.0), 2.5 * (1.0 - (-1f64).exp()) + 0.5);
        assert_relative_eq!(v.variogram(1.0e3), 3.0);
    }
}
